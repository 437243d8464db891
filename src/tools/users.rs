//! User MCP Tools

use serde::Serialize;

use crate::db::Database;
use crate::error::{AppError, AppResult, Validator};
use crate::models::{User, UserCreate};
use crate::tools::{conflict_on_unique, require_user, required_text};

/// Response for list_users
#[derive(Debug, Serialize)]
pub struct ListUsersResponse {
    pub users: Vec<User>,
    pub total: usize,
}

/// Register a new user; username and email must both be unused
pub fn register_user(
    db: &Database,
    username: &str,
    email: &str,
    display_name: Option<&str>,
) -> AppResult<User> {
    let mut v = Validator::new();
    let username = required_text(&mut v, "username", username);
    let email = email.trim().to_string();
    v.check(email.contains('@'), "email", "must be a valid email address");
    v.finish()?;

    let conn = db.get_conn()?;

    if let Some(existing) = User::find_by_login(&conn, &username, &email)? {
        let field = if existing.username.eq_ignore_ascii_case(&username) {
            "username"
        } else {
            "email"
        };
        return Err(AppError::Conflict(format!("{field} is already registered")));
    }

    let data = UserCreate {
        username,
        email,
        display_name: display_name.map(str::trim).filter(|s| !s.is_empty()).map(String::from),
    };
    let user = User::create(&conn, &data)
        .map_err(|e| conflict_on_unique(e, "username or email is already registered"))?;

    tracing::info!(user_id = user.id, username = %user.username, "registered user");
    Ok(user)
}

pub fn get_user(db: &Database, user_id: i64) -> AppResult<User> {
    let conn = db.get_conn()?;
    require_user(&conn, user_id)
}

pub fn list_users(db: &Database) -> AppResult<ListUsersResponse> {
    let conn = db.get_conn()?;
    let users = User::list(&conn)?;
    let total = users.len();
    Ok(ListUsersResponse { users, total })
}
