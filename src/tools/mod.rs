//! FitTrack Tools module
//!
//! Tool implementations behind the MCP server. Every function validates its
//! input, checks that the records it touches belong to the requesting user
//! and returns an [`AppResult`].

pub mod analytics;
pub mod body;
pub mod exercises;
pub mod goals;
pub mod records;
pub mod reports;
pub mod status;
pub mod tasks;
pub mod templates;
pub mod users;
pub mod weights;
pub mod workouts;

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, ErrorCode};
use serde::Serialize;

use crate::analytics::range::parse_date;
use crate::db::DbError;
use crate::error::{AppError, AppResult, Validator};
use crate::models::{
    BodyComposition, Exercise, Goal, PersonalRecord, ProgressPhoto, Task, User, WeightEntry,
    Workout, WorkoutTemplate,
};

/// The calendar day analytics are computed against
pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Response for delete operations
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub success: bool,
    pub deleted_id: i64,
}

impl DeleteResponse {
    pub fn new(deleted_id: i64) -> Self {
        Self {
            success: true,
            deleted_id,
        }
    }
}

/// A record that belongs to exactly one user
pub trait UserOwned {
    const RESOURCE: &'static str;

    fn owner_id(&self) -> i64;
}

macro_rules! user_owned {
    ($($ty:ty => $resource:literal),* $(,)?) => {
        $(
            impl UserOwned for $ty {
                const RESOURCE: &'static str = $resource;

                fn owner_id(&self) -> i64 {
                    self.user_id
                }
            }
        )*
    };
}

user_owned! {
    WeightEntry => "weight entry",
    Workout => "workout",
    Exercise => "exercise",
    PersonalRecord => "personal record",
    WorkoutTemplate => "workout template",
    BodyComposition => "body composition",
    ProgressPhoto => "progress photo",
    Task => "task",
    Goal => "goal",
}

/// Unwrap a fetched record, treating another user's record as missing
pub fn owned<T: UserOwned>(record: Option<T>, user_id: i64, id: i64) -> AppResult<T> {
    match record {
        Some(r) if r.owner_id() == user_id => Ok(r),
        _ => Err(AppError::not_found(T::RESOURCE, id)),
    }
}

pub fn require_user(conn: &Connection, user_id: i64) -> AppResult<User> {
    User::get_by_id(conn, user_id)?.ok_or(AppError::not_found("user", user_id))
}

/// Parse a required date argument, recording an issue when malformed
pub fn date_field(v: &mut Validator, field: &str, value: &str) -> Option<NaiveDate> {
    let parsed = parse_date(value);
    v.check(parsed.is_some(), field, "must be a date in YYYY-MM-DD format");
    parsed
}

/// The date a successful `date_field` check produced
pub fn checked_date(value: Option<NaiveDate>, field: &str) -> AppResult<NaiveDate> {
    value.ok_or_else(|| AppError::invalid(field, "must be a date in YYYY-MM-DD format"))
}

/// Parse an optional date argument
pub fn optional_date_field(v: &mut Validator, field: &str, value: Option<&str>) -> Option<NaiveDate> {
    value.and_then(|s| date_field(v, field, s))
}

/// Trim a name-like field, recording an issue when it is blank
pub fn required_text(v: &mut Validator, field: &str, value: &str) -> String {
    let trimmed = value.trim();
    v.check(!trimmed.is_empty(), field, "must not be empty");
    trimmed.to_string()
}

/// Turn a UNIQUE constraint failure into a conflict
pub fn conflict_on_unique(e: DbError, message: impl Into<String>) -> AppError {
    match &e {
        DbError::Sqlite(rusqlite::Error::SqliteFailure(err, _))
            if err.code == ErrorCode::ConstraintViolation =>
        {
            AppError::Conflict(message.into())
        }
        _ => AppError::Database(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_owned_hides_other_users_records() {
        let task = Task {
            id: 7,
            user_id: 1,
            title: "stretch".to_string(),
            description: None,
            status: crate::models::TaskStatus::Pending,
            due_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        assert!(owned(Some(task.clone()), 1, 7).is_ok());
        match owned(Some(task), 2, 7) {
            Err(AppError::NotFound { resource, id }) => {
                assert_eq!(resource, "task");
                assert_eq!(id, 7);
            }
            other => panic!("unexpected: {other:?}"),
        }
        assert!(owned::<Task>(None, 1, 7).is_err());
    }

    #[test]
    fn test_field_helpers_collect_issues() {
        let mut v = Validator::new();
        assert!(date_field(&mut v, "date", "2025-02-30").is_none());
        assert_eq!(optional_date_field(&mut v, "due_date", None), None);
        assert_eq!(required_text(&mut v, "title", "  "), "");
        match v.finish() {
            Err(AppError::Validation(issues)) => {
                let fields: Vec<_> = issues.iter().map(|i| i.field.as_str()).collect();
                assert_eq!(fields, vec!["date", "title"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_checked_date_never_substitutes_a_default() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 9).unwrap();
        assert_eq!(checked_date(Some(date), "date").unwrap(), date);
        match checked_date(None, "date") {
            Err(AppError::Validation(issues)) => assert_eq!(issues[0].field, "date"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
