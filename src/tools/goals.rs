//! Goal MCP Tools

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::goals::{self as goal_analytics, GoalProgressReport};
use crate::db::Database;
use crate::error::{AppResult, Validator};
use crate::models::{Goal, GoalCategory, GoalCreate, GoalStatus, GoalUpdate};
use crate::tools::{optional_date_field, owned, require_user, required_text, DeleteResponse};

/// Response for list_goals
#[derive(Debug, Serialize)]
pub struct ListGoalsResponse {
    pub goals: Vec<Goal>,
    pub total: usize,
}

fn parse_status(v: &mut Validator, value: &str) -> Option<GoalStatus> {
    let status = GoalStatus::from_str(value);
    v.check(
        status.is_some(),
        "status",
        "must be one of ACTIVE, COMPLETED, PAUSED, CANCELLED",
    );
    status
}

fn check_target(v: &mut Validator, target: f64) {
    v.check(target.is_finite() && target > 0.0, "target", "must be greater than 0");
}

#[allow(clippy::too_many_arguments)]
pub fn create_goal(
    db: &Database,
    user_id: i64,
    title: &str,
    description: Option<&str>,
    category: &str,
    target: f64,
    current: Option<f64>,
    unit: &str,
    deadline: Option<&str>,
) -> AppResult<Goal> {
    let mut v = Validator::new();
    let title = required_text(&mut v, "title", title);
    let category_parsed = GoalCategory::from_str(category);
    v.check(
        category_parsed.is_some(),
        "category",
        "must be one of WEIGHT, WORKOUTS, TASKS",
    );
    check_target(&mut v, target);
    v.check(
        current.map_or(true, |c| c.is_finite() && c >= 0.0),
        "current",
        "must not be negative",
    );
    let unit = required_text(&mut v, "unit", unit);
    let deadline = optional_date_field(&mut v, "deadline", deadline);
    v.finish()?;

    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;

    let data = GoalCreate {
        user_id,
        title,
        description: description.map(String::from),
        target,
        current: current.unwrap_or(0.0),
        unit,
        category: category_parsed.unwrap_or(GoalCategory::Workouts),
        deadline,
    };
    let goal = Goal::create(&conn, &data)?;
    tracing::info!(user_id, goal_id = goal.id, category = goal.category.as_str(), "created goal");
    Ok(goal)
}

pub fn get_goal(db: &Database, user_id: i64, id: i64) -> AppResult<Goal> {
    let conn = db.get_conn()?;
    owned(Goal::get_by_id(&conn, id)?, user_id, id)
}

pub fn list_goals(db: &Database, user_id: i64, status: Option<&str>) -> AppResult<ListGoalsResponse> {
    let mut v = Validator::new();
    let status = status.and_then(|s| parse_status(&mut v, s));
    v.finish()?;

    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    let goals = Goal::list(&conn, user_id, status)?;
    let total = goals.len();
    Ok(ListGoalsResponse { goals, total })
}

#[allow(clippy::too_many_arguments)]
pub fn update_goal(
    db: &Database,
    user_id: i64,
    id: i64,
    title: Option<&str>,
    description: Option<&str>,
    target: Option<f64>,
    unit: Option<&str>,
    status: Option<&str>,
    deadline: Option<&str>,
) -> AppResult<Goal> {
    let mut v = Validator::new();
    let title = title.map(|t| required_text(&mut v, "title", t));
    if let Some(t) = target {
        check_target(&mut v, t);
    }
    let unit = unit.map(|u| required_text(&mut v, "unit", u));
    let status = status.and_then(|s| parse_status(&mut v, s));
    let deadline = optional_date_field(&mut v, "deadline", deadline);
    v.finish()?;

    let conn = db.get_conn()?;
    owned(Goal::get_by_id(&conn, id)?, user_id, id)?;

    let data = GoalUpdate {
        title,
        description: description.map(String::from),
        target,
        unit,
        status,
        deadline,
    };
    owned(Goal::update(&conn, id, &data)?, user_id, id)
}

pub fn delete_goal(db: &Database, user_id: i64, id: i64) -> AppResult<DeleteResponse> {
    let conn = db.get_conn()?;
    owned(Goal::get_by_id(&conn, id)?, user_id, id)?;
    Goal::delete(&conn, id)?;
    Ok(DeleteResponse::new(id))
}

/// Progress from stored values; never writes
pub fn goal_progress(db: &Database, user_id: i64) -> AppResult<GoalProgressReport> {
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    Ok(goal_analytics::goal_progress(&conn, user_id)?)
}

/// Recompute each goal's current value from live data and persist it
pub fn refresh_goal_progress(
    db: &Database,
    user_id: i64,
    today: NaiveDate,
) -> AppResult<GoalProgressReport> {
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    Ok(goal_analytics::refresh_goal_progress(&conn, user_id, today)?)
}
