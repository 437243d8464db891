//! Analytics MCP Tools
//!
//! Thin wrappers that check the user exists and hand off to the
//! aggregators in [`crate::analytics`].

use chrono::NaiveDate;

use crate::analytics::consistency::{self, ConsistencyAnalytics};
use crate::analytics::dashboard::{self, Dashboard};
use crate::analytics::exercises::{self, ExerciseAnalytics};
use crate::analytics::tasks::{self, TaskAnalytics};
use crate::analytics::weight::{self, WeightAnalytics};
use crate::analytics::workouts::{self, EnhancedWorkoutAnalytics, WorkoutAnalytics};
use crate::analytics::RangeQuery;
use crate::db::Database;
use crate::error::AppResult;
use crate::tools::require_user;

pub fn weight_analytics(
    db: &Database,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<WeightAnalytics> {
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    weight::weight_analytics(&conn, user_id, query, today)
}

pub fn workout_analytics(
    db: &Database,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<WorkoutAnalytics> {
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    workouts::workout_analytics(&conn, user_id, query, today)
}

pub fn enhanced_workout_analytics(
    db: &Database,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<EnhancedWorkoutAnalytics> {
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    workouts::enhanced_workout_analytics(&conn, user_id, query, today)
}

pub fn task_analytics(
    db: &Database,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<TaskAnalytics> {
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    tasks::task_analytics(&conn, user_id, query, today)
}

pub fn exercise_analytics(
    db: &Database,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<ExerciseAnalytics> {
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    exercises::exercise_analytics(&conn, user_id, query, today)
}

pub fn consistency_analytics(
    db: &Database,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<ConsistencyAnalytics> {
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    consistency::consistency_analytics(&conn, user_id, query, today)
}

pub fn dashboard(db: &Database, user_id: i64, today: NaiveDate) -> AppResult<Dashboard> {
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    Ok(dashboard::dashboard(&conn, user_id, today)?)
}
