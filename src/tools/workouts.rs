//! Workout MCP Tools
//!
//! Workouts plus the exercises performed in them. Adding an exercise with a
//! new best weight records a MAX_WEIGHT personal record on the spot.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{self, DateRange, RangeQuery};
use crate::db::Database;
use crate::error::{AppError, AppResult, Validator};
use crate::models::{
    Exercise, PersonalRecord, PersonalRecordCreate, RecordType, Workout, WorkoutCreate,
    WorkoutExercise, WorkoutExerciseCreate, WorkoutUpdate,
};
use crate::tools::{checked_date, date_field, optional_date_field, owned, require_user, required_text, DeleteResponse};

/// Unit recorded on automatic MAX_WEIGHT records
pub const WEIGHT_UNIT: &str = "lbs";

// ============================================================================
// Response Structs
// ============================================================================

/// Exercise line with its catalogue name
#[derive(Debug, Serialize)]
pub struct WorkoutExerciseDetail {
    #[serde(flatten)]
    pub entry: WorkoutExercise,
    pub exercise_name: String,
    pub volume: Option<f64>,
}

/// Response for get_workout
#[derive(Debug, Serialize)]
pub struct WorkoutDetail {
    #[serde(flatten)]
    pub workout: Workout,
    pub exercises: Vec<WorkoutExerciseDetail>,
}

/// Response for list_workouts
#[derive(Debug, Serialize)]
pub struct ListWorkoutsResponse {
    pub range: DateRange,
    pub workouts: Vec<Workout>,
    pub total: usize,
}

/// Response for add_workout_exercise
#[derive(Debug, Serialize)]
pub struct AddWorkoutExerciseResponse {
    pub workout_exercise: WorkoutExercise,
    /// Set when this entry beat the previous best weight
    pub new_personal_record: Option<PersonalRecord>,
}

/// Exercise data for add_workout_exercise
#[derive(Debug, Clone, Default)]
pub struct ExerciseEntry {
    pub exercise_id: i64,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub weight: Option<f64>,
    pub duration_seconds: Option<i64>,
    pub distance: Option<f64>,
    pub notes: Option<String>,
}

// ============================================================================
// Workout Tool Functions
// ============================================================================

fn check_duration(v: &mut Validator, duration: i64) {
    v.check(duration > 0, "duration", "must be greater than 0");
}

pub fn add_workout(
    db: &Database,
    user_id: i64,
    date: &str,
    workout_type: &str,
    duration: i64,
    notes: Option<&str>,
) -> AppResult<Workout> {
    let mut v = Validator::new();
    let date = date_field(&mut v, "date", date);
    let workout_type = required_text(&mut v, "workout_type", workout_type);
    check_duration(&mut v, duration);
    v.finish()?;

    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;

    let data = WorkoutCreate {
        user_id,
        date: checked_date(date, "date")?,
        workout_type,
        duration,
        notes: notes.map(String::from),
    };
    let workout = Workout::create(&conn, &data)?;
    tracing::info!(user_id, workout_id = workout.id, duration, "added workout");
    Ok(workout)
}

pub fn get_workout(db: &Database, user_id: i64, id: i64) -> AppResult<WorkoutDetail> {
    let conn = db.get_conn()?;
    let workout = owned(Workout::get_by_id(&conn, id)?, user_id, id)?;

    let mut exercises = Vec::new();
    for entry in WorkoutExercise::list_for_workout(&conn, id)? {
        let exercise_name = Exercise::get_by_id(&conn, entry.exercise_id)?
            .map(|e| e.name)
            .unwrap_or_default();
        exercises.push(WorkoutExerciseDetail {
            volume: entry.volume(),
            entry,
            exercise_name,
        });
    }

    Ok(WorkoutDetail { workout, exercises })
}

pub fn list_workouts(
    db: &Database,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<ListWorkoutsResponse> {
    let range = analytics::resolve(query, today)?;
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;

    let workouts = Workout::list_in_range(&conn, user_id, &range)?;
    let total = workouts.len();
    Ok(ListWorkoutsResponse { range, workouts, total })
}

pub fn update_workout(
    db: &Database,
    user_id: i64,
    id: i64,
    date: Option<&str>,
    workout_type: Option<&str>,
    duration: Option<i64>,
    notes: Option<&str>,
) -> AppResult<Workout> {
    let mut v = Validator::new();
    let date = optional_date_field(&mut v, "date", date);
    let workout_type = workout_type.map(|t| required_text(&mut v, "workout_type", t));
    if let Some(d) = duration {
        check_duration(&mut v, d);
    }
    v.finish()?;

    let conn = db.get_conn()?;
    owned(Workout::get_by_id(&conn, id)?, user_id, id)?;

    let data = WorkoutUpdate {
        date,
        workout_type,
        duration,
        notes: notes.map(String::from),
    };
    owned(Workout::update(&conn, id, &data)?, user_id, id)
}

pub fn delete_workout(db: &Database, user_id: i64, id: i64) -> AppResult<DeleteResponse> {
    let conn = db.get_conn()?;
    owned(Workout::get_by_id(&conn, id)?, user_id, id)?;
    Workout::delete(&conn, id)?;
    tracing::info!(user_id, workout_id = id, "deleted workout");
    Ok(DeleteResponse::new(id))
}

// ============================================================================
// Workout Exercise Tool Functions
// ============================================================================

pub fn add_workout_exercise(
    db: &Database,
    user_id: i64,
    workout_id: i64,
    entry: ExerciseEntry,
) -> AppResult<AddWorkoutExerciseResponse> {
    let mut v = Validator::new();
    v.check(entry.sets.map_or(true, |s| s > 0), "sets", "must be greater than 0");
    v.check(entry.reps.map_or(true, |r| r > 0), "reps", "must be greater than 0");
    v.check(entry.weight.map_or(true, |w| w >= 0.0), "weight", "must not be negative");
    v.check(
        entry.duration_seconds.map_or(true, |d| d > 0),
        "duration_seconds",
        "must be greater than 0",
    );
    v.check(entry.distance.map_or(true, |d| d >= 0.0), "distance", "must not be negative");
    v.finish()?;

    let conn = db.get_conn()?;
    let workout = owned(Workout::get_by_id(&conn, workout_id)?, user_id, workout_id)?;
    owned(Exercise::get_by_id(&conn, entry.exercise_id)?, user_id, entry.exercise_id)?;

    let data = WorkoutExerciseCreate {
        workout_id,
        exercise_id: entry.exercise_id,
        sets: entry.sets,
        reps: entry.reps,
        weight: entry.weight,
        duration_seconds: entry.duration_seconds,
        distance: entry.distance,
        notes: entry.notes,
    };
    let workout_exercise = WorkoutExercise::create(&conn, &data)?;

    let new_personal_record = match workout_exercise.weight.filter(|w| *w > 0.0) {
        Some(weight) => record_if_heavier(&conn, &workout, entry.exercise_id, weight)?,
        None => None,
    };

    Ok(AddWorkoutExerciseResponse {
        workout_exercise,
        new_personal_record,
    })
}

/// Create a MAX_WEIGHT record when `weight` beats the standing best
fn record_if_heavier(
    conn: &rusqlite::Connection,
    workout: &Workout,
    exercise_id: i64,
    weight: f64,
) -> AppResult<Option<PersonalRecord>> {
    let best = PersonalRecord::best(conn, workout.user_id, exercise_id, RecordType::MaxWeight)?;
    if best.is_some_and(|b| !RecordType::MaxWeight.beats(weight, b.value)) {
        return Ok(None);
    }

    let record = PersonalRecord::create(
        conn,
        &PersonalRecordCreate {
            user_id: workout.user_id,
            exercise_id,
            record_type: RecordType::MaxWeight,
            value: weight,
            unit: WEIGHT_UNIT.to_string(),
            date: workout.date,
            workout_id: Some(workout.id),
            notes: None,
        },
    )?;
    tracing::info!(
        user_id = workout.user_id,
        exercise_id,
        weight,
        "new max weight personal record"
    );
    Ok(Some(record))
}

pub fn remove_workout_exercise(
    db: &Database,
    user_id: i64,
    workout_exercise_id: i64,
) -> AppResult<DeleteResponse> {
    let conn = db.get_conn()?;
    let entry = WorkoutExercise::get_by_id(&conn, workout_exercise_id)?
        .ok_or(AppError::not_found("workout exercise", workout_exercise_id))?;
    // Ownership flows through the parent workout
    owned(Workout::get_by_id(&conn, entry.workout_id)?, user_id, entry.workout_id)
        .map_err(|_| AppError::not_found("workout exercise", workout_exercise_id))?;

    WorkoutExercise::delete(&conn, workout_exercise_id)?;
    Ok(DeleteResponse::new(workout_exercise_id))
}
