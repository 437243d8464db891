//! Workout template MCP Tools

use chrono::NaiveDate;
use serde::Serialize;

use crate::db::Database;
use crate::error::{AppError, AppResult, Validator};
use crate::models::{
    Exercise, TemplateExerciseInput, TemplateWithExercises, Workout, WorkoutCreate,
    WorkoutExercise, WorkoutExerciseCreate, WorkoutTemplate, WorkoutTemplateCreate,
};
use crate::tools::workouts::{get_workout, WorkoutDetail};
use crate::tools::{conflict_on_unique, date_field, owned, require_user, required_text, DeleteResponse};

/// Response for list_templates
#[derive(Debug, Serialize)]
pub struct ListTemplatesResponse {
    pub templates: Vec<WorkoutTemplate>,
    pub total: usize,
}

pub fn create_template(
    db: &Database,
    user_id: i64,
    name: &str,
    workout_type: &str,
    description: Option<&str>,
    estimated_duration: Option<i64>,
    exercises: Vec<TemplateExerciseInput>,
) -> AppResult<TemplateWithExercises> {
    let mut v = Validator::new();
    let name = required_text(&mut v, "name", name);
    let workout_type = required_text(&mut v, "workout_type", workout_type);
    v.check(
        estimated_duration.map_or(true, |d| d > 0),
        "estimated_duration",
        "must be greater than 0",
    );
    v.finish()?;

    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;

    if WorkoutTemplate::get_by_name(&conn, user_id, &name)?.is_some() {
        return Err(AppError::Conflict(format!("a template named '{name}' already exists")));
    }
    for ex in &exercises {
        owned(Exercise::get_by_id(&conn, ex.exercise_id)?, user_id, ex.exercise_id)?;
    }

    let data = WorkoutTemplateCreate {
        user_id,
        name,
        workout_type,
        description: description.map(String::from),
        estimated_duration,
        exercises,
    };
    let template = WorkoutTemplate::create(&conn, &data)
        .map_err(|e| conflict_on_unique(e, "template name already exists"))?;
    tracing::info!(user_id, template_id = template.id, "created workout template");

    Ok(WorkoutTemplate::with_exercises(&conn, template)?)
}

pub fn get_template(db: &Database, user_id: i64, id: i64) -> AppResult<TemplateWithExercises> {
    let conn = db.get_conn()?;
    let template = owned(WorkoutTemplate::get_by_id(&conn, id)?, user_id, id)?;
    Ok(WorkoutTemplate::with_exercises(&conn, template)?)
}

pub fn list_templates(db: &Database, user_id: i64) -> AppResult<ListTemplatesResponse> {
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    let templates = WorkoutTemplate::list(&conn, user_id)?;
    let total = templates.len();
    Ok(ListTemplatesResponse { templates, total })
}

pub fn delete_template(db: &Database, user_id: i64, id: i64) -> AppResult<DeleteResponse> {
    let conn = db.get_conn()?;
    owned(WorkoutTemplate::get_by_id(&conn, id)?, user_id, id)?;
    WorkoutTemplate::delete(&conn, id)?;
    Ok(DeleteResponse::new(id))
}

/// Create a workout from a template, copying its exercise lines.
///
/// The duration comes from `duration`, else the template's estimate.
pub fn start_workout_from_template(
    db: &Database,
    user_id: i64,
    template_id: i64,
    date: Option<&str>,
    duration: Option<i64>,
    today: NaiveDate,
) -> AppResult<WorkoutDetail> {
    let mut v = Validator::new();
    let date = date.and_then(|d| date_field(&mut v, "date", d)).unwrap_or(today);
    v.check(duration.map_or(true, |d| d > 0), "duration", "must be greater than 0");
    v.finish()?;

    let conn = db.get_conn()?;
    let template = owned(WorkoutTemplate::get_by_id(&conn, template_id)?, user_id, template_id)?;

    let duration = duration.or(template.estimated_duration).ok_or_else(|| {
        AppError::invalid("duration", "is required when the template has no estimated duration")
    })?;

    let lines = WorkoutTemplate::exercises(&conn, template.id)?;

    let tx = conn.unchecked_transaction()?;
    let workout = Workout::create(
        &tx,
        &WorkoutCreate {
            user_id,
            date,
            workout_type: template.workout_type.clone(),
            duration,
            notes: Some(format!("From template: {}", template.name)),
        },
    )?;
    for line in &lines {
        WorkoutExercise::create(
            &tx,
            &WorkoutExerciseCreate {
                workout_id: workout.id,
                exercise_id: line.exercise_id,
                sets: line.sets,
                reps: line.reps,
                weight: line.weight,
                ..WorkoutExerciseCreate::default()
            },
        )?;
    }
    tx.commit()?;

    tracing::info!(user_id, template_id, workout_id = workout.id, "started workout from template");
    drop(conn);
    get_workout(db, user_id, workout.id)
}
