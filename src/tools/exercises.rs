//! Exercise catalogue MCP Tools

use serde::Serialize;

use crate::db::Database;
use crate::error::{AppError, AppResult, Validator};
use crate::models::{Exercise, ExerciseCategory, ExerciseCreate, ExerciseUpdate, MuscleGroup};
use crate::tools::{conflict_on_unique, owned, require_user, required_text, DeleteResponse};

/// Response for list_exercises
#[derive(Debug, Serialize)]
pub struct ListExercisesResponse {
    pub exercises: Vec<Exercise>,
    pub total: usize,
}

fn parse_category(v: &mut Validator, value: &str) -> Option<ExerciseCategory> {
    let category = ExerciseCategory::from_str(value);
    v.check(
        category.is_some(),
        "category",
        "must be one of STRENGTH, CARDIO, FLEXIBILITY, BALANCE, SPORTS, OTHER",
    );
    category
}

/// Parse muscle group names, dropping duplicates and keeping input order
fn parse_muscle_groups(v: &mut Validator, values: &[String]) -> Vec<MuscleGroup> {
    let mut groups = Vec::new();
    for value in values {
        match MuscleGroup::from_str(value) {
            Some(g) if !groups.contains(&g) => groups.push(g),
            Some(_) => {}
            None => {
                v.push("muscle_groups", format!("unknown muscle group '{value}'"));
            }
        }
    }
    groups
}

fn name_taken(name: &str) -> AppError {
    AppError::Conflict(format!("an exercise named '{name}' already exists"))
}

pub fn create_exercise(
    db: &Database,
    user_id: i64,
    name: &str,
    category: &str,
    muscle_groups: &[String],
    equipment: Option<&str>,
    description: Option<&str>,
) -> AppResult<Exercise> {
    let mut v = Validator::new();
    let name = required_text(&mut v, "name", name);
    let category = parse_category(&mut v, category);
    let muscle_groups = parse_muscle_groups(&mut v, muscle_groups);
    v.finish()?;

    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;

    if Exercise::get_by_name(&conn, user_id, &name)?.is_some() {
        return Err(name_taken(&name));
    }

    let data = ExerciseCreate {
        user_id,
        name,
        category: category.unwrap_or(ExerciseCategory::Other),
        muscle_groups,
        equipment: equipment.map(String::from),
        description: description.map(String::from),
    };
    let exercise = Exercise::create(&conn, &data).map_err(|e| conflict_on_unique(e, "exercise name already exists"))?;
    tracing::info!(user_id, exercise_id = exercise.id, name = %exercise.name, "created exercise");
    Ok(exercise)
}

pub fn get_exercise(db: &Database, user_id: i64, id: i64) -> AppResult<Exercise> {
    let conn = db.get_conn()?;
    owned(Exercise::get_by_id(&conn, id)?, user_id, id)
}

pub fn list_exercises(
    db: &Database,
    user_id: i64,
    category: Option<&str>,
) -> AppResult<ListExercisesResponse> {
    let mut v = Validator::new();
    let category = category.and_then(|c| parse_category(&mut v, c));
    v.finish()?;

    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;

    let exercises = Exercise::list(&conn, user_id, category)?;
    let total = exercises.len();
    Ok(ListExercisesResponse { exercises, total })
}

#[allow(clippy::too_many_arguments)]
pub fn update_exercise(
    db: &Database,
    user_id: i64,
    id: i64,
    name: Option<&str>,
    category: Option<&str>,
    muscle_groups: Option<&[String]>,
    equipment: Option<&str>,
    description: Option<&str>,
) -> AppResult<Exercise> {
    let mut v = Validator::new();
    let name = name.map(|n| required_text(&mut v, "name", n));
    let category = category.and_then(|c| parse_category(&mut v, c));
    let muscle_groups = muscle_groups.map(|m| parse_muscle_groups(&mut v, m));
    v.finish()?;

    let conn = db.get_conn()?;
    owned(Exercise::get_by_id(&conn, id)?, user_id, id)?;

    if let Some(new_name) = &name {
        if let Some(other) = Exercise::get_by_name(&conn, user_id, new_name)? {
            if other.id != id {
                return Err(name_taken(new_name));
            }
        }
    }

    let data = ExerciseUpdate {
        name,
        category,
        muscle_groups,
        equipment: equipment.map(String::from),
        description: description.map(String::from),
    };
    let updated = Exercise::update(&conn, id, &data)
        .map_err(|e| conflict_on_unique(e, "exercise name already exists"))?;
    owned(updated, user_id, id)
}

/// Delete an exercise that no workout or template uses
pub fn delete_exercise(db: &Database, user_id: i64, id: i64) -> AppResult<DeleteResponse> {
    let conn = db.get_conn()?;
    let exercise = owned(Exercise::get_by_id(&conn, id)?, user_id, id)?;

    let usage = Exercise::usage_count(&conn, id)?;
    if usage > 0 {
        return Err(AppError::Conflict(format!(
            "exercise '{}' is used in {} workout or template entries",
            exercise.name, usage
        )));
    }

    Exercise::delete(&conn, id)?;
    tracing::info!(user_id, exercise_id = id, "deleted exercise");
    Ok(DeleteResponse::new(id))
}
