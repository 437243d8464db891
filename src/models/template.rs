//! Workout template model
//!
//! A template is a named, reusable list of exercises with target sets, reps
//! and weight. Starting a workout from a template copies that list.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutTemplate {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub workout_type: String,
    pub description: Option<String>,
    pub estimated_duration: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateExercise {
    pub id: i64,
    pub template_id: i64,
    pub exercise_id: i64,
    pub position: i64,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub weight: Option<f64>,
}

/// One exercise line when creating a template
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateExerciseInput {
    pub exercise_id: i64,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutTemplateCreate {
    pub user_id: i64,
    pub name: String,
    pub workout_type: String,
    pub description: Option<String>,
    pub estimated_duration: Option<i64>,
    pub exercises: Vec<TemplateExerciseInput>,
}

/// A template together with its exercise lines
#[derive(Debug, Clone, Serialize)]
pub struct TemplateWithExercises {
    #[serde(flatten)]
    pub template: WorkoutTemplate,
    pub exercises: Vec<TemplateExercise>,
}

impl WorkoutTemplate {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            workout_type: row.get("workout_type")?,
            description: row.get("description")?,
            estimated_duration: row.get("estimated_duration")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Insert the template and its exercise lines in one transaction
    pub fn create(conn: &Connection, data: &WorkoutTemplateCreate) -> DbResult<Self> {
        let tx = conn.unchecked_transaction()?;
        let now = Utc::now();

        tx.execute(
            r#"
            INSERT INTO workout_templates
            (user_id, name, workout_type, description, estimated_duration, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            params![
                data.user_id,
                data.name,
                data.workout_type,
                data.description,
                data.estimated_duration,
                now,
            ],
        )?;
        let id = tx.last_insert_rowid();

        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO template_exercises (template_id, exercise_id, position, sets, reps, weight)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )?;
            for (i, ex) in data.exercises.iter().enumerate() {
                stmt.execute(params![id, ex.exercise_id, i as i64 + 1, ex.sets, ex.reps, ex.weight])?;
            }
        }

        tx.commit()?;

        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM workout_templates WHERE id = ?1")?;
        match stmt.query_row([id], Self::from_row) {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn get_by_name(conn: &Connection, user_id: i64, name: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM workout_templates WHERE user_id = ?1 AND lower(name) = lower(?2)",
        )?;
        match stmt.query_row(params![user_id, name.trim()], Self::from_row) {
            Ok(t) => Ok(Some(t)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(conn: &Connection, user_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt =
            conn.prepare("SELECT * FROM workout_templates WHERE user_id = ?1 ORDER BY name")?;
        let templates = stmt
            .query_map([user_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(templates)
    }

    pub fn exercises(conn: &Connection, template_id: i64) -> DbResult<Vec<TemplateExercise>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM template_exercises WHERE template_id = ?1 ORDER BY position",
        )?;
        let rows = stmt
            .query_map([template_id], |row| {
                Ok(TemplateExercise {
                    id: row.get("id")?,
                    template_id: row.get("template_id")?,
                    exercise_id: row.get("exercise_id")?,
                    position: row.get("position")?,
                    sets: row.get("sets")?,
                    reps: row.get("reps")?,
                    weight: row.get("weight")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn with_exercises(conn: &Connection, template: WorkoutTemplate) -> DbResult<TemplateWithExercises> {
        let exercises = Self::exercises(conn, template.id)?;
        Ok(TemplateWithExercises { template, exercises })
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM workout_templates WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
