//! Exercise catalogue model
//!
//! Exercises are named per user, tagged with one category and any number of
//! muscle groups (stored as a JSON array).

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::analytics::DateRange;
use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExerciseCategory {
    Strength,
    Cardio,
    Flexibility,
    Balance,
    Sports,
    Other,
}

impl ExerciseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseCategory::Strength => "STRENGTH",
            ExerciseCategory::Cardio => "CARDIO",
            ExerciseCategory::Flexibility => "FLEXIBILITY",
            ExerciseCategory::Balance => "BALANCE",
            ExerciseCategory::Sports => "SPORTS",
            ExerciseCategory::Other => "OTHER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "STRENGTH" => Some(ExerciseCategory::Strength),
            "CARDIO" => Some(ExerciseCategory::Cardio),
            "FLEXIBILITY" => Some(ExerciseCategory::Flexibility),
            "BALANCE" => Some(ExerciseCategory::Balance),
            "SPORTS" => Some(ExerciseCategory::Sports),
            "OTHER" => Some(ExerciseCategory::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MuscleGroup {
    Chest,
    Back,
    Shoulders,
    Biceps,
    Triceps,
    Forearms,
    Core,
    Quadriceps,
    Hamstrings,
    Glutes,
    Calves,
    FullBody,
}

impl MuscleGroup {
    pub fn as_str(&self) -> &'static str {
        match self {
            MuscleGroup::Chest => "CHEST",
            MuscleGroup::Back => "BACK",
            MuscleGroup::Shoulders => "SHOULDERS",
            MuscleGroup::Biceps => "BICEPS",
            MuscleGroup::Triceps => "TRICEPS",
            MuscleGroup::Forearms => "FOREARMS",
            MuscleGroup::Core => "CORE",
            MuscleGroup::Quadriceps => "QUADRICEPS",
            MuscleGroup::Hamstrings => "HAMSTRINGS",
            MuscleGroup::Glutes => "GLUTES",
            MuscleGroup::Calves => "CALVES",
            MuscleGroup::FullBody => "FULL_BODY",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "CHEST" => Some(MuscleGroup::Chest),
            "BACK" => Some(MuscleGroup::Back),
            "SHOULDERS" => Some(MuscleGroup::Shoulders),
            "BICEPS" => Some(MuscleGroup::Biceps),
            "TRICEPS" => Some(MuscleGroup::Triceps),
            "FOREARMS" => Some(MuscleGroup::Forearms),
            "CORE" | "ABS" => Some(MuscleGroup::Core),
            "QUADRICEPS" | "QUADS" => Some(MuscleGroup::Quadriceps),
            "HAMSTRINGS" => Some(MuscleGroup::Hamstrings),
            "GLUTES" => Some(MuscleGroup::Glutes),
            "CALVES" => Some(MuscleGroup::Calves),
            "FULL_BODY" => Some(MuscleGroup::FullBody),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub category: ExerciseCategory,
    pub muscle_groups: Vec<MuscleGroup>,
    pub equipment: Option<String>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseCreate {
    pub user_id: i64,
    pub name: String,
    pub category: ExerciseCategory,
    pub muscle_groups: Vec<MuscleGroup>,
    pub equipment: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExerciseUpdate {
    pub name: Option<String>,
    pub category: Option<ExerciseCategory>,
    pub muscle_groups: Option<Vec<MuscleGroup>>,
    pub equipment: Option<String>,
    pub description: Option<String>,
}

/// Decode the JSON muscle-group column of `row`
fn muscle_groups_from_row(row: &Row, column: &str) -> rusqlite::Result<Vec<MuscleGroup>> {
    let raw: String = row.get(column)?;
    let idx = row.as_ref().column_index(column)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

impl Exercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let category: String = row.get("category")?;
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            name: row.get("name")?,
            category: ExerciseCategory::from_str(&category).unwrap_or(ExerciseCategory::Other),
            muscle_groups: muscle_groups_from_row(row, "muscle_groups")?,
            equipment: row.get("equipment")?,
            description: row.get("description")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &ExerciseCreate) -> DbResult<Self> {
        let now = Utc::now();
        let muscle_groups = serde_json::to_string(&data.muscle_groups)?;
        conn.execute(
            r#"
            INSERT INTO exercises (user_id, name, category, muscle_groups, equipment, description, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
            params![
                data.user_id,
                data.name,
                data.category.as_str(),
                muscle_groups,
                data.equipment,
                data.description,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM exercises WHERE id = ?1")?;
        match stmt.query_row([id], Self::from_row) {
            Ok(exercise) => Ok(Some(exercise)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Case-insensitive lookup of a user's exercise by name
    pub fn get_by_name(conn: &Connection, user_id: i64, name: &str) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM exercises WHERE user_id = ?1 AND lower(name) = lower(?2)",
        )?;
        match stmt.query_row(params![user_id, name.trim()], Self::from_row) {
            Ok(exercise) => Ok(Some(exercise)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(
        conn: &Connection,
        user_id: i64,
        category: Option<ExerciseCategory>,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM exercises
            WHERE user_id = ?1 AND (?2 IS NULL OR category = ?2)
            ORDER BY name
            "#,
        )?;
        let exercises = stmt
            .query_map(params![user_id, category.map(|c| c.as_str())], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(exercises)
    }

    pub fn update(conn: &Connection, id: i64, data: &ExerciseUpdate) -> DbResult<Option<Self>> {
        let current = match Self::get_by_id(conn, id)? {
            Some(e) => e,
            None => return Ok(None),
        };

        let muscle_groups = serde_json::to_string(
            data.muscle_groups.as_ref().unwrap_or(&current.muscle_groups),
        )?;

        conn.execute(
            r#"
            UPDATE exercises
            SET name = ?1, category = ?2, muscle_groups = ?3, equipment = ?4,
                description = ?5, updated_at = ?6
            WHERE id = ?7
            "#,
            params![
                data.name.clone().unwrap_or(current.name),
                data.category.unwrap_or(current.category).as_str(),
                muscle_groups,
                data.equipment.clone().or(current.equipment),
                data.description.clone().or(current.description),
                Utc::now(),
                id,
            ],
        )?;

        Self::get_by_id(conn, id)
    }

    /// How many workout and template rows reference this exercise
    pub fn usage_count(conn: &Connection, id: i64) -> DbResult<i64> {
        let count = conn.query_row(
            r#"
            SELECT (SELECT COUNT(*) FROM workout_exercises WHERE exercise_id = ?1)
                 + (SELECT COUNT(*) FROM template_exercises WHERE exercise_id = ?1)
            "#,
            [id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM exercises WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

/// A workout-exercise row joined with its workout date and catalogue entry
#[derive(Debug, Clone, Serialize)]
pub struct ExercisePerformance {
    pub workout_id: i64,
    pub date: NaiveDate,
    pub exercise_id: i64,
    pub name: String,
    pub category: ExerciseCategory,
    pub muscle_groups: Vec<MuscleGroup>,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub weight: Option<f64>,
}

impl ExercisePerformance {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let category: String = row.get("category")?;
        Ok(Self {
            workout_id: row.get("workout_id")?,
            date: row.get("date")?,
            exercise_id: row.get("exercise_id")?,
            name: row.get("name")?,
            category: ExerciseCategory::from_str(&category).unwrap_or(ExerciseCategory::Other),
            muscle_groups: muscle_groups_from_row(row, "muscle_groups")?,
            sets: row.get("sets")?,
            reps: row.get("reps")?,
            weight: row.get("weight")?,
        })
    }

    pub fn volume(&self) -> f64 {
        match (self.sets, self.reps, self.weight) {
            (Some(s), Some(r), Some(w)) => s as f64 * r as f64 * w,
            _ => 0.0,
        }
    }

    /// Everything the user performed in workouts dated within the range
    pub fn list_in_range(conn: &Connection, user_id: i64, range: &DateRange) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT we.workout_id, w.date, we.exercise_id, e.name, e.category, e.muscle_groups,
                   we.sets, we.reps, we.weight
            FROM workout_exercises we
            JOIN workouts w ON we.workout_id = w.id
            JOIN exercises e ON we.exercise_id = e.id
            WHERE w.user_id = ?1 AND w.date >= ?2 AND w.date <= ?3
            ORDER BY w.date, we.workout_id, we.position
            "#,
        )?;
        let rows = stmt
            .query_map(params![user_id, range.start, range.end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parsing() {
        assert_eq!(ExerciseCategory::from_str("strength"), Some(ExerciseCategory::Strength));
        assert_eq!(ExerciseCategory::from_str(" Cardio "), Some(ExerciseCategory::Cardio));
        assert_eq!(ExerciseCategory::from_str("yoga"), None);
    }

    #[test]
    fn test_muscle_group_aliases_and_json() {
        assert_eq!(MuscleGroup::from_str("full body"), Some(MuscleGroup::FullBody));
        assert_eq!(MuscleGroup::from_str("quads"), Some(MuscleGroup::Quadriceps));
        let json = serde_json::to_string(&vec![MuscleGroup::Chest, MuscleGroup::FullBody]).unwrap();
        assert_eq!(json, r#"["CHEST","FULL_BODY"]"#);
    }
}
