//! Workout model
//!
//! A workout is a dated session with a free-text type and a duration in
//! minutes. Individual exercises performed in it live in `workout_exercises`.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::analytics::DateRange;
use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Workout {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub workout_type: String,
    /// Minutes
    pub duration: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutCreate {
    pub user_id: i64,
    pub date: NaiveDate,
    pub workout_type: String,
    pub duration: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutUpdate {
    pub date: Option<NaiveDate>,
    pub workout_type: Option<String>,
    pub duration: Option<i64>,
    pub notes: Option<String>,
}

impl Workout {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            workout_type: row.get("workout_type")?,
            duration: row.get("duration")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &WorkoutCreate) -> DbResult<Self> {
        let now = Utc::now();
        conn.execute(
            r#"
            INSERT INTO workouts (user_id, date, workout_type, duration, notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            params![data.user_id, data.date, data.workout_type, data.duration, data.notes, now],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM workouts WHERE id = ?1")?;
        match stmt.query_row([id], Self::from_row) {
            Ok(workout) => Ok(Some(workout)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Workouts dated within the range, oldest first
    pub fn list_in_range(conn: &Connection, user_id: i64, range: &DateRange) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM workouts
            WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
            ORDER BY date, id
            "#,
        )?;
        let workouts = stmt
            .query_map(params![user_id, range.start, range.end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(workouts)
    }

    pub fn count_in_range(conn: &Connection, user_id: i64, range: &DateRange) -> DbResult<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM workouts WHERE user_id = ?1 AND date >= ?2 AND date <= ?3",
            params![user_id, range.start, range.end],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Date of the user's first workout, if any
    pub fn earliest_date(conn: &Connection, user_id: i64) -> DbResult<Option<NaiveDate>> {
        let date = conn.query_row(
            "SELECT MIN(date) FROM workouts WHERE user_id = ?1",
            [user_id],
            |row| row.get::<_, Option<NaiveDate>>(0),
        )?;
        Ok(date)
    }

    pub fn update(conn: &Connection, id: i64, data: &WorkoutUpdate) -> DbResult<Option<Self>> {
        let current = match Self::get_by_id(conn, id)? {
            Some(w) => w,
            None => return Ok(None),
        };

        conn.execute(
            r#"
            UPDATE workouts
            SET date = ?1, workout_type = ?2, duration = ?3, notes = ?4, updated_at = ?5
            WHERE id = ?6
            "#,
            params![
                data.date.unwrap_or(current.date),
                data.workout_type.clone().unwrap_or(current.workout_type),
                data.duration.unwrap_or(current.duration),
                data.notes.clone().or(current.notes),
                Utc::now(),
                id,
            ],
        )?;

        Self::get_by_id(conn, id)
    }

    /// Delete a workout; its exercise rows go with it (CASCADE)
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM workouts WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

/// One exercise performed within a workout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutExercise {
    pub id: i64,
    pub workout_id: i64,
    pub exercise_id: i64,
    pub position: i64,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub weight: Option<f64>,
    pub duration_seconds: Option<i64>,
    pub distance: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkoutExerciseCreate {
    pub workout_id: i64,
    pub exercise_id: i64,
    pub sets: Option<i64>,
    pub reps: Option<i64>,
    pub weight: Option<f64>,
    pub duration_seconds: Option<i64>,
    pub distance: Option<f64>,
    pub notes: Option<String>,
}

impl WorkoutExercise {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            workout_id: row.get("workout_id")?,
            exercise_id: row.get("exercise_id")?,
            position: row.get("position")?,
            sets: row.get("sets")?,
            reps: row.get("reps")?,
            weight: row.get("weight")?,
            duration_seconds: row.get("duration_seconds")?,
            distance: row.get("distance")?,
            notes: row.get("notes")?,
        })
    }

    /// sets × reps × weight, when all three are known
    pub fn volume(&self) -> Option<f64> {
        match (self.sets, self.reps, self.weight) {
            (Some(s), Some(r), Some(w)) => Some(s as f64 * r as f64 * w),
            _ => None,
        }
    }

    /// Append an exercise to the end of the workout
    pub fn create(conn: &Connection, data: &WorkoutExerciseCreate) -> DbResult<Self> {
        let next_position: i64 = conn.query_row(
            "SELECT COALESCE(MAX(position), 0) + 1 FROM workout_exercises WHERE workout_id = ?1",
            [data.workout_id],
            |row| row.get(0),
        )?;

        conn.execute(
            r#"
            INSERT INTO workout_exercises
            (workout_id, exercise_id, position, sets, reps, weight, duration_seconds, distance, notes)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                data.workout_id,
                data.exercise_id,
                next_position,
                data.sets,
                data.reps,
                data.weight,
                data.duration_seconds,
                data.distance,
                data.notes,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM workout_exercises WHERE id = ?1")?;
        match stmt.query_row([id], Self::from_row) {
            Ok(we) => Ok(Some(we)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_for_workout(conn: &Connection, workout_id: i64) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM workout_exercises WHERE workout_id = ?1 ORDER BY position",
        )?;
        let rows = stmt
            .query_map([workout_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM workout_exercises WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
