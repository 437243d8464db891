//! Goal model
//!
//! `current` is derived data: the goal refresh recomputes it from weights,
//! workouts or tasks depending on the category.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalCategory {
    Weight,
    Workouts,
    Tasks,
}

impl GoalCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalCategory::Weight => "WEIGHT",
            GoalCategory::Workouts => "WORKOUTS",
            GoalCategory::Tasks => "TASKS",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "WEIGHT" => Some(GoalCategory::Weight),
            "WORKOUTS" => Some(GoalCategory::Workouts),
            "TASKS" => Some(GoalCategory::Tasks),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GoalStatus {
    Active,
    Completed,
    Paused,
    Cancelled,
}

impl GoalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalStatus::Active => "ACTIVE",
            GoalStatus::Completed => "COMPLETED",
            GoalStatus::Paused => "PAUSED",
            GoalStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Some(GoalStatus::Active),
            "COMPLETED" => Some(GoalStatus::Completed),
            "PAUSED" => Some(GoalStatus::Paused),
            "CANCELLED" | "CANCELED" => Some(GoalStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub target: f64,
    pub current: f64,
    pub unit: String,
    pub category: GoalCategory,
    pub status: GoalStatus,
    pub deadline: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoalCreate {
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub target: f64,
    pub current: f64,
    pub unit: String,
    pub category: GoalCategory,
    pub deadline: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub target: Option<f64>,
    pub unit: Option<String>,
    pub status: Option<GoalStatus>,
    pub deadline: Option<NaiveDate>,
}

/// Goal counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GoalStatusCounts {
    pub total: i64,
    pub active: i64,
    pub completed: i64,
    pub paused: i64,
    pub cancelled: i64,
}

impl Goal {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let category: String = row.get("category")?;
        let status: String = row.get("status")?;
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            target: row.get("target")?,
            current: row.get("current")?,
            unit: row.get("unit")?,
            category: GoalCategory::from_str(&category).unwrap_or(GoalCategory::Workouts),
            status: GoalStatus::from_str(&status).unwrap_or(GoalStatus::Active),
            deadline: row.get("deadline")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &GoalCreate) -> DbResult<Self> {
        let now = Utc::now();
        conn.execute(
            r#"
            INSERT INTO goals
            (user_id, title, description, target, current, unit, category, status, deadline, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, 'ACTIVE', ?8, ?9, ?9)
            "#,
            params![
                data.user_id,
                data.title,
                data.description,
                data.target,
                data.current,
                data.unit,
                data.category.as_str(),
                data.deadline,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM goals WHERE id = ?1")?;
        match stmt.query_row([id], Self::from_row) {
            Ok(goal) => Ok(Some(goal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(conn: &Connection, user_id: i64, status: Option<GoalStatus>) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM goals
            WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)
            ORDER BY created_at, id
            "#,
        )?;
        let goals = stmt
            .query_map(params![user_id, status.map(|s| s.as_str())], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(goals)
    }

    pub fn update(conn: &Connection, id: i64, data: &GoalUpdate) -> DbResult<Option<Self>> {
        let current = match Self::get_by_id(conn, id)? {
            Some(g) => g,
            None => return Ok(None),
        };

        conn.execute(
            r#"
            UPDATE goals
            SET title = ?1, description = ?2, target = ?3, unit = ?4, status = ?5,
                deadline = ?6, updated_at = ?7
            WHERE id = ?8
            "#,
            params![
                data.title.clone().unwrap_or(current.title),
                data.description.clone().or(current.description),
                data.target.unwrap_or(current.target),
                data.unit.clone().unwrap_or(current.unit),
                data.status.unwrap_or(current.status).as_str(),
                data.deadline.or(current.deadline),
                Utc::now(),
                id,
            ],
        )?;

        Self::get_by_id(conn, id)
    }

    /// Persist a recomputed progress value
    pub fn update_current(conn: &Connection, id: i64, current: f64) -> DbResult<bool> {
        let rows = conn.execute(
            "UPDATE goals SET current = ?1, updated_at = ?2 WHERE id = ?3",
            params![current, Utc::now(), id],
        )?;
        Ok(rows > 0)
    }

    pub fn count_by_status(conn: &Connection, user_id: i64) -> DbResult<GoalStatusCounts> {
        let mut stmt = conn.prepare(
            "SELECT status, COUNT(*) FROM goals WHERE user_id = ?1 GROUP BY status",
        )?;
        let rows = stmt
            .query_map([user_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut counts = GoalStatusCounts::default();
        for (status, n) in rows {
            counts.total += n;
            match GoalStatus::from_str(&status) {
                Some(GoalStatus::Active) => counts.active += n,
                Some(GoalStatus::Completed) => counts.completed += n,
                Some(GoalStatus::Paused) => counts.paused += n,
                Some(GoalStatus::Cancelled) => counts.cancelled += n,
                None => {}
            }
        }
        Ok(counts)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM goals WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
