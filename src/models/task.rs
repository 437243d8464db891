//! Task model
//!
//! A task's completion moment is its `updated_at` once the status is
//! COMPLETED. Date filters compare the date part of the stored timestamps.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::analytics::DateRange;
use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Pending,
    Completed,
    Archived,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "PENDING",
            TaskStatus::Completed => "COMPLETED",
            TaskStatus::Archived => "ARCHIVED",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "PENDING" => Some(TaskStatus::Pending),
            "COMPLETED" => Some(TaskStatus::Completed),
            "ARCHIVED" => Some(TaskStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskCreate {
    pub user_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub due_date: Option<NaiveDate>,
    /// Defaults to now
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<NaiveDate>,
}

impl Task {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let status: String = row.get("status")?;
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            title: row.get("title")?,
            description: row.get("description")?,
            status: TaskStatus::from_str(&status).unwrap_or(TaskStatus::Pending),
            due_date: row.get("due_date")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Day on which a completed task was finished
    pub fn completed_on(&self) -> Option<NaiveDate> {
        (self.status == TaskStatus::Completed).then(|| self.updated_at.date_naive())
    }

    pub fn create(conn: &Connection, data: &TaskCreate) -> DbResult<Self> {
        let created_at = data.created_at.unwrap_or_else(Utc::now);
        conn.execute(
            r#"
            INSERT INTO tasks (user_id, title, description, status, due_date, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            "#,
            params![
                data.user_id,
                data.title,
                data.description,
                data.status.as_str(),
                data.due_date,
                created_at,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM tasks WHERE id = ?1")?;
        match stmt.query_row([id], Self::from_row) {
            Ok(task) => Ok(Some(task)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(conn: &Connection, user_id: i64, status: Option<TaskStatus>) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM tasks
            WHERE user_id = ?1 AND (?2 IS NULL OR status = ?2)
            ORDER BY created_at DESC, id DESC
            "#,
        )?;
        let tasks = stmt
            .query_map(params![user_id, status.map(|s| s.as_str())], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Tasks whose creation date falls within the range
    pub fn list_in_range(conn: &Connection, user_id: i64, range: &DateRange) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM tasks
            WHERE user_id = ?1 AND substr(created_at, 1, 10) >= ?2 AND substr(created_at, 1, 10) <= ?3
            ORDER BY created_at, id
            "#,
        )?;
        let tasks = stmt
            .query_map(params![user_id, range.start, range.end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    /// Completion days of every completed task up to and including `until`
    pub fn completion_days(conn: &Connection, user_id: i64, until: NaiveDate) -> DbResult<Vec<NaiveDate>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT updated_at FROM tasks
            WHERE user_id = ?1 AND status = 'COMPLETED' AND substr(updated_at, 1, 10) <= ?2
            ORDER BY updated_at
            "#,
        )?;
        let days = stmt
            .query_map(params![user_id, until], |row| row.get::<_, DateTime<Utc>>(0))?
            .map(|r| r.map(|ts| ts.date_naive()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(days)
    }

    /// Completed tasks whose completion date falls within the range
    pub fn list_completed_between(conn: &Connection, user_id: i64, range: &DateRange) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM tasks
            WHERE user_id = ?1 AND status = 'COMPLETED'
              AND substr(updated_at, 1, 10) >= ?2 AND substr(updated_at, 1, 10) <= ?3
            ORDER BY updated_at, id
            "#,
        )?;
        let tasks = stmt
            .query_map(params![user_id, range.start, range.end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    pub fn count_completed_between(conn: &Connection, user_id: i64, range: &DateRange) -> DbResult<i64> {
        let count = conn.query_row(
            r#"
            SELECT COUNT(*) FROM tasks
            WHERE user_id = ?1 AND status = 'COMPLETED'
              AND substr(updated_at, 1, 10) >= ?2 AND substr(updated_at, 1, 10) <= ?3
            "#,
            params![user_id, range.start, range.end],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Change status and stamp `updated_at` with `at`
    pub fn set_status(
        conn: &Connection,
        id: i64,
        status: TaskStatus,
        at: DateTime<Utc>,
    ) -> DbResult<Option<Self>> {
        let rows = conn.execute(
            "UPDATE tasks SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), at, id],
        )?;
        if rows == 0 {
            return Ok(None);
        }
        Self::get_by_id(conn, id)
    }

    pub fn update(conn: &Connection, id: i64, data: &TaskUpdate) -> DbResult<Option<Self>> {
        let current = match Self::get_by_id(conn, id)? {
            Some(t) => t,
            None => return Ok(None),
        };

        // A completed task's completion day lives in updated_at; edits that
        // keep it completed must not move it.
        let status = data.status.unwrap_or(current.status);
        let updated_at = if current.status == TaskStatus::Completed && status == TaskStatus::Completed {
            current.updated_at
        } else {
            Utc::now()
        };

        conn.execute(
            r#"
            UPDATE tasks
            SET title = ?1, description = ?2, status = ?3, due_date = ?4, updated_at = ?5
            WHERE id = ?6
            "#,
            params![
                data.title.clone().unwrap_or(current.title),
                data.description.clone().or(current.description),
                status.as_str(),
                data.due_date.or(current.due_date),
                updated_at,
                id,
            ],
        )?;

        Self::get_by_id(conn, id)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM tasks WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
