//! Weight entry model
//!
//! Body-weight readings, one calendar day each. Several readings may share a
//! day; analytics treats them as separate points in date order.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::analytics::DateRange;
use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub weight: f64,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightEntryCreate {
    pub user_id: i64,
    pub date: NaiveDate,
    pub weight: f64,
    pub note: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightEntryUpdate {
    pub date: Option<NaiveDate>,
    pub weight: Option<f64>,
    pub note: Option<String>,
}

impl WeightEntry {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            weight: row.get("weight")?,
            note: row.get("note")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &WeightEntryCreate) -> DbResult<Self> {
        let now = Utc::now();
        conn.execute(
            r#"
            INSERT INTO weight_entries (user_id, date, weight, note, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?5)
            "#,
            params![data.user_id, data.date, data.weight, data.note, now],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM weight_entries WHERE id = ?1")?;
        match stmt.query_row([id], Self::from_row) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Entries dated within the range, oldest first
    pub fn list_in_range(conn: &Connection, user_id: i64, range: &DateRange) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM weight_entries
            WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
            ORDER BY date, id
            "#,
        )?;
        let entries = stmt
            .query_map(params![user_id, range.start, range.end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Most recent entry by date
    pub fn latest(conn: &Connection, user_id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM weight_entries WHERE user_id = ?1 ORDER BY date DESC, id DESC LIMIT 1",
        )?;
        match stmt.query_row([user_id], Self::from_row) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn update(conn: &Connection, id: i64, data: &WeightEntryUpdate) -> DbResult<Option<Self>> {
        let current = match Self::get_by_id(conn, id)? {
            Some(entry) => entry,
            None => return Ok(None),
        };

        conn.execute(
            r#"
            UPDATE weight_entries
            SET date = ?1, weight = ?2, note = ?3, updated_at = ?4
            WHERE id = ?5
            "#,
            params![
                data.date.unwrap_or(current.date),
                data.weight.unwrap_or(current.weight),
                data.note.clone().or(current.note),
                Utc::now(),
                id,
            ],
        )?;

        Self::get_by_id(conn, id)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM weight_entries WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
