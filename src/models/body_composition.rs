//! Body composition model
//!
//! Optional body-fat, muscle-mass and tape measurements taken on a day.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::analytics::DateRange;
use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BodyComposition {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub body_fat_percentage: Option<f64>,
    pub muscle_mass: Option<f64>,
    pub waist: Option<f64>,
    pub chest: Option<f64>,
    pub hips: Option<f64>,
    pub arms: Option<f64>,
    pub thighs: Option<f64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BodyCompositionCreate {
    pub user_id: i64,
    pub date: NaiveDate,
    pub body_fat_percentage: Option<f64>,
    pub muscle_mass: Option<f64>,
    pub waist: Option<f64>,
    pub chest: Option<f64>,
    pub hips: Option<f64>,
    pub arms: Option<f64>,
    pub thighs: Option<f64>,
    pub notes: Option<String>,
}

impl BodyComposition {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            body_fat_percentage: row.get("body_fat_percentage")?,
            muscle_mass: row.get("muscle_mass")?,
            waist: row.get("waist")?,
            chest: row.get("chest")?,
            hips: row.get("hips")?,
            arms: row.get("arms")?,
            thighs: row.get("thighs")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &BodyCompositionCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO body_compositions
            (user_id, date, body_fat_percentage, muscle_mass, waist, chest, hips, arms, thighs, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                data.user_id,
                data.date,
                data.body_fat_percentage,
                data.muscle_mass,
                data.waist,
                data.chest,
                data.hips,
                data.arms,
                data.thighs,
                data.notes,
                Utc::now(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM body_compositions WHERE id = ?1")?;
        match stmt.query_row([id], Self::from_row) {
            Ok(entry) => Ok(Some(entry)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_in_range(conn: &Connection, user_id: i64, range: &DateRange) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM body_compositions
            WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
            ORDER BY date, id
            "#,
        )?;
        let entries = stmt
            .query_map(params![user_id, range.start, range.end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM body_compositions WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
