//! Progress photo metadata
//!
//! Only the path and tags are stored; image bytes stay wherever the client
//! put them.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::analytics::DateRange;
use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhotoType {
    Front,
    Side,
    Back,
    Other,
}

impl PhotoType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PhotoType::Front => "FRONT",
            PhotoType::Side => "SIDE",
            PhotoType::Back => "BACK",
            PhotoType::Other => "OTHER",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "FRONT" => Some(PhotoType::Front),
            "SIDE" => Some(PhotoType::Side),
            "BACK" => Some(PhotoType::Back),
            "OTHER" => Some(PhotoType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressPhoto {
    pub id: i64,
    pub user_id: i64,
    pub date: NaiveDate,
    pub image_path: String,
    pub photo_type: PhotoType,
    pub caption: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressPhotoCreate {
    pub user_id: i64,
    pub date: NaiveDate,
    pub image_path: String,
    pub photo_type: PhotoType,
    pub caption: Option<String>,
}

impl ProgressPhoto {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let photo_type: String = row.get("photo_type")?;
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            date: row.get("date")?,
            image_path: row.get("image_path")?,
            photo_type: PhotoType::from_str(&photo_type).unwrap_or(PhotoType::Other),
            caption: row.get("caption")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &ProgressPhotoCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO progress_photos (user_id, date, image_path, photo_type, caption, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                data.user_id,
                data.date,
                data.image_path,
                data.photo_type.as_str(),
                data.caption,
                Utc::now(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM progress_photos WHERE id = ?1")?;
        match stmt.query_row([id], Self::from_row) {
            Ok(photo) => Ok(Some(photo)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_in_range(conn: &Connection, user_id: i64, range: &DateRange) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM progress_photos
            WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
            ORDER BY date, id
            "#,
        )?;
        let photos = stmt
            .query_map(params![user_id, range.start, range.end], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(photos)
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM progress_photos WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}
