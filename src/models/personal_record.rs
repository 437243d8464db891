//! Personal record model

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::analytics::DateRange;
use crate::db::{DbError, DbResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecordType {
    MaxWeight,
    MaxReps,
    MaxVolume,
    BestTime,
    LongestDistance,
}

impl RecordType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordType::MaxWeight => "MAX_WEIGHT",
            RecordType::MaxReps => "MAX_REPS",
            RecordType::MaxVolume => "MAX_VOLUME",
            RecordType::BestTime => "BEST_TIME",
            RecordType::LongestDistance => "LONGEST_DISTANCE",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().replace([' ', '-'], "_").as_str() {
            "MAX_WEIGHT" => Some(RecordType::MaxWeight),
            "MAX_REPS" => Some(RecordType::MaxReps),
            "MAX_VOLUME" => Some(RecordType::MaxVolume),
            "BEST_TIME" => Some(RecordType::BestTime),
            "LONGEST_DISTANCE" => Some(RecordType::LongestDistance),
            _ => None,
        }
    }

    /// Best time is the only record where smaller wins
    pub fn lower_is_better(&self) -> bool {
        matches!(self, RecordType::BestTime)
    }

    /// Whether `candidate` beats `current` for this record type
    pub fn beats(&self, candidate: f64, current: f64) -> bool {
        if self.lower_is_better() {
            candidate < current
        } else {
            candidate > current
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub id: i64,
    pub user_id: i64,
    pub exercise_id: i64,
    pub record_type: RecordType,
    pub value: f64,
    pub unit: String,
    pub date: NaiveDate,
    pub workout_id: Option<i64>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalRecordCreate {
    pub user_id: i64,
    pub exercise_id: i64,
    pub record_type: RecordType,
    pub value: f64,
    pub unit: String,
    pub date: NaiveDate,
    pub workout_id: Option<i64>,
    pub notes: Option<String>,
}

impl PersonalRecord {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let record_type: String = row.get("record_type")?;
        Ok(Self {
            id: row.get("id")?,
            user_id: row.get("user_id")?,
            exercise_id: row.get("exercise_id")?,
            record_type: RecordType::from_str(&record_type).unwrap_or(RecordType::MaxWeight),
            value: row.get("value")?,
            unit: row.get("unit")?,
            date: row.get("date")?,
            workout_id: row.get("workout_id")?,
            notes: row.get("notes")?,
            created_at: row.get("created_at")?,
        })
    }

    pub fn create(conn: &Connection, data: &PersonalRecordCreate) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO personal_records
            (user_id, exercise_id, record_type, value, unit, date, workout_id, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                data.user_id,
                data.exercise_id,
                data.record_type.as_str(),
                data.value,
                data.unit,
                data.date,
                data.workout_id,
                data.notes,
                Utc::now(),
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?
            .ok_or(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows))
    }

    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM personal_records WHERE id = ?1")?;
        match stmt.query_row([id], Self::from_row) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Records for a user, newest first, optionally for one exercise
    pub fn list(conn: &Connection, user_id: i64, exercise_id: Option<i64>) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT * FROM personal_records
            WHERE user_id = ?1 AND (?2 IS NULL OR exercise_id = ?2)
            ORDER BY date DESC, id DESC
            "#,
        )?;
        let records = stmt
            .query_map(params![user_id, exercise_id], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(records)
    }

    /// The standing record of a type for one exercise
    pub fn best(
        conn: &Connection,
        user_id: i64,
        exercise_id: i64,
        record_type: RecordType,
    ) -> DbResult<Option<Self>> {
        let order = if record_type.lower_is_better() { "ASC" } else { "DESC" };
        let sql = format!(
            "SELECT * FROM personal_records
             WHERE user_id = ?1 AND exercise_id = ?2 AND record_type = ?3
             ORDER BY value {order}, date ASC LIMIT 1"
        );
        let mut stmt = conn.prepare(&sql)?;
        match stmt.query_row(
            params![user_id, exercise_id, record_type.as_str()],
            Self::from_row,
        ) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Number of records per type set within the range
    pub fn count_by_type(
        conn: &Connection,
        user_id: i64,
        range: &DateRange,
    ) -> DbResult<Vec<(RecordType, i64)>> {
        let mut stmt = conn.prepare(
            r#"
            SELECT record_type, COUNT(*) FROM personal_records
            WHERE user_id = ?1 AND date >= ?2 AND date <= ?3
            GROUP BY record_type
            ORDER BY record_type
            "#,
        )?;
        let rows = stmt
            .query_map(params![user_id, range.start, range.end], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(rows
            .into_iter()
            .filter_map(|(t, n)| RecordType::from_str(&t).map(|t| (t, n)))
            .collect())
    }

    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM personal_records WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_best_time_prefers_lower_values() {
        assert!(RecordType::BestTime.beats(58.0, 60.0));
        assert!(!RecordType::BestTime.beats(61.0, 60.0));
        assert!(RecordType::MaxWeight.beats(105.0, 100.0));
        assert!(!RecordType::MaxWeight.beats(100.0, 100.0));
    }

    #[test]
    fn test_record_type_parsing() {
        assert_eq!(RecordType::from_str("max weight"), Some(RecordType::MaxWeight));
        assert_eq!(RecordType::from_str("best-time"), Some(RecordType::BestTime));
        assert_eq!(RecordType::from_str("fastest"), None);
    }
}
