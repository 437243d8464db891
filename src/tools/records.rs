//! Personal record MCP Tools

use serde::Serialize;

use crate::db::Database;
use crate::error::{AppResult, Validator};
use crate::models::{Exercise, PersonalRecord, PersonalRecordCreate, RecordType, Workout};
use crate::tools::{checked_date, date_field, owned, require_user, required_text, DeleteResponse};

/// Response for list_personal_records
#[derive(Debug, Serialize)]
pub struct ListPersonalRecordsResponse {
    pub records: Vec<PersonalRecord>,
    pub total: usize,
}

/// Personal record data for add_personal_record
#[derive(Debug, Clone)]
pub struct RecordEntry<'a> {
    pub exercise_id: i64,
    pub record_type: &'a str,
    pub value: f64,
    pub unit: &'a str,
    pub date: &'a str,
    pub workout_id: Option<i64>,
    pub notes: Option<&'a str>,
}

pub fn add_personal_record(
    db: &Database,
    user_id: i64,
    entry: RecordEntry<'_>,
) -> AppResult<PersonalRecord> {
    let mut v = Validator::new();
    let record_type = RecordType::from_str(entry.record_type);
    v.check(
        record_type.is_some(),
        "record_type",
        "must be one of MAX_WEIGHT, MAX_REPS, MAX_VOLUME, BEST_TIME, LONGEST_DISTANCE",
    );
    v.check(
        entry.value.is_finite() && entry.value > 0.0,
        "value",
        "must be greater than 0",
    );
    let unit = required_text(&mut v, "unit", entry.unit);
    let date = date_field(&mut v, "date", entry.date);
    v.finish()?;

    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    owned(Exercise::get_by_id(&conn, entry.exercise_id)?, user_id, entry.exercise_id)?;
    if let Some(workout_id) = entry.workout_id {
        owned(Workout::get_by_id(&conn, workout_id)?, user_id, workout_id)?;
    }

    let data = PersonalRecordCreate {
        user_id,
        exercise_id: entry.exercise_id,
        record_type: record_type.unwrap_or(RecordType::MaxWeight),
        value: entry.value,
        unit,
        date: checked_date(date, "date")?,
        workout_id: entry.workout_id,
        notes: entry.notes.map(String::from),
    };
    let record = PersonalRecord::create(&conn, &data)?;
    tracing::info!(user_id, record_id = record.id, record_type = record.record_type.as_str(), "added personal record");
    Ok(record)
}

pub fn list_personal_records(
    db: &Database,
    user_id: i64,
    exercise_id: Option<i64>,
) -> AppResult<ListPersonalRecordsResponse> {
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    if let Some(id) = exercise_id {
        owned(Exercise::get_by_id(&conn, id)?, user_id, id)?;
    }

    let records = PersonalRecord::list(&conn, user_id, exercise_id)?;
    let total = records.len();
    Ok(ListPersonalRecordsResponse { records, total })
}

pub fn delete_personal_record(db: &Database, user_id: i64, id: i64) -> AppResult<DeleteResponse> {
    let conn = db.get_conn()?;
    owned(PersonalRecord::get_by_id(&conn, id)?, user_id, id)?;
    PersonalRecord::delete(&conn, id)?;
    Ok(DeleteResponse::new(id))
}
