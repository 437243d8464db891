//! Weight entry MCP Tools

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{self, DateRange, RangeQuery};
use crate::db::Database;
use crate::error::{AppResult, Validator};
use crate::models::{WeightEntry, WeightEntryCreate, WeightEntryUpdate};
use crate::tools::{checked_date, date_field, optional_date_field, owned, require_user, DeleteResponse};

/// Response for list_weight_entries
#[derive(Debug, Serialize)]
pub struct ListWeightEntriesResponse {
    pub range: DateRange,
    pub entries: Vec<WeightEntry>,
    pub total: usize,
}

fn check_weight(v: &mut Validator, weight: f64) {
    v.check(weight.is_finite() && weight > 0.0, "weight", "must be greater than 0");
}

pub fn add_weight_entry(
    db: &Database,
    user_id: i64,
    date: &str,
    weight: f64,
    note: Option<&str>,
) -> AppResult<WeightEntry> {
    let mut v = Validator::new();
    let date = date_field(&mut v, "date", date);
    check_weight(&mut v, weight);
    v.finish()?;

    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;

    let data = WeightEntryCreate {
        user_id,
        date: checked_date(date, "date")?,
        weight,
        note: note.map(String::from),
    };
    let entry = WeightEntry::create(&conn, &data)?;
    tracing::info!(user_id, entry_id = entry.id, weight, "added weight entry");
    Ok(entry)
}

pub fn get_weight_entry(db: &Database, user_id: i64, id: i64) -> AppResult<WeightEntry> {
    let conn = db.get_conn()?;
    owned(WeightEntry::get_by_id(&conn, id)?, user_id, id)
}

pub fn list_weight_entries(
    db: &Database,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<ListWeightEntriesResponse> {
    let range = analytics::resolve(query, today)?;
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;

    let entries = WeightEntry::list_in_range(&conn, user_id, &range)?;
    let total = entries.len();
    Ok(ListWeightEntriesResponse { range, entries, total })
}

pub fn update_weight_entry(
    db: &Database,
    user_id: i64,
    id: i64,
    date: Option<&str>,
    weight: Option<f64>,
    note: Option<&str>,
) -> AppResult<WeightEntry> {
    let mut v = Validator::new();
    let date = optional_date_field(&mut v, "date", date);
    if let Some(w) = weight {
        check_weight(&mut v, w);
    }
    v.finish()?;

    let conn = db.get_conn()?;
    owned(WeightEntry::get_by_id(&conn, id)?, user_id, id)?;

    let data = WeightEntryUpdate {
        date,
        weight,
        note: note.map(String::from),
    };
    let updated = WeightEntry::update(&conn, id, &data)?;
    owned(updated, user_id, id)
}

pub fn delete_weight_entry(db: &Database, user_id: i64, id: i64) -> AppResult<DeleteResponse> {
    let conn = db.get_conn()?;
    owned(WeightEntry::get_by_id(&conn, id)?, user_id, id)?;
    WeightEntry::delete(&conn, id)?;
    tracing::info!(user_id, entry_id = id, "deleted weight entry");
    Ok(DeleteResponse::new(id))
}
