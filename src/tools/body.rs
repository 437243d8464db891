//! Body tracking MCP Tools
//!
//! Body composition measurements and progress photo references.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analytics::{self, DateRange, RangeQuery};
use crate::db::Database;
use crate::error::{AppResult, Validator};
use crate::models::{
    BodyComposition, BodyCompositionCreate, PhotoType, ProgressPhoto, ProgressPhotoCreate,
};
use crate::tools::{checked_date, date_field, owned, require_user, required_text, DeleteResponse};

// ============================================================================
// Response Structs
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ListBodyCompositionsResponse {
    pub range: DateRange,
    pub measurements: Vec<BodyComposition>,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct ListProgressPhotosResponse {
    pub range: DateRange,
    pub photos: Vec<ProgressPhoto>,
    pub total: usize,
}

/// Measurements for add_body_composition; at least one must be set
#[derive(Debug, Clone, Default)]
pub struct Measurements {
    pub body_fat_percentage: Option<f64>,
    pub muscle_mass: Option<f64>,
    pub waist: Option<f64>,
    pub chest: Option<f64>,
    pub hips: Option<f64>,
    pub arms: Option<f64>,
    pub thighs: Option<f64>,
}

impl Measurements {
    fn any(&self) -> bool {
        [
            self.body_fat_percentage,
            self.muscle_mass,
            self.waist,
            self.chest,
            self.hips,
            self.arms,
            self.thighs,
        ]
        .iter()
        .any(Option::is_some)
    }
}

// ============================================================================
// Body Composition Tool Functions
// ============================================================================

fn check_positive(v: &mut Validator, field: &str, value: Option<f64>) {
    v.check(
        value.map_or(true, |x| x.is_finite() && x > 0.0),
        field,
        "must be greater than 0",
    );
}

pub fn add_body_composition(
    db: &Database,
    user_id: i64,
    date: &str,
    m: Measurements,
    notes: Option<&str>,
) -> AppResult<BodyComposition> {
    let mut v = Validator::new();
    let date = date_field(&mut v, "date", date);
    v.check(
        m.body_fat_percentage.map_or(true, |p| (0.0..=100.0).contains(&p)),
        "body_fat_percentage",
        "must be between 0 and 100",
    );
    check_positive(&mut v, "muscle_mass", m.muscle_mass);
    check_positive(&mut v, "waist", m.waist);
    check_positive(&mut v, "chest", m.chest);
    check_positive(&mut v, "hips", m.hips);
    check_positive(&mut v, "arms", m.arms);
    check_positive(&mut v, "thighs", m.thighs);
    v.check(m.any(), "measurements", "at least one measurement is required");
    v.finish()?;

    let data = BodyCompositionCreate {
        user_id,
        date: checked_date(date, "date")?,
        body_fat_percentage: m.body_fat_percentage,
        muscle_mass: m.muscle_mass,
        waist: m.waist,
        chest: m.chest,
        hips: m.hips,
        arms: m.arms,
        thighs: m.thighs,
        notes: notes.map(String::from),
    };

    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;
    let record = BodyComposition::create(&conn, &data)?;
    tracing::info!(user_id, body_composition_id = record.id, "added body composition");
    Ok(record)
}

pub fn list_body_compositions(
    db: &Database,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<ListBodyCompositionsResponse> {
    let range = analytics::resolve(query, today)?;
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;

    let measurements = BodyComposition::list_in_range(&conn, user_id, &range)?;
    let total = measurements.len();
    Ok(ListBodyCompositionsResponse { range, measurements, total })
}

pub fn delete_body_composition(db: &Database, user_id: i64, id: i64) -> AppResult<DeleteResponse> {
    let conn = db.get_conn()?;
    owned(BodyComposition::get_by_id(&conn, id)?, user_id, id)?;
    BodyComposition::delete(&conn, id)?;
    Ok(DeleteResponse::new(id))
}

// ============================================================================
// Progress Photo Tool Functions
// ============================================================================

pub fn add_progress_photo(
    db: &Database,
    user_id: i64,
    date: &str,
    image_path: &str,
    photo_type: Option<&str>,
    caption: Option<&str>,
) -> AppResult<ProgressPhoto> {
    let mut v = Validator::new();
    let date = date_field(&mut v, "date", date);
    let image_path = required_text(&mut v, "image_path", image_path);
    let photo_type = match photo_type {
        Some(s) => {
            let parsed = PhotoType::from_str(s);
            v.check(parsed.is_some(), "photo_type", "must be one of FRONT, SIDE, BACK, OTHER");
            parsed
        }
        None => Some(PhotoType::Front),
    };
    v.finish()?;

    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;

    let data = ProgressPhotoCreate {
        user_id,
        date: checked_date(date, "date")?,
        image_path,
        photo_type: photo_type.unwrap_or(PhotoType::Front),
        caption: caption.map(String::from),
    };
    let photo = ProgressPhoto::create(&conn, &data)?;
    tracing::info!(user_id, photo_id = photo.id, "added progress photo");
    Ok(photo)
}

pub fn list_progress_photos(
    db: &Database,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<ListProgressPhotosResponse> {
    let range = analytics::resolve(query, today)?;
    let conn = db.get_conn()?;
    require_user(&conn, user_id)?;

    let photos = ProgressPhoto::list_in_range(&conn, user_id, &range)?;
    let total = photos.len();
    Ok(ListProgressPhotosResponse { range, photos, total })
}

pub fn delete_progress_photo(db: &Database, user_id: i64, id: i64) -> AppResult<DeleteResponse> {
    let conn = db.get_conn()?;
    owned(ProgressPhoto::get_by_id(&conn, id)?, user_id, id)?;
    ProgressPhoto::delete(&conn, id)?;
    Ok(DeleteResponse::new(id))
}
