//! Error types for FitTrack operations
//!
//! `AppError` is what every tool returns. The MCP boundary turns it into a
//! protocol error; internal variants are logged there and never echoed back.

use serde::Serialize;
use thiserror::Error;

use crate::db::DbError;

/// A single field-level validation problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub field: String,
    pub message: String,
}

impl FieldIssue {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {}", format_issues(.0))]
    Validation(Vec<FieldIssue>),

    #[error("{resource} not found with id: {id}")]
    NotFound { resource: &'static str, id: i64 },

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] DbError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("report error: {0}")]
    Report(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    /// Validation failure on a single field
    pub fn invalid(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldIssue::new(field, message)])
    }

    pub fn not_found(resource: &'static str, id: i64) -> Self {
        AppError::NotFound { resource, id }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Database(DbError::Sqlite(e))
    }
}

fn format_issues(issues: &[FieldIssue]) -> String {
    issues
        .iter()
        .map(|i| format!("{}: {}", i.field, i.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Collects field issues so a request reports all of its problems at once
#[derive(Debug, Default)]
pub struct Validator {
    issues: Vec<FieldIssue>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue for `field` unless `ok` holds
    pub fn check(&mut self, ok: bool, field: &str, message: &str) -> &mut Self {
        if !ok {
            self.issues.push(FieldIssue::new(field, message));
        }
        self
    }

    pub fn push(&mut self, field: &str, message: impl Into<String>) -> &mut Self {
        self.issues.push(FieldIssue::new(field, message));
        self
    }

    pub fn finish(&mut self) -> AppResult<()> {
        if self.issues.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(std::mem::take(&mut self.issues)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validator_collects_all_issues() {
        let err = Validator::new()
            .check(false, "weight", "must be positive")
            .check(true, "date", "unused")
            .check(false, "duration", "must be positive")
            .finish()
            .unwrap_err();

        match err {
            AppError::Validation(issues) => {
                assert_eq!(issues.len(), 2);
                assert_eq!(issues[0].field, "weight");
                assert_eq!(issues[1].field, "duration");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validation_display_lists_fields() {
        let err = AppError::invalid("range", "unknown token");
        assert_eq!(err.to_string(), "validation failed: range: unknown token");
    }

    #[test]
    fn test_sqlite_errors_convert_to_database() {
        let err: AppError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, AppError::Database(DbError::Sqlite(_))));
    }
}
