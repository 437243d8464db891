//! Runtime configuration
//!
//! FitTrack is configured entirely from the environment:
//! - `FITTRACK_DATABASE_PATH`: SQLite database file (default `<project>/data/fittrack.db`)
//! - `FITTRACK_LOG`: tracing filter directive (default `fittrack=info`)

use std::path::PathBuf;

const DATABASE_PATH_VAR: &str = "FITTRACK_DATABASE_PATH";
const LOG_FILTER_VAR: &str = "FITTRACK_LOG";
const DEFAULT_LOG_FILTER: &str = "fittrack=info";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub log_filter: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let database_path = std::env::var(DATABASE_PATH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_database_path());
        let log_filter = std::env::var(LOG_FILTER_VAR)
            .ok()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Self {
            database_path,
            log_filter,
        }
    }
}

/// `data/fittrack.db` next to the project root when running from `target/`,
/// otherwise next to the executable.
pub fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(parent) = path.parent() {
            if let Some(grandparent) = parent.parent() {
                path = grandparent.to_path_buf();
            }
        }
    }

    path.push("data");
    path.push("fittrack.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_database_path_file_name() {
        let path = default_database_path();
        assert!(path.ends_with("data/fittrack.db"));
    }
}
