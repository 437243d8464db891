//! FitTrack Status Tool
//!
//! Provides runtime status information about the FitTrack service.

use serde::Serialize;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::db::migrations::SCHEMA_VERSION;
use crate::db::Database;

/// Usage guide for AI assistants
pub const TRACKING_INSTRUCTIONS: &str = r#"
# FitTrack Instructions

FitTrack stores weight entries, workouts, exercises, tasks and goals for one
or more users and computes analytics over them.

## Users

Every tool takes a `user_id`. Register once with `register_user`, then use
`list_users` to look the id up later. Records belonging to another user are
reported as not found.

## Logging

- **Weight:** `add_weight_entry` with a date (YYYY-MM-DD) and a positive weight.
  Several readings on one day are allowed.
- **Workouts:** `add_workout` with a date, a free-text type ("Running",
  "Strength") and a duration in minutes.
- **Exercises:** create catalogue entries once with `create_exercise`
  (category STRENGTH, CARDIO, FLEXIBILITY, BALANCE, SPORTS or OTHER, plus
  muscle groups). Names are unique per user.
- **Sets:** `add_workout_exercise` attaches an exercise to a workout. When the
  weight beats the best MAX_WEIGHT record for that exercise, a new personal
  record is created automatically.
- **Templates:** `create_template` saves a reusable exercise list;
  `start_workout_from_template` creates a workout from it.
- **Tasks:** `create_task`, then `complete_task` when done. The completion
  day is the day the task was completed.
- **Goals:** `create_goal` with a category (WEIGHT, WORKOUTS, TASKS), a
  target and a unit.

## Analytics

All analytics tools accept `range` (7, 30, 90, 365 or all; default 30) or an
explicit `start_date` + `end_date` pair, which wins when both are given.

| Tool | What it returns |
|------|-----------------|
| weight_analytics | summary, series, 7/30 entry moving averages, trend line, records |
| workout_analytics | summary by type, series, streaks, longest workout |
| enhanced_workout_analytics | daily, weekly, per-type and weekday breakdowns |
| task_analytics | completion rate, average days to complete, streaks |
| exercise_analytics | sets, volume, category and muscle-group distributions, top exercises |
| consistency_analytics | one calendar entry per day, consistency rate, weekly activity |
| dashboard | last 30 days at a glance |

## Goals

- `goal_progress` reports progress from stored values and never writes.
- `refresh_goal_progress` recomputes current values first:
  - WEIGHT: latest weight entry
  - WORKOUTS: workouts in the last 30 days
  - TASKS: tasks completed in the last 30 days

Percentages are capped at 100.

## Streaks

A streak counts consecutive days with activity ending today. If nothing has
been logged today yet, the streak still counts back from yesterday.

## Reports

`generate_weight_report` writes a PDF with a summary, a table of entries and
a chart of weight with its 7-entry moving average.
"#;

/// Runtime status of the FitTrack service
#[derive(Debug, Clone, Serialize)]
pub struct FitTrackStatus {
    /// Build information
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    /// Database information
    pub database_path: String,
    pub database_size_bytes: Option<u64>,
    pub schema_version: i32,
    pub expected_schema_version: i32,

    /// Process information
    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTracker {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Get the current status
    pub fn get_status(&self, db: &Database) -> FitTrackStatus {
        let build_info = BuildInfo::current();

        // A broken pool shows up as schema version 0 rather than failing the call
        let schema_version = db.schema_version().unwrap_or_else(|e| {
                tracing::warn!(error = %e, "could not read schema version");
                0
            });

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        FitTrackStatus {
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: db.path().display().to_string(),
            database_size_bytes: db.file_size(),
            schema_version,
            expected_schema_version: SCHEMA_VERSION,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reads_schema_and_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = Database::open_and_migrate(dir.path().join("fittrack.db")).unwrap();

        let status = StatusTracker::new().get_status(&db);
        assert_eq!(status.schema_version, SCHEMA_VERSION);
        assert_eq!(status.expected_schema_version, SCHEMA_VERSION);
        assert!(status.database_path.ends_with("fittrack.db"));
        assert!(status.database_size_bytes.is_some());
        assert_eq!(status.process_id, std::process::id());
    }
}
