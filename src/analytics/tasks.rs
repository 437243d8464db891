//! Task analytics
//!
//! Tasks are selected by creation date. Completion streaks look at every
//! completed task up to today, regardless of the selected range.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use super::calendar::{self, DayCount};
use super::range::{self, DateRange, RangeQuery};
use super::stats::{self, round2};
use crate::error::AppResult;
use crate::models::{Task, TaskStatus};

const SECONDS_PER_DAY: f64 = 86_400.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSummary {
    pub count: usize,
    pub completed: usize,
    pub pending: usize,
    pub archived: usize,
    pub completion_rate: f64,
    /// Whole days from creation to completion, averaged
    pub average_completion_days: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskRecords {
    pub most_completed_in_day: Option<DayCount>,
    pub longest_streak: u32,
    pub current_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskAnalytics {
    pub range: DateRange,
    pub summary: TaskSummary,
    pub records: TaskRecords,
}

pub fn task_analytics(
    conn: &Connection,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<TaskAnalytics> {
    let range = range::resolve(query, today)?;
    let tasks = Task::list_in_range(conn, user_id, &range)?;
    let completion_days = Task::completion_days(conn, user_id, today)?;
    tracing::debug!(user_id, count = tasks.len(), "task analytics");
    Ok(summarize(range, &tasks, completion_days, today))
}

/// Mean creation-to-completion time of completed tasks, rounded to days
fn average_completion_days(tasks: &[Task]) -> i64 {
    let seconds: Vec<f64> = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .map(|t| (t.updated_at - t.created_at).num_seconds() as f64)
        .collect();
    (stats::mean(&seconds) / SECONDS_PER_DAY).round() as i64
}

pub fn summarize(
    range: DateRange,
    tasks: &[Task],
    completion_days: Vec<NaiveDate>,
    today: NaiveDate,
) -> TaskAnalytics {
    let count_status = |status: TaskStatus| tasks.iter().filter(|t| t.status == status).count();
    let completed = count_status(TaskStatus::Completed);

    let streaks = stats::streaks(completion_days, today);

    TaskAnalytics {
        range,
        summary: TaskSummary {
            count: tasks.len(),
            completed,
            pending: count_status(TaskStatus::Pending),
            archived: count_status(TaskStatus::Archived),
            completion_rate: round2(stats::percentage(completed as f64, tasks.len() as f64)),
            average_completion_days: average_completion_days(tasks),
        },
        records: TaskRecords {
            most_completed_in_day: calendar::busiest_day(tasks.iter().filter_map(Task::completed_on)),
            longest_streak: streaks.longest,
            current_streak: streaks.current,
        },
    }
}
