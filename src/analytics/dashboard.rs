//! Dashboard overview over the trailing 30 days

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use super::calendar::WeekKey;
use super::range::DateRange;
use super::stats::{self, round2, Trend};
use crate::db::DbResult;
use crate::models::{Goal, GoalStatusCounts, Task, TaskStatus, WeightEntry, Workout};

pub const DASHBOARD_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorkoutTotals {
    pub count: usize,
    pub total_duration: i64,
    pub average_duration: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TaskTotals {
    pub total: usize,
    pub completed: usize,
    pub completion_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardTrends {
    pub weight: Trend,
    pub workouts: Trend,
    pub tasks: Trend,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub range: DateRange,
    pub latest_weight: Option<f64>,
    pub weight_change: f64,
    pub workouts: WorkoutTotals,
    pub tasks: TaskTotals,
    pub goals: GoalStatusCounts,
    pub trends: DashboardTrends,
}

/// Everything the dashboard reads, fetched for one window
#[derive(Debug, Default)]
pub struct DashboardData {
    pub weights: Vec<WeightEntry>,
    pub workouts: Vec<Workout>,
    /// Tasks created in the window
    pub tasks: Vec<Task>,
    /// Completion days of tasks completed in the window
    pub completion_days: Vec<NaiveDate>,
    pub goals: GoalStatusCounts,
}

pub fn dashboard(conn: &Connection, user_id: i64, today: NaiveDate) -> DbResult<Dashboard> {
    let range = DateRange::trailing(DASHBOARD_WINDOW_DAYS, today);
    let data = DashboardData {
        weights: WeightEntry::list_in_range(conn, user_id, &range)?,
        workouts: Workout::list_in_range(conn, user_id, &range)?,
        tasks: Task::list_in_range(conn, user_id, &range)?,
        completion_days: Task::list_completed_between(conn, user_id, &range)?
            .iter()
            .filter_map(Task::completed_on)
            .collect(),
        goals: Goal::count_by_status(conn, user_id)?,
    };
    Ok(summarize(range, data))
}

/// Compare the window's first and last Sunday-started weeks
fn weekly_trend<I>(range: &DateRange, days: I) -> Trend
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut weeks: BTreeMap<WeekKey, f64> = BTreeMap::new();
    for day in days.into_iter().filter(|d| range.contains(*d)) {
        *weeks.entry(WeekKey::of(day)).or_insert(0.0) += 1.0;
    }
    let first = weeks.get(&WeekKey::of(range.start)).copied().unwrap_or(0.0);
    let last = weeks.get(&WeekKey::of(range.end)).copied().unwrap_or(0.0);
    stats::classify_trend(first, last)
}

pub fn summarize(range: DateRange, mut data: DashboardData) -> Dashboard {
    data.weights.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    let weights: Vec<f64> = data.weights.iter().map(|e| e.weight).collect();
    let weight_change = match (weights.first(), weights.last()) {
        (Some(first), Some(last)) if weights.len() >= 2 => last - first,
        _ => 0.0,
    };

    let total_duration: i64 = data.workouts.iter().map(|w| w.duration).sum();
    let workout_count = data.workouts.len();
    let average_duration = if workout_count == 0 {
        0.0
    } else {
        total_duration as f64 / workout_count as f64
    };

    let completed = data
        .tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();

    Dashboard {
        latest_weight: weights.last().copied(),
        weight_change: round2(weight_change),
        workouts: WorkoutTotals {
            count: workout_count,
            total_duration,
            average_duration: round2(average_duration),
        },
        tasks: TaskTotals {
            total: data.tasks.len(),
            completed,
            completion_rate: round2(stats::percentage(completed as f64, data.tasks.len() as f64)),
        },
        goals: data.goals,
        trends: DashboardTrends {
            weight: stats::series_trend(&weights),
            workouts: weekly_trend(&range, data.workouts.iter().map(|w| w.date)),
            tasks: weekly_trend(&range, data.completion_days),
        },
        range,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn window() -> DateRange {
        DateRange::trailing(DASHBOARD_WINDOW_DAYS, day("2025-03-31"))
    }

    fn workout(id: i64, date: &str, duration: i64) -> Workout {
        Workout {
            id,
            user_id: 1,
            date: day(date),
            workout_type: "Running".to_string(),
            duration,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn weight(id: i64, date: &str, value: f64) -> WeightEntry {
        WeightEntry {
            id,
            user_id: 1,
            date: day(date),
            weight: value,
            note: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_no_data_is_stable_and_null() {
        let result = summarize(window(), DashboardData::default());
        assert_eq!(result.latest_weight, None);
        assert_eq!(result.weight_change, 0.0);
        assert_eq!(result.trends.weight, Trend::Stable);
        assert_eq!(result.trends.workouts, Trend::Stable);
        assert_eq!(result.trends.tasks, Trend::Stable);
        assert_eq!(result.workouts.average_duration, 0.0);
        assert_eq!(result.tasks.completion_rate, 0.0);
    }

    #[test]
    fn test_single_weight_has_no_change() {
        let data = DashboardData {
            weights: vec![weight(1, "2025-03-20", 180.0)],
            ..DashboardData::default()
        };
        let result = summarize(window(), data);
        assert_eq!(result.latest_weight, Some(180.0));
        assert_eq!(result.weight_change, 0.0);
    }

    #[test]
    fn test_weight_and_workout_trends() {
        // Window 2025-03-01..=2025-03-31; first week starts 2025-02-23,
        // last week starts 2025-03-30
        let data = DashboardData {
            weights: vec![weight(2, "2025-03-28", 178.5), weight(1, "2025-03-02", 181.0)],
            workouts: vec![
                workout(1, "2025-03-01", 30),
                workout(2, "2025-03-30", 40),
                workout(3, "2025-03-31", 50),
            ],
            ..DashboardData::default()
        };
        let result = summarize(window(), data);

        assert_eq!(result.latest_weight, Some(178.5));
        assert_eq!(result.weight_change, -2.5);
        assert_eq!(result.trends.weight, Trend::Decreasing);
        assert_eq!(result.workouts.count, 3);
        assert_eq!(result.workouts.average_duration, 40.0);
        assert_eq!(result.trends.workouts, Trend::Increasing);
    }
}
