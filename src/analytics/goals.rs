//! Goal progress
//!
//! `goal_progress` only reads. `refresh_goal_progress` recomputes each
//! goal's `current` from live data, persists it, then reports.

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use super::range::DateRange;
use super::stats::{self, round2};
use crate::db::DbResult;
use crate::models::{Goal, GoalCategory, GoalStatus, Task, WeightEntry, Workout};

/// Trailing window used for workout and task goals
pub const GOAL_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    pub id: i64,
    pub title: String,
    pub category: GoalCategory,
    pub status: GoalStatus,
    pub target: f64,
    pub current: f64,
    pub unit: String,
    pub deadline: Option<NaiveDate>,
    pub percentage: f64,
    pub is_completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgressReport {
    pub goals: Vec<GoalProgress>,
    pub total: usize,
    pub completed: usize,
}

/// `current / target` as a percentage capped at 100; 0 for a non-positive target
pub fn progress_percentage(current: f64, target: f64) -> f64 {
    stats::percentage(current, target).min(100.0)
}

pub fn progress(goal: &Goal) -> GoalProgress {
    let percentage = progress_percentage(goal.current, goal.target);
    GoalProgress {
        id: goal.id,
        title: goal.title.clone(),
        category: goal.category,
        status: goal.status,
        target: goal.target,
        current: goal.current,
        unit: goal.unit.clone(),
        deadline: goal.deadline,
        percentage: round2(percentage),
        is_completed: percentage >= 100.0,
    }
}

fn report(goals: &[Goal]) -> GoalProgressReport {
    let goals: Vec<GoalProgress> = goals.iter().map(progress).collect();
    GoalProgressReport {
        total: goals.len(),
        completed: goals.iter().filter(|g| g.is_completed).count(),
        goals,
    }
}

/// Progress from stored values, without touching the database
pub fn goal_progress(conn: &Connection, user_id: i64) -> DbResult<GoalProgressReport> {
    let goals = Goal::list(conn, user_id, None)?;
    Ok(report(&goals))
}

/// Live value for a goal; `None` leaves the stored value alone
pub fn recompute_current(conn: &Connection, goal: &Goal, today: NaiveDate) -> DbResult<Option<f64>> {
    let window = DateRange::trailing(GOAL_WINDOW_DAYS, today);
    let value = match goal.category {
        GoalCategory::Weight => WeightEntry::latest(conn, goal.user_id)?.map(|e| e.weight),
        GoalCategory::Workouts => {
            Some(Workout::count_in_range(conn, goal.user_id, &window)? as f64)
        }
        GoalCategory::Tasks => {
            Some(Task::count_completed_between(conn, goal.user_id, &window)? as f64)
        }
    };
    Ok(value)
}

/// Recompute and persist `current` for every goal of the user, then report
pub fn refresh_goal_progress(
    conn: &Connection,
    user_id: i64,
    today: NaiveDate,
) -> DbResult<GoalProgressReport> {
    let mut goals = Goal::list(conn, user_id, None)?;

    for goal in goals.iter_mut() {
        if let Some(current) = recompute_current(conn, goal, today)? {
            if current != goal.current {
                tracing::debug!(goal_id = goal.id, from = goal.current, to = current, "goal progress changed");
            }
            Goal::update_current(conn, goal.id, current)?;
            goal.current = current;
        }
    }

    tracing::info!(user_id, goals = goals.len(), "refreshed goal progress");
    Ok(report(&goals))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn goal(current: f64, target: f64) -> Goal {
        Goal {
            id: 1,
            user_id: 1,
            title: "Train".to_string(),
            description: None,
            target,
            current,
            unit: "workouts".to_string(),
            category: GoalCategory::Workouts,
            status: GoalStatus::Active,
            deadline: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_partial_progress() {
        let p = progress(&goal(4.0, 10.0));
        assert_eq!(p.percentage, 40.0);
        assert!(!p.is_completed);
    }

    #[test]
    fn test_progress_is_clamped() {
        let p = progress(&goal(12.0, 10.0));
        assert_eq!(p.percentage, 100.0);
        assert!(p.is_completed);
    }

    #[test]
    fn test_zero_target_is_zero_percent() {
        let p = progress(&goal(5.0, 0.0));
        assert_eq!(p.percentage, 0.0);
        assert!(!p.is_completed);
    }

    #[test]
    fn test_report_counts_completed() {
        let r = report(&[goal(4.0, 10.0), goal(10.0, 10.0)]);
        assert_eq!(r.total, 2);
        assert_eq!(r.completed, 1);
    }
}
