//! Consistency analytics
//!
//! One calendar entry for every day of the range, active or not.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rusqlite::Connection;
use serde::Serialize;

use super::calendar::{self, WeekKey};
use super::range::{self, DateRange, RangeQuery};
use super::stats::{self, round2};
use crate::error::AppResult;
use crate::models::Workout;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub active: bool,
    pub workout_count: usize,
    pub total_duration: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeeklyActivity {
    pub week_start: WeekKey,
    pub active_days: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConsistencyAnalytics {
    pub range: DateRange,
    pub calendar: Vec<CalendarDay>,
    pub active_days: usize,
    pub total_days: usize,
    pub consistency_rate: f64,
    pub weekly: Vec<WeeklyActivity>,
    pub current_streak: u32,
    pub longest_streak: u32,
}

pub fn consistency_analytics(
    conn: &Connection,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<ConsistencyAnalytics> {
    let mut range = range::resolve(query, today)?;
    if query.is_all() {
        // A calendar from 1970 is useless; start at the first workout
        range.start = Workout::earliest_date(conn, user_id)?
            .unwrap_or(today)
            .min(range.end);
    }
    let workouts = Workout::list_in_range(conn, user_id, &range)?;
    Ok(summarize(range, &workouts, today))
}

pub fn summarize(range: DateRange, workouts: &[Workout], today: NaiveDate) -> ConsistencyAnalytics {
    let mut by_day: BTreeMap<NaiveDate, (usize, i64)> = BTreeMap::new();
    for w in workouts.iter().filter(|w| range.contains(w.date)) {
        let entry = by_day.entry(w.date).or_default();
        entry.0 += 1;
        entry.1 += w.duration;
    }

    let calendar: Vec<CalendarDay> = calendar::days_between(range.start, range.end)
        .map(|date| {
            let (workout_count, total_duration) = by_day.get(&date).copied().unwrap_or_default();
            CalendarDay {
                date,
                active: workout_count > 0,
                workout_count,
                total_duration,
            }
        })
        .collect();

    let mut weekly: BTreeMap<WeekKey, usize> = BTreeMap::new();
    for day in &calendar {
        let week = weekly.entry(WeekKey::of(day.date)).or_insert(0);
        if day.active {
            *week += 1;
        }
    }

    let active_days = by_day.len();
    let total_days = calendar.len();
    let streaks = stats::streaks(by_day.keys().copied(), today);

    ConsistencyAnalytics {
        range,
        active_days,
        total_days,
        consistency_rate: round2(stats::percentage(active_days as f64, total_days as f64)),
        weekly: weekly
            .into_iter()
            .map(|(week_start, active_days)| WeeklyActivity { week_start, active_days })
            .collect(),
        current_streak: streaks.current,
        longest_streak: streaks.longest,
        calendar,
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn workout(id: i64, date: &str, duration: i64) -> Workout {
        Workout {
            id,
            user_id: 1,
            date: day(date),
            workout_type: "Cycling".to_string(),
            duration,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_seven_day_window_with_two_active_days() {
        let range = DateRange::new(day("2025-03-01"), day("2025-03-07"));
        let workouts = vec![workout(1, "2025-03-01", 30), workout(2, "2025-03-05", 45)];
        let result = summarize(range, &workouts, day("2025-03-07"));

        assert_eq!(result.calendar.len(), 7);
        assert_eq!(result.calendar.iter().filter(|d| d.active).count(), 2);
        assert_eq!(result.active_days, 2);
        assert_eq!(result.total_days, 7);
        assert_eq!(result.consistency_rate, 28.57);
        assert!(!result.calendar[1].active);
        assert_eq!(result.calendar[1].workout_count, 0);
        assert_eq!(result.calendar[4].total_duration, 45);
        assert_eq!(result.current_streak, 0);
        assert_eq!(result.longest_streak, 1);
    }

    #[test]
    fn test_weekly_counts_active_days_not_workouts() {
        // 2025-03-01 is a Saturday; the 2nd starts a new week
        let range = DateRange::new(day("2025-03-01"), day("2025-03-04"));
        let workouts = vec![
            workout(1, "2025-03-02", 30),
            workout(2, "2025-03-02", 20),
            workout(3, "2025-03-03", 40),
        ];
        let result = summarize(range, &workouts, day("2025-03-04"));

        assert_eq!(result.weekly.len(), 2);
        assert_eq!(result.weekly[0].active_days, 0);
        assert_eq!(result.weekly[1].week_start.start(), day("2025-03-02"));
        assert_eq!(result.weekly[1].active_days, 2);
        assert_eq!(result.calendar[1].workout_count, 2);
        assert_eq!(result.current_streak, 2);
    }

    #[test]
    fn test_empty_range_has_all_inactive_days() {
        let range = DateRange::new(day("2025-03-01"), day("2025-03-03"));
        let result = summarize(range, &[], day("2025-03-03"));
        assert_eq!(result.calendar.len(), 3);
        assert_eq!(result.active_days, 0);
        assert_eq!(result.consistency_rate, 0.0);
    }
}
