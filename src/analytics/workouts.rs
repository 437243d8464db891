//! Workout analytics
//!
//! Two views over the same records: the basic summary with streaks and
//! records, and the enhanced breakdown by day, week, type and weekday.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use serde::Serialize;

use super::calendar::{self, DayCount, WeekKey, WEEKDAYS};
use super::range::{self, DateRange, RangeQuery};
use super::stats::{self, round2};
use crate::error::AppResult;
use crate::models::Workout;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutSummary {
    pub count: usize,
    pub total_duration: i64,
    pub average_duration: f64,
    pub by_type: BTreeMap<String, usize>,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutPoint {
    pub date: NaiveDate,
    pub workout_type: String,
    pub duration: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LongestWorkout {
    pub duration: i64,
    pub date: NaiveDate,
    pub workout_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutRecords {
    pub longest_workout: Option<LongestWorkout>,
    pub most_workouts_in_day: Option<DayCount>,
    pub current_streak: u32,
    pub longest_streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutAnalytics {
    pub range: DateRange,
    pub summary: WorkoutSummary,
    pub series: Vec<WorkoutPoint>,
    pub records: WorkoutRecords,
}

/// Workouts and minutes for one day or week
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DailyFrequency {
    pub date: NaiveDate,
    pub count: usize,
    pub total_duration: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeeklyFrequency {
    pub week_start: WeekKey,
    pub count: usize,
    pub total_duration: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeBreakdown {
    pub workout_type: String,
    pub count: usize,
    pub total_duration: i64,
    pub average_duration: f64,
    pub longest: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WeekdayCount {
    pub weekday: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnhancedWorkoutAnalytics {
    pub range: DateRange,
    pub total_workouts: usize,
    pub daily: Vec<DailyFrequency>,
    pub weekly: Vec<WeeklyFrequency>,
    pub by_type: Vec<TypeBreakdown>,
    pub by_weekday: Vec<WeekdayCount>,
}

pub fn workout_analytics(
    conn: &Connection,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<WorkoutAnalytics> {
    let range = range::resolve(query, today)?;
    let workouts = Workout::list_in_range(conn, user_id, &range)?;
    tracing::debug!(user_id, count = workouts.len(), "workout analytics");
    Ok(summarize(range, workouts, today))
}

pub fn enhanced_workout_analytics(
    conn: &Connection,
    user_id: i64,
    query: &RangeQuery<'_>,
    today: NaiveDate,
) -> AppResult<EnhancedWorkoutAnalytics> {
    let range = range::resolve(query, today)?;
    let workouts = Workout::list_in_range(conn, user_id, &range)?;
    Ok(breakdown(range, workouts))
}

fn sort_chronologically(workouts: &mut [Workout]) {
    workouts.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));
}

pub fn summarize(range: DateRange, mut workouts: Vec<Workout>, today: NaiveDate) -> WorkoutAnalytics {
    sort_chronologically(&mut workouts);

    let total_duration: i64 = workouts.iter().map(|w| w.duration).sum();
    let durations: Vec<f64> = workouts.iter().map(|w| w.duration as f64).collect();

    let mut by_type = BTreeMap::new();
    for w in &workouts {
        *by_type.entry(w.workout_type.clone()).or_insert(0) += 1;
    }

    let streaks = stats::streaks(workouts.iter().map(|w| w.date), today);

    // Earliest workout wins a tie on duration
    let longest_workout = workouts
        .iter()
        .fold(None::<&Workout>, |best, w| match best {
            Some(b) if b.duration >= w.duration => Some(b),
            _ => Some(w),
        })
        .map(|w| LongestWorkout {
            duration: w.duration,
            date: w.date,
            workout_type: w.workout_type.clone(),
        });

    WorkoutAnalytics {
        range,
        summary: WorkoutSummary {
            count: workouts.len(),
            total_duration,
            average_duration: round2(stats::mean(&durations)),
            by_type,
            current_streak: streaks.current,
            longest_streak: streaks.longest,
        },
        records: WorkoutRecords {
            longest_workout,
            most_workouts_in_day: calendar::busiest_day(workouts.iter().map(|w| w.date)),
            current_streak: streaks.current,
            longest_streak: streaks.longest,
        },
        series: workouts
            .into_iter()
            .map(|w| WorkoutPoint {
                date: w.date,
                workout_type: w.workout_type,
                duration: w.duration,
                notes: w.notes,
            })
            .collect(),
    }
}

pub fn breakdown(range: DateRange, mut workouts: Vec<Workout>) -> EnhancedWorkoutAnalytics {
    sort_chronologically(&mut workouts);

    let mut daily: BTreeMap<NaiveDate, (usize, i64)> = BTreeMap::new();
    let mut weekly: BTreeMap<WeekKey, (usize, i64)> = BTreeMap::new();
    let mut types: BTreeMap<&str, Vec<i64>> = BTreeMap::new();
    let mut weekdays = [0usize; 7];

    for w in &workouts {
        let day = daily.entry(w.date).or_default();
        day.0 += 1;
        day.1 += w.duration;

        let week = weekly.entry(WeekKey::of(w.date)).or_default();
        week.0 += 1;
        week.1 += w.duration;

        types.entry(w.workout_type.as_str()).or_default().push(w.duration);
        weekdays[w.date.weekday().num_days_from_sunday() as usize] += 1;
    }

    let mut by_type: Vec<TypeBreakdown> = types
        .into_iter()
        .map(|(workout_type, durations)| {
            let total: i64 = durations.iter().sum();
            TypeBreakdown {
                workout_type: workout_type.to_string(),
                count: durations.len(),
                total_duration: total,
                average_duration: round2(total as f64 / durations.len() as f64),
                longest: durations.iter().copied().max().unwrap_or(0),
            }
        })
        .collect();
    // Stable sort keeps alphabetical order among equal counts
    by_type.sort_by(|a, b| b.count.cmp(&a.count));

    EnhancedWorkoutAnalytics {
        range,
        total_workouts: workouts.len(),
        daily: daily
            .into_iter()
            .map(|(date, (count, total_duration))| DailyFrequency {
                date,
                count,
                total_duration,
            })
            .collect(),
        weekly: weekly
            .into_iter()
            .map(|(week_start, (count, total_duration))| WeeklyFrequency {
                week_start,
                count,
                total_duration,
            })
            .collect(),
        by_type,
        by_weekday: WEEKDAYS
            .iter()
            .zip(weekdays)
            .map(|(wd, count)| WeekdayCount {
                weekday: calendar::weekday_name(*wd),
                count,
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn workout(id: i64, date: &str, workout_type: &str, duration: i64) -> Workout {
        Workout {
            id,
            user_id: 1,
            date: day(date),
            workout_type: workout_type.to_string(),
            duration,
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn range() -> DateRange {
        DateRange::new(day("2025-03-01"), day("2025-03-10"))
    }

    #[test]
    fn test_empty_workouts_zero_shape() {
        let result = summarize(range(), Vec::new(), day("2025-03-10"));
        assert_eq!(result.summary.count, 0);
        assert_eq!(result.summary.average_duration, 0.0);
        assert!(result.summary.by_type.is_empty());
        assert_eq!(result.records.longest_workout, None);
        assert_eq!(result.records.most_workouts_in_day, None);
        assert_eq!(result.records.current_streak, 0);
    }

    #[test]
    fn test_summary_and_streaks() {
        let today = day("2025-03-10");
        let workouts = vec![
            workout(1, "2025-03-10", "Running", 30),
            workout(2, "2025-03-09", "Strength", 45),
            workout(3, "2025-03-08", "Running", 20),
            workout(4, "2025-03-08", "Yoga", 60),
            workout(5, "2025-03-05", "Running", 25),
        ];
        let result = summarize(range(), workouts, today);

        assert_eq!(result.summary.count, 5);
        assert_eq!(result.summary.total_duration, 180);
        assert_eq!(result.summary.average_duration, 36.0);
        assert_eq!(result.summary.by_type.get("Running"), Some(&3));
        assert_eq!(result.summary.current_streak, 3);
        assert_eq!(result.summary.longest_streak, 3);
        assert_eq!(
            result.records.longest_workout,
            Some(LongestWorkout {
                duration: 60,
                date: day("2025-03-08"),
                workout_type: "Yoga".to_string(),
            })
        );
        assert_eq!(
            result.records.most_workouts_in_day,
            Some(DayCount { count: 2, date: day("2025-03-08") })
        );
        assert_eq!(result.series[0].date, day("2025-03-05"));
    }

    #[test]
    fn test_breakdown_groups_by_day_week_and_type() {
        // 2025-03-08 is a Saturday, 2025-03-09 a Sunday
        let workouts = vec![
            workout(1, "2025-03-09", "Running", 30),
            workout(2, "2025-03-08", "Running", 40),
            workout(3, "2025-03-08", "Yoga", 60),
        ];
        let result = breakdown(range(), workouts);

        assert_eq!(result.total_workouts, 3);
        assert_eq!(result.daily.len(), 2);
        assert_eq!(result.daily[0], DailyFrequency { date: day("2025-03-08"), count: 2, total_duration: 100 });

        assert_eq!(result.weekly.len(), 2);
        assert_eq!(result.weekly[0].week_start.start(), day("2025-03-02"));
        assert_eq!(result.weekly[1].week_start.start(), day("2025-03-09"));
        assert_eq!(result.weekly[1].count, 1);

        assert_eq!(result.by_type[0].workout_type, "Running");
        assert_eq!(result.by_type[0].count, 2);
        assert_eq!(result.by_type[0].average_duration, 35.0);
        assert_eq!(result.by_type[0].longest, 40);

        assert_eq!(result.by_weekday.len(), 7);
        assert_eq!(result.by_weekday[0], WeekdayCount { weekday: "Sunday", count: 1 });
        assert_eq!(result.by_weekday[6], WeekdayCount { weekday: "Saturday", count: 2 });
    }
}
