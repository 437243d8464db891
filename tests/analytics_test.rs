//! End-to-end analytics over a seeded database

use chrono::{Duration, NaiveDate};
use tempfile::TempDir;

use fittrack::analytics::stats::Trend;
use fittrack::analytics::RangeQuery;
use fittrack::db::Database;
use fittrack::error::AppError;
use fittrack::tools::workouts::ExerciseEntry;
use fittrack::tools::{analytics, exercises, tasks, today, users, weights, workouts};

struct Fixture {
    _dir: TempDir,
    db: Database,
    user_id: i64,
    today: NaiveDate,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let db = Database::open_and_migrate(dir.path().join("fittrack.db")).unwrap();
        let user_id = users::register_user(&db, "casey", "casey@example.com", Some("Casey"))
            .unwrap()
            .id;
        Self {
            _dir: dir,
            db,
            user_id,
            today: today(),
        }
    }

    fn days_ago(&self, n: i64) -> String {
        (self.today - Duration::days(n)).format("%Y-%m-%d").to_string()
    }

    fn weight(&self, days_ago: i64, weight: f64) {
        weights::add_weight_entry(&self.db, self.user_id, &self.days_ago(days_ago), weight, None).unwrap();
    }

    fn workout(&self, days_ago: i64, kind: &str, minutes: i64) -> i64 {
        workouts::add_workout(&self.db, self.user_id, &self.days_ago(days_ago), kind, minutes, None)
            .unwrap()
            .id
    }
}

#[test]
fn test_weight_analytics_over_range() {
    let f = Fixture::new();
    f.weight(3, 182.0);
    f.weight(2, 181.0);
    f.weight(1, 180.0);
    f.weight(0, 179.0);
    // Outside the 7-day window
    f.weight(20, 190.0);

    let result = analytics::weight_analytics(&f.db, f.user_id, &RangeQuery::token("7"), f.today).unwrap();
    assert_eq!(result.summary.count, 4);
    assert_eq!(result.summary.net_change, -3.0);
    assert_eq!(result.summary.average, 180.5);
    assert_eq!(result.summary.trend, Trend::Decreasing);
    assert_eq!(result.records.heaviest.map(|h| h.value), Some(182.0));
    assert_eq!(result.records.biggest_loss, -1.0);
    assert!(result.moving_average_7.is_empty());

    let all = analytics::weight_analytics(&f.db, f.user_id, &RangeQuery::token("all"), f.today).unwrap();
    assert_eq!(all.summary.count, 5);
}

#[test]
fn test_workout_analytics_streaks_and_types() {
    let f = Fixture::new();
    f.workout(0, "Running", 30);
    f.workout(1, "Running", 40);
    f.workout(2, "Strength", 50);
    f.workout(5, "Yoga", 20);

    let result = analytics::workout_analytics(&f.db, f.user_id, &RangeQuery::default(), f.today).unwrap();
    assert_eq!(result.summary.count, 4);
    assert_eq!(result.summary.total_duration, 140);
    assert_eq!(result.summary.average_duration, 35.0);
    assert_eq!(result.summary.by_type.get("Running"), Some(&2));
    assert_eq!(result.summary.current_streak, 3);
    assert_eq!(result.summary.longest_streak, 3);

    let enhanced =
        analytics::enhanced_workout_analytics(&f.db, f.user_id, &RangeQuery::token("30"), f.today).unwrap();
    assert_eq!(enhanced.total_workouts, 4);
    assert_eq!(enhanced.by_weekday.len(), 7);
    assert_eq!(enhanced.by_weekday.iter().map(|d| d.count).sum::<usize>(), 4);
}

#[test]
fn test_streak_survives_a_quiet_today() {
    let f = Fixture::new();
    f.workout(1, "Running", 30);
    f.workout(2, "Running", 30);

    let result = analytics::workout_analytics(&f.db, f.user_id, &RangeQuery::token("7"), f.today).unwrap();
    assert_eq!(result.summary.current_streak, 2);
}

#[test]
fn test_consistency_calendar_covers_every_day() {
    let f = Fixture::new();
    f.workout(0, "Running", 30);
    f.workout(0, "Yoga", 15);
    f.workout(2, "Strength", 45);

    let result = analytics::consistency_analytics(
        &f.db,
        f.user_id,
        &RangeQuery::between(&f.days_ago(6), &f.days_ago(0)),
        f.today,
    )
    .unwrap();
    assert_eq!(result.total_days, 7);
    assert_eq!(result.calendar.len(), 7);
    assert_eq!(result.active_days, 2);
    assert_eq!(result.consistency_rate, 28.57);
    assert_eq!(result.current_streak, 1);

    let today_entry = result.calendar.last().unwrap();
    assert_eq!(today_entry.workout_count, 2);
    assert_eq!(today_entry.total_duration, 45);
}

#[test]
fn test_range_token_includes_both_endpoints() {
    let f = Fixture::new();
    f.workout(8, "Running", 30);
    f.workout(7, "Running", 30);
    f.workout(3, "Yoga", 20);
    f.weight(8, 181.0);
    f.weight(7, 180.0);

    let week = RangeQuery::token("7");
    let consistency = analytics::consistency_analytics(&f.db, f.user_id, &week, f.today).unwrap();
    assert_eq!(consistency.range.start, f.today - Duration::days(7));
    assert_eq!(consistency.total_days, 8);
    assert_eq!(consistency.calendar.len(), 8);
    assert!(consistency.calendar[0].active);
    assert_eq!(consistency.active_days, 2);
    assert_eq!(consistency.consistency_rate, 25.0);

    let workouts = analytics::workout_analytics(&f.db, f.user_id, &week, f.today).unwrap();
    assert_eq!(workouts.summary.count, 2);

    let weights = analytics::weight_analytics(&f.db, f.user_id, &week, f.today).unwrap();
    assert_eq!(weights.summary.count, 1);
    assert_eq!(weights.summary.start_date, Some(f.today - Duration::days(7)));
}

#[test]
fn test_consistency_all_starts_at_first_workout() {
    let f = Fixture::new();
    f.workout(9, "Running", 30);

    let result = analytics::consistency_analytics(&f.db, f.user_id, &RangeQuery::token("all"), f.today).unwrap();
    assert_eq!(result.range.start, f.today - Duration::days(9));
    assert_eq!(result.total_days, 10);
}

#[test]
fn test_exercise_analytics_volume_and_top_list() {
    let f = Fixture::new();
    let bench = exercises::create_exercise(
        &f.db,
        f.user_id,
        "Bench Press",
        "STRENGTH",
        &["chest".to_string(), "triceps".to_string()],
        None,
        None,
    )
    .unwrap();
    let run = exercises::create_exercise(&f.db, f.user_id, "Treadmill", "cardio", &[], None, None).unwrap();

    let w1 = f.workout(1, "Strength", 45);
    let w2 = f.workout(0, "Mixed", 60);
    for (workout_id, weight) in [(w1, 135.0), (w2, 145.0)] {
        workouts::add_workout_exercise(
            &f.db,
            f.user_id,
            workout_id,
            ExerciseEntry {
                exercise_id: bench.id,
                sets: Some(3),
                reps: Some(10),
                weight: Some(weight),
                ..ExerciseEntry::default()
            },
        )
        .unwrap();
    }
    workouts::add_workout_exercise(
        &f.db,
        f.user_id,
        w2,
        ExerciseEntry {
            exercise_id: run.id,
            duration_seconds: Some(1200),
            distance: Some(2.0),
            ..ExerciseEntry::default()
        },
    )
    .unwrap();

    let result = analytics::exercise_analytics(&f.db, f.user_id, &RangeQuery::token("7"), f.today).unwrap();
    assert_eq!(result.total_exercises, 3);
    assert_eq!(result.total_sets, 6);
    assert_eq!(result.total_volume, 8400.0);

    let top = &result.top_exercises[0];
    assert_eq!(top.name, "Bench Press");
    assert_eq!(top.times_performed, 2);
    assert_eq!(top.max_weight, Some(145.0));

    // Both bench sessions set a new best
    let max_weight = result
        .personal_records
        .iter()
        .find(|r| r.record_type == fittrack::models::RecordType::MaxWeight)
        .map(|r| r.count);
    assert_eq!(max_weight, Some(2));
}

#[test]
fn test_task_analytics_completion_rate() {
    let f = Fixture::new();
    let a = tasks::create_task(&f.db, f.user_id, "Stretch", None, None).unwrap();
    tasks::create_task(&f.db, f.user_id, "Foam roll", None, None).unwrap();
    tasks::complete_task(&f.db, f.user_id, a.id, chrono::Utc::now()).unwrap();

    let result = analytics::task_analytics(&f.db, f.user_id, &RangeQuery::token("7"), f.today).unwrap();
    assert_eq!(result.summary.count, 2);
    assert_eq!(result.summary.completed, 1);
    assert_eq!(result.summary.pending, 1);
    assert_eq!(result.summary.completion_rate, 50.0);
    assert_eq!(result.records.current_streak, 1);
}

#[test]
fn test_dashboard_summarizes_last_thirty_days() {
    let f = Fixture::new();
    f.weight(10, 185.0);
    f.weight(0, 182.5);
    f.workout(1, "Running", 30);
    f.workout(0, "Running", 50);
    f.workout(45, "Running", 90);

    let dash = analytics::dashboard(&f.db, f.user_id, f.today).unwrap();
    assert_eq!(dash.latest_weight, Some(182.5));
    assert_eq!(dash.weight_change, -2.5);
    assert_eq!(dash.workouts.count, 2);
    assert_eq!(dash.workouts.total_duration, 80);
    assert_eq!(dash.workouts.average_duration, 40.0);
    assert_eq!(dash.goals.total, 0);
    assert_eq!(dash.trends.weight, Trend::Decreasing);
}

#[test]
fn test_bad_ranges_are_validation_errors() {
    let f = Fixture::new();

    let err = analytics::weight_analytics(&f.db, f.user_id, &RangeQuery::token("14"), f.today).unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = analytics::workout_analytics(
        &f.db,
        f.user_id,
        &RangeQuery::between("2025-03-10", "2025-03-01"),
        f.today,
    )
    .unwrap_err();
    assert!(matches!(err, AppError::Validation(_)));

    let err = analytics::dashboard(&f.db, 999, f.today).unwrap_err();
    assert!(matches!(err, AppError::NotFound { resource: "user", .. }));
}
