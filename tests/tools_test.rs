//! Tool-level tests against a real SQLite file

use chrono::{Duration, NaiveDate};
use tempfile::TempDir;

use fittrack::analytics::RangeQuery;
use fittrack::db::Database;
use fittrack::error::AppError;
use fittrack::models::{RecordType, TemplateExerciseInput};
use fittrack::tools::workouts::ExerciseEntry;
use fittrack::tools::{exercises, goals, records, reports, tasks, templates, today, users, weights, workouts};

fn setup() -> (TempDir, Database) {
    let dir = TempDir::new().unwrap();
    let db = Database::open_and_migrate(dir.path().join("fittrack.db")).unwrap();
    (dir, db)
}

fn user(db: &Database, name: &str) -> i64 {
    users::register_user(db, name, &format!("{name}@example.com"), None)
        .unwrap()
        .id
}

fn iso(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn validation_fields(err: AppError) -> Vec<String> {
    match err {
        AppError::Validation(issues) => issues.into_iter().map(|i| i.field).collect(),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_duplicate_username_is_a_conflict() {
    let (_dir, db) = setup();
    user(&db, "sam");

    let err = users::register_user(&db, "sam", "other@example.com", None).unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let listed = users::list_users(&db).unwrap();
    assert_eq!(listed.total, 1);
}

#[test]
fn test_weight_validation_reports_every_field() {
    let (_dir, db) = setup();
    let uid = user(&db, "sam");

    let err = weights::add_weight_entry(&db, uid, "2025-13-01", -4.0, None).unwrap_err();
    assert_eq!(validation_fields(err), vec!["date", "weight"]);
}

#[test]
fn test_other_users_records_are_not_found() {
    let (_dir, db) = setup();
    let alice = user(&db, "alice");
    let bob = user(&db, "bob");

    let entry = weights::add_weight_entry(&db, alice, "2025-03-01", 150.0, None).unwrap();

    match weights::get_weight_entry(&db, bob, entry.id) {
        Err(AppError::NotFound { resource, id }) => {
            assert_eq!(resource, "weight entry");
            assert_eq!(id, entry.id);
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(weights::delete_weight_entry(&db, bob, entry.id).is_err());
    assert!(weights::get_weight_entry(&db, alice, entry.id).is_ok());
}

#[test]
fn test_unknown_user_is_not_found() {
    let (_dir, db) = setup();
    let err = tasks::create_task(&db, 42, "stretch", None, None).unwrap_err();
    assert!(matches!(err, AppError::NotFound { resource: "user", id: 42 }));
}

#[test]
fn test_exercise_names_are_unique_per_user() {
    let (_dir, db) = setup();
    let alice = user(&db, "alice");
    let bob = user(&db, "bob");

    exercises::create_exercise(&db, alice, "Bench Press", "strength", &["chest".to_string()], None, None)
        .unwrap();

    let err = exercises::create_exercise(&db, alice, "bench press", "STRENGTH", &[], None, None).unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    // Another user may reuse the name
    assert!(exercises::create_exercise(&db, bob, "Bench Press", "STRENGTH", &[], None, None).is_ok());
}

#[test]
fn test_unknown_category_is_rejected() {
    let (_dir, db) = setup();
    let uid = user(&db, "sam");

    let err = exercises::create_exercise(&db, uid, "Plank", "core", &["wings".to_string()], None, None)
        .unwrap_err();
    assert_eq!(validation_fields(err), vec!["category", "muscle_groups"]);
}

#[test]
fn test_exercise_in_use_cannot_be_deleted() {
    let (_dir, db) = setup();
    let uid = user(&db, "sam");
    let squat = exercises::create_exercise(&db, uid, "Squat", "STRENGTH", &[], None, None).unwrap();
    let workout = workouts::add_workout(&db, uid, "2025-03-01", "Strength", 45, None).unwrap();
    let entry = workouts::add_workout_exercise(
        &db,
        uid,
        workout.id,
        ExerciseEntry {
            exercise_id: squat.id,
            sets: Some(3),
            reps: Some(5),
            weight: Some(185.0),
            ..ExerciseEntry::default()
        },
    )
    .unwrap();

    let err = exercises::delete_exercise(&db, uid, squat.id).unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    workouts::remove_workout_exercise(&db, uid, entry.workout_exercise.id).unwrap();
    assert!(exercises::delete_exercise(&db, uid, squat.id).is_ok());
}

#[test]
fn test_heavier_lift_creates_max_weight_record() {
    let (_dir, db) = setup();
    let uid = user(&db, "sam");
    let deadlift = exercises::create_exercise(&db, uid, "Deadlift", "STRENGTH", &[], None, None).unwrap();
    let workout = workouts::add_workout(&db, uid, "2025-03-01", "Strength", 60, None).unwrap();

    let lift = |weight: f64| {
        workouts::add_workout_exercise(
            &db,
            uid,
            workout.id,
            ExerciseEntry {
                exercise_id: deadlift.id,
                sets: Some(1),
                reps: Some(3),
                weight: Some(weight),
                ..ExerciseEntry::default()
            },
        )
        .unwrap()
    };

    let first = lift(225.0);
    let record = first.new_personal_record.expect("first lift sets a record");
    assert_eq!(record.record_type, RecordType::MaxWeight);
    assert_eq!(record.value, 225.0);
    assert_eq!(record.workout_id, Some(workout.id));

    assert!(lift(215.0).new_personal_record.is_none());
    assert!(lift(225.0).new_personal_record.is_none());
    assert_eq!(lift(235.0).new_personal_record.map(|r| r.value), Some(235.0));

    let listed = records::list_personal_records(&db, uid, Some(deadlift.id)).unwrap();
    assert_eq!(listed.total, 2);

    let detail = workouts::get_workout(&db, uid, workout.id).unwrap();
    assert_eq!(detail.exercises.len(), 4);
    assert_eq!(detail.exercises[0].exercise_name, "Deadlift");
    assert_eq!(detail.exercises[0].volume, Some(675.0));
}

#[test]
fn test_start_workout_from_template_copies_exercises() {
    let (_dir, db) = setup();
    let uid = user(&db, "sam");
    let press = exercises::create_exercise(&db, uid, "Overhead Press", "STRENGTH", &[], None, None).unwrap();
    let row = exercises::create_exercise(&db, uid, "Barbell Row", "STRENGTH", &[], None, None).unwrap();

    let template = templates::create_template(
        &db,
        uid,
        "Upper A",
        "Strength",
        None,
        Some(50),
        vec![
            TemplateExerciseInput {
                exercise_id: press.id,
                sets: Some(3),
                reps: Some(8),
                weight: Some(95.0),
            },
            TemplateExerciseInput {
                exercise_id: row.id,
                sets: Some(3),
                reps: Some(10),
                weight: Some(135.0),
            },
        ],
    )
    .unwrap();
    assert_eq!(template.exercises.len(), 2);

    let day = NaiveDate::from_ymd_opt(2025, 3, 4).unwrap();
    let workout =
        templates::start_workout_from_template(&db, uid, template.template.id, None, None, day).unwrap();
    assert_eq!(workout.workout.date, day);
    assert_eq!(workout.workout.duration, 50);
    assert_eq!(workout.workout.workout_type, "Strength");
    let names: Vec<_> = workout.exercises.iter().map(|e| e.exercise_name.as_str()).collect();
    assert_eq!(names, vec!["Overhead Press", "Barbell Row"]);

    let err = templates::create_template(&db, uid, "Upper A", "Strength", None, None, Vec::new()).unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));
}

#[test]
fn test_goal_progress_reads_and_refresh_persists() {
    let (_dir, db) = setup();
    let uid = user(&db, "sam");
    let today = today();

    let goal = goals::create_goal(&db, uid, "Train often", None, "workouts", 10.0, None, "workouts", None).unwrap();
    for offset in [0, 3, 40] {
        workouts::add_workout(&db, uid, &iso(today - Duration::days(offset)), "Running", 30, None).unwrap();
    }

    let before = goals::goal_progress(&db, uid).unwrap();
    assert_eq!(before.goals[0].current, 0.0);

    let refreshed = goals::refresh_goal_progress(&db, uid, today).unwrap();
    assert_eq!(refreshed.goals[0].current, 2.0);
    assert_eq!(refreshed.goals[0].percentage, 20.0);

    // The recomputed value was stored
    assert_eq!(goals::get_goal(&db, uid, goal.id).unwrap().current, 2.0);
    assert_eq!(goals::goal_progress(&db, uid).unwrap().goals[0].current, 2.0);
}

#[test]
fn test_weight_goal_tracks_latest_entry() {
    let (_dir, db) = setup();
    let uid = user(&db, "sam");
    let today = today();

    goals::create_goal(&db, uid, "Cut", None, "WEIGHT", 170.0, Some(180.0), "lbs", None).unwrap();
    weights::add_weight_entry(&db, uid, &iso(today - Duration::days(2)), 178.0, None).unwrap();
    weights::add_weight_entry(&db, uid, &iso(today), 176.5, None).unwrap();

    let report = goals::refresh_goal_progress(&db, uid, today).unwrap();
    assert_eq!(report.goals[0].current, 176.5);
    assert_eq!(report.goals[0].percentage, 100.0);
    assert!(report.goals[0].is_completed);
}

#[test]
fn test_goal_target_must_be_positive() {
    let (_dir, db) = setup();
    let uid = user(&db, "sam");
    let err = goals::create_goal(&db, uid, "", None, "SLEEP", 0.0, None, "h", None).unwrap_err();
    assert_eq!(validation_fields(err), vec!["title", "category", "target"]);
}

#[test]
fn test_complete_task_is_idempotent() {
    let (_dir, db) = setup();
    let uid = user(&db, "sam");
    let task = tasks::create_task(&db, uid, "Meal prep", None, Some("2025-03-09")).unwrap();

    let first_time = chrono::Utc::now();
    let done = tasks::complete_task(&db, uid, task.id, first_time).unwrap();
    assert_eq!(done.completed_on(), Some(first_time.date_naive()));

    let later = first_time + Duration::days(3);
    let again = tasks::complete_task(&db, uid, task.id, later).unwrap();
    assert_eq!(again.completed_on(), Some(first_time.date_naive()));

    let completed = tasks::list_tasks(&db, uid, Some("completed")).unwrap();
    assert_eq!(completed.total, 1);
}

#[test]
fn test_task_goal_counts_completions_in_trailing_window() {
    let (_dir, db) = setup();
    let uid = user(&db, "sam");
    let today = today();
    let noon = today.and_hms_opt(12, 0, 0).unwrap().and_utc();

    let goal = goals::create_goal(&db, uid, "Get things done", None, "TASKS", 4.0, None, "tasks", None).unwrap();
    for (title, days_ago) in [("today", 0), ("window edge", 30), ("too old", 31)] {
        let task = tasks::create_task(&db, uid, title, None, None).unwrap();
        tasks::complete_task(&db, uid, task.id, noon - Duration::days(days_ago)).unwrap();
    }
    // Still open, never counted
    tasks::create_task(&db, uid, "open", None, None).unwrap();

    let report = goals::refresh_goal_progress(&db, uid, today).unwrap();
    assert_eq!(report.goals[0].current, 2.0);
    assert_eq!(report.goals[0].percentage, 50.0);
    assert_eq!(goals::get_goal(&db, uid, goal.id).unwrap().current, 2.0);
}

#[test]
fn test_editing_completed_task_keeps_completion_day() {
    let (_dir, db) = setup();
    let uid = user(&db, "sam");
    let today = today();
    let noon = today.and_hms_opt(12, 0, 0).unwrap().and_utc();

    goals::create_goal(&db, uid, "Get things done", None, "TASKS", 5.0, None, "tasks", None).unwrap();
    let recent = tasks::create_task(&db, uid, "recent", None, None).unwrap();
    tasks::complete_task(&db, uid, recent.id, noon).unwrap();
    let old = tasks::create_task(&db, uid, "old", None, None).unwrap();
    let finished_at = noon - Duration::days(31);
    tasks::complete_task(&db, uid, old.id, finished_at).unwrap();

    assert_eq!(goals::refresh_goal_progress(&db, uid, today).unwrap().goals[0].current, 1.0);

    let edited = tasks::update_task(&db, uid, old.id, Some("old, renamed"), Some("notes"), None, None).unwrap();
    assert_eq!(edited.title, "old, renamed");
    assert_eq!(edited.completed_on(), Some(finished_at.date_naive()));

    // Explicitly restating COMPLETED does not move it either
    let restated = tasks::update_task(&db, uid, old.id, None, None, Some("COMPLETED"), None).unwrap();
    assert_eq!(restated.completed_on(), Some(finished_at.date_naive()));

    assert_eq!(goals::refresh_goal_progress(&db, uid, today).unwrap().goals[0].current, 1.0);

    // Reopening clears the completion day
    let reopened = tasks::update_task(&db, uid, old.id, None, None, Some("PENDING"), None).unwrap();
    assert_eq!(reopened.completed_on(), None);
}

#[test]
fn test_weight_report_needs_entries_in_range() {
    let (dir, db) = setup();
    let uid = user(&db, "sam");
    let out = dir.path().join("report.pdf");

    let err = reports::generate_weight_report(
        &db,
        uid,
        &RangeQuery::token("7"),
        today(),
        out.to_str().unwrap(),
    )
    .unwrap_err();
    assert_eq!(validation_fields(err), vec!["range"]);
    assert!(!out.exists());
}
