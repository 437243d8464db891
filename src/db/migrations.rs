//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
pub const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- USERS
        -- ============================================
        CREATE TABLE users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            display_name TEXT,
            created_at TEXT NOT NULL
        );

        -- ============================================
        -- WEIGHT ENTRIES
        -- One reading per row; several per day allowed
        -- ============================================
        CREATE TABLE weight_entries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            date TEXT NOT NULL,                  -- ISO date: "2025-01-09"
            weight REAL NOT NULL CHECK(weight > 0),
            note TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX idx_weight_entries_user_date ON weight_entries(user_id, date);

        -- ============================================
        -- EXERCISE CATALOGUE
        -- ============================================
        CREATE TABLE exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            category TEXT NOT NULL CHECK(category IN ('STRENGTH', 'CARDIO', 'FLEXIBILITY', 'BALANCE', 'SPORTS', 'OTHER')),
            muscle_groups TEXT NOT NULL DEFAULT '[]',   -- JSON array of muscle group names
            equipment TEXT,
            description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,

            UNIQUE(user_id, name)
        );

        -- ============================================
        -- WORKOUTS
        -- ============================================
        CREATE TABLE workouts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            workout_type TEXT NOT NULL,
            duration INTEGER NOT NULL CHECK(duration > 0),   -- minutes
            notes TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX idx_workouts_user_date ON workouts(user_id, date);

        CREATE TABLE workout_exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            workout_id INTEGER NOT NULL REFERENCES workouts(id) ON DELETE CASCADE,
            exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE RESTRICT,
            position INTEGER NOT NULL,
            sets INTEGER,
            reps INTEGER,
            weight REAL,
            duration_seconds INTEGER,
            distance REAL,
            notes TEXT
        );

        CREATE INDEX idx_workout_exercises_workout ON workout_exercises(workout_id);
        CREATE INDEX idx_workout_exercises_exercise ON workout_exercises(exercise_id);

        -- ============================================
        -- WORKOUT TEMPLATES
        -- ============================================
        CREATE TABLE workout_templates (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            workout_type TEXT NOT NULL,
            description TEXT,
            estimated_duration INTEGER,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,

            UNIQUE(user_id, name)
        );

        CREATE TABLE template_exercises (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            template_id INTEGER NOT NULL REFERENCES workout_templates(id) ON DELETE CASCADE,
            exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE RESTRICT,
            position INTEGER NOT NULL,
            sets INTEGER,
            reps INTEGER,
            weight REAL
        );

        CREATE INDEX idx_template_exercises_template ON template_exercises(template_id);

        -- ============================================
        -- PERSONAL RECORDS
        -- ============================================
        CREATE TABLE personal_records (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
            record_type TEXT NOT NULL CHECK(record_type IN ('MAX_WEIGHT', 'MAX_REPS', 'MAX_VOLUME', 'BEST_TIME', 'LONGEST_DISTANCE')),
            value REAL NOT NULL,
            unit TEXT NOT NULL,
            date TEXT NOT NULL,
            workout_id INTEGER REFERENCES workouts(id) ON DELETE SET NULL,
            notes TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX idx_personal_records_user_exercise ON personal_records(user_id, exercise_id, record_type);

        -- ============================================
        -- BODY COMPOSITION & PROGRESS PHOTOS
        -- ============================================
        CREATE TABLE body_compositions (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            body_fat_percentage REAL,
            muscle_mass REAL,
            waist REAL,
            chest REAL,
            hips REAL,
            arms REAL,
            thighs REAL,
            notes TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX idx_body_compositions_user_date ON body_compositions(user_id, date);

        CREATE TABLE progress_photos (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            date TEXT NOT NULL,
            image_path TEXT NOT NULL,
            photo_type TEXT NOT NULL CHECK(photo_type IN ('FRONT', 'SIDE', 'BACK', 'OTHER')),
            caption TEXT,
            created_at TEXT NOT NULL
        );

        CREATE INDEX idx_progress_photos_user_date ON progress_photos(user_id, date);

        -- ============================================
        -- TASKS
        -- ============================================
        CREATE TABLE tasks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT,
            status TEXT NOT NULL CHECK(status IN ('PENDING', 'COMPLETED', 'ARCHIVED')) DEFAULT 'PENDING',
            due_date TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX idx_tasks_user_created ON tasks(user_id, created_at);
        CREATE INDEX idx_tasks_user_status ON tasks(user_id, status);

        -- ============================================
        -- GOALS
        -- `current` is recomputed by the goal refresh
        -- ============================================
        CREATE TABLE goals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            title TEXT NOT NULL,
            description TEXT,
            target REAL NOT NULL,
            current REAL NOT NULL DEFAULT 0,
            unit TEXT NOT NULL,
            category TEXT NOT NULL CHECK(category IN ('WEIGHT', 'WORKOUTS', 'TASKS')),
            status TEXT NOT NULL CHECK(status IN ('ACTIVE', 'COMPLETED', 'PAUSED', 'CANCELLED')) DEFAULT 'ACTIVE',
            deadline TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE INDEX idx_goals_user ON goals(user_id);
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(needs_migration(&conn).unwrap());
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }
}
