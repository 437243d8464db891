//! SQLite connection pool
//!
//! Every pooled connection is configured the same way on checkout: foreign
//! keys on, WAL journal, and a busy timeout so concurrent tool calls wait
//! instead of failing with SQLITE_BUSY.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

use super::migrations;

/// Upper bound on simultaneously open connections
pub const DEFAULT_POOL_SIZE: u32 = 10;

const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;
     PRAGMA journal_mode = WAL;
     PRAGMA synchronous = NORMAL;
     PRAGMA busy_timeout = 5000;
     PRAGMA temp_store = MEMORY;";

#[derive(Debug, Error)]
pub enum DbError {
    #[error("connection pool error: {0}")]
    Connection(#[from] r2d2::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON column error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DbResult<T> = Result<T, DbError>;

pub type PooledConn = PooledConnection<SqliteConnectionManager>;

/// Shared handle to the FitTrack database file
#[derive(Clone)]
pub struct Database {
    pool: Arc<Pool<SqliteConnectionManager>>,
    path: Arc<PathBuf>,
}

impl Database {
    pub fn new<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Self::with_pool_size(path, DEFAULT_POOL_SIZE)
    }

    pub fn with_pool_size<P: AsRef<Path>>(path: P, max_size: u32) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let manager = SqliteConnectionManager::file(&path)
            .with_flags(OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE)
            .with_init(|conn| conn.execute_batch(CONNECTION_PRAGMAS));

        let pool = Pool::builder().max_size(max_size.max(1)).build(manager)?;
        tracing::debug!(path = %path.display(), max_size, "opened connection pool");

        Ok(Self {
            pool: Arc::new(pool),
            path: Arc::new(path),
        })
    }

    /// Open the pool and bring the schema up to date
    pub fn open_and_migrate<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let database = Self::new(path)?;
        database.with_conn(migrations::run_migrations)?;
        Ok(database)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the main database file, if it exists yet
    pub fn file_size(&self) -> Option<u64> {
        std::fs::metadata(self.path()).ok().map(|m| m.len())
    }

    pub fn get_conn(&self) -> DbResult<PooledConn> {
        Ok(self.pool.get()?)
    }

    pub fn with_conn<F, T>(&self, f: F) -> DbResult<T>
    where
        F: FnOnce(&Connection) -> DbResult<T>,
    {
        let conn = self.get_conn()?;
        f(&conn)
    }

    pub fn schema_version(&self) -> DbResult<i32> {
        self.with_conn(migrations::get_schema_version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connections_enforce_foreign_keys() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = Database::with_pool_size(dir.path().join("t.db"), 2).unwrap();

        let enabled: i64 = db
            .with_conn(|conn| Ok(conn.query_row("PRAGMA foreign_keys", [], |r| r.get(0))?))
            .unwrap();
        assert_eq!(enabled, 1);
        assert!(db.path().ends_with("t.db"));
    }

    #[test]
    fn test_open_and_migrate_reports_current_version() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = Database::open_and_migrate(dir.path().join("fittrack.db")).unwrap();
        assert_eq!(db.schema_version().unwrap(), migrations::SCHEMA_VERSION);
        assert!(db.file_size().is_some());
    }
}
