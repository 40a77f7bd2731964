//! Connection pool creation and per-connection initialization.

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, OpenFlags};
use thiserror::Error;

/// Runtime tunables for SQLite connection behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbRuntimeSettings {
    /// Busy timeout for SQLite connections, in milliseconds.
    pub busy_timeout_ms: u64,

    /// Maximum number of pooled SQLite connections.
    pub pool_max_size: u32,
}

impl Default for DbRuntimeSettings {
    fn default() -> Self {
        Self {
            busy_timeout_ms: 5_000,
            pool_max_size: 8,
        }
    }
}

/// A type alias for the SQLite connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Errors that can occur when creating the database pool.
#[derive(Debug, Error)]
pub enum PoolError {
    /// Failed to build the connection pool.
    #[error("failed to create database connection pool: {0}")]
    PoolInit(#[from] r2d2::Error),
}

/// Applies the per-connection pragmas every Vocalink connection runs with.
///
/// WAL keeps profile and session reads concurrent with the single writer;
/// `synchronous = NORMAL` is the recommended pairing for WAL. Foreign keys
/// are enforced so a deleted user cannot leave dangling profiles, calls,
/// or artifacts behind.
fn init_connection(conn: &Connection, busy_timeout_ms: u64) -> rusqlite::Result<()> {
    // journal_mode reports the mode actually in effect; in-memory
    // databases stay on "memory", which is fine.
    let journal_mode: String =
        conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get(0))?;
    if !matches!(journal_mode.as_str(), "wal" | "memory") {
        return Err(rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
            Some(format!("WAL journal mode rejected, got: {journal_mode}")),
        ));
    }
    conn.execute_batch(&format!(
        "PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;
         PRAGMA busy_timeout = {busy_timeout_ms};"
    ))
}

/// Creates a new SQLite connection pool.
///
/// `db_path` may be `:memory:` for an in-memory database; with a pool of
/// size 1 that gives tests a private throwaway store. Returns
/// [`PoolError::PoolInit`] if the pool cannot be built.
pub fn create_pool(db_path: &str, settings: DbRuntimeSettings) -> Result<DbPool, PoolError> {
    tracing::debug!(
        db_path,
        pool_max_size = settings.pool_max_size,
        "opening database"
    );

    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;

    let busy_timeout_ms = settings.busy_timeout_ms;
    let manager = SqliteConnectionManager::file(db_path)
        .with_flags(flags)
        .with_init(move |conn| init_connection(conn, busy_timeout_ms));

    let pool = Pool::builder()
        .max_size(settings.pool_max_size)
        .build(manager)?;

    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_connection_gets_the_runtime_pragmas() {
        let pool = create_pool(
            ":memory:",
            DbRuntimeSettings {
                busy_timeout_ms: 2_500,
                pool_max_size: 2,
            },
        )
        .unwrap();

        // Both pooled connections must have been initialized, not just
        // the first one handed out.
        let a = pool.get().unwrap();
        let b = pool.get().unwrap();
        for conn in [&a, &b] {
            let fk: i64 = conn
                .query_row("PRAGMA foreign_keys;", [], |row| row.get(0))
                .unwrap();
            assert_eq!(fk, 1);

            let busy: i64 = conn
                .query_row("PRAGMA busy_timeout;", [], |row| row.get(0))
                .unwrap();
            assert_eq!(busy, 2_500);
        }
    }

    #[test]
    fn foreign_key_violations_are_rejected() {
        let pool = create_pool(
            ":memory:",
            DbRuntimeSettings {
                pool_max_size: 1,
                ..Default::default()
            },
        )
        .unwrap();
        let conn = pool.get().unwrap();

        conn.execute_batch(
            "CREATE TABLE owners (id TEXT PRIMARY KEY);
             CREATE TABLE items (
                 id TEXT PRIMARY KEY,
                 owner_id TEXT NOT NULL REFERENCES owners(id)
             );",
        )
        .unwrap();

        let err = conn
            .execute("INSERT INTO items (id, owner_id) VALUES ('i1', 'missing')", [])
            .unwrap_err();
        assert!(err.to_string().contains("FOREIGN KEY"), "got: {err}");
    }

    #[test]
    fn pool_respects_the_configured_cap() {
        let pool = create_pool(
            ":memory:",
            DbRuntimeSettings {
                pool_max_size: 1,
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(pool.max_size(), 1);

        let held = pool.get().unwrap();
        assert!(
            pool.try_get().is_none(),
            "a second connection must not exist beyond the cap"
        );
        drop(held);
        assert!(pool.try_get().is_some());
    }

    #[test]
    fn file_backed_database_persists_in_wal_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocalink.db");
        let path = path.to_str().unwrap();

        {
            let pool = create_pool(path, DbRuntimeSettings::default()).unwrap();
            let conn = pool.get().unwrap();

            let mode: String = conn
                .query_row("PRAGMA journal_mode;", [], |row| row.get(0))
                .unwrap();
            assert_eq!(mode, "wal");

            conn.execute_batch(
                "CREATE TABLE notes (body TEXT NOT NULL);
                 INSERT INTO notes (body) VALUES ('kept');",
            )
            .unwrap();
        }

        // Reopening through a fresh pool must see the committed row.
        let pool = create_pool(path, DbRuntimeSettings::default()).unwrap();
        let conn = pool.get().unwrap();
        let body: String = conn
            .query_row("SELECT body FROM notes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(body, "kept");
    }
}
