//! SQLite connection handle
//!
//! A [`Store`] wraps one SQLite connection behind a mutex. Stores borrow
//! the handle; nothing in the crate reaches for a global connection.
//! Foreign keys are enabled on every connection so table deletion
//! cascades to columns and records at the engine level.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{Connection, Transaction};

use crate::config::StoreConfig;

use super::errors::{StorageError, StorageResult};

/// Schema bootstrap, idempotent. `"order"` and `"values"` are quoted:
/// both are SQL keywords but they are the domain's names for those
/// fields.
const BOOTSTRAP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    id            TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    age           INTEGER,
    password_hash TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS tables (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    description TEXT,
    user_id     TEXT NOT NULL,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS columns (
    id          TEXT PRIMARY KEY,
    table_id    TEXT NOT NULL REFERENCES tables(id) ON DELETE CASCADE,
    name        TEXT NOT NULL,
    column_type TEXT NOT NULL,
    "order"     INTEGER NOT NULL DEFAULT 0,
    is_required INTEGER NOT NULL DEFAULT 0,
    config      TEXT NOT NULL DEFAULT '{}',
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS records (
    id         TEXT PRIMARY KEY,
    table_id   TEXT NOT NULL REFERENCES tables(id) ON DELETE CASCADE,
    "values"   TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS todos (
    id          TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    title       TEXT NOT NULL,
    description TEXT NOT NULL,
    completed   INTEGER NOT NULL DEFAULT 0,
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);
"#;

/// SQLite-backed store handle.
///
/// Connection access is serialized through a mutex; each store method
/// issues independent statements, and only [`Store::with_transaction`]
/// groups statements atomically.
pub struct Store {
    conn: Mutex<Connection>,
}

impl Store {
    /// Opens (or creates) the database at the configured path.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] when the database cannot be opened or
    /// bootstrapped.
    pub fn open(config: &StoreConfig) -> StorageResult<Self> {
        let conn = Connection::open(&config.path)?;
        conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
        conn.execute_batch(&format!(
            "PRAGMA journal_mode = {};",
            config.journal_mode.pragma_value()
        ))?;
        Self::init(conn)
    }

    /// Opens an in-memory database. Used by tests and throwaway tooling.
    pub fn open_in_memory() -> StorageResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> StorageResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(BOOTSTRAP_SQL)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Locks and returns the connection.
    pub(crate) fn conn(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }

    /// Runs `f` inside a transaction, committing only if it succeeds.
    ///
    /// A failure in any statement rolls the whole scope back, so callers
    /// never observe a half-applied multi-statement write.
    pub(crate) fn with_transaction<T>(
        &self,
        f: impl FnOnce(&Transaction<'_>) -> StorageResult<T>,
    ) -> StorageResult<T> {
        let mut guard = self.conn()?;
        let tx = guard.transaction()?;
        let out = f(&tx)?;
        tx.commit()?;
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_open_in_memory_bootstraps() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn().unwrap();
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(count, 5);
    }

    #[test]
    fn test_open_on_disk() {
        let dir = TempDir::new().unwrap();
        let config = StoreConfig::new(dir.path().join("grid.db"));
        let store = Store::open(&config).unwrap();
        drop(store);

        // Reopening finds the same schema without error.
        let store = Store::open(&config).unwrap();
        let conn = store.conn().unwrap();
        let one: i64 = conn.query_row("SELECT 1", [], |row| row.get(0)).unwrap();
        assert_eq!(one, 1);
    }

    #[test]
    fn test_foreign_keys_enabled() {
        let store = Store::open_in_memory().unwrap();
        let conn = store.conn().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn test_transaction_rolls_back_on_error() {
        let store = Store::open_in_memory().unwrap();

        let result: StorageResult<()> = store.with_transaction(|tx| {
            tx.execute(
                "INSERT INTO tables (id, name, user_id, created_at, updated_at)
                 VALUES ('t1', 'demo', 'u1', '2026-01-01T00:00:00.000Z', '2026-01-01T00:00:00.000Z')",
                [],
            )?;
            Err(StorageError::Database("injected failure".into()))
        });
        assert!(result.is_err());

        let conn = store.conn().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM tables", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
