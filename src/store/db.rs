// Ballpark - SQLite Database Management
//
// Opens the SQLite database, applies schema migrations, and hands out the
// connection to store operations. Async callers go through `call`, which runs
// the operation on the blocking pool so the connection lock is never held
// across an await point.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rusqlite::Connection;

use super::StoreError;

/// How long a writer waits on a locked database file before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Shared handle to the SQLite connection. Cheap to clone.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) the database file at `path` and run migrations.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        tracing::debug!(path = %path.display(), journal_mode = %mode, "Database opened");

        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing only).
    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        run_migrations(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `op` against the connection on the blocking thread pool.
    pub async fn call<F, T>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| StoreError::Other("database connection lock poisoned".to_string()))?;
            op(&guard)
        })
        .await
        .map_err(|e| StoreError::Other(format!("database task failed: {}", e)))?
    }

    /// Release the connection. If other handles are still alive the
    /// connection closes when the last one drops.
    pub fn close(self) -> Result<(), StoreError> {
        match Arc::try_unwrap(self.conn) {
            Ok(mutex) => {
                let conn = mutex
                    .into_inner()
                    .map_err(|_| StoreError::Other("database connection lock poisoned".to_string()))?;
                conn.close().map_err(|(_, e)| StoreError::Database(e))?;
                tracing::debug!("Database connection closed");
                Ok(())
            }
            Err(_) => {
                tracing::debug!("Database handle still shared; deferring close");
                Ok(())
            }
        }
    }

    /// Lock the connection directly (tests only).
    #[cfg(test)]
    pub(crate) fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }
}

/// Create or update tables. Idempotent.
fn run_migrations(conn: &Connection) -> Result<(), StoreError> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS service_api_keys (
            id              TEXT PRIMARY KEY,
            service_name    TEXT NOT NULL UNIQUE,
            secret_hash     TEXT NOT NULL UNIQUE,
            secret_prefix   TEXT NOT NULL,
            status          TEXT NOT NULL DEFAULT 'active'
                            CHECK (status IN ('active', 'inactive')),
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_service_api_keys_status
            ON service_api_keys(status);

        CREATE TABLE IF NOT EXISTS players (
            id              TEXT PRIMARY KEY,
            external_id     TEXT NOT NULL UNIQUE,
            name            TEXT NOT NULL,
            document        TEXT NOT NULL,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_players_name ON players(name);

        CREATE TABLE IF NOT EXISTS leagues (
            id              TEXT PRIMARY KEY,
            external_id     TEXT NOT NULL UNIQUE,
            name            TEXT NOT NULL,
            document        TEXT NOT NULL,
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_leagues_name ON leagues(name);
        ",
    )?;

    tracing::debug!("Database migrations completed successfully");
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────────────
