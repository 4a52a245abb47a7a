//! SQLite storage shared by every store.
//!
//! One `Database` is opened at startup and cloned into each store. The
//! connection sits behind a mutex, so statements from different stores never
//! interleave; `with_transaction` extends that guarantee to multi-statement
//! operations such as merge-delete.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::Connection;

pub mod application_repo;
pub mod doc_repo;
pub mod error;
pub mod field_value_repo;
pub mod migrations;

pub use error::DatabaseError;

/// Milliseconds a writer waits on a locked database file before failing.
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Cloneable handle to the single application connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Opens the database file at `path`, creating it and its parent
    /// directories when missing, and brings the schema up to date.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(|source| DatabaseError::Io {
                path: dir.to_path_buf(),
                source,
            })?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(&format!(
            "PRAGMA journal_mode=WAL; PRAGMA busy_timeout={};",
            BUSY_TIMEOUT_MS
        ))?;

        let db = Self::from_connection(conn)?;
        log::info!(
            "Opened jobtrack database {} (schema v{})",
            path.display(),
            migrations::latest_version()
        );
        Ok(db)
    }

    /// A private database that vanishes when the last clone is dropped.
    pub fn open_in_memory() -> Result<Self, DatabaseError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, DatabaseError> {
        migrations::run_all(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, DatabaseError> {
        self.conn.lock().map_err(|_| DatabaseError::LockPoisoned)
    }

    /// Runs `f` with exclusive use of the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T, DatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, DatabaseError>,
    {
        let conn = self.lock()?;
        f(&conn)
    }

    /// Runs `f` inside one transaction.
    ///
    /// Commits when `f` returns `Ok`. On `Err` the transaction is dropped
    /// uncommitted, which rolls back everything `f` wrote.
    pub fn with_transaction<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Connection) -> Result<T, E>,
        E: From<DatabaseError>,
    {
        let conn = self.lock()?;
        let tx = conn.unchecked_transaction().map_err(DatabaseError::from)?;
        let value = f(&tx)?;
        tx.commit().map_err(DatabaseError::from)?;
        Ok(value)
    }
}

/// `~/.jobtrack/data/jobtrack.db`, or `None` without a home directory.
pub fn default_database_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".jobtrack").join("data").join("jobtrack.db"))
}
