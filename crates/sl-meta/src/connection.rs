//! Ledger database connection wrapper.
//!
//! [`LedgerDb`] owns a DuckDB [`Connection`] and provides helpers for opening,
//! bootstrapping, and transacting against the database that holds both the
//! managed schema and the `sl_meta` ledger tables.

use crate::error::{MetaError, MetaResult};
use crate::migration::run_migrations;
use duckdb::Connection;
use std::path::Path;

/// Option key used for the installed version when none is configured.
pub const DEFAULT_VERSION_OPTION: &str = "schema_version";

/// Wrapper around a DuckDB connection.
///
/// Single-threaded: the runner applies migrations sequentially, so no
/// `Mutex` is needed.
pub struct LedgerDb {
    conn: Connection,
    version_option: String,
}

impl LedgerDb {
    /// Open (or create) the database at `path` and bootstrap the ledger tables.
    pub fn open(path: &Path) -> MetaResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| MetaError::ConnectionError(format!("{e}: {}", path.display())))?;
        Self::from_connection(conn)
    }

    /// Create an in-memory database with the ledger tables bootstrapped.
    ///
    /// Useful for unit tests that don't need persistence.
    pub fn open_memory() -> MetaResult<Self> {
        let conn =
            Connection::open_in_memory().map_err(|e| MetaError::ConnectionError(e.to_string()))?;
        Self::from_connection(conn)
    }

    /// Open from a path string, treating `:memory:` as an in-memory database.
    pub fn open_path(path: &str) -> MetaResult<Self> {
        if path == ":memory:" {
            Self::open_memory()
        } else {
            Self::open(Path::new(path))
        }
    }

    fn from_connection(conn: Connection) -> MetaResult<Self> {
        run_migrations(&conn)?;
        Ok(Self {
            conn,
            version_option: DEFAULT_VERSION_OPTION.to_string(),
        })
    }

    /// Store the installed version under `key` instead of the default.
    pub fn with_version_option(mut self, key: impl Into<String>) -> Self {
        self.version_option = key.into();
        self
    }

    /// Option key holding the installed version.
    pub fn version_option(&self) -> &str {
        &self.version_option
    }

    /// Borrow the underlying DuckDB connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// A second connection to the same database, for step actions.
    pub fn try_clone_conn(&self) -> MetaResult<Connection> {
        self.conn
            .try_clone()
            .map_err(|e| MetaError::ConnectionError(format!("clone failed: {e}")))
    }
}

/// Run `body` inside a `BEGIN` / `COMMIT` transaction on `conn`, rolling
/// back on error.
pub(crate) fn with_transaction<F, T>(conn: &Connection, body: F) -> MetaResult<T>
where
    F: FnOnce(&Connection) -> MetaResult<T>,
{
    conn.execute_batch("BEGIN TRANSACTION")
        .map_err(|e| MetaError::TransactionError(format!("BEGIN failed: {e}")))?;

    let result = body(conn);

    match &result {
        Ok(_) => {
            if let Err(commit_err) = conn.execute_batch("COMMIT") {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(MetaError::TransactionError(format!(
                    "COMMIT failed: {commit_err}"
                )));
            }
        }
        Err(_) => {
            let _ = conn.execute_batch("ROLLBACK");
        }
    }
    result
}

#[cfg(test)]
#[path = "connection_test.rs"]
mod tests;
