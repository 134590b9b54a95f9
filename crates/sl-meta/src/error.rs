//! Error types for the ledger database.

use sl_core::LedgerError;
use thiserror::Error;

/// Ledger database errors.
#[derive(Error, Debug)]
pub enum MetaError {
    /// Failed to open or create the ledger database (M001).
    #[error("[M001] Ledger database connection failed: {0}")]
    ConnectionError(String),

    /// Bootstrapping the ledger tables failed (M002).
    #[error("[M002] Ledger database bootstrap failed: {0}")]
    MigrationError(String),

    /// SQL execution error inside the ledger database (M003).
    #[error("[M003] Ledger database query failed: {0}")]
    QueryError(String),

    /// Transaction management error (M004).
    #[error("[M004] Ledger database transaction failed: {0}")]
    TransactionError(String),

    /// A SQL step failed (M005).
    #[error("[M005] SQL step failed: {0}")]
    StepError(String),
}

/// Result type alias for [`MetaError`].
pub type MetaResult<T> = Result<T, MetaError>;

/// Attach a short operation label to DuckDB failures.
pub(crate) trait MetaResultExt<T> {
    /// Map into [`MetaError::QueryError`] as `"{operation}: {error}"`.
    fn meta_context(self, operation: &str) -> MetaResult<T>;

    /// Map into [`LedgerError::Backend`] for the [`sl_core::VersionLedger`] impl.
    fn ledger_context(self, operation: &'static str) -> Result<T, LedgerError>;
}

impl<T> MetaResultExt<T> for Result<T, duckdb::Error> {
    fn meta_context(self, operation: &str) -> MetaResult<T> {
        self.map_err(|e| MetaError::QueryError(format!("{operation}: {e}")))
    }

    fn ledger_context(self, operation: &'static str) -> Result<T, LedgerError> {
        self.map_err(|e| LedgerError::Backend {
            operation,
            message: e.to_string(),
        })
    }
}
