//! Error types for sl-core

use crate::executor::StepError;
use crate::ledger::Direction;
use crate::version::Version;
use thiserror::Error;

/// Core error type for configuration and catalog construction
#[derive(Error, Debug)]
pub enum CoreError {
    /// E001: Configuration file not found
    #[error("[E001] Config file not found: {path}")]
    ConfigNotFound { path: String },

    /// E002: Failed to parse configuration file
    #[error("[E002] Failed to parse config: {message}")]
    ConfigParseError { message: String },

    /// E003: Invalid configuration value
    #[error("[E003] Invalid config: {message}")]
    ConfigInvalid { message: String },

    /// E004: Version string could not be parsed
    #[error("[E004] Invalid version '{input}': {reason}")]
    InvalidVersion { input: String, reason: String },

    /// E005: The same version is declared twice in the catalog
    #[error("[E005] Duplicate migration version: {version}")]
    DuplicateVersion { version: Version },

    /// E006: Catalog declaration order is not strictly ascending
    #[error("[E006] Migration {version} is declared after {previous}; versions must be declared in ascending order")]
    CatalogOutOfOrder { version: Version, previous: Version },

    /// E007: IO error with file path context
    #[error("[E007] Failed to read '{path}': {source}")]
    IoWithPath {
        path: String,
        source: std::io::Error,
    },

    /// E008: YAML parse error
    #[error("[E008] YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml::Error),
}

/// Result type alias for CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Failure of the persistence layer behind a [`crate::VersionLedger`].
#[derive(Error, Debug)]
pub enum LedgerError {
    /// L001: The backing store rejected a read or write
    #[error("[L001] Ledger {operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },

    /// L002: A stored value could not be interpreted
    #[error("[L002] Ledger value for '{key}' is corrupt: {value:?}")]
    Corrupt { key: String, value: String },
}

/// Result type alias for LedgerError
pub type LedgerResult<T> = Result<T, LedgerError>;

/// Structured failure of an upgrade or rollback request.
///
/// Every variant carries enough context (versions, step name, cause) to
/// diagnose the failure and retry or roll back by hand.
#[derive(Error, Debug)]
pub enum MigrationError {
    /// SL001: Target rejected before any step ran
    #[error("[SL001] Cannot {direction} from {current} to {target}: {reason}")]
    InvalidTarget {
        direction: Direction,
        current: Version,
        target: Version,
        reason: String,
    },

    /// SL002: A step action failed; the traversal stopped at this step
    #[error("[SL002] {direction} aborted while applying {version}: {source}. Steps already applied were not reverted")]
    StepFailed {
        direction: Direction,
        version: Version,
        #[source]
        source: StepError,
    },

    /// SL003: The ledger could not be read, nothing was executed
    #[error("[SL003] {0}")]
    Ledger(#[from] LedgerError),

    /// SL004: Every step succeeded but the new version could not be stored
    #[error("[SL004] {direction} from {from} to {to} applied all steps but the installed version was not recorded: {source}. Reconcile the stored version manually")]
    VersionNotRecorded {
        direction: Direction,
        from: Version,
        to: Version,
        #[source]
        source: LedgerError,
    },
}

impl MigrationError {
    /// Name of the step that failed, when the failure came from a step action.
    pub fn failed_step(&self) -> Option<&str> {
        match self {
            MigrationError::StepFailed { source, .. } => Some(source.step.as_str()),
            _ => None,
        }
    }

    /// Returns `true` when the request was refused before any step ran.
    pub fn rejected_before_steps(&self) -> bool {
        matches!(
            self,
            MigrationError::InvalidTarget { .. } | MigrationError::Ledger(_)
        )
    }
}

/// Result type alias for MigrationError
pub type MigrationResult<T> = Result<T, MigrationError>;
