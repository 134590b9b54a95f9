//! DuckDB storage for Stepladder.
//!
//! Holds the installed schema version and the migration log in the `sl_meta`
//! schema of the same database the migrations manage, and turns SQL steps
//! declared in configuration into step actions.

pub mod connection;
pub mod ddl;
pub mod error;
pub mod ledger;
pub mod migration;
pub mod options;
pub mod steps;

pub use connection::{LedgerDb, DEFAULT_VERSION_OPTION};
pub use error::{MetaError, MetaResult};
pub use steps::{sql_step_registry, SqlStep};
