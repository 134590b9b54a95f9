//! sl-core - Core library for Stepladder
//!
//! This crate provides the schema [`Version`] type, the ordered
//! [`MigrationCatalog`], the named-step [`StepExecutor`], the
//! [`VersionLedger`] persistence trait, and the [`MigrationRunner`] that
//! drives upgrades and rollbacks across them.

pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod ledger;
mod newtype_string;
pub mod runner;
pub mod step_name;
pub mod version;

pub use catalog::{CatalogPolicy, CatalogWarning, MigrationCatalog, MigrationDefinition};
pub use config::Config;
pub use error::{CoreError, CoreResult, LedgerError, LedgerResult, MigrationError, MigrationResult};
pub use executor::{StepAction, StepError, StepExecutor, StepFailure, StepOutcome, StepRegistry};
pub use ledger::{Direction, EntryStatus, LedgerEntry, MemoryLedger, VersionLedger};
pub use runner::{
    AutoUpgrade, MigrationPlan, MigrationReport, MigrationRunner, PlannedStep, PlannedVersion,
    RunOutcome, RunnerPhase, StepRecord,
};
pub use step_name::StepName;
pub use version::Version;
