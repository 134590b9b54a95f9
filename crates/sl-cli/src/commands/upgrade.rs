//! Upgrade command implementation

use anyhow::{Context, Result};
use sl_core::RunOutcome;

use crate::cli::{GlobalArgs, UpgradeArgs};
use crate::commands::common::{self, open_runner};

/// Execute the upgrade command
pub(crate) fn execute(args: &UpgradeArgs, global: &GlobalArgs) -> Result<()> {
    let (_project, mut runner) = open_runner(global)?;

    let target = match args.to {
        Some(target) => target,
        None => runner
            .latest_catalog_version()
            .context("The catalog declares no migrations")?,
    };

    match runner.upgrade_to(target) {
        Ok(RunOutcome::UpToDate { installed }) => {
            println!("Schema is up to date at {installed}");
            Ok(())
        }
        Ok(RunOutcome::Migrated(report)) => {
            common::print_report(&report);
            Ok(())
        }
        Err(err) => Err(common::migration_failed(&err)),
    }
}
