//! Rollback command implementation

use anyhow::Result;

use crate::cli::{GlobalArgs, RollbackArgs};
use crate::commands::common::{self, open_runner};

/// Execute the rollback command
pub(crate) fn execute(args: &RollbackArgs, global: &GlobalArgs) -> Result<()> {
    let (_project, mut runner) = open_runner(global)?;

    match runner.rollback_to(args.to) {
        Ok(report) => {
            common::print_report(&report);
            if !report.versions_without_rollback.is_empty() {
                println!(
                    "\nWarning: {} version(s) had no rollback steps; their changes remain",
                    report.versions_without_rollback.len()
                );
            }
            Ok(())
        }
        Err(err) => Err(common::migration_failed(&err)),
    }
}
