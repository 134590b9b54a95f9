//! Log command implementation

use anyhow::{Context, Result};

use crate::cli::{GlobalArgs, LogArgs};
use crate::commands::common::{self, open_runner};

/// Execute the log command
pub(crate) fn execute(args: &LogArgs, global: &GlobalArgs) -> Result<()> {
    let (project, mut runner) = open_runner(global)?;
    common::auto_upgrade_if_enabled(&project, &mut runner, global);

    let entries = runner
        .log(args.limit)
        .context("Failed to read the migration log")?;

    if args.json {
        return common::print_json(&entries);
    }

    if entries.is_empty() {
        println!("No migrations recorded.");
        return Ok(());
    }

    let rows: Vec<Vec<String>> = entries
        .iter()
        .map(|e| {
            vec![
                e.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                e.run_id.clone(),
                e.direction.to_string(),
                e.from_version.to_string(),
                e.to_version.to_string(),
                e.status.to_string(),
                e.message.clone(),
            ]
        })
        .collect();
    common::print_table(
        &["AT", "RUN", "DIRECTION", "FROM", "TO", "STATUS", "MESSAGE"],
        &rows,
    );

    Ok(())
}
