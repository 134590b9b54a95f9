//! Status command implementation

use anyhow::{Context, Result};
use serde::Serialize;
use sl_core::Version;

use crate::cli::{GlobalArgs, StatusArgs};
use crate::commands::common::{self, open_runner};

#[derive(Debug, Serialize)]
struct StatusReport {
    project: String,
    database: String,
    version_option: String,
    installed: Version,
    latest: Option<Version>,
    update_available: bool,
    pending: Vec<Version>,
}

/// Execute the status command
pub(crate) fn execute(args: &StatusArgs, global: &GlobalArgs) -> Result<()> {
    let (project, mut runner) = open_runner(global)?;
    common::auto_upgrade_if_enabled(&project, &mut runner, global);

    let installed = runner
        .installed_version()
        .context("Failed to read the installed version")?;
    let latest = runner.latest_catalog_version();
    let pending = match latest {
        Some(latest) if latest > installed => {
            runner.catalog().versions_in_range(installed, latest, true)
        }
        _ => Vec::new(),
    };

    let report = StatusReport {
        project: project.config.name.clone(),
        database: project.database_path(global),
        version_option: project.config.version_option.clone(),
        installed,
        latest,
        update_available: !pending.is_empty(),
        pending,
    };

    if args.json {
        return common::print_json(&report);
    }

    println!("Project:         {}", report.project);
    println!("Database:        {}", report.database);
    println!("Version option:  {}", report.version_option);
    println!("Installed:       {}", report.installed);
    match report.latest {
        Some(latest) => println!("Latest:          {latest}"),
        None => println!("Latest:          (no migrations declared)"),
    }
    if report.pending.is_empty() {
        println!("\nSchema is up to date.");
    } else {
        let pending: Vec<String> = report.pending.iter().map(|v| v.to_string()).collect();
        println!(
            "\n{} pending migration(s): {}",
            pending.len(),
            pending.join(", ")
        );
    }
    if let Some(latest) = report.latest {
        if report.installed > latest {
            println!("Warning: installed version is newer than the latest known migration");
        }
    }

    Ok(())
}
