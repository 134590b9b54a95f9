//! Shared utilities for CLI commands

use anyhow::{Context, Result};
use serde::Serialize;
use sl_core::{AutoUpgrade, Config, MigrationError, MigrationReport, MigrationRunner, StepExecutor};
use sl_meta::{sql_step_registry, LedgerDb};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::cli::GlobalArgs;

/// Error type representing a non-zero process exit code.
///
/// Use `return Err(ExitCode(N).into())` instead of `std::process::exit(N)`
/// so that RAII destructors run and cleanup happens properly.
#[derive(Debug)]
pub(crate) struct ExitCode(pub(crate) i32);

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Control flow only; the command already printed its own message.
        write!(f, "")
    }
}

impl std::error::Error for ExitCode {}

/// A loaded project: its directory and parsed config.
pub(crate) struct Project {
    pub(crate) root: PathBuf,
    pub(crate) config: Config,
}

impl Project {
    /// Database path after applying `--database` / `SL_DATABASE`.
    pub(crate) fn database_path(&self, global: &GlobalArgs) -> String {
        self.config
            .database_path(&self.root, global.database.as_deref())
    }
}

/// Load the project from the directory (or config file) in the global arguments.
pub(crate) fn load_project(global: &GlobalArgs) -> Result<Project> {
    let root = PathBuf::from(&global.project_dir);
    let config = match &global.config {
        Some(path) => Config::load(Path::new(path)),
        None => Config::load_from_dir(&root),
    }
    .context("Failed to load project configuration")?;
    Ok(Project { root, config })
}

/// Open the project's database with the configured version option.
pub(crate) fn open_ledger(project: &Project, global: &GlobalArgs) -> Result<LedgerDb> {
    let path = project.database_path(global);
    log::debug!("Opening database {path}");
    let db = LedgerDb::open_path(&path)
        .with_context(|| format!("Failed to open database: {path}"))?;
    Ok(db.with_version_option(project.config.version_option.clone()))
}

/// Load the project and wire a runner over its catalog, SQL steps and database.
pub(crate) fn open_runner(global: &GlobalArgs) -> Result<(Project, MigrationRunner<LedgerDb>)> {
    let project = load_project(global)?;
    let (catalog, _warnings) = project
        .config
        .build_catalog()
        .context("Invalid migration catalog")?;
    let db = open_ledger(&project, global)?;
    let registry =
        sql_step_registry(&db, &project.config.steps).context("Failed to register SQL steps")?;
    let runner = MigrationRunner::new(catalog, StepExecutor::new(registry), db);
    Ok((project, runner))
}

/// Run the automatic upgrade when the config enables it.
///
/// Notices go to stderr so JSON output stays parseable. A failure does not
/// fail the command; the database stays on its previous version.
pub(crate) fn auto_upgrade_if_enabled(
    project: &Project,
    runner: &mut MigrationRunner<LedgerDb>,
    global: &GlobalArgs,
) {
    if !project.config.auto_upgrade || global.no_auto_upgrade {
        return;
    }
    match runner.auto_upgrade() {
        AutoUpgrade::UpToDate(_) => {}
        AutoUpgrade::Upgraded(report) => {
            eprintln!(
                "Automatically upgraded schema {} -> {}",
                report.from, report.to
            );
        }
        AutoUpgrade::Failed(err) => {
            eprintln!("Warning: automatic upgrade failed: {err}");
        }
    }
}

/// Print a migration failure and convert it to an exit code.
///
/// Requests refused before any step ran exit with 2; failures after steps
/// started exit with 1.
pub(crate) fn migration_failed(err: &MigrationError) -> anyhow::Error {
    eprintln!("Error: {err}");
    if let Some(step) = err.failed_step() {
        eprintln!("  failed step: {step}");
    }
    let code = if err.rejected_before_steps() { 2 } else { 1 };
    ExitCode(code).into()
}

/// Print the outcome of a completed upgrade or rollback.
pub(crate) fn print_report(report: &MigrationReport) {
    println!(
        "{} {} -> {} complete in {}ms (run {})",
        capitalize(report.direction.as_str()),
        report.from,
        report.to,
        report.duration_ms,
        report.run_id
    );
    for record in &report.executed_steps {
        println!("  ✓ {} ({})", record.step, record.version);
    }
    for record in &report.skipped_steps {
        println!("  - {} ({}): no action registered, skipped", record.step, record.version);
    }
    for version in &report.versions_without_rollback {
        println!("  - {version}: no rollback steps, left in place");
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Serialize `value` as pretty JSON to stdout.
pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize JSON output")?;
    println!("{json}");
    Ok(())
}

/// Calculate column widths for a table given headers and rows.
pub(crate) fn calculate_column_widths(headers: &[&str], rows: &[Vec<String>]) -> Vec<usize> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.chars().count());
        }
    }
    widths
}

/// Print a formatted table to stdout.
///
/// Left-aligned header row, a separator line of dashes, then each data row.
/// Columns are separated by two spaces.
pub(crate) fn print_table(headers: &[&str], rows: &[Vec<String>]) {
    let widths = calculate_column_widths(headers, rows);

    let header_parts: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, &w)| format!("{:<width$}", h, width = w))
        .collect();
    println!("{}", header_parts.join("  ").trim_end());

    let sep_parts: Vec<String> = widths.iter().map(|&w| "-".repeat(w)).collect();
    println!("{}", sep_parts.join("  "));

    for row in rows {
        let row_parts: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, &w)| format!("{:<width$}", cell, width = w))
            .collect();
        println!("{}", row_parts.join("  ").trim_end());
    }
}
