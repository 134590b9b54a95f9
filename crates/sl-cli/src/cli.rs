//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};
use sl_core::Version;

/// Stepladder - schema version ledger and migration runner for DuckDB
#[derive(Parser, Debug)]
#[command(name = "ladder")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to project directory
    #[arg(short = 'p', long, global = true, default_value = ".")]
    pub project_dir: String,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override the database path from the config (`:memory:` allowed)
    #[arg(long, global = true, env = "SL_DATABASE")]
    pub database: Option<String>,

    /// Skip the automatic upgrade even when the config enables it
    #[arg(long, global = true)]
    pub no_auto_upgrade: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new project with an example migration
    Init(InitArgs),

    /// Show the installed and latest schema versions
    Status(StatusArgs),

    /// Show the steps an upgrade or rollback would run, without running them
    Plan(PlanArgs),

    /// Apply pending migrations
    Upgrade(UpgradeArgs),

    /// Undo migrations down to a target version
    Rollback(RollbackArgs),

    /// Show the migration log, most recent first
    Log(LogArgs),

    /// Check the config and migration catalog
    Validate,
}

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Project name (also the directory created)
    pub name: String,

    /// Database path written to the generated config
    #[arg(long, default_value = "stepladder.duckdb")]
    pub database_path: String,
}

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the plan command
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Target version (default: latest migration)
    #[arg(long)]
    pub to: Option<Version>,

    /// Plan a rollback to `--to` instead of an upgrade
    #[arg(long, requires = "to")]
    pub rollback: bool,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the upgrade command
#[derive(Args, Debug)]
pub struct UpgradeArgs {
    /// Target version (default: latest migration)
    #[arg(long)]
    pub to: Option<Version>,
}

/// Arguments for the rollback command
#[derive(Args, Debug)]
pub struct RollbackArgs {
    /// Version to roll back to; must be below the installed version
    #[arg(long)]
    pub to: Version,
}

/// Arguments for the log command
#[derive(Args, Debug)]
pub struct LogArgs {
    /// Maximum number of entries to show
    #[arg(short = 'n', long, default_value_t = 20)]
    pub limit: usize,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
