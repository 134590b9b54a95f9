//! Validate command implementation

use anyhow::{Context, Result};
use sl_meta::{sql_step_registry, LedgerDb};
use std::collections::BTreeSet;

use crate::cli::GlobalArgs;
use crate::commands::common::{load_project, ExitCode};

/// Execute the validate command
///
/// Loads the config, builds the catalog, and resolves every declared step
/// against the configured SQL. Never touches the project database.
pub(crate) fn execute(global: &GlobalArgs) -> Result<()> {
    let project = load_project(global)?;
    println!("Validating project: {}\n", project.config.name);

    let (catalog, warnings) = project
        .config
        .build_catalog()
        .context("Invalid migration catalog")?;
    println!("  ✓ {} migration(s) declared", catalog.len());

    // Steps are resolved on a scratch database so validation has no side effects.
    let scratch = LedgerDb::open_memory().context("Failed to open scratch database")?;
    let registry = sql_step_registry(&scratch, &project.config.steps)
        .context("Failed to register SQL steps")?;
    let unresolved = catalog.unresolved_steps(&registry);

    let referenced: BTreeSet<&str> = catalog
        .definitions()
        .iter()
        .flat_map(|def| def.steps.iter().chain(def.rollback.iter()))
        .map(|name| name.as_str())
        .collect();
    let unused: Vec<&str> = project
        .config
        .steps
        .keys()
        .map(String::as_str)
        .filter(|name| !referenced.contains(name))
        .collect();

    for warning in &warnings {
        println!("  ⚠ {warning}");
    }
    for name in &unused {
        println!("  ⚠ Step '{name}' is defined but never referenced");
    }
    for (version, step) in &unresolved {
        println!("  ✗ Migration {version} references undefined step '{step}'");
    }

    println!();
    if unresolved.is_empty() {
        println!(
            "Validation passed with {} warning(s)",
            warnings.len() + unused.len()
        );
        Ok(())
    } else {
        println!("Validation failed: {} undefined step(s)", unresolved.len());
        Err(ExitCode(1).into())
    }
}
