//! Init command implementation - scaffolds a new Stepladder project

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::cli::InitArgs;

/// Execute the init command
pub(crate) fn execute(args: &InitArgs) -> Result<()> {
    // Reject names that could cause path traversal or confusing directory names
    if args.name.contains('/')
        || args.name.contains('\\')
        || args.name.contains("..")
        || args.name.starts_with('.')
        || args.name.starts_with('-')
    {
        anyhow::bail!(
            "Invalid project name '{}': must not contain '/', '\\', '..', or start with '.' or '-'",
            args.name
        );
    }

    let project_dir = Path::new(&args.name);

    if project_dir.exists() {
        anyhow::bail!(
            "Directory '{}' already exists. Choose a different project name.",
            args.name
        );
    }

    println!("Creating new Stepladder project: {}\n", args.name);

    fs::create_dir_all(project_dir)
        .with_context(|| format!("Failed to create directory: {}", project_dir.display()))?;

    // Escape YAML special characters in interpolated values
    let safe_name = args.name.replace('"', "\\\"");
    let safe_db_path = args.database_path.replace('"', "\\\"");
    let config_content = format!(
        r#"name: "{name}"

database:
  path: "{db_path}"

# Option key holding the installed schema version
version_option: schema_version

# Upgrade to the latest migration whenever `ladder status` or `ladder log` runs
auto_upgrade: false

# strict: migrations must be declared in ascending version order
# lenient: out-of-order declarations are sorted with a warning
catalog_policy: strict

migrations:
  - version: "1.0.0"
    description: Create the example table
    steps: [create_example]
    rollback: [drop_example]

steps:
  create_example: |
    CREATE TABLE example (
        id         INTEGER PRIMARY KEY,
        name       VARCHAR NOT NULL,
        created_at TIMESTAMP DEFAULT now()
    );
  drop_example: DROP TABLE example;
"#,
        name = safe_name,
        db_path = safe_db_path,
    );
    fs::write(project_dir.join("stepladder.yml"), config_content)
        .context("Failed to write stepladder.yml")?;

    let gitignore = "*.duckdb\n*.duckdb.wal\n";
    fs::write(project_dir.join(".gitignore"), gitignore).context("Failed to write .gitignore")?;

    println!("  Created stepladder.yml");
    println!("  Created .gitignore");
    println!();
    println!("Project '{}' initialized successfully!", args.name);
    println!();
    println!("Next steps:");
    println!("  cd {}", args.name);
    println!("  ladder validate    # Check the migration catalog");
    println!("  ladder upgrade     # Apply all migrations");

    Ok(())
}
