//! Bootstrap for the ledger's own tables.
//!
//! Tracks applied DDL versions in `sl_meta.schema_version` and runs any
//! unapplied ones on each open. This is separate from the user schema
//! version, which is stored as an option.

use crate::ddl::MIGRATIONS;
use crate::error::{MetaError, MetaResult};
use duckdb::Connection;

/// Ensure the `sl_meta` schema and `schema_version` table exist.
fn ensure_version_table(conn: &Connection) -> MetaResult<()> {
    conn.execute_batch(
        "CREATE SCHEMA IF NOT EXISTS sl_meta;
         CREATE TABLE IF NOT EXISTS sl_meta.schema_version (
             version    INTEGER NOT NULL,
             applied_at TIMESTAMP NOT NULL DEFAULT now()
         );",
    )
    .map_err(|e| {
        MetaError::MigrationError(format!("failed to create schema_version table: {e}"))
    })?;
    Ok(())
}

/// Return the highest applied ledger DDL version, or 0 if none.
pub(crate) fn current_version(conn: &Connection) -> MetaResult<i32> {
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM sl_meta.schema_version",
            [],
            |row| row.get(0),
        )
        .map_err(|e| MetaError::MigrationError(format!("failed to read schema version: {e}")))?;
    Ok(version)
}

/// Create or upgrade the ledger tables in `conn`.
///
/// Each DDL batch and its version row are committed together, so a crash
/// never leaves a batch applied but unrecorded.
pub fn run_migrations(conn: &Connection) -> MetaResult<()> {
    ensure_version_table(conn)?;
    let current = current_version(conn)?;

    for migration in MIGRATIONS {
        if migration.version <= current {
            continue;
        }
        log::debug!("Applying ledger DDL v{:03}", migration.version);

        let batch = format!(
            "BEGIN TRANSACTION;\n{}\nINSERT INTO sl_meta.schema_version (version) VALUES ({});\nCOMMIT;",
            migration.sql, migration.version
        );
        if let Err(e) = conn.execute_batch(&batch) {
            let _ = conn.execute_batch("ROLLBACK");
            return Err(MetaError::MigrationError(format!(
                "ledger DDL v{:03} failed: {e}",
                migration.version
            )));
        }
    }
    Ok(())
}
