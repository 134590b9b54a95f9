//! SQL step actions.
//!
//! A SQL step is a named batch of statements declared in configuration. Each
//! step runs in its own transaction on a connection shared by all SQL steps,
//! separate from the ledger's connection but open on the same database.

use crate::connection::{with_transaction, LedgerDb};
use crate::error::{MetaError, MetaResult};
use duckdb::Connection;
use sl_core::{StepAction, StepFailure, StepName, StepRegistry};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Executes one SQL batch.
pub struct SqlStep {
    conn: Rc<Connection>,
    sql: String,
}

impl SqlStep {
    pub fn new(conn: Rc<Connection>, sql: impl Into<String>) -> Self {
        Self {
            conn,
            sql: sql.into(),
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }
}

impl StepAction for SqlStep {
    fn run(&self) -> Result<(), StepFailure> {
        with_transaction(&self.conn, |conn| {
            conn.execute_batch(&self.sql)
                .map_err(|e| MetaError::StepError(e.to_string()))
        })
        .map_err(|e| Box::new(e) as StepFailure)
    }
}

/// Register one [`SqlStep`] per entry of `steps` (name → SQL).
pub fn sql_step_registry(db: &LedgerDb, steps: &BTreeMap<String, String>) -> MetaResult<StepRegistry> {
    let conn = Rc::new(db.try_clone_conn()?);
    let mut registry = StepRegistry::new();
    for (name, sql) in steps {
        let Some(step) = StepName::try_new(name.as_str()) else {
            log::warn!("Skipping SQL step with a blank name");
            continue;
        };
        registry.register(step, SqlStep::new(Rc::clone(&conn), sql.as_str()));
    }
    log::debug!("Registered {} SQL step(s)", registry.len());
    Ok(registry)
}

#[cfg(test)]
#[path = "steps_test.rs"]
mod tests;
