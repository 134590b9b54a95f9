//! Step registry and executor.
//!
//! Migration definitions refer to their work by name. The host registers a
//! typed [`StepAction`] for each name at startup; the [`StepExecutor`]
//! resolves names against that registry. An unregistered name is a warning,
//! not an error: the step is skipped and the traversal moves on.

use crate::step_name::StepName;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

/// Error returned by a failing step action.
pub type StepFailure = Box<dyn std::error::Error + Send + Sync>;

/// A unit of migration work.
pub trait StepAction {
    /// Perform the step. Any error aborts the surrounding traversal.
    fn run(&self) -> Result<(), StepFailure>;
}

impl<F> StepAction for F
where
    F: Fn() -> Result<(), StepFailure>,
{
    fn run(&self) -> Result<(), StepFailure> {
        self()
    }
}

/// A step action failed.
#[derive(Error, Debug)]
#[error("[S001] Step '{step}' failed: {source}")]
pub struct StepError {
    /// Name of the failing step
    pub step: StepName,
    #[source]
    pub source: StepFailure,
}

/// Result of resolving and running one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// The action ran to completion
    Applied,
    /// No action is registered under the name; nothing ran
    NotFound,
}

/// Mapping from step name to action.
#[derive(Default)]
pub struct StepRegistry {
    actions: HashMap<StepName, Box<dyn StepAction>>,
}

impl StepRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `action` under `name`, replacing any earlier registration.
    pub fn register<A>(&mut self, name: StepName, action: A) -> &mut Self
    where
        A: StepAction + 'static,
    {
        if self.actions.insert(name.clone(), Box::new(action)).is_some() {
            log::warn!("Step '{name}' registered twice; the later action wins");
        }
        self
    }

    /// Builder-style registration of a closure step.
    ///
    /// Blank names are ignored with a warning.
    pub fn with<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn() -> Result<(), StepFailure> + 'static,
    {
        match StepName::try_new(name) {
            Some(step) => {
                self.register(step, f);
            }
            None => log::warn!("Ignoring step registration with a blank name"),
        }
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&dyn StepAction> {
        self.actions.get(name).map(|a| &**a)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&StepName> {
        let mut names: Vec<&StepName> = self.actions.keys().collect();
        names.sort();
        names
    }
}

impl fmt::Debug for StepRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepRegistry")
            .field("steps", &self.names())
            .finish()
    }
}

/// Resolves step names against a [`StepRegistry`] and invokes them.
#[derive(Debug, Default)]
pub struct StepExecutor {
    registry: StepRegistry,
}

impl StepExecutor {
    pub fn new(registry: StepRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// Run the step registered as `name`.
    ///
    /// Returns [`StepOutcome::NotFound`] without failing when nothing is
    /// registered under `name`.
    pub fn execute(&self, name: &StepName) -> Result<StepOutcome, StepError> {
        let Some(action) = self.registry.get(name) else {
            log::warn!("Step '{name}' not found, skipping");
            return Ok(StepOutcome::NotFound);
        };

        log::debug!("Running step '{name}'");
        action.run().map_err(|source| StepError {
            step: name.clone(),
            source,
        })?;
        Ok(StepOutcome::Applied)
    }
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod tests;
