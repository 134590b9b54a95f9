//! Ordered catalog of migration definitions.

use crate::error::{CoreError, CoreResult};
use crate::executor::StepRegistry;
use crate::step_name::StepName;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything needed to move into, or back out of, one schema version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MigrationDefinition {
    /// Version this migration brings the schema to
    pub version: Version,

    /// Human-readable summary
    #[serde(default)]
    pub description: String,

    /// Steps applied, in order, when moving into this version
    #[serde(default)]
    pub steps: Vec<StepName>,

    /// Steps applied, in order, when moving out of this version
    #[serde(default)]
    pub rollback: Vec<StepName>,
}

impl MigrationDefinition {
    pub fn new(version: Version, description: impl Into<String>) -> Self {
        Self {
            version,
            description: description.into(),
            steps: Vec::new(),
            rollback: Vec::new(),
        }
    }

    /// Append forward steps.
    pub fn steps<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let version = self.version;
        self.steps
            .extend(names.into_iter().filter_map(|n| non_blank(n, version, "step")));
        self
    }

    /// Append rollback steps.
    pub fn rollback<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let version = self.version;
        self.rollback
            .extend(names.into_iter().filter_map(|n| non_blank(n, version, "rollback step")));
        self
    }

    pub fn has_rollback(&self) -> bool {
        !self.rollback.is_empty()
    }
}

fn non_blank(name: impl Into<String>, version: Version, kind: &str) -> Option<StepName> {
    let step = StepName::try_new(name);
    if step.is_none() {
        log::warn!("Ignoring {kind} with a blank name in migration {version}");
    }
    step
}

/// How the catalog reacts to definitions that are not declared in
/// ascending version order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CatalogPolicy {
    /// Refuse to build
    #[default]
    Strict,
    /// Warn and sort
    Lenient,
}

/// A non-fatal finding from catalog validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogWarning {
    /// Declared after a higher version; the catalog was re-sorted
    OutOfOrder { version: Version, previous: Version },
    /// No forward steps
    NoSteps { version: Version },
    /// Forward steps but nothing to undo them with
    NoRollback { version: Version },
    /// Rollback list length differs from the forward list
    RollbackShapeMismatch {
        version: Version,
        steps: usize,
        rollback: usize,
    },
}

impl fmt::Display for CatalogWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogWarning::OutOfOrder { version, previous } => write!(
                f,
                "migration {version} is declared after {previous}; catalog was re-sorted"
            ),
            CatalogWarning::NoSteps { version } => {
                write!(f, "migration {version} declares no steps")
            }
            CatalogWarning::NoRollback { version } => {
                write!(f, "migration {version} declares no rollback steps and cannot be undone")
            }
            CatalogWarning::RollbackShapeMismatch {
                version,
                steps,
                rollback,
            } => write!(
                f,
                "migration {version} has {steps} step(s) but {rollback} rollback step(s); rollback may not undo it"
            ),
        }
    }
}

/// Immutable, ascending list of migration definitions.
#[derive(Debug, Clone, Default)]
pub struct MigrationCatalog {
    entries: Vec<MigrationDefinition>,
}

impl MigrationCatalog {
    /// Validate `definitions` and build the catalog.
    ///
    /// Duplicate versions are always rejected. Declaration order that is not
    /// strictly ascending is rejected under [`CatalogPolicy::Strict`] and
    /// sorted with a warning under [`CatalogPolicy::Lenient`]. Missing or
    /// mismatched rollback lists only produce warnings.
    pub fn build(
        definitions: Vec<MigrationDefinition>,
        policy: CatalogPolicy,
    ) -> CoreResult<(Self, Vec<CatalogWarning>)> {
        let mut warnings = Vec::new();

        for pair in definitions.windows(2) {
            let (previous, current) = (&pair[0], &pair[1]);
            if current.version == previous.version {
                return Err(CoreError::DuplicateVersion {
                    version: current.version,
                });
            }
            if current.version < previous.version {
                match policy {
                    CatalogPolicy::Strict => {
                        return Err(CoreError::CatalogOutOfOrder {
                            version: current.version,
                            previous: previous.version,
                        })
                    }
                    CatalogPolicy::Lenient => warnings.push(CatalogWarning::OutOfOrder {
                        version: current.version,
                        previous: previous.version,
                    }),
                }
            }
        }

        let mut entries = definitions;
        entries.sort_by_key(|d| d.version);
        // Non-adjacent duplicates only line up after sorting.
        if let Some(pair) = entries.windows(2).find(|p| p[0].version == p[1].version) {
            return Err(CoreError::DuplicateVersion {
                version: pair[0].version,
            });
        }

        for def in &entries {
            if def.steps.is_empty() {
                warnings.push(CatalogWarning::NoSteps {
                    version: def.version,
                });
            } else if def.rollback.is_empty() {
                warnings.push(CatalogWarning::NoRollback {
                    version: def.version,
                });
            } else if def.rollback.len() != def.steps.len() {
                warnings.push(CatalogWarning::RollbackShapeMismatch {
                    version: def.version,
                    steps: def.steps.len(),
                    rollback: def.rollback.len(),
                });
            }
        }

        for warning in &warnings {
            log::warn!("Catalog: {warning}");
        }

        Ok((Self { entries }, warnings))
    }

    /// Build a strict catalog, discarding warnings.
    pub fn from_definitions(definitions: Vec<MigrationDefinition>) -> CoreResult<Self> {
        Self::build(definitions, CatalogPolicy::Strict).map(|(catalog, _)| catalog)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Definitions in ascending version order.
    pub fn definitions(&self) -> &[MigrationDefinition] {
        &self.entries
    }

    pub fn all_versions_ascending(&self) -> Vec<Version> {
        self.entries.iter().map(|d| d.version).collect()
    }

    pub fn get(&self, version: Version) -> Option<&MigrationDefinition> {
        self.entries
            .binary_search_by_key(&version, |d| d.version)
            .ok()
            .map(|idx| &self.entries[idx])
    }

    /// Highest declared version.
    pub fn latest(&self) -> Option<Version> {
        self.entries.last().map(|d| d.version)
    }

    /// Versions a traversal from `from` to `to` passes through.
    ///
    /// Moving up returns every `v` with `from < v <= to`, ascending. Moving
    /// down returns every `v` with `to < v <= from`, descending, so the most
    /// recently introduced version is undone first. With `inclusive_upper`
    /// false the upper bound itself is excluded in both directions.
    pub fn versions_in_range(&self, from: Version, to: Version, inclusive_upper: bool) -> Vec<Version> {
        let (lower, upper) = if from <= to { (from, to) } else { (to, from) };
        let in_range = |v: Version| {
            v > lower && if inclusive_upper { v <= upper } else { v < upper }
        };

        let mut versions: Vec<Version> = self
            .entries
            .iter()
            .map(|d| d.version)
            .filter(|v| in_range(*v))
            .collect();
        if from > to {
            versions.reverse();
        }
        versions
    }

    /// Every forward or rollback step name `registry` cannot resolve.
    pub fn unresolved_steps(&self, registry: &StepRegistry) -> Vec<(Version, StepName)> {
        self.entries
            .iter()
            .flat_map(|def| {
                def.steps
                    .iter()
                    .chain(def.rollback.iter())
                    .filter(|name| !registry.contains(name))
                    .map(move |name| (def.version, name.clone()))
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
