//! Forward/backward migration runner.
//!
//! The runner walks the catalog between the installed version and a target,
//! runs each version's steps through the [`StepExecutor`], and only then
//! records the new version in the ledger.
//!
//! Failure policy has two tiers:
//!
//! - per step, an unknown step name is skipped with a warning;
//! - per traversal, a failing step aborts everything that follows and leaves
//!   the installed version untouched.
//!
//! Steps change external state directly. Nothing is compensated when a
//! traversal aborts: steps that ran before the failing one stay applied, and
//! the operator decides whether to retry or roll back.

use crate::catalog::MigrationCatalog;
use crate::error::{LedgerResult, MigrationError, MigrationResult};
use crate::executor::{StepExecutor, StepOutcome};
use crate::ledger::{Direction, EntryStatus, LedgerEntry, VersionLedger};
use crate::step_name::StepName;
use crate::version::Version;
use chrono::Utc;
use serde::Serialize;
use std::fmt;
use std::time::Instant;
use uuid::Uuid;

/// Where the runner is in its last (or current) invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunnerPhase {
    Idle,
    ComputingRange,
    ApplyingSteps,
    Committing,
    /// The last invocation aborted; no cleanup was attempted
    Failed,
}

impl fmt::Display for RunnerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunnerPhase::Idle => "idle",
            RunnerPhase::ComputingRange => "computing range",
            RunnerPhase::ApplyingSteps => "applying steps",
            RunnerPhase::Committing => "committing",
            RunnerPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A step attributed to the version whose definition declared it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepRecord {
    pub version: Version,
    pub step: StepName,
}

/// Summary of a traversal that completed.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationReport {
    pub run_id: String,
    pub direction: Direction,
    pub from: Version,
    pub to: Version,
    /// Catalog versions walked, in traversal order
    pub versions: Vec<Version>,
    /// Steps whose action ran
    pub executed_steps: Vec<StepRecord>,
    /// Steps skipped because no action is registered
    pub skipped_steps: Vec<StepRecord>,
    /// Rollback only: versions that declare no rollback steps
    pub versions_without_rollback: Vec<Version>,
    pub duration_ms: u64,
}

impl MigrationReport {
    /// Free-form summary stored in the ledger.
    fn summary(&self) -> String {
        let versions: Vec<String> = self.versions.iter().map(|v| v.to_string()).collect();
        let mut message = format!(
            "{} {} -> {}: {} version(s) [{}], {} step(s) executed",
            self.direction,
            self.from,
            self.to,
            self.versions.len(),
            versions.join(", "),
            self.executed_steps.len()
        );
        if !self.skipped_steps.is_empty() {
            let skipped: Vec<String> = self
                .skipped_steps
                .iter()
                .map(|s| format!("{}@{}", s.step, s.version))
                .collect();
            message.push_str(&format!("; step not found: {}", skipped.join(", ")));
        }
        if !self.versions_without_rollback.is_empty() {
            let missing: Vec<String> = self
                .versions_without_rollback
                .iter()
                .map(|v| v.to_string())
                .collect();
            message.push_str(&format!("; no rollback steps: {}", missing.join(", ")));
        }
        message
    }
}

/// Result of [`MigrationRunner::upgrade_to`].
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// Installed version already at or past the target; nothing ran
    UpToDate { installed: Version },
    Migrated(MigrationReport),
}

impl RunOutcome {
    /// Installed version after the call.
    pub fn installed(&self) -> Version {
        match self {
            RunOutcome::UpToDate { installed } => *installed,
            RunOutcome::Migrated(report) => report.to,
        }
    }
}

/// Result of [`MigrationRunner::auto_upgrade`].
#[derive(Debug)]
pub enum AutoUpgrade {
    UpToDate(Version),
    Upgraded(MigrationReport),
    /// The upgrade failed; the host keeps running on the previous schema
    Failed(MigrationError),
}

/// One step a traversal would run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedStep {
    pub name: StepName,
    /// `false` when no action is registered; the step would be skipped
    pub resolved: bool,
}

/// One version a traversal would walk through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedVersion {
    pub version: Version,
    pub description: String,
    pub steps: Vec<PlannedStep>,
}

/// What a traversal would do, computed without side effects.
#[derive(Debug, Clone, Serialize)]
pub struct MigrationPlan {
    pub direction: Direction,
    pub from: Version,
    pub to: Version,
    pub versions: Vec<PlannedVersion>,
}

impl MigrationPlan {
    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Steps in execution order.
    pub fn step_names(&self) -> Vec<&StepName> {
        self.versions
            .iter()
            .flat_map(|v| v.steps.iter().map(|s| &s.name))
            .collect()
    }
}

/// Drives upgrades and rollbacks over an injected catalog, executor and ledger.
///
/// Assumes a single writer: nothing stops two processes from migrating the
/// same database at once.
pub struct MigrationRunner<L> {
    catalog: MigrationCatalog,
    executor: StepExecutor,
    ledger: L,
    phase: RunnerPhase,
}

impl<L: VersionLedger> MigrationRunner<L> {
    pub fn new(catalog: MigrationCatalog, executor: StepExecutor, ledger: L) -> Self {
        Self {
            catalog,
            executor,
            ledger,
            phase: RunnerPhase::Idle,
        }
    }

    pub fn catalog(&self) -> &MigrationCatalog {
        &self.catalog
    }

    pub fn executor(&self) -> &StepExecutor {
        &self.executor
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn ledger_mut(&mut self) -> &mut L {
        &mut self.ledger
    }

    pub fn into_ledger(self) -> L {
        self.ledger
    }

    /// Phase the last invocation ended in.
    pub fn phase(&self) -> RunnerPhase {
        self.phase
    }

    pub fn installed_version(&self) -> LedgerResult<Version> {
        self.ledger.installed_version()
    }

    pub fn latest_catalog_version(&self) -> Option<Version> {
        self.catalog.latest()
    }

    /// Whether the catalog declares a version above the installed one.
    pub fn is_update_available(&self) -> LedgerResult<bool> {
        let installed = self.ledger.installed_version()?;
        Ok(self
            .catalog
            .latest()
            .is_some_and(|latest| latest > installed))
    }

    /// Up to `limit` log entries, most recent first.
    pub fn log(&self, limit: usize) -> LedgerResult<Vec<LedgerEntry>> {
        self.ledger.query_log(limit)
    }

    /// What [`upgrade_to`](Self::upgrade_to) would run. Empty when already up to date.
    pub fn plan_upgrade(&self, target: Version) -> MigrationResult<MigrationPlan> {
        let current = self.ledger.installed_version()?;
        if current >= target {
            return Ok(self.plan(Direction::Upgrade, current, current, Vec::new()));
        }
        self.check_upgrade_target(current, target)?;
        let versions = self.catalog.versions_in_range(current, target, true);
        Ok(self.plan(Direction::Upgrade, current, target, versions))
    }

    /// What [`rollback_to`](Self::rollback_to) would run.
    pub fn plan_rollback(&self, target: Version) -> MigrationResult<MigrationPlan> {
        let current = self.ledger.installed_version()?;
        check_rollback_target(current, target)?;
        let versions = self.catalog.versions_in_range(current, target, true);
        Ok(self.plan(Direction::Rollback, current, target, versions))
    }

    /// Bring the schema up to `target`.
    ///
    /// A no-op returning [`RunOutcome::UpToDate`] when the installed version
    /// is already at or past `target`. Targets above the catalog's latest
    /// version are rejected before anything runs.
    pub fn upgrade_to(&mut self, target: Version) -> MigrationResult<RunOutcome> {
        self.phase = RunnerPhase::Idle;
        let current = self.read_installed()?;

        if current >= target {
            log::debug!("Schema at {current}, nothing to do for upgrade to {target}");
            return Ok(RunOutcome::UpToDate { installed: current });
        }

        self.phase = RunnerPhase::ComputingRange;
        if let Err(e) = self.check_upgrade_target(current, target) {
            self.phase = RunnerPhase::Failed;
            log::warn!("{e}");
            return Err(e);
        }
        let versions = self.catalog.versions_in_range(current, target, true);

        self.traverse(Direction::Upgrade, current, target, versions)
            .map(RunOutcome::Migrated)
    }

    /// Undo migrations down to `target`, newest first.
    ///
    /// `target` must be strictly below the installed version; anything else
    /// is rejected before a step runs and leaves the ledger untouched.
    pub fn rollback_to(&mut self, target: Version) -> MigrationResult<MigrationReport> {
        self.phase = RunnerPhase::Idle;
        let current = self.read_installed()?;

        self.phase = RunnerPhase::ComputingRange;
        if let Err(e) = check_rollback_target(current, target) {
            self.phase = RunnerPhase::Failed;
            log::warn!("{e}");
            return Err(e);
        }
        let versions = self.catalog.versions_in_range(current, target, true);

        self.traverse(Direction::Rollback, current, target, versions)
    }

    /// Upgrade to the catalog's latest version if the schema is behind.
    ///
    /// Never panics and never propagates: a failure is logged and returned as
    /// [`AutoUpgrade::Failed`] with the installed version unchanged.
    pub fn auto_upgrade(&mut self) -> AutoUpgrade {
        let Some(latest) = self.catalog.latest() else {
            return match self.read_installed() {
                Ok(installed) => AutoUpgrade::UpToDate(installed),
                Err(e) => {
                    log::error!("Automatic upgrade skipped: {e}");
                    AutoUpgrade::Failed(e)
                }
            };
        };

        match self.upgrade_to(latest) {
            Ok(RunOutcome::UpToDate { installed }) => {
                if installed > latest {
                    log::warn!(
                        "Installed schema {installed} is newer than the latest known migration {latest}"
                    );
                }
                AutoUpgrade::UpToDate(installed)
            }
            Ok(RunOutcome::Migrated(report)) => AutoUpgrade::Upgraded(report),
            Err(e) => {
                log::error!(
                    "Automatic upgrade to {latest} failed: {e}. Continuing on the previous schema"
                );
                AutoUpgrade::Failed(e)
            }
        }
    }

    fn read_installed(&mut self) -> MigrationResult<Version> {
        self.ledger.installed_version().map_err(|e| {
            self.phase = RunnerPhase::Failed;
            log::error!("Cannot read installed version: {e}");
            MigrationError::Ledger(e)
        })
    }

    fn check_upgrade_target(&self, current: Version, target: Version) -> MigrationResult<()> {
        match self.catalog.latest() {
            Some(latest) if target <= latest => Ok(()),
            Some(latest) => Err(MigrationError::InvalidTarget {
                direction: Direction::Upgrade,
                current,
                target,
                reason: format!("latest known migration is {latest}"),
            }),
            None => Err(MigrationError::InvalidTarget {
                direction: Direction::Upgrade,
                current,
                target,
                reason: "the catalog declares no migrations".to_string(),
            }),
        }
    }

    fn plan(
        &self,
        direction: Direction,
        from: Version,
        to: Version,
        versions: Vec<Version>,
    ) -> MigrationPlan {
        let registry = self.executor.registry();
        let versions = versions
            .into_iter()
            .filter_map(|v| self.catalog.get(v))
            .map(|def| {
                let names = match direction {
                    Direction::Upgrade => &def.steps,
                    Direction::Rollback => &def.rollback,
                };
                PlannedVersion {
                    version: def.version,
                    description: def.description.clone(),
                    steps: names
                        .iter()
                        .map(|name| PlannedStep {
                            name: name.clone(),
                            resolved: registry.contains(name),
                        })
                        .collect(),
                }
            })
            .collect();

        MigrationPlan {
            direction,
            from,
            to,
            versions,
        }
    }

    fn traverse(
        &mut self,
        direction: Direction,
        from: Version,
        to: Version,
        versions: Vec<Version>,
    ) -> MigrationResult<MigrationReport> {
        let Self {
            catalog,
            executor,
            ledger,
            phase,
        } = self;

        let started = Instant::now();
        let run_id = Uuid::new_v4().to_string()[..8].to_string();
        log::info!(
            "Starting {direction} from {from} to {to} ({} version(s), run {run_id})",
            versions.len()
        );

        let mut report = MigrationReport {
            run_id,
            direction,
            from,
            to,
            versions: Vec::with_capacity(versions.len()),
            executed_steps: Vec::new(),
            skipped_steps: Vec::new(),
            versions_without_rollback: Vec::new(),
            duration_ms: 0,
        };

        *phase = RunnerPhase::ApplyingSteps;
        for version in versions {
            let Some(def) = catalog.get(version) else {
                continue;
            };
            report.versions.push(version);

            let steps = match direction {
                Direction::Upgrade => &def.steps,
                Direction::Rollback => &def.rollback,
            };
            if direction == Direction::Rollback && steps.is_empty() {
                log::warn!("Migration {version} declares no rollback steps, skipping");
                report.versions_without_rollback.push(version);
                continue;
            }

            log::info!("{direction} {version}: {}", def.description);
            for name in steps {
                let record = StepRecord {
                    version,
                    step: name.clone(),
                };
                match executor.execute(name) {
                    Ok(StepOutcome::Applied) => report.executed_steps.push(record),
                    Ok(StepOutcome::NotFound) => report.skipped_steps.push(record),
                    Err(source) => {
                        *phase = RunnerPhase::Failed;
                        let err = MigrationError::StepFailed {
                            direction,
                            version,
                            source,
                        };
                        log::error!("{err}");
                        let message = format!(
                            "{err} ({} step(s) executed before the failure)",
                            report.executed_steps.len()
                        );
                        append_best_effort(
                            ledger,
                            entry(&report, EntryStatus::Failed, message),
                        );
                        return Err(err);
                    }
                }
            }
        }

        *phase = RunnerPhase::Committing;
        if let Err(source) = ledger.set_installed_version(to) {
            *phase = RunnerPhase::Failed;
            let err = MigrationError::VersionNotRecorded {
                direction,
                from,
                to,
                source,
            };
            log::error!("{err}");
            append_best_effort(ledger, entry(&report, EntryStatus::Failed, err.to_string()));
            return Err(err);
        }

        report.duration_ms = started.elapsed().as_millis() as u64;
        let summary = report.summary();
        append_best_effort(ledger, entry(&report, EntryStatus::Success, summary));
        *phase = RunnerPhase::Idle;

        log::info!(
            "Finished {direction} to {to} in {}ms ({} step(s), {} skipped)",
            report.duration_ms,
            report.executed_steps.len(),
            report.skipped_steps.len()
        );
        Ok(report)
    }
}

fn check_rollback_target(current: Version, target: Version) -> MigrationResult<()> {
    if target >= current {
        return Err(MigrationError::InvalidTarget {
            direction: Direction::Rollback,
            current,
            target,
            reason: "rollback target must be below the installed version".to_string(),
        });
    }
    Ok(())
}

fn entry(report: &MigrationReport, status: EntryStatus, message: String) -> LedgerEntry {
    LedgerEntry {
        run_id: report.run_id.clone(),
        from_version: report.from,
        to_version: report.to,
        direction: report.direction,
        status,
        message,
        created_at: Utc::now(),
    }
}

/// Log writes never abort or mask the outcome they describe.
fn append_best_effort<L: VersionLedger>(ledger: &mut L, entry: LedgerEntry) {
    if let Err(e) = ledger.append_log(&entry) {
        log::warn!(
            "Could not record {} {} entry for run {}: {e}",
            entry.direction,
            entry.status,
            entry.run_id
        );
    }
}

#[cfg(test)]
#[path = "runner_test.rs"]
mod tests;
