//! Installed-version record and append-only migration log.

use crate::error::{LedgerError, LedgerResult};
use crate::version::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Upgrade,
    Rollback,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Upgrade => "upgrade",
            Direction::Rollback => "rollback",
        }
    }

    /// Parse the stored representation written by [`as_str`](Self::as_str).
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "upgrade" => Some(Direction::Upgrade),
            "rollback" => Some(Direction::Rollback),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome recorded for one traversal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Success,
    Failed,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Success => "success",
            EntryStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "success" => Some(EntryStatus::Success),
            "failed" => Some(EntryStatus::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the migration log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Identifier shared by everything logged for one runner invocation
    pub run_id: String,
    pub from_version: Version,
    pub to_version: Version,
    pub direction: Direction,
    pub status: EntryStatus,
    /// Free-form detail: executed and skipped steps, or the failure
    pub message: String,
    pub created_at: DateTime<Utc>,
}

/// Persistence for the installed schema version and the migration log.
///
/// Implementations only need read-your-writes consistency within one
/// process. The version write and the log append are independent; neither
/// is expected to be transactional with the other.
pub trait VersionLedger {
    /// The stored version, or [`Version::ZERO`] when nothing is recorded.
    ///
    /// Errors only when the store itself cannot be read or holds a value
    /// that is not a version.
    fn installed_version(&self) -> LedgerResult<Version>;

    /// Persist `version` as the installed version.
    fn set_installed_version(&mut self, version: Version) -> LedgerResult<()>;

    /// Append `entry` to the log.
    fn append_log(&mut self, entry: &LedgerEntry) -> LedgerResult<()>;

    /// Up to `limit` entries, most recent first.
    fn query_log(&self, limit: usize) -> LedgerResult<Vec<LedgerEntry>>;
}

impl<L: VersionLedger + ?Sized> VersionLedger for &mut L {
    fn installed_version(&self) -> LedgerResult<Version> {
        (**self).installed_version()
    }

    fn set_installed_version(&mut self, version: Version) -> LedgerResult<()> {
        (**self).set_installed_version(version)
    }

    fn append_log(&mut self, entry: &LedgerEntry) -> LedgerResult<()> {
        (**self).append_log(entry)
    }

    fn query_log(&self, limit: usize) -> LedgerResult<Vec<LedgerEntry>> {
        (**self).query_log(limit)
    }
}

/// In-process ledger.
///
/// Holds the version as its string form, the way an options store would,
/// so a corrupt value can be simulated with [`set_raw_version`](Self::set_raw_version).
#[derive(Debug, Default, Clone)]
pub struct MemoryLedger {
    raw_version: Option<String>,
    entries: Vec<LedgerEntry>,
    fail_version_writes: bool,
    fail_log_writes: bool,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// A ledger that already records `version` as installed.
    pub fn at(version: Version) -> Self {
        Self {
            raw_version: Some(version.to_string()),
            ..Self::default()
        }
    }

    /// Store an arbitrary string as the installed version.
    pub fn set_raw_version(&mut self, raw: impl Into<String>) {
        self.raw_version = Some(raw.into());
    }

    /// Make every subsequent `set_installed_version` fail.
    pub fn fail_version_writes(&mut self, fail: bool) {
        self.fail_version_writes = fail;
    }

    /// Make every subsequent `append_log` fail.
    pub fn fail_log_writes(&mut self, fail: bool) {
        self.fail_log_writes = fail;
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }
}

impl VersionLedger for MemoryLedger {
    fn installed_version(&self) -> LedgerResult<Version> {
        match self.raw_version.as_deref() {
            None => Ok(Version::ZERO),
            Some(raw) if raw.trim().is_empty() => Ok(Version::ZERO),
            Some(raw) => Version::parse(raw).map_err(|_| LedgerError::Corrupt {
                key: "installed_version".to_string(),
                value: raw.to_string(),
            }),
        }
    }

    fn set_installed_version(&mut self, version: Version) -> LedgerResult<()> {
        if self.fail_version_writes {
            return Err(LedgerError::Backend {
                operation: "version write",
                message: "memory ledger configured to fail".to_string(),
            });
        }
        self.raw_version = Some(version.to_string());
        Ok(())
    }

    fn append_log(&mut self, entry: &LedgerEntry) -> LedgerResult<()> {
        if self.fail_log_writes {
            return Err(LedgerError::Backend {
                operation: "log append",
                message: "memory ledger configured to fail".to_string(),
            });
        }
        self.entries.push(entry.clone());
        Ok(())
    }

    fn query_log(&self, limit: usize) -> LedgerResult<Vec<LedgerEntry>> {
        Ok(self.entries.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(to: Version) -> LedgerEntry {
        LedgerEntry {
            run_id: "r1".to_string(),
            from_version: Version::ZERO,
            to_version: to,
            direction: Direction::Upgrade,
            status: EntryStatus::Success,
            message: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_ledger_reports_zero() {
        let ledger = MemoryLedger::new();
        assert_eq!(ledger.installed_version().unwrap(), Version::ZERO);

        let mut blank = MemoryLedger::new();
        blank.set_raw_version("");
        assert_eq!(blank.installed_version().unwrap(), Version::ZERO);
    }

    #[test]
    fn test_corrupt_value_is_an_error() {
        let mut ledger = MemoryLedger::new();
        ledger.set_raw_version("not-a-version");
        let err = ledger.installed_version().unwrap_err();
        assert!(matches!(err, LedgerError::Corrupt { .. }));
    }

    #[test]
    fn test_query_log_is_most_recent_first_and_bounded() {
        let mut ledger = MemoryLedger::new();
        for minor in 1..=4 {
            ledger.append_log(&entry(Version::new(1, minor, 0))).unwrap();
        }
        let recent = ledger.query_log(2).unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].to_version, Version::new(1, 4, 0));
        assert_eq!(recent[1].to_version, Version::new(1, 3, 0));
        assert!(ledger.query_log(0).unwrap().is_empty());
    }

    #[test]
    fn test_direction_and_status_round_trip_their_text() {
        for d in [Direction::Upgrade, Direction::Rollback] {
            assert_eq!(Direction::parse(d.as_str()), Some(d));
        }
        for s in [EntryStatus::Success, EntryStatus::Failed] {
            assert_eq!(EntryStatus::parse(s.as_str()), Some(s));
        }
        assert_eq!(Direction::parse("sideways"), None);
    }
}
