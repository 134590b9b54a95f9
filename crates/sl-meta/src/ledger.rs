//! [`VersionLedger`] backed by the `sl_meta` tables.

use crate::connection::LedgerDb;
use crate::error::{MetaError, MetaResultExt};
use crate::options::{get_option, set_option};
use chrono::{DateTime, NaiveDateTime, Utc};
use sl_core::{Direction, EntryStatus, LedgerEntry, LedgerError, LedgerResult, Version, VersionLedger};

/// DuckDB renders `TIMESTAMP` casts as `2024-01-31 12:00:00.123456`, dropping
/// the fraction when it is zero.
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Raw `migration_log` row before its text columns are validated.
struct LogRow {
    run_id: String,
    from_version: String,
    to_version: String,
    direction: String,
    status: String,
    message: String,
    created_at: String,
}

impl LogRow {
    fn into_entry(self) -> LedgerResult<LedgerEntry> {
        let corrupt = |key: &str, value: &str| LedgerError::Corrupt {
            key: format!("migration_log.{key}"),
            value: value.to_string(),
        };

        let from_version =
            Version::parse(&self.from_version).map_err(|_| corrupt("from_version", &self.from_version))?;
        let to_version =
            Version::parse(&self.to_version).map_err(|_| corrupt("to_version", &self.to_version))?;
        let direction =
            Direction::parse(&self.direction).ok_or_else(|| corrupt("direction", &self.direction))?;
        let status = EntryStatus::parse(&self.status).ok_or_else(|| corrupt("status", &self.status))?;
        let created_at = NaiveDateTime::parse_from_str(&self.created_at, TIMESTAMP_FORMAT)
            .map_err(|_| corrupt("created_at", &self.created_at))?
            .and_utc();

        Ok(LedgerEntry {
            run_id: self.run_id,
            from_version,
            to_version,
            direction,
            status,
            message: self.message,
            created_at,
        })
    }
}

fn backend(operation: &'static str) -> impl Fn(MetaError) -> LedgerError {
    move |e| LedgerError::Backend {
        operation,
        message: e.to_string(),
    }
}

fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}

impl VersionLedger for LedgerDb {
    fn installed_version(&self) -> LedgerResult<Version> {
        let raw = get_option(self.conn(), self.version_option()).map_err(backend("version read"))?;

        match raw {
            None => Ok(Version::ZERO),
            Some(value) if value.trim().is_empty() => Ok(Version::ZERO),
            Some(value) => Version::parse(&value).map_err(|_| LedgerError::Corrupt {
                key: self.version_option().to_string(),
                value,
            }),
        }
    }

    fn set_installed_version(&mut self, version: Version) -> LedgerResult<()> {
        set_option(self.conn(), self.version_option(), &version.to_string())
            .map_err(backend("version write"))?;
        log::debug!("Recorded installed version {version}");
        Ok(())
    }

    fn append_log(&mut self, entry: &LedgerEntry) -> LedgerResult<()> {
        self.conn()
            .execute(
                "INSERT INTO sl_meta.migration_log
                     (run_id, from_version, to_version, direction, status, message, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, CAST(? AS TIMESTAMP))",
                duckdb::params![
                    entry.run_id,
                    entry.from_version.to_string(),
                    entry.to_version.to_string(),
                    entry.direction.as_str(),
                    entry.status.as_str(),
                    entry.message,
                    format_timestamp(&entry.created_at),
                ],
            )
            .ledger_context("log append")?;
        Ok(())
    }

    fn query_log(&self, limit: usize) -> LedgerResult<Vec<LedgerEntry>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self
            .conn()
            .prepare(
                "SELECT run_id, from_version, to_version, direction, status, message,
                        CAST(created_at AS VARCHAR)
                 FROM sl_meta.migration_log
                 ORDER BY log_id DESC
                 LIMIT ?",
            )
            .ledger_context("log query")?;

        let rows = stmt
            .query_map(duckdb::params![limit], |row| {
                Ok(LogRow {
                    run_id: row.get(0)?,
                    from_version: row.get(1)?,
                    to_version: row.get(2)?,
                    direction: row.get(3)?,
                    status: row.get(4)?,
                    message: row.get(5)?,
                    created_at: row.get(6)?,
                })
            })
            .ledger_context("log query")?
            .collect::<Result<Vec<_>, _>>()
            .ledger_context("log row")?;

        rows.into_iter().map(LogRow::into_entry).collect()
    }
}

#[cfg(test)]
#[path = "ledger_test.rs"]
mod tests;
