//! Key/value options store (`sl_meta.options`).

use crate::error::{MetaResult, MetaResultExt};
use duckdb::{Connection, OptionalExt};

/// Read option `key`, or `None` when it has never been set.
pub fn get_option(conn: &Connection, key: &str) -> MetaResult<Option<String>> {
    conn.query_row(
        "SELECT value FROM sl_meta.options WHERE key = ?",
        duckdb::params![key],
        |row| row.get::<_, String>(0),
    )
    .optional()
    .meta_context("select option")
}

/// Create or overwrite option `key`.
pub fn set_option(conn: &Connection, key: &str, value: &str) -> MetaResult<()> {
    conn.execute(
        "INSERT OR REPLACE INTO sl_meta.options (key, value, updated_at) VALUES (?, ?, now())",
        duckdb::params![key, value],
    )
    .meta_context("upsert option")?;
    Ok(())
}

/// Remove option `key`. Returns `true` if it existed.
pub fn delete_option(conn: &Connection, key: &str) -> MetaResult<bool> {
    let removed = conn
        .execute(
            "DELETE FROM sl_meta.options WHERE key = ?",
            duckdb::params![key],
        )
        .meta_context("delete option")?;
    Ok(removed > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::LedgerDb;

    #[test]
    fn test_missing_option_is_none() {
        let db = LedgerDb::open_memory().unwrap();
        assert_eq!(get_option(db.conn(), "absent").unwrap(), None);
    }

    #[test]
    fn test_set_then_overwrite() {
        let db = LedgerDb::open_memory().unwrap();
        set_option(db.conn(), "color", "red").unwrap();
        set_option(db.conn(), "color", "blue").unwrap();
        assert_eq!(
            get_option(db.conn(), "color").unwrap().as_deref(),
            Some("blue")
        );
    }

    #[test]
    fn test_delete_option() {
        let db = LedgerDb::open_memory().unwrap();
        set_option(db.conn(), "tmp", "1").unwrap();
        assert!(delete_option(db.conn(), "tmp").unwrap());
        assert!(!delete_option(db.conn(), "tmp").unwrap());
        assert_eq!(get_option(db.conn(), "tmp").unwrap(), None);
    }
}
