//! SQLite-backed storage adapter over the `kv_store` table.
//!
//! # Invariants
//! - The connection passed in must come from `db::open_db*` so that
//!   `kv_store` exists.
//! - Quota checks and the write happen inside one transaction.

use super::{entry_bytes, StorageError, StoragePort, StorageResult};
use log::warn;
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};

/// Key-value store persisted in a SQLite database.
pub struct SqliteStorage<'conn> {
    conn: &'conn Connection,
    quota_bytes: Option<usize>,
}

impl<'conn> SqliteStorage<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self {
            conn,
            quota_bytes: None,
        }
    }

    pub fn with_quota(conn: &'conn Connection, quota_bytes: usize) -> Self {
        Self {
            conn,
            quota_bytes: Some(quota_bytes),
        }
    }

    /// Lists stored keys in ascending order.
    pub fn keys(&self) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv_store ORDER BY key ASC;")?;
        let keys = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(keys)
    }

    fn ensure_quota(&self, key: &str, value: &str) -> StorageResult<()> {
        let Some(quota_bytes) = self.quota_bytes else {
            return Ok(());
        };
        let others: i64 = self.conn.query_row(
            "SELECT COALESCE(SUM(length(CAST(key AS BLOB)) + length(CAST(value AS BLOB))), 0)
             FROM kv_store
             WHERE key != ?1;",
            [key],
            |row| row.get(0),
        )?;
        let required_bytes = usize::try_from(others).unwrap_or(usize::MAX) + entry_bytes(key, value);
        if required_bytes > quota_bytes {
            warn!(
                "event=storage_write module=storage status=error error_code=quota_exceeded required_bytes={} quota_bytes={}",
                required_bytes, quota_bytes
            );
            return Err(StorageError::QuotaExceeded {
                key: key.to_string(),
                required_bytes,
                quota_bytes,
            });
        }
        Ok(())
    }
}

impl StoragePort for SqliteStorage<'_> {
    fn get_item(&self, key: &str) -> StorageResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_store WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set_item(&self, key: &str, value: &str) -> StorageResult<()> {
        let tx = rusqlite::Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        self.ensure_quota(key, value)?;
        tx.execute(
            "INSERT INTO kv_store (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn remove_item(&self, key: &str) -> StorageResult<()> {
        self.conn
            .execute("DELETE FROM kv_store WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteStorage;
    use crate::db::open_db_in_memory;
    use crate::storage::StoragePort;

    #[test]
    fn roundtrips_and_overwrites_values() {
        let conn = open_db_in_memory().expect("open db");
        let storage = SqliteStorage::new(&conn);

        assert_eq!(storage.get_item("atlas").expect("read"), None);
        storage.set_item("atlas", "[]").expect("write");
        storage.set_item("atlas", "[1]").expect("overwrite");
        assert_eq!(storage.get_item("atlas").expect("read").as_deref(), Some("[1]"));
        assert_eq!(storage.keys().expect("keys"), vec!["atlas".to_string()]);

        storage.remove_item("atlas").expect("remove");
        assert_eq!(storage.get_item("atlas").expect("read"), None);
    }

    #[test]
    fn rejects_writes_beyond_quota_and_keeps_previous_value() {
        let conn = open_db_in_memory().expect("open db");
        let storage = SqliteStorage::with_quota(&conn, 16);
        storage.set_item("k", "small").expect("fits");

        let err = storage
            .set_item("k", "this value is far too long")
            .expect_err("quota must be enforced");
        assert!(err.is_quota_exceeded());
        assert_eq!(storage.get_item("k").expect("read").as_deref(), Some("small"));
    }
}
