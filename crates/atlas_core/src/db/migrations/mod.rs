//! Ordered schema steps for the key-value store.
//!
//! # Invariants
//! - Step versions start at 1 and increase by exactly 1.
//! - The applied version is mirrored to `PRAGMA user_version`.
//! - All pending steps commit together or not at all.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

struct SchemaStep {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const SCHEMA_STEPS: &[SchemaStep] = &[
    SchemaStep {
        version: 1,
        name: "kv_store",
        sql: include_str!("0001_kv_store.sql"),
    },
    SchemaStep {
        version: 2,
        name: "kv_store_updated_at_index",
        sql: include_str!("0002_kv_store_updated_at_index.sql"),
    },
];

/// Columns the storage adapter reads and writes.
const KV_STORE_COLUMNS: &[&str] = &["key", "value", "updated_at"];

/// Version range covered by one `migrate` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MigrationOutcome {
    pub from_version: u32,
    pub to_version: u32,
}

impl MigrationOutcome {
    pub fn applied_any(self) -> bool {
        self.to_version > self.from_version
    }
}

/// Highest schema version this build can produce.
pub fn latest_version() -> u32 {
    SCHEMA_STEPS.last().map_or(0, |step| step.version)
}

/// Reads `PRAGMA user_version`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Brings the schema up to [`latest_version`] and checks the resulting table shape.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer build.
/// - `SchemaMismatch` when `kv_store` lacks a required column.
pub fn migrate(conn: &mut Connection) -> DbResult<MigrationOutcome> {
    let from_version = schema_version(conn)?;
    let latest = latest_version();
    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&SchemaStep> = SCHEMA_STEPS
        .iter()
        .filter(|step| step.version > from_version)
        .collect();
    if !pending.is_empty() {
        let tx = conn.transaction()?;
        for step in &pending {
            tx.execute_batch(step.sql)?;
            tx.pragma_update(None, "user_version", step.version)?;
            info!(
                "event=db_migrate module=db status=ok version={} step={}",
                step.version, step.name
            );
        }
        tx.commit()?;
    }

    verify_kv_store(conn)?;
    Ok(MigrationOutcome {
        from_version,
        to_version: latest,
    })
}

fn verify_kv_store(conn: &Connection) -> DbResult<()> {
    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info('kv_store');")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    for required in KV_STORE_COLUMNS {
        if !columns.iter().any(|column| column.as_str() == *required) {
            return Err(DbError::SchemaMismatch {
                table: "kv_store",
                missing_column: required,
            });
        }
    }
    Ok(())
}
