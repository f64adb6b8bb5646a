//! Connection bootstrap.
//!
//! # Invariants
//! - A returned connection has the latest schema and a busy timeout set.
//! - Each open logs one `db_open` event with its outcome; paths are not logged.

use super::migrations::{migrate, MigrationOutcome};
use super::DbResult;
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens or creates the database file at `path`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    bootstrap("file", Connection::open_with_flags(path, flags))
}

/// Opens a private in-memory database, used by tests and dry runs.
pub fn open_db_in_memory() -> DbResult<Connection> {
    bootstrap("memory", Connection::open_in_memory())
}

fn bootstrap(mode: &'static str, opened: rusqlite::Result<Connection>) -> DbResult<Connection> {
    let started_at = Instant::now();
    match prepare(opened) {
        Ok((conn, outcome)) => {
            info!(
                "event=db_open module=db status=ok mode={mode} schema_from={} schema_to={} duration_ms={}",
                outcome.from_version,
                outcome.to_version,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn prepare(opened: rusqlite::Result<Connection>) -> DbResult<(Connection, MigrationOutcome)> {
    let mut conn = opened?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    let outcome = migrate(&mut conn)?;
    Ok((conn, outcome))
}
