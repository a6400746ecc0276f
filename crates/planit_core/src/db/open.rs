//! Connection bootstrap for the registry store.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections carry the current schema.

use super::schema::apply_schema;
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::time::Instant;

/// Opens a private in-memory database with the registry schema applied.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_in_memory() -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=db_open module=db status=start mode=memory");

    let result: DbResult<Connection> = Connection::open_in_memory()
        .map_err(DbError::from)
        .and_then(|mut conn| {
            conn.execute_batch("PRAGMA foreign_keys = ON;")?;
            apply_schema(&mut conn)?;
            Ok(conn)
        });

    match &result {
        Ok(_) => info!(
            "event=db_open module=db status=ok mode=memory duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode=memory duration_ms={} error={}",
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}
