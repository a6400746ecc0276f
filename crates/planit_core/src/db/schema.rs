//! Registry schema bootstrap.
//!
//! # Invariants
//! - A fresh connection is stamped with `SCHEMA_VERSION` via `PRAGMA user_version`.
//! - Any other non-zero stamp is refused; the schema is never altered in place.

use crate::db::{DbError, DbResult};
use rusqlite::Connection;

/// Version written to `PRAGMA user_version` once the schema is in place.
pub const SCHEMA_VERSION: u32 = 1;

const SCHEMA_SQL: &str = include_str!("schema.sql");

/// Creates the registry tables on a fresh connection.
///
/// Tables and indexes are created in one transaction; a connection already
/// at `SCHEMA_VERSION` is left untouched.
pub fn apply_schema(conn: &mut Connection) -> DbResult<()> {
    match schema_version(conn)? {
        0 => {}
        SCHEMA_VERSION => return Ok(()),
        found => {
            return Err(DbError::ForeignSchema {
                found,
                expected: SCHEMA_VERSION,
            })
        }
    }

    let tx = conn.transaction()?;
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {SCHEMA_VERSION};"))?;
    tx.commit()?;
    Ok(())
}

/// Reads the schema version stamped on `conn`.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}
