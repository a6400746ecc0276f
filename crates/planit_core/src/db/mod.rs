//! Volatile SQLite store backing the task registry.
//!
//! # Responsibility
//! - Open in-memory connections configured for registry use.
//! - Create the `tasks` / `audio_notes` schema before any access.
//!
//! # Invariants
//! - Registry state never touches disk; only audio clips are files.
//! - A connection is only handed out once it carries `schema::SCHEMA_VERSION`.

use std::error::Error;
use std::fmt::{Display, Formatter};

mod open;
pub mod schema;

pub use open::open_db_in_memory;

pub type DbResult<T> = Result<T, DbError>;

/// Store bootstrap and transport failures.
#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    /// Connection is stamped with a schema this build did not create.
    ForeignSchema { found: u32, expected: u32 },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "registry store error: {err}"),
            Self::ForeignSchema { found, expected } => write!(
                f,
                "connection carries schema version {found}; registry expects 0 or {expected}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::ForeignSchema { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
