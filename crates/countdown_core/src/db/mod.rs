//! SQLite storage behind the timer slot.
//!
//! The database stands in for browser local storage: one `kv_slots` row per
//! storage key, each holding the JSON-encoded timer list. Connections come
//! from [`open_db`] / [`open_db_in_memory`], which migrate before returning.

use rusqlite::{Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// Table holding one encoded value per storage key.
pub const KV_SLOTS_TABLE: &str = "kv_slots";

pub type DbResult<T> = Result<T, DbError>;

/// Fails with [`DbError::MissingTable`] unless `table` exists on `conn`.
pub fn ensure_table(conn: &Connection, table: &'static str) -> DbResult<()> {
    let found = conn
        .query_row(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get::<_, String>(0),
        )
        .optional()?;
    match found {
        Some(_) => Ok(()),
        None => Err(DbError::MissingTable(table)),
    }
}

#[derive(Debug)]
pub enum DbError {
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
    MissingTable(&'static str),
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "database schema version {db_version} is newer than supported {latest_supported}"
            ),
            Self::MissingTable(table) => {
                write!(f, "table `{table}` is missing; was the connection migrated?")
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
