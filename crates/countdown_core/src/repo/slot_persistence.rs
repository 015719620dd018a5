//! Persisted timer slot: contract, wire codec and implementations.
//!
//! # Responsibility
//! - Define the `load`/`save` collaborator injected into `TimerStore`.
//! - Encode the whole ordered timer list as one JSON array under one key.
//! - Provide in-memory and SQLite-backed slot implementations.
//!
//! # Invariants
//! - Decoding rejects the whole slot when any record breaks `Timer::validate()`
//!   or when ids repeat; partial lists are never returned.
//! - Implementations never interpret list order; they store it verbatim.

use crate::db::{ensure_table, DbError, KV_SLOTS_TABLE};
use crate::model::timer::{Timer, TimerId, TimerValidationError};
use rusqlite::{params, Connection, OptionalExtension};
use std::cell::RefCell;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

pub type PersistResult<T> = Result<T, PersistError>;

/// Persistence failures. Callers log and swallow these.
#[derive(Debug)]
pub enum PersistError {
    Db(DbError),
    Codec(serde_json::Error),
    InvalidRecord(TimerValidationError),
    DuplicateId(TimerId),
}

impl Display for PersistError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "malformed timer slot: {err}"),
            Self::InvalidRecord(err) => write!(f, "invalid persisted timer: {err}"),
            Self::DuplicateId(id) => write!(f, "duplicate persisted timer id: {id}"),
        }
    }
}

impl Error for PersistError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Codec(err) => Some(err),
            Self::InvalidRecord(err) => Some(err),
            Self::DuplicateId(_) => None,
        }
    }
}

impl From<DbError> for PersistError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for PersistError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for PersistError {
    fn from(value: serde_json::Error) -> Self {
        Self::Codec(value)
    }
}

impl From<TimerValidationError> for PersistError {
    fn from(value: TimerValidationError) -> Self {
        Self::InvalidRecord(value)
    }
}

/// Persistence collaborator for the timer list.
pub trait TimerPersistence {
    /// Reads the stored list. An absent slot is an empty list.
    fn load(&self) -> PersistResult<Vec<Timer>>;
    /// Overwrites the stored list with `timers`, preserving order.
    fn save(&self, timers: &[Timer]) -> PersistResult<()>;
}

/// Encodes the ordered list into the slot's JSON array form.
pub fn encode_timers(timers: &[Timer]) -> PersistResult<String> {
    Ok(serde_json::to_string(timers)?)
}

/// Decodes a slot value, validating every record and id uniqueness.
pub fn decode_timers(raw: &str) -> PersistResult<Vec<Timer>> {
    let timers: Vec<Timer> = serde_json::from_str(raw)?;
    let mut seen = HashSet::with_capacity(timers.len());
    for timer in &timers {
        timer.validate()?;
        if !seen.insert(timer.id) {
            return Err(PersistError::DuplicateId(timer.id));
        }
    }
    Ok(timers)
}

/// No-op persistence for purely in-memory stores.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullPersistence;

impl TimerPersistence for NullPersistence {
    fn load(&self) -> PersistResult<Vec<Timer>> {
        Ok(Vec::new())
    }

    fn save(&self, _timers: &[Timer]) -> PersistResult<()> {
        Ok(())
    }
}

/// Shared in-memory string slot holding the encoded list.
///
/// Clones share one slot, which lets a caller inspect or corrupt what a store
/// wrote. Single-threaded by construction.
#[derive(Debug, Clone, Default)]
pub struct MemorySlot {
    value: Rc<RefCell<Option<String>>>,
}

impl MemorySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw encoded slot value, if any was written.
    pub fn raw(&self) -> Option<String> {
        self.value.borrow().clone()
    }

    /// Overwrites the raw slot value.
    pub fn set_raw(&self, raw: Option<String>) {
        *self.value.borrow_mut() = raw;
    }
}

impl TimerPersistence for MemorySlot {
    fn load(&self) -> PersistResult<Vec<Timer>> {
        match self.value.borrow().as_deref() {
            Some(raw) => decode_timers(raw),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, timers: &[Timer]) -> PersistResult<()> {
        let encoded = encode_timers(timers)?;
        self.set_raw(Some(encoded));
        Ok(())
    }
}

/// SQLite-backed slot: one `kv_slots` row keyed by the storage key.
pub struct SqliteSlotPersistence<'conn> {
    conn: &'conn Connection,
    key: String,
}

impl<'conn> SqliteSlotPersistence<'conn> {
    /// Binds a slot to a migrated connection.
    ///
    /// # Errors
    /// - Returns [`DbError::MissingTable`] when `kv_slots` does not exist.
    pub fn try_new(conn: &'conn Connection, key: impl Into<String>) -> PersistResult<Self> {
        ensure_table(conn, KV_SLOTS_TABLE)?;

        Ok(Self {
            conn,
            key: key.into(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Returns the raw encoded slot value, if present.
    pub fn raw(&self) -> PersistResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1;",
                [self.key.as_str()],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }
}

impl TimerPersistence for SqliteSlotPersistence<'_> {
    fn load(&self) -> PersistResult<Vec<Timer>> {
        match self.raw()? {
            Some(raw) => decode_timers(&raw),
            None => Ok(Vec::new()),
        }
    }

    fn save(&self, timers: &[Timer]) -> PersistResult<()> {
        let encoded = encode_timers(timers)?;
        self.conn.execute(
            "INSERT INTO kv_slots (key, value, updated_at)
             VALUES (?1, ?2, strftime('%s', 'now') * 1000)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![self.key.as_str(), encoded],
        )?;
        Ok(())
    }
}
