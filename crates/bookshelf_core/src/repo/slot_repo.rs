//! Durable key-value slot contracts and implementations.
//!
//! # Responsibility
//! - Store and fetch one UTF-8 string value per named key.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - `put_slot` overwrites any prior value for the same key.
//! - Reads never return partially written values.

use crate::db::DbError;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type SlotResult<T> = Result<T, SlotRepoError>;

/// Error for slot storage operations.
#[derive(Debug)]
pub enum SlotRepoError {
    Db(DbError),
    /// Connection was not migrated before use.
    MissingRequiredTable(&'static str),
}

impl Display for SlotRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing; run migrations first")
            }
        }
    }
}

impl Error for SlotRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::MissingRequiredTable(_) => None,
        }
    }
}

impl From<DbError> for SlotRepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for SlotRepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for named string slots.
pub trait SlotRepository {
    /// Returns the stored value, or `None` when the key was never written.
    fn get_slot(&self, key: &str) -> SlotResult<Option<String>>;
    /// Writes `value` under `key`, replacing any previous value.
    fn put_slot(&mut self, key: &str, value: &str) -> SlotResult<()>;
}

/// SQLite-backed slot repository over the `kv_slots` table.
pub struct SqliteSlotRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSlotRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `MissingRequiredTable` when `kv_slots` does not exist.
    pub fn try_new(conn: &'conn Connection) -> SlotResult<Self> {
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = 'kv_slots'
            );",
            [],
            |row| row.get(0),
        )?;
        if exists != 1 {
            return Err(SlotRepoError::MissingRequiredTable("kv_slots"));
        }
        Ok(Self { conn })
    }
}

impl SlotRepository for SqliteSlotRepository<'_> {
    fn get_slot(&self, key: &str) -> SlotResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_slots WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn put_slot(&mut self, key: &str, value: &str) -> SlotResult<()> {
        self.conn.execute(
            "INSERT INTO kv_slots (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, value],
        )?;
        Ok(())
    }
}

/// Process-local slot repository for tests and ephemeral sessions.
#[derive(Debug, Clone, Default)]
pub struct InMemorySlotRepository {
    slots: HashMap<String, String>,
    writes: usize,
}

impl InMemorySlotRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populates one slot without counting it as a write.
    pub fn with_slot(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.slots.insert(key.into(), value.into());
        self
    }

    /// Number of successful `put_slot` calls.
    pub fn write_count(&self) -> usize {
        self.writes
    }
}

impl SlotRepository for InMemorySlotRepository {
    fn get_slot(&self, key: &str) -> SlotResult<Option<String>> {
        Ok(self.slots.get(key).cloned())
    }

    fn put_slot(&mut self, key: &str, value: &str) -> SlotResult<()> {
        self.slots.insert(key.to_string(), value.to_string());
        self.writes += 1;
        Ok(())
    }
}
