//! Catalog persistence gateway.
//!
//! # Responsibility
//! - Serialize the whole catalog into one durable slot and read it back.
//! - Reject payloads that break catalog invariants instead of masking them.
//!
//! # Invariants
//! - The slot value is a UTF-8 JSON array of `{id, title, author, year?}`.
//! - `save` always writes the full catalog, overwriting the prior value.
//! - `load(save(c))` yields the same records as `c`.
//!
//! There is no payload version field. A shape mismatch is treated as corrupt
//! data, never migrated.

use crate::model::book::Book;
use crate::repo::slot_repo::{SlotRepoError, SlotRepository};
use serde_json::error::Category;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Slot key holding the serialized catalog.
pub const CATALOG_SLOT_KEY: &str = "library_books_v1";

pub type CatalogRepoResult<T> = Result<T, CatalogRepoError>;

/// Error for catalog load/save.
#[derive(Debug)]
pub enum CatalogRepoError {
    /// Slot has never been written.
    SlotMissing(String),
    /// Payload is not JSON or does not match the record shape.
    Malformed(serde_json::Error),
    /// Payload parsed but violates catalog invariants.
    InvalidData(String),
    /// Catalog could not be encoded.
    Serialize(serde_json::Error),
    /// Underlying slot storage failed.
    Slot(SlotRepoError),
}

impl CatalogRepoError {
    /// Returns whether this failure came from reading stored data back.
    ///
    /// These are recovered by falling back to the seed catalog.
    pub fn is_deserialization(&self) -> bool {
        matches!(
            self,
            Self::SlotMissing(_) | Self::Malformed(_) | Self::InvalidData(_)
        )
    }

    /// Metadata-only `key=value` fields for log lines.
    ///
    /// Never includes payload text; serde messages can quote stored values.
    pub fn log_fields(&self) -> String {
        match self {
            Self::SlotMissing(_) => "kind=slot_missing".to_string(),
            Self::Malformed(err) => format!(
                "kind=malformed category={} line={} column={}",
                serde_category(err),
                err.line(),
                err.column()
            ),
            Self::InvalidData(_) => "kind=invalid_data".to_string(),
            Self::Serialize(err) => format!("kind=serialize category={}", serde_category(err)),
            Self::Slot(SlotRepoError::Db(_)) => "kind=slot_db".to_string(),
            Self::Slot(SlotRepoError::MissingRequiredTable(table)) => {
                format!("kind=slot_missing_table table={table}")
            }
        }
    }
}

fn serde_category(err: &serde_json::Error) -> &'static str {
    match err.classify() {
        Category::Io => "io",
        Category::Syntax => "syntax",
        Category::Data => "data",
        Category::Eof => "eof",
    }
}

impl Display for CatalogRepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SlotMissing(key) => write!(f, "catalog slot `{key}` is empty"),
            Self::Malformed(err) => write!(f, "malformed catalog payload: {err}"),
            Self::InvalidData(message) => write!(f, "invalid catalog payload: {message}"),
            Self::Serialize(err) => write!(f, "failed to encode catalog: {err}"),
            Self::Slot(err) => write!(f, "{err}"),
        }
    }
}

impl Error for CatalogRepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) | Self::Serialize(err) => Some(err),
            Self::Slot(err) => Some(err),
            Self::SlotMissing(_) | Self::InvalidData(_) => None,
        }
    }
}

impl From<SlotRepoError> for CatalogRepoError {
    fn from(value: SlotRepoError) -> Self {
        Self::Slot(value)
    }
}

/// Persistence contract consumed by the catalog store.
pub trait CatalogGateway {
    /// Reads the full catalog.
    fn load(&self) -> CatalogRepoResult<Vec<Book>>;
    /// Writes the full catalog, replacing any earlier copy.
    fn save(&mut self, books: &[Book]) -> CatalogRepoResult<()>;
}

/// Gateway storing the catalog as JSON in one named slot.
#[derive(Debug)]
pub struct SlotCatalogGateway<S: SlotRepository> {
    slots: S,
    key: String,
}

impl<S: SlotRepository> SlotCatalogGateway<S> {
    /// Uses the default `library_books_v1` key.
    pub fn new(slots: S) -> Self {
        Self::with_key(slots, CATALOG_SLOT_KEY)
    }

    pub fn with_key(slots: S, key: impl Into<String>) -> Self {
        Self {
            slots,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Borrows the underlying slot repository.
    pub fn slots(&self) -> &S {
        &self.slots
    }
}

impl<S: SlotRepository> CatalogGateway for SlotCatalogGateway<S> {
    fn load(&self) -> CatalogRepoResult<Vec<Book>> {
        let payload = self
            .slots
            .get_slot(&self.key)?
            .ok_or_else(|| CatalogRepoError::SlotMissing(self.key.clone()))?;
        decode_catalog(&payload)
    }

    fn save(&mut self, books: &[Book]) -> CatalogRepoResult<()> {
        let payload = encode_catalog(books)?;
        self.slots.put_slot(&self.key, &payload)?;
        Ok(())
    }
}

/// Encodes a catalog into its slot payload.
pub fn encode_catalog(books: &[Book]) -> CatalogRepoResult<String> {
    serde_json::to_string(books).map_err(CatalogRepoError::Serialize)
}

/// Decodes and checks a slot payload.
///
/// # Errors
/// - `Malformed` for invalid JSON or a record shape mismatch.
/// - `InvalidData` for blank titles or duplicate ids.
pub fn decode_catalog(payload: &str) -> CatalogRepoResult<Vec<Book>> {
    let books: Vec<Book> = serde_json::from_str(payload).map_err(CatalogRepoError::Malformed)?;

    let mut seen = HashSet::with_capacity(books.len());
    for book in &books {
        if let Err(err) = book.validate() {
            return Err(CatalogRepoError::InvalidData(format!(
                "book `{}` failed validation: {err}",
                book.id()
            )));
        }
        if !seen.insert(book.id()) {
            return Err(CatalogRepoError::InvalidData(format!(
                "duplicate book id `{}`",
                book.id()
            )));
        }
    }

    Ok(books)
}
