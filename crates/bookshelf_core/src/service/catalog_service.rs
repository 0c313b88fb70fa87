//! Catalog store use-case service.
//!
//! # Responsibility
//! - Own the authoritative in-memory catalog.
//! - Validate drafts, assign ids, and persist after every state change.
//! - Gate destructive operations on an injected confirmation capability.
//!
//! # Invariants
//! - Book ids in the catalog are pairwise distinct.
//! - New books are prepended (newest first).
//! - Save runs synchronously after a committed mutation and only then.
//! - A failed save never rolls back the in-memory catalog.
//! - Load never fails; unreadable or empty storage yields the seed set.

use crate::model::book::{seed_books, Book, BookValidationError};
use crate::model::draft::{validate_draft, Draft};
use crate::model::id::IdGenerator;
use crate::repo::catalog_repo::{CatalogGateway, CatalogRepoError};
use crate::search::query::{run_query, CatalogQuery};
use log::{debug, error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

const MAX_ID_ATTEMPTS: usize = 8;

/// Synchronous yes/no decision supplied by the presentation layer.
pub trait Confirm {
    /// Returns `true` when the user accepts `message`.
    fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
    F: Fn(&str) -> bool,
{
    fn confirm(&self, message: &str) -> bool {
        self(message)
    }
}

/// Service error for catalog use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogServiceError {
    /// Draft was rejected; catalog unchanged.
    Validation(BookValidationError),
    /// Id generator kept producing ids already in the catalog.
    IdCollision { attempts: usize },
}

impl Display for CatalogServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::IdCollision { attempts } => {
                write!(f, "could not generate a unique book id after {attempts} attempts")
            }
        }
    }
}

impl Error for CatalogServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::IdCollision { .. } => None,
        }
    }
}

impl From<BookValidationError> for CatalogServiceError {
    fn from(value: BookValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Where the catalog came from at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadSource {
    Stored,
    Seed,
}

/// Catalog store over an injected gateway and id generator.
pub struct CatalogService<G: CatalogGateway, I: IdGenerator> {
    gateway: G,
    ids: I,
    books: Vec<Book>,
    load_source: LoadSource,
    last_save_error: Option<String>,
}

impl<G: CatalogGateway, I: IdGenerator> CatalogService<G, I> {
    /// Loads the catalog through `gateway`, falling back to the seed set.
    ///
    /// Loading does not write; the seed set is persisted by the first
    /// mutation.
    pub fn load(gateway: G, ids: I) -> Self {
        let (books, load_source) = match gateway.load() {
            Ok(books) if !books.is_empty() => {
                info!(
                    "event=catalog_load module=catalog status=ok source=stored count={}",
                    books.len()
                );
                (books, LoadSource::Stored)
            }
            Ok(_) => {
                info!("event=catalog_load module=catalog status=ok source=seed reason=empty");
                (seed_books(), LoadSource::Seed)
            }
            Err(err) => {
                warn!(
                    "event=catalog_load module=catalog status=degraded source=seed reason={} {}",
                    load_failure_reason(&err),
                    err.log_fields()
                );
                (seed_books(), LoadSource::Seed)
            }
        };

        Self {
            gateway,
            ids,
            books,
            load_source,
            last_save_error: None,
        }
    }

    /// Validates `draft`, prepends the new book and persists.
    ///
    /// # Errors
    /// - `Validation` when the draft is rejected; catalog unchanged.
    /// - `IdCollision` when no unique id was produced; catalog unchanged.
    pub fn add(&mut self, draft: &Draft) -> Result<Book, CatalogServiceError> {
        let validated = match validate_draft(draft) {
            Ok(validated) => validated,
            Err(err) => {
                debug!(
                    "event=book_add module=catalog status=rejected field={}",
                    err.field
                );
                return Err(err.into());
            }
        };

        let id = self.unique_id()?;
        let book = validated.into_book(id);
        self.books.insert(0, book.clone());
        info!(
            "event=book_add module=catalog status=ok book_id={} count={}",
            book.id(),
            self.books.len()
        );
        self.persist();
        Ok(book)
    }

    /// Removes the book with `id`.
    ///
    /// Returns `false` without writing when no such book exists.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.books.iter().position(|book| book.id() == id) else {
            debug!("event=book_remove module=catalog status=skipped reason=not_found");
            return false;
        };

        self.books.remove(index);
        info!(
            "event=book_remove module=catalog status=ok book_id={} count={}",
            id,
            self.books.len()
        );
        self.persist();
        true
    }

    /// Asks `confirm` before removing; declining changes nothing.
    ///
    /// No prompt is shown for an id that is not in the catalog.
    pub fn remove_confirmed(&mut self, id: &str, confirm: &impl Confirm) -> bool {
        let Some(book) = self.find(id) else {
            return false;
        };
        let message = format!("Remove \"{}\" from your library?", book.title());
        if !confirm.confirm(&message) {
            debug!("event=book_remove module=catalog status=declined");
            return false;
        }
        self.remove(id)
    }

    /// Empties the catalog.
    ///
    /// Returns `false` without writing when it was already empty.
    pub fn clear(&mut self) -> bool {
        if self.books.is_empty() {
            debug!("event=catalog_clear module=catalog status=skipped reason=empty");
            return false;
        }

        let removed = self.books.len();
        self.books.clear();
        info!("event=catalog_clear module=catalog status=ok removed={removed}");
        self.persist();
        true
    }

    /// Asks `confirm` before clearing a non-empty catalog.
    pub fn clear_confirmed(&mut self, confirm: &impl Confirm) -> bool {
        if self.books.is_empty() {
            return false;
        }
        let message = format!("Remove all {} books from your library?", self.books.len());
        if !confirm.confirm(&message) {
            debug!("event=catalog_clear module=catalog status=declined");
            return false;
        }
        self.clear()
    }

    /// Read-only snapshot in creation order (newest first).
    pub fn list(&self) -> &[Book] {
        &self.books
    }

    /// Gets one book by id.
    pub fn find(&self, id: &str) -> Option<&Book> {
        self.books.iter().find(|book| book.id() == id)
    }

    /// Filters then sorts the current snapshot.
    pub fn query(&self, query: &CatalogQuery) -> Vec<Book> {
        run_query(&self.books, query)
    }

    pub fn load_source(&self) -> LoadSource {
        self.load_source
    }

    /// Message of the most recent failed save, if the last save failed.
    pub fn last_save_error(&self) -> Option<&str> {
        self.last_save_error.as_deref()
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    fn unique_id(&mut self) -> Result<String, CatalogServiceError> {
        for _ in 0..MAX_ID_ATTEMPTS {
            let candidate = self.ids.next_id();
            if self.find(&candidate).is_none() {
                return Ok(candidate);
            }
            warn!("event=book_id module=catalog status=collision");
        }
        error!(
            "event=book_id module=catalog status=error attempts={}",
            MAX_ID_ATTEMPTS
        );
        Err(CatalogServiceError::IdCollision {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    fn persist(&mut self) {
        match self.gateway.save(&self.books) {
            Ok(()) => {
                self.last_save_error = None;
                debug!(
                    "event=catalog_save module=catalog status=ok count={}",
                    self.books.len()
                );
            }
            Err(err) => {
                error!(
                    "event=catalog_save module=catalog status=error count={} {}",
                    self.books.len(),
                    err.log_fields()
                );
                self.last_save_error = Some(err.to_string());
            }
        }
    }
}

fn load_failure_reason(err: &CatalogRepoError) -> &'static str {
    match err {
        CatalogRepoError::SlotMissing(_) => "missing",
        CatalogRepoError::Malformed(_) | CatalogRepoError::InvalidData(_) => "corrupt",
        CatalogRepoError::Serialize(_) | CatalogRepoError::Slot(_) => "storage",
    }
}
