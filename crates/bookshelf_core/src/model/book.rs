//! Book domain model.
//!
//! # Responsibility
//! - Define the canonical catalog record and its persisted JSON shape.
//! - Provide the fixed seed set used when no durable catalog exists.
//!
//! # Invariants
//! - `id` is assigned once at creation and never reassigned.
//! - `title` is non-empty after trimming.
//! - `year = None` is distinct from `year = Some(0)`.
//! - A Book is never mutated in place after construction.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable identifier for one catalog record.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type BookId = String;

/// Field-level validation failure for book input.
///
/// Carries the offending field name so a presentation layer can render the
/// message next to the matching input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookValidationError {
    /// Draft field name (`title`, `year`).
    pub field: &'static str,
    /// Human-readable message shown to the user.
    pub message: &'static str,
}

impl BookValidationError {
    pub(crate) const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl Display for BookValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl Error for BookValidationError {}

/// Canonical catalog record.
///
/// Serialized as `{id, title, author, year?}`; `year` is omitted when absent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Book {
    id: BookId,
    title: String,
    author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    year: Option<i32>,
}

impl Book {
    /// Creates a book from already-normalized parts.
    ///
    /// # Errors
    /// - Returns a `title` error when `title` is blank.
    pub fn new(
        id: impl Into<BookId>,
        title: impl Into<String>,
        author: impl Into<String>,
        year: Option<i32>,
    ) -> Result<Self, BookValidationError> {
        let book = Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            year,
        };
        book.validate()?;
        Ok(book)
    }

    /// Assembles a book from fields that already passed draft validation.
    pub(crate) fn from_validated(
        id: BookId,
        title: String,
        author: String,
        year: Option<i32>,
    ) -> Self {
        Self {
            id,
            title,
            author,
            year,
        }
    }

    /// Re-checks record invariants.
    ///
    /// Used on read paths so invalid persisted state is rejected instead of
    /// being masked.
    pub fn validate(&self) -> Result<(), BookValidationError> {
        if self.title.trim().is_empty() {
            return Err(BookValidationError::new("title", "Title is required"));
        }
        Ok(())
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Author name; empty string means unknown.
    pub fn author(&self) -> &str {
        &self.author
    }

    /// Returns `None` when the author is unknown.
    pub fn known_author(&self) -> Option<&str> {
        if self.author.is_empty() {
            None
        } else {
            Some(self.author.as_str())
        }
    }

    pub fn year(&self) -> Option<i32> {
        self.year
    }
}

/// Returns the fixed catalog used when no valid durable data exists.
pub fn seed_books() -> Vec<Book> {
    [
        ("seed-1", "The Pragmatic Programmer", "Andrew Hunt", Some(1999)),
        ("seed-2", "Clean Code", "Robert C. Martin", Some(2008)),
        ("seed-3", "Refactoring", "Martin Fowler", Some(1999)),
    ]
    .into_iter()
    .map(|(id, title, author, year)| Book {
        id: id.to_string(),
        title: title.to_string(),
        author: author.to_string(),
        year,
    })
    .collect()
}
