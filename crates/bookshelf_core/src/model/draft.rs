//! Draft input and validation.
//!
//! # Responsibility
//! - Model loose user input before it becomes a `Book`.
//! - Normalize accepted drafts and reject invalid ones with field errors.
//!
//! # Invariants
//! - Accepted titles are trimmed and non-empty.
//! - Accepted authors are trimmed; empty means unknown.
//! - A blank raw year becomes `None`; any other year must be a whole number
//!   in `i32` range.

use crate::model::book::{Book, BookId, BookValidationError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static WHOLE_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?[0-9]+$").expect("valid whole number regex"));

const TITLE_REQUIRED: BookValidationError =
    BookValidationError::new("title", "Title is required");
const YEAR_NOT_WHOLE: BookValidationError =
    BookValidationError::new("year", "Year must be a whole number");

/// Raw year value as typed or received from a form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawYear {
    Number(f64),
    Text(String),
}

impl From<&str> for RawYear {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawYear {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i32> for RawYear {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

/// Unvalidated book input.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub year: Option<RawYear>,
}

impl Draft {
    /// Creates a draft with only a title set.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_year(mut self, year: impl Into<RawYear>) -> Self {
        self.year = Some(year.into());
        self
    }
}

/// Normalized draft that passed validation but has no id yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedDraft {
    pub title: String,
    pub author: String,
    pub year: Option<i32>,
}

impl ValidatedDraft {
    /// Binds a freshly generated id and produces the immutable record.
    pub fn into_book(self, id: BookId) -> Book {
        Book::from_validated(id, self.title, self.author, self.year)
    }
}

/// Validates and normalizes one draft.
///
/// Title is checked before year, so a draft with both problems reports
/// `title`.
///
/// # Errors
/// - `title`: blank after trimming.
/// - `year`: non-blank and not a whole number in `i32` range.
pub fn validate_draft(draft: &Draft) -> Result<ValidatedDraft, BookValidationError> {
    let title = draft.title.trim();
    if title.is_empty() {
        return Err(TITLE_REQUIRED);
    }

    let year = match draft.year.as_ref() {
        None => None,
        Some(raw) => parse_year(raw)?,
    };

    Ok(ValidatedDraft {
        title: title.to_string(),
        author: draft.author.trim().to_string(),
        year,
    })
}

fn parse_year(raw: &RawYear) -> Result<Option<i32>, BookValidationError> {
    match raw {
        RawYear::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Ok(None);
            }
            if !WHOLE_NUMBER_RE.is_match(trimmed) {
                return Err(YEAR_NOT_WHOLE);
            }
            trimmed.parse::<i32>().map(Some).map_err(|_| YEAR_NOT_WHOLE)
        }
        RawYear::Number(value) => {
            let in_range = value.is_finite()
                && value.fract() == 0.0
                && *value >= f64::from(i32::MIN)
                && *value <= f64::from(i32::MAX);
            if !in_range {
                return Err(YEAR_NOT_WHOLE);
            }
            // Range and integrality checked above.
            Ok(Some(*value as i32))
        }
    }
}
