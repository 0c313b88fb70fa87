//! In-memory catalog filter and sort.
//!
//! # Responsibility
//! - Filter a catalog snapshot by a free-text query.
//! - Order filtered books by title, author or year.
//!
//! # Invariants
//! - Inputs are never mutated; results are fresh vectors.
//! - Sorting is stable: equal keys keep catalog order.
//! - Filter always runs before sort.
//! - Title and author order follow Unicode root-locale collation.

use crate::model::book::Book;
use icu_collator::{Collator, CollatorOptions};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

thread_local! {
    static ROOT_COLLATOR: Collator =
        Collator::try_new(&Default::default(), CollatorOptions::new())
            .expect("root collation data is compiled in");
}

/// Sort key exposed to presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SortKey {
    #[default]
    Title,
    Author,
    Year,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Author => "author",
            Self::Year => "year",
        }
    }
}

/// Unknown sort key name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortKey(pub String);

impl Display for UnknownSortKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown sort key `{}`; expected title|author|year",
            self.0
        )
    }
}

impl Error for UnknownSortKey {}

impl FromStr for SortKey {
    type Err = UnknownSortKey;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "year" => Ok(Self::Year),
            _ => Err(UnknownSortKey(value.to_string())),
        }
    }
}

/// Combined filter + sort request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Free-text filter; blank matches everything.
    pub text: String,
    pub sort: SortKey,
}

impl CatalogQuery {
    pub fn new(text: impl Into<String>, sort: SortKey) -> Self {
        Self {
            text: text.into(),
            sort,
        }
    }
}

/// Returns books matching `query`, in input order.
///
/// Matching is a case-insensitive substring test against the title, the
/// author when known, and the decimal year when present.
pub fn filter_books<'a, I>(books: I, query: &str) -> Vec<Book>
where
    I: IntoIterator<Item = &'a Book>,
{
    let needle = query.trim().to_lowercase();
    books
        .into_iter()
        .filter(|book| needle.is_empty() || matches_needle(book, &needle))
        .cloned()
        .collect()
}

/// Returns `books` ordered by `key` using a stable sort.
pub fn sort_books(mut books: Vec<Book>, key: SortKey) -> Vec<Book> {
    match key {
        SortKey::Title => books.sort_by(|a, b| collate(a.title(), b.title())),
        SortKey::Author => books.sort_by(|a, b| collate(a.author(), b.author())),
        SortKey::Year => books.sort_by_key(year_sort_value),
    }
    books
}

/// Runs the only supported query path: filter first, then sort.
pub fn run_query(books: &[Book], query: &CatalogQuery) -> Vec<Book> {
    sort_books(filter_books(books, &query.text), query.sort)
}

fn matches_needle(book: &Book, needle: &str) -> bool {
    if book.title().to_lowercase().contains(needle) {
        return true;
    }
    if book
        .known_author()
        .is_some_and(|author| author.to_lowercase().contains(needle))
    {
        return true;
    }
    book.year()
        .is_some_and(|year| year.to_string().contains(needle))
}

/// Absent year compares as zero; display still treats it as absent.
fn year_sort_value(book: &Book) -> i32 {
    book.year().unwrap_or(0)
}

/// Locale-aware comparison using root collation at tertiary strength.
///
/// Base letters decide first, then accents, then case (lowercase first).
/// Empty strings (unknown author) sort before every non-empty string.
fn collate(a: &str, b: &str) -> Ordering {
    ROOT_COLLATOR.with(|collator| collator.compare(a, b))
}
