//! Catalog domain model.
//!
//! # Responsibility
//! - Define the canonical book record and its draft input shape.
//! - Own validation and identifier generation for new records.
//!
//! # Invariants
//! - Every book is identified by a catalog-unique `BookId`.
//! - Books are immutable values; changes replace whole records.

pub mod book;
pub mod draft;
pub mod id;
