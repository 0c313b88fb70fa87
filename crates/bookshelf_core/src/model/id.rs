//! Book identifier generation.
//!
//! # Responsibility
//! - Produce short alphanumeric tokens for newly created books.
//! - Allow deterministic substitution in tests.
//!
//! # Invariants
//! - Tokens contain only `[0-9a-z]`.
//! - Tokens are not security-sensitive and must never gate access control.

use crate::model::book::BookId;
use uuid::Uuid;

const RANDOM_ID_LEN: usize = 12;

/// Source of identifiers for new books.
pub trait IdGenerator {
    /// Returns the next candidate id.
    ///
    /// Collisions are possible; the catalog store checks uniqueness.
    fn next_id(&mut self) -> BookId;
}

/// Random generator backed by v4 UUIDs.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&mut self) -> BookId {
        let mut buffer = Uuid::encode_buffer();
        let simple = Uuid::new_v4().simple().encode_lower(&mut buffer);
        simple[..RANDOM_ID_LEN].to_string()
    }
}

/// Deterministic generator yielding `<prefix>1`, `<prefix>2`, ...
#[derive(Debug, Clone)]
pub struct SequentialIdGenerator {
    prefix: String,
    next: u64,
}

impl SequentialIdGenerator {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 1,
        }
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> BookId {
        let id = format!("{}{}", self.prefix, self.next);
        self.next += 1;
        id
    }
}
