//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the durable slot contract and its SQLite/in-memory backends.
//! - Map the catalog to and from its serialized slot payload.
//!
//! # Invariants
//! - Catalog reads reject invalid persisted state (blank titles, duplicate
//!   ids) rather than masking it.
//! - Repository APIs return semantic errors in addition to DB transport
//!   errors.

pub mod catalog_repo;
pub mod slot_repo;
