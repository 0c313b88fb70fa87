//! Catalog search entry points.
//!
//! # Responsibility
//! - Expose filter/sort over in-memory catalog snapshots.
//! - Keep result shaping inside core.

pub mod query;
