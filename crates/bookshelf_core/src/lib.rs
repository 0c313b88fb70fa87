//! Core domain logic for Bookshelf.
//! This crate is the single source of truth for catalog invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod search;
pub mod service;

pub use config::CoreConfig;
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::book::{seed_books, Book, BookId, BookValidationError};
pub use model::draft::{validate_draft, Draft, RawYear, ValidatedDraft};
pub use model::id::{IdGenerator, RandomIdGenerator, SequentialIdGenerator};
pub use repo::catalog_repo::{
    CatalogGateway, CatalogRepoError, CatalogRepoResult, SlotCatalogGateway, CATALOG_SLOT_KEY,
};
pub use repo::slot_repo::{
    InMemorySlotRepository, SlotRepoError, SlotRepository, SlotResult, SqliteSlotRepository,
};
pub use search::query::{filter_books, run_query, sort_books, CatalogQuery, SortKey};
pub use service::catalog_service::{CatalogService, CatalogServiceError, Confirm, LoadSource};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
