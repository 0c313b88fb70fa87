//! Runtime configuration resolved from the environment.
//!
//! # Responsibility
//! - Resolve database path and logging settings for entry points.
//!
//! # Invariants
//! - Resolution never touches the filesystem.
//! - Invalid values are rejected with a human-readable error.

use crate::logging::{default_log_level, normalize_level, normalize_log_dir};
use std::path::PathBuf;

pub const DB_PATH_ENV: &str = "BOOKSHELF_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "BOOKSHELF_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "BOOKSHELF_LOG_DIR";
pub const DEFAULT_DB_FILE_NAME: &str = "bookshelf.sqlite3";

/// Resolved settings for opening a catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file holding the durable slot.
    pub db_path: PathBuf,
    pub log_level: &'static str,
    /// File logging is only started when set.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    ///
    /// Blank values are treated as unset.
    ///
    /// # Errors
    /// - Returns an error for an unsupported log level.
    /// - Returns an error for a relative log directory.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let db_path = get(DB_PATH_ENV)
            .map(|value| PathBuf::from(value.trim()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE_NAME));
        let log_level = match get(LOG_LEVEL_ENV) {
            Some(value) => normalize_level(&value)?,
            None => default_log_level(),
        };
        let log_dir = get(LOG_DIR_ENV)
            .map(|value| normalize_log_dir(&value))
            .transpose()?;

        Ok(Self {
            db_path,
            log_level,
            log_dir,
        })
    }
}
