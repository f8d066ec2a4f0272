//! Core configuration.
//!
//! # Responsibility
//! - Describe where notes are stored and how logging is set up.
//! - Resolve settings from `LOCKNOTE_*` keys through a caller-supplied lookup.
//!
//! # Invariants
//! - `db_path = None` means an in-memory store.
//! - Blank values are treated as unset.

use crate::dao::{DaoResult, SqliteNoteDao};
use crate::db::{open_db, open_db_in_memory};
use crate::logging::{default_log_level, init_logging, LoggingError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "LOCKNOTE_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "LOCKNOTE_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "LOCKNOTE_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// SQLite file; `None` keeps notes in memory.
    pub db_path: Option<PathBuf>,
    pub log_level: String,
    /// Absolute directory for rolling logs; `None` disables file logging.
    pub log_dir: Option<PathBuf>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl CoreConfig {
    /// Builds a config from `LOCKNOTE_*` keys, e.g. `|key| std::env::var(key).ok()`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let defaults = Self::default();
        Self {
            db_path: value(ENV_DB_PATH).map(PathBuf::from),
            log_level: value(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: value(ENV_LOG_DIR).map(PathBuf::from),
        }
    }

    /// Starts file logging when `log_dir` is set. Returns whether it is active.
    pub fn init_logging(&self) -> Result<bool, LoggingError> {
        match &self.log_dir {
            Some(dir) => init_logging(&self.log_level, dir).map(|()| true),
            None => Ok(false),
        }
    }
}

/// Opens the configured database and wraps it in a ready DAO.
pub fn open_store(config: &CoreConfig) -> DaoResult<SqliteNoteDao> {
    let conn = match &config.db_path {
        Some(path) => open_db(path)?,
        None => open_db_in_memory()?,
    };
    SqliteNoteDao::try_new(conn)
}
