//! Runtime configuration for cart persistence and logging.
//!
//! # Responsibility
//! - Resolve the database path and log level from the environment.
//!
//! # Invariants
//! - A resolved config always carries a supported log level.
//! - Blank environment values are treated as unset.

use crate::logging::{default_log_level, parse_level};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Environment variable overriding the cart database file.
pub const DB_PATH_ENV: &str = "CART_DB_PATH";
/// Environment variable overriding the log level.
pub const LOG_LEVEL_ENV: &str = "CART_LOG_LEVEL";
/// File name used under the temp dir when no path is configured.
pub const DEFAULT_DB_FILE_NAME: &str = "cart_store.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(message) => write!(f, "{LOG_LEVEL_ENV}: {message}"),
        }
    }
}

impl Error for ConfigError {}

/// Resolved cart runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartConfig {
    pub db_path: PathBuf,
    pub log_level: &'static str,
}

impl CartConfig {
    /// Config for an explicit database path with the build's default level.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            log_level: default_log_level(),
        }
    }

    /// Reads `CART_DB_PATH` and `CART_LOG_LEVEL`.
    ///
    /// # Errors
    /// - `InvalidLogLevel` when `CART_LOG_LEVEL` names an unsupported level.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_blank = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let db_path = non_blank(DB_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DB_FILE_NAME));
        let log_level = match non_blank(LOG_LEVEL_ENV) {
            Some(raw) => parse_level(&raw).map_err(ConfigError::InvalidLogLevel)?,
            None => default_log_level(),
        };

        Ok(Self { db_path, log_level })
    }
}
