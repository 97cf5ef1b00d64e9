//! Runtime configuration resolved from the environment.
//!
//! # Invariants
//! - Resolution never fails; unset or blank variables fall back to defaults.
//! - Relative `NAVIGAITE_DATA_DIR` values are used as given; the log
//!   directory is made absolute because the logger requires it.

use crate::logging::default_log_level;
use std::path::{Path, PathBuf};

pub const DATA_DIR_ENV: &str = "NAVIGAITE_DATA_DIR";
pub const DB_PATH_ENV: &str = "NAVIGAITE_DB_PATH";
pub const LOG_LEVEL_ENV: &str = "NAVIGAITE_LOG_LEVEL";
pub const LOG_DIR_ENV: &str = "NAVIGAITE_LOG_DIR";

const DEFAULT_DATA_DIR_NAME: &str = "navigaite";
const DB_FILE_NAME: &str = "user_tasks.db";
const LOG_DIR_NAME: &str = "logs";

/// Paths and levels used to bootstrap storage and logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl CoreConfig {
    /// Builds defaults rooted at `data_dir`.
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            db_path: data_dir.join(DB_FILE_NAME),
            log_dir: absolutize(&data_dir.join(LOG_DIR_NAME)),
            log_level: default_log_level().to_string(),
            data_dir,
        }
    }

    /// Resolves configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolves configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        let data_dir = value(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| std::env::temp_dir().join(DEFAULT_DATA_DIR_NAME));
        let mut config = Self::with_data_dir(data_dir);

        if let Some(db_path) = value(DB_PATH_ENV) {
            config.db_path = PathBuf::from(db_path);
        }
        if let Some(level) = value(LOG_LEVEL_ENV) {
            config.log_level = level;
        }
        if let Some(log_dir) = value(LOG_DIR_ENV) {
            config.log_dir = absolutize(Path::new(&log_dir));
        }
        config
    }
}

fn absolutize(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf())
}
