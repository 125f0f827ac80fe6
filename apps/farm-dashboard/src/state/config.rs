//! # Configuration
//!
//! Startup configuration, read once from the environment.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`FARM_*`)
//! 2. Platform data directory (`directories::ProjectDirs`)
//! 3. Defaults (this file)
//!
//! ## Database Path
//! - **Override**: `FARM_DB_PATH` (use `:memory:` for a throwaway store)
//! - **macOS**: `~/Library/Application Support/com.printfarm.dashboard/farm.db`
//! - **Windows**: `%APPDATA%\printfarm\dashboard\data\farm.db`
//! - **Linux**: `~/.local/share/dashboard/farm.db`
//!
//! ## Thread Safety
//! Read-only after startup, so no lock.

use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Serialize;
use thiserror::Error;

use farm_db::DbConfig;

/// Environment variable overriding the database path.
pub const DB_PATH_VAR: &str = "FARM_DB_PATH";

/// Environment variable toggling seed-on-empty (`0`/`false` disables).
pub const SEED_VAR: &str = "FARM_SEED";

/// Configuration could not be resolved.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No home directory to derive the data directory from.
    #[error("Could not determine app data directory")]
    NoDataDir,

    /// The data directory exists in name only.
    #[error("Could not create data directory {path}: {source}")]
    CreateDataDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Dashboard configuration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    /// SQLite database file, or `:memory:`.
    pub database_path: PathBuf,

    /// Write the default dataset when the store has no details.
    /// Default: true
    pub seed_on_empty: bool,
}

impl AppConfig {
    /// Creates a configuration for an explicit database path.
    pub fn new(database_path: impl Into<PathBuf>) -> Self {
        AppConfig {
            database_path: database_path.into(),
            seed_on_empty: true,
        }
    }

    /// Sets whether to seed an empty store.
    pub fn seed_on_empty(mut self, seed: bool) -> Self {
        self.seed_on_empty = seed;
        self
    }

    /// Reads the configuration from the environment.
    ///
    /// ## Environment Variables
    /// - `FARM_DB_PATH`: Override the database path
    /// - `FARM_SEED`: `0` or `false` disables seeding
    pub fn from_env() -> Result<Self, ConfigError> {
        let database_path = match std::env::var(DB_PATH_VAR) {
            Ok(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_database_path()?,
        };

        let seed_on_empty = std::env::var(SEED_VAR)
            .map(|v| parse_flag(&v))
            .unwrap_or(true);

        Ok(AppConfig {
            database_path,
            seed_on_empty,
        })
    }

    /// Store configuration for this dashboard.
    pub fn db_config(&self) -> DbConfig {
        let config = DbConfig::new(&self.database_path);
        if config.is_in_memory() {
            DbConfig::in_memory()
        } else {
            config
        }
    }
}

/// Platform data directory + `farm.db`, creating the directory.
fn default_database_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("com", "printfarm", "dashboard").ok_or(ConfigError::NoDataDir)?;

    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir).map_err(|source| ConfigError::CreateDataDir {
        path: data_dir.to_path_buf(),
        source,
    })?;

    Ok(data_dir.join("farm.db"))
}

/// Anything but `0`/`false`/`no`/`off` counts as enabled.
fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flag() {
        assert!(!parse_flag("0"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(" FALSE "));
        assert!(parse_flag("1"));
        assert!(parse_flag("true"));
        assert!(parse_flag(""));
    }

    #[test]
    fn test_in_memory_path_maps_to_in_memory_store() {
        let config = AppConfig::new(":memory:").seed_on_empty(false);
        assert!(config.db_config().is_in_memory());
        assert!(!config.seed_on_empty);
    }

    #[test]
    fn test_file_path_kept() {
        let config = AppConfig::new("/var/lib/farm/farm.db");
        let db = config.db_config();
        assert_eq!(db.database_path, PathBuf::from("/var/lib/farm/farm.db"));
        assert!(config.seed_on_empty);
    }
}
