//! Configuration loading
//!
//! Sources, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. A TOML file: an explicit path, `QUARRY_CONFIG`, or `quarry.toml` if present
//! 3. Environment variables `QUARRY__<SECTION>__<KEY>` (e.g. `QUARRY__DATABASE__URL`)
//!
//! A `.env` file is loaded separately through [`load_dotenv`], ahead of
//! [`Config::load_from`], so its failures can be reported once logging is up.

use config::{Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::models::{TargetConfig, TargetRegistry};
use crate::{Error, Result};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Entity kind to search target
    #[serde(default)]
    pub targets: BTreeMap<String, TargetConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// MySQL connection URL; falls back to `DATABASE_URL`
    pub url: String,
    pub pool_min_size: u32,
    pub pool_max_size: u32,
    pub acquire_timeout_seconds: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: std::env::var("DATABASE_URL").unwrap_or_default(),
            pool_min_size: 0,
            pool_max_size: 10,
            acquire_timeout_seconds: 30,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default level for quarry crates when `RUST_LOG` is unset
    pub level: String,
    /// JSON lines instead of human-readable output
    pub json: bool,
    pub file_enabled: bool,
    pub file_directory: String,
    pub file_prefix: String,
    /// daily, hourly, minutely or never
    pub file_rotation: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file_enabled: false,
            file_directory: "logs".to_string(),
            file_prefix: "quarry".to_string(),
            file_rotation: "daily".to_string(),
        }
    }
}

const FILE_ROTATIONS: [&str; 4] = ["daily", "hourly", "minutely", "never"];

/// Load `.env` from the working directory or one of its parents.
///
/// A missing file is fine. Any other failure is returned for the caller to
/// log, since this runs before logging is initialized.
pub fn load_dotenv() -> Option<dotenvy::Error> {
    unless_missing(dotenvy::dotenv())
}

/// Load a specific env file. A missing file is fine.
pub fn load_dotenv_from(path: &Path) -> Option<dotenvy::Error> {
    unless_missing(dotenvy::from_path(path))
}

fn unless_missing<T>(result: dotenvy::Result<T>) -> Option<dotenvy::Error> {
    match result {
        Err(e) if !e.not_found() => Some(e),
        _ => None,
    }
}

impl Config {
    /// Load configuration, reading `path` instead of the default file if given.
    ///
    /// Does not log; nothing is subscribed yet when binaries call this.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let explicit: Option<PathBuf> = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os("QUARRY_CONFIG").map(PathBuf::from));

        let file = match &explicit {
            Some(path) => File::from(path.as_path()).required(true),
            None => File::with_name("quarry").required(false),
        };

        let settings = config::Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("QUARRY")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Parse configuration from TOML text alone (no file or environment lookup).
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()?;
        Ok(settings.try_deserialize()?)
    }

    pub fn validate(&self) -> Result<()> {
        if self.database.url.trim().is_empty() {
            return Err(invalid("database.url must be set"));
        }
        if self.database.pool_max_size == 0 {
            return Err(invalid("database.pool_max_size must be greater than zero"));
        }
        if self.database.pool_min_size > self.database.pool_max_size {
            return Err(invalid(
                "database.pool_min_size must not exceed database.pool_max_size",
            ));
        }
        if !FILE_ROTATIONS.contains(&self.logging.file_rotation.as_str()) {
            return Err(invalid(&format!(
                "logging.file_rotation must be one of {}",
                FILE_ROTATIONS.join(", ")
            )));
        }
        if self.targets.is_empty() {
            return Err(invalid("at least one search target must be configured"));
        }
        Ok(())
    }

    /// Build the shared, read-only target registry.
    pub fn target_registry(&self) -> TargetRegistry {
        self.targets
            .iter()
            .map(|(kind, target)| (kind.clone(), target.clone()))
            .collect()
    }
}

fn invalid(message: &str) -> Error {
    Error::Config(config::ConfigError::Message(message.to_string()))
}
