//! Layered runtime configuration.
//!
//! Sources, lowest precedence first:
//! 1. built-in defaults,
//! 2. an optional TOML file,
//! 3. `REPOLINK_*` environment variables (e.g. `REPOLINK_DATABASE_PATH`).

use crate::logging::default_log_level;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

const ENV_PREFIX: &str = "REPOLINK_";
const DEFAULT_DATABASE_FILE: &str = "repolink.sqlite3";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. File logging is off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl AppConfig {
    /// Builds the layered figment without extracting it.
    pub fn figment(config_file: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));
        if let Some(path) = config_file {
            figment = figment.merge(Toml::file(path));
        }
        figment.merge(Env::prefixed(ENV_PREFIX))
    }

    /// Loads configuration from defaults, `config_file` and the environment.
    ///
    /// # Errors
    /// - `ConfigError::MissingFile` when `config_file` is given but absent.
    /// - `ConfigError::Extract` when a source holds malformed values.
    pub fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_file {
            if !path.is_file() {
                return Err(ConfigError::MissingFile(path.to_path_buf()));
            }
        }

        Self::figment(config_file)
            .extract()
            .map_err(|err| ConfigError::Extract(Box::new(err)))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    MissingFile(PathBuf),
    Extract(Box<figment::Error>),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingFile(path) => write!(f, "config file not found: {}", path.display()),
            Self::Extract(err) => write!(f, "invalid configuration: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::MissingFile(_) => None,
            Self::Extract(err) => Some(err.as_ref()),
        }
    }
}
