//! core::config
//!
//! Configuration loading.
//!
//! # Precedence
//!
//! Values are resolved in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. `~/.stallion/config.toml`
//! 3. Environment (`STALLION_API_URL`, `STALLION_CONSOLE_URL`)
//!
//! # Example
//!
//! ```no_run
//! use stallion::core::config::Config;
//!
//! let config = Config::load().unwrap();
//! println!("API: {}", config.api_url);
//! ```

pub mod schema;

pub use schema::ConfigFile;

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::paths;

/// Default base URL of the release service API.
pub const DEFAULT_API_URL: &str = "https://stallion-api.redhorse.tech/api/v1";

/// Default console page used by the browser login.
pub const DEFAULT_CONSOLE_URL: &str = "https://console.stalliontech.io/dashboard/cli/user";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "STALLION_API_URL";

/// Environment variable overriding the console login URL.
pub const CONSOLE_URL_ENV: &str = "STALLION_CONSOLE_URL";

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Base URL of the release service API, without a trailing slash.
    pub api_url: String,
    /// Console page opened by `login`.
    pub console_url: String,
    /// Path of the config file that was read, if any.
    pub source: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            console_url: DEFAULT_CONSOLE_URL.to_string(),
            source: None,
        }
    }
}

impl Config {
    /// Load configuration from the profile directory and the environment.
    pub fn load() -> Result<Self, ConfigError> {
        let file = paths::profile_dir().map(|dir| dir.join(paths::CONFIG_FILE));
        Self::load_from(file.as_deref(), |key| std::env::var(key).ok())
    }

    /// Load configuration from an explicit file and environment lookup.
    ///
    /// A missing file is not an error.
    pub fn load_from(
        file: Option<&Path>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(path) = file {
            if let Some(parsed) = Self::read_file(path)? {
                parsed.validate()?;
                if let Some(api_url) = parsed.api_url {
                    config.api_url = api_url;
                }
                if let Some(console_url) = parsed.console_url {
                    config.console_url = console_url;
                }
                config.source = Some(path.to_path_buf());
            }
        }

        if let Some(api_url) = env(API_URL_ENV).filter(|v| !v.is_empty()) {
            schema::validate_url(API_URL_ENV, &api_url)?;
            config.api_url = api_url;
        }
        if let Some(console_url) = env(CONSOLE_URL_ENV).filter(|v| !v.is_empty()) {
            schema::validate_url(CONSOLE_URL_ENV, &console_url)?;
            config.console_url = console_url;
        }

        config.api_url = config.api_url.trim_end_matches('/').to_string();
        Ok(config)
    }

    fn read_file(path: &Path) -> Result<Option<ConfigFile>, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(ConfigError::ReadError {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&content)
            .map(Some)
            .map_err(|e| ConfigError::ParseError {
                path: path.to_path_buf(),
                message: e.to_string(),
            })
    }
}
