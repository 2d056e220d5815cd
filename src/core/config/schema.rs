//! core::config::schema
//!
//! On-disk configuration schema.
//!
//! Located at `~/.stallion/config.toml`. Every key is optional.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// User configuration file.
///
/// # Example
///
/// ```toml
/// api_url = "https://stallion-api.redhorse.tech/api/v1"
/// console_url = "https://console.stalliontech.io/dashboard/cli/user"
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Base URL of the release service API.
    pub api_url: Option<String>,

    /// Console page that hands a CLI token back to the login callback.
    pub console_url: Option<String>,
}

impl ConfigFile {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a URL does not parse.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (key, value) in [("api_url", &self.api_url), ("console_url", &self.console_url)] {
            if let Some(value) = value {
                validate_url(key, value)?;
            }
        }
        Ok(())
    }
}

pub(super) fn validate_url(key: &str, value: &str) -> Result<(), ConfigError> {
    match url::Url::parse(value) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(_) => Err(ConfigError::InvalidValue(format!(
            "{} must be an http(s) URL, got '{}'",
            key, value
        ))),
        Err(e) => Err(ConfigError::InvalidValue(format!(
            "{} is not a valid URL ('{}'): {}",
            key, value, e
        ))),
    }
}
