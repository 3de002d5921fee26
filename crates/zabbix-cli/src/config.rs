//! CLI configuration.
//!
//! Configuration is read from a TOML file with three sections:
//! - `[api]`: API URL and credentials
//! - `[app]`: output defaults
//! - `[logging]`: log level and destination
//!
//! Keys from older configuration files (`zabbix_api_url`, `system_id`,
//! `cert_verify`) are accepted as aliases.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::cli::Format;
use crate::error::CliError;

/// File name of the configuration file.
pub const CONFIG_FILENAME: &str = "zabbix-cli.toml";

/// Placeholder shown instead of secrets.
const REDACTED: &str = "********";

/// API connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the Zabbix frontend.
    #[serde(alias = "zabbix_api_url")]
    pub url: String,
    /// Username for `user.login`.
    #[serde(alias = "system_id")]
    pub username: String,
    /// Password for `user.login`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub password: String,
    /// API token. Takes precedence over username and password.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub auth_token: String,
    /// Verify TLS certificates.
    #[serde(alias = "cert_verify")]
    pub verify_ssl: bool,
    /// Request timeout in seconds. Zero disables the timeout.
    pub timeout: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            username: "Admin".into(),
            password: String::new(),
            auth_token: String::new(),
            verify_ssl: true,
            timeout: 0,
        }
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AppConfig {
    /// Default output format.
    pub output_format: Format,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Append logs to this file instead of stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".into(),
            log_file: None,
        }
    }
}

/// Main CLI configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// API settings.
    #[serde(default)]
    pub api: ApiConfig,
    /// Application settings.
    #[serde(default)]
    pub app: AppConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CliError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("failed to read config file '{}': {e}", path.display()))
        })?;
        debug!(path = %path.display(), "loaded config file");
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn from_toml(content: &str) -> Result<Self, CliError> {
        toml::from_str(content).map_err(|e| CliError::Config(format!("invalid TOML: {e}")))
    }

    /// Find the configuration file to load.
    ///
    /// An explicit path must exist. Otherwise the default location is used if
    /// a file is there, and `None` is returned if not.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path does not exist.
    pub fn locate(explicit: Option<&Path>) -> Result<Option<PathBuf>, CliError> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(CliError::Config(format!(
                    "config file '{}' not found",
                    path.display()
                )));
            }
            return Ok(Some(path.to_path_buf()));
        }
        Ok(default_config_path().filter(|path| path.is_file()))
    }

    /// Load configuration from an explicit path, or from the default location.
    ///
    /// Returns the configuration and the path it was read from. Built-in
    /// defaults are used when no file is found.
    ///
    /// # Errors
    ///
    /// Returns an error if an explicit path does not exist or a config file
    /// cannot be loaded.
    pub fn load(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), CliError> {
        match Self::locate(explicit)? {
            Some(path) => Ok((Self::from_file(&path)?, Some(path))),
            None => Ok((Self::default(), None)),
        }
    }

    /// Validate settings needed to talk to the API.
    ///
    /// # Errors
    ///
    /// Returns an error if the API URL is missing or malformed.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.api.url.is_empty() {
            return Err(CliError::Config("api.url cannot be empty".into()));
        }
        if !self.api.url.starts_with("http://") && !self.api.url.starts_with("https://") {
            return Err(CliError::Config(
                "api.url must start with http:// or https://".into(),
            ));
        }
        if self.api.auth_token.is_empty() && self.api.username.is_empty() {
            return Err(CliError::Config(
                "either api.auth_token or api.username must be set".into(),
            ));
        }
        Ok(())
    }

    /// Render the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, CliError> {
        toml::to_string_pretty(self).map_err(|e| CliError::Format(format!("TOML serialization failed: {e}")))
    }

    /// Copy of the configuration with secrets replaced by a placeholder.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        for secret in [&mut config.api.password, &mut config.api.auth_token] {
            if !secret.is_empty() {
                REDACTED.clone_into(secret);
            }
        }
        config
    }

    /// Write the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists and `overwrite` is false, or if
    /// writing fails.
    pub fn write_to(&self, path: &Path, overwrite: bool) -> Result<(), CliError> {
        if path.exists() && !overwrite {
            return Err(CliError::Config(format!(
                "config file '{}' already exists",
                path.display()
            )));
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, self.to_toml()?)?;
        debug!(path = %path.display(), "wrote config file");
        Ok(())
    }
}

/// Default configuration file path: `<config dir>/zabbix-cli/zabbix-cli.toml`.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("zabbix-cli").join(CONFIG_FILENAME))
}
