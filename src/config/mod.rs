// Configuration module

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::constants::DEFAULT_CONFIG_KEY;
use crate::error::ConfigError;

pub mod server;
pub mod signing;

pub use server::{ServerConfig, UpstreamAddress, UpstreamConfig};
pub use signing::{is_valid_separator, LogLevel, SigningConfig};

/// Process configuration, loaded once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub store: StoreConfig,
    #[serde(default)]
    pub options: OptionsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration store backend
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// One file per key under `path`
    #[default]
    File,
    /// Record embedded in this configuration
    Memory,
}

fn default_config_key() -> String {
    DEFAULT_CONFIG_KEY.to_string()
}

/// Where the signing record is fetched from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub kind: StoreKind,

    /// Directory holding the store files (kind: file)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    /// Key of the signing record (default: "config")
    #[serde(default = "default_config_key")]
    pub config_key: String,

    /// Inline signing record (kind: memory)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<SigningConfig>,
}

/// Option registry settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OptionsConfig {
    /// Enable the extended (restricted) option set (default: false)
    #[serde(default)]
    pub extended: bool,
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

/// Process-wide logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive (default: "info"); RUST_LOG overrides it
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

impl Config {
    pub fn from_yaml_with_env(yaml: &str) -> Result<Self, ConfigError> {
        // Replace ${VAR_NAME} with environment variable values
        let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}")
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        // First, check that all referenced environment variables exist
        for caps in re.captures_iter(yaml) {
            let var_name = &caps[1];
            if std::env::var(var_name).is_err() {
                return Err(ConfigError::MissingEnvVar(var_name.to_string()));
            }
        }

        let substituted = re.replace_all(yaml, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        });

        let config: Config = serde_yaml::from_str(&substituted)?;
        config.validate()?;

        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_with_env(&yaml)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Invalid("server.port cannot be 0".to_string()));
        }

        if self.upstream.address().is_none() {
            return Err(ConfigError::Invalid(format!(
                "upstream.endpoint '{}' must be an http:// or https:// URL with a host",
                self.upstream.endpoint
            )));
        }

        if self.store.config_key.is_empty() {
            return Err(ConfigError::Invalid(
                "store.config_key cannot be empty".to_string(),
            ));
        }

        match self.store.kind {
            StoreKind::File if self.store.path.as_deref().map_or(true, str::is_empty) => {
                Err(ConfigError::Invalid(
                    "store.path is required for the file store".to_string(),
                ))
            }
            StoreKind::Memory if self.store.record.is_none() => Err(ConfigError::Invalid(
                "store.record is required for the memory store".to_string(),
            )),
            _ => Ok(()),
        }
    }
}
