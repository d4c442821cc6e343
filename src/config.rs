// Service configuration
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{info, warn};

use crate::error::ServiceError;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ServiceConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sled,
    Memory,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct StorageConfig {
    #[serde(default = "default_backend")]
    pub backend: StorageBackend,
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_backend() -> StorageBackend {
    StorageBackend::Sled
}

fn default_db_path() -> String {
    "./data/accounts".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port() }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: default_backend(), db_path: default_db_path() }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

impl ServiceConfig {
    pub fn from_toml(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    pub fn to_toml(&self) -> String {
        // Plain structs of strings and integers always serialize
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Read the config at `path`. A missing file is created with defaults.
    /// The caller logs the returned [`ConfigSource`].
    pub fn load_or_default(path: &str) -> Result<(Self, ConfigSource), ServiceError> {
        if Path::new(path).exists() {
            let s = std::fs::read_to_string(path)
                .map_err(|e| ServiceError::Config(path.to_string(), e.to_string()))?;
            let config = Self::from_toml(&s)
                .map_err(|e| ServiceError::Config(path.to_string(), e.to_string()))?;
            Ok((config, ConfigSource::Loaded))
        } else {
            let config = Self::default();
            let source = match std::fs::write(path, config.to_toml()) {
                Ok(()) => ConfigSource::Created,
                Err(e) => ConfigSource::DefaultsOnly(e.to_string()),
            };
            Ok((config, source))
        }
    }
}

/// Where a loaded [`ServiceConfig`] came from
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigSource {
    Loaded,
    /// File was missing and defaults were written to it
    Created,
    /// File was missing and could not be written
    DefaultsOnly(String),
}

impl ConfigSource {
    pub fn log(&self, path: &str) {
        match self {
            ConfigSource::Loaded => info!("Config loaded from {}", path),
            ConfigSource::Created => info!("Config file not found at '{}'. Created default.", path),
            ConfigSource::DefaultsOnly(e) => {
                warn!("Config file not found at '{}' and could not be created: {}", path, e)
            }
        }
    }
}
