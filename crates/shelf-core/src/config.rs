//! Configuration for shelf
//!
//! Server address, storage location, log filter and graph geometry. Loaded
//! from TOML, with `SHELF_ADDR` and `SHELF_DATA_DIR` taking precedence over
//! the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::graph::GraphOptions;

/// Environment variable naming the TOML config file
pub const CONFIG_ENV: &str = "SHELF_CONFIG";
/// Environment override for `server.bind_addr`
pub const ADDR_ENV: &str = "SHELF_ADDR";
/// Environment override for `storage.data_dir`
pub const DATA_DIR_ENV: &str = "SHELF_DATA_DIR";

/// System-wide configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub graph: GraphOptions,
}

/// HTTP listener settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Where user documents live
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|d| d.join("shelf").join("users"))
            .unwrap_or_else(|| PathBuf::from("data").join("users"));
        Self { data_dir }
    }
}

/// Log filter used when `RUST_LOG` is unset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl ShelfConfig {
    /// Load configuration from a TOML string
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize configuration to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Read(path.display().to_string(), e.to_string()))?;
        Self::from_toml(&text)
    }

    /// Load from `SHELF_CONFIG` (or defaults), apply environment overrides
    /// and validate
    pub fn load() -> Result<Self, ConfigError> {
        let config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(path)?,
            Err(_) => Self::default(),
        };
        let config = config.with_overrides(
            std::env::var(ADDR_ENV).ok(),
            std::env::var(DATA_DIR_ENV).ok(),
        );
        config.validate()?;
        Ok(config)
    }

    /// Replace the bind address and data directory where given
    pub fn with_overrides(mut self, bind_addr: Option<String>, data_dir: Option<String>) -> Self {
        if let Some(addr) = bind_addr.filter(|a| !a.trim().is_empty()) {
            self.server.bind_addr = addr;
        }
        if let Some(dir) = data_dir.filter(|d| !d.trim().is_empty()) {
            self.storage.data_dir = PathBuf::from(dir);
        }
        self
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_addr.trim().is_empty() {
            return Err(ConfigError::MissingField("server.bind_addr".to_string()));
        }
        if self.graph.width <= 0.0 {
            return Err(ConfigError::OutOfRange(
                "graph.width must be positive".to_string(),
            ));
        }
        if self.graph.row_height <= 0.0 {
            return Err(ConfigError::OutOfRange(
                "graph.row_height must be positive".to_string(),
            ));
        }
        if self.graph.bar_height <= 0.0 || self.graph.bar_height > self.graph.row_height {
            return Err(ConfigError::OutOfRange(
                "graph.bar_height must be positive and no taller than graph.row_height".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration loading or validation error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("Cannot read config file {0}: {1}")]
    Read(String, String),
    /// TOML could not be parsed or produced
    #[error("Invalid config: {0}")]
    Parse(String),
    /// Value is out of valid range
    #[error("Value out of range: {0}")]
    OutOfRange(String),
    /// Required field is missing
    #[error("Missing field: {0}")]
    MissingField(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ShelfConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.bind_addr, "127.0.0.1:3000");
        assert!(config.storage.data_dir.ends_with("users"));
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = ShelfConfig::from_toml(
            r#"
            [server]
            bind_addr = "0.0.0.0:8080"

            [graph]
            width = 1200.0
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind_addr, "0.0.0.0:8080");
        assert_eq!(config.graph.width, 1200.0);
        assert_eq!(config.graph.row_height, GraphOptions::default().row_height);
        assert_eq!(config.logging.filter, "info");
    }

    #[test]
    fn test_toml_round_trip() {
        let config = ShelfConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(ShelfConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_overrides() {
        let config = ShelfConfig::default().with_overrides(
            Some("0.0.0.0:9000".to_string()),
            Some("/tmp/shelf".to_string()),
        );
        assert_eq!(config.server.bind_addr, "0.0.0.0:9000");
        assert_eq!(config.storage.data_dir, PathBuf::from("/tmp/shelf"));

        let untouched = ShelfConfig::default().with_overrides(Some("  ".to_string()), None);
        assert_eq!(untouched.server.bind_addr, "127.0.0.1:3000");
    }

    #[test]
    fn test_bar_taller_than_row_is_invalid() {
        let mut config = ShelfConfig::default();
        config.graph.bar_height = config.graph.row_height + 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::OutOfRange(_))));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            ShelfConfig::from_toml("server = 3"),
            Err(ConfigError::Parse(_))
        ));
    }
}
