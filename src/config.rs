//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub stats: StatsConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Journal storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default = "default_compression")]
    pub compression: bool,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("healthlog").to_string_lossy().to_string())
        .unwrap_or_else(|| "./healthlog_data".to_string())
}

fn default_extension() -> String {
    crate::storage::DEFAULT_EXTENSION.to_string()
}

fn default_compression() -> bool {
    true
}

impl StorageConfig {
    /// Data directory with a leading `~` expanded to the home directory
    pub fn data_path(&self) -> PathBuf {
        match (self.data_dir.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest),
            _ => PathBuf::from(&self.data_dir),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            extension: default_extension(),
            compression: default_compression(),
        }
    }
}

/// Statistics defaults
#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    /// Window used when no day count is given (0 = latest day only)
    #[serde(default = "default_days_back")]
    pub default_days_back: usize,
}

fn default_days_back() -> usize {
    6 // one week including the latest day
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            default_days_back: default_days_back(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("healthlog").join("config.toml")),
            Some(PathBuf::from("/etc/healthlog/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Storage overrides
        if let Some(data_dir) = var("HEALTHLOG_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Some(compression) = var("HEALTHLOG_COMPRESSION") {
            if let Ok(enabled) = compression.parse() {
                self.storage.compression = enabled;
            }
        }

        // Logging overrides
        if let Some(level) = var("HEALTHLOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("HEALTHLOG_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Healthlog Configuration
#
# Environment variables override these settings:
# - HEALTHLOG_DATA_DIR
# - HEALTHLOG_COMPRESSION
# - HEALTHLOG_LOG_LEVEL
# - HEALTHLOG_LOG_FORMAT

[storage]
# Directory holding one journal file per user
data_dir = "~/.local/share/healthlog"

# Journal file extension
extension = "dbhat"

# LZ4-compress journal files
compression = true

[stats]
# Days to go back when computing averages (0 means the latest day only)
default_days_back = 6

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/healthlog/healthlog.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.extension, "dbhat");
        assert!(config.storage.compression);
        assert_eq!(config.stats.default_days_back, 6);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_data_path() {
        let config = StorageConfig {
            data_dir: "/var/lib/healthlog".to_string(),
            ..Default::default()
        };
        assert_eq!(config.data_path(), PathBuf::from("/var/lib/healthlog"));

        if let Some(home) = dirs::home_dir() {
            let config = StorageConfig {
                data_dir: "~/journals".to_string(),
                ..Default::default()
            };
            assert_eq!(config.data_path(), home.join("journals"));
        }
    }

    #[test]
    fn test_generated_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.storage.data_dir, "~/.local/share/healthlog");
        assert_eq!(config.logging.level, "warn");
        assert!(config.logging.file.is_none());
    }

    #[test]
    fn test_partial_config() {
        let config: Config = toml::from_str("[stats]\ndefault_days_back = 13\n").unwrap();
        assert_eq!(config.stats.default_days_back, 13);
        assert_eq!(config.storage.extension, "dbhat");
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[storage]\ndata_dir = \"/tmp/journals\"\ncompression = false\n")
            .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.storage.data_dir, "/tmp/journals");
        assert!(!config.storage.compression);

        std::fs::write(&path, "[storage\n").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
        assert!(matches!(
            Config::load(&dir.path().join("missing.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("HEALTHLOG_DATA_DIR", "/srv/healthlog"),
            ("HEALTHLOG_COMPRESSION", "false"),
            ("HEALTHLOG_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.storage.data_dir, "/srv/healthlog");
        assert!(!config.storage.compression);
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "warn");
    }
}
