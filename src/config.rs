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
    pub api: ApiConfig,

    #[serde(default)]
    pub ingest: IngestConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Log file ingestion configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IngestConfig {
    #[serde(default = "default_file")]
    pub file: PathBuf,

    #[serde(default = "default_timestamp_format")]
    pub timestamp_format: String,
}

fn default_file() -> PathBuf {
    PathBuf::from("hn_logs.tsv")
}

fn default_timestamp_format() -> String {
    crate::prefix::TIMESTAMP_FORMAT.to_string()
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            file: default_file(),
            timestamp_format: default_timestamp_format(),
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
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    /// Whether logs should be emitted as JSON lines
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Default config file locations, most specific first
    pub fn default_paths() -> Vec<PathBuf> {
        [
            dirs::config_dir().map(|p| p.join("hitlog").join("config.toml")),
            Some(PathBuf::from("/etc/hitlog/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// First default location holding a config file
    pub fn find_default() -> Option<PathBuf> {
        first_existing(&Self::default_paths())
    }

    /// Load from `path`, or from the environment alone when there is none
    ///
    /// Runs before logging is set up, so failures are returned rather than logged.
    pub fn load_from(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load_with_env(path),
            None => Self::from_env(),
        }
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<(), ConfigError> {
        // API overrides
        if let Some(host) = var("HITLOG_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = var("HITLOG_API_PORT") {
            self.api.port = port.parse().map_err(|e: std::num::ParseIntError| ConfigError::Env {
                var: "HITLOG_API_PORT",
                value: port.clone(),
                error: e.to_string(),
            })?;
        }

        // Ingest overrides
        if let Some(file) = var("HITLOG_INGEST_FILE") {
            self.ingest.file = PathBuf::from(file);
        }

        // Logging overrides
        if let Some(level) = var("HITLOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("HITLOG_LOG_FORMAT") {
            self.logging.format = format;
        }

        Ok(())
    }

    /// Address the API server binds to
    pub fn addr(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid {var} {value:?}: {error}")]
    Env {
        var: &'static str,
        value: String,
        error: String,
    },
}

fn first_existing(paths: &[PathBuf]) -> Option<PathBuf> {
    paths.iter().find(|path| path.exists()).cloned()
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Hitlog Configuration
#
# Environment variables override these settings:
# - HITLOG_API_HOST
# - HITLOG_API_PORT
# - HITLOG_INGEST_FILE
# - HITLOG_LOG_LEVEL
# - HITLOG_LOG_FORMAT

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8080

[ingest]
# Tab-separated log file loaded at startup
file = "hn_logs.tsv"

# strftime format of the timestamp column
timestamp_format = "%Y-%m-%d %H:%M:%S"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
