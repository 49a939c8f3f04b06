//! Process configuration
//!
//! Settings are layered: built-in defaults, then an optional TOML file
//! (`~/.config/sentinel-engine/config.toml` unless a path is given), then
//! environment variables. Command-line flags are applied last by the CLI.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::services::RetryPolicy;

/// Errors raised while building settings
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: std::io::Error,
    },

    /// Config file is not valid TOML for the settings schema
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// File path
        path: PathBuf,
        /// Underlying error
        source: toml::de::Error,
    },

    /// An environment variable held an unusable value
    #[error("invalid value for {key}: {value:?}")]
    InvalidValue {
        /// Variable name
        key: &'static str,
        /// Offending value
        value: String,
    },

    /// A required setting is absent
    #[error("{0} is not set")]
    Missing(&'static str),
}

/// Endpoint host
pub const ENV_HOST: &str = "SENTINEL_ENGINE_HOST";
/// Endpoint port
pub const ENV_PORT: &str = "SENTINEL_ENGINE_PORT";
/// Endpoint worker threads
pub const ENV_WORKERS: &str = "SENTINEL_ENGINE_WORKERS";
/// Model artifact directory
pub const ENV_MODEL_DIR: &str = "SENTINEL_MODEL_DIR";
/// Document store connection string
pub const ENV_MONGO_URI: &str = "MONGO_URI";
/// Document store database name
pub const ENV_DATABASE: &str = "SENTINEL_DATABASE";
/// Generative API credential
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
/// Generative model name
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";
/// Generative API base URL
pub const ENV_GEMINI_BASE_URL: &str = "GEMINI_BASE_URL";
/// Generative API request timeout in seconds
pub const ENV_GEMINI_TIMEOUT: &str = "GEMINI_TIMEOUT_SECS";
/// Seconds between learning cycles
pub const ENV_LEARN_INTERVAL: &str = "SENTINEL_LEARN_INTERVAL_SECS";
/// Tries per external call
pub const ENV_RETRY_ATTEMPTS: &str = "SENTINEL_RETRY_ATTEMPTS";
/// First retry delay in milliseconds
pub const ENV_RETRY_DELAY: &str = "SENTINEL_RETRY_BASE_DELAY_MS";

/// All process settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Inference endpoint
    pub server: ServerSettings,
    /// Document store
    pub store: StoreSettings,
    /// Generative-language service
    pub generator: GeneratorSettings,
    /// Learning loop
    pub learner: LearnerSettings,
}

/// Inference endpoint settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Request worker threads
    pub workers: usize,
    /// Directory holding `vectorizer.json` and `classifier.json`
    pub model_dir: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            workers: 4,
            model_dir: PathBuf::from("saved_models"),
        }
    }
}

impl ServerSettings {
    /// `host:port` listen address
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Document store settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreSettings {
    /// Connection string
    pub mongo_uri: Option<String>,
    /// Database name
    pub database: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            mongo_uri: None,
            database: "titans_eye".to_string(),
        }
    }
}

impl StoreSettings {
    /// Connection string, or a startup error when unset
    pub fn require_mongo_uri(&self) -> Result<&str, ConfigError> {
        required(self.mongo_uri.as_deref(), ENV_MONGO_URI)
    }
}

/// Generative-language service settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorSettings {
    /// API credential
    pub api_key: Option<String>,
    /// Model name
    pub model: String,
    /// API base URL
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-pro-latest".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 60,
        }
    }
}

impl GeneratorSettings {
    /// API credential, or a startup error when unset
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        required(self.api_key.as_deref(), ENV_GEMINI_API_KEY)
    }

    /// Request timeout
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Learning loop settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerSettings {
    /// Seconds between cycles
    pub interval_secs: u64,
    /// Tries per external call
    pub retry_attempts: u32,
    /// First retry delay in milliseconds
    pub retry_base_delay_ms: u64,
}

impl Default for LearnerSettings {
    fn default() -> Self {
        Self {
            interval_secs: 3600,
            retry_attempts: 3,
            retry_base_delay_ms: 500,
        }
    }
}

impl LearnerSettings {
    /// Wait between cycles
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Retry policy for external calls
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.retry_attempts,
            Duration::from_millis(self.retry_base_delay_ms),
        )
    }
}

impl Settings {
    /// Default config file location
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("sentinel-engine").join("config.toml"))
    }

    /// Load settings from file and process environment
    ///
    /// An explicit `path` must exist; the default location is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_path() {
                Some(default) if default.exists() => Self::from_file(&default)?,
                _ => Self::default(),
            },
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Override settings from environment lookups
    ///
    /// Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get(ENV_HOST) {
            self.server.host = host;
        }
        if let Some(port) = get(ENV_PORT) {
            self.server.port = parse_value(ENV_PORT, &port)?;
        }
        if let Some(workers) = get(ENV_WORKERS) {
            self.server.workers = parse_value(ENV_WORKERS, &workers)?;
        }
        if let Some(dir) = get(ENV_MODEL_DIR) {
            self.server.model_dir = PathBuf::from(dir);
        }
        if let Some(uri) = get(ENV_MONGO_URI) {
            self.store.mongo_uri = Some(uri);
        }
        if let Some(database) = get(ENV_DATABASE) {
            self.store.database = database;
        }
        if let Some(key) = get(ENV_GEMINI_API_KEY) {
            self.generator.api_key = Some(key);
        }
        if let Some(model) = get(ENV_GEMINI_MODEL) {
            self.generator.model = model;
        }
        if let Some(url) = get(ENV_GEMINI_BASE_URL) {
            self.generator.base_url = url;
        }
        if let Some(timeout) = get(ENV_GEMINI_TIMEOUT) {
            self.generator.timeout_secs = parse_value(ENV_GEMINI_TIMEOUT, &timeout)?;
        }
        if let Some(interval) = get(ENV_LEARN_INTERVAL) {
            self.learner.interval_secs = parse_value(ENV_LEARN_INTERVAL, &interval)?;
        }
        if let Some(attempts) = get(ENV_RETRY_ATTEMPTS) {
            self.learner.retry_attempts = parse_value(ENV_RETRY_ATTEMPTS, &attempts)?;
        }
        if let Some(delay) = get(ENV_RETRY_DELAY) {
            self.learner.retry_base_delay_ms = parse_value(ENV_RETRY_DELAY, &delay)?;
        }

        Ok(())
    }
}

fn parse_value<T: FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

fn required<'a>(value: Option<&'a str>, key: &'static str) -> Result<&'a str, ConfigError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing(key))
}
