//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::{ClientConfig, DEFAULT_API_URL};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Analysis API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_url")]
    pub url: String,

    /// Whole-request timeout; unset means no client-side limit
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,

    /// Substitute labeled demo data when the backend fails
    #[serde(default)]
    pub demo_mode: bool,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            url: default_api_url(),
            request_timeout_secs: None,
            demo_mode: false,
        }
    }
}

/// Where the session token and preferences are kept
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_store_path")]
    pub store_path: String,
}

fn default_store_path() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("gossipai").join("session.json").to_string_lossy().to_string())
        .unwrap_or_else(|| "./gossipai_session.json".to_string())
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
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
        }
    }
}

/// Parse a boolean environment value
fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("gossipai").join("config.toml")),
            Some(PathBuf::from("./gossipai.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply overrides from `lookup`, normally the process environment
    fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GOSSIPAI_API_URL") {
            self.api.url = url;
        }
        if let Some(demo) = lookup("GOSSIPAI_DEMO_MODE") {
            match parse_flag(&demo) {
                Some(flag) => self.api.demo_mode = flag,
                None => tracing::warn!("Ignoring GOSSIPAI_DEMO_MODE={:?}", demo),
            }
        }

        if let Some(path) = lookup("GOSSIPAI_SESSION_PATH") {
            self.session.store_path = path;
        }

        if let Some(level) = lookup("GOSSIPAI_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("GOSSIPAI_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Settings for [`crate::client::ApiClient::new`]
    pub fn client_config(&self) -> ClientConfig {
        ClientConfig {
            base_url: self.api.url.clone(),
            request_timeout: self.api.request_timeout_secs.map(Duration::from_secs),
            demo_mode: self.api.demo_mode,
        }
    }

    pub fn store_path(&self) -> PathBuf {
        PathBuf::from(&self.session.store_path)
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
    format!(
        r#"# GossipAI Configuration
#
# Environment variables override these settings:
# - GOSSIPAI_API_URL
# - GOSSIPAI_DEMO_MODE
# - GOSSIPAI_SESSION_PATH
# - GOSSIPAI_LOG_LEVEL
# - GOSSIPAI_LOG_FORMAT

[api]
# Analysis service; http:// is upgraded to https:// and /api/v1 is appended
url = {url:?}

# Request timeout in seconds (unset: no client-side limit)
# request_timeout_secs = 120

# Serve labeled demo data when the service fails
demo_mode = false

[session]
# File holding the login token and preset preferences
store_path = {store:?}

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#,
        url = DEFAULT_API_URL,
        store = default_store_path(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.api.url, DEFAULT_API_URL);
        assert!(!config.api.demo_mode);
        assert_eq!(config.api.request_timeout_secs, None);
        assert!(config.session.store_path.ends_with("session.json"));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gossipai.toml");
        std::fs::write(
            &path,
            "[api]\nurl = \"http://staging.example.com\"\nrequest_timeout_secs = 90\n",
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.url, "http://staging.example.com");
        assert_eq!(config.logging.format, "pretty");

        let client = config.client_config();
        assert_eq!(client.request_timeout, Some(Duration::from_secs(90)));
        assert!(!client.demo_mode);
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[api\nurl = ").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("broken.toml"));

        let missing = Config::load(&dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::Io { .. }));
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("GOSSIPAI_API_URL", "api.example.com"),
            ("GOSSIPAI_DEMO_MODE", "yes"),
            ("GOSSIPAI_SESSION_PATH", "/tmp/s.json"),
            ("GOSSIPAI_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_env_overrides(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.api.url, "api.example.com");
        assert!(config.api.demo_mode);
        assert_eq!(config.store_path(), PathBuf::from("/tmp/s.json"));
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_unparseable_flag_is_ignored() {
        let mut config = Config::default();
        config.api.demo_mode = true;
        config.apply_env_overrides(|key| (key == "GOSSIPAI_DEMO_MODE").then(|| "maybe".to_string()));
        assert!(config.api.demo_mode);
    }

    #[test]
    fn test_template_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.api.url, DEFAULT_API_URL);
        assert_eq!(config.logging.level, "warn");
    }
}
