//! Configuration loading from steward.toml.

use serde::Deserialize;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "steward.toml";

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_model() -> String {
    runtime::DEFAULT_MODEL.to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

/// Top-level configuration.
///
/// Every section is optional; a missing file means defaults throughout.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub backend: BackendConfig,

    #[serde(default)]
    pub forecast: ForecastConfig,

    #[serde(default)]
    pub python: PythonConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Listen address.
    #[serde(default = "default_bind")]
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

/// Model backend configuration.
#[derive(Debug, Deserialize)]
pub struct BackendConfig {
    /// Model to use.
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Anthropic API key. Falls back to the ANTHROPIC_API_KEY environment
    /// variable when unset.
    pub api_key: Option<String>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            max_tokens: default_max_tokens(),
            api_key: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ForecastConfig {
    /// Override the forecast endpoint (defaults to the public Open-Meteo URL).
    pub base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PythonConfig {
    /// Interpreter executable (defaults to the platform name).
    pub interpreter: Option<String>,

    /// Wall-clock budget per execution, in seconds (default 10).
    pub timeout_secs: Option<u64>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Resolve the API key from config or environment.
    pub fn api_key(&self) -> Result<String, ConfigError> {
        if let Some(key) = &self.backend.api_key {
            return Ok(key.clone());
        }
        std::env::var("ANTHROPIC_API_KEY").map_err(|_| ConfigError::MissingApiKey)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),

    #[error("API key not configured: set backend.api_key or ANTHROPIC_API_KEY")]
    MissingApiKey,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert_eq!(config.server.bind, "127.0.0.1:8080");
        assert_eq!(config.backend.model, runtime::DEFAULT_MODEL);
        assert_eq!(config.backend.max_tokens, 4096);
        assert!(config.forecast.base_url.is_none());
        assert!(config.python.interpreter.is_none());
    }

    #[test]
    fn sections_override_defaults() {
        let config = Config::parse(
            r#"
            [server]
            bind = "0.0.0.0:9000"

            [backend]
            model = "claude-haiku-4-5"
            api_key = "sk-ant-api01-test"

            [python]
            interpreter = "python3.12"
            timeout_secs = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind, "0.0.0.0:9000");
        assert_eq!(config.backend.model, "claude-haiku-4-5");
        assert_eq!(config.api_key().unwrap(), "sk-ant-api01-test");
        assert_eq!(config.python.interpreter.as_deref(), Some("python3.12"));
        assert_eq!(config.python.timeout_secs, Some(5));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::parse("[server\nbind = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)), "{err:?}");
    }
}
