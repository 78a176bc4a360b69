//! Configuration loading, validation, and management for plugchain.
//!
//! Loads configuration from `~/.plugchain/config.toml` with environment
//! variable overrides. Validates all settings at startup. Every value is
//! session-scoped and immutable once a session has started.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.plugchain/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Model worker limits
    #[serde(default)]
    pub worker: WorkerConfig,

    /// Plugin compilation and invocation settings
    #[serde(default)]
    pub plugin: PluginConfig,

    /// Agent loop settings
    #[serde(default)]
    pub chain: ChainConfig,
}

/// Limits of the model worker a session talks to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Model identifier
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Maximum prompt length in tokens
    #[serde(default = "default_max_input_length")]
    pub max_input_length: usize,

    /// Language the assistant should answer in
    #[serde(default = "default_language")]
    pub language: String,

    /// Path to a `tokenizer.json` (used with the `hf-tokenizer` feature)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokenizer_path: Option<String>,
}

fn default_model_id() -> String {
    "OpenAssistant/oasst-sft-6-llama-30b".into()
}
fn default_max_input_length() -> usize {
    2048
}
fn default_language() -> String {
    "en".into()
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            model_id: default_model_id(),
            max_input_length: default_max_input_length(),
            language: default_language(),
            tokenizer_path: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Per-request timeout for manifest fetches and tool calls
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Tool responses longer than this are truncated
    #[serde(default = "default_response_max_length")]
    pub response_max_length: usize,

    /// Cap on the plugin's own description embedded in the prompt
    #[serde(default = "default_description_max_length")]
    pub description_max_length: usize,

    /// Cap on a rendered payload example
    #[serde(default = "default_payload_example_max_length")]
    pub payload_example_max_length: usize,

    /// Cap on each parameter description
    #[serde(default = "default_parameter_description_max_length")]
    pub parameter_description_max_length: usize,
}

fn default_request_timeout() -> u64 {
    30
}
fn default_response_max_length() -> usize {
    2048
}
fn default_description_max_length() -> usize {
    512
}
fn default_payload_example_max_length() -> usize {
    256
}
fn default_parameter_description_max_length() -> usize {
    128
}

impl Default for PluginConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            response_max_length: default_response_max_length(),
            description_max_length: default_description_max_length(),
            payload_example_max_length: default_payload_example_max_length(),
            parameter_description_max_length: default_parameter_description_max_length(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Maximum tool calls per user turn before giving up
    #[serde(default = "default_max_steps")]
    pub max_steps: usize,

    /// Marker the model uses to announce its final answer
    #[serde(default = "default_final_answer_prefix")]
    pub final_answer_prefix: String,

    #[serde(default = "default_human_prefix")]
    pub human_prefix: String,

    #[serde(default = "default_ai_prefix")]
    pub ai_prefix: String,

    /// Token that introduces a tool observation
    #[serde(default = "default_observation_separator")]
    pub observation_separator: String,
}

fn default_max_steps() -> usize {
    5
}
fn default_final_answer_prefix() -> String {
    "Final Answer".into()
}
fn default_human_prefix() -> String {
    "Human".into()
}
fn default_ai_prefix() -> String {
    "Assistant".into()
}
fn default_observation_separator() -> String {
    "Observation:".into()
}

impl Default for ChainConfig {
    fn default() -> Self {
        Self {
            max_steps: default_max_steps(),
            final_answer_prefix: default_final_answer_prefix(),
            human_prefix: default_human_prefix(),
            ai_prefix: default_ai_prefix(),
            observation_separator: default_observation_separator(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.plugchain/config.toml).
    ///
    /// Environment overrides (highest priority):
    /// - `PLUGCHAIN_MODEL`
    /// - `PLUGCHAIN_LANGUAGE`
    /// - `PLUGCHAIN_MAX_INPUT_LENGTH`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        if let Ok(model) = std::env::var("PLUGCHAIN_MODEL") {
            config.worker.model_id = model;
        }

        if let Ok(language) = std::env::var("PLUGCHAIN_LANGUAGE") {
            config.worker.language = language;
        }

        if let Ok(raw) = std::env::var("PLUGCHAIN_MAX_INPUT_LENGTH") {
            config.worker.max_input_length = raw.parse().map_err(|_| {
                ConfigError::ValidationError(format!(
                    "PLUGCHAIN_MAX_INPUT_LENGTH must be a positive integer, got {raw:?}"
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".plugchain")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.worker.max_input_length == 0 {
            return Err(ConfigError::ValidationError(
                "worker.max_input_length must be > 0".into(),
            ));
        }

        if self.plugin.response_max_length == 0 {
            return Err(ConfigError::ValidationError(
                "plugin.response_max_length must be > 0".into(),
            ));
        }

        if self.plugin.request_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "plugin.request_timeout_secs must be > 0".into(),
            ));
        }

        if self.chain.max_steps == 0 {
            return Err(ConfigError::ValidationError(
                "chain.max_steps must be > 0".into(),
            ));
        }

        if self.chain.final_answer_prefix.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "chain.final_answer_prefix must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `plugchain config`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.worker.max_input_length, 2048);
        assert_eq!(config.plugin.response_max_length, 2048);
        assert_eq!(config.plugin.description_max_length, 512);
        assert_eq!(config.chain.observation_separator, "Observation:");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.worker.model_id, config.worker.model_id);
        assert_eq!(parsed.chain.max_steps, config.chain.max_steps);
    }

    #[test]
    fn zero_input_length_rejected() {
        let mut config = AppConfig::default();
        config.worker.max_input_length = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_final_answer_prefix_rejected() {
        let mut config = AppConfig::default();
        config.chain.final_answer_prefix = "  ".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        let config = result.unwrap();
        assert_eq!(config.worker.language, "en");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[worker]
max_input_length = 1024
language = "de"

[chain]
final_answer_prefix = "Open Assistant"
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.worker.max_input_length, 1024);
        assert_eq!(config.worker.language, "de");
        assert_eq!(config.chain.final_answer_prefix, "Open Assistant");
        assert_eq!(config.chain.max_steps, 5);
        assert_eq!(config.plugin.request_timeout_secs, 30);
    }

    #[test]
    fn invalid_file_reports_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[worker\nmax_input_length = ").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn file_failing_validation_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[chain]\nmax_steps = 0").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("max_input_length = 2048"));
        assert!(toml_str.contains("Final Answer"));
    }
}
