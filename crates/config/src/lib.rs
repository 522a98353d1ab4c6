//! Configuration loading, validation, and management for StudyLab.
//!
//! Loads configuration from `~/.studylab/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use studylab_core::persona::{AdviceScope, Tone};

/// The root configuration structure.
///
/// Maps directly to `~/.studylab/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// API key (can be overridden per-provider)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Default LLM provider
    #[serde(default = "default_provider")]
    pub default_provider: String,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Default temperature
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Default max tokens per LLM response
    #[serde(default = "default_max_tokens")]
    pub default_max_tokens: u32,

    /// Context assembly budgets
    #[serde(default)]
    pub context: ContextConfig,

    /// Conversation history configuration
    #[serde(default)]
    pub history: HistoryConfig,

    /// Course material configuration
    #[serde(default)]
    pub documents: DocumentsConfig,

    /// Persona configuration
    #[serde(default)]
    pub persona: PersonaConfig,

    /// Provider-specific configurations
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_provider() -> String {
    "openai".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("default_provider", &self.default_provider)
            .field("default_model", &self.default_model)
            .field("default_temperature", &self.default_temperature)
            .field("default_max_tokens", &self.default_max_tokens)
            .field("context", &self.context)
            .field("history", &self.history)
            .field("documents", &self.documents)
            .field("persona", &self.persona)
            .field("providers", &self.providers)
            .finish()
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("default_model", &self.default_model)
            .finish()
    }
}

/// Context assembly budgets, in characters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Total budget for the assembled course context (`B`)
    #[serde(default = "default_total_chars")]
    pub total_chars: usize,

    /// Per-source truncation limit applied before concatenation (`P`)
    #[serde(default = "default_per_source_chars")]
    pub per_source_chars: usize,
}

fn default_total_chars() -> usize {
    12_000
}
fn default_per_source_chars() -> usize {
    4_000
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            total_chars: default_total_chars(),
            per_source_chars: default_per_source_chars(),
        }
    }
}

/// Conversation history configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Backend: "sqlite" or "memory"
    #[serde(default = "default_history_backend")]
    pub backend: String,

    /// SQLite database path (ignored by the memory backend)
    #[serde(default = "default_history_path")]
    pub path: String,

    /// Max number of most-recent turns replayed per request (`W`)
    #[serde(default = "default_recency_window")]
    pub recency_window: usize,
}

fn default_history_backend() -> String {
    "sqlite".into()
}
fn default_history_path() -> String {
    "~/.studylab/history.db".into()
}
fn default_recency_window() -> usize {
    12
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            backend: default_history_backend(),
            path: default_history_path(),
            recency_window: default_recency_window(),
        }
    }
}

impl HistoryConfig {
    /// The database path with a leading `~` expanded to the home directory.
    pub fn resolved_path(&self) -> PathBuf {
        match self.path.strip_prefix("~/") {
            Some(rest) => dirs_home().join(rest),
            None => PathBuf::from(&self.path),
        }
    }
}

/// Course material configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    /// Directory of extracted course text files
    #[serde(default = "default_documents_dir")]
    pub dir: String,

    /// Name of the ordering manifest file within `dir`
    #[serde(default = "default_manifest")]
    pub manifest: String,
}

fn default_documents_dir() -> String {
    "~/.studylab/courses".into()
}
fn default_manifest() -> String {
    "order.txt".into()
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            dir: default_documents_dir(),
            manifest: default_manifest(),
        }
    }
}

impl DocumentsConfig {
    /// The documents directory with a leading `~` expanded.
    pub fn resolved_dir(&self) -> PathBuf {
        match self.dir.strip_prefix("~/") {
            Some(rest) => dirs_home().join(rest),
            None => PathBuf::from(&self.dir),
        }
    }
}

/// Persona configuration — maps onto `studylab_core::Persona`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaConfig {
    #[serde(default = "default_persona_name")]
    pub name: String,

    #[serde(default = "default_persona_description")]
    pub description: String,

    #[serde(default)]
    pub tone: Tone,

    #[serde(default)]
    pub advice_scope: AdviceScope,

    #[serde(default)]
    pub require_citations: bool,

    #[serde(default)]
    pub guidelines: Vec<String>,
}

fn default_persona_name() -> String {
    studylab_core::Persona::default_persona().name
}
fn default_persona_description() -> String {
    studylab_core::Persona::default_persona().description
}

impl Default for PersonaConfig {
    fn default() -> Self {
        let persona = studylab_core::Persona::default_persona();
        Self {
            name: persona.name,
            description: persona.description,
            tone: persona.tone,
            advice_scope: persona.advice_scope,
            require_citations: persona.require_citations,
            guidelines: persona.guidelines,
        }
    }
}

impl PersonaConfig {
    /// Build the domain persona from this configuration.
    pub fn to_persona(&self) -> studylab_core::Persona {
        studylab_core::Persona {
            name: self.name.clone(),
            description: self.description.clone(),
            tone: self.tone,
            advice_scope: self.advice_scope,
            require_citations: self.require_citations,
            guidelines: self.guidelines.clone(),
        }
    }
}

/// Per-provider overrides.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model: Option<String>,
}

impl AppConfig {
    /// Load configuration from the default path (~/.studylab/config.toml).
    ///
    /// Also checks environment variables for API keys:
    /// - `STUDYLAB_API_KEY` (highest priority)
    /// - `OPENROUTER_API_KEY`
    /// - `OPENAI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("STUDYLAB_API_KEY")
                .ok()
                .or_else(|| std::env::var("OPENROUTER_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
        }

        if let Ok(provider) = std::env::var("STUDYLAB_PROVIDER") {
            config.default_provider = provider;
        }

        if let Ok(model) = std::env::var("STUDYLAB_MODEL") {
            config.default_model = model;
        }

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
    ///
    /// Overridable via `STUDYLAB_CONFIG_DIR` (used by tests and packaging).
    pub fn config_dir() -> PathBuf {
        std::env::var("STUDYLAB_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| dirs_home().join(".studylab"))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "default_model must not be empty".into(),
            ));
        }

        if self.default_temperature < 0.0 || self.default_temperature > 2.0 {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.context.per_source_chars == 0 && self.context.total_chars > 0 {
            return Err(ConfigError::ValidationError(
                "context.per_source_chars must be > 0 when context.total_chars is > 0".into(),
            ));
        }

        match self.history.backend.as_str() {
            "sqlite" | "memory" => {}
            other => {
                return Err(ConfigError::ValidationError(format!(
                    "unknown history backend '{other}' (expected \"sqlite\" or \"memory\")"
                )));
            }
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for the `onboard` command).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            default_provider: default_provider(),
            default_model: default_model(),
            default_temperature: default_temperature(),
            default_max_tokens: default_max_tokens(),
            context: ContextConfig::default(),
            history: HistoryConfig::default(),
            documents: DocumentsConfig::default(),
            persona: PersonaConfig::default(),
            providers: HashMap::new(),
        }
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

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.default_provider, "openai");
        assert_eq!(config.context.total_chars, 12_000);
        assert_eq!(config.history.recency_window, 12);
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.default_model, config.default_model);
        assert_eq!(parsed.context.per_source_chars, config.context.per_source_chars);
        assert_eq!(parsed.documents.manifest, "order.txt");
    }

    #[test]
    fn invalid_temperature_rejected() {
        let config = AppConfig {
            default_temperature: 5.0,
            ..AppConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_per_source_with_nonzero_total_rejected() {
        let mut config = AppConfig::default();
        config.context.per_source_chars = 0;
        assert!(config.validate().is_err());

        // A fully zeroed budget is legal: the context is simply empty.
        config.context.total_chars = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn unknown_history_backend_rejected() {
        let mut config = AppConfig::default();
        config.history.backend = "redis".into();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("redis"));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let result = AppConfig::load_from(Path::new("/nonexistent/config.toml"));
        assert!(result.is_ok());
        assert_eq!(result.unwrap().default_model, "gpt-4o-mini");
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let toml_str = r#"
default_model = "gpt-4o"

[context]
total_chars = 1500
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.default_model, "gpt-4o");
        assert_eq!(config.context.total_chars, 1500);
        // Unspecified fields take their defaults
        assert_eq!(config.context.per_source_chars, 4_000);
        assert_eq!(config.history.backend, "sqlite");
    }

    #[test]
    fn persona_config_builds_domain_persona() {
        let toml_str = r#"
[persona]
name = "CourseCoach"
description = "a dropshipping course mentor"
tone = "motivational"
advice_scope = "general"
require_citations = true
"#;
        let config: AppConfig = toml::from_str(toml_str).unwrap();
        let persona = config.persona.to_persona();
        assert_eq!(persona.name, "CourseCoach");
        assert_eq!(persona.tone, Tone::Motivational);
        assert_eq!(persona.advice_scope, AdviceScope::General);
        assert!(persona.render().contains("Name the course document"));
    }

    #[test]
    fn home_expansion_in_paths() {
        let config = AppConfig::default();
        let db = config.history.resolved_path();
        assert!(db.to_string_lossy().ends_with(".studylab/history.db"));
        assert!(!db.to_string_lossy().starts_with('~'));
    }

    #[test]
    fn debug_redacts_api_key() {
        let config = AppConfig {
            api_key: Some("sk-secret".into()),
            ..AppConfig::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("[REDACTED]"));
    }
}
