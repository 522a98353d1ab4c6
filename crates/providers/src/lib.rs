//! LLM provider implementations for StudyLab.
//!
//! All providers implement the `studylab_core::ModelProvider` trait.
//! `build_from_config` selects and constructs the configured backend.

pub mod openai_compat;

pub use openai_compat::OpenAiCompatProvider;

use std::sync::Arc;
use studylab_config::AppConfig;
use studylab_core::ModelProvider;
use studylab_core::error::ProviderError;

/// Default base URL for a known provider name.
fn default_base_url(name: &str) -> String {
    match name {
        "openai" => "https://api.openai.com/v1".into(),
        "openrouter" => "https://openrouter.ai/api/v1".into(),
        "ollama" => "http://localhost:11434/v1".into(),
        other => format!("https://{other}/v1"),
    }
}

/// Build the configured default provider.
///
/// Per-provider settings in `[providers.<name>]` override the top-level
/// API key; a missing key fails here (early, with a clear message) rather
/// than on the first chat turn.
pub fn build_from_config(config: &AppConfig) -> Result<Arc<dyn ModelProvider>, ProviderError> {
    let name = config.default_provider.as_str();
    let provider_config = config.providers.get(name);

    let api_key = provider_config
        .and_then(|p| p.api_key.clone())
        .or_else(|| config.api_key.clone())
        .ok_or_else(|| {
            ProviderError::NotConfigured(format!("no API key configured for provider '{name}'"))
        })?;

    let base_url = provider_config
        .and_then(|p| p.api_url.clone())
        .unwrap_or_else(|| default_base_url(name));

    Ok(Arc::new(OpenAiCompatProvider::new(name, base_url, api_key)))
}
