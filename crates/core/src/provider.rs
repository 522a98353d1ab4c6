//! Provider trait — the abstraction over LLM completion backends.
//!
//! A provider knows how to submit an ordered message sequence to an LLM
//! and return the reply. The engine calls `complete()` without knowing
//! which backend is configured.
//!
//! Implementations: OpenAI-compatible endpoints (OpenAI, OpenRouter,
//! Ollama, vLLM), plus scripted stand-ins in tests.

use crate::error::ProviderError;
use crate::turn::Turn;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A completion request: the assembled, ordered turn sequence plus options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// The model to use (e.g., "gpt-4o-mini", "anthropic/claude-sonnet-4")
    pub model: String,

    /// The ordered turns: persona, course context, history window, utterance
    pub turns: Vec<Turn>,

    /// Temperature (0.0 = deterministic, 1.0 = creative)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum tokens to generate
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

fn default_temperature() -> f32 {
    0.7
}

impl CompletionRequest {
    /// Build a request with default options.
    pub fn new(model: impl Into<String>, turns: Vec<Turn>) -> Self {
        Self {
            model: model.into(),
            turns,
            temperature: default_temperature(),
            max_tokens: None,
        }
    }
}

/// A complete response from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// The generated reply text
    pub reply: String,

    /// Token usage statistics, when the provider reports them
    pub usage: Option<Usage>,

    /// Which model actually responded (may differ from requested)
    pub model: String,
}

/// Token usage information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// The core provider trait.
///
/// `complete()` is the only potentially slow operation in a chat turn
/// (a network round-trip); callers await it without holding any shared
/// lock.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// A human-readable name for this provider (e.g., "openai", "openrouter").
    fn name(&self) -> &str;

    /// Submit a request and return the complete reply.
    async fn complete(
        &self,
        request: CompletionRequest,
    ) -> std::result::Result<CompletionResponse, ProviderError>;

    /// List available models for this provider.
    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        Ok(Vec::new())
    }

    /// Health check — can we reach the provider?
    async fn health_check(&self) -> std::result::Result<bool, ProviderError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::turn::Turn;

    #[test]
    fn request_defaults() {
        let req = CompletionRequest::new("gpt-4o-mini", vec![Turn::user("hi")]);
        assert!((req.temperature - 0.7).abs() < f32::EPSILON);
        assert!(req.max_tokens.is_none());
        assert_eq!(req.turns.len(), 1);
    }

    #[test]
    fn response_serialization() {
        let resp = CompletionResponse {
            reply: "Start with Module 1.".into(),
            usage: Some(Usage {
                prompt_tokens: 120,
                completion_tokens: 8,
                total_tokens: 128,
            }),
            model: "gpt-4o-mini".into(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("Start with Module 1."));
        assert!(json.contains("128"));
    }
}
