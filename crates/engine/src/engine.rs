//! The chat engine — one turn end to end.
//!
//! Wires the context assembler, history store, and model provider into a
//! single `chat()` entry point. The assembled course context is computed
//! once and cached for the process lifetime; `refresh_context()` is the
//! explicit rescan trigger (never fired implicitly per request).
//!
//! Concurrent turns on the *same* conversation are not serialized here:
//! the history store orders turns by insertion sequence, so racing turns
//! interleave in arrival order (a documented race, not an atomicity
//! guarantee). Callers needing mutual exclusion add it above this layer.

use crate::accumulator::build_request;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use studylab_context::{AssembledContext, AssemblyStats, ContextAssembler, SourceSet};
use studylab_core::document::DocumentStore;
use studylab_core::error::{Error, Result};
use studylab_core::history::HistoryStore;
use studylab_core::persona::Persona;
use studylab_core::provider::{CompletionRequest, ModelProvider, Usage};
use studylab_core::turn::{ConversationId, Turn};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// The outcome of a successful chat turn.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// The model's reply text.
    pub text: String,

    /// Token usage, when the provider reports it.
    pub usage: Option<Usage>,

    /// Which model responded.
    pub model: String,
}

/// Orchestrates chat turns over the configured collaborators.
pub struct ChatEngine {
    provider: Arc<dyn ModelProvider>,
    documents: Arc<dyn DocumentStore>,
    history: Arc<dyn HistoryStore>,
    assembler: ContextAssembler,
    persona: Persona,
    model: String,
    temperature: f32,
    max_tokens: Option<u32>,
    recency_window: usize,
    context: RwLock<Arc<AssembledContext>>,
}

impl ChatEngine {
    /// Create an engine with an empty context cache.
    ///
    /// Call [`refresh_context`](Self::refresh_context) (or use
    /// [`start`](Self::start)) to load course material before chatting;
    /// until then turns run on the persona alone.
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        documents: Arc<dyn DocumentStore>,
        history: Arc<dyn HistoryStore>,
        assembler: ContextAssembler,
        persona: Persona,
        model: impl Into<String>,
    ) -> Self {
        let empty = AssembledContext::empty(assembler.budget());
        Self {
            provider,
            documents,
            history,
            assembler,
            persona,
            model: model.into(),
            temperature: 0.7,
            max_tokens: None,
            recency_window: 12,
            context: RwLock::new(Arc::new(empty)),
        }
    }

    /// Create an engine and perform the initial course material load.
    pub async fn start(
        provider: Arc<dyn ModelProvider>,
        documents: Arc<dyn DocumentStore>,
        history: Arc<dyn HistoryStore>,
        assembler: ContextAssembler,
        persona: Persona,
        model: impl Into<String>,
    ) -> Result<Self> {
        let engine = Self::new(provider, documents, history, assembler, persona, model);
        engine.refresh_context().await?;
        Ok(engine)
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Set the max tokens per reply.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    /// Set the recency window `W` (max history turns replayed per request).
    pub fn with_recency_window(mut self, window: usize) -> Self {
        self.recency_window = window;
        self
    }

    /// Rescan course material and rebuild the cached context.
    ///
    /// Explicit and idempotent; the only operation that touches the
    /// document store after startup.
    pub async fn refresh_context(&self) -> Result<AssemblyStats> {
        let count = self.documents.refresh().await?;
        let set = SourceSet::collect(self.documents.as_ref()).await;
        let assembled = self.assembler.assemble(&set)?;
        let stats = assembled.stats.clone();

        info!(
            documents = count,
            chars = stats.total_chars,
            skipped = stats.skipped.len(),
            "Course context refreshed"
        );

        *self.context.write().await = Arc::new(assembled);
        Ok(stats)
    }

    /// Statistics for the currently cached context.
    pub async fn context_stats(&self) -> AssemblyStats {
        self.context.read().await.stats.clone()
    }

    /// Run one chat turn.
    ///
    /// On success the exchange is persisted as exactly two turns (user,
    /// then assistant) with strictly increasing timestamps. On provider
    /// failure the error propagates and no assistant turn is recorded —
    /// the caller sees an explicit failure, never a silent empty reply.
    /// A history outage degrades the turn (persona + context + utterance)
    /// instead of failing it.
    pub async fn chat(&self, conversation: &ConversationId, utterance: &str) -> Result<ChatReply> {
        // Arc clone so no lock is held across the provider round-trip.
        let context = self.context.read().await.clone();

        let window = match self.history.recent(conversation, self.recency_window).await {
            Ok(turns) => turns,
            Err(e) => {
                warn!(conversation = %conversation, error = %e, "History unavailable; degrading to context-only request");
                Vec::new()
            }
        };

        let turns = build_request(&self.persona, &context.text, &window, utterance);
        debug!(
            conversation = %conversation,
            window = window.len(),
            turns = turns.len(),
            "Built chat request"
        );

        let request = CompletionRequest {
            model: self.model.clone(),
            turns,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        // Provider failures propagate untouched: no retry, and never an
        // assistant turn. The user turn is still recorded so a retry
        // replays the attempt inside the window.
        let response = match self.provider.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                let user_turn = stamp_after(
                    Turn::user(utterance),
                    window.last().map(|t| t.created_at),
                );
                if let Err(append_err) = self.history.append(conversation, user_turn).await {
                    warn!(conversation = %conversation, error = %append_err, "Failed to persist user turn of failed exchange");
                }
                return Err(Error::from(e));
            }
        };

        if let Err(e) = self
            .record_exchange(conversation, utterance, &response.reply)
            .await
        {
            warn!(conversation = %conversation, error = %e, "Failed to persist exchange");
        }

        Ok(ChatReply {
            text: response.reply,
            usage: response.usage,
            model: response.model,
        })
    }

    /// Persist one completed exchange: the user utterance, then the reply,
    /// each with a creation timestamp strictly greater than the previous
    /// maximum for the conversation.
    ///
    /// Idempotent only if the caller de-duplicates retries.
    pub async fn record_exchange(
        &self,
        conversation: &ConversationId,
        utterance: &str,
        reply: &str,
    ) -> Result<()> {
        let previous = self
            .history
            .recent(conversation, 1)
            .await
            .ok()
            .and_then(|turns| turns.last().map(|t| t.created_at));

        let user_turn = stamp_after(Turn::user(utterance), previous);
        let assistant_turn = stamp_after(Turn::assistant(reply), Some(user_turn.created_at));

        self.history.append(conversation, user_turn).await?;
        self.history.append(conversation, assistant_turn).await?;
        Ok(())
    }
}

/// Ensure a turn's timestamp is strictly greater than `previous`.
///
/// Wall clocks at microsecond precision can tie within one turn; the
/// insertion sequence in the history store remains the authoritative
/// order either way.
fn stamp_after(turn: Turn, previous: Option<DateTime<Utc>>) -> Turn {
    match previous {
        Some(prev) if turn.created_at <= prev => turn.at(prev + Duration::microseconds(1)),
        _ => turn,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stamp_after_bumps_ties() {
        let base = Utc::now();
        let turn = Turn::user("x").at(base);
        let stamped = stamp_after(turn, Some(base));
        assert!(stamped.created_at > base);
        assert_eq!(stamped.created_at, base + Duration::microseconds(1));
    }

    #[test]
    fn stamp_after_keeps_later_clock() {
        let base = Utc::now();
        let later = base + Duration::seconds(5);
        let turn = Turn::user("x").at(later);
        let stamped = stamp_after(turn, Some(base));
        assert_eq!(stamped.created_at, later);
    }

    #[test]
    fn stamp_after_without_previous_is_identity() {
        let turn = Turn::user("x");
        let stamp = turn.created_at;
        assert_eq!(stamp_after(turn, None).created_at, stamp);
    }
}
