//! History store trait — per-conversation persisted turn sequences.
//!
//! History is owned externally to the engine: it is append-only, ordered
//! by insertion sequence, and read through an explicit recency window
//! (`recent(n)`) so the full history is never loaded into process memory
//! per request.

use crate::error::HistoryError;
use crate::turn::{ConversationId, Turn};
use async_trait::async_trait;

/// Append-only, windowed access to a conversation's turns.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "in_memory").
    fn name(&self) -> &str;

    /// Append one turn to a conversation.
    ///
    /// Turns are ordered by insertion sequence; concurrent appends to the
    /// same conversation interleave in arrival order.
    async fn append(
        &self,
        conversation: &ConversationId,
        turn: Turn,
    ) -> std::result::Result<(), HistoryError>;

    /// Return the last `n` turns of a conversation in chronological order
    /// (all of them when fewer than `n` exist).
    async fn recent(
        &self,
        conversation: &ConversationId,
        n: usize,
    ) -> std::result::Result<Vec<Turn>, HistoryError>;

    /// Total number of turns recorded for a conversation.
    async fn count(&self, conversation: &ConversationId) -> std::result::Result<usize, HistoryError>;
}
