//! In-memory history backend — useful for testing and ephemeral sessions.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use studylab_core::error::HistoryError;
use studylab_core::history::HistoryStore;
use studylab_core::turn::{ConversationId, Turn};
use tokio::sync::RwLock;

/// A history backend that keeps turns in per-conversation vectors.
pub struct InMemoryHistory {
    conversations: Arc<RwLock<HashMap<ConversationId, Vec<Turn>>>>,
    fail: Arc<RwLock<bool>>,
}

impl InMemoryHistory {
    pub fn new() -> Self {
        Self {
            conversations: Arc::new(RwLock::new(HashMap::new())),
            fail: Arc::new(RwLock::new(false)),
        }
    }

    /// Make every subsequent call fail with `Unavailable` (for testing the
    /// engine's degraded path).
    pub async fn set_unavailable(&self, unavailable: bool) {
        *self.fail.write().await = unavailable;
    }

    async fn check_available(&self) -> Result<(), HistoryError> {
        if *self.fail.read().await {
            Err(HistoryError::Unavailable("history store offline".into()))
        } else {
            Ok(())
        }
    }
}

impl Default for InMemoryHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for InMemoryHistory {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn append(&self, conversation: &ConversationId, turn: Turn) -> Result<(), HistoryError> {
        self.check_available().await?;
        self.conversations
            .write()
            .await
            .entry(conversation.clone())
            .or_default()
            .push(turn);
        Ok(())
    }

    async fn recent(
        &self,
        conversation: &ConversationId,
        n: usize,
    ) -> Result<Vec<Turn>, HistoryError> {
        self.check_available().await?;
        let conversations = self.conversations.read().await;
        let turns = match conversations.get(conversation) {
            Some(turns) => turns,
            None => return Ok(Vec::new()),
        };
        let start = turns.len().saturating_sub(n);
        Ok(turns[start..].to_vec())
    }

    async fn count(&self, conversation: &ConversationId) -> Result<usize, HistoryError> {
        self.check_available().await?;
        Ok(self
            .conversations
            .read()
            .await
            .get(conversation)
            .map(Vec::len)
            .unwrap_or(0))
    }
}
