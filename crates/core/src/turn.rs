//! Turn and conversation domain types.
//!
//! These are the core value objects that flow through the entire system:
//! a user sends an utterance → the engine assembles a request → the provider
//! generates a reply → both ends of the exchange are persisted as Turns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a conversation (one user/session thread).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConversationId(pub String);

impl ConversationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl Default for ConversationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The role of a turn's author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions (persona, course context)
    System,
    /// The end user
    User,
    /// The model's reply
    Assistant,
}

/// One message in a conversation.
///
/// Immutable once created; ordered by creation sequence. The creation
/// timestamp of each appended turn is strictly greater than the previous
/// maximum for its conversation (enforced by the engine when recording
/// an exchange).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// Unique turn ID
    pub id: String,

    /// Who authored this turn
    pub role: Role,

    /// The text content
    pub content: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Create a new system turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a new user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create a new assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Return a copy of this turn stamped at the given time.
    pub fn at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_user_turn() {
        let turn = Turn::user("What comes after Digital Money Lab?");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content, "What comes after Digital Money Lab?");
        assert!(!turn.id.is_empty());
    }

    #[test]
    fn turn_serialization_roundtrip() {
        let turn = Turn::assistant("Module 3 is next.");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"assistant\""));
        let parsed: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.content, "Module 3 is next.");
        assert_eq!(parsed.role, Role::Assistant);
    }

    #[test]
    fn at_overrides_timestamp() {
        let stamp = Utc::now() + chrono::Duration::seconds(30);
        let turn = Turn::user("hi").at(stamp);
        assert_eq!(turn.created_at, stamp);
    }

    #[test]
    fn conversation_id_display() {
        let id = ConversationId::from("student-42");
        assert_eq!(id.to_string(), "student-42");
    }
}
