//! Error types for the StudyLab domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all StudyLab operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Provider errors ---
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    // --- Document store errors ---
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    // --- History store errors ---
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    // --- Context assembly errors ---
    #[error("Context error: {0}")]
    Context(#[from] ContextError),

    // --- Configuration errors ---
    #[error("Configuration error: {message}")]
    Config { message: String },

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures from the model provider (the external completion API).
///
/// These are never recovered locally and never silently retried — they
/// surface to the caller with enough detail to decide on a retry.
#[derive(Debug, Clone, Error)]
pub enum ProviderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Invalid request rejected by provider: {0}")]
    InvalidRequest(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Network error: {0}")]
    Network(String),
}

/// Failures from the document store.
///
/// An unreadable source is skipped (with a warning) during context
/// assembly; it never aborts assembly of the remaining sources.
#[derive(Debug, Clone, Error)]
pub enum DocumentError {
    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Document unreadable: {name} — {reason}")]
    Unreadable { name: String, reason: String },

    #[error("Document scan failed: {0}")]
    ScanFailed(String),
}

/// Failures from the history store.
///
/// A retrieval failure degrades the turn to persona + context + utterance
/// rather than failing it.
#[derive(Debug, Clone, Error)]
pub enum HistoryError {
    #[error("History store unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}

/// Failures from context assembly.
#[derive(Debug, Clone, Error)]
pub enum ContextError {
    /// The assembled context exceeded its budget. Structurally impossible
    /// given correct truncation; treated as an internal invariant violation
    /// and failed loudly rather than sending an oversized request.
    #[error("Assembled context ({actual} chars) exceeds budget ({budget} chars)")]
    BudgetExceeded { actual: usize, budget: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_displays_correctly() {
        let err = Error::Provider(ProviderError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn document_error_displays_correctly() {
        let err = Error::Document(DocumentError::Unreadable {
            name: "week1.txt".into(),
            reason: "invalid UTF-8".into(),
        });
        assert!(err.to_string().contains("week1.txt"));
        assert!(err.to_string().contains("invalid UTF-8"));
    }

    #[test]
    fn budget_exceeded_names_both_sizes() {
        let err = ContextError::BudgetExceeded {
            actual: 1600,
            budget: 1500,
        };
        assert!(err.to_string().contains("1600"));
        assert!(err.to_string().contains("1500"));
    }
}
