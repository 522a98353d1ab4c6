//! Document store trait — read-only access to named course material.
//!
//! A document store exposes the text extracted from bundled course files
//! plus one optional ordering manifest (the official module order). The
//! collection is immutable for the process lifetime and replaced wholesale
//! by an explicit `refresh()` — never partially mutated and never rescanned
//! implicitly per request.

use crate::error::DocumentError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A named unit of reference text, one per ingested course file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Unique name (filename within the course material set)
    pub name: String,

    /// Raw extracted text
    pub text: String,

    /// When the text was extracted/loaded
    pub extracted_at: DateTime<Utc>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
            extracted_at: Utc::now(),
        }
    }
}

/// Read-only access to named text blobs plus an optional ordering manifest.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The store name (e.g., "fs", "in_memory").
    fn name(&self) -> &str;

    /// List the names of all known documents, sorted lexicographically.
    ///
    /// The manifest is not included in the listing.
    async fn list(&self) -> std::result::Result<Vec<String>, DocumentError>;

    /// Read one document's text.
    ///
    /// Fails with `DocumentError::NotFound` if the document disappeared
    /// between `list` and `read`.
    async fn read(&self, name: &str) -> std::result::Result<String, DocumentError>;

    /// Read the ordering manifest, if one exists.
    async fn manifest(&self) -> std::result::Result<Option<String>, DocumentError>;

    /// Rescan the underlying source and replace the document set wholesale.
    ///
    /// Explicit and idempotent; returns the number of documents now known.
    async fn refresh(&self) -> std::result::Result<usize, DocumentError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_document_carries_extraction_time() {
        let doc = SourceDocument::new("week1.txt", "Module 1: Foundations");
        assert_eq!(doc.name, "week1.txt");
        assert!(doc.extracted_at <= Utc::now());
    }
}
