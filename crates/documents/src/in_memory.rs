//! In-memory document store — useful for testing and embedding.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use studylab_core::document::DocumentStore;
use studylab_core::error::DocumentError;
use tokio::sync::RwLock;

/// A document store holding its material in a sorted map.
pub struct InMemoryDocumentStore {
    documents: Arc<RwLock<BTreeMap<String, String>>>,
    manifest: Arc<RwLock<Option<String>>>,
}

impl InMemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(BTreeMap::new())),
            manifest: Arc::new(RwLock::new(None)),
        }
    }

    /// Builder-style document insertion.
    pub async fn with_document(self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.documents.write().await.insert(name.into(), text.into());
        self
    }

    /// Builder-style manifest assignment.
    pub async fn with_manifest(self, text: impl Into<String>) -> Self {
        *self.manifest.write().await = Some(text.into());
        self
    }

    /// Insert or replace a document through a shared handle.
    pub async fn insert(&self, name: impl Into<String>, text: impl Into<String>) {
        self.documents.write().await.insert(name.into(), text.into());
    }

    /// Set or replace the manifest through a shared handle.
    pub async fn set_manifest(&self, text: impl Into<String>) {
        *self.manifest.write().await = Some(text.into());
    }

    /// Remove a document (simulates deletion between `list` and `read`).
    pub async fn remove(&self, name: &str) -> bool {
        self.documents.write().await.remove(name).is_some()
    }
}

impl Default for InMemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    fn name(&self) -> &str {
        "in_memory"
    }

    async fn list(&self) -> Result<Vec<String>, DocumentError> {
        Ok(self.documents.read().await.keys().cloned().collect())
    }

    async fn read(&self, name: &str) -> Result<String, DocumentError> {
        self.documents
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| DocumentError::NotFound(name.to_string()))
    }

    async fn manifest(&self) -> Result<Option<String>, DocumentError> {
        Ok(self.manifest.read().await.clone())
    }

    async fn refresh(&self) -> Result<usize, DocumentError> {
        Ok(self.documents.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn list_is_sorted() {
        let store = InMemoryDocumentStore::new()
            .with_document("b.txt", "beta")
            .await
            .with_document("a.txt", "alpha")
            .await;
        assert_eq!(store.list().await.unwrap(), vec!["a.txt", "b.txt"]);
    }

    #[tokio::test]
    async fn read_missing_is_not_found() {
        let store = InMemoryDocumentStore::new();
        assert!(matches!(
            store.read("ghost.txt").await.unwrap_err(),
            DocumentError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn remove_simulates_racing_delete() {
        let store = InMemoryDocumentStore::new()
            .with_document("a.txt", "alpha")
            .await;
        let names = store.list().await.unwrap();
        assert!(store.remove(&names[0]).await);
        assert!(store.read(&names[0]).await.is_err());
    }

    #[tokio::test]
    async fn manifest_roundtrip() {
        let store = InMemoryDocumentStore::new().with_manifest("1. a\n2. b").await;
        assert_eq!(store.manifest().await.unwrap().as_deref(), Some("1. a\n2. b"));
    }
}
