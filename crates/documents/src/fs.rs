//! Filesystem-backed document store.
//!
//! Serves a directory of pre-extracted course text (`.txt`/`.md` files)
//! plus an optional ordering manifest (`order.txt` by default). `refresh()`
//! rescans the directory and replaces the name snapshot wholesale; reads
//! hit the filesystem at call time, so a file removed between `list` and
//! `read` surfaces as `NotFound`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use studylab_core::document::DocumentStore;
use studylab_core::error::DocumentError;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// File extensions served as course material.
const TEXT_EXTENSIONS: [&str; 2] = ["txt", "md"];

/// A document store over a directory of extracted course text.
pub struct FsDocumentStore {
    dir: PathBuf,
    manifest_name: String,
    names: Arc<RwLock<Vec<String>>>,
}

impl FsDocumentStore {
    /// Open a store over `dir`, performing the initial scan.
    ///
    /// A missing directory is not fatal: the store starts empty (with a
    /// warning) and a later `refresh()` picks the material up once the
    /// directory exists.
    pub async fn open(
        dir: impl Into<PathBuf>,
        manifest_name: impl Into<String>,
    ) -> Result<Self, DocumentError> {
        let store = Self {
            dir: dir.into(),
            manifest_name: manifest_name.into(),
            names: Arc::new(RwLock::new(Vec::new())),
        };
        let count = store.refresh().await?;
        info!(dir = %store.dir.display(), documents = count, "Opened course material store");
        Ok(store)
    }

    fn path_for(&self, name: &str) -> Option<PathBuf> {
        // Names come from the scan; anything path-like is rejected outright.
        if name.is_empty() || name.contains(['/', '\\']) || name.contains("..") {
            return None;
        }
        Some(self.dir.join(name))
    }

    fn is_material(path: &Path, manifest_name: &str) -> bool {
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if file_name == manifest_name {
            return false;
        }
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
    }

    async fn scan(&self) -> Result<Vec<String>, DocumentError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!(dir = %self.dir.display(), "Course material directory does not exist; store is empty");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(DocumentError::ScanFailed(format!(
                    "{}: {e}",
                    self.dir.display()
                )));
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| DocumentError::ScanFailed(e.to_string()))?
        {
            let path = entry.path();
            if path.is_file() && Self::is_material(&path, &self.manifest_name) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }

        names.sort();
        Ok(names)
    }
}

#[async_trait]
impl DocumentStore for FsDocumentStore {
    fn name(&self) -> &str {
        "fs"
    }

    async fn list(&self) -> Result<Vec<String>, DocumentError> {
        Ok(self.names.read().await.clone())
    }

    async fn read(&self, name: &str) -> Result<String, DocumentError> {
        let path = self
            .path_for(name)
            .ok_or_else(|| DocumentError::NotFound(name.to_string()))?;

        match tokio::fs::read(&path).await {
            Ok(bytes) => String::from_utf8(bytes).map_err(|_| DocumentError::Unreadable {
                name: name.to_string(),
                reason: "invalid UTF-8".into(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DocumentError::NotFound(name.to_string()))
            }
            Err(e) => Err(DocumentError::Unreadable {
                name: name.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn manifest(&self) -> Result<Option<String>, DocumentError> {
        let path = self.dir.join(&self.manifest_name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let text = String::from_utf8(bytes).map_err(|_| DocumentError::Unreadable {
                    name: self.manifest_name.clone(),
                    reason: "invalid UTF-8".into(),
                })?;
                Ok(Some(text))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(DocumentError::Unreadable {
                name: self.manifest_name.clone(),
                reason: e.to_string(),
            }),
        }
    }

    async fn refresh(&self) -> Result<usize, DocumentError> {
        let scanned = self.scan().await?;
        let count = scanned.len();
        *self.names.write().await = scanned;
        debug!(dir = %self.dir.display(), documents = count, "Rescanned course material");
        Ok(count)
    }
}
