//! CLI subcommand implementations.

pub mod chat;
pub mod documents;
pub mod onboard;
pub mod status;

use std::sync::Arc;
use studylab_config::AppConfig;
use studylab_core::document::DocumentStore;
use studylab_core::history::HistoryStore;
use studylab_documents::FsDocumentStore;
use studylab_history::{InMemoryHistory, SqliteHistory};

/// Open the configured document store.
pub(crate) async fn open_documents(
    config: &AppConfig,
) -> Result<Arc<dyn DocumentStore>, Box<dyn std::error::Error>> {
    let store = FsDocumentStore::open(
        config.documents.resolved_dir(),
        config.documents.manifest.clone(),
    )
    .await?;
    Ok(Arc::new(store))
}

/// Open the configured history store.
pub(crate) async fn open_history(
    config: &AppConfig,
) -> Result<Arc<dyn HistoryStore>, Box<dyn std::error::Error>> {
    match config.history.backend.as_str() {
        "memory" => Ok(Arc::new(InMemoryHistory::new())),
        _ => {
            let path = config.history.resolved_path();
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let store = SqliteHistory::new(&path.to_string_lossy()).await?;
            Ok(Arc::new(store))
        }
    }
}
