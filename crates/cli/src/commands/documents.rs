//! `studylab documents` — List or rescan the course material.

use clap::Subcommand;
use studylab_config::AppConfig;

#[derive(Subcommand)]
pub enum DocumentsAction {
    /// List known course documents
    List,

    /// Rescan the course material directory
    Refresh,
}

pub async fn run(action: DocumentsAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let store = super::open_documents(&config).await?;

    match action {
        DocumentsAction::List => {
            use studylab_core::document::DocumentStore;

            let names = store.list().await?;
            if names.is_empty() {
                println!(
                    "No course documents in {}",
                    config.documents.resolved_dir().display()
                );
                return Ok(());
            }

            println!("Course documents:");
            for name in &names {
                match store.read(name).await {
                    Ok(text) => println!("  {name}  ({} chars)", text.chars().count()),
                    Err(e) => println!("  {name}  (unreadable: {e})"),
                }
            }

            match store.manifest().await? {
                Some(_) => println!("\nCourse order manifest: {}", config.documents.manifest),
                None => println!("\nNo course order manifest ({})", config.documents.manifest),
            }
        }
        DocumentsAction::Refresh => {
            use studylab_core::document::DocumentStore;

            let count = store.refresh().await?;
            println!("Rescanned {} — {count} documents", config.documents.dir);
        }
    }

    Ok(())
}
