//! `studylab status` — Show system status.

use studylab_config::AppConfig;
use studylab_core::document::DocumentStore;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    println!("StudyLab Status");
    println!("===============");
    println!("  Config dir:      {}", AppConfig::config_dir().display());
    println!("  Provider:        {}", config.default_provider);
    println!("  Model:           {}", config.default_model);
    println!("  Temperature:     {}", config.default_temperature);
    println!("  API key:         {}", if config.has_api_key() { "configured" } else { "missing" });
    println!("  History:         {} ({})", config.history.backend, config.history.path);
    println!("  Recency window:  {} turns", config.history.recency_window);
    println!(
        "  Context budget:  {} chars total, {} per source",
        config.context.total_chars, config.context.per_source_chars
    );
    println!("  Course material: {}", config.documents.dir);

    match super::open_documents(&config).await {
        Ok(store) => {
            let names = store.list().await.unwrap_or_default();
            let manifest = store.manifest().await.ok().flatten();
            println!("  Documents:       {}", names.len());
            println!(
                "  Course order:    {}",
                if manifest.is_some() { "present" } else { "missing" }
            );
        }
        Err(e) => println!("  Documents:       unavailable ({e})"),
    }

    let config_path = AppConfig::config_dir().join("config.toml");
    if config_path.exists() {
        println!("\n  ✅ Config file found");
    } else {
        println!("\n  ⚠️  No config file — run `studylab onboard` first");
    }

    Ok(())
}
