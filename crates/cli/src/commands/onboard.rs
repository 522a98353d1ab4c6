//! `studylab onboard` — First-time setup.

use studylab_config::AppConfig;

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config_dir = AppConfig::config_dir();
    let config_path = config_dir.join("config.toml");

    println!("StudyLab — First-Time Setup");
    println!("===========================\n");

    if !config_dir.exists() {
        std::fs::create_dir_all(&config_dir)?;
        println!("✅ Created config directory: {}", config_dir.display());
    } else {
        println!("  Config directory exists: {}", config_dir.display());
    }

    if !config_path.exists() {
        std::fs::write(&config_path, AppConfig::default_toml())?;
        println!("✅ Created config file: {}", config_path.display());
    } else {
        println!("  Config file exists: {}", config_path.display());
    }

    let config = AppConfig::load()?;
    let courses_dir = config.documents.resolved_dir();
    if !courses_dir.exists() {
        std::fs::create_dir_all(&courses_dir)?;
        println!("✅ Created course material directory: {}", courses_dir.display());
    }

    let order_path = courses_dir.join(&config.documents.manifest);
    if !order_path.exists() {
        std::fs::write(
            &order_path,
            concat!(
                "1. Digital Money Lab\n",
                "2. Dropshipping Mastery\n",
                "3. AI Business\n",
            ),
        )?;
        println!("✅ Created sample course order: {}", order_path.display());
    }

    println!();
    println!("Next steps:");
    println!("  1. Drop extracted course text (.txt/.md) into {}", courses_dir.display());
    println!("  2. Set an API key: export STUDYLAB_API_KEY=sk-...");
    println!("  3. Run: studylab chat -m \"Where do I start?\"");

    Ok(())
}
