//! StudyLab CLI — the main entry point.
//!
//! Commands:
//! - `onboard`   — Initialize config & course material directory
//! - `chat`      — Interactive chat or single-message mode
//! - `documents` — List or rescan the course material
//! - `status`    — Show system status

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "studylab",
    about = "StudyLab — course chatbot engine",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize configuration and course material directory
    Onboard,

    /// Chat with the course bot
    Chat {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,

        /// Conversation ID to resume (a new one is generated otherwise)
        #[arg(short, long)]
        conversation: Option<String>,
    },

    /// Manage course material
    Documents {
        #[command(subcommand)]
        action: commands::documents::DocumentsAction,
    },

    /// Show system status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .init();

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Chat {
            message,
            conversation,
        } => commands::chat::run(message, conversation).await?,
        Commands::Documents { action } => commands::documents::run(action).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}
