//! `studylab chat` — Interactive or single-message chat mode.

use studylab_config::AppConfig;
use studylab_context::{ContextAssembler, ContextBudget};
use studylab_core::turn::ConversationId;
use studylab_engine::ChatEngine;

pub async fn run(
    message: Option<String>,
    conversation: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for an API key early — give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    export STUDYLAB_API_KEY=sk-...     (generic)");
        eprintln!("    export OPENAI_API_KEY=sk-...       (for OpenAI direct)");
        eprintln!("    export OPENROUTER_API_KEY=sk-or-...");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = studylab_providers::build_from_config(&config)?;
    let documents = super::open_documents(&config).await?;
    let history = super::open_history(&config).await?;

    let assembler = ContextAssembler::new(ContextBudget::new(
        config.context.total_chars,
        config.context.per_source_chars,
    ));

    let engine = ChatEngine::start(
        provider,
        documents,
        history,
        assembler,
        config.persona.to_persona(),
        &config.default_model,
    )
    .await?
    .with_temperature(config.default_temperature)
    .with_max_tokens(config.default_max_tokens)
    .with_recency_window(config.history.recency_window);

    let conversation = conversation
        .map(|id| ConversationId::from(&id))
        .unwrap_or_default();

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        match engine.chat(&conversation, &msg).await {
            Ok(reply) => {
                eprint!("\r              \r");
                println!("{}", reply.text);
            }
            Err(e) => {
                eprint!("\r              \r");
                return Err(format!("Chat turn failed: {e}").into());
            }
        }
        return Ok(());
    }

    // Interactive mode
    let stats = engine.context_stats().await;
    println!();
    println!("  StudyLab — Interactive Mode");
    println!("  ---------------------------");
    println!("  Provider:      {}", config.default_provider);
    println!("  Model:         {}", config.default_model);
    println!(
        "  Course docs:   {} loaded ({} chars of context)",
        stats.sources.len(),
        stats.total_chars
    );
    println!("  Conversation:  {conversation}");
    println!();
    println!("  Type your message and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let stdin = std::io::stdin();
    loop {
        print!("  You > ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "exit" || input == "quit" {
            break;
        }

        eprint!("  ...");
        match engine.chat(&conversation, input).await {
            Ok(reply) => {
                eprint!("\r     \r");
                println!();
                for line in reply.text.lines() {
                    println!("  StudyLab > {line}");
                }
                println!();
            }
            Err(e) => {
                eprint!("\r     \r");
                eprintln!("  [Error] {e}");
                println!();
            }
        }
    }

    Ok(())
}
