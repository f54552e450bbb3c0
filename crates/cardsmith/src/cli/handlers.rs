//! Command handlers.

use super::OutputFormat;
use cardsmith::{
    AnalyticsClient, AnalyticsStream, CardsmithConfig, CardsmithResult, Flashcard,
    FlashcardGenerator, JsonError, TaskCategory,
};
use std::path::Path;
use tracing::{debug, info};

/// Load configuration from an explicit file, or from the default search path.
pub fn load_config(path: Option<&Path>) -> CardsmithResult<CardsmithConfig> {
    match path {
        Some(path) => CardsmithConfig::from_file(path),
        None => CardsmithConfig::load(),
    }
}

/// Generate flashcards for `topic` and print them.
pub async fn run_flashcards(
    config: &CardsmithConfig,
    topic: &str,
    api_key: &str,
    format: OutputFormat,
) -> CardsmithResult<()> {
    info!(topic, "Generating flashcards");
    let generator = FlashcardGenerator::from_config(config)?;
    let cards = generator.generate(topic, api_key).await?;

    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&cards)
                .map_err(|e| JsonError::new(format!("Failed to serialize flashcards: {}", e)))?;
            println!("{}", json);
        }
        OutputFormat::Human => print_cards(&cards),
    }
    Ok(())
}

fn print_cards(cards: &[Flashcard]) {
    for card in cards {
        println!("[{}] {} ({})", card.id, card.front, card.difficulty);
        for line in card.back.lines() {
            println!("    {}", line);
        }
        println!();
    }
}

/// Generate raw text for a task category and print it.
pub async fn run_generate(
    config: &CardsmithConfig,
    task: TaskCategory,
    prompt: &str,
    api_key: &str,
) -> CardsmithResult<()> {
    info!(%task, "Generating text");
    let generator = FlashcardGenerator::from_config(config)?;
    let text = generator.generate_text(task, prompt, api_key).await?;
    println!("{}", text);
    Ok(())
}

/// Print the profile selected for a task name.
pub fn run_profile(config: &CardsmithConfig, task: &str) {
    let profile = config.profiles.select_by_name(task);
    println!("{}", profile);
}

/// Fetch and print one analytics collection.
pub async fn run_analytics(config: &CardsmithConfig, stream: AnalyticsStream) -> CardsmithResult<()> {
    let client = AnalyticsClient::new(&config.analytics);
    if !client.is_enabled() {
        debug!("Analytics disabled in configuration");
    }

    let events = match stream {
        AnalyticsStream::Activity => client.activity().await?,
        AnalyticsStream::Searches => client.searches().await?,
        AnalyticsStream::Learnings => client.learnings().await?,
    };

    let json = serde_json::to_string_pretty(&events)
        .map_err(|e| JsonError::new(format!("Failed to serialize {}: {}", stream, e)))?;
    println!("{}", json);
    Ok(())
}
