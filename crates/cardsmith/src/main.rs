//! Cardsmith CLI binary.
//!
//! This binary provides command-line access to Cardsmith's functionality:
//! - Generate flashcards for a topic
//! - Generate raw text for a task category
//! - Inspect profile selection and stored analytics

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cardsmith::{LoggingConfig, init_logging};
    use cli::{
        Cli, Commands, load_config, run_analytics, run_flashcards, run_generate, run_profile,
    };

    // Load .env before clap reads GEMINI_API_KEY
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    init_logging(&LoggingConfig::new(cli.verbose))?;

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Flashcards {
            topic,
            api_key,
            format,
        } => {
            run_flashcards(&config, &topic, api_key.as_deref().unwrap_or_default(), format)
                .await?;
        }

        Commands::Generate {
            task,
            prompt,
            api_key,
        } => {
            run_generate(&config, task, &prompt, api_key.as_deref().unwrap_or_default()).await?;
        }

        Commands::Profile { task } => {
            run_profile(&config, &task);
        }

        Commands::Analytics { stream } => {
            run_analytics(&config, stream.into()).await?;
        }
    }

    Ok(())
}
