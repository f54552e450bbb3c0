//! CLI command definitions.

use cardsmith::{AnalyticsStream, TaskCategory};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Cardsmith - rate-governed flashcard and text generation with Gemini
#[derive(Parser, Debug)]
#[command(name = "cardsmith")]
#[command(about = "Rate-governed flashcard and text generation with Gemini", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file to use instead of the default search path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate flashcards for a topic
    Flashcards {
        /// Topic to cover
        #[arg(long)]
        topic: String,

        /// Gemini API key
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,

        /// Output format
        #[arg(long, default_value = "json")]
        format: OutputFormat,
    },

    /// Generate raw text for a task category
    Generate {
        /// Task category (quiz, flashcard, summary, test)
        #[arg(long)]
        task: TaskCategory,

        /// Prompt text
        #[arg(long)]
        prompt: String,

        /// Gemini API key
        #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Show the profile selected for a task name
    Profile {
        /// Task name; unknown names resolve to the default profile
        task: String,
    },

    /// Print events stored by the analytics service
    Analytics {
        /// Collection to fetch
        #[arg(value_enum)]
        stream: StreamArg,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable format
    Human,
    /// JSON format
    Json,
}

/// Analytics collections selectable on the command line
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum StreamArg {
    /// User activity
    Activity,
    /// Resource searches
    Searches,
    /// Saved learnings
    Learnings,
}

impl From<StreamArg> for AnalyticsStream {
    fn from(arg: StreamArg) -> Self {
        match arg {
            StreamArg::Activity => AnalyticsStream::Activity,
            StreamArg::Searches => AnalyticsStream::Searches,
            StreamArg::Learnings => AnalyticsStream::Learnings,
        }
    }
}
