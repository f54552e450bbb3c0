//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the cardsmith binary.

mod commands;
mod handlers;

pub use commands::{Cli, Commands, OutputFormat};
pub use handlers::{load_config, run_analytics, run_flashcards, run_generate, run_profile};
