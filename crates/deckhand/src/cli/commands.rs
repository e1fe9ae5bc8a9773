//! CLI command definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Deckhand - validated media uploads for flashcard decks
#[derive(Parser, Debug)]
#[command(name = "deckhand")]
#[command(about = "Validate and store media uploads, or delete stored uploads", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Configuration file layered over the bundled defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a local file and store it
    Save {
        /// File to upload
        path: PathBuf,

        /// Original filename to validate against (defaults to the file's name)
        #[arg(long)]
        name: Option<String>,
    },

    /// Delete a stored upload by reference
    Delete {
        /// Reference printed by `save`
        reference: String,
    },
}
