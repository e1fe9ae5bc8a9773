//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the deckhand binary.

mod commands;
mod media;

pub use commands::{Cli, Commands};
pub use media::{delete_reference, save_file};
