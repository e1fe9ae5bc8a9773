//! Deckhand - validated media uploads for flashcard decks
//!
//! Deckhand accepts user-uploaded files, checks them against an upload
//! policy and stores the survivors. A rejected upload never leaves an
//! artifact behind.
//!
//! # Pipeline
//!
//! 1. The filename extension is checked before anything is written
//! 2. The stream is staged under a fresh, collision-free name
//! 3. The staged bytes are sniffed and must fall in an allowed MIME category
//! 4. The staged size must not exceed the policy maximum
//! 5. The staged artifact is kept, or deleted on any failure
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use deckhand::{DeckhandConfig, SaveMedia};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = DeckhandConfig::load()?;
//! let save = SaveMedia::new(Arc::new(config.open_local_storage()?));
//!
//! let mut body: &[u8] = b"Q: 2 + 2?\nA: 4\n";
//! let reference = save.execute(&mut body, "arithmetic.txt").await?;
//! println!("stored at {}", reference);
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! Deckhand is organized as a workspace with focused crates:
//!
//! - `deckhand_error` - Error types
//! - `deckhand_core` - Upload policy and stored references
//! - `deckhand_storage` - The repository port and its backends
//!
//! This crate (`deckhand`) adds configuration, logging and the use cases, and
//! re-exports everything for convenience.

mod config;
mod media;
mod observability;

pub use config::{DeckhandConfig, StorageConfig};
pub use media::{DeleteMedia, SaveMedia};
pub use observability::{LoggingConfig, init_logging_with_config};

// Re-export workspace crates
pub use deckhand_core::*;
pub use deckhand_error::*;
pub use deckhand_storage::{InMemoryMediaStorage, LocalMediaStorage, MediaRepository, validator};
