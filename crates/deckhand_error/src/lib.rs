//! Error types for the Deckhand media upload pipeline.
//!
//! This crate provides the foundation error types used throughout the Deckhand workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern for clean error handling:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All errors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use deckhand_error::{DeckhandResult, StorageError, StorageErrorKind};
//!
//! fn save() -> DeckhandResult<String> {
//!     Err(StorageError::new(StorageErrorKind::UnsupportedType(".exe".to_string())))?
//! }
//!
//! match save() {
//!     Ok(reference) => println!("Stored at: {}", reference),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod storage;

pub use config::ConfigError;
pub use error::{DeckhandError, DeckhandErrorKind, DeckhandResult};
pub use storage::{Remediation, StorageError, StorageErrorKind};
