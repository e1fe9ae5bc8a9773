//! Validated media upload storage for Deckhand.
//!
//! This crate provides the upload pipeline that sits behind the
//! [`MediaRepository`] port: extension check, staged write, content sniffing
//! and size check, then commit or cleanup.
//!
//! # Features
//!
//! - **Fail fast**: the filename extension is checked before any byte is written
//! - **Content sniffing**: the staged bytes decide the MIME type, not the filename
//! - **Self-cleaning**: a rejected upload never leaves an artifact behind
//! - **Idempotent delete**: deleting a missing artifact succeeds
//!
//! # Example
//!
//! ```rust
//! use deckhand_core::UploadPolicy;
//! use deckhand_storage::{LocalMediaStorage, MediaRepository};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = LocalMediaStorage::new("/tmp/deckhand", UploadPolicy::default())?;
//!
//! // Store an upload
//! let mut body: &[u8] = b"Q: capital of France?\nA: Paris\n";
//! let reference = storage.save(&mut body, "geography.txt").await?;
//!
//! // Remove it again; a second delete is a no-op
//! storage.delete(&reference).await?;
//! storage.delete(&reference).await?;
//! # Ok(())
//! # }
//! ```

mod filesystem;
mod memory;
mod storage;
pub mod validator;

pub use deckhand_error::{StorageError, StorageErrorKind};
pub use filesystem::LocalMediaStorage;
pub use memory::InMemoryMediaStorage;
pub use storage::MediaRepository;
