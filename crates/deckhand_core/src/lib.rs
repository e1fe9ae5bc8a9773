//! Core data types for the Deckhand media upload pipeline.
//!
//! This crate provides the upload policy and the reference type shared by
//! every storage backend and caller.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod policy;
mod reference;

pub use policy::{
    BYTES_PER_MB, DEFAULT_ALLOWED_EXTENSIONS, DEFAULT_ALLOWED_MIME_PREFIXES, DEFAULT_MAX_SIZE_MB,
    UploadPolicy, UploadPolicyBuilder, normalize_extension,
};
pub use reference::StoredReference;
