//! Upload validation against an [`UploadPolicy`].
//!
//! Three independent checks run in a fixed order during a save:
//!
//! 1. [`check_extension`] on the original filename, before any byte is written
//! 2. [`check_content_type`] on the staged bytes (content sniffing, never the filename)
//! 3. [`check_size`] on the staged artifact
//!
//! The size check deletes the staged artifact itself when it fails. The other
//! two leave cleanup to the storage engine.
//!
//! The `*_bytes` variants run the same rules on in-memory data for backends
//! that never touch the filesystem.

use deckhand_core::{UploadPolicy, normalize_extension};
use deckhand_error::{DeckhandResult, StorageError, StorageErrorKind};
use std::ffi::OsStr;
use std::path::Path;
use tokio::io::AsyncReadExt;

/// Number of leading bytes inspected when sniffing content.
pub const SNIFF_SAMPLE_LEN: usize = 8192;

/// MIME type assigned to content that no signature matches but reads as text.
pub const PLAIN_TEXT_MIME: &str = "text/plain";

/// Extract the normalized extension of a filename (`""` when there is none).
///
/// Only the last component is considered, so `"archive.tar.GZ"` yields `".gz"`
/// and dotfiles such as `".bashrc"` have no extension.
pub fn filename_extension(filename: &str) -> String {
    Path::new(filename)
        .extension()
        .and_then(OsStr::to_str)
        .map(normalize_extension)
        .unwrap_or_default()
}

/// Reject filenames whose extension is not allowed.
///
/// Returns the normalized extension on success so the caller can name the
/// staged artifact after it.
#[tracing::instrument(skip(policy))]
pub fn check_extension(policy: &UploadPolicy, filename: &str) -> DeckhandResult<String> {
    let extension = filename_extension(filename);
    if !policy.allows_extension(&extension) {
        tracing::debug!(extension = %extension, "Rejected filename extension");
        return Err(StorageError::new(StorageErrorKind::UnsupportedType(extension)).into());
    }
    Ok(extension)
}

/// Infer a MIME type from leading content bytes.
///
/// Signature matching is delegated to `infer`. Samples it does not recognise
/// are classified as `text/plain` when they look like text, otherwise `None`.
pub fn sniff_mime(sample: &[u8]) -> Option<String> {
    infer::get(sample)
        .map(|kind| kind.mime_type().to_string())
        .or_else(|| looks_like_text(sample).then(|| PLAIN_TEXT_MIME.to_string()))
}

/// Whether a sample is non-empty UTF-8 without binary control bytes.
///
/// A multi-byte character cut off at the end of the sample is tolerated,
/// since samples are truncated at [`SNIFF_SAMPLE_LEN`].
pub fn looks_like_text(sample: &[u8]) -> bool {
    if sample.is_empty() {
        return false;
    }

    let text = match std::str::from_utf8(sample) {
        Ok(text) => text,
        Err(err) if err.error_len().is_none() => {
            match std::str::from_utf8(&sample[..err.valid_up_to()]) {
                Ok(text) => text,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };

    text.chars()
        .all(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r' | '\x0c'))
}

/// Run the content rules on an in-memory sample.
///
/// The sniffed type must start with an allowed prefix and, when the policy
/// lists expectations for `extension`, be one of them.
pub fn check_content_bytes(
    policy: &UploadPolicy,
    extension: &str,
    sample: &[u8],
) -> DeckhandResult<String> {
    let Some(mime) = sniff_mime(sample) else {
        tracing::debug!(extension, "Content type could not be determined");
        return Err(StorageError::new(StorageErrorKind::DisallowedContent(
            "unrecognized content".to_string(),
        ))
        .into());
    };

    if !policy.allows_mime(&mime) || !policy.mime_matches_extension(extension, &mime) {
        tracing::debug!(extension, mime = %mime, "Rejected sniffed content type");
        return Err(StorageError::new(StorageErrorKind::DisallowedContent(mime)).into());
    }

    Ok(mime)
}

/// Sniff the staged artifact at `path` and apply the content rules.
///
/// Returns the sniffed MIME type. Does not remove the artifact on failure.
#[tracing::instrument(skip(policy, path), fields(path = %path.display()))]
pub async fn check_content_type(
    policy: &UploadPolicy,
    path: &Path,
    extension: &str,
) -> DeckhandResult<String> {
    let file = tokio::fs::File::open(path)
        .await
        .map_err(|e| StorageError::io(format_args!("open {}", path.display()), &e))?;

    let mut sample = Vec::with_capacity(SNIFF_SAMPLE_LEN);
    file.take(SNIFF_SAMPLE_LEN as u64)
        .read_to_end(&mut sample)
        .await
        .map_err(|e| StorageError::io(format_args!("read {}", path.display()), &e))?;

    check_content_bytes(policy, extension, &sample)
}

/// Compare a byte length against the policy maximum.
pub fn check_size_bytes(policy: &UploadPolicy, size: u64) -> DeckhandResult<u64> {
    let max = *policy.max_size_bytes();
    if size > max {
        return Err(StorageError::new(StorageErrorKind::TooLarge { size, max }).into());
    }
    Ok(size)
}

/// Check the staged artifact's length, deleting it if it is too large.
///
/// Returns the length in bytes.
#[tracing::instrument(skip(policy, path), fields(path = %path.display()))]
pub async fn check_size(policy: &UploadPolicy, path: &Path) -> DeckhandResult<u64> {
    let size = tokio::fs::metadata(path)
        .await
        .map_err(|e| StorageError::io(format_args!("stat {}", path.display()), &e))?
        .len();

    let result = check_size_bytes(policy, size);
    if result.is_err() {
        match tokio::fs::remove_file(path).await {
            Ok(()) => tracing::debug!(size, "Removed oversized staged file"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(error = %e, "Failed to remove oversized staged file"),
        }
    }
    result
}
