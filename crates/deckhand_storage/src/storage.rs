//! Repository port for media uploads.

use deckhand_core::StoredReference;
use deckhand_error::DeckhandResult;
use tokio::io::AsyncRead;

/// Trait for pluggable media storage backends.
///
/// Callers depend on this trait only, so a local-disk engine, an object store
/// or an in-memory double can be swapped without touching them. Every
/// implementation must:
///
/// - check the filename extension before writing any byte
/// - leave no artifact behind when an upload is rejected
/// - treat deleting an absent artifact as success
#[async_trait::async_trait]
pub trait MediaRepository: Send + Sync {
    /// Validate and persist a byte stream, returning a reference to it.
    ///
    /// # Arguments
    ///
    /// * `stream` - The upload body; read to the end (or to the size cap)
    /// * `filename` - The caller's original filename, used for the extension only
    ///
    /// # Errors
    ///
    /// `UnsupportedType`, `DisallowedContent` or `TooLarge` when policy rejects
    /// the upload, `Io` when the backend fails.
    async fn save(
        &self,
        stream: &mut (dyn AsyncRead + Unpin + Send),
        filename: &str,
    ) -> DeckhandResult<StoredReference>;

    /// Delete a stored artifact.
    ///
    /// Succeeds without doing anything if the artifact is already gone.
    ///
    /// # Errors
    ///
    /// `Io` when the backend fails to remove an existing artifact. Backends
    /// that can tell a foreign reference from a deleted one may also return
    /// `InvalidReference`, which carries `Remediation::FixReference`:
    /// `LocalMediaStorage` refuses paths outside its staging directory,
    /// while `InMemoryMediaStorage` treats any unknown reference as already
    /// deleted.
    async fn delete(&self, reference: &StoredReference) -> DeckhandResult<()>;

    /// Backend name (e.g., "filesystem", "memory").
    ///
    /// Used in log fields only. Defaults to the implementing type's name.
    fn backend_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
