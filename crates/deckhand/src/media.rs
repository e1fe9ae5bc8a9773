//! Media use cases.
//!
//! Thin orchestration over a [`MediaRepository`]. These add no validation or
//! failure modes of their own; everything surfaces from the repository.

use deckhand_core::StoredReference;
use deckhand_error::DeckhandResult;
use deckhand_storage::MediaRepository;
use std::sync::Arc;
use tokio::io::AsyncRead;
use tracing::instrument;

/// Store an uploaded file.
#[derive(Clone)]
pub struct SaveMedia {
    repository: Arc<dyn MediaRepository>,
}

impl SaveMedia {
    /// Create the use case over a repository.
    pub fn new(repository: Arc<dyn MediaRepository>) -> Self {
        Self { repository }
    }

    /// Save `stream` under the policy of the underlying repository.
    #[instrument(skip(self, stream), fields(backend = self.repository.backend_name()))]
    pub async fn execute(
        &self,
        stream: &mut (dyn AsyncRead + Unpin + Send),
        filename: &str,
    ) -> DeckhandResult<StoredReference> {
        self.repository.save(stream, filename).await
    }
}

impl std::fmt::Debug for SaveMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SaveMedia")
            .field("backend", &self.repository.backend_name())
            .finish()
    }
}

/// Delete a previously stored file.
#[derive(Clone)]
pub struct DeleteMedia {
    repository: Arc<dyn MediaRepository>,
}

impl DeleteMedia {
    /// Create the use case over a repository.
    pub fn new(repository: Arc<dyn MediaRepository>) -> Self {
        Self { repository }
    }

    /// Delete the artifact behind `reference`. Absent artifacts are not an error.
    #[instrument(skip(self), fields(backend = self.repository.backend_name()))]
    pub async fn execute(&self, reference: &StoredReference) -> DeckhandResult<()> {
        self.repository.delete(reference).await
    }
}

impl std::fmt::Debug for DeleteMedia {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeleteMedia")
            .field("backend", &self.repository.backend_name())
            .finish()
    }
}
