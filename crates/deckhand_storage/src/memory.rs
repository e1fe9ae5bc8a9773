//! In-memory media storage.
//!
//! Applies the same policy, in the same order, as [`LocalMediaStorage`](crate::LocalMediaStorage)
//! but keeps artifacts in a map. Intended for tests and for wiring use cases
//! without a disk.

use crate::validator;
use crate::MediaRepository;
use deckhand_core::{StoredReference, UploadPolicy};
use deckhand_error::{DeckhandResult, StorageError};
use std::collections::HashMap;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::Mutex;
use uuid::Uuid;

const SCHEME: &str = "memory://";

/// In-memory storage backend.
#[derive(Debug, Default)]
pub struct InMemoryMediaStorage {
    policy: UploadPolicy,
    artifacts: Mutex<HashMap<StoredReference, Vec<u8>>>,
}

impl InMemoryMediaStorage {
    /// Create an empty store enforcing `policy`.
    pub fn new(policy: UploadPolicy) -> Self {
        Self {
            policy,
            artifacts: Mutex::new(HashMap::new()),
        }
    }

    /// Number of stored artifacts.
    pub async fn len(&self) -> usize {
        self.artifacts.lock().await.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.artifacts.lock().await.is_empty()
    }

    /// Whether an artifact is stored under `reference`.
    pub async fn exists(&self, reference: &StoredReference) -> DeckhandResult<bool> {
        Ok(self.artifacts.lock().await.contains_key(reference))
    }

    /// Copy of a stored artifact's bytes.
    pub async fn get(&self, reference: &StoredReference) -> Option<Vec<u8>> {
        self.artifacts.lock().await.get(reference).cloned()
    }
}

#[async_trait::async_trait]
impl MediaRepository for InMemoryMediaStorage {
    #[tracing::instrument(skip(self, stream), fields(backend = "memory"))]
    async fn save(
        &self,
        stream: &mut (dyn AsyncRead + Unpin + Send),
        filename: &str,
    ) -> DeckhandResult<StoredReference> {
        let extension = validator::check_extension(&self.policy, filename)?;

        let mut data = Vec::new();
        let read = if *self.policy.enforce_size_while_streaming() {
            let limit = self.policy.max_size_bytes().saturating_add(1);
            (&mut *stream).take(limit).read_to_end(&mut data).await
        } else {
            stream.read_to_end(&mut data).await
        };
        read.map_err(|e| StorageError::io("read upload stream", &e))?;

        let sample = &data[..data.len().min(validator::SNIFF_SAMPLE_LEN)];
        let mime = validator::check_content_bytes(&self.policy, &extension, sample)?;
        let size = validator::check_size_bytes(&self.policy, data.len() as u64)?;

        let reference = StoredReference::new(format!(
            "{}{}{}",
            SCHEME,
            Uuid::new_v4().simple(),
            extension
        ));
        self.artifacts.lock().await.insert(reference.clone(), data);

        tracing::info!(reference = %reference, size, mime = %mime, "Stored media in memory");
        Ok(reference)
    }

    #[tracing::instrument(skip(self), fields(backend = "memory"))]
    async fn delete(&self, reference: &StoredReference) -> DeckhandResult<()> {
        if self.artifacts.lock().await.remove(reference).is_some() {
            tracing::info!(reference = %reference, "Deleted media from memory");
        }
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
