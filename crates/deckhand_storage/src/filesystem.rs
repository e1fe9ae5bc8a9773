//! Filesystem-based staged upload storage.
//!
//! Each upload is copied to a freshly allocated file in the staging
//! directory, validated in place, and either kept (its path becomes the
//! stored reference) or removed before `save` returns.

use crate::validator;
use crate::MediaRepository;
use deckhand_core::{StoredReference, UploadPolicy};
use deckhand_error::{DeckhandResult, StorageError, StorageErrorKind};
use std::path::{Component, Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use uuid::Uuid;

/// Filesystem storage backend.
///
/// Staged files are named `{uuid}{ext}`:
///
/// ```text
/// /tmp/deckhand/
/// ├── 5f0c1d2e3a4b4c5d8e9f0a1b2c3d4e5f.pdf
/// └── 9a8b7c6d5e4f4a3b8c2d1e0f9a8b7c6d.txt
/// ```
///
/// The original stem never reaches the disk, so names cannot leak or collide.
/// Staged and committed locations are the same file; there is no separate
/// commit step.
pub struct LocalMediaStorage {
    staging_dir: PathBuf,
    policy: UploadPolicy,
}

impl LocalMediaStorage {
    /// Create a new filesystem storage backend.
    ///
    /// Creates the staging directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created.
    #[tracing::instrument(skip(staging_dir, policy))]
    pub fn new(staging_dir: impl Into<PathBuf>, policy: UploadPolicy) -> DeckhandResult<Self> {
        let staging_dir = staging_dir.into();

        std::fs::create_dir_all(&staging_dir).map_err(|e| {
            StorageError::io(format_args!("create {}", staging_dir.display()), &e)
        })?;

        tracing::info!(path = %staging_dir.display(), "Created filesystem storage");
        Ok(Self {
            staging_dir,
            policy,
        })
    }

    /// Directory holding staged and committed files.
    pub fn staging_dir(&self) -> &Path {
        &self.staging_dir
    }

    /// Policy applied to every save.
    pub fn policy(&self) -> &UploadPolicy {
        &self.policy
    }

    /// Check whether a stored file is still present.
    ///
    /// # Errors
    ///
    /// `InvalidReference` for references outside the staging directory, `Io`
    /// when the file cannot be inspected.
    #[tracing::instrument(skip(self), fields(backend = "filesystem"))]
    pub async fn exists(&self, reference: &StoredReference) -> DeckhandResult<bool> {
        let path = self.resolve(reference)?;
        tokio::fs::try_exists(&path)
            .await
            .map_err(|e| StorageError::io(format_args!("stat {}", path.display()), &e).into())
    }

    /// Pick a fresh location named after the extension only.
    fn allocate(&self, extension: &str) -> PathBuf {
        self.staging_dir
            .join(format!("{}{}", Uuid::new_v4().simple(), extension))
    }

    /// Map a reference back to a path inside the staging directory.
    fn resolve(&self, reference: &StoredReference) -> DeckhandResult<PathBuf> {
        let path = PathBuf::from(reference.as_str());
        let inside = path.parent() == Some(self.staging_dir.as_path())
            && path.file_name().is_some()
            && !path
                .components()
                .any(|component| matches!(component, Component::ParentDir));

        if !inside {
            return Err(StorageError::new(StorageErrorKind::InvalidReference(
                reference.to_string(),
            ))
            .into());
        }
        Ok(path)
    }

    /// Copy the stream into a new staged file.
    ///
    /// A failed copy removes the partial file before returning.
    async fn stage(
        &self,
        stream: &mut (dyn AsyncRead + Unpin + Send),
        extension: &str,
    ) -> DeckhandResult<(PathBuf, u64)> {
        let path = self.allocate(extension);

        let mut file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .map_err(|e| StorageError::io(format_args!("create {}", path.display()), &e))?;

        let copied = if *self.policy.enforce_size_while_streaming() {
            // One byte past the limit is enough for the size check to fail
            let limit = self.policy.max_size_bytes().saturating_add(1);
            let mut limited = (&mut *stream).take(limit);
            tokio::io::copy(&mut limited, &mut file).await
        } else {
            tokio::io::copy(stream, &mut file).await
        };

        let written = match copied {
            Ok(written) => file.flush().await.map(|()| written),
            Err(e) => Err(e),
        };
        drop(file);

        match written {
            Ok(written) => Ok((path, written)),
            Err(e) => {
                discard(&path).await;
                Err(StorageError::io(format_args!("write {}", path.display()), &e).into())
            }
        }
    }

    /// Content then size, in that order.
    async fn validate_staged(
        &self,
        path: &Path,
        extension: &str,
    ) -> DeckhandResult<(String, u64)> {
        let mime = validator::check_content_type(&self.policy, path, extension).await?;
        let size = validator::check_size(&self.policy, path).await?;
        Ok((mime, size))
    }
}

/// Remove a staged file, treating "already gone" as success.
async fn discard(path: &Path) {
    match tokio::fs::remove_file(path).await {
        Ok(()) => tracing::debug!(path = %path.display(), "Discarded staged file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::warn!(
            path = %path.display(),
            error = %e,
            "Failed to discard staged file"
        ),
    }
}

#[async_trait::async_trait]
impl MediaRepository for LocalMediaStorage {
    #[tracing::instrument(skip(self, stream), fields(backend = "filesystem"))]
    async fn save(
        &self,
        stream: &mut (dyn AsyncRead + Unpin + Send),
        filename: &str,
    ) -> DeckhandResult<StoredReference> {
        let extension = validator::check_extension(&self.policy, filename)?;

        let (path, written) = self.stage(stream, &extension).await?;
        tracing::debug!(path = %path.display(), written, "Staged upload");

        match self.validate_staged(&path, &extension).await {
            Ok((mime, size)) => {
                tracing::info!(
                    path = %path.display(),
                    size,
                    mime = %mime,
                    "Stored media file"
                );
                Ok(StoredReference::new(path.to_string_lossy().into_owned()))
            }
            Err(err) => {
                discard(&path).await;
                tracing::debug!(error = %err, "Rejected upload");
                Err(err)
            }
        }
    }

    #[tracing::instrument(skip(self), fields(backend = "filesystem"))]
    async fn delete(&self, reference: &StoredReference) -> DeckhandResult<()> {
        let path = self.resolve(reference)?;

        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::info!(path = %path.display(), "Deleted media file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "Media file already absent");
                Ok(())
            }
            Err(e) => Err(StorageError::io(format_args!("delete {}", path.display()), &e).into()),
        }
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}

impl std::fmt::Debug for LocalMediaStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalMediaStorage")
            .field("staging_dir", &self.staging_dir)
            .field("policy", &self.policy)
            .finish()
    }
}
