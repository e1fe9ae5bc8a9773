//! Top-level error wrapper types.

use crate::{ConfigError, StorageError, StorageErrorKind};

/// Every error the Deckhand workspace can surface.
///
/// # Examples
///
/// ```
/// use deckhand_error::{DeckhandError, StorageError, StorageErrorKind};
///
/// let storage_err = StorageError::new(StorageErrorKind::Io("disk full".to_string()));
/// let err: DeckhandError = storage_err.into();
/// assert!(format!("{}", err).contains("Storage Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum DeckhandErrorKind {
    /// Upload validation or storage backend error
    #[from(StorageError)]
    Storage(StorageError),
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
}

/// Deckhand error with kind discrimination.
///
/// # Examples
///
/// ```
/// use deckhand_error::{DeckhandErrorKind, DeckhandResult, StorageError, StorageErrorKind};
///
/// fn might_fail() -> DeckhandResult<()> {
///     Err(StorageError::new(StorageErrorKind::DisallowedContent("image/png".to_string())))?
/// }
///
/// let err = might_fail().unwrap_err();
/// assert!(matches!(err.kind(), DeckhandErrorKind::Storage(_)));
/// assert!(err.storage_kind().is_some_and(|kind| kind.is_rejection()));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Deckhand Error: {}", _0)]
pub struct DeckhandError(Box<DeckhandErrorKind>);

impl DeckhandError {
    /// Create a new error from a kind.
    pub fn new(kind: DeckhandErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &DeckhandErrorKind {
        &self.0
    }

    /// Shortcut to the storage error kind, if this is a storage error.
    pub fn storage_kind(&self) -> Option<&StorageErrorKind> {
        match self.kind() {
            DeckhandErrorKind::Storage(err) => Some(&err.kind),
            DeckhandErrorKind::Config(_) => None,
        }
    }
}

// Generic From implementation for any type that converts to DeckhandErrorKind
impl<T> From<T> for DeckhandError
where
    T: Into<DeckhandErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Deckhand operations.
pub type DeckhandResult<T> = std::result::Result<T, DeckhandError>;
