//! Storage and upload validation error types.

/// Kinds of storage errors.
///
/// The first three variants are policy rejections raised by the validator;
/// the rest are failures of the storage backend itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum StorageErrorKind {
    /// Filename extension is not in the allowed set
    #[display("Unsupported file type: {:?}", _0)]
    UnsupportedType(String),
    /// Sniffed content type is missing or not in an allowed category
    #[display("Disallowed content type: {}", _0)]
    DisallowedContent(String),
    /// Staged artifact exceeds the maximum size
    #[display("File too large: {} bytes exceeds limit of {} bytes", size, max)]
    TooLarge {
        /// Size of the staged artifact in bytes
        size: u64,
        /// Policy maximum in bytes
        max: u64,
    },
    /// Underlying read, write or delete failure
    #[display("Storage I/O failure: {}", _0)]
    Io(String),
    /// Reference does not belong to this storage backend
    #[display("Invalid reference: {}", _0)]
    InvalidReference(String),
}

impl StorageErrorKind {
    /// Whether the upload was refused by policy rather than by a storage failure.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            StorageErrorKind::UnsupportedType(_)
                | StorageErrorKind::DisallowedContent(_)
                | StorageErrorKind::TooLarge { .. }
        )
    }

    /// What the caller should do about this error.
    ///
    /// # Examples
    ///
    /// ```
    /// use deckhand_error::{Remediation, StorageErrorKind};
    ///
    /// let kind = StorageErrorKind::TooLarge { size: 11, max: 10 };
    /// assert_eq!(kind.remediation(), Remediation::FixFile);
    ///
    /// let kind = StorageErrorKind::InvalidReference("/etc/passwd".to_string());
    /// assert_eq!(kind.remediation(), Remediation::FixReference);
    ///
    /// let kind = StorageErrorKind::Io("disk full".to_string());
    /// assert_eq!(kind.remediation(), Remediation::RetryLater);
    /// ```
    pub fn remediation(&self) -> Remediation {
        match self {
            StorageErrorKind::InvalidReference(_) => Remediation::FixReference,
            kind if kind.is_rejection() => Remediation::FixFile,
            _ => Remediation::RetryLater,
        }
    }

    /// Whether the caller must change the request before trying again.
    ///
    /// True for policy rejections and for references the backend never issued.
    pub fn is_caller_error(&self) -> bool {
        self.remediation() != Remediation::RetryLater
    }
}

/// Caller-facing remediation for a storage error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Remediation {
    /// The file was rejected by policy; retrying the same file will fail again.
    #[display("fix the file and upload again")]
    FixFile,
    /// The reference was not issued by this backend; retrying it will fail again.
    #[display("use a reference returned by save")]
    FixReference,
    /// Storage failed; the same request may succeed later.
    #[display("retry later")]
    RetryLater,
}

/// Storage error with location tracking.
///
/// # Examples
///
/// ```
/// use deckhand_error::{StorageError, StorageErrorKind};
///
/// let err = StorageError::new(StorageErrorKind::UnsupportedType(".exe".to_string()));
/// assert!(format!("{}", err).contains("Unsupported file type"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Storage Error: {} at line {} in {}", kind, line, file)]
pub struct StorageError {
    /// The kind of error that occurred
    pub kind: StorageErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl StorageError {
    /// Create a new storage error with automatic location tracking.
    #[track_caller]
    pub fn new(kind: StorageErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Wrap an I/O failure, prefixing the operation that failed.
    #[track_caller]
    pub fn io(context: impl std::fmt::Display, err: &std::io::Error) -> Self {
        Self::new(StorageErrorKind::Io(format!("{}: {}", context, err)))
    }
}
