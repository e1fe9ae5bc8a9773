//! Configuration error types.

use std::fmt::Display;

/// Settings could not be loaded, or loaded settings describe an unusable policy.
///
/// Unlike a [`StorageError`](crate::StorageError), a configuration error is
/// raised at startup and never by a single upload.
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Configuration Error: {} at line {} in {}", message, line, file)]
pub struct ConfigError {
    /// What was wrong with the settings
    pub message: String,
    /// Line where the error was raised
    pub line: u32,
    /// Source file where the error was raised
    pub file: &'static str,
}

impl ConfigError {
    /// Record a configuration problem at the caller's location.
    ///
    /// # Examples
    ///
    /// ```
    /// use deckhand_error::ConfigError;
    ///
    /// let err = ConfigError::new("policy size limit must be greater than zero");
    /// assert!(err.message.contains("size limit"));
    /// assert!(err.file.ends_with(".rs"));
    /// ```
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let location = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: location.line(),
            file: location.file(),
        }
    }

    /// Wrap a loader failure, prefixing the step that failed.
    ///
    /// ```
    /// use deckhand_error::ConfigError;
    ///
    /// let err = ConfigError::wrap("parse deckhand.toml", "missing field `policy`");
    /// assert_eq!(err.message, "parse deckhand.toml: missing field `policy`");
    /// ```
    #[track_caller]
    pub fn wrap(context: impl Display, err: impl Display) -> Self {
        Self::new(format!("{}: {}", context, err))
    }
}
