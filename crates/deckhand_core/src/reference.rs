//! Stored reference type.

use serde::{Deserialize, Serialize};

/// Opaque handle to a committed artifact.
///
/// Returned by a successful save and accepted by delete. Only the backend
/// that issued it knows what the string means.
///
/// # Examples
///
/// ```
/// use deckhand_core::StoredReference;
///
/// let reference = StoredReference::new("/tmp/0f3c9a.txt");
/// assert_eq!(reference.to_string(), "/tmp/0f3c9a.txt");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
#[display("{}", _0)]
pub struct StoredReference(String);

impl StoredReference {
    /// Wrap a backend-specific identifier.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the backend-specific identifier.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the reference, returning the identifier.
    pub fn into_inner(self) -> String {
        self.0
    }
}
