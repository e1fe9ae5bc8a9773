//! Upload policy: which files may be stored and how large they may be.

use deckhand_error::{ConfigError, DeckhandResult};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// Extensions accepted when no policy overrides them.
pub const DEFAULT_ALLOWED_EXTENSIONS: &[&str] = &[".pdf", ".docx", ".txt"];

/// Top-level MIME categories accepted when no policy overrides them.
pub const DEFAULT_ALLOWED_MIME_PREFIXES: &[&str] = &["application/", "text/"];

/// Default size limit in mebibytes.
pub const DEFAULT_MAX_SIZE_MB: u64 = 10;

/// Bytes per mebibyte.
pub const BYTES_PER_MB: u64 = 1024 * 1024;

const DOCX_MIME: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Policy applied to every upload.
///
/// Built once at startup and never mutated. Extensions are stored lower-cased
/// with a leading dot, so lookups are case-insensitive.
///
/// # Examples
///
/// ```
/// use deckhand_core::UploadPolicy;
///
/// let policy = UploadPolicy::default();
/// assert!(policy.allows_extension(".PDF"));
/// assert!(!policy.allows_extension(".exe"));
/// assert_eq!(*policy.max_size_bytes(), 10 * 1024 * 1024);
///
/// // Tests can shrink the limit without touching global state
/// let tiny = UploadPolicy::builder().max_size_bytes(1).build();
/// assert_eq!(*tiny.max_size_bytes(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, derive_getters::Getters)]
#[serde(from = "PolicySection")]
pub struct UploadPolicy {
    /// Allowed filename extensions (lower-case, leading dot).
    allowed_extensions: BTreeSet<String>,

    /// Sniffed MIME types must start with one of these prefixes.
    allowed_mime_prefixes: Vec<String>,

    /// Largest accepted artifact in bytes.
    max_size_bytes: u64,

    /// Per-extension list of acceptable sniffed MIME types.
    ///
    /// Extensions missing from this map are checked against the prefixes only.
    expected_mime_types: BTreeMap<String, Vec<String>>,

    /// Stop copying once the stream exceeds `max_size_bytes`.
    enforce_size_while_streaming: bool,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl UploadPolicy {
    /// Creates a new policy builder.
    pub fn builder() -> UploadPolicyBuilder {
        UploadPolicyBuilder::default()
    }

    /// Whether a filename extension (with or without the dot, any case) is allowed.
    pub fn allows_extension(&self, extension: &str) -> bool {
        self.allowed_extensions.contains(&normalize_extension(extension))
    }

    /// Whether a sniffed MIME type falls into an allowed category.
    pub fn allows_mime(&self, mime: &str) -> bool {
        self.allowed_mime_prefixes
            .iter()
            .any(|prefix| mime.starts_with(prefix.as_str()))
    }

    /// Whether a sniffed MIME type is plausible for the given extension.
    ///
    /// Entries ending in `/` match a whole category (`"text/"` accepts
    /// `text/html`); other entries must match exactly. Always true for
    /// extensions without an entry in `expected_mime_types`.
    pub fn mime_matches_extension(&self, extension: &str, mime: &str) -> bool {
        match self.expected_mime_types.get(&normalize_extension(extension)) {
            Some(expected) => expected.iter().any(|candidate| {
                if candidate.ends_with('/') {
                    mime.starts_with(candidate.as_str())
                } else {
                    candidate == mime
                }
            }),
            None => true,
        }
    }

    /// Validates that the policy can accept at least one file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if no extension or MIME category is allowed,
    /// or if the size limit is zero.
    pub fn validate(&self) -> DeckhandResult<()> {
        if self.allowed_extensions.is_empty() {
            return Err(ConfigError::new("policy allows no file extensions").into());
        }
        if self.allowed_mime_prefixes.is_empty() {
            return Err(ConfigError::new("policy allows no MIME categories").into());
        }
        if self.max_size_bytes == 0 {
            return Err(ConfigError::new("policy size limit must be greater than zero").into());
        }
        Ok(())
    }
}

/// Lower-cases an extension and ensures it carries a leading dot.
///
/// An empty input stays empty so that "no extension" never matches.
pub fn normalize_extension(extension: &str) -> String {
    let trimmed = extension.trim().to_lowercase();
    if trimmed.is_empty() || trimmed.starts_with('.') {
        trimmed
    } else {
        format!(".{}", trimmed)
    }
}

fn default_extensions() -> Vec<String> {
    DEFAULT_ALLOWED_EXTENSIONS
        .iter()
        .map(|ext| ext.to_string())
        .collect()
}

fn default_mime_prefixes() -> Vec<String> {
    DEFAULT_ALLOWED_MIME_PREFIXES
        .iter()
        .map(|prefix| prefix.to_string())
        .collect()
}

fn default_max_size_mb() -> u64 {
    DEFAULT_MAX_SIZE_MB
}

fn default_expected_mime_types() -> BTreeMap<String, Vec<String>> {
    BTreeMap::from([
        (".pdf".to_string(), vec!["application/pdf".to_string()]),
        (
            ".docx".to_string(),
            vec![DOCX_MIME.to_string(), "application/zip".to_string()],
        ),
        (".txt".to_string(), vec!["text/".to_string()]),
    ])
}

/// On-disk shape of the `[policy]` table.
///
/// ```toml
/// [policy]
/// allowed_extensions = [".pdf", ".docx", ".txt"]
/// allowed_mime_prefixes = ["application/", "text/"]
/// max_size_mb = 10
///
/// [policy.expected_mime_types]
/// pdf = ["application/pdf"]
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PolicySection {
    #[serde(default = "default_extensions")]
    allowed_extensions: Vec<String>,

    #[serde(default = "default_mime_prefixes")]
    allowed_mime_prefixes: Vec<String>,

    #[serde(default = "default_max_size_mb")]
    max_size_mb: u64,

    /// Exact byte limit; wins over `max_size_mb` when present.
    #[serde(default)]
    max_size_bytes: Option<u64>,

    #[serde(default = "default_expected_mime_types")]
    expected_mime_types: BTreeMap<String, Vec<String>>,

    #[serde(default)]
    enforce_size_while_streaming: bool,
}

impl From<PolicySection> for UploadPolicy {
    fn from(section: PolicySection) -> Self {
        let builder = UploadPolicy::builder()
            .allowed_extensions(section.allowed_extensions)
            .allowed_mime_prefixes(section.allowed_mime_prefixes)
            .expected_mime_types(section.expected_mime_types)
            .enforce_size_while_streaming(section.enforce_size_while_streaming);

        match section.max_size_bytes {
            Some(bytes) => builder.max_size_bytes(bytes),
            None => builder.max_size_mb(section.max_size_mb),
        }
        .build()
    }
}

/// Builder for `UploadPolicy`.
///
/// Unset fields fall back to the defaults: `.pdf`, `.docx`, `.txt`;
/// `application/` and `text/`; 10 MiB; no streaming cap.
#[derive(Debug, Default)]
pub struct UploadPolicyBuilder {
    allowed_extensions: Option<BTreeSet<String>>,
    allowed_mime_prefixes: Option<Vec<String>>,
    max_size_bytes: Option<u64>,
    expected_mime_types: Option<BTreeMap<String, Vec<String>>>,
    enforce_size_while_streaming: Option<bool>,
}

impl UploadPolicyBuilder {
    /// Sets the allowed extensions. Each entry is normalized.
    pub fn allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = Some(
            extensions
                .into_iter()
                .map(|ext| normalize_extension(ext.as_ref()))
                .filter(|ext| !ext.is_empty())
                .collect(),
        );
        self
    }

    /// Sets the allowed MIME category prefixes.
    pub fn allowed_mime_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_mime_prefixes = Some(prefixes.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the size limit in bytes.
    pub fn max_size_bytes(mut self, bytes: u64) -> Self {
        self.max_size_bytes = Some(bytes);
        self
    }

    /// Sets the size limit in mebibytes.
    pub fn max_size_mb(mut self, megabytes: u64) -> Self {
        self.max_size_bytes = Some(megabytes.saturating_mul(BYTES_PER_MB));
        self
    }

    /// Replaces the per-extension MIME expectations. Keys are normalized.
    pub fn expected_mime_types(mut self, expected: BTreeMap<String, Vec<String>>) -> Self {
        self.expected_mime_types = Some(
            expected
                .into_iter()
                .map(|(ext, mimes)| (normalize_extension(&ext), mimes))
                .collect(),
        );
        self
    }

    /// Enables or disables the streaming size cap.
    pub fn enforce_size_while_streaming(mut self, enabled: bool) -> Self {
        self.enforce_size_while_streaming = Some(enabled);
        self
    }

    /// Builds the `UploadPolicy`.
    pub fn build(self) -> UploadPolicy {
        UploadPolicy {
            allowed_extensions: self.allowed_extensions.unwrap_or_else(|| {
                default_extensions()
                    .iter()
                    .map(|ext| normalize_extension(ext))
                    .collect()
            }),
            allowed_mime_prefixes: self
                .allowed_mime_prefixes
                .unwrap_or_else(default_mime_prefixes),
            max_size_bytes: self
                .max_size_bytes
                .unwrap_or(DEFAULT_MAX_SIZE_MB * BYTES_PER_MB),
            expected_mime_types: self
                .expected_mime_types
                .unwrap_or_else(default_expected_mime_types),
            enforce_size_while_streaming: self.enforce_size_while_streaming.unwrap_or(false),
        }
    }
}
