//! Configuration loading.
//!
//! The configuration system supports:
//! - Bundled defaults (include_str! from deckhand.toml)
//! - User overrides (./deckhand.toml or ~/.config/deckhand/deckhand.toml)
//! - Automatic merging with user values taking precedence

use config::{Config, File, FileFormat};
use deckhand_core::UploadPolicy;
use deckhand_error::{ConfigError, DeckhandResult};
use deckhand_storage::LocalMediaStorage;
use serde::Deserialize;
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Bundled default configuration.
const DEFAULT_CONFIG: &str = include_str!("../../../deckhand.toml");

/// Storage backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory for staged and committed uploads.
    ///
    /// `None` means the OS temp directory.
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,
}

impl StorageConfig {
    /// The configured staging directory, or the OS temp directory.
    pub fn resolved_staging_dir(&self) -> PathBuf {
        self.staging_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// Top-level Deckhand configuration.
///
/// # Example
///
/// ```toml
/// [storage]
/// staging_dir = "/var/lib/deckhand/uploads"
///
/// [policy]
/// allowed_extensions = [".pdf", ".txt"]
/// max_size_mb = 5
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct DeckhandConfig {
    /// Storage backend settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// Upload policy
    #[serde(default)]
    pub policy: UploadPolicy,
}

impl DeckhandConfig {
    /// Load configuration from a specific file path, on top of the bundled defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resulting policy is unusable.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> DeckhandResult<Self> {
        debug!("Loading configuration from file");

        let config: Self = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()))
            .build()
            .map_err(|e| {
                ConfigError::wrap(format_args!("read {}", path.as_ref().display()), e)
            })?
            .try_deserialize()
            .map_err(|e| ConfigError::wrap("parse configuration", e))?;

        config.policy.validate()?;
        Ok(config)
    }

    /// Load configuration with precedence: user override > bundled default.
    ///
    /// Configuration sources in order of precedence (later sources override earlier):
    /// 1. Bundled defaults (deckhand.toml shipped with the crate)
    /// 2. User config in home directory (~/.config/deckhand/deckhand.toml)
    /// 3. User config in current directory (./deckhand.toml)
    ///
    /// User config files are optional and will be silently skipped if not found.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use deckhand::DeckhandConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = DeckhandConfig::load()?;
    /// println!("max upload: {} bytes", config.policy.max_size_bytes());
    /// # Ok(())
    /// # }
    /// ```
    #[instrument]
    pub fn load() -> DeckhandResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/deckhand/deckhand.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("deckhand").required(false));

        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::wrap("build configuration", e))?
            .try_deserialize()
            .map_err(|e| ConfigError::wrap("parse configuration", e))?;

        config.policy.validate()?;
        Ok(config)
    }

    /// Build the local storage engine described by this configuration.
    pub fn open_local_storage(&self) -> DeckhandResult<LocalMediaStorage> {
        LocalMediaStorage::new(self.storage.resolved_staging_dir(), self.policy.clone())
    }
}
