//! Session configuration
//!
//! Defaults mirror the limits the playback core was designed around
//! (500-entry queue, 100-entry history, 3 retries). Values can be layered
//! from an optional TOML file and `ENCORE_`-prefixed environment variables.

use crate::error::{PlaybackError, Result};
use encore_core::{AudioFormat, SearchKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default queue capacity
pub const DEFAULT_QUEUE_CAPACITY: usize = 500;

/// Default history capacity
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Default retry ceiling (retries, not attempts)
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for a playback session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum queue length before head eviction (default: 500)
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Maximum persisted history length (default: 100)
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    /// Retries allowed per track for retryable device errors (default: 3)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Backoff step between retries, multiplied by the attempt number
    #[serde(default = "default_retry_backoff_ms")]
    pub retry_backoff_ms: u64,

    /// Upper bound for a single backoff sleep
    #[serde(default = "default_retry_backoff_max_ms")]
    pub retry_backoff_max_ms: u64,

    /// Format requested from `MediaSource::download`
    #[serde(default)]
    pub download_format: AudioFormat,

    /// Category hint used by `search`
    #[serde(default)]
    pub search_kind: SearchKind,

    /// Storage key the history is persisted under
    #[serde(default = "default_history_key")]
    pub history_key: String,

    /// Directory for the file-backed store
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,
}

impl SessionConfig {
    /// Load configuration from an optional file and the environment
    ///
    /// Environment variables use the `ENCORE_` prefix, e.g.
    /// `ENCORE_MAX_RETRIES=5`.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = config::Config::builder();

        if let Some(path) = path {
            settings = settings.add_source(config::File::from(path.to_path_buf()));
        }

        settings = settings.add_source(
            config::Environment::with_prefix("ENCORE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: Self = settings
            .build()
            .map_err(|e| PlaybackError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| PlaybackError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.queue_capacity == 0 {
            return Err(PlaybackError::Config(
                "queue_capacity must be at least 1".to_string(),
            ));
        }

        if self.history_capacity == 0 {
            return Err(PlaybackError::Config(
                "history_capacity must be at least 1".to_string(),
            ));
        }

        if !encore_storage::is_valid_key(&self.history_key) {
            return Err(PlaybackError::Config(format!(
                "history_key {:?} must be non-empty and use only ASCII letters, digits, '-' or '_'",
                self.history_key
            )));
        }

        Ok(())
    }
}

// Default values
fn default_queue_capacity() -> usize {
    DEFAULT_QUEUE_CAPACITY
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}

fn default_retry_backoff_ms() -> u64 {
    250
}

fn default_retry_backoff_max_ms() -> u64 {
    2000
}

fn default_history_key() -> String {
    "played".to_string()
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from("./data")
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            queue_capacity: default_queue_capacity(),
            history_capacity: default_history_capacity(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff_ms(),
            retry_backoff_max_ms: default_retry_backoff_max_ms(),
            download_format: AudioFormat::default(),
            search_kind: SearchKind::default(),
            history_key: default_history_key(),
            storage_dir: default_storage_dir(),
        }
    }
}
