//! Error types for playback management

use crate::device::DeviceError;
use encore_core::CoreError;
use encore_storage::StorageError;
use thiserror::Error;

/// Playback errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    /// Media source lookup failed
    #[error("Media source error: {0}")]
    Source(#[from] CoreError),

    /// Audio device failed to load or play
    #[error("Audio device error: {0}")]
    Device(#[from] DeviceError),

    /// Persisting session state failed
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Invalid or unloadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Playback service task is gone
    #[error("Playback service closed")]
    ServiceClosed,
}

/// Result type for playback operations
pub type Result<T> = std::result::Result<T, PlaybackError>;
