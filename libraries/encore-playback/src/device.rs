//! Audio output device abstraction
//!
//! The controller drives an opaque, stateful device: it binds a stream
//! locator, loads it, starts playback and reads back position, duration and
//! volume. Completion and progress are reported asynchronously through the
//! event sender handed over by [`AudioDevice::attach_events`].

use async_trait::async_trait;
use encore_core::StreamLocator;
use std::fmt;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;

/// Sender half devices push their notifications into
pub type DeviceEventSender = mpsc::UnboundedSender<DeviceEvent>;

/// Receiver half drained by the controller
pub type DeviceEventReceiver = mpsc::UnboundedReceiver<DeviceEvent>;

/// Notifications raised by a device
///
/// Events carry no payload: the controller reads the current values back
/// from the device it owns when handling them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    /// Playback position advanced
    TimeUpdate,

    /// Duration and volume of the loaded stream are known
    MetadataLoaded,

    /// The loaded stream played to the end
    Ended,
}

/// Failure category decided by the device adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceErrorKind {
    /// Source format rejected (often a transient decoder glitch)
    UnsupportedFormat,

    /// Load was interrupted by another load or pause
    LoadInterrupted,

    /// Anything else
    Unknown,
}

impl DeviceErrorKind {
    /// Whether a failure of this kind is worth re-attempting
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            DeviceErrorKind::UnsupportedFormat | DeviceErrorKind::LoadInterrupted
        )
    }
}

impl fmt::Display for DeviceErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DeviceErrorKind::UnsupportedFormat => "unsupported format",
            DeviceErrorKind::LoadInterrupted => "load interrupted",
            DeviceErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Device failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct DeviceError {
    pub kind: DeviceErrorKind,
    pub message: String,
}

impl DeviceError {
    pub fn new(kind: DeviceErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn unsupported_format(message: impl Into<String>) -> Self {
        Self::new(DeviceErrorKind::UnsupportedFormat, message)
    }

    pub fn load_interrupted(message: impl Into<String>) -> Self {
        Self::new(DeviceErrorKind::LoadInterrupted, message)
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::new(DeviceErrorKind::Unknown, message)
    }

    pub fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Stateful media output
///
/// Owned exclusively by one controller. Implementations decide the
/// [`DeviceErrorKind`] of their own failures.
#[async_trait]
pub trait AudioDevice: Send {
    /// Point the device at a new stream
    fn set_source(&mut self, locator: &StreamLocator);

    /// Prepare the bound stream
    async fn load(&mut self) -> Result<(), DeviceError>;

    /// Start playback
    ///
    /// Resolves once playback actually started or failed.
    async fn play(&mut self) -> Result<(), DeviceError>;

    fn pause(&mut self);

    fn is_paused(&self) -> bool;

    fn seek(&mut self, position: Duration);

    /// Duration of the loaded stream, once known
    fn duration(&self) -> Option<Duration>;

    fn position(&self) -> Duration;

    /// Volume (0.0 - 1.0)
    fn volume(&self) -> f32;

    fn set_volume(&mut self, volume: f32);

    /// Start delivering notifications to `events`
    ///
    /// Called once per device instance.
    fn attach_events(&mut self, events: DeviceEventSender);
}

/// Builds devices for the first stream a controller plays
pub trait DeviceFactory: Send + Sync {
    fn create(&self, locator: &StreamLocator) -> Box<dyn AudioDevice>;
}

impl<F> DeviceFactory for F
where
    F: Fn(&StreamLocator) -> Box<dyn AudioDevice> + Send + Sync,
{
    fn create(&self, locator: &StreamLocator) -> Box<dyn AudioDevice> {
        self(locator)
    }
}
