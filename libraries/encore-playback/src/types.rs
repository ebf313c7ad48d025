//! Core types for playback management

use encore_core::{Track, TrackId};
use serde::{Deserialize, Serialize};

/// Playback state machine
///
/// ```text
/// Idle -> Loading -> Playing -> Ended | Paused | Failed
///                       ^          |               |
///                       +-- retry / advance -------+
/// ```
/// `Ended` and `Failed` are transit states: the controller immediately
/// routes through retry or skip-to-next from them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PlaybackState {
    /// Nothing loaded yet
    #[default]
    Idle,

    /// Resolving and loading a track
    Loading,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,

    /// Device reported end of track
    Ended,

    /// Last attempt failed and no retry is pending
    Failed,
}

impl PlaybackState {
    /// Whether a track is loaded on the device
    pub fn has_track(&self) -> bool {
        matches!(self, PlaybackState::Playing | PlaybackState::Paused)
    }
}

/// Transient session state, owned by the controller
///
/// `duration_secs` and `volume` mirror the device and are only refreshed
/// from device events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackSession {
    /// Track currently loaded
    pub current_track: Option<Track>,

    /// Device-reported playing flag
    pub is_playing: bool,

    /// Device-reported duration (seconds)
    pub duration_secs: f64,

    /// Device-reported position (seconds)
    pub current_time_secs: f64,

    /// Device-reported volume (0.0 - 1.0)
    pub volume: f32,

    /// Retries spent on the current attempt
    pub retry_count: u32,

    /// State machine position
    pub state: PlaybackState,
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self {
            current_track: None,
            is_playing: false,
            duration_secs: 0.0,
            current_time_secs: 0.0,
            volume: 1.0,
            retry_count: 0,
            state: PlaybackState::Idle,
        }
    }
}

/// Read-only view of the queue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Queued track ids, in play order
    pub ids: Vec<TrackId>,

    /// Cursor index (`None` while unset)
    pub cursor: Option<usize>,
}

/// Media-session metadata for the OS "now playing" surface
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub track_id: TrackId,
    pub title: String,
    pub artist: String,
    pub album: Option<String>,
    /// Smallest available thumbnail
    pub artwork_url: Option<String>,
}

impl NowPlaying {
    pub fn from_track(track: &Track) -> Self {
        Self {
            track_id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album_name().map(str::to_string),
            artwork_url: track.smallest_thumbnail().map(|t| t.url.clone()),
        }
    }
}
