//! Playback Events
//!
//! Event-based communication for observers of a session. Events are
//! emitted at key points:
//! - State changes (loading/playing/paused/failed)
//! - Track changes and media-session metadata
//! - Position and volume updates mirrored from the device
//! - Queue, history and search result changes

use crate::types::{NowPlaying, PlaybackState};
use encore_core::{TrackId, TrackSummary};
use serde::{Deserialize, Serialize};

/// Events emitted by the playback controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlaybackEvent {
    /// Playback state changed
    StateChanged {
        /// The new playback state
        state: PlaybackState,
    },

    /// A different track started loading
    TrackChanged {
        /// ID of the new (current) track
        track_id: TrackId,
        /// ID of the previous track (if any)
        previous_track_id: Option<TrackId>,
    },

    /// Media-session metadata for the track that just started
    NowPlaying(NowPlaying),

    /// Position update mirrored from the device
    PositionUpdate {
        /// Current playback position
        position_ms: u64,
        /// Total track duration (0 while unknown)
        duration_ms: u64,
    },

    /// Device volume changed
    VolumeChanged {
        /// New volume level (0.0 - 1.0)
        volume: f32,
    },

    /// Queue contents or cursor changed
    QueueChanged {
        /// New queue length
        length: usize,
        /// Cursor index (`None` while unset)
        cursor: Option<usize>,
    },

    /// History was appended to or cleared
    HistoryChanged {
        /// New history length
        length: usize,
    },

    /// New search results are available
    SearchResults {
        /// The query that produced them
        query: String,
        /// Raw results
        results: Vec<TrackSummary>,
    },

    /// Error occurred during playback
    Error {
        /// Error message
        message: String,
    },
}

impl PlaybackEvent {
    pub(crate) fn position(position_secs: f64, duration_secs: f64) -> Self {
        PlaybackEvent::PositionUpdate {
            position_ms: secs_to_ms(position_secs),
            duration_ms: secs_to_ms(duration_secs),
        }
    }
}

fn secs_to_ms(secs: f64) -> u64 {
    if secs.is_finite() && secs > 0.0 {
        (secs * 1000.0).round() as u64
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_event_converts_to_millis() {
        assert_eq!(
            PlaybackEvent::position(1.5, 200.0),
            PlaybackEvent::PositionUpdate {
                position_ms: 1500,
                duration_ms: 200_000
            }
        );
    }

    #[test]
    fn position_event_tolerates_unknown_duration() {
        assert_eq!(
            PlaybackEvent::position(-1.0, f64::NAN),
            PlaybackEvent::PositionUpdate {
                position_ms: 0,
                duration_ms: 0
            }
        );
    }

    #[test]
    fn events_serialize_with_variant_tag() {
        let event = PlaybackEvent::StateChanged {
            state: PlaybackState::Playing,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["StateChanged"]["state"], "Playing");
    }
}
