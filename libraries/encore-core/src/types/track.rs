/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Artwork descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thumbnail {
    /// Image URL
    pub url: String,

    /// Width in pixels
    pub width: u32,

    /// Height in pixels
    pub height: u32,
}

impl Thumbnail {
    pub fn new(url: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            url: url.into(),
            width,
            height,
        }
    }
}

/// Album reference attached to a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    /// Album identifier at the media source (if any)
    #[serde(default)]
    pub id: Option<String>,

    /// Album name
    pub name: String,
}

/// Full track metadata, as returned by `MediaSource::get_song`
///
/// Immutable once fetched. History records are snapshots of this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    #[serde(default)]
    pub title: String,

    /// Artist name
    #[serde(default)]
    pub artist: String,

    /// Album (optional)
    #[serde(default)]
    pub album: Option<Album>,

    /// Artwork, in the order the source returned it
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,

    /// Track duration in seconds, once known
    #[serde(default)]
    pub duration_secs: Option<f64>,
}

impl Track {
    /// Track with nothing but an id
    ///
    /// Used when the metadata lookup failed but the stream still played.
    pub fn bare(id: TrackId) -> Self {
        Self {
            id,
            title: String::new(),
            artist: String::new(),
            album: None,
            thumbnails: Vec::new(),
            duration_secs: None,
        }
    }

    /// Get the track duration as a Duration
    pub fn duration(&self) -> Option<Duration> {
        self.duration_secs
            .filter(|secs| secs.is_finite() && *secs >= 0.0)
            .map(Duration::from_secs_f64)
    }

    /// Album name, if the track has one
    pub fn album_name(&self) -> Option<&str> {
        self.album.as_ref().map(|album| album.name.as_str())
    }

    /// Narrowest thumbnail (first one wins on ties)
    pub fn smallest_thumbnail(&self) -> Option<&Thumbnail> {
        self.thumbnails
            .iter()
            .reduce(|smallest, current| {
                if current.width < smallest.width {
                    current
                } else {
                    smallest
                }
            })
    }
}

/// Lightweight search / related-track result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSummary {
    /// Track identifier
    pub id: TrackId,

    /// Track title
    #[serde(default)]
    pub title: String,

    /// Artist name
    #[serde(default)]
    pub artist: String,

    /// Duration in seconds (if the source reports it)
    #[serde(default)]
    pub duration_secs: Option<f64>,

    /// Artwork
    #[serde(default)]
    pub thumbnails: Vec<Thumbnail>,
}

impl TrackSummary {
    pub fn new(id: impl Into<TrackId>, title: impl Into<String>, artist: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            artist: artist.into(),
            duration_secs: None,
            thumbnails: Vec::new(),
        }
    }
}

impl From<&Track> for TrackSummary {
    fn from(track: &Track) -> Self {
        Self {
            id: track.id.clone(),
            title: track.title.clone(),
            artist: track.artist.clone(),
            duration_secs: track.duration_secs,
            thumbnails: track.thumbnails.clone(),
        }
    }
}
