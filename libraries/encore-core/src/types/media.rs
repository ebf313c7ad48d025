/// Media source request/response types
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category hint passed along with a search query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    /// Individual songs
    #[default]
    Song,
    /// Music videos
    Video,
    /// Albums
    Album,
    /// Artists
    Artist,
    /// Playlists
    Playlist,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Song => "song",
            SearchKind::Video => "video",
            SearchKind::Album => "album",
            SearchKind::Artist => "artist",
            SearchKind::Playlist => "playlist",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audio format hint for stream resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    #[default]
    Mp3,
    M4a,
    Opus,
    Webm,
}

impl AudioFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "mp3",
            AudioFormat::M4a => "m4a",
            AudioFormat::Opus => "opus",
            AudioFormat::Webm => "webm",
        }
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Mp3 => "audio/mpeg",
            AudioFormat::M4a => "audio/mp4",
            AudioFormat::Opus => "audio/ogg",
            AudioFormat::Webm => "audio/webm",
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Playable stream returned by `MediaSource::download`
///
/// The locator is handed to the audio device untouched; Encore never
/// interprets the URL itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamLocator {
    /// URL (or file URI) the device can load
    pub url: String,

    /// Format the stream was resolved to
    #[serde(default)]
    pub format: AudioFormat,
}

impl StreamLocator {
    pub fn new(url: impl Into<String>, format: AudioFormat) -> Self {
        Self {
            url: url.into(),
            format,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_kind_wire_names() {
        assert_eq!(serde_json::to_string(&SearchKind::Song).unwrap(), "\"song\"");
        assert_eq!(SearchKind::Playlist.to_string(), "playlist");
    }

    #[test]
    fn locator_format_defaults_to_mp3() {
        let locator: StreamLocator =
            serde_json::from_str(r#"{"url":"https://cdn.example/a"}"#).unwrap();
        assert_eq!(locator.format, AudioFormat::Mp3);
        assert_eq!(locator.format.mime_type(), "audio/mpeg");
    }
}
