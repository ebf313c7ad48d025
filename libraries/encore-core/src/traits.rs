/// Core traits for Encore
use crate::error::Result;
use crate::types::{AudioFormat, SearchKind, StreamLocator, Track, TrackId, TrackSummary};
use async_trait::async_trait;
use std::sync::Arc;

/// Media source trait
///
/// The service boundary the playback core consumes. Implementers talk to
/// whatever actually knows about tracks (an IPC bridge, a REST API, a local
/// library) and translate failures into `CoreError`.
///
/// Every method may suspend; none of them is expected to retry on its own.
#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Free-text search
    ///
    /// # Errors
    /// Returns an error if the lookup fails
    async fn search(&self, query: &str, kind: SearchKind) -> Result<Vec<TrackSummary>>;

    /// Full metadata for a single track
    ///
    /// # Errors
    /// Returns an error if the track is unknown or the lookup fails
    async fn get_song(&self, id: &TrackId) -> Result<Track>;

    /// Tracks related to `id`, in recommendation order
    ///
    /// # Errors
    /// Returns an error if the lookup fails
    async fn get_relatives(&self, id: &TrackId) -> Result<Vec<TrackSummary>>;

    /// Resolve a playable stream for `id`
    ///
    /// # Errors
    /// Returns an error if no stream can be produced in `format`
    async fn download(&self, id: &TrackId, format: AudioFormat) -> Result<StreamLocator>;
}

#[async_trait]
impl<T: MediaSource + ?Sized> MediaSource for Arc<T> {
    async fn search(&self, query: &str, kind: SearchKind) -> Result<Vec<TrackSummary>> {
        (**self).search(query, kind).await
    }

    async fn get_song(&self, id: &TrackId) -> Result<Track> {
        (**self).get_song(id).await
    }

    async fn get_relatives(&self, id: &TrackId) -> Result<Vec<TrackSummary>> {
        (**self).get_relatives(id).await
    }

    async fn download(&self, id: &TrackId, format: AudioFormat) -> Result<StreamLocator> {
        (**self).download(id, format).await
    }
}
