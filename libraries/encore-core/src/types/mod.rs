//! Domain types shared by every Encore crate

mod ids;
mod media;
mod track;

pub use ids::TrackId;
pub use media::{AudioFormat, SearchKind, StreamLocator};
pub use track::{Album, Thumbnail, Track, TrackSummary};
