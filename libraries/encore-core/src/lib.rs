//! Encore Core
//!
//! Platform-agnostic core types, service traits, and error handling for the
//! Encore playback session.
//!
//! # Architecture
//!
//! The core crate defines:
//! - **Domain Types**: `TrackId`, `Track`, `TrackSummary`, `Thumbnail`, `StreamLocator`
//! - **Service Traits**: `MediaSource` (search, metadata, related tracks, stream resolution)
//! - **Error Handling**: Unified `CoreError` and `Result` types
//!
//! Nothing here knows about queues, devices or persistence; those live in
//! `encore-playback` and `encore-storage`.
//!
//! # Example
//!
//! ```rust
//! use encore_core::types::{Thumbnail, Track, TrackId};
//!
//! let mut track = Track::bare(TrackId::new("dQw4w9WgXcQ"));
//! track.title = "Never Gonna Give You Up".to_string();
//! track.thumbnails = vec![
//!     Thumbnail::new("https://img.example/large.jpg", 544, 544),
//!     Thumbnail::new("https://img.example/small.jpg", 60, 60),
//! ];
//!
//! assert_eq!(track.smallest_thumbnail().unwrap().width, 60);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{CoreError, Result};
pub use traits::MediaSource;
pub use types::{
    Album, AudioFormat, SearchKind, StreamLocator, Thumbnail, Track, TrackId, TrackSummary,
};
