//! Encore - Playback Session
//!
//! Client-side playback session for a streaming-music player.
//!
//! This crate provides:
//! - Bounded play queue with a cursor (head eviction past capacity)
//! - Suggestion read-ahead from related tracks
//! - Play/retry/advance state machine with bounded retries
//! - Persisted listening history (most recent first, bounded)
//! - Device event wiring (position, metadata, end of track)
//! - An actor service with a cloneable handle and event broadcast
//!
//! # Architecture
//!
//! `encore-playback` never talks to the network or to an audio API itself:
//! - Track lookup, related tracks and stream resolution come from a
//!   [`MediaSource`](encore_core::MediaSource)
//! - Audio output is an opaque [`AudioDevice`] built by a [`DeviceFactory`]
//! - History persistence goes through a
//!   [`KeyValueStore`](encore_storage::KeyValueStore)
//!
//! # Example: Running a session
//!
//! ```rust,no_run
//! use encore_playback::{
//!     DeviceFactory, PlaybackController, PlaybackService, SessionConfig,
//! };
//! use encore_core::MediaSource;
//! use encore_storage::FileStore;
//! use std::sync::Arc;
//!
//! # async fn example(
//! #     source: Arc<dyn MediaSource>,
//! #     factory: Box<dyn DeviceFactory>,
//! # ) -> encore_playback::Result<()> {
//! let config = SessionConfig::load(None)?;
//! let store = Arc::new(FileStore::open(&config.storage_dir).await?);
//!
//! let controller = PlaybackController::open(config, source, factory, store).await?;
//! let handle = PlaybackService::spawn(controller);
//!
//! let mut events = handle.subscribe();
//! handle.play_music("dQw4w9WgXcQ", true).await?;
//!
//! while let Ok(event) = events.recv().await {
//!     println!("{event:?}");
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]

pub mod config;
mod controller;
pub mod device;
mod error;
pub mod events;
mod history;
mod queue;
pub mod retry;
mod service;
mod suggestions;
pub mod types;

// Public exports
pub use config::SessionConfig;
pub use controller::PlaybackController;
pub use device::{AudioDevice, DeviceError, DeviceErrorKind, DeviceEvent, DeviceEventSender, DeviceFactory};
pub use error::{PlaybackError, Result};
pub use events::PlaybackEvent;
pub use history::{History, HistoryEntry, HistoryStore};
pub use queue::Queue;
pub use retry::{RetryDecision, RetryPolicy};
pub use service::{PlaybackCommand, PlaybackHandle, PlaybackService};
pub use suggestions::{Expansion, ExpansionGuard};
pub use types::{NowPlaying, PlaybackSession, PlaybackState, QueueSnapshot};
