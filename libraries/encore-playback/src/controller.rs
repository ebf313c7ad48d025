//! Playback controller - core orchestration
//!
//! Coordinates the queue, the audio device, the media source and the
//! persisted history. A successful start runs, in order:
//!
//! ```text
//! metadata -> stream locator -> bind/load/play -> suggestions -> history
//! ```
//!
//! Locator and device failures go through the [`RetryPolicy`]; everything
//! else is logged and playback carries on.

use crate::{
    config::SessionConfig,
    device::{AudioDevice, DeviceEvent, DeviceEventReceiver, DeviceEventSender, DeviceFactory},
    error::Result,
    events::PlaybackEvent,
    history::{HistoryEntry, HistoryStore},
    queue::Queue,
    retry::{RetryDecision, RetryPolicy},
    suggestions::{Expansion, ExpansionGuard},
    types::{NowPlaying, PlaybackSession, PlaybackState, QueueSnapshot},
};
use encore_core::{MediaSource, StreamLocator, Track, TrackId, TrackSummary};
use encore_storage::KeyValueStore;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Playback controller
///
/// Owns the session state and the device. All mutation goes through
/// `&mut self`; device notifications are queued on a channel and handled
/// one at a time via [`handle_device_event`](Self::handle_device_event).
pub struct PlaybackController {
    config: SessionConfig,
    source: Arc<dyn MediaSource>,
    factory: Box<dyn DeviceFactory>,

    /// Output device, created on first playback
    device: Option<Box<dyn AudioDevice>>,

    /// Whether the current device has been handed an event sender
    listeners_attached: bool,

    device_events_tx: DeviceEventSender,

    /// Held until a service loop takes it over
    device_events_rx: Option<DeviceEventReceiver>,

    queue: Queue,
    history: HistoryStore,
    session: PlaybackSession,
    now_playing: Option<NowPlaying>,
    search_results: Vec<TrackSummary>,
    retry: RetryPolicy,
    expansion: ExpansionGuard,

    /// Events waiting to be drained by observers
    pending_events: Vec<PlaybackEvent>,
}

impl PlaybackController {
    /// Create a controller from injected collaborators
    pub fn new(
        config: SessionConfig,
        source: Arc<dyn MediaSource>,
        factory: Box<dyn DeviceFactory>,
        history: HistoryStore,
    ) -> Self {
        let (device_events_tx, device_events_rx) = mpsc::unbounded_channel();

        Self {
            queue: Queue::new(config.queue_capacity),
            retry: RetryPolicy::from_config(&config),
            config,
            source,
            factory,
            device: None,
            listeners_attached: false,
            device_events_tx,
            device_events_rx: Some(device_events_rx),
            history,
            session: PlaybackSession::default(),
            now_playing: None,
            search_results: Vec::new(),
            expansion: ExpansionGuard::new(),
            pending_events: Vec::new(),
        }
    }

    /// Create a controller, restoring history from `store`
    pub async fn open(
        config: SessionConfig,
        source: Arc<dyn MediaSource>,
        factory: Box<dyn DeviceFactory>,
        store: Arc<dyn KeyValueStore>,
    ) -> Result<Self> {
        config.validate()?;
        let history = HistoryStore::load(store, config.history_key.clone(), config.history_capacity).await;
        Ok(Self::new(config, source, factory, history))
    }

    // ===== Playback =====

    /// Play `id`, optionally clearing the queue first
    ///
    /// Failed attempts are retried while the policy allows, then playback
    /// moves on to the next queued track. Never returns an error: failures
    /// are logged and surfaced as [`PlaybackEvent::Error`].
    pub async fn play_music(&mut self, id: TrackId, erase_queue: bool) {
        let mut id = id;
        let mut erase_queue = erase_queue;
        let mut retries = 0;

        loop {
            self.session.retry_count = retries;

            let error = match self.attempt(&id, erase_queue).await {
                Ok(()) => {
                    self.session.retry_count = 0;
                    return;
                }
                Err(error) => error,
            };

            // The device may have been rebound before failing
            self.refresh_is_playing();

            warn!(
                track_id = %id,
                attempt = retries + 1,
                error = %error,
                "Playback attempt failed"
            );
            self.emit(PlaybackEvent::Error {
                message: error.to_string(),
            });

            match self.retry.decide(&error, retries) {
                RetryDecision::Retry { attempt, backoff } => {
                    info!(
                        track_id = %id,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        "Retrying track"
                    );
                    retries = attempt;
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff).await;
                    }
                }
                RetryDecision::Skip => {
                    self.session.retry_count = 0;
                    self.set_state(PlaybackState::Failed);

                    match self.advance_cursor() {
                        Some(next) => {
                            info!(failed = %id, next = %next, "Skipping to next track");
                            id = next;
                            erase_queue = false;
                            retries = 0;
                        }
                        None => {
                            debug!(track_id = %id, "No next track after failure");
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Toggle play/pause on the bound device
    pub async fn pause_manager(&mut self) {
        let Some(device) = self.device.as_mut() else {
            debug!("Pause toggle without a device");
            return;
        };

        if device.is_paused() {
            if let Err(e) = device.play().await {
                warn!(error = %e, "Failed to resume playback");
                self.emit(PlaybackEvent::Error {
                    message: e.to_string(),
                });
            }
        } else {
            device.pause();
        }

        self.sync_playing_flag();
    }

    /// Move to the next queued track and play it
    ///
    /// No-op when the cursor is already on the last entry.
    pub async fn play_next(&mut self) {
        match self.advance_cursor() {
            Some(id) => self.play_music(id, false).await,
            None => debug!(cursor = ?self.queue.cursor(), "Already at last track"),
        }
    }

    /// Move to the previous queued track and play it
    ///
    /// No-op when the cursor is on the first entry.
    pub async fn play_previous(&mut self) {
        if !self.queue.retreat() {
            debug!(cursor = ?self.queue.cursor(), "Already at first track");
            return;
        }
        self.emit_queue_changed();

        if let Some(id) = self.queue.current().cloned() {
            self.play_music(id, false).await;
        }
    }

    /// Seek to `fraction` (0.0 - 1.0) of the loaded track
    pub fn seek_fraction(&mut self, fraction: f64) {
        let Some(device) = self.device.as_mut() else {
            debug!("Seek without a device");
            return;
        };
        let Some(duration) = device.duration() else {
            debug!("Seek before duration is known");
            return;
        };

        let fraction = if fraction.is_nan() { 0.0 } else { fraction.clamp(0.0, 1.0) };
        device.seek(duration.mul_f64(fraction));
        self.session.current_time_secs = device.position().as_secs_f64();
        self.emit(PlaybackEvent::position(
            self.session.current_time_secs,
            self.session.duration_secs,
        ));
    }

    /// Set device volume (clamped to 0.0 - 1.0)
    pub fn set_volume(&mut self, volume: f32) {
        let Some(device) = self.device.as_mut() else {
            debug!(volume, "Volume change without a device");
            return;
        };

        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        device.set_volume(volume);
        self.session.volume = device.volume();
        self.emit(PlaybackEvent::VolumeChanged {
            volume: self.session.volume,
        });
    }

    // ===== Queue =====

    /// Append `id` unless it is already queued
    pub fn add_to_queue(&mut self, id: TrackId) -> bool {
        let added = self.queue.push_unique(id);
        if added {
            self.emit_queue_changed();
        }
        added
    }

    /// Replace the queue with `ids` and play the first one
    ///
    /// An empty `ids` leaves everything untouched.
    pub async fn replace_queue(&mut self, ids: Vec<TrackId>) {
        let Some(first) = self.queue.replace(ids) else {
            debug!("Ignoring empty queue replacement");
            return;
        };

        self.expansion.reset();
        self.emit_queue_changed();
        self.play_music(first, false).await;
    }

    // ===== Search & history =====

    /// Search the media source, keeping the raw result list
    ///
    /// On failure the previous results are kept.
    pub async fn search(&mut self, query: &str) {
        match self.source.search(query, self.config.search_kind).await {
            Ok(results) => {
                debug!(query, results = results.len(), "Search completed");
                self.search_results = results;
                self.emit(PlaybackEvent::SearchResults {
                    query: query.to_string(),
                    results: self.search_results.clone(),
                });
            }
            Err(e) => {
                warn!(query, error = %e, "Search failed, keeping previous results");
            }
        }
    }

    /// Drop all history entries and persist the empty list
    pub async fn clear_history(&mut self) -> Result<()> {
        let result = self.history.clear().await;
        self.emit(PlaybackEvent::HistoryChanged { length: 0 });
        result
    }

    // ===== Device events =====

    /// Handle one device notification
    pub async fn handle_device_event(&mut self, event: DeviceEvent) {
        match event {
            DeviceEvent::TimeUpdate => {
                let Some(device) = self.device.as_ref() else {
                    return;
                };
                self.session.current_time_secs = device.position().as_secs_f64();
                self.emit(PlaybackEvent::position(
                    self.session.current_time_secs,
                    self.session.duration_secs,
                ));
            }
            DeviceEvent::MetadataLoaded => {
                let Some(device) = self.device.as_ref() else {
                    return;
                };
                let duration = device.duration().map_or(0.0, |d| d.as_secs_f64());
                let volume = device.volume();

                self.session.duration_secs = duration;
                if let Some(track) = self.session.current_track.as_mut() {
                    if track.duration_secs.is_none() && duration > 0.0 {
                        track.duration_secs = Some(duration);
                    }
                }
                if (self.session.volume - volume).abs() > f32::EPSILON {
                    self.session.volume = volume;
                    self.emit(PlaybackEvent::VolumeChanged { volume });
                }
                self.emit(PlaybackEvent::position(
                    self.session.current_time_secs,
                    duration,
                ));
            }
            DeviceEvent::Ended => {
                debug!(
                    track_id = ?self.session.current_track.as_ref().map(|t| &t.id),
                    "Track ended"
                );
                self.session.is_playing = false;
                self.session.current_track = None;
                self.set_state(PlaybackState::Ended);
                self.play_next().await;
            }
        }
    }

    /// Handle every device notification queued so far
    ///
    /// Returns the number handled. Does nothing once a service loop has
    /// taken over the event channel.
    pub async fn process_pending_events(&mut self) -> usize {
        let mut handled = 0;

        loop {
            let event = match self.device_events_rx.as_mut() {
                Some(rx) => rx.try_recv().ok(),
                None => None,
            };
            let Some(event) = event else {
                break;
            };

            self.handle_device_event(event).await;
            handled += 1;
        }

        handled
    }

    /// Hand the device event channel to an external loop
    pub fn take_device_events(&mut self) -> Option<DeviceEventReceiver> {
        self.device_events_rx.take()
    }

    // ===== Events =====

    /// Drain all pending events
    pub fn drain_events(&mut self) -> Vec<PlaybackEvent> {
        std::mem::take(&mut self.pending_events)
    }

    /// Check if there are pending events
    pub fn has_pending_events(&self) -> bool {
        !self.pending_events.is_empty()
    }

    // ===== Accessors =====

    pub fn session(&self) -> &PlaybackSession {
        &self.session
    }

    pub fn state(&self) -> PlaybackState {
        self.session.state
    }

    pub fn queue(&self) -> QueueSnapshot {
        QueueSnapshot {
            ids: self.queue.ids(),
            cursor: self.queue.cursor(),
        }
    }

    pub fn search_results(&self) -> &[TrackSummary] {
        &self.search_results
    }

    /// History, most recent first
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.history().entries()
    }

    pub fn now_playing(&self) -> Option<&NowPlaying> {
        self.now_playing.as_ref()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn has_device(&self) -> bool {
        self.device.is_some()
    }

    // ===== Internal =====

    /// One attempt at starting `id`
    async fn attempt(&mut self, id: &TrackId, erase_queue: bool) -> Result<()> {
        if erase_queue {
            self.queue.clear();
            self.expansion.reset();
            self.emit_queue_changed();
        }
        self.set_state(PlaybackState::Loading);

        let track = self.fetch_metadata(id).await;

        let locator = self
            .source
            .download(id, self.config.download_format)
            .await?;

        let device = self.bind_device(&locator);
        device.load().await?;
        device.play().await?;

        info!(track_id = %id, title = %track.title, "Playback started");
        self.sync_playing_flag();

        let now_playing = NowPlaying::from_track(&track);
        self.now_playing = Some(now_playing.clone());
        self.emit(PlaybackEvent::NowPlaying(now_playing));

        self.expand_suggestions(id).await;
        self.record_history(track).await;
        self.sync_playing_flag();

        Ok(())
    }

    /// Fetch metadata for `id`
    ///
    /// On failure the session keeps its current track and a bare snapshot
    /// is returned for history and media metadata.
    async fn fetch_metadata(&mut self, id: &TrackId) -> Track {
        match self.source.get_song(id).await {
            Ok(track) => {
                let previous_track_id = self.session.current_track.as_ref().map(|t| t.id.clone());
                if previous_track_id.as_ref() != Some(id) {
                    self.emit(PlaybackEvent::TrackChanged {
                        track_id: id.clone(),
                        previous_track_id,
                    });
                }
                self.session.current_track = Some(track.clone());
                track
            }
            Err(e) => {
                warn!(track_id = %id, error = %e, "Failed to fetch track metadata");
                Track::bare(id.clone())
            }
        }
    }

    /// Point the device at `locator`, creating it on first use
    fn bind_device(&mut self, locator: &StreamLocator) -> &mut Box<dyn AudioDevice> {
        let device = match self.device.take() {
            Some(mut device) => {
                device.set_source(locator);
                device
            }
            None => {
                debug!(url = %locator.url, "Creating audio device");
                self.listeners_attached = false;
                self.factory.create(locator)
            }
        };

        let device = self.device.insert(device);
        if !self.listeners_attached {
            device.attach_events(self.device_events_tx.clone());
            self.listeners_attached = true;
            debug!("Attached device event listeners");
        }

        device
    }

    async fn expand_suggestions(&mut self, played: &TrackId) {
        let plan = Expansion::plan(&self.queue);
        if !plan.needs_fetch() {
            return;
        }

        let queue_len = self.queue.len();
        if plan == Expansion::Extend && self.expansion.already_expanded(played, queue_len) {
            debug!(track_id = %played, queue_len, "Suggestions already fetched for this position");
            return;
        }

        match self.source.get_relatives(played).await {
            Ok(related) => {
                let evicted = plan.apply(&mut self.queue, played, &related);
                self.expansion.mark(played.clone(), queue_len);
                debug!(
                    track_id = %played,
                    related = related.len(),
                    evicted,
                    queue_len = self.queue.len(),
                    "Expanded queue with suggestions"
                );
                self.emit_queue_changed();
            }
            Err(e) => {
                warn!(track_id = %played, error = %e, "Failed to fetch suggestions");
            }
        }
    }

    async fn record_history(&mut self, track: Track) {
        let track_id = track.id.clone();
        if let Err(e) = self.history.record(track).await {
            warn!(track_id = %track_id, error = %e, "Failed to persist history");
        }
        self.emit(PlaybackEvent::HistoryChanged {
            length: self.history.history().len(),
        });
    }

    /// Advance the cursor and return the new current id
    fn advance_cursor(&mut self) -> Option<TrackId> {
        if !self.queue.advance() {
            return None;
        }
        self.emit_queue_changed();
        self.queue.current().cloned()
    }

    /// Mirror the device's paused flag into `is_playing`
    ///
    /// Returns the mirrored value, or `None` without a device.
    fn refresh_is_playing(&mut self) -> Option<bool> {
        let playing = !self.device.as_ref()?.is_paused();
        self.session.is_playing = playing;
        Some(playing)
    }

    /// Resync `is_playing` and the state from the device's paused flag
    fn sync_playing_flag(&mut self) {
        let Some(playing) = self.refresh_is_playing() else {
            return;
        };

        self.set_state(if playing {
            PlaybackState::Playing
        } else {
            PlaybackState::Paused
        });
    }

    fn set_state(&mut self, state: PlaybackState) {
        if self.session.state != state {
            self.session.state = state;
            self.emit(PlaybackEvent::StateChanged { state });
        }
    }

    fn emit_queue_changed(&mut self) {
        self.emit(PlaybackEvent::QueueChanged {
            length: self.queue.len(),
            cursor: self.queue.cursor(),
        });
    }

    fn emit(&mut self, event: PlaybackEvent) {
        self.pending_events.push(event);
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("session", &self.session)
            .field("queue", &self.queue)
            .field("history", &self.history)
            .field("has_device", &self.device.is_some())
            .finish_non_exhaustive()
    }
}
