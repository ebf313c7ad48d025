//! Playback service actor
//!
//! Runs a [`PlaybackController`] on its own task. Caller commands and device
//! notifications share one loop, so every operation completes before the
//! next one starts. Controller events are fanned out on a broadcast channel.

use crate::{
    controller::PlaybackController,
    device::{DeviceEvent, DeviceEventReceiver},
    error::{PlaybackError, Result},
    events::PlaybackEvent,
    history::HistoryEntry,
    types::{PlaybackSession, QueueSnapshot},
};
use encore_core::{TrackId, TrackSummary};
use std::ops::ControlFlow;
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{debug, info};

/// Commands buffered before callers start waiting
const COMMAND_BUFFER: usize = 64;

/// Events buffered per subscriber before it starts lagging
const EVENT_BUFFER: usize = 256;

type Reply<T> = oneshot::Sender<T>;

/// Commands sent to the playback task
#[derive(Debug)]
pub enum PlaybackCommand {
    /// Play a track, optionally clearing the queue
    PlayMusic {
        id: TrackId,
        erase_queue: bool,
        reply: Reply<()>,
    },

    /// Toggle play/pause
    PauseManager(Reply<()>),

    /// Skip to next track
    PlayNext(Reply<()>),

    /// Go to previous track
    PlayPrevious(Reply<()>),

    /// Seek to a fraction of the track
    SeekFraction(f64, Reply<()>),

    /// Set volume (0.0 - 1.0)
    SetVolume(f32, Reply<()>),

    /// Append a track unless already queued
    AddToQueue(TrackId, Reply<bool>),

    /// Replace the queue and play its first entry
    ReplaceQueue(Vec<TrackId>, Reply<()>),

    /// Search and store the results
    Search(String, Reply<Vec<TrackSummary>>),

    /// Clear persisted history
    ClearHistory(Reply<Result<()>>),

    /// Read the session state
    Snapshot(Reply<PlaybackSession>),

    /// Read the queue
    Queue(Reply<QueueSnapshot>),

    /// Read the history
    History(Reply<Vec<HistoryEntry>>),

    /// Read the last search results
    SearchResults(Reply<Vec<TrackSummary>>),

    /// Stop the loop
    Shutdown(Reply<()>),
}

/// Task owning the controller
pub struct PlaybackService {
    controller: PlaybackController,
    commands: mpsc::Receiver<PlaybackCommand>,
    device_events: Option<DeviceEventReceiver>,
    events: broadcast::Sender<PlaybackEvent>,
}

impl PlaybackService {
    /// Spawn the service loop on the current tokio runtime
    pub fn spawn(mut controller: PlaybackController) -> PlaybackHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let (event_tx, _) = broadcast::channel(EVENT_BUFFER);

        let service = Self {
            device_events: controller.take_device_events(),
            controller,
            commands: command_rx,
            events: event_tx.clone(),
        };
        tokio::spawn(service.run());

        PlaybackHandle {
            commands: command_tx,
            events: event_tx,
        }
    }

    async fn run(mut self) {
        info!("Playback service started");
        let mut shutdown_reply = None;

        loop {
            tokio::select! {
                command = self.commands.recv() => {
                    let Some(command) = command else {
                        break;
                    };
                    if let ControlFlow::Break(reply) = self.handle(command).await {
                        shutdown_reply = Some(reply);
                        break;
                    }
                }
                Some(event) = next_device_event(&mut self.device_events) => {
                    self.controller.handle_device_event(event).await;
                }
            }

            self.publish();
        }

        self.publish();
        info!("Playback service stopped");

        // Close the command channel before acknowledging shutdown
        drop(self);
        if let Some(reply) = shutdown_reply {
            let _ = reply.send(());
        }
    }

    /// Serve one command; `Break` carries the shutdown acknowledgement
    async fn handle(&mut self, command: PlaybackCommand) -> ControlFlow<Reply<()>> {
        debug!(?command, "Handling playback command");

        // Replies are dropped silently when the caller stopped waiting
        match command {
            PlaybackCommand::PlayMusic {
                id,
                erase_queue,
                reply,
            } => {
                self.controller.play_music(id, erase_queue).await;
                let _ = reply.send(());
            }
            PlaybackCommand::PauseManager(reply) => {
                self.controller.pause_manager().await;
                let _ = reply.send(());
            }
            PlaybackCommand::PlayNext(reply) => {
                self.controller.play_next().await;
                let _ = reply.send(());
            }
            PlaybackCommand::PlayPrevious(reply) => {
                self.controller.play_previous().await;
                let _ = reply.send(());
            }
            PlaybackCommand::SeekFraction(fraction, reply) => {
                self.controller.seek_fraction(fraction);
                let _ = reply.send(());
            }
            PlaybackCommand::SetVolume(volume, reply) => {
                self.controller.set_volume(volume);
                let _ = reply.send(());
            }
            PlaybackCommand::AddToQueue(id, reply) => {
                let _ = reply.send(self.controller.add_to_queue(id));
            }
            PlaybackCommand::ReplaceQueue(ids, reply) => {
                self.controller.replace_queue(ids).await;
                let _ = reply.send(());
            }
            PlaybackCommand::Search(query, reply) => {
                self.controller.search(&query).await;
                let _ = reply.send(self.controller.search_results().to_vec());
            }
            PlaybackCommand::ClearHistory(reply) => {
                let _ = reply.send(self.controller.clear_history().await);
            }
            PlaybackCommand::Snapshot(reply) => {
                let _ = reply.send(self.controller.session().clone());
            }
            PlaybackCommand::Queue(reply) => {
                let _ = reply.send(self.controller.queue());
            }
            PlaybackCommand::History(reply) => {
                let _ = reply.send(self.controller.history());
            }
            PlaybackCommand::SearchResults(reply) => {
                let _ = reply.send(self.controller.search_results().to_vec());
            }
            PlaybackCommand::Shutdown(reply) => return ControlFlow::Break(reply),
        }

        ControlFlow::Continue(())
    }

    /// Broadcast everything the controller emitted
    fn publish(&mut self) {
        for event in self.controller.drain_events() {
            // No subscribers is fine
            let _ = self.events.send(event);
        }
    }
}

async fn next_device_event(events: &mut Option<DeviceEventReceiver>) -> Option<DeviceEvent> {
    match events {
        Some(events) => events.recv().await,
        None => std::future::pending().await,
    }
}

/// Cloneable handle to a running [`PlaybackService`]
///
/// Every method waits until the service has finished the operation.
/// Once the service is gone they return [`PlaybackError::ServiceClosed`].
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    commands: mpsc::Sender<PlaybackCommand>,
    events: broadcast::Sender<PlaybackEvent>,
}

impl PlaybackHandle {
    pub async fn play_music(&self, id: impl Into<TrackId>, erase_queue: bool) -> Result<()> {
        let id = id.into();
        self.request(|reply| PlaybackCommand::PlayMusic {
            id,
            erase_queue,
            reply,
        })
        .await
    }

    pub async fn pause_manager(&self) -> Result<()> {
        self.request(PlaybackCommand::PauseManager).await
    }

    pub async fn play_next(&self) -> Result<()> {
        self.request(PlaybackCommand::PlayNext).await
    }

    pub async fn play_previous(&self) -> Result<()> {
        self.request(PlaybackCommand::PlayPrevious).await
    }

    pub async fn seek_fraction(&self, fraction: f64) -> Result<()> {
        self.request(|reply| PlaybackCommand::SeekFraction(fraction, reply))
            .await
    }

    pub async fn set_volume(&self, volume: f32) -> Result<()> {
        self.request(|reply| PlaybackCommand::SetVolume(volume, reply))
            .await
    }

    /// Returns whether the track was added
    pub async fn add_to_queue(&self, id: impl Into<TrackId>) -> Result<bool> {
        let id = id.into();
        self.request(|reply| PlaybackCommand::AddToQueue(id, reply))
            .await
    }

    pub async fn replace_queue(&self, ids: Vec<TrackId>) -> Result<()> {
        self.request(|reply| PlaybackCommand::ReplaceQueue(ids, reply))
            .await
    }

    /// Search and return the stored results
    ///
    /// A failed search returns the previous results.
    pub async fn search(&self, query: impl Into<String>) -> Result<Vec<TrackSummary>> {
        let query = query.into();
        self.request(|reply| PlaybackCommand::Search(query, reply))
            .await
    }

    pub async fn clear_history(&self) -> Result<()> {
        self.request(PlaybackCommand::ClearHistory).await?
    }

    pub async fn snapshot(&self) -> Result<PlaybackSession> {
        self.request(PlaybackCommand::Snapshot).await
    }

    pub async fn queue(&self) -> Result<QueueSnapshot> {
        self.request(PlaybackCommand::Queue).await
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        self.request(PlaybackCommand::History).await
    }

    pub async fn search_results(&self) -> Result<Vec<TrackSummary>> {
        self.request(PlaybackCommand::SearchResults).await
    }

    /// Subscribe to controller events
    pub fn subscribe(&self) -> broadcast::Receiver<PlaybackEvent> {
        self.events.subscribe()
    }

    /// Stop the service loop and wait for it to finish
    pub async fn shutdown(&self) -> Result<()> {
        self.request(PlaybackCommand::Shutdown).await
    }

    /// Whether the service loop is gone
    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    async fn request<T>(&self, command: impl FnOnce(Reply<T>) -> PlaybackCommand) -> Result<T> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(command(reply_tx))
            .await
            .map_err(|_| PlaybackError::ServiceClosed)?;
        reply_rx.await.map_err(|_| PlaybackError::ServiceClosed)
    }
}
