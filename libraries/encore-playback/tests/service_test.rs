//! Playback service actor tests
//!
//! Exercise the controller through a spawned service and its handle.


use encore_core::TrackId;
use encore_playback::{
    DeviceEvent, PlaybackError, PlaybackEvent, PlaybackService, PlaybackState,
};
use std::time::Duration;
use test_helpers::{harness, ids, summaries, StubSource};
use tokio::sync::broadcast;
use tokio::time::timeout;

async fn wait_for<F>(events: &mut broadcast::Receiver<PlaybackEvent>, mut predicate: F) -> PlaybackEvent
where
    F: FnMut(&PlaybackEvent) -> bool,
{
    timeout(Duration::from_secs(5), async {
        loop {
            match events.recv().await {
                Ok(event) if predicate(&event) => return event,
                Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => panic!("event stream closed"),
            }
        }
    })
    .await
    .expect("timed out waiting for event")
}

#[tokio::test]
async fn handle_drives_playback_and_reads_state() {
    let source = StubSource::new().with_relatives("A", &["B", "C"]);
    let h = harness(source).await;
    let handle = PlaybackService::spawn(h.controller);

    handle.play_music("A", true).await.unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert!(snapshot.is_playing);
    assert_eq!(snapshot.state, PlaybackState::Playing);

    let queue = handle.queue().await.unwrap();
    assert_eq!(queue.ids, ids(&["A", "B", "C"]));
    assert_eq!(queue.cursor, Some(0));

    handle.play_next().await.unwrap();
    assert_eq!(handle.queue().await.unwrap().cursor, Some(1));

    let history = handle.history().await.unwrap();
    assert_eq!(history[0].id().as_str(), "B");

    handle.shutdown().await.unwrap();
}

#[tokio::test]
async fn subscribers_receive_controller_events() {
    let h = harness(StubSource::new()).await;
    let handle = PlaybackService::spawn(h.controller);
    let mut events = handle.subscribe();

    handle.play_music("A", false).await.unwrap();

    let event = wait_for(&mut events, |e| matches!(e, PlaybackEvent::NowPlaying(_))).await;
    match event {
        PlaybackEvent::NowPlaying(now) => assert_eq!(now.track_id, TrackId::new("A")),
        other => panic!("unexpected event {other:?}"),
    }
}

#[tokio::test]
async fn device_events_flow_through_the_loop() {
    let h = harness(StubSource::new()).await;
    let device = h.device.clone();
    let handle = PlaybackService::spawn(h.controller);
    let mut events = handle.subscribe();

    handle.replace_queue(ids(&["A", "B"])).await.unwrap();
    assert!(device.emit(DeviceEvent::Ended));

    wait_for(&mut events, |e| {
        matches!(e, PlaybackEvent::TrackChanged { track_id, .. } if track_id.as_str() == "B")
    })
    .await;

    // The Ended event is fully handled before the next command is served
    wait_for(&mut events, |e| {
        matches!(e, PlaybackEvent::HistoryChanged { length: 2 })
    })
    .await;
    assert_eq!(handle.queue().await.unwrap().cursor, Some(1));
}

#[tokio::test]
async fn queue_and_search_commands_reply() {
    let source = StubSource::new();
    source.set_search_results(Some(summaries(&["X"])));
    let h = harness(source).await;
    let handle = PlaybackService::spawn(h.controller);

    let results = handle.search("anything").await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(handle.search_results().await.unwrap(), results);

    assert!(handle.add_to_queue("X").await.unwrap());
    assert!(!handle.add_to_queue("X").await.unwrap());

    handle.play_music("X", false).await.unwrap();
    handle.set_volume(0.4).await.unwrap();
    handle.pause_manager().await.unwrap();

    let snapshot = handle.snapshot().await.unwrap();
    assert_eq!(snapshot.volume, 0.4);
    assert!(!snapshot.is_playing);

    handle.clear_history().await.unwrap();
    assert!(handle.history().await.unwrap().is_empty());
}

#[tokio::test]
async fn closed_service_reports_service_closed() {
    let h = harness(StubSource::new()).await;
    let handle = PlaybackService::spawn(h.controller);
    let other = handle.clone();

    handle.shutdown().await.unwrap();

    assert!(matches!(
        other.play_next().await,
        Err(PlaybackError::ServiceClosed)
    ));
    assert!(matches!(other.snapshot().await, Err(PlaybackError::ServiceClosed)));
    assert!(other.is_closed());
}

#[tokio::test]
async fn shutdown_is_served_after_earlier_commands() {
    let h = harness(StubSource::new()).await;
    let device = h.device.clone();
    let handle = PlaybackService::spawn(h.controller);
    let other = handle.clone();

    let (played, stopped) = tokio::join!(other.play_music("A", false), handle.shutdown());

    played.unwrap();
    stopped.unwrap();
    assert_eq!(device.play_attempts("A"), 1);
    assert!(handle.is_closed());
    assert!(matches!(
        other.add_to_queue("B").await,
        Err(PlaybackError::ServiceClosed)
    ));
}
