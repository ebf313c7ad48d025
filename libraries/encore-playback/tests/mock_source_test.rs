//! Call expectations on the media source
//!
//! Uses a mockall double so the number and shape of source calls made by
//! the controller can be asserted exactly.


use async_trait::async_trait;
use encore_core::{AudioFormat, CoreError, MediaSource, SearchKind, StreamLocator, Track, TrackId, TrackSummary};
use encore_playback::{HistoryStore, PlaybackController, SessionConfig};
use encore_storage::MemoryStore;
use mockall::{mock, predicate::eq};
use std::sync::Arc;
use test_helpers::{ids, summaries, test_config, url_for, DeviceProbe};

mock! {
    pub Source {}

    #[async_trait]
    impl MediaSource for Source {
        async fn search(&self, query: &str, kind: SearchKind) -> encore_core::Result<Vec<TrackSummary>>;
        async fn get_song(&self, id: &TrackId) -> encore_core::Result<Track>;
        async fn get_relatives(&self, id: &TrackId) -> encore_core::Result<Vec<TrackSummary>>;
        async fn download(&self, id: &TrackId, format: AudioFormat) -> encore_core::Result<StreamLocator>;
    }
}

fn with_metadata_and_streams(source: &mut MockSource) {
    source
        .expect_get_song()
        .returning(|id| Ok(Track::bare(id.clone())));
    source
        .expect_download()
        .returning(|id, format| Ok(StreamLocator::new(url_for(id.as_str()), format)));
}

async fn controller(config: SessionConfig, source: MockSource) -> (PlaybackController, DeviceProbe) {
    test_helpers::init_tracing();
    let device = DeviceProbe::new();
    let history = HistoryStore::load(Arc::new(MemoryStore::new()), "played", 100).await;
    let controller = PlaybackController::new(config, Arc::new(source), device.factory(), history);
    (controller, device)
}

#[tokio::test]
async fn relatives_fetched_once_at_unchanged_boundary() {
    let mut source = MockSource::new();
    with_metadata_and_streams(&mut source);
    source
        .expect_get_relatives()
        .with(eq(TrackId::new("A")))
        .times(1)
        .returning(|_| Ok(Vec::new()));

    let (mut controller, _device) = controller(test_config(), source).await;

    controller.replace_queue(ids(&["A"])).await;
    controller.play_music(TrackId::new("A"), false).await;
    controller.play_music(TrackId::new("A"), false).await;

    assert_eq!(controller.history().len(), 3);
}

#[tokio::test]
async fn download_uses_configured_format() {
    let mut source = MockSource::new();
    source
        .expect_get_song()
        .returning(|id| Ok(Track::bare(id.clone())));
    source
        .expect_download()
        .withf(|id, format| id.as_str() == "A" && *format == AudioFormat::Opus)
        .times(1)
        .returning(|id, format| Ok(StreamLocator::new(url_for(id.as_str()), format)));
    source
        .expect_get_relatives()
        .returning(|_| Ok(summaries(&["B"])));

    let config = SessionConfig {
        download_format: AudioFormat::Opus,
        ..test_config()
    };
    let (mut controller, _device) = controller(config, source).await;

    controller.play_music(TrackId::new("A"), true).await;

    assert_eq!(controller.queue().ids, ids(&["A", "B"]));
}

#[tokio::test]
async fn failed_start_never_asks_for_suggestions() {
    let mut source = MockSource::new();
    source
        .expect_get_song()
        .returning(|id| Ok(Track::bare(id.clone())));
    source
        .expect_download()
        .times(1)
        .returning(|_, _| Err(CoreError::unavailable("blocked")));
    source.expect_get_relatives().never();

    let (mut controller, device) = controller(test_config(), source).await;

    controller.play_music(TrackId::new("A"), true).await;

    assert_eq!(device.created(), 0);
    assert!(controller.history().is_empty());
}

#[tokio::test]
async fn search_uses_configured_kind() {
    let mut source = MockSource::new();
    source
        .expect_search()
        .withf(|query, kind| query == "daft punk" && *kind == SearchKind::Album)
        .times(1)
        .returning(|_, _| Ok(summaries(&["discovery"])));

    let config = SessionConfig {
        search_kind: SearchKind::Album,
        ..test_config()
    };
    let (mut controller, _device) = controller(config, source).await;

    controller.search("daft punk").await;

    assert_eq!(controller.search_results()[0].id.as_str(), "discovery");
}
