use crate::config::DojoConfig;
use crate::error::PlaybackError;
use crate::events::{DojoEvent, EventBus};
use crate::model::{ContentId, RecordedVideo, Step, VideoMetadata};
use crate::playback::{
    LoadedVideo, PlaybackController, ReviewLayout, StepList, StepRow, StepSynchronizer, TrackSet,
    VideoTrack,
};
use crate::store::AppStore;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Platform views a review screen renders into
pub struct ReviewSurface {
    pub primary: Box<dyn VideoTrack>,
    pub recorded: Option<Box<dyn VideoTrack>>,
    pub step_list: Box<dyn StepList>,
}

/// One mount of the review screen: playback, step sync and the cached source
pub struct ReviewSession {
    content_id: ContentId,
    store: Arc<AppStore>,
    steps: Vec<Step>,
    playback: PlaybackController,
    synchronizer: StepSynchronizer,
    recorded_video: Option<RecordedVideo>,
    layout: ReviewLayout,
    event_bus: Option<Arc<EventBus>>,
}

impl ReviewSession {
    /// Mount the screen. Requests caching of the content video when no local
    /// copy is known yet; the source becomes available once the store updates.
    pub fn mount(
        content_id: ContentId,
        recorded_video: Option<RecordedVideo>,
        store: Arc<AppStore>,
        config: &DojoConfig,
        surface: ReviewSurface,
        event_bus: Option<Arc<EventBus>>,
    ) -> Result<Self, PlaybackError> {
        let video_uri = store
            .video_uri(content_id)
            .ok_or(PlaybackError::NoSource(content_id))?;

        if store.cached_video_path(content_id).is_none() {
            store.gen_cached_uri(content_id, &config.storage.base_uri, &video_uri);
        }

        // The review screen consumes the recording held in the store
        let stored = store
            .recorded_video()
            .filter(|video| video.content_id == content_id)
            .and_then(|_| store.take_recorded_video());
        let recorded_video = recorded_video.or(stored);

        let mut tracks = TrackSet::new(surface.primary);
        match (&recorded_video, surface.recorded) {
            (Some(_), Some(track)) => tracks = tracks.with_recorded(track),
            (Some(video), None) => warn!("No view to render recording {}", video.uri),
            (None, Some(_)) => debug!("Recorded track supplied without a recording; ignoring"),
            (None, None) => {}
        }

        let layout = ReviewLayout::compute(
            config.playback.screen_width,
            config.playback.video_height_ratio,
            tracks.has_recorded(),
        );
        let playback = PlaybackController::new(&config.playback, tracks)
            .with_max_display_dimension(config.capture.preview_max_dimension);

        info!(
            "Review mounted for content {} ({} tracks)",
            content_id,
            playback.tracks().len()
        );

        let mut session = Self {
            content_id,
            steps: store.steps_sorted(content_id),
            store,
            playback,
            synchronizer: StepSynchronizer::new(surface.step_list),
            recorded_video,
            layout,
            event_bus,
        };
        session.render_pass();
        Ok(session)
    }

    pub fn content_id(&self) -> ContentId {
        self.content_id
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn recorded_video(&self) -> Option<&RecordedVideo> {
        self.recorded_video.as_ref()
    }

    pub fn layout(&self) -> ReviewLayout {
        self.layout
    }

    pub fn playback(&self) -> &PlaybackController {
        &self.playback
    }

    pub fn playback_mut(&mut self) -> &mut PlaybackController {
        &mut self.playback
    }

    /// Local path of the primary video, once cached
    pub fn primary_source(&self) -> Option<PathBuf> {
        self.store.cached_video_path(self.content_id)
    }

    /// Wait until the primary source is cached.
    /// Returns `None` if the store goes away first.
    pub async fn wait_for_source(&self) -> Option<PathBuf> {
        let mut paths = self.store.subscribe_cached_paths();
        loop {
            if let Some(path) = paths.borrow_and_update().get(&self.content_id).cloned() {
                return Some(path);
            }
            if paths.changed().await.is_err() {
                return None;
            }
        }
    }

    pub fn on_load(&mut self, metadata: &VideoMetadata) -> LoadedVideo {
        self.playback.load(metadata)
    }

    pub fn on_progress(&mut self, current_time: f64) {
        self.playback.on_progress(current_time);
        self.render_pass();
    }

    pub fn on_end(&mut self) {
        self.playback.on_end();
        self.render_pass();
        self.publish(DojoEvent::PlaybackEnded {
            content_id: self.content_id,
        });
    }

    pub fn toggle_play_pause(&mut self) -> bool {
        let paused = self.playback.toggle_play_pause();
        self.render_pass();
        paused
    }

    pub fn seek(&mut self, fraction: f64) {
        self.playback.seek(fraction);
        self.render_pass();
    }

    /// Jump every track to the start of the selected step
    pub fn select_step(&mut self, index: usize) -> Option<f64> {
        let target = self.steps.get(index)?.seek_target();
        debug!("Step {} selected; seeking to {:.1}s", index + 1, target);
        self.playback.seek_to(target);
        self.render_pass();
        Some(target)
    }

    /// Recompute the active step and keep the list scrolled to it
    pub fn render_pass(&mut self) -> Option<usize> {
        let position = self.playback.position_seconds();
        let changed = self.synchronizer.sync(&self.steps, position)?;
        self.publish(DojoEvent::ActiveStepChanged {
            content_id: self.content_id,
            index: changed,
        });
        Some(changed)
    }

    pub fn rows(&self) -> Vec<StepRow> {
        StepSynchronizer::rows(&self.steps, self.playback.position_seconds())
    }

    fn publish(&self, event: DojoEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.publish(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheResolver;
    use crate::error::CacheError;
    use crate::model::{Content, NaturalSize, Orientation};
    use crate::playback::{MockStepList, MockTrack};
    use async_trait::async_trait;
    use std::time::Duration;

    struct FixedResolver;

    #[async_trait]
    impl CacheResolver for FixedResolver {
        async fn resolve(
            &self,
            content_id: ContentId,
            _remote_url: &str,
        ) -> Result<PathBuf, CacheError> {
            Ok(PathBuf::from(format!("/cache/{}/video.mp4", content_id)))
        }
    }

    fn create_store() -> Arc<AppStore> {
        let store = Arc::new(AppStore::new(Arc::new(FixedResolver)));
        store.set_catalog(vec![Content {
            id: ContentId(1),
            title: "Taegeuk Il Jang".to_string(),
            video_uri: "forms/taegeuk 1.mp4".to_string(),
            thumbnail_path: None,
            steps: vec![
                Step::new(2, "Low block").with_range(Some(30.0), Some(60.0)),
                Step::new(1, "Ready").with_range(Some(0.0), Some(30.0)),
            ],
        }]);
        store
    }

    fn surface(primary: Arc<MockTrack>, recorded: Option<Arc<MockTrack>>) -> ReviewSurface {
        ReviewSurface {
            primary: Box::new(primary),
            recorded: recorded.map(|track| Box::new(track) as Box<dyn VideoTrack>),
            step_list: Box::new(MockStepList::new(10)),
        }
    }

    fn metadata() -> VideoMetadata {
        VideoMetadata {
            duration: 60.0,
            natural_size: NaturalSize {
                width: 1280.0,
                height: 720.0,
                orientation: Orientation::Landscape,
            },
        }
    }

    #[tokio::test]
    async fn test_mount_requests_cache_and_source_appears() {
        let store = create_store();
        let session = ReviewSession::mount(
            ContentId(1),
            None,
            Arc::clone(&store),
            &DojoConfig::default(),
            surface(Arc::new(MockTrack::new()), None),
            None,
        )
        .unwrap();

        let path = tokio::time::timeout(Duration::from_secs(1), session.wait_for_source())
            .await
            .unwrap();
        assert_eq!(path, Some(PathBuf::from("/cache/1/video.mp4")));
        assert_eq!(session.primary_source(), path);
    }

    #[tokio::test]
    async fn test_unknown_content_has_no_source() {
        let store = create_store();
        let result = ReviewSession::mount(
            ContentId(42),
            None,
            store,
            &DojoConfig::default(),
            surface(Arc::new(MockTrack::new()), None),
            None,
        );
        assert!(matches!(result, Err(PlaybackError::NoSource(ContentId(42)))));
    }

    #[tokio::test]
    async fn test_recording_consumed_from_store_and_stacked() {
        let store = create_store();
        store.add_recorded_video(RecordedVideo {
            uri: "file:///rec.mp4".to_string(),
            content_id: ContentId(1),
        });

        let recorded = Arc::new(MockTrack::new());
        let primary = Arc::new(MockTrack::new());
        let mut session = ReviewSession::mount(
            ContentId(1),
            None,
            Arc::clone(&store),
            &DojoConfig::default(),
            surface(Arc::clone(&primary), Some(Arc::clone(&recorded))),
            None,
        )
        .unwrap();

        assert_eq!(session.recorded_video().unwrap().uri, "file:///rec.mp4");
        assert!(store.recorded_video().is_none());
        let layout = session.layout();
        assert_eq!(layout.full_height, layout.track_height * 2.0);

        session.on_load(&metadata());
        assert_eq!(session.select_step(1), Some(30.0));
        assert_eq!(primary.seeks(), vec![30.0]);
        assert_eq!(recorded.seeks(), vec![30.0]);
    }

    #[tokio::test]
    async fn test_progress_drives_active_step() {
        let store = create_store();
        let event_bus = Arc::new(EventBus::new(16));
        let mut events = event_bus.subscribe();
        let mut session = ReviewSession::mount(
            ContentId(1),
            None,
            store,
            &DojoConfig::default(),
            surface(Arc::new(MockTrack::new()), None),
            Some(Arc::clone(&event_bus)),
        )
        .unwrap();

        assert_eq!(session.steps()[0].description, "Ready");
        session.on_load(&metadata());
        session.on_progress(10.0);
        assert!(session.rows()[0].active);

        session.on_progress(30.0);
        assert!(session.rows()[1].active);

        let mut changed = None;
        while let Ok(event) = events.try_recv() {
            if let DojoEvent::ActiveStepChanged { index, .. } = event {
                changed = Some(index);
            }
        }
        assert_eq!(changed, Some(1));

        session.on_end();
        assert!(session.playback().state().paused);
        assert!(!session.toggle_play_pause());
        assert_eq!(session.playback().state().progress, 0.0);
        assert!(session.rows()[0].active);
    }

    #[tokio::test]
    async fn test_mount_scrolls_to_first_step() {
        let event_bus = Arc::new(EventBus::new(16));
        let mut events = event_bus.subscribe();
        let list = Arc::new(MockStepList::new(10));
        let session = ReviewSession::mount(
            ContentId(1),
            None,
            create_store(),
            &DojoConfig::default(),
            ReviewSurface {
                primary: Box::new(MockTrack::new()),
                recorded: None,
                step_list: Box::new(Arc::clone(&list)),
            },
            Some(Arc::clone(&event_bus)),
        )
        .unwrap();

        assert_eq!(list.scrolls(), vec![0]);
        assert_eq!(session.synchronizer.current_index(), 0);
        assert!(matches!(
            events.try_recv(),
            Ok(DojoEvent::ActiveStepChanged { index: 0, .. })
        ));
    }
}
