use crate::model::{ContentId, MediaArtifact, RecordedVideo};
use crate::navigation::{Navigator, Route};
use crate::store::AppStore;
use std::sync::Arc;
use tracing::info;

/// Hands a kept capture to the review screen.
///
/// The store write always happens before navigation so the review screen can
/// read the recording as soon as it mounts.
#[derive(Clone)]
pub struct RecordedVideoDispatcher {
    store: Arc<AppStore>,
    navigator: Arc<dyn Navigator>,
}

impl RecordedVideoDispatcher {
    pub fn new(store: Arc<AppStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self { store, navigator }
    }

    pub fn dispatch(&self, content_id: ContentId, artifact: MediaArtifact) -> RecordedVideo {
        let video = RecordedVideo::from_artifact(artifact, content_id);
        info!("Dispatching recording {} for content {}", video.uri, content_id);

        self.store.add_recorded_video(video.clone());
        self.navigator.navigate(Route::Review {
            content_id,
            recorded_video: Some(video.clone()),
            should_cancel_video: false,
        });

        video
    }
}
