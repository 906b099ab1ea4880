use crate::cache::CacheResolver;
use crate::error::Result;
use crate::events::{DojoEvent, EventBus};
use crate::model::{Content, ContentId, RecordedVideo, Step};
use crate::urls::remote_video_url;
use parking_lot::{Mutex, RwLock};
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Shared application state.
///
/// Each field has a single writer: the catalog is written by the loader, the
/// recorded-video slot by the dispatcher, and the cached-path map by cache
/// resolution. Readers are the screens.
pub struct AppStore {
    catalog: RwLock<HashMap<ContentId, Content>>,
    recorded_video: Mutex<Option<RecordedVideo>>,
    cached_paths: watch::Sender<HashMap<ContentId, PathBuf>>,
    pending_cache: Mutex<HashSet<ContentId>>,
    resolver: Arc<dyn CacheResolver>,
    event_bus: Option<Arc<EventBus>>,
}

impl AppStore {
    pub fn new(resolver: Arc<dyn CacheResolver>) -> Self {
        let (cached_paths, _) = watch::channel(HashMap::new());
        Self {
            catalog: RwLock::new(HashMap::new()),
            recorded_video: Mutex::new(None),
            cached_paths,
            pending_cache: Mutex::new(HashSet::new()),
            resolver,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    // ---- catalog ----

    pub fn set_catalog(&self, contents: Vec<Content>) {
        let mut catalog = self.catalog.write();
        catalog.clear();
        catalog.extend(contents.into_iter().map(|content| (content.id, content)));
        info!("Catalog loaded with {} content items", catalog.len());
    }

    /// Load a JSON array of contents from disk
    pub async fn load_catalog<P: AsRef<Path>>(&self, path: P) -> Result<usize> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let contents: Vec<Content> = serde_json::from_str(&raw)?;
        let count = contents.len();
        self.set_catalog(contents);
        Ok(count)
    }

    pub fn content(&self, content_id: ContentId) -> Option<Content> {
        self.catalog.read().get(&content_id).cloned()
    }

    pub fn content_ids(&self) -> Vec<ContentId> {
        let mut ids: Vec<_> = self.catalog.read().keys().copied().collect();
        ids.sort();
        ids
    }

    /// Steps of a content item ordered by start time, open starts first, ties by id
    pub fn steps_sorted(&self, content_id: ContentId) -> Vec<Step> {
        let mut steps = self
            .catalog
            .read()
            .get(&content_id)
            .map(|content| content.steps.clone())
            .unwrap_or_default();
        steps.sort_by(|a, b| compare_start(a, b).then_with(|| a.id.cmp(&b.id)));
        steps
    }

    /// Storage-relative path of a content video
    pub fn video_uri(&self, content_id: ContentId) -> Option<String> {
        self.catalog
            .read()
            .get(&content_id)
            .map(|content| content.video_uri.clone())
    }

    // ---- recorded video slot ----

    pub fn add_recorded_video(&self, video: RecordedVideo) {
        debug!("Storing recorded video {} for content {}", video.uri, video.content_id);
        let uri = video.uri.clone();
        let content_id = video.content_id;
        *self.recorded_video.lock() = Some(video);
        self.publish(DojoEvent::RecordedVideoStored { content_id, uri });
    }

    pub fn recorded_video(&self) -> Option<RecordedVideo> {
        self.recorded_video.lock().clone()
    }

    /// Hand the recorded video to its consumer, emptying the slot
    pub fn take_recorded_video(&self) -> Option<RecordedVideo> {
        self.recorded_video.lock().take()
    }

    // ---- cached paths ----

    pub fn cached_video_path(&self, content_id: ContentId) -> Option<PathBuf> {
        self.cached_paths.borrow().get(&content_id).cloned()
    }

    /// Observe the cached-path map as it changes
    pub fn subscribe_cached_paths(&self) -> watch::Receiver<HashMap<ContentId, PathBuf>> {
        self.cached_paths.subscribe()
    }

    pub fn set_cached_path(&self, content_id: ContentId, path: PathBuf) {
        self.cached_paths.send_modify(|paths| {
            paths.insert(content_id, path.clone());
        });
        self.publish(DojoEvent::CachedPathResolved { content_id, path });
    }

    /// Resolve a local copy of `base_uri/remote_uri` in the background.
    ///
    /// The outcome is observed through [`AppStore::cached_video_path`]. Returns
    /// `None` when the path is already known or a resolution is in flight.
    pub fn gen_cached_uri(
        self: &Arc<Self>,
        content_id: ContentId,
        base_uri: &str,
        remote_uri: &str,
    ) -> Option<JoinHandle<()>> {
        if self.cached_video_path(content_id).is_some() {
            debug!("Content {} already cached", content_id);
            return None;
        }
        if !self.pending_cache.lock().insert(content_id) {
            debug!("Cache resolution for content {} already in flight", content_id);
            return None;
        }

        let url = remote_video_url(base_uri, remote_uri);
        let store = Arc::clone(self);

        Some(tokio::spawn(async move {
            let outcome = store.resolver.resolve(content_id, &url).await;
            store.pending_cache.lock().remove(&content_id);

            match outcome {
                Ok(path) => {
                    info!("Content {} cached at {}", content_id, path.display());
                    store.set_cached_path(content_id, path);
                }
                Err(e) => {
                    warn!("Failed to cache content {} from {}: {}", content_id, url, e);
                    store.publish(DojoEvent::SystemError {
                        component: "cache_resolver".to_string(),
                        error: e.to_string(),
                    });
                }
            }
        }))
    }

    fn publish(&self, event: DojoEvent) {
        if let Some(bus) = &self.event_bus {
            let _ = bus.publish(event);
        }
    }
}

fn compare_start(a: &Step, b: &Step) -> Ordering {
    match (a.start_time, b.start_time) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.total_cmp(&y),
    }
}
