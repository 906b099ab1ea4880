use super::types::{ComponentState, ShutdownReason};
use crate::cache::DirectoryCacheResolver;
use crate::capture::{CaptureController, MockCamera};
use crate::config::DojoConfig;
use crate::dispatch::RecordedVideoDispatcher;
use crate::error::{DojoError, Result};
use crate::events::EventBus;
use crate::keyboard_input::KeyboardInputHandler;
use crate::model::{ContentId, RecordedVideo};
use crate::navigation::{NavigationLog, Navigator, Route};
use crate::review::{ReviewSession, ReviewSurface};
use crate::store::AppStore;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{oneshot, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Wires the store, navigation, camera and screens together
pub struct DojoOrchestrator {
    pub(super) config: DojoConfig,
    pub(super) event_bus: Arc<EventBus>,
    pub(super) store: Arc<AppStore>,
    pub(super) navigator: Arc<NavigationLog>,
    pub(super) camera: Arc<MockCamera>,

    pub(super) keyboard_handler: Option<KeyboardInputHandler>,
    pub(super) keyboard_enabled: bool,

    // Lifecycle management
    pub(super) component_states: Arc<Mutex<HashMap<String, ComponentState>>>,
    pub(super) shutdown_sender: Option<oneshot::Sender<ShutdownReason>>,
    pub(super) shutdown_receiver: Option<oneshot::Receiver<ShutdownReason>>,
    pub(super) cancellation_token: CancellationToken,
}

impl DojoOrchestrator {
    /// Create a new orchestrator with the given configuration
    pub fn new(config: DojoConfig) -> Self {
        let event_bus = Arc::new(EventBus::new(config.system.event_bus_capacity));
        let resolver = Arc::new(DirectoryCacheResolver::new(&config.storage.cache_dir));
        let store = Arc::new(AppStore::new(resolver).with_event_bus(Arc::clone(&event_bus)));
        let camera = Arc::new(MockCamera::new(config.storage.cache_dir.clone()));
        let (shutdown_sender, shutdown_receiver) = oneshot::channel();

        Self {
            config,
            event_bus,
            store,
            navigator: Arc::new(NavigationLog::starting_at(Route::ContentList)),
            camera,
            keyboard_handler: None,
            keyboard_enabled: false,
            component_states: Arc::new(Mutex::new(HashMap::new())),
            shutdown_sender: Some(shutdown_sender),
            shutdown_receiver: Some(shutdown_receiver),
            cancellation_token: CancellationToken::new(),
        }
    }

    /// Enable or disable the keyboard driver used by [`DojoOrchestrator::run`]
    pub fn set_keyboard_enabled(&mut self, enabled: bool) {
        self.keyboard_enabled = enabled;
    }

    pub fn config(&self) -> &DojoConfig {
        &self.config
    }

    pub fn event_bus(&self) -> Arc<EventBus> {
        Arc::clone(&self.event_bus)
    }

    pub fn store(&self) -> Arc<AppStore> {
        Arc::clone(&self.store)
    }

    pub fn navigator(&self) -> Arc<NavigationLog> {
        Arc::clone(&self.navigator)
    }

    pub fn camera(&self) -> Arc<MockCamera> {
        Arc::clone(&self.camera)
    }

    /// Navigate to the camera screen for `content_id` and build its controller
    pub fn open_camera(
        &self,
        content_id: ContentId,
        max_length: Option<f64>,
    ) -> Result<CaptureController> {
        self.require_content(content_id)?;

        self.navigator.navigate(Route::Camera {
            content_id,
            max_length,
        });
        let controller = self.camera_controller(content_id);
        controller.set_max_length(max_length);
        Ok(controller)
    }

    /// Controller for a camera screen already on the navigation stack
    pub(super) fn camera_controller(&self, content_id: ContentId) -> CaptureController {
        let navigator: Arc<dyn Navigator> = self.navigator.clone();
        let dispatcher = RecordedVideoDispatcher::new(Arc::clone(&self.store), navigator.clone());

        CaptureController::new(
            content_id,
            self.config.capture.clone(),
            &self.config.countdown,
            self.camera.clone(),
            dispatcher,
            navigator,
            Some(Arc::clone(&self.event_bus)),
        )
    }

    /// Mount the review screen for `content_id`.
    ///
    /// A recording passed through the current review route takes precedence
    /// over the one held in the store. A route that cancels the video drops
    /// the recording and reviews the reference alone.
    pub fn open_review(
        &self,
        content_id: ContentId,
        mut surface: ReviewSurface,
    ) -> Result<ReviewSession> {
        let recorded_video = match self.navigator.current() {
            Some(Route::Review {
                content_id: routed,
                should_cancel_video: true,
                ..
            }) if routed == content_id => {
                info!("Recording for content {} cancelled; reviewing reference only", content_id);
                if let Some(video) = self.store.take_recorded_video() {
                    debug!("Dropped recording {}", video.uri);
                }
                surface.recorded = None;
                None
            }
            Some(Route::Review {
                content_id: routed,
                recorded_video,
                ..
            }) if routed == content_id => recorded_video,
            _ => {
                debug!("Opening review for content {} outside a review route", content_id);
                None
            }
        };

        let session = ReviewSession::mount(
            content_id,
            recorded_video,
            Arc::clone(&self.store),
            &self.config,
            surface,
            Some(Arc::clone(&self.event_bus)),
        )?;
        Ok(session)
    }

    pub(super) fn require_content(&self, content_id: ContentId) -> Result<()> {
        if self.store.content(content_id).is_none() {
            return Err(DojoError::component(
                "store".to_string(),
                format!("content {} is not in the catalog", content_id),
            ));
        }
        Ok(())
    }

    pub(super) fn recorded_for(&self, content_id: ContentId) -> Option<RecordedVideo> {
        self.store
            .recorded_video()
            .filter(|video| video.content_id == content_id)
    }

    /// Update component state
    pub async fn set_component_state(&self, component: &str, state: ComponentState) {
        let mut states = self.component_states.lock().await;
        debug!("Component '{}' state changed to: {:?}", component, state);
        states.insert(component.to_string(), state);
    }

    pub async fn get_component_state(&self, component: &str) -> Option<ComponentState> {
        self.component_states.lock().await.get(component).cloned()
    }

    pub async fn get_all_component_states(&self) -> HashMap<String, ComponentState> {
        self.component_states.lock().await.clone()
    }

    pub(super) fn log_ready(&self) {
        info!(
            "Dojo review ready: {} contents, cache at {}",
            self.store.content_ids().len(),
            self.config.storage.cache_dir
        );
    }
}
