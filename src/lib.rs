pub mod app;
pub mod cache;
pub mod capture;
pub mod config;
pub mod countdown;
pub mod dispatch;
pub mod error;
pub mod events;
pub mod keyboard_input;
pub mod model;
pub mod navigation;
pub mod playback;
pub mod review;
pub mod store;
pub mod urls;

pub use app::{ComponentState, DojoOrchestrator, ShutdownReason, SimulationOptions, SimulationReport, UserCommand};
pub use cache::{CacheResolver, DirectoryCacheResolver};
pub use capture::{CameraDevice, CaptureController, CaptureState, MockCamera, StopOutcome};
pub use config::DojoConfig;
pub use countdown::{Countdown, CountdownHandle};
pub use dispatch::RecordedVideoDispatcher;
pub use error::{DojoError, Result};
pub use events::{DojoEvent, EventBus, EventFilter, EventReceiver};
pub use model::{Content, ContentId, RecordedVideo, Step, VideoMetadata};
pub use navigation::{NavigationLog, Navigator, Route};
pub use playback::{PlaybackController, RateLadder, StepSynchronizer};
pub use review::{ReviewSession, ReviewSurface};
pub use store::AppStore;
