use crate::model::ContentId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DojoError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Scroll sync error: {0}")]
    ScrollSync(#[from] ScrollSyncError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Event bus error: {0}")]
    EventBus(#[from] EventBusError),

    #[error("System error: {message}")]
    System { message: String },

    #[error("Component error in {component}: {message}")]
    Component { component: String, message: String },
}

impl DojoError {
    pub fn system<S: Into<String>>(message: S) -> Self {
        Self::System {
            message: message.into(),
        }
    }

    pub fn component<S: Into<String>>(component: S, message: S) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

/// Camera start/stop failures and rejected workflow transitions
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CaptureError {
    #[error("Camera is not ready; the reference video has not loaded")]
    NotReady,

    #[error("Cannot {action} while {state}")]
    InvalidTransition { action: &'static str, state: String },

    #[error("Failed to start recording: {details}")]
    StartFailed { details: String },

    #[error("Failed to stop recording: {details}")]
    StopFailed { details: String },
}

/// Errors reported by the underlying video player
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    #[error("Seek to {position:.2}s failed: {details}")]
    Seek { position: f64, details: String },

    #[error("Decode or network error: {details}")]
    Media { details: String },

    #[error("No video source for content {0}")]
    NoSource(ContentId),
}

/// Step list could not scroll to the requested row
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScrollSyncError {
    #[error("Index {index} is outside the current layout ({laid_out} rows laid out)")]
    OutOfLayout { index: usize, laid_out: usize },

    #[error("Step list is not mounted")]
    NotMounted,
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Content {content_id} is not cached at {path}")]
    NotCached { content_id: ContentId, path: String },

    #[error("Remote URL has no file component: {url}")]
    InvalidUrl { url: String },

    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EventBusError {
    #[error("Failed to publish event: {details}")]
    PublishFailed { details: String },

    #[error("Receiver lagged behind by {skipped} events")]
    Lagged { skipped: u64 },

    #[error("Event channel closed")]
    ChannelClosed,
}

pub type Result<T> = std::result::Result<T, DojoError>;
