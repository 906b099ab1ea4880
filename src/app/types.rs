use crate::model::{ContentId, NaturalSize, Orientation, RecordedVideo, VideoMetadata};
use std::path::PathBuf;
use std::time::Duration;

/// Component lifecycle states
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Failed,
}

/// System shutdown reason
#[derive(Debug, Clone)]
pub enum ShutdownReason {
    Signal(String),
    Error(String),
    UserRequest,
}

/// Commands issued by the interactive driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserCommand {
    Record,
    Back,
    PlayPause,
    Faster,
    Slower,
    SwapCamera,
    Quit,
}

/// Knobs for a scripted run of the record-and-review workflow
#[derive(Debug, Clone)]
pub struct SimulationOptions {
    /// Length of the reference video, which also caps the recording
    pub reference_duration: f64,
    /// Press back this long after recording starts instead of letting it run out
    pub cancel_after: Option<Duration>,
}

impl Default for SimulationOptions {
    fn default() -> Self {
        Self {
            reference_duration: 10.0,
            cancel_after: None,
        }
    }
}

impl SimulationOptions {
    /// Metadata the mock player reports for the reference video
    pub fn reference_metadata(&self) -> VideoMetadata {
        reference_metadata(self.reference_duration)
    }
}

pub(crate) fn reference_metadata(duration: f64) -> VideoMetadata {
    VideoMetadata {
        duration,
        natural_size: NaturalSize {
            width: 1280.0,
            height: 720.0,
            orientation: Orientation::Landscape,
        },
    }
}

/// What a scripted run observed
#[derive(Debug, Clone, Default)]
pub struct SimulationReport {
    pub content_id: Option<ContentId>,
    pub recorded_video: Option<RecordedVideo>,
    pub cached_path: Option<PathBuf>,
    /// Active step index each time it changed during review playback
    pub active_steps: Vec<usize>,
    /// Route names in the order they were visited
    pub routes: Vec<String>,
    pub reviewed: bool,
}
