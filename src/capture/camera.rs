use crate::error::CaptureError;
use crate::model::MediaArtifact;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraFacing {
    Front,
    Back,
}

impl CameraFacing {
    pub fn toggled(self) -> Self {
        match self {
            CameraFacing::Front => CameraFacing::Back,
            CameraFacing::Back => CameraFacing::Front,
        }
    }
}

/// Parameters handed to the platform capture API
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordingOptions {
    pub mute: bool,
    /// Recording stops on its own after this long
    pub max_duration: Option<Duration>,
}

/// Platform camera driven by the capture controller
#[async_trait]
pub trait CameraDevice: Send + Sync {
    /// Record until [`CameraDevice::stop_recording`] is called or the maximum
    /// duration elapses, then resolve with the produced artifact.
    async fn record(&self, options: RecordingOptions) -> Result<MediaArtifact, CaptureError>;

    /// Request the active recording to stop. Does not wait for the artifact.
    async fn stop_recording(&self) -> Result<(), CaptureError>;

    fn set_facing(&self, facing: CameraFacing);
}
