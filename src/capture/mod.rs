mod camera;
mod controller;
mod mock;

pub use camera::{CameraDevice, CameraFacing, RecordingOptions};
pub use controller::{CaptureController, CaptureState, ReferenceVideo, StopOutcome};
pub use mock::MockCamera;
