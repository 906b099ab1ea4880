use super::camera::{CameraDevice, CameraFacing, RecordingOptions};
use crate::config::{CaptureConfig, CountdownConfig};
use crate::countdown::Countdown;
use crate::dispatch::RecordedVideoDispatcher;
use crate::error::CaptureError;
use crate::events::{DojoEvent, EventBus};
use crate::model::{ContentId, DisplaySize, MediaArtifact, VideoMetadata};
use crate::navigation::Navigator;
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// What happens to the artifact once recording stops
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Keep,
    Discard,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CaptureState {
    Idle,
    CountdownPending,
    Recording {
        session_id: Uuid,
        discard_requested: bool,
    },
    Stopped(StopOutcome),
}

impl CaptureState {
    pub fn name(&self) -> &'static str {
        match self {
            CaptureState::Idle => "idle",
            CaptureState::CountdownPending => "counting down",
            CaptureState::Recording { .. } => "recording",
            CaptureState::Stopped(StopOutcome::Keep) => "stopped (kept)",
            CaptureState::Stopped(StopOutcome::Discard) => "stopped (discarded)",
        }
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, CaptureState::Recording { .. })
    }
}

impl fmt::Display for CaptureState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The reference video played alongside the camera preview
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReferenceVideo {
    pub duration: f64,
    pub preview_size: DisplaySize,
}

enum BackAction {
    StopRecording,
    CancelCountdown,
    Exit,
}

/// Drives one camera screen: countdown, recording, and the keep/discard decision
#[derive(Clone)]
pub struct CaptureController {
    inner: Arc<Inner>,
}

struct Inner {
    content_id: ContentId,
    config: CaptureConfig,
    camera: Arc<dyn CameraDevice>,
    dispatcher: RecordedVideoDispatcher,
    navigator: Arc<dyn Navigator>,
    event_bus: Option<Arc<EventBus>>,
    state: Mutex<CaptureState>,
    reference: Mutex<Option<ReferenceVideo>>,
    max_length: Mutex<Option<f64>>,
    facing: Mutex<CameraFacing>,
    countdown: Mutex<Countdown>,
    recording_task: Mutex<Option<JoinHandle<()>>>,
}

impl CaptureController {
    pub fn new(
        content_id: ContentId,
        config: CaptureConfig,
        countdown_config: &CountdownConfig,
        camera: Arc<dyn CameraDevice>,
        dispatcher: RecordedVideoDispatcher,
        navigator: Arc<dyn Navigator>,
        event_bus: Option<Arc<EventBus>>,
    ) -> Self {
        let facing = if config.front_camera {
            CameraFacing::Front
        } else {
            CameraFacing::Back
        };
        camera.set_facing(facing);

        let mut countdown = Countdown::new(countdown_config.seconds);
        if let Some(bus) = &event_bus {
            countdown = countdown.with_event_bus(Arc::clone(bus));
        }

        Self {
            inner: Arc::new(Inner {
                content_id,
                config,
                camera,
                dispatcher,
                navigator,
                event_bus,
                state: Mutex::new(CaptureState::Idle),
                reference: Mutex::new(None),
                max_length: Mutex::new(None),
                facing: Mutex::new(facing),
                countdown: Mutex::new(countdown),
                recording_task: Mutex::new(None),
            }),
        }
    }

    pub fn content_id(&self) -> ContentId {
        self.inner.content_id
    }

    pub fn state(&self) -> CaptureState {
        self.inner.state.lock().clone()
    }

    pub fn facing(&self) -> CameraFacing {
        *self.inner.facing.lock()
    }

    pub fn reference(&self) -> Option<ReferenceVideo> {
        *self.inner.reference.lock()
    }

    /// The camera may record once the reference video has loaded
    pub fn is_camera_ready(&self) -> bool {
        self.inner.reference.lock().is_some()
    }

    /// Record the reference video's metadata; its duration bounds the recording
    pub fn on_reference_loaded(&self, metadata: &VideoMetadata) -> ReferenceVideo {
        let reference = ReferenceVideo {
            duration: metadata.duration,
            preview_size: metadata
                .natural_size
                .fit_within(self.inner.config.preview_max_dimension),
        };

        info!(
            "Reference video loaded: {:.1}s, preview {}x{}",
            reference.duration, reference.preview_size.width, reference.preview_size.height
        );
        *self.inner.reference.lock() = Some(reference);
        reference
    }

    /// Upper bound on recording length in seconds, on top of the reference duration
    pub fn set_max_length(&self, max_length: Option<f64>) {
        *self.inner.max_length.lock() = max_length;
    }

    /// Longest allowed recording: the reference duration, capped by the max length
    fn recording_limit(&self) -> Result<Option<Duration>, CaptureError> {
        let limit = [
            self.reference().map(|reference| reference.duration),
            *self.inner.max_length.lock(),
        ]
        .into_iter()
        .flatten()
        .filter(|seconds| seconds.is_finite() && *seconds > 0.0)
        .reduce(f64::min);

        limit
            .map(|seconds| {
                Duration::try_from_secs_f64(seconds).map_err(|e| CaptureError::StartFailed {
                    details: format!("recording limit of {}s is out of range: {}", seconds, e),
                })
            })
            .transpose()
    }

    /// Flip between front and back camera; only while idle
    pub fn swap_camera(&self) -> Result<CameraFacing, CaptureError> {
        let state = self.inner.state.lock();
        if *state != CaptureState::Idle {
            return Err(CaptureError::InvalidTransition {
                action: "swap camera",
                state: state.name().to_string(),
            });
        }

        let mut facing = self.inner.facing.lock();
        *facing = facing.toggled();
        self.inner.camera.set_facing(*facing);
        debug!("Camera facing switched to {:?}", *facing);
        Ok(*facing)
    }

    /// User pressed record: start the countdown that leads into recording
    pub fn request_recording(&self) -> Result<(), CaptureError> {
        {
            let mut state = self.inner.state.lock();
            if *state != CaptureState::Idle {
                return Err(CaptureError::InvalidTransition {
                    action: "start recording",
                    state: state.name().to_string(),
                });
            }
            if !self.is_camera_ready() {
                return Err(CaptureError::NotReady);
            }
            *state = CaptureState::CountdownPending;
        }

        let controller = self.clone();
        self.inner.countdown.lock().start(
            |remaining| debug!("Recording in {}", remaining),
            move || controller.on_countdown_finished(),
        );

        Ok(())
    }

    /// Countdown reached zero: begin recording in the background
    pub(crate) fn on_countdown_finished(&self) {
        let controller = self.clone();
        let task = tokio::spawn(async move { controller.run_recording().await });
        *self.inner.recording_task.lock() = Some(task);
    }

    /// Wait for the in-flight recording, if any, to be fully handled
    pub async fn join_recording(&self) {
        let task = self.inner.recording_task.lock().take();
        if let Some(task) = task {
            if let Err(e) = task.await {
                error!("Recording task failed: {}", e);
            }
        }
    }

    async fn run_recording(&self) {
        let (session_id, options) = {
            let mut state = self.inner.state.lock();
            if *state != CaptureState::CountdownPending {
                warn!("Countdown finished while {}; not recording", state.name());
                return;
            }

            let max_duration = match self.recording_limit() {
                Ok(limit) => limit,
                Err(e) => {
                    drop(state);
                    error!("Recording not started: {}", e);
                    self.fail(e);
                    return;
                }
            };

            let session_id = Uuid::new_v4();
            *state = CaptureState::Recording {
                session_id,
                discard_requested: false,
            };

            (
                session_id,
                RecordingOptions {
                    mute: self.inner.config.mute,
                    max_duration,
                },
            )
        };

        self.publish(DojoEvent::RecordingStarted {
            content_id: self.inner.content_id,
            session_id: session_id.to_string(),
            timestamp: SystemTime::now(),
        });

        match self.inner.camera.record(options).await {
            Ok(artifact) => self.finish_recording(session_id, artifact),
            Err(e) => {
                error!("Recording failed: {}", e);
                self.fail(e);
            }
        }
    }

    fn finish_recording(&self, session_id: Uuid, artifact: MediaArtifact) {
        let outcome = {
            let mut state = self.inner.state.lock();
            let discard_requested = match &*state {
                CaptureState::Recording {
                    session_id: active,
                    discard_requested,
                } if *active == session_id => Some(*discard_requested),
                _ => None,
            };

            let Some(discard_requested) = discard_requested else {
                warn!(
                    "Recording {} finished while {}; dropping {}",
                    session_id,
                    state.name(),
                    artifact.uri
                );
                return;
            };

            let outcome = if discard_requested {
                StopOutcome::Discard
            } else {
                StopOutcome::Keep
            };
            *state = CaptureState::Stopped(outcome);
            outcome
        };

        self.publish(DojoEvent::RecordingStopped {
            content_id: self.inner.content_id,
            session_id: session_id.to_string(),
            kept: outcome == StopOutcome::Keep,
        });

        match outcome {
            StopOutcome::Keep => {
                self.inner
                    .dispatcher
                    .dispatch(self.inner.content_id, artifact);
            }
            StopOutcome::Discard => {
                info!("Discarding recording {}", artifact.uri);
                self.inner.navigator.go_back();
            }
        }
    }

    /// Back navigation. While recording this cancels and discards; during the
    /// countdown it aborts before anything is recorded; otherwise it exits.
    pub async fn back_pressed(&self) {
        let action = {
            let mut state = self.inner.state.lock();
            let action = match *state {
                CaptureState::Recording { .. } => BackAction::StopRecording,
                CaptureState::CountdownPending => BackAction::CancelCountdown,
                _ => BackAction::Exit,
            };

            match &mut *state {
                CaptureState::Recording {
                    discard_requested, ..
                } => *discard_requested = true,
                other => *other = CaptureState::Idle,
            }
            action
        };

        match action {
            BackAction::StopRecording => {
                info!("Cancelling recording for content {}", self.inner.content_id);
                // Navigation happens once the discarded artifact arrives
                if let Err(e) = self.inner.camera.stop_recording().await {
                    error!("Failed to stop recording: {}", e);
                    self.fail(e);
                    self.inner.navigator.go_back();
                }
            }
            BackAction::CancelCountdown => {
                info!("Countdown cancelled by back navigation");
                self.inner.countdown.lock().cancel();
                self.inner.navigator.go_back();
            }
            BackAction::Exit => self.inner.navigator.go_back(),
        }
    }

    fn fail(&self, e: CaptureError) {
        *self.inner.state.lock() = CaptureState::Idle;
        self.publish(DojoEvent::SystemError {
            component: "capture_controller".to_string(),
            error: e.to_string(),
        });
    }

    fn publish(&self, event: DojoEvent) {
        if let Some(bus) = &self.inner.event_bus {
            let _ = bus.publish(event);
        }
    }
}
