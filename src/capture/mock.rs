use super::camera::{CameraDevice, CameraFacing, RecordingOptions};
use crate::error::CaptureError;
use crate::model::MediaArtifact;
use async_trait::async_trait;
use chrono::Local;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::Notify;
use tracing::debug;

/// Camera stand-in for running the workflow without platform hardware
pub struct MockCamera {
    output_dir: String,
    facing: Mutex<CameraFacing>,
    recording: AtomicBool,
    stop_requested: AtomicBool,
    stop_signal: Notify,
    fail_start: AtomicBool,
    fail_stop: AtomicBool,
    recordings: AtomicU64,
    last_options: Mutex<Option<RecordingOptions>>,
}

impl MockCamera {
    pub fn new(output_dir: impl Into<String>) -> Self {
        Self {
            output_dir: output_dir.into(),
            facing: Mutex::new(CameraFacing::Front),
            recording: AtomicBool::new(false),
            stop_requested: AtomicBool::new(false),
            stop_signal: Notify::new(),
            fail_start: AtomicBool::new(false),
            fail_stop: AtomicBool::new(false),
            recordings: AtomicU64::new(0),
            last_options: Mutex::new(None),
        }
    }

    /// Make the next recordings fail to start
    pub fn set_fail_start(&self, fail: bool) {
        self.fail_start.store(fail, Ordering::SeqCst);
    }

    /// Make stop requests fail while the recording keeps running
    pub fn set_fail_stop(&self, fail: bool) {
        self.fail_stop.store(fail, Ordering::SeqCst);
    }

    pub fn is_recording(&self) -> bool {
        self.recording.load(Ordering::SeqCst)
    }

    pub fn recordings(&self) -> u64 {
        self.recordings.load(Ordering::SeqCst)
    }

    pub fn facing(&self) -> CameraFacing {
        *self.facing.lock()
    }

    pub fn last_options(&self) -> Option<RecordingOptions> {
        *self.last_options.lock()
    }
}

#[async_trait]
impl CameraDevice for MockCamera {
    async fn record(&self, options: RecordingOptions) -> Result<MediaArtifact, CaptureError> {
        if self.fail_start.load(Ordering::SeqCst) {
            return Err(CaptureError::StartFailed {
                details: "mock camera configured to fail".to_string(),
            });
        }

        *self.last_options.lock() = Some(options);
        self.recording.store(true, Ordering::SeqCst);
        debug!("Mock camera recording with {:?}", options);

        let limit = async {
            match options.max_duration {
                Some(max) => tokio::time::sleep(max).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(limit);

        // A stop may arrive before this task is first polled
        loop {
            if self.stop_requested.swap(false, Ordering::SeqCst) {
                break;
            }
            tokio::select! {
                _ = self.stop_signal.notified() => continue,
                _ = &mut limit => break,
            }
        }

        self.stop_requested.store(false, Ordering::SeqCst);
        self.recording.store(false, Ordering::SeqCst);
        let count = self.recordings.fetch_add(1, Ordering::SeqCst) + 1;

        Ok(MediaArtifact {
            uri: format!(
                "file://{}/recording_{}_{}.mp4",
                self.output_dir.trim_end_matches('/'),
                Local::now().format("%Y%m%d_%H%M%S_%3f"),
                count
            ),
        })
    }

    async fn stop_recording(&self) -> Result<(), CaptureError> {
        if self.fail_stop.load(Ordering::SeqCst) {
            return Err(CaptureError::StopFailed {
                details: "mock camera configured to fail".to_string(),
            });
        }
        self.stop_requested.store(true, Ordering::SeqCst);
        self.stop_signal.notify_one();
        Ok(())
    }

    fn set_facing(&self, facing: CameraFacing) {
        *self.facing.lock() = facing;
    }
}
