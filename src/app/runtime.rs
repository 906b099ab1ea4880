use super::simulate::mock_review_surface;
use super::types::reference_metadata;
use super::{ComponentState, DojoOrchestrator, ShutdownReason, UserCommand};
use crate::capture::CaptureController;
use crate::error::{DojoError, Result};
use crate::events::DojoEvent;
use crate::keyboard_input::KeyboardInputHandler;
use crate::model::ContentId;
use crate::navigation::{Navigator, Route};
use crate::review::ReviewSession;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{mpsc, oneshot, Mutex};
use tracing::{debug, info, warn};

/// Screen currently driven by user commands
enum Screen {
    Camera(CaptureController),
    Review(ReviewSession),
}

impl DojoOrchestrator {
    /// Drive the camera and review screens for `content_id` from keyboard
    /// commands until the user quits or a signal arrives.
    pub async fn run(&mut self, content_id: ContentId, reference_duration: f64) -> Result<i32> {
        self.require_content(content_id)?;
        info!("Dojo review is running for content {}", content_id);

        let shutdown_sender = self
            .shutdown_sender
            .take()
            .ok_or_else(|| DojoError::system("Shutdown sender already taken"))?;
        let mut shutdown_receiver = self
            .shutdown_receiver
            .take()
            .ok_or_else(|| DojoError::system("Shutdown receiver already taken"))?;

        self.setup_signal_handlers(shutdown_sender);

        let (command_sender, mut commands) = mpsc::unbounded_channel();
        if self.keyboard_enabled {
            self.set_component_state("keyboard", ComponentState::Starting)
                .await;
            let mut handler = KeyboardInputHandler::new(command_sender.clone());
            handler.start()?;
            self.keyboard_handler = Some(handler);
            self.set_component_state("keyboard", ComponentState::Running)
                .await;
        }

        let mut events = self.event_bus.subscribe();
        let mut screen = Screen::Camera(self.camera_screen(content_id, reference_duration, true)?);
        let mut ticker = tokio::time::interval(Duration::from_secs(1));

        let reason = loop {
            tokio::select! {
                reason = &mut shutdown_receiver => {
                    break reason.unwrap_or_else(|_| {
                        ShutdownReason::Error("Shutdown channel closed unexpectedly".to_string())
                    });
                }
                Some(command) = commands.recv() => {
                    if command == UserCommand::Quit {
                        break ShutdownReason::UserRequest;
                    }
                    if let Some(reason) = self
                        .handle_command(&mut screen, command, content_id, reference_duration)
                        .await?
                    {
                        break reason;
                    }
                }
                event = events.recv() => match event {
                    Ok(DojoEvent::RecordedVideoStored { content_id: id, .. }) if id == content_id => {
                        let mut session = self.open_review(
                            content_id,
                            mock_review_surface(self.store.steps_sorted(content_id).len()),
                        )?;
                        session.on_load(&reference_metadata(reference_duration));
                        screen = Screen::Review(session);
                        self.set_component_state("capture", ComponentState::Stopped).await;
                        self.set_component_state("playback", ComponentState::Running).await;
                        info!("Review ready: p play/pause, f/r speed, b back");
                    }
                    Ok(DojoEvent::RecordingStopped { content_id: id, kept: false, .. }) if id == content_id => {
                        info!("Recording discarded; reopening camera");
                        screen = Screen::Camera(self.camera_screen(content_id, reference_duration, true)?);
                    }
                    Ok(DojoEvent::ActiveStepChanged { index, .. }) => {
                        if let Screen::Review(session) = &screen {
                            if let Some(step) = session.steps().get(index) {
                                info!("Step {}: {}", index + 1, step.description);
                            }
                        }
                    }
                    Ok(event) => debug!("{}", event.description()),
                    Err(RecvError::Lagged(skipped)) => warn!("Runtime lagged, skipped {} events", skipped),
                    Err(RecvError::Closed) => break ShutdownReason::Error("Event bus closed".to_string()),
                },
                _ = ticker.tick() => {
                    if let Screen::Review(session) = &mut screen {
                        advance_review(session);
                    }
                }
            }
        };

        info!("Shutdown initiated: {:?}", reason);
        let exit_code = self.shutdown().await?;
        info!("Dojo review shutdown complete");
        Ok(exit_code)
    }

    /// Returns a shutdown reason when the command leaves the workflow
    async fn handle_command(
        &self,
        screen: &mut Screen,
        command: UserCommand,
        content_id: ContentId,
        reference_duration: f64,
    ) -> Result<Option<ShutdownReason>> {
        match screen {
            Screen::Camera(controller) => match command {
                UserCommand::Record => {
                    if let Err(e) = controller.request_recording() {
                        warn!("Cannot record: {}", e);
                    }
                }
                UserCommand::SwapCamera => match controller.swap_camera() {
                    Ok(facing) => info!("Camera facing {:?}", facing),
                    Err(e) => warn!("Cannot swap camera: {}", e),
                },
                UserCommand::Back => {
                    let was_recording = controller.state().is_recording();
                    controller.back_pressed().await;
                    if !was_recording {
                        return Ok(Some(ShutdownReason::UserRequest));
                    }
                }
                other => debug!("{:?} has no effect on the camera screen", other),
            },
            Screen::Review(session) => match command {
                UserCommand::PlayPause => {
                    let paused = session.toggle_play_pause();
                    info!("{}", if paused { "Paused" } else { "Playing" });
                }
                UserCommand::Faster => info!("Speed {}x", session.playback_mut().faster()),
                UserCommand::Slower => info!("Speed {}x", session.playback_mut().slower()),
                UserCommand::Back => {
                    session.playback_mut().on_focus_lost();
                    self.navigator.go_back();
                    self.set_component_state("playback", ComponentState::Stopped)
                        .await;
                    *screen = Screen::Camera(self.camera_screen(
                        content_id,
                        reference_duration,
                        false,
                    )?);
                }
                other => debug!("{:?} has no effect on the review screen", other),
            },
        }
        Ok(None)
    }

    fn camera_screen(
        &self,
        content_id: ContentId,
        reference_duration: f64,
        navigate: bool,
    ) -> Result<CaptureController> {
        let controller = if navigate {
            self.open_camera(content_id, Some(reference_duration))?
        } else {
            let controller = self.camera_controller(content_id);
            if let Some(Route::Camera { max_length, .. }) = self.navigator.current() {
                controller.set_max_length(max_length);
            }
            controller
        };
        controller.on_reference_loaded(&reference_metadata(reference_duration));
        info!("Camera ready: SPACE record, s swap camera, b back, q quit");
        Ok(controller)
    }

    /// Set up signal handlers for graceful shutdown
    fn setup_signal_handlers(&self, shutdown_sender: oneshot::Sender<ShutdownReason>) {
        let shutdown_sender = Arc::new(Mutex::new(Some(shutdown_sender)));

        #[cfg(unix)]
        {
            let shutdown_sender_sigterm = Arc::clone(&shutdown_sender);
            tokio::spawn(async move {
                let mut sigterm = match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(sigterm) => sigterm,
                    Err(e) => {
                        warn!("Failed to register SIGTERM handler: {}", e);
                        return;
                    }
                };
                if sigterm.recv().await.is_some() {
                    info!("Received SIGTERM signal");
                    if let Some(sender) = shutdown_sender_sigterm.lock().await.take() {
                        let _ = sender.send(ShutdownReason::Signal("SIGTERM".to_string()));
                    }
                }
            });
        }

        let shutdown_sender_sigint = Arc::clone(&shutdown_sender);
        tokio::spawn(async move {
            if let Ok(()) = signal::ctrl_c().await {
                info!("Received SIGINT signal (Ctrl+C)");
                if let Some(sender) = shutdown_sender_sigint.lock().await.take() {
                    let _ = sender.send(ShutdownReason::Signal("SIGINT".to_string()));
                }
            }
        });
    }
}

/// One wall-clock second of review playback at the current rate
fn advance_review(session: &mut ReviewSession) {
    let state = session.playback().state();
    if state.paused || state.duration <= 0.0 {
        return;
    }

    let position = (state.progress * state.duration + state.rate).min(state.duration);
    session.on_progress(position);
    if position >= state.duration {
        session.on_end();
        info!("Review finished; press p to replay");
    }
}
