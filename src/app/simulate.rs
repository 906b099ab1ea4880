use super::types::{SimulationOptions, SimulationReport};
use super::{ComponentState, DojoOrchestrator};
use crate::capture::CaptureController;
use crate::error::{DojoError, EventBusError, Result};
use crate::events::{DojoEvent, EventFilter, EventReceiver};
use crate::model::ContentId;
use crate::navigation::{NavigationAction, Navigator, Route};
use crate::playback::{MockStepList, MockTrack, VideoTrack};
use crate::review::{ReviewSession, ReviewSurface};
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

impl DojoOrchestrator {
    /// Run the record-and-review workflow for one content with mock devices.
    ///
    /// Caches the content video, records against the reference until it runs
    /// out (or until `cancel_after`), then plays the review back while
    /// following the active step.
    pub async fn simulate(
        &self,
        content_id: ContentId,
        options: &SimulationOptions,
    ) -> Result<SimulationReport> {
        self.require_content(content_id)?;
        info!("Simulating workflow for content {}", content_id);

        let mut report = SimulationReport {
            content_id: Some(content_id),
            ..Default::default()
        };
        let mut events = EventReceiver::new(
            self.event_bus.subscribe(),
            EventFilter::EventTypes(vec!["recording_started", "recording_stopped", "system_error"]),
            "simulation".to_string(),
        );

        self.navigator.navigate(Route::Content { content_id });
        self.warm_cache(content_id).await;

        let controller = self.open_camera(content_id, Some(options.reference_duration))?;
        self.set_component_state("capture", ComponentState::Running)
            .await;

        let reference = controller.on_reference_loaded(&options.reference_metadata());
        debug!(
            "Reference preview {}x{}",
            reference.preview_size.width, reference.preview_size.height
        );

        controller.request_recording()?;
        let outcome = self
            .follow_recording(&controller, &mut events, options.cancel_after)
            .await;
        controller.join_recording().await;
        self.set_component_state("capture", ComponentState::Stopped)
            .await;

        if outcome? {
            report.recorded_video = self.recorded_for(content_id);
            report.active_steps = self.review_playback(content_id, options).await?;
            report.reviewed = true;
        } else {
            info!("Recording for content {} was discarded", content_id);
        }

        report.cached_path = self.store.cached_video_path(content_id);
        report.routes = self
            .navigator
            .history()
            .into_iter()
            .map(|action| match action {
                NavigationAction::Navigate(route) => route.name().to_string(),
                NavigationAction::Back => "Back".to_string(),
            })
            .collect();

        info!(
            "Simulation finished: reviewed={}, steps visited={:?}",
            report.reviewed, report.active_steps
        );
        Ok(report)
    }

    async fn warm_cache(&self, content_id: ContentId) {
        let Some(video_uri) = self.store.video_uri(content_id) else {
            return;
        };
        if let Some(task) =
            self.store
                .gen_cached_uri(content_id, &self.config.storage.base_uri, &video_uri)
        {
            if let Err(e) = task.await {
                warn!("Cache task for content {} failed: {}", content_id, e);
            }
        }
    }

    /// Wait for the recording to stop. Returns whether it was kept.
    async fn follow_recording(
        &self,
        controller: &CaptureController,
        events: &mut EventReceiver,
        cancel_after: Option<Duration>,
    ) -> Result<bool> {
        let content_id = controller.content_id();
        let mut cancel_at: Option<Instant> = None;
        loop {
            let deadline = cancel_at;
            let cancel = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            let received = tokio::select! {
                received = events.recv() => received,
                _ = cancel => {
                    cancel_at = None;
                    if controller.state().is_recording() {
                        info!("Pressing back after {:?} of recording", cancel_after);
                        controller.back_pressed().await;
                    }
                    continue;
                }
            };

            match received {
                Ok(DojoEvent::RecordingStarted { content_id: id, .. }) if id == content_id => {
                    cancel_at = cancel_after.map(|delay| Instant::now() + delay);
                }
                Ok(DojoEvent::RecordingStopped {
                    content_id: id,
                    kept,
                    ..
                }) if id == content_id => return Ok(kept),
                Ok(DojoEvent::SystemError { component, error })
                    if component == "capture_controller" =>
                {
                    return Err(DojoError::component(component, error));
                }
                Ok(event) => debug!("Simulation saw {}", event.description()),
                Err(EventBusError::Lagged { skipped }) => {
                    warn!("Simulation lagged, skipped {} events", skipped)
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Play the review screen start to finish in one-second ticks scaled by
    /// the playback rate, returning each newly active step.
    async fn review_playback(
        &self,
        content_id: ContentId,
        options: &SimulationOptions,
    ) -> Result<Vec<usize>> {
        let surface = mock_review_surface(self.store.steps_sorted(content_id).len());
        let mut session = self.open_review(content_id, surface)?;
        self.set_component_state("playback", ComponentState::Running)
            .await;

        if session.primary_source().is_none() {
            warn!(
                "No local copy of content {}; reviewing without a cached source",
                content_id
            );
        }

        let loaded = session.on_load(&options.reference_metadata());
        session.toggle_play_pause();

        let mut visited = Vec::new();
        let mut position = 0.0;
        session.on_progress(position);
        note_active_step(&session, &mut visited);

        let rate = session.playback().state().rate;
        while position < loaded.duration {
            position = (position + rate).min(loaded.duration);
            session.on_progress(position);
            note_active_step(&session, &mut visited);
        }
        session.on_end();
        info!("Review played to {}", session.playback().elapsed_label());

        self.set_component_state("playback", ComponentState::Stopped)
            .await;
        Ok(visited)
    }
}

fn note_active_step(session: &ReviewSession, visited: &mut Vec<usize>) {
    let rows = session.rows();
    let Some(index) = rows.iter().position(|row| row.active) else {
        return;
    };
    if visited.last() != Some(&index) {
        info!("Now on {}", rows[index].label);
        visited.push(index);
    }
}

/// Review surface backed by in-memory tracks and a fully laid-out step list
pub(super) fn mock_review_surface(step_count: usize) -> ReviewSurface {
    ReviewSurface {
        primary: Box::new(MockTrack::new()),
        recorded: Some(Box::new(MockTrack::new()) as Box<dyn VideoTrack>),
        step_list: Box::new(MockStepList::new(step_count)),
    }
}
