use crate::error::EventBusError;
use crate::model::ContentId;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::sync::broadcast;
use tracing::{debug, error, info};

/// Events that can occur during a record-and-review session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum DojoEvent {
    /// The pre-recording countdown advanced
    CountdownTick { remaining: u32 },
    /// The countdown reached zero
    CountdownFinished { timestamp: SystemTime },
    /// The camera began recording against a content video
    RecordingStarted {
        content_id: ContentId,
        session_id: String,
        timestamp: SystemTime,
    },
    /// The camera stopped and the artifact was kept or discarded
    RecordingStopped {
        content_id: ContentId,
        session_id: String,
        kept: bool,
    },
    /// A recorded video was written to the shared store
    RecordedVideoStored { content_id: ContentId, uri: String },
    /// A local copy of a content video became available
    CachedPathResolved { content_id: ContentId, path: PathBuf },
    /// The highlighted step changed during playback
    ActiveStepChanged { content_id: ContentId, index: usize },
    /// Playback reached the end of the primary track
    PlaybackEnded { content_id: ContentId },
    /// A handled error occurred in a component
    SystemError { component: String, error: String },
}

impl DojoEvent {
    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            DojoEvent::CountdownTick { remaining } => format!("Countdown: {}", remaining),
            DojoEvent::CountdownFinished { .. } => "Countdown finished".to_string(),
            DojoEvent::RecordingStarted {
                content_id,
                session_id,
                ..
            } => {
                format!("Recording {} started for content {}", session_id, content_id)
            }
            DojoEvent::RecordingStopped {
                content_id,
                session_id,
                kept,
            } => format!(
                "Recording {} for content {} {}",
                session_id,
                content_id,
                if *kept { "kept" } else { "discarded" }
            ),
            DojoEvent::RecordedVideoStored { content_id, uri } => {
                format!("Stored recording {} for content {}", uri, content_id)
            }
            DojoEvent::CachedPathResolved { content_id, path } => {
                format!("Content {} cached at {}", content_id, path.display())
            }
            DojoEvent::ActiveStepChanged { content_id, index } => {
                format!("Content {} active step {}", content_id, index)
            }
            DojoEvent::PlaybackEnded { content_id } => {
                format!("Playback of content {} ended", content_id)
            }
            DojoEvent::SystemError { component, error } => {
                format!("Error in {}: {}", component, error)
            }
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            DojoEvent::CountdownTick { .. } => "countdown_tick",
            DojoEvent::CountdownFinished { .. } => "countdown_finished",
            DojoEvent::RecordingStarted { .. } => "recording_started",
            DojoEvent::RecordingStopped { .. } => "recording_stopped",
            DojoEvent::RecordedVideoStored { .. } => "recorded_video_stored",
            DojoEvent::CachedPathResolved { .. } => "cached_path_resolved",
            DojoEvent::ActiveStepChanged { .. } => "active_step_changed",
            DojoEvent::PlaybackEnded { .. } => "playback_ended",
            DojoEvent::SystemError { .. } => "system_error",
        }
    }
}

/// Event bus for workflow notifications using broadcast channels
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<DojoEvent>,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<DojoEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers.
    /// Fails only when nobody is listening.
    pub fn publish(&self, event: DojoEvent) -> Result<usize, EventBusError> {
        match &event {
            DojoEvent::RecordingStarted { .. }
            | DojoEvent::RecordingStopped { .. }
            | DojoEvent::RecordedVideoStored { .. } => {
                info!("{}", event.description());
            }
            DojoEvent::SystemError { component, error } => {
                error!("System error in {}: {}", component, error);
            }
            _ => debug!("Event: {}", event.description()),
        }

        self.sender
            .send(event)
            .map_err(|e| EventBusError::PublishFailed {
                details: e.to_string(),
            })
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Check if there are any active subscribers
    pub fn has_subscribers(&self) -> bool {
        self.sender.receiver_count() > 0
    }
}

/// Event filter for selective event handling
#[derive(Debug, Clone)]
pub enum EventFilter {
    /// Accept all events
    All,
    /// Accept only specific event types
    EventTypes(Vec<&'static str>),
    /// Accept events concerning one content item
    Content(ContentId),
}

impl EventFilter {
    /// Check if an event passes this filter
    pub fn matches(&self, event: &DojoEvent) -> bool {
        match self {
            EventFilter::All => true,
            EventFilter::EventTypes(types) => types.contains(&event.event_type()),
            EventFilter::Content(wanted) => match event {
                DojoEvent::RecordingStarted { content_id, .. }
                | DojoEvent::RecordingStopped { content_id, .. }
                | DojoEvent::RecordedVideoStored { content_id, .. }
                | DojoEvent::CachedPathResolved { content_id, .. }
                | DojoEvent::ActiveStepChanged { content_id, .. }
                | DojoEvent::PlaybackEnded { content_id } => content_id == wanted,
                _ => false,
            },
        }
    }
}

/// Event receiver with filtering
pub struct EventReceiver {
    receiver: broadcast::Receiver<DojoEvent>,
    filter: EventFilter,
    name: String,
}

impl EventReceiver {
    /// Create a new event receiver with a filter
    pub fn new(receiver: broadcast::Receiver<DojoEvent>, filter: EventFilter, name: String) -> Self {
        Self {
            receiver,
            filter,
            name,
        }
    }

    /// Receive the next filtered event
    pub async fn recv(&mut self) -> Result<DojoEvent, EventBusError> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        debug!(
                            "Receiver '{}' received event: {}",
                            self.name,
                            event.description()
                        );
                        return Ok(event);
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    return Err(EventBusError::Lagged { skipped: n });
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!("Event bus closed for receiver '{}'", self.name);
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }

    /// Try to receive an event without blocking
    pub fn try_recv(&mut self) -> Result<Option<DojoEvent>, EventBusError> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.filter.matches(&event) {
                        return Ok(Some(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return Ok(None),
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Err(EventBusError::Lagged { skipped: n });
                }
                Err(broadcast::error::TryRecvError::Closed) => {
                    return Err(EventBusError::ChannelClosed);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_event_bus_basic_operations() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        let subscriber_count = event_bus
            .publish(DojoEvent::CountdownTick { remaining: 3 })
            .unwrap();
        assert_eq!(subscriber_count, 1);

        match receiver.recv().await.unwrap() {
            DojoEvent::CountdownTick { remaining } => assert_eq!(remaining, 3),
            _ => panic!("Unexpected event type"),
        }
    }

    #[test]
    fn test_publish_without_subscribers_fails() {
        let event_bus = EventBus::new(10);
        assert!(!event_bus.has_subscribers());
        assert!(event_bus
            .publish(DojoEvent::CountdownTick { remaining: 1 })
            .is_err());
    }

    #[tokio::test]
    async fn test_filtered_receiver() {
        let event_bus = EventBus::new(10);
        let filter = EventFilter::Content(ContentId(2));
        let mut receiver = EventReceiver::new(event_bus.subscribe(), filter, "test".to_string());

        event_bus
            .publish(DojoEvent::PlaybackEnded {
                content_id: ContentId(1),
            })
            .unwrap();
        event_bus
            .publish(DojoEvent::ActiveStepChanged {
                content_id: ContentId(2),
                index: 4,
            })
            .unwrap();

        let received = timeout(Duration::from_millis(100), receiver.recv())
            .await
            .unwrap()
            .unwrap();
        match received {
            DojoEvent::ActiveStepChanged { index, .. } => assert_eq!(index, 4),
            other => panic!("Unexpected event: {:?}", other),
        }
        assert!(receiver.try_recv().unwrap().is_none());
    }

    #[test]
    fn test_event_properties() {
        let event = DojoEvent::RecordingStopped {
            content_id: ContentId(9),
            session_id: "abc".to_string(),
            kept: false,
        };

        assert_eq!(event.event_type(), "recording_stopped");
        assert!(event.description().contains("discarded"));
        assert!(EventFilter::EventTypes(vec!["recording_stopped"]).matches(&event));
    }
}
