use crate::error::PlaybackError;
use parking_lot::Mutex;
use tracing::warn;

/// Which on-screen video a track drives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackRole {
    /// The cached content video
    Primary,
    /// The user's recording, rendered above the primary
    Recorded,
}

/// Handle to one platform video view
pub trait VideoTrack: Send + Sync {
    /// Jump to an absolute position in seconds
    fn seek(&self, position: f64) -> Result<(), PlaybackError>;
    fn set_paused(&self, paused: bool);
    fn set_rate(&self, rate: f64);
}

/// All tracks of a review screen, kept in lock-step
pub struct TrackSet {
    tracks: Vec<(TrackRole, Box<dyn VideoTrack>)>,
}

impl TrackSet {
    pub fn new(primary: Box<dyn VideoTrack>) -> Self {
        Self {
            tracks: vec![(TrackRole::Primary, primary)],
        }
    }

    pub fn with_recorded(mut self, recorded: Box<dyn VideoTrack>) -> Self {
        // Recorded track sits first: it is drawn above the primary
        self.tracks.insert(0, (TrackRole::Recorded, recorded));
        self
    }

    pub fn roles(&self) -> Vec<TrackRole> {
        self.tracks.iter().map(|(role, _)| *role).collect()
    }

    pub fn has_recorded(&self) -> bool {
        self.tracks
            .iter()
            .any(|(role, _)| *role == TrackRole::Recorded)
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Seek every track; failures are logged per track
    pub fn seek_all(&self, position: f64) -> usize {
        let mut failed = 0;
        for (role, track) in &self.tracks {
            if let Err(e) = track.seek(position) {
                warn!("Seek failed on {:?} track: {}", role, e);
                failed += 1;
            }
        }
        failed
    }

    pub fn set_paused(&self, paused: bool) {
        for (_, track) in &self.tracks {
            track.set_paused(paused);
        }
    }

    pub fn set_rate(&self, rate: f64) {
        for (_, track) in &self.tracks {
            track.set_rate(rate);
        }
    }
}

/// What a [`MockTrack`] was told to do
#[derive(Debug, Clone, PartialEq)]
pub enum TrackCommand {
    Seek(f64),
    Paused(bool),
    Rate(f64),
}

/// In-memory track that records every command it receives
#[derive(Debug, Default)]
pub struct MockTrack {
    commands: Mutex<Vec<TrackCommand>>,
    fail_seeks: bool,
}

impl MockTrack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_seeks() -> Self {
        Self {
            commands: Mutex::new(Vec::new()),
            fail_seeks: true,
        }
    }

    pub fn commands(&self) -> Vec<TrackCommand> {
        self.commands.lock().clone()
    }

    pub fn seeks(&self) -> Vec<f64> {
        self.commands
            .lock()
            .iter()
            .filter_map(|command| match command {
                TrackCommand::Seek(position) => Some(*position),
                _ => None,
            })
            .collect()
    }
}

impl VideoTrack for MockTrack {
    fn seek(&self, position: f64) -> Result<(), PlaybackError> {
        if self.fail_seeks {
            return Err(PlaybackError::Seek {
                position,
                details: "mock track rejects seeks".to_string(),
            });
        }
        self.commands.lock().push(TrackCommand::Seek(position));
        Ok(())
    }

    fn set_paused(&self, paused: bool) {
        self.commands.lock().push(TrackCommand::Paused(paused));
    }

    fn set_rate(&self, rate: f64) {
        self.commands.lock().push(TrackCommand::Rate(rate));
    }
}

impl<T: VideoTrack + ?Sized> VideoTrack for std::sync::Arc<T> {
    fn seek(&self, position: f64) -> Result<(), PlaybackError> {
        (**self).seek(position)
    }

    fn set_paused(&self, paused: bool) {
        (**self).set_paused(paused)
    }

    fn set_rate(&self, rate: f64) {
        (**self).set_rate(rate)
    }
}
