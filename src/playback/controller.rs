use super::rates::RateLadder;
use super::track::TrackSet;
use crate::config::PlaybackConfig;
use crate::error::PlaybackError;
use crate::model::{DisplaySize, NaturalSize, VideoMetadata};
use serde::Serialize;
use tracing::{debug, error, info};

const DEFAULT_MAX_DISPLAY_DIMENSION: u32 = 300;

/// Ephemeral per-screen playback state
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlaybackState {
    pub paused: bool,
    /// Fraction of the duration played, in `[0, 1]`
    pub progress: f64,
    /// Seconds
    pub duration: f64,
    pub rate: f64,
    pub loading: bool,
}

/// What the player reported once the primary source loaded
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadedVideo {
    pub duration: f64,
    pub natural_size: NaturalSize,
    pub display_size: DisplaySize,
}

/// Heights of the stacked video area on the review screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewLayout {
    pub track_height: f64,
    pub full_height: f64,
}

impl ReviewLayout {
    pub fn compute(screen_width: f64, height_ratio: f64, has_recorded: bool) -> Self {
        let track_height = screen_width * height_ratio;
        Self {
            track_height,
            full_height: if has_recorded {
                track_height * 2.0
            } else {
                track_height
            },
        }
    }
}

/// Play/pause, progress, seek and speed for every track on a review screen
pub struct PlaybackController {
    state: PlaybackState,
    ladder: RateLadder,
    tracks: TrackSet,
    loaded: Option<LoadedVideo>,
    max_display_dimension: u32,
}

impl PlaybackController {
    pub fn new(config: &PlaybackConfig, tracks: TrackSet) -> Self {
        let controller = Self {
            state: PlaybackState {
                paused: true,
                progress: 0.0,
                duration: 0.0,
                rate: config.default_rate,
                loading: true,
            },
            ladder: RateLadder::new(config.rates.clone()),
            tracks,
            loaded: None,
            max_display_dimension: DEFAULT_MAX_DISPLAY_DIMENSION,
        };
        controller.tracks.set_paused(true);
        controller.tracks.set_rate(controller.state.rate);
        controller
    }

    /// Bound for the display size computed on load
    pub fn with_max_display_dimension(mut self, max_dim: u32) -> Self {
        self.max_display_dimension = max_dim.max(1);
        self
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn tracks(&self) -> &TrackSet {
        &self.tracks
    }

    pub fn ladder(&self) -> &RateLadder {
        &self.ladder
    }

    pub fn loaded(&self) -> Option<LoadedVideo> {
        self.loaded
    }

    /// Primary source finished loading. Only the first report per source counts.
    pub fn load(&mut self, metadata: &VideoMetadata) -> LoadedVideo {
        if let Some(loaded) = self.loaded {
            debug!("Ignoring repeated load report for the same source");
            return loaded;
        }

        let loaded = LoadedVideo {
            duration: metadata.duration,
            natural_size: metadata.natural_size,
            display_size: metadata.natural_size.fit_within(self.max_display_dimension),
        };
        self.state.duration = metadata.duration;
        self.state.loading = false;
        self.loaded = Some(loaded);

        info!("Video loaded: {:.1}s", metadata.duration);
        loaded
    }

    /// Toggle play/pause. Playing from the end restarts at zero.
    pub fn toggle_play_pause(&mut self) -> bool {
        if self.state.paused && self.state.progress >= 1.0 {
            debug!("Restarting playback from the beginning");
            self.tracks.seek_all(0.0);
            self.state.progress = 0.0;
        }

        self.state.paused = !self.state.paused;
        self.tracks.set_paused(self.state.paused);
        self.state.paused
    }

    pub fn on_progress(&mut self, current_time: f64) {
        self.state.loading = false;
        self.state.progress = self.fraction_of(current_time);
    }

    pub fn on_end(&mut self) {
        self.state.paused = true;
        self.state.progress = 1.0;
        self.tracks.set_paused(true);
    }

    /// Seek every track to `fraction` of the duration
    pub fn seek(&mut self, fraction: f64) {
        let fraction = if fraction.is_finite() {
            fraction.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.seek_to(fraction * self.state.duration);
    }

    /// Seek every track to an absolute position in seconds
    pub fn seek_to(&mut self, position: f64) {
        let position = position.max(0.0);
        self.tracks.seek_all(position);
        self.state.progress = self.fraction_of(position);
    }

    pub fn faster(&mut self) -> f64 {
        self.apply_rate(self.ladder.faster(self.state.rate))
    }

    pub fn slower(&mut self) -> f64 {
        self.apply_rate(self.ladder.slower(self.state.rate))
    }

    /// Decode or network failure from the player; logged only
    pub fn on_error(&self, error: &PlaybackError) {
        error!("Error on video: {}", error);
    }

    /// Screen lost focus: pause everything
    pub fn on_focus_lost(&mut self) {
        if !self.state.paused {
            self.state.paused = true;
            self.tracks.set_paused(true);
        }
    }

    /// Position rounded to whole seconds
    pub fn position_seconds(&self) -> f64 {
        (self.state.progress * self.state.duration).round()
    }

    /// Elapsed time as `m:ss`
    pub fn elapsed_label(&self) -> String {
        format_elapsed((self.state.progress * self.state.duration).floor() as u64)
    }

    fn apply_rate(&mut self, rate: f64) -> f64 {
        if rate != self.state.rate {
            debug!("Playback rate {} -> {}", self.state.rate, rate);
            self.state.rate = rate;
            self.tracks.set_rate(rate);
        }
        rate
    }

    fn fraction_of(&self, position: f64) -> f64 {
        if self.state.duration > 0.0 {
            (position / self.state.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
