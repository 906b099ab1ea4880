mod controller;
mod rates;
mod steps;
mod track;
#[cfg(test)]
mod tests;

pub use controller::{format_elapsed, LoadedVideo, PlaybackController, PlaybackState, ReviewLayout};
pub use rates::RateLadder;
pub use steps::{active_step_index, MockStepList, StepList, StepRow, StepSynchronizer};
pub use track::{MockTrack, TrackCommand, TrackRole, TrackSet, VideoTrack};
