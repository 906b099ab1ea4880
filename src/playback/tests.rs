use super::*;
use crate::config::PlaybackConfig;
use crate::error::PlaybackError;
use crate::model::{NaturalSize, Orientation, Step, VideoMetadata};
use std::sync::Arc;

fn create_test_config() -> PlaybackConfig {
    PlaybackConfig {
        rates: vec![0.5, 1.0, 1.5, 2.0],
        default_rate: 1.0,
        video_height_ratio: 0.5265,
        screen_width: 400.0,
    }
}

fn metadata(duration: f64) -> VideoMetadata {
    VideoMetadata {
        duration,
        natural_size: NaturalSize {
            width: 1920.0,
            height: 1080.0,
            orientation: Orientation::Landscape,
        },
    }
}

fn two_track_controller() -> (PlaybackController, Arc<MockTrack>, Arc<MockTrack>) {
    let primary = Arc::new(MockTrack::new());
    let recorded = Arc::new(MockTrack::new());
    let tracks = TrackSet::new(Box::new(Arc::clone(&primary)))
        .with_recorded(Box::new(Arc::clone(&recorded)));
    let controller = PlaybackController::new(&create_test_config(), tracks);
    (controller, primary, recorded)
}

fn kata_steps() -> Vec<Step> {
    vec![
        Step::new(1, "Ready").with_range(Some(0.0), Some(30.0)),
        Step::new(2, "Low block").with_range(Some(30.0), Some(60.0)),
    ]
}

#[test]
fn test_initial_state() {
    let (controller, primary, _) = two_track_controller();
    let state = controller.state();
    assert!(state.paused);
    assert!(state.loading);
    assert_eq!(state.progress, 0.0);
    assert_eq!(state.rate, 1.0);
    assert!(primary.commands().contains(&TrackCommand::Rate(1.0)));
}

#[test]
fn test_load_fires_once() {
    let (mut controller, _, _) = two_track_controller();
    let first = controller.load(&metadata(60.0));
    assert_eq!(first.duration, 60.0);
    assert_eq!(first.display_size.width, 300);
    assert!(!controller.state().loading);

    let second = controller.load(&metadata(999.0));
    assert_eq!(second, first);
    assert_eq!(controller.state().duration, 60.0);
}

#[test]
fn test_progress_is_duration_relative() {
    let (mut controller, _, _) = two_track_controller();
    controller.load(&metadata(80.0));

    controller.on_progress(20.0);
    assert_eq!(controller.state().progress, 0.25);
    assert_eq!(controller.elapsed_label(), "0:20");

    controller.on_progress(500.0);
    assert_eq!(controller.state().progress, 1.0);
}

#[test]
fn test_progress_clears_loading() {
    let (mut controller, _, _) = two_track_controller();
    assert!(controller.state().loading);
    controller.on_progress(0.0);
    assert!(!controller.state().loading);
}

#[test]
fn test_seek_moves_every_track_in_lock_step() {
    let (mut controller, primary, recorded) = two_track_controller();
    controller.load(&metadata(60.0));

    controller.seek(0.5);
    assert_eq!(primary.seeks(), vec![30.0]);
    assert_eq!(recorded.seeks(), vec![30.0]);
    assert_eq!(controller.state().progress, 0.5);
    assert_eq!(controller.position_seconds(), 30.0);
}

#[test]
fn test_play_from_end_restarts_at_zero() {
    let (mut controller, primary, recorded) = two_track_controller();
    controller.load(&metadata(60.0));
    controller.toggle_play_pause();
    controller.on_progress(59.0);
    controller.on_end();

    let state = controller.state();
    assert!(state.paused);
    assert_eq!(state.progress, 1.0);

    let paused = controller.toggle_play_pause();
    assert!(!paused);
    assert_eq!(primary.seeks(), vec![0.0]);
    assert_eq!(recorded.seeks(), vec![0.0]);
    assert_eq!(controller.state().progress, 0.0);
}

#[test]
fn test_pause_midway_does_not_seek() {
    let (mut controller, primary, _) = two_track_controller();
    controller.load(&metadata(60.0));
    controller.toggle_play_pause();
    controller.on_progress(12.0);
    assert!(controller.toggle_play_pause());
    controller.toggle_play_pause();
    assert!(primary.seeks().is_empty());
}

#[test]
fn test_rate_stays_on_ladder() {
    let (mut controller, _, recorded) = two_track_controller();

    for _ in 0..10 {
        controller.faster();
    }
    assert_eq!(controller.state().rate, 2.0);
    assert_eq!(controller.faster(), 2.0);

    for _ in 0..10 {
        controller.slower();
    }
    assert_eq!(controller.state().rate, 0.5);
    assert!(recorded.commands().contains(&TrackCommand::Rate(2.0)));
}

#[test]
fn test_focus_lost_pauses() {
    let (mut controller, _, _) = two_track_controller();
    controller.toggle_play_pause();
    assert!(!controller.state().paused);
    controller.on_focus_lost();
    assert!(controller.state().paused);
}

#[test]
fn test_errors_are_only_logged() {
    let (mut controller, _, _) = two_track_controller();
    controller.load(&metadata(10.0));
    controller.on_error(&PlaybackError::Media {
        details: "decoder exploded".to_string(),
    });
    assert_eq!(controller.state().duration, 10.0);
}

#[test]
fn test_failed_seek_on_one_track_still_moves_the_other() {
    let primary = Arc::new(MockTrack::new());
    let tracks = TrackSet::new(Box::new(Arc::clone(&primary)))
        .with_recorded(Box::new(MockTrack::failing_seeks()));
    assert_eq!(tracks.seek_all(5.0), 1);
    assert_eq!(primary.seeks(), vec![5.0]);
    assert_eq!(tracks.roles(), vec![TrackRole::Recorded, TrackRole::Primary]);
}

#[test]
fn test_review_layout_doubles_with_recording() {
    let single = ReviewLayout::compute(400.0, 0.5, false);
    assert_eq!(single.track_height, 200.0);
    assert_eq!(single.full_height, 200.0);

    let stacked = ReviewLayout::compute(400.0, 0.5, true);
    assert_eq!(stacked.full_height, 400.0);
}

#[test]
fn test_format_elapsed() {
    assert_eq!(format_elapsed(0), "0:00");
    assert_eq!(format_elapsed(9), "0:09");
    assert_eq!(format_elapsed(75), "1:15");
}

#[test]
fn test_boundary_belongs_to_later_step() {
    let steps = kata_steps();
    let (mut controller, _, _) = two_track_controller();
    controller.load(&metadata(60.0));
    controller.on_progress(30.0);

    assert_eq!(controller.state().progress, 0.5);
    assert_eq!(
        active_step_index(&steps, controller.position_seconds()),
        Some(1)
    );
}

#[test]
fn test_active_index_stable_and_monotonic() {
    let steps = vec![
        Step::new(1, "a").with_range(None, Some(10.0)),
        Step::new(2, "b").with_range(Some(10.0), Some(25.0)),
        Step::new(3, "c").with_range(Some(25.0), Some(40.0)),
        Step::new(4, "d").with_range(Some(40.0), None),
    ];

    let mut previous = 0;
    for t in 0..120 {
        let t = t as f64 * 0.5;
        let index = active_step_index(&steps, t).unwrap();
        assert_eq!(active_step_index(&steps, t), Some(index));
        assert!(index >= previous);
        previous = index;
    }
    assert_eq!(previous, 3);
}

#[test]
fn test_gap_between_steps_has_no_active_step() {
    let steps = vec![
        Step::new(1, "a").with_range(Some(0.0), Some(5.0)),
        Step::new(2, "b").with_range(Some(10.0), Some(15.0)),
    ];
    assert_eq!(active_step_index(&steps, 7.0), None);
}

#[test]
fn test_synchronizer_scrolls_on_change_only() {
    let list = Arc::new(MockStepList::new(10));
    let mut sync = StepSynchronizer::new(Box::new(Arc::clone(&list)));
    let steps = kata_steps();

    assert_eq!(sync.sync(&steps, 5.0), Some(0));
    assert_eq!(sync.sync(&steps, 10.0), None);
    assert_eq!(sync.sync(&steps, 31.0), Some(1));
    assert_eq!(sync.sync(&steps, 45.0), None);
    assert_eq!(list.scrolls(), vec![0, 1]);
    assert_eq!(sync.current_index(), 1);
}

#[test]
fn test_first_pass_scrolls_to_first_step() {
    let list = Arc::new(MockStepList::new(2));
    let mut sync = StepSynchronizer::new(Box::new(Arc::clone(&list)));
    let steps = vec![
        Step::new(1, "a").with_range(Some(5.0), Some(10.0)),
        Step::new(2, "b").with_range(Some(10.0), Some(15.0)),
    ];

    // Playhead before every step
    assert_eq!(sync.sync(&steps, 0.0), Some(0));
    assert_eq!(sync.sync(&steps, 2.0), None);
    assert_eq!(list.scrolls(), vec![0]);
}

#[test]
fn test_unmounted_list_is_retried_next_pass() {
    let list = Arc::new(MockStepList::new(0));
    let mut sync = StepSynchronizer::new(Box::new(Arc::clone(&list)));
    let steps = kata_steps();

    assert_eq!(
        list.scroll_to_index(0),
        Err(crate::error::ScrollSyncError::NotMounted)
    );
    assert_eq!(sync.sync(&steps, 0.0), None);
    assert!(list.scrolls().is_empty());

    list.set_laid_out(2);
    assert_eq!(sync.sync(&steps, 0.0), Some(0));
    assert_eq!(list.scrolls(), vec![0]);
}

#[test]
fn test_failed_scroll_is_retried_next_pass() {
    let list = Arc::new(MockStepList::new(1));
    let mut sync = StepSynchronizer::new(Box::new(Arc::clone(&list)));
    let steps = kata_steps();

    assert_eq!(sync.sync(&steps, 40.0), None);
    assert_eq!(sync.current_index(), 0);

    list.set_laid_out(2);
    assert_eq!(sync.sync(&steps, 40.0), Some(1));
    assert_eq!(list.scrolls(), vec![1]);
}

#[test]
fn test_step_rows() {
    let rows = StepSynchronizer::rows(&kata_steps(), 30.0);
    assert_eq!(rows[0].label, "1: Ready");
    assert!(!rows[0].active);
    assert_eq!(rows[1].label, "2: Low block");
    assert!(rows[1].active);
    assert_eq!(rows[1].seek_target, 30.0);
}
