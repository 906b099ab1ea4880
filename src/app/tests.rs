use super::*;
use crate::config::DojoConfig;
use crate::error::DojoError;
use crate::model::{ContentId, RecordedVideo};
use crate::navigation::{Navigator, Route};
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

const CATALOG: &str = r#"[
  {
    "id": 1,
    "title": "Taegeuk Il Jang",
    "video_uri": "forms/taegeuk 1.mp4",
    "steps": [
      { "id": 2, "description": "Low block", "start_time": 30.0, "end_time": 60.0 },
      { "id": 1, "description": "Ready", "start_time": 0.0, "end_time": 30.0 }
    ]
  }
]"#;

fn create_test_config(dir: &TempDir) -> DojoConfig {
    let mut config = DojoConfig::default();
    config.storage.cache_dir = dir.path().join("cache").display().to_string();
    config.storage.catalog_path = dir.path().join("catalog.json").display().to_string();
    config
}

/// Catalog on disk plus a cached copy of content 1
fn seed(dir: &TempDir) -> PathBuf {
    std::fs::write(dir.path().join("catalog.json"), CATALOG).unwrap();
    let cached = dir.path().join("cache").join("1").join("taegeuk 1.mp4");
    std::fs::create_dir_all(cached.parent().unwrap()).unwrap();
    std::fs::write(&cached, b"video").unwrap();
    cached
}

async fn create_orchestrator(dir: &TempDir) -> DojoOrchestrator {
    let mut orchestrator = DojoOrchestrator::new(create_test_config(dir));
    orchestrator.initialize().await.unwrap();
    orchestrator
}

#[tokio::test]
async fn test_initialize_loads_catalog() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    let orchestrator = create_orchestrator(&dir).await;

    assert_eq!(orchestrator.store().content_ids(), vec![ContentId(1)]);
    assert_eq!(
        orchestrator.get_component_state("store").await,
        Some(ComponentState::Running)
    );
    assert_eq!(
        orchestrator.get_component_state("capture").await,
        Some(ComponentState::Stopped)
    );
    assert_eq!(orchestrator.get_component_state("keyboard").await, None);
}

#[tokio::test]
async fn test_initialize_without_catalog() {
    let dir = TempDir::new().unwrap();
    let orchestrator = create_orchestrator(&dir).await;
    assert!(orchestrator.store().content_ids().is_empty());

    let result = orchestrator
        .simulate(ContentId(1), &SimulationOptions::default())
        .await;
    assert!(matches!(result, Err(DojoError::Component { .. })));
}

#[tokio::test]
async fn test_initialize_rejects_malformed_catalog() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("catalog.json"), "{ not a list").unwrap();

    let mut orchestrator = DojoOrchestrator::new(create_test_config(&dir));
    let result = orchestrator.initialize().await;

    assert!(matches!(result, Err(DojoError::Json(_))));
    assert_eq!(
        orchestrator.get_component_state("store").await,
        Some(ComponentState::Failed)
    );
}

#[tokio::test(start_paused = true)]
async fn test_simulation_records_and_reviews() {
    let dir = TempDir::new().unwrap();
    let cached = seed(&dir);
    let orchestrator = create_orchestrator(&dir).await;

    let options = SimulationOptions {
        reference_duration: 60.0,
        cancel_after: None,
    };
    let report = orchestrator.simulate(ContentId(1), &options).await.unwrap();

    assert!(report.reviewed);
    assert_eq!(report.content_id, Some(ContentId(1)));
    assert_eq!(report.cached_path, Some(cached));
    assert_eq!(report.active_steps, vec![0, 1]);
    assert_eq!(report.routes, vec!["Content", "Camera", "VideoWithControls"]);

    let recorded = report.recorded_video.unwrap();
    assert_eq!(recorded.content_id, ContentId(1));
    assert!(recorded.uri.starts_with("file://"));

    // The review screen consumed the recording
    assert!(orchestrator.store().recorded_video().is_none());
    assert_eq!(orchestrator.camera().recordings(), 1);
    assert_eq!(
        orchestrator.get_component_state("playback").await,
        Some(ComponentState::Stopped)
    );
}

#[tokio::test(start_paused = true)]
async fn test_simulation_cancelled_recording_is_discarded() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    let orchestrator = create_orchestrator(&dir).await;

    let options = SimulationOptions {
        reference_duration: 60.0,
        cancel_after: Some(Duration::from_secs(3)),
    };
    let report = orchestrator.simulate(ContentId(1), &options).await.unwrap();

    assert!(!report.reviewed);
    assert!(report.recorded_video.is_none());
    assert!(report.active_steps.is_empty());
    assert_eq!(report.routes, vec!["Content", "Camera", "Back"]);
    assert!(orchestrator.store().recorded_video().is_none());
    assert_eq!(
        orchestrator.navigator().current(),
        Some(Route::Content {
            content_id: ContentId(1)
        })
    );
}

#[tokio::test(start_paused = true)]
async fn test_cancel_after_recording_ended_keeps_review() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    let orchestrator = create_orchestrator(&dir).await;

    let options = SimulationOptions {
        reference_duration: 2.0,
        cancel_after: Some(Duration::from_secs(5)),
    };
    let report = orchestrator.simulate(ContentId(1), &options).await.unwrap();

    assert!(report.reviewed);
    assert!(report.recorded_video.is_some());
    assert_eq!(report.active_steps, vec![0]);
    assert_eq!(report.routes, vec!["Content", "Camera", "VideoWithControls"]);
    assert!(matches!(
        orchestrator.navigator().current(),
        Some(Route::Review { .. })
    ));
}

#[tokio::test]
async fn test_open_camera_routes_max_length() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    let orchestrator = create_orchestrator(&dir).await;

    orchestrator.open_camera(ContentId(1), Some(12.5)).unwrap();
    assert_eq!(
        orchestrator.navigator().current(),
        Some(Route::Camera {
            content_id: ContentId(1),
            max_length: Some(12.5),
        })
    );
}

#[tokio::test]
async fn test_open_review_drops_cancelled_recording() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    let orchestrator = create_orchestrator(&dir).await;

    let recorded = RecordedVideo {
        uri: "file:///cancelled.mp4".to_string(),
        content_id: ContentId(1),
    };
    orchestrator.store().add_recorded_video(recorded.clone());
    orchestrator.navigator().navigate(Route::Review {
        content_id: ContentId(1),
        recorded_video: Some(recorded),
        should_cancel_video: true,
    });

    let session = orchestrator
        .open_review(ContentId(1), super::simulate::mock_review_surface(2))
        .unwrap();
    assert!(session.recorded_video().is_none());
    assert_eq!(session.playback().tracks().len(), 1);
    assert!(orchestrator.store().recorded_video().is_none());
}

#[tokio::test]
async fn test_open_review_prefers_routed_recording() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    let orchestrator = create_orchestrator(&dir).await;

    let routed = RecordedVideo {
        uri: "file:///routed.mp4".to_string(),
        content_id: ContentId(1),
    };
    orchestrator.store().add_recorded_video(RecordedVideo {
        uri: "file:///stored.mp4".to_string(),
        content_id: ContentId(1),
    });
    orchestrator.navigator().navigate(Route::Review {
        content_id: ContentId(1),
        recorded_video: Some(routed.clone()),
        should_cancel_video: false,
    });

    let session = orchestrator
        .open_review(ContentId(1), super::simulate::mock_review_surface(2))
        .unwrap();
    assert_eq!(session.recorded_video(), Some(&routed));
    assert_eq!(session.steps().len(), 2);
}

#[tokio::test]
async fn test_open_camera_requires_known_content() {
    let dir = TempDir::new().unwrap();
    let orchestrator = create_orchestrator(&dir).await;

    assert!(orchestrator.open_camera(ContentId(7), None).is_err());
    assert_eq!(orchestrator.navigator().current(), Some(Route::ContentList));
}

#[tokio::test]
async fn test_component_state_transitions() {
    let dir = TempDir::new().unwrap();
    let orchestrator = DojoOrchestrator::new(create_test_config(&dir));
    let component = "test_component";

    assert_eq!(orchestrator.get_component_state(component).await, None);

    for state in [
        ComponentState::Starting,
        ComponentState::Running,
        ComponentState::Stopping,
        ComponentState::Stopped,
    ] {
        orchestrator
            .set_component_state(component, state.clone())
            .await;
        assert_eq!(
            orchestrator.get_component_state(component).await,
            Some(state)
        );
    }
}

#[tokio::test]
async fn test_shutdown_stops_registered_components() {
    let dir = TempDir::new().unwrap();
    seed(&dir);
    let mut orchestrator = create_orchestrator(&dir).await;

    let exit_code = orchestrator.shutdown().await.unwrap();
    assert_eq!(exit_code, 0);

    let states = orchestrator.get_all_component_states().await;
    assert_eq!(states.len(), 3);
    assert!(states.values().all(|state| *state == ComponentState::Stopped));
}
