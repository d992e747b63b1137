use std::io::Write;

use tempfile::NamedTempFile;

use gesture_kernel::synthetic;
use gesture_kernel::{
    BackendRegistry, DetectionResult, GestureConfig, HandDetection, Handedness, LandmarkBackend,
    ReplayBackend,
};

fn frame(hand: Option<gesture_kernel::LandmarkSet>) -> String {
    let result = match hand {
        Some(landmarks) => DetectionResult::single(HandDetection {
            landmarks,
            confidence: 0.9,
            handedness: Handedness::Right,
        }),
        None => DetectionResult::empty(),
    };
    serde_json::to_string(&result).unwrap()
}

#[test]
fn replays_recording_from_disk() {
    let mut file = NamedTempFile::new().expect("temp recording");
    writeln!(file, "# two hands, one gap").unwrap();
    writeln!(file, "{}", frame(Some(synthetic::closed_fist()))).unwrap();
    writeln!(file, "{}", frame(None)).unwrap();
    writeln!(file, "{}", frame(Some(synthetic::scissors_v()))).unwrap();

    let mut backend = ReplayBackend::open(file.path()).expect("open recording");
    assert_eq!(backend.len(), 3);

    let first = backend.detect(&[], 640, 480).unwrap();
    assert_eq!(first.primary().unwrap().landmarks, synthetic::closed_fist());
    assert!(backend.detect(&[], 640, 480).unwrap().is_empty());
    assert_eq!(backend.remaining(), 1);
    backend.detect(&[], 640, 480).unwrap();
    assert!(backend.is_exhausted());
}

#[test]
fn registry_uses_configured_replay() {
    let mut file = NamedTempFile::new().expect("temp recording");
    writeln!(file, "{}", frame(Some(synthetic::open_hand()))).unwrap();

    let cfg = GestureConfig {
        backend: "replay".to_string(),
        replay_path: Some(file.path().to_path_buf()),
        ..GestureConfig::default()
    };
    let registry = BackendRegistry::from_config(&cfg).unwrap();
    assert_eq!(registry.list(), vec!["replay", "synthetic"]);

    let backend = registry.default_backend().unwrap();
    let mut guard = backend.lock().unwrap();
    assert_eq!(guard.name(), "replay");
    let result = guard.detect(&[], 640, 480).unwrap();
    assert_eq!(result.hands.len(), 1);
}

#[test]
fn missing_recording_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ReplayBackend::open(&dir.path().join("absent.jsonl")).err().unwrap();
    assert!(err.to_string().contains("absent.jsonl"));
}
