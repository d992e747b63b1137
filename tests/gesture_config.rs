use std::sync::Mutex;
use std::time::Duration;

use tempfile::NamedTempFile;

use gesture_kernel::config::GestureConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "GESTURE_CONFIG",
        "GESTURE_BACKEND",
        "GESTURE_REPLAY_PATH",
        "GESTURE_HOLD_SECS",
        "GESTURE_SMOOTHING_FRAMES",
        "GESTURE_MIN_DETECTION_CONFIDENCE",
        "GESTURE_EXTENSION_RATIO",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let replay_path = file.path().with_extension("jsonl");
    let toml = format!(
        r#"
        backend = "Replay"
        replay_path = "{}"

        [detector]
        max_hands = 2
        min_detection_confidence = 0.6

        [fingers]
        angle_deg = 150.0

        [scissors]
        v_ratio_excellent = 1.9
        v_ratio_good = 1.3

        [smoothing]
        frames = 7

        [confirmation]
        hold_secs = 0.75

        [frame]
        width = 1280
        height = 720
        target_fps = 60
        "#,
        replay_path.display()
    );
    std::io::Write::write_all(&mut file, toml.as_bytes()).expect("write config");

    std::env::set_var("GESTURE_CONFIG", file.path());
    std::env::set_var("GESTURE_HOLD_SECS", "1.5");
    std::env::set_var("GESTURE_EXTENSION_RATIO", "1.2");

    let cfg = GestureConfig::load().expect("load config");

    assert_eq!(cfg.backend, "replay");
    assert_eq!(cfg.replay_path.unwrap(), replay_path);
    assert_eq!(cfg.detector.max_hands, 2);
    assert_eq!(cfg.detector.min_detection_confidence, 0.6);
    assert_eq!(cfg.detector.min_tracking_confidence, 0.7);
    assert_eq!(cfg.recognition.fingers.angle_deg, 150.0);
    assert_eq!(cfg.recognition.fingers.distance_ratio, 1.2);
    assert_eq!(cfg.recognition.scissors.v_ratio_excellent, 1.9);
    assert_eq!(cfg.recognition.smoothing_frames, 7);
    assert_eq!(cfg.recognition.hold_time, Duration::from_millis(1500));
    assert_eq!(cfg.frame.width, 1280);
    assert_eq!(cfg.frame.height, 720);
    assert_eq!(cfg.target_fps, 60);

    clear_env();
}

#[test]
fn defaults_without_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let cfg = GestureConfig::load().expect("load defaults");
    assert_eq!(cfg.backend, "synthetic");
    assert!(cfg.replay_path.is_none());
    assert_eq!(cfg.recognition.smoothing_frames, 5);
    assert_eq!(cfg.recognition.hold_time, Duration::from_secs(1));
    assert_eq!(cfg.target_fps, 30);
}

#[test]
fn rejects_invalid_env_values() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("GESTURE_SMOOTHING_FRAMES", "many");
    assert!(GestureConfig::load().is_err());
    clear_env();

    std::env::set_var("GESTURE_SMOOTHING_FRAMES", "0");
    assert!(GestureConfig::load().is_err());
    clear_env();

    std::env::set_var("GESTURE_MIN_DETECTION_CONFIDENCE", "1.5");
    let err = GestureConfig::load().unwrap_err();
    assert!(err.to_string().contains("min_detection_confidence"));
    clear_env();

    std::env::set_var("GESTURE_HOLD_SECS", "-1");
    assert!(GestureConfig::load().is_err());
    clear_env();

    std::env::set_var("GESTURE_HOLD_SECS", "1e30");
    let err = GestureConfig::load().unwrap_err();
    assert!(err.to_string().contains("invalid hold time"));
    clear_env();
}

#[test]
fn rejects_malformed_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(&mut file, b"[smoothing\nframes = 3").expect("write config");
    let err = GestureConfig::load_from(Some(file.path())).unwrap_err();
    assert!(err.to_string().contains("invalid config file"));
}
