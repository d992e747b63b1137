use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::detect::DetectorSettings;
use crate::landmarks::FrameShape;
use crate::smoothing::DEFAULT_WINDOW;

const DEFAULT_BACKEND: &str = "synthetic";
const DEFAULT_HOLD_SECS: f64 = 1.0;
const DEFAULT_FRAME_WIDTH: u32 = 640;
const DEFAULT_FRAME_HEIGHT: u32 = 480;
const DEFAULT_TARGET_FPS: u32 = 30;

// ----------------------------------------------------------------------------
// Recognition thresholds
// ----------------------------------------------------------------------------

// The numeric defaults below were tuned by hand against live camera input.
// They are kept as named fields so they can be recalibrated from a labeled
// landmark corpus without touching the algorithms.

/// Finger extension voting thresholds.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FingerThresholds {
    /// Tip-to-MCP must exceed PIP-to-MCP times this ratio.
    pub distance_ratio: f32,
    /// Tip-to-wrist must exceed MCP-to-wrist times this ratio.
    pub wrist_ratio: f32,
    /// Minimum tip-PIP-MCP angle (degrees) for a straight finger.
    pub angle_deg: f32,
    /// Signals (out of 3) that must agree for a long finger.
    pub min_votes: u8,
    /// Thumb tip-to-wrist must exceed IP-to-wrist times this ratio.
    pub thumb_ratio: f32,
}

impl Default for FingerThresholds {
    fn default() -> Self {
        Self {
            distance_ratio: 1.15,
            wrist_ratio: 1.3,
            angle_deg: 140.0,
            min_votes: 2,
            thumb_ratio: 1.1,
        }
    }
}

/// Closed-fist scorer thresholds. Distances are relative to hand size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FistThresholds {
    /// A hand with this many extended fingers is never a fist.
    pub max_extended: usize,
    pub compactness_max: f32,
    pub tip_distance_factor: f32,
    pub grouping_factor: f32,
    /// Criteria (out of 3) that must pass.
    pub min_criteria: usize,
    /// Added when no finger is extended.
    pub closed_bonus: f32,
    pub min_confidence: f32,
    pub confidence_cap: f32,
}

impl Default for FistThresholds {
    fn default() -> Self {
        Self {
            max_extended: 3,
            compactness_max: 0.35,
            tip_distance_factor: 2.0,
            grouping_factor: 0.7,
            min_criteria: 2,
            closed_bonus: 0.2,
            min_confidence: 0.3,
            confidence_cap: 0.95,
        }
    }
}

/// V-shape breakpoints for scissors confidence banding.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScissorsThresholds {
    pub v_ratio_excellent: f32,
    pub v_ratio_good: f32,
}

impl Default for ScissorsThresholds {
    fn default() -> Self {
        Self {
            v_ratio_excellent: 1.3,
            v_ratio_good: 1.1,
        }
    }
}

/// Everything the recognition pipeline reads. Owned by the caller and passed
/// by reference; there is no process-wide settings object.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecognitionConfig {
    pub fingers: FingerThresholds,
    pub fist: FistThresholds,
    pub scissors: ScissorsThresholds,
    /// Smoothing window length in frames.
    pub smoothing_frames: usize,
    /// How long a smoothed gesture must be held before it confirms.
    pub hold_time: Duration,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            fingers: FingerThresholds::default(),
            fist: FistThresholds::default(),
            scissors: ScissorsThresholds::default(),
            smoothing_frames: DEFAULT_WINDOW,
            hold_time: Duration::from_secs_f64(DEFAULT_HOLD_SECS),
        }
    }
}

impl RecognitionConfig {
    pub fn validate(&self) -> Result<()> {
        let f = &self.fingers;
        for (name, value) in [
            ("fingers.distance_ratio", f.distance_ratio),
            ("fingers.wrist_ratio", f.wrist_ratio),
            ("fingers.thumb_ratio", f.thumb_ratio),
            ("fist.compactness_max", self.fist.compactness_max),
            ("fist.tip_distance_factor", self.fist.tip_distance_factor),
            ("fist.grouping_factor", self.fist.grouping_factor),
            ("scissors.v_ratio_excellent", self.scissors.v_ratio_excellent),
            ("scissors.v_ratio_good", self.scissors.v_ratio_good),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(anyhow!("{} must be a positive number (got {})", name, value));
            }
        }
        if !(0.0..=180.0).contains(&f.angle_deg) {
            return Err(anyhow!("fingers.angle_deg must be within 0..=180"));
        }
        if f.min_votes == 0 || f.min_votes > 3 {
            return Err(anyhow!("fingers.min_votes must be 1, 2 or 3"));
        }
        if self.fist.min_criteria == 0 || self.fist.min_criteria > 3 {
            return Err(anyhow!("fist.min_criteria must be 1, 2 or 3"));
        }
        for (name, value) in [
            ("fist.closed_bonus", self.fist.closed_bonus),
            ("fist.min_confidence", self.fist.min_confidence),
            ("fist.confidence_cap", self.fist.confidence_cap),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("{} must be within 0.0..=1.0", name));
            }
        }
        if self.scissors.v_ratio_excellent < self.scissors.v_ratio_good {
            return Err(anyhow!(
                "scissors.v_ratio_excellent must not be below scissors.v_ratio_good"
            ));
        }
        if self.smoothing_frames == 0 {
            return Err(anyhow!("smoothing window must hold at least one frame"));
        }
        Ok(())
    }
}

// ----------------------------------------------------------------------------
// Config file
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize, Default)]
struct GestureConfigFile {
    backend: Option<String>,
    replay_path: Option<PathBuf>,
    detector: Option<DetectorConfigFile>,
    fingers: Option<FingersConfigFile>,
    fist: Option<FistConfigFile>,
    scissors: Option<ScissorsConfigFile>,
    smoothing: Option<SmoothingConfigFile>,
    confirmation: Option<ConfirmationConfigFile>,
    frame: Option<FrameConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectorConfigFile {
    max_hands: Option<usize>,
    min_detection_confidence: Option<f32>,
    min_tracking_confidence: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct FingersConfigFile {
    distance_ratio: Option<f32>,
    wrist_ratio: Option<f32>,
    angle_deg: Option<f32>,
    min_votes: Option<u8>,
    thumb_ratio: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct FistConfigFile {
    max_extended: Option<usize>,
    compactness_max: Option<f32>,
    tip_distance_factor: Option<f32>,
    grouping_factor: Option<f32>,
    min_criteria: Option<usize>,
    closed_bonus: Option<f32>,
    min_confidence: Option<f32>,
    confidence_cap: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct ScissorsConfigFile {
    v_ratio_excellent: Option<f32>,
    v_ratio_good: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
struct SmoothingConfigFile {
    frames: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
struct ConfirmationConfigFile {
    hold_secs: Option<f64>,
}

#[derive(Debug, Deserialize, Default)]
struct FrameConfigFile {
    width: Option<u32>,
    height: Option<u32>,
    target_fps: Option<u32>,
}

/// Full runtime configuration for the gesture tools.
#[derive(Debug, Clone)]
pub struct GestureConfig {
    /// Detector backend name, resolved through the backend registry.
    pub backend: String,
    /// Recording consumed by the replay backend.
    pub replay_path: Option<PathBuf>,
    pub detector: DetectorSettings,
    pub recognition: RecognitionConfig,
    pub frame: FrameShape,
    pub target_fps: u32,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            backend: DEFAULT_BACKEND.to_string(),
            replay_path: None,
            detector: DetectorSettings::default(),
            recognition: RecognitionConfig::default(),
            frame: FrameShape::new(DEFAULT_FRAME_HEIGHT, DEFAULT_FRAME_WIDTH),
            target_fps: DEFAULT_TARGET_FPS,
        }
    }
}

impl GestureConfig {
    /// Load from `GESTURE_CONFIG` (if set), apply env overrides, validate.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("GESTURE_CONFIG").ok();
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    /// Load from an explicit file path, apply env overrides, validate.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => read_config_file(path)?,
            None => GestureConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg)?;
        cfg.apply_env()?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: GestureConfigFile) -> Result<Self> {
        let defaults = Self::default();

        let detector = file.detector.unwrap_or_default();
        let detector = DetectorSettings {
            max_hands: detector.max_hands.unwrap_or(defaults.detector.max_hands),
            min_detection_confidence: detector
                .min_detection_confidence
                .unwrap_or(defaults.detector.min_detection_confidence),
            min_tracking_confidence: detector
                .min_tracking_confidence
                .unwrap_or(defaults.detector.min_tracking_confidence),
        };

        let base = defaults.recognition;
        let fingers = file.fingers.unwrap_or_default();
        let fist = file.fist.unwrap_or_default();
        let scissors = file.scissors.unwrap_or_default();
        let hold_secs = file
            .confirmation
            .and_then(|c| c.hold_secs)
            .unwrap_or(DEFAULT_HOLD_SECS);
        let recognition = RecognitionConfig {
            fingers: FingerThresholds {
                distance_ratio: fingers.distance_ratio.unwrap_or(base.fingers.distance_ratio),
                wrist_ratio: fingers.wrist_ratio.unwrap_or(base.fingers.wrist_ratio),
                angle_deg: fingers.angle_deg.unwrap_or(base.fingers.angle_deg),
                min_votes: fingers.min_votes.unwrap_or(base.fingers.min_votes),
                thumb_ratio: fingers.thumb_ratio.unwrap_or(base.fingers.thumb_ratio),
            },
            fist: FistThresholds {
                max_extended: fist.max_extended.unwrap_or(base.fist.max_extended),
                compactness_max: fist.compactness_max.unwrap_or(base.fist.compactness_max),
                tip_distance_factor: fist
                    .tip_distance_factor
                    .unwrap_or(base.fist.tip_distance_factor),
                grouping_factor: fist.grouping_factor.unwrap_or(base.fist.grouping_factor),
                min_criteria: fist.min_criteria.unwrap_or(base.fist.min_criteria),
                closed_bonus: fist.closed_bonus.unwrap_or(base.fist.closed_bonus),
                min_confidence: fist.min_confidence.unwrap_or(base.fist.min_confidence),
                confidence_cap: fist.confidence_cap.unwrap_or(base.fist.confidence_cap),
            },
            scissors: ScissorsThresholds {
                v_ratio_excellent: scissors
                    .v_ratio_excellent
                    .unwrap_or(base.scissors.v_ratio_excellent),
                v_ratio_good: scissors.v_ratio_good.unwrap_or(base.scissors.v_ratio_good),
            },
            smoothing_frames: file
                .smoothing
                .and_then(|s| s.frames)
                .unwrap_or(base.smoothing_frames),
            hold_time: hold_duration(hold_secs)?,
        };

        let frame = file.frame.unwrap_or_default();
        Ok(Self {
            backend: file.backend.unwrap_or(defaults.backend),
            replay_path: file.replay_path,
            detector,
            recognition,
            frame: FrameShape::new(
                frame.height.unwrap_or(DEFAULT_FRAME_HEIGHT),
                frame.width.unwrap_or(DEFAULT_FRAME_WIDTH),
            ),
            target_fps: frame.target_fps.unwrap_or(DEFAULT_TARGET_FPS),
        })
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(backend) = std::env::var("GESTURE_BACKEND") {
            if !backend.trim().is_empty() {
                self.backend = backend.trim().to_string();
            }
        }
        if let Ok(path) = std::env::var("GESTURE_REPLAY_PATH") {
            if !path.trim().is_empty() {
                self.replay_path = Some(PathBuf::from(path));
            }
        }
        if let Ok(hold) = std::env::var("GESTURE_HOLD_SECS") {
            let secs: f64 = hold
                .trim()
                .parse()
                .map_err(|_| anyhow!("GESTURE_HOLD_SECS must be a number of seconds"))?;
            self.recognition.hold_time = hold_duration(secs)?;
        }
        if let Ok(frames) = std::env::var("GESTURE_SMOOTHING_FRAMES") {
            self.recognition.smoothing_frames = frames
                .trim()
                .parse()
                .map_err(|_| anyhow!("GESTURE_SMOOTHING_FRAMES must be an integer"))?;
        }
        if let Ok(conf) = std::env::var("GESTURE_MIN_DETECTION_CONFIDENCE") {
            self.detector.min_detection_confidence = conf
                .trim()
                .parse()
                .map_err(|_| anyhow!("GESTURE_MIN_DETECTION_CONFIDENCE must be a number"))?;
        }
        if let Ok(ratio) = std::env::var("GESTURE_EXTENSION_RATIO") {
            self.recognition.fingers.distance_ratio = ratio
                .trim()
                .parse()
                .map_err(|_| anyhow!("GESTURE_EXTENSION_RATIO must be a number"))?;
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<()> {
        self.backend = self.backend.to_lowercase();
        self.detector.validate()?;
        self.recognition.validate()?;
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(anyhow!("frame dimensions must be non-zero"));
        }
        if self.target_fps == 0 {
            return Err(anyhow!("target_fps must be >= 1"));
        }
        Ok(())
    }
}

fn hold_duration(secs: f64) -> Result<Duration> {
    Duration::try_from_secs_f64(secs).map_err(|e| anyhow!("invalid hold time {}: {}", secs, e))
}

fn read_config_file(path: &Path) -> Result<GestureConfigFile> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let cfg = toml::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let mut cfg = GestureConfig::default();
        cfg.validate().unwrap();
        assert_eq!(cfg.recognition.smoothing_frames, 5);
        assert_eq!(cfg.recognition.hold_time, Duration::from_secs(1));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let file: GestureConfigFile = toml::from_str(
            r#"
            [fingers]
            distance_ratio = 1.25

            [confirmation]
            hold_secs = 0.5
            "#,
        )
        .unwrap();
        let cfg = GestureConfig::from_file(file).unwrap();
        assert_eq!(cfg.recognition.fingers.distance_ratio, 1.25);
        assert_eq!(cfg.recognition.fingers.wrist_ratio, 1.3);
        assert_eq!(cfg.recognition.hold_time, Duration::from_millis(500));
        assert_eq!(cfg.recognition.fist, FistThresholds::default());
        assert_eq!(cfg.backend, "synthetic");
    }

    #[test]
    fn rejects_inverted_scissors_bands() {
        let mut cfg = RecognitionConfig::default();
        cfg.scissors.v_ratio_good = 1.5;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("v_ratio_excellent"));
    }

    #[test]
    fn rejects_empty_window_and_bad_votes() {
        let mut cfg = RecognitionConfig::default();
        cfg.smoothing_frames = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = RecognitionConfig::default();
        cfg.fingers.min_votes = 4;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn rejects_negative_hold() {
        assert!(hold_duration(-0.5).is_err());
        assert!(hold_duration(f64::NAN).is_err());
        assert_eq!(hold_duration(0.0).unwrap(), Duration::ZERO);
    }

    #[test]
    fn rejects_hold_beyond_duration_range() {
        let err = hold_duration(1e30).unwrap_err();
        assert!(err.to_string().contains("invalid hold time"));
        assert!(hold_duration(f64::INFINITY).is_err());

        let file: GestureConfigFile = toml::from_str("[confirmation]\nhold_secs = 1e30\n").unwrap();
        assert!(GestureConfig::from_file(file).is_err());
    }
}
