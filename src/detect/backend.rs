use anyhow::{anyhow, Result};

use super::result::DetectionResult;

/// Detection capabilities a backend may offer.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectionCapability {
    /// 21-point hand landmarks with per-hand confidence.
    HandLandmarks,
    /// Left/right labelling.
    Handedness,
    /// More than one hand per frame.
    MultiHand,
}

/// Settings forwarded to the detector. The recognition core never reads them.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorSettings {
    pub max_hands: usize,
    pub min_detection_confidence: f32,
    pub min_tracking_confidence: f32,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            max_hands: 1,
            min_detection_confidence: 0.7,
            min_tracking_confidence: 0.7,
        }
    }
}

impl DetectorSettings {
    pub fn validate(&self) -> Result<()> {
        if self.max_hands == 0 {
            return Err(anyhow!("detector.max_hands must be >= 1"));
        }
        for (name, value) in [
            ("detector.min_detection_confidence", self.min_detection_confidence),
            ("detector.min_tracking_confidence", self.min_tracking_confidence),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(anyhow!("{} must be within 0.0..=1.0", name));
            }
        }
        Ok(())
    }
}

/// Hand-landmark detector backend.
///
/// One capability matters to the kernel: given a frame, produce zero or more
/// 21-point landmark sets with a per-hand confidence. Whatever model or API
/// sits behind an implementation stays behind it.
pub trait LandmarkBackend: Send {
    /// Backend identifier.
    fn name(&self) -> &'static str;

    /// Returns true when the backend supports a capability.
    fn supports(&self, capability: DetectionCapability) -> bool;

    /// Detect hands in a frame.
    ///
    /// Pixel data is borrowed for the duration of the call only.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<DetectionResult>;

    /// Apply detector thresholds. Backends without tunables ignore this.
    fn configure(&mut self, _settings: &DetectorSettings) {}

    /// True once a finite source has nothing left to return.
    fn is_exhausted(&self) -> bool {
        false
    }

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
