use serde::{Deserialize, Serialize};

use crate::landmarks::LandmarkSet;

/// Hands found in one frame. Empty when no hand is visible.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    #[serde(default)]
    pub hands: Vec<HandDetection>,
}

impl DetectionResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn single(hand: HandDetection) -> Self {
        Self { hands: vec![hand] }
    }

    /// Most confident hand, if any.
    pub fn primary(&self) -> Option<&HandDetection> {
        self.hands
            .iter()
            .max_by(|a, b| a.confidence.total_cmp(&b.confidence))
    }

    pub fn is_empty(&self) -> bool {
        self.hands.is_empty()
    }
}

/// One tracked hand.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandDetection {
    pub landmarks: LandmarkSet,
    /// Detector confidence that this is a hand (0..1).
    pub confidence: f32,
    #[serde(default)]
    pub handedness: Handedness,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handedness {
    Left,
    Right,
    #[default]
    Unknown,
}
