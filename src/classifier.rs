//! Per-frame rock/paper/scissors classification.
//!
//! `classify` is a pure function of the landmark set and configuration.
//! Rock is tested first through the fist scorer, then paper, then scissors.
//! Paper (four or more extended fingers) never overlaps the other two, but a
//! compact hand with only index and middle extended passes both the fist
//! test and the V-sign test. The order settles it: such a hand is rock.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::config::RecognitionConfig;
use crate::fingers::{finger_states, FingerStates};
use crate::fist::fist_closure;
use crate::geometry::{distance_3d, EPS};
use crate::landmarks::{Finger, FrameShape, LandmarkSet};

/// Gesture labels produced by the classifier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gesture {
    Rock,
    Paper,
    Scissors,
    #[default]
    None,
}

impl Gesture {
    pub const ALL: [Gesture; 4] = [Gesture::Rock, Gesture::Paper, Gesture::Scissors, Gesture::None];

    pub fn as_str(&self) -> &'static str {
        match self {
            Gesture::Rock => "rock",
            Gesture::Paper => "paper",
            Gesture::Scissors => "scissors",
            Gesture::None => "none",
        }
    }

    /// True for the three playable gestures.
    pub fn is_actionable(&self) -> bool {
        !matches!(self, Gesture::None)
    }
}

impl fmt::Display for Gesture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gesture {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rock" => Ok(Gesture::Rock),
            "paper" => Ok(Gesture::Paper),
            "scissors" => Ok(Gesture::Scissors),
            "none" => Ok(Gesture::None),
            other => Err(anyhow!("unknown gesture '{}'", other)),
        }
    }
}

/// A label with its confidence in [0, 1].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub gesture: Gesture,
    pub confidence: f32,
}

impl Classification {
    pub const NONE: Classification = Classification {
        gesture: Gesture::None,
        confidence: 0.0,
    };

    pub fn new(gesture: Gesture, confidence: f32) -> Self {
        Self {
            gesture,
            confidence,
        }
    }
}

/// Classify a single hand.
pub fn classify(
    landmarks: &LandmarkSet,
    shape: FrameShape,
    config: &RecognitionConfig,
) -> Classification {
    let fingers = finger_states(landmarks, shape, &config.fingers);
    let result = classify_with_fingers(landmarks, &fingers, config);
    log::debug!(
        "classified {} ({:.2}) extended=[{}]",
        result.gesture,
        result.confidence,
        fingers
    );
    result
}

/// Classify from precomputed finger states.
pub fn classify_with_fingers(
    landmarks: &LandmarkSet,
    fingers: &FingerStates,
    config: &RecognitionConfig,
) -> Classification {
    let fist = fist_closure(landmarks, fingers, &config.fist);
    if fist.is_fist {
        return Classification::new(Gesture::Rock, fist.confidence);
    }

    let extended = fingers.extended_count();
    if extended >= 4 {
        let mut confidence = 0.7 + (extended - 4) as f32 * 0.1;
        if fingers.is_extended(Finger::Thumb) {
            confidence += 0.15;
        }
        return Classification::new(Gesture::Paper, confidence.min(1.0));
    }

    if fingers.is_v_sign() {
        let v_ratio = scissors_v_ratio(landmarks);
        let bands = &config.scissors;
        let confidence = if v_ratio > bands.v_ratio_excellent {
            0.9
        } else if v_ratio > bands.v_ratio_good {
            0.75
        } else {
            0.6
        };
        return Classification::new(Gesture::Scissors, confidence);
    }

    Classification::NONE
}

/// Index-to-middle tip spread over their base spread. Wider V, larger ratio.
pub fn scissors_v_ratio(landmarks: &LandmarkSet) -> f32 {
    let tips = distance_3d(
        landmarks.get(Finger::Index.tip()),
        landmarks.get(Finger::Middle.tip()),
    );
    let bases = distance_3d(
        landmarks.get(Finger::Index.mcp()),
        landmarks.get(Finger::Middle.mcp()),
    );
    tips / (bases + EPS)
}
