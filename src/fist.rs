//! Closed-fist scoring.
//!
//! A clenched hand often reports one or two "semi-extended" fingers, so the
//! fist test does not rely on finger states alone. Three compactness signals
//! are scored against a hand-size reference (wrist to middle MCP) and at
//! least `min_criteria` of them must pass.

use crate::config::FistThresholds;
use crate::fingers::FingerStates;
use crate::geometry::{distance_3d, EPS};
use crate::landmarks::{Finger, LandmarkSet, MIDDLE_MCP};

/// Outcome of the fist test.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FistScore {
    pub is_fist: bool,
    pub confidence: f32,
}

impl FistScore {
    const REJECTED: FistScore = FistScore {
        is_fist: false,
        confidence: 0.0,
    };
}

/// Score how closely the hand matches a closed fist.
pub fn fist_closure(
    landmarks: &LandmarkSet,
    fingers: &FingerStates,
    thresholds: &FistThresholds,
) -> FistScore {
    let extended = fingers.extended_count();
    if extended >= thresholds.max_extended {
        return FistScore::REJECTED;
    }

    let wrist = landmarks.wrist();
    let hand_size = distance_3d(wrist, landmarks.get(MIDDLE_MCP));

    let scores: Vec<f32> = [
        compactness_score(landmarks, hand_size, thresholds),
        tip_distance_score(landmarks, hand_size, thresholds),
        grouping_score(landmarks, hand_size, thresholds),
    ]
    .into_iter()
    .flatten()
    .collect();

    if scores.len() < thresholds.min_criteria {
        log::trace!("fist rejected: {} of 3 criteria", scores.len());
        return FistScore::REJECTED;
    }

    let mut confidence = scores.iter().sum::<f32>() / scores.len() as f32;
    if extended == 0 {
        confidence = (confidence + thresholds.closed_bonus).min(1.0);
    }

    if confidence >= thresholds.min_confidence {
        FistScore {
            is_fist: true,
            confidence: confidence.min(thresholds.confidence_cap),
        }
    } else {
        FistScore::REJECTED
    }
}

/// Axis-aligned bounding-box volume relative to the cube of the hand size.
fn compactness_score(landmarks: &LandmarkSet, hand_size: f32, t: &FistThresholds) -> Option<f32> {
    let mut min = [f32::INFINITY; 3];
    let mut max = [f32::NEG_INFINITY; 3];
    for p in landmarks.iter() {
        for (axis, value) in [p.x, p.y, p.z].into_iter().enumerate() {
            min[axis] = min[axis].min(value);
            max[axis] = max[axis].max(value);
        }
    }
    let volume = (max[0] - min[0]) * (max[1] - min[1]) * (max[2] - min[2]);
    let ratio = volume / (hand_size.powi(3) + EPS);

    (ratio < t.compactness_max)
        .then(|| ((t.compactness_max - ratio) / t.compactness_max * 1.5).min(1.0))
}

/// Mean fingertip-to-wrist distance of the four long fingers.
fn tip_distance_score(landmarks: &LandmarkSet, hand_size: f32, t: &FistThresholds) -> Option<f32> {
    let wrist = landmarks.wrist();
    let mean = Finger::LONG
        .iter()
        .map(|f| distance_3d(landmarks.get(f.tip()), wrist))
        .sum::<f32>()
        / Finger::LONG.len() as f32;
    let threshold = hand_size * t.tip_distance_factor;

    (mean < threshold).then(|| 1.0 - mean / threshold)
}

/// Mean pairwise distance between the four long fingertips.
fn grouping_score(landmarks: &LandmarkSet, hand_size: f32, t: &FistThresholds) -> Option<f32> {
    let tips = Finger::LONG.map(|f| landmarks.get(f.tip()));
    let mut total = 0.0;
    let mut pairs = 0;
    for i in 0..tips.len() {
        for j in (i + 1)..tips.len() {
            total += distance_3d(tips[i], tips[j]);
            pairs += 1;
        }
    }
    let mean = total / pairs as f32;
    let threshold = hand_size * t.grouping_factor;

    (mean < threshold).then(|| 1.0 - mean / threshold)
}
