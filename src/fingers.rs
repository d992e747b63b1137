//! Per-finger extended/flexed estimation.
//!
//! Comparing a fingertip's y coordinate against its joint only works for an
//! upright hand. Every signal here is a distance ratio or a joint angle, so the
//! result does not depend on how the hand is rotated in the image.

use std::fmt;

use crate::config::FingerThresholds;
use crate::geometry::{angle_deg, distance_3d};
use crate::landmarks::{Finger, FrameShape, LandmarkSet};

/// Extended flags in `[thumb, index, middle, ring, pinky]` order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerStates(pub [bool; 5]);

impl FingerStates {
    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0[finger.index()]
    }

    pub fn extended_count(&self) -> usize {
        self.0.iter().filter(|&&extended| extended).count()
    }

    /// Index and middle extended, ring and pinky flexed. The thumb is ignored.
    pub fn is_v_sign(&self) -> bool {
        self.is_extended(Finger::Index)
            && self.is_extended(Finger::Middle)
            && !self.is_extended(Finger::Ring)
            && !self.is_extended(Finger::Pinky)
    }
}

/// Comma-separated names of the extended fingers.
impl fmt::Display for FingerStates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for finger in Finger::ALL {
            if self.is_extended(finger) {
                if !first {
                    f.write_str(",")?;
                }
                f.write_str(finger.as_str())?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Classify each finger of one hand as extended or flexed.
pub fn finger_states(
    landmarks: &LandmarkSet,
    _shape: FrameShape,
    thresholds: &FingerThresholds,
) -> FingerStates {
    let mut states = [false; 5];
    states[Finger::Thumb.index()] = thumb_extended(landmarks, thresholds);
    for finger in Finger::LONG {
        states[finger.index()] = finger_votes(landmarks, finger, thresholds) >= thresholds.min_votes;
    }
    FingerStates(states)
}

/// Thumb: tip must sit clearly further from the wrist than the IP joint.
fn thumb_extended(landmarks: &LandmarkSet, thresholds: &FingerThresholds) -> bool {
    let wrist = landmarks.wrist();
    let tip = landmarks.get(Finger::Thumb.tip());
    let ip = landmarks.get(Finger::Thumb.pip());
    distance_3d(tip, wrist) > distance_3d(ip, wrist) * thresholds.thumb_ratio
}

/// Number of extension signals (0..=3) that agree for a long finger.
pub fn finger_votes(landmarks: &LandmarkSet, finger: Finger, thresholds: &FingerThresholds) -> u8 {
    let wrist = landmarks.wrist();
    let tip = landmarks.get(finger.tip());
    let pip = landmarks.get(finger.pip());
    let mcp = landmarks.get(finger.mcp());

    let joint_ratio = distance_3d(tip, mcp) > distance_3d(pip, mcp) * thresholds.distance_ratio;
    let wrist_ratio = distance_3d(tip, wrist) > distance_3d(mcp, wrist) * thresholds.wrist_ratio;
    let straight = angle_deg(tip, pip, mcp) > thresholds.angle_deg;

    joint_ratio as u8 + wrist_ratio as u8 + straight as u8
}
