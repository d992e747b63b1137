//! Synthetic hand poses.
//!
//! Hand-built landmark sets for the three playable gestures, used by the
//! synthetic backend, the demo and tests. Geometry is an upright right hand
//! with the wrist at (0.5, 0.8), roughly a fifth of the frame tall.

use std::fmt;
use std::str::FromStr;

use anyhow::{anyhow, Result};
use rand::Rng;

use crate::classifier::Gesture;
use crate::landmarks::{Landmark, LandmarkSet, LANDMARK_COUNT};

const WRIST: Landmark = Landmark::new(0.5, 0.8, 0.0);

const INDEX_BASE: Landmark = Landmark::new(0.44, 0.60, 0.0);
const MIDDLE_BASE: Landmark = Landmark::new(0.50, 0.58, 0.0);
const RING_BASE: Landmark = Landmark::new(0.56, 0.60, 0.0);
const PINKY_BASE: Landmark = Landmark::new(0.61, 0.63, 0.0);

const THUMB_OPEN: [Landmark; 4] = [
    Landmark::new(0.42, 0.76, 0.0),
    Landmark::new(0.36, 0.70, 0.0),
    Landmark::new(0.31, 0.65, 0.0),
    Landmark::new(0.27, 0.61, 0.0),
];

const THUMB_TUCKED: [Landmark; 4] = [
    Landmark::new(0.43, 0.76, 0.0),
    Landmark::new(0.40, 0.70, -0.01),
    Landmark::new(0.42, 0.64, -0.02),
    Landmark::new(0.46, 0.62, -0.03),
];

// Phalanx lengths: mcp->pip, pip->dip, dip->tip.
const SEGMENTS: [f32; 3] = [0.06, 0.04, 0.04];

/// Poses the synthetic generator can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Pose {
    Rock,
    Paper,
    Scissors,
}

impl Pose {
    pub const ALL: [Pose; 3] = [Pose::Rock, Pose::Paper, Pose::Scissors];

    pub fn landmarks(self) -> LandmarkSet {
        match self {
            Pose::Rock => closed_fist(),
            Pose::Paper => open_hand(),
            Pose::Scissors => scissors_v(),
        }
    }

    pub fn gesture(self) -> Gesture {
        match self {
            Pose::Rock => Gesture::Rock,
            Pose::Paper => Gesture::Paper,
            Pose::Scissors => Gesture::Scissors,
        }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.gesture().as_str())
    }
}

impl FromStr for Pose {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.parse::<Gesture>()? {
            Gesture::Rock => Ok(Pose::Rock),
            Gesture::Paper => Ok(Pose::Paper),
            Gesture::Scissors => Ok(Pose::Scissors),
            Gesture::None => Err(anyhow!("'none' is not a hand pose")),
        }
    }
}

/// All five fingers straight, pointing up.
pub fn open_hand() -> LandmarkSet {
    let up = (0.0, -1.0);
    assemble(
        THUMB_OPEN,
        [
            straight(INDEX_BASE, up),
            straight(MIDDLE_BASE, up),
            straight(RING_BASE, up),
            straight(PINKY_BASE, up),
        ],
    )
}

/// Every finger curled into the palm, thumb tucked across.
pub fn closed_fist() -> LandmarkSet {
    assemble(
        THUMB_TUCKED,
        [
            curled(INDEX_BASE),
            curled(MIDDLE_BASE),
            curled(RING_BASE),
            curled(PINKY_BASE),
        ],
    )
}

/// Index and middle spread in a wide V, the rest curled.
pub fn scissors_v() -> LandmarkSet {
    assemble(
        THUMB_TUCKED,
        [
            straight(INDEX_BASE, (-0.35, -1.0)),
            straight(MIDDLE_BASE, (0.35, -1.0)),
            curled(RING_BASE),
            curled(PINKY_BASE),
        ],
    )
}

/// Add uniform noise of up to `amplitude` to every coordinate.
pub fn with_jitter<R: Rng>(hand: &LandmarkSet, rng: &mut R, amplitude: f32) -> LandmarkSet {
    if amplitude <= 0.0 {
        return *hand;
    }
    let mut points = *hand.points();
    for p in points.iter_mut() {
        p.x += rng.gen_range(-amplitude..=amplitude);
        p.y += rng.gen_range(-amplitude..=amplitude);
        p.z += rng.gen_range(-amplitude..=amplitude);
    }
    LandmarkSet::new(points)
}

fn straight(base: Landmark, direction: (f32, f32)) -> [Landmark; 4] {
    let len = (direction.0 * direction.0 + direction.1 * direction.1).sqrt();
    let (dx, dy) = (direction.0 / len, direction.1 / len);
    let mut joints = [base; 4];
    for (i, segment) in SEGMENTS.iter().enumerate() {
        let prev = joints[i];
        joints[i + 1] = Landmark::new(prev.x + dx * segment, prev.y + dy * segment, prev.z);
    }
    joints
}

fn curled(base: Landmark) -> [Landmark; 4] {
    let at = |dx: f32, dy: f32, dz: f32| Landmark::new(base.x + dx, base.y + dy, base.z + dz);
    [base, at(0.0, -0.06, -0.03), at(0.005, -0.03, -0.05), at(0.01, 0.03, -0.02)]
}

fn assemble(thumb: [Landmark; 4], fingers: [[Landmark; 4]; 4]) -> LandmarkSet {
    let mut points = [WRIST; LANDMARK_COUNT];
    points[1..5].copy_from_slice(&thumb);
    for (i, finger) in fingers.iter().enumerate() {
        let start = 5 + i * 4;
        points[start..start + 4].copy_from_slice(finger);
    }
    LandmarkSet::new(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmarks::{INDEX_MCP, INDEX_TIP, PINKY_TIP, THUMB_TIP};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn poses_place_joints_in_anatomical_slots() {
        let hand = open_hand();
        assert_eq!(hand.get(INDEX_MCP), INDEX_BASE);
        assert!((hand.get(INDEX_TIP).y - 0.46).abs() < 1e-5);
        assert_eq!(hand.get(THUMB_TIP), THUMB_OPEN[3]);
        assert!((hand.get(PINKY_TIP).y - 0.49).abs() < 1e-5);
    }

    #[test]
    fn jitter_is_bounded_and_seeded() {
        let mut a = StdRng::seed_from_u64(9);
        let mut b = StdRng::seed_from_u64(9);
        let base = closed_fist();
        let first = with_jitter(&base, &mut a, 0.01);
        assert_eq!(first, with_jitter(&base, &mut b, 0.01));
        for (p, q) in first.iter().zip(base.iter()) {
            assert!((p.x - q.x).abs() <= 0.01 + 1e-6);
            assert!((p.z - q.z).abs() <= 0.01 + 1e-6);
        }
        assert_eq!(with_jitter(&base, &mut a, 0.0), base);
    }

    #[test]
    fn pose_names_parse() {
        assert_eq!("Scissors".parse::<Pose>().unwrap(), Pose::Scissors);
        assert!("none".parse::<Pose>().is_err());
        assert_eq!(Pose::Rock.to_string(), "rock");
    }
}
