//! Normalized hand landmark boundary.
//!
//! Detector backends hand the kernel a `LandmarkSet`: exactly 21 points in
//! normalized image coordinates, indexed by anatomical convention. The set is
//! built once at the detector boundary and never re-validated downstream, so
//! the recognition core does not branch on input shape.

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

/// Number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// One landmark in normalized image coordinates (z is relative depth).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Pixel dimensions of the frame the landmarks were detected in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameShape {
    pub height: u32,
    pub width: u32,
}

impl FrameShape {
    pub const fn new(height: u32, width: u32) -> Self {
        Self { height, width }
    }
}

impl Default for FrameShape {
    fn default() -> Self {
        Self::new(480, 640)
    }
}

/// The five digits, in finger-state order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    pub const ALL: [Finger; 5] = [
        Finger::Thumb,
        Finger::Index,
        Finger::Middle,
        Finger::Ring,
        Finger::Pinky,
    ];

    /// The four digits that share the tip/pip/mcp geometry.
    pub const LONG: [Finger; 4] = [Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn tip(self) -> usize {
        match self {
            Finger::Thumb => THUMB_TIP,
            Finger::Index => INDEX_TIP,
            Finger::Middle => MIDDLE_TIP,
            Finger::Ring => RING_TIP,
            Finger::Pinky => PINKY_TIP,
        }
    }

    /// Middle joint. For the thumb this is the IP joint.
    pub fn pip(self) -> usize {
        match self {
            Finger::Thumb => THUMB_IP,
            Finger::Index => INDEX_PIP,
            Finger::Middle => MIDDLE_PIP,
            Finger::Ring => RING_PIP,
            Finger::Pinky => PINKY_PIP,
        }
    }

    pub fn mcp(self) -> usize {
        match self {
            Finger::Thumb => THUMB_MCP,
            Finger::Index => INDEX_MCP,
            Finger::Middle => MIDDLE_MCP,
            Finger::Ring => RING_MCP,
            Finger::Pinky => PINKY_MCP,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Finger::Thumb => "thumb",
            Finger::Index => "index",
            Finger::Middle => "middle",
            Finger::Ring => "ring",
            Finger::Pinky => "pinky",
        }
    }
}

/// A complete 21-point hand, immutable for the frame that produced it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<[f32; 3]>", into = "Vec<[f32; 3]>")]
pub struct LandmarkSet {
    points: [Landmark; LANDMARK_COUNT],
}

impl LandmarkSet {
    pub fn new(points: [Landmark; LANDMARK_COUNT]) -> Self {
        Self { points }
    }

    /// Build a set from a detector's landmark list.
    ///
    /// Rejects anything other than 21 finite points.
    pub fn from_slice(points: &[Landmark]) -> Result<Self> {
        if points.len() != LANDMARK_COUNT {
            return Err(anyhow!(
                "expected {} hand landmarks, got {}",
                LANDMARK_COUNT,
                points.len()
            ));
        }
        if let Some(idx) = points.iter().position(|p| !p.is_finite()) {
            return Err(anyhow!("landmark {} has a non-finite coordinate", idx));
        }
        let mut out = [Landmark::default(); LANDMARK_COUNT];
        out.copy_from_slice(points);
        Ok(Self { points: out })
    }

    pub fn get(&self, idx: usize) -> Landmark {
        self.points[idx]
    }

    pub fn wrist(&self) -> Landmark {
        self.points[WRIST]
    }

    pub fn points(&self) -> &[Landmark; LANDMARK_COUNT] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &Landmark> {
        self.points.iter()
    }

    /// Wrist position in pixel coordinates for the given frame.
    pub fn hand_center_px(&self, shape: FrameShape) -> (i32, i32) {
        let wrist = self.wrist();
        (
            (wrist.x * shape.width as f32) as i32,
            (wrist.y * shape.height as f32) as i32,
        )
    }

    /// Rotate every point in the image plane around the wrist.
    pub fn rotated_about_wrist(&self, degrees: f32) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let wrist = self.wrist();
        let mut points = self.points;
        for p in points.iter_mut() {
            let dx = p.x - wrist.x;
            let dy = p.y - wrist.y;
            p.x = wrist.x + dx * cos - dy * sin;
            p.y = wrist.y + dx * sin + dy * cos;
        }
        Self { points }
    }
}

impl TryFrom<Vec<[f32; 3]>> for LandmarkSet {
    type Error = anyhow::Error;

    fn try_from(raw: Vec<[f32; 3]>) -> Result<Self> {
        let points: Vec<Landmark> = raw
            .into_iter()
            .map(|[x, y, z]| Landmark::new(x, y, z))
            .collect();
        Self::from_slice(&points)
    }
}

impl From<LandmarkSet> for Vec<[f32; 3]> {
    fn from(set: LandmarkSet) -> Self {
        set.points.iter().map(|p| [p.x, p.y, p.z]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_wrong_landmark_count() {
        let points = vec![Landmark::default(); 20];
        let err = LandmarkSet::from_slice(&points).unwrap_err();
        assert!(err.to_string().contains("expected 21"));
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let mut points = vec![Landmark::default(); LANDMARK_COUNT];
        points[7].y = f32::NAN;
        let err = LandmarkSet::from_slice(&points).unwrap_err();
        assert!(err.to_string().contains("landmark 7"));
    }

    #[test]
    fn deserializes_from_triples() {
        let triples: Vec<[f32; 3]> = (0..LANDMARK_COUNT)
            .map(|i| [i as f32 * 0.01, 0.5, 0.0])
            .collect();
        let json = serde_json::to_string(&triples).unwrap();
        let set: LandmarkSet = serde_json::from_str(&json).unwrap();
        assert!((set.get(INDEX_TIP).x - 0.08).abs() < 1e-6);

        let short = serde_json::to_string(&triples[..5]).unwrap();
        assert!(serde_json::from_str::<LandmarkSet>(&short).is_err());
    }

    #[test]
    fn finger_joint_indices() {
        assert_eq!(Finger::Thumb.tip(), 4);
        assert_eq!(Finger::Thumb.pip(), 3);
        assert_eq!(Finger::Index.mcp(), 5);
        assert_eq!(Finger::Middle.pip(), 10);
        assert_eq!(Finger::Pinky.tip(), 20);
        assert_eq!(Finger::Ring.index(), 3);
    }

    #[test]
    fn hand_center_uses_frame_pixels() {
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        points[WRIST] = Landmark::new(0.5, 0.25, 0.0);
        let set = LandmarkSet::new(points);
        assert_eq!(set.hand_center_px(FrameShape::new(480, 640)), (320, 120));
    }

    #[test]
    fn rotation_keeps_wrist_fixed() {
        let mut points = [Landmark::default(); LANDMARK_COUNT];
        points[WRIST] = Landmark::new(0.5, 0.5, 0.0);
        points[MIDDLE_TIP] = Landmark::new(0.5, 0.3, 0.0);
        let rotated = LandmarkSet::new(points).rotated_about_wrist(90.0);
        assert_eq!(rotated.wrist(), Landmark::new(0.5, 0.5, 0.0));
        let tip = rotated.get(MIDDLE_TIP);
        assert!((tip.x - 0.7).abs() < 1e-5);
        assert!((tip.y - 0.5).abs() < 1e-5);
    }
}
