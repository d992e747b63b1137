use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::detect::backend::{DetectionCapability, DetectorSettings, LandmarkBackend};
use crate::detect::result::{DetectionResult, HandDetection, Handedness};
use crate::synthetic::{with_jitter, Pose};

/// Reported detector confidence for synthetic hands.
const SYNTHETIC_CONFIDENCE: f32 = 0.95;

/// One stretch of the scripted timeline. `None` means no hand in frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Segment {
    pub pose: Option<Pose>,
    pub frames: u32,
}

impl Segment {
    pub fn hand(pose: Pose, frames: u32) -> Self {
        Self {
            pose: Some(pose),
            frames,
        }
    }

    pub fn empty(frames: u32) -> Self {
        Self { pose: None, frames }
    }
}

/// Scripted backend for demos and tests. Ignores pixel data and plays back a
/// looping timeline of poses, optionally with seeded landmark jitter.
pub struct SyntheticBackend {
    timeline: Vec<Segment>,
    cursor: usize,
    frame_in_segment: u32,
    jitter: f32,
    rng: StdRng,
    min_confidence: f32,
    frames_generated: u64,
}

impl SyntheticBackend {
    pub fn new(timeline: Vec<Segment>) -> Self {
        Self {
            timeline: timeline.into_iter().filter(|s| s.frames > 0).collect(),
            cursor: 0,
            frame_in_segment: 0,
            jitter: 0.0,
            rng: StdRng::seed_from_u64(0),
            min_confidence: 0.0,
            frames_generated: 0,
        }
    }

    /// A single pose held forever.
    pub fn constant(pose: Pose) -> Self {
        Self::new(vec![Segment::hand(pose, 1)])
    }

    /// Each pose held for a second and a half at 30 fps with short gaps
    /// between them, lightly jittered.
    pub fn demo_cycle() -> Self {
        Self::new(vec![
            Segment::hand(Pose::Rock, 45),
            Segment::empty(10),
            Segment::hand(Pose::Paper, 45),
            Segment::empty(10),
            Segment::hand(Pose::Scissors, 45),
            Segment::empty(10),
        ])
        .with_jitter(0.003, 0)
    }

    /// Perturb every landmark by up to `amplitude`, deterministically per seed.
    pub fn with_jitter(mut self, amplitude: f32, seed: u64) -> Self {
        self.jitter = amplitude.max(0.0);
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Replace the remaining script, restarting from its first frame.
    pub fn set_timeline(&mut self, timeline: Vec<Segment>) {
        self.timeline = timeline.into_iter().filter(|s| s.frames > 0).collect();
        self.cursor = 0;
        self.frame_in_segment = 0;
    }

    pub fn frames_generated(&self) -> u64 {
        self.frames_generated
    }

    fn next_pose(&mut self) -> Option<Pose> {
        let segment = *self.timeline.get(self.cursor)?;
        self.frame_in_segment += 1;
        if self.frame_in_segment >= segment.frames {
            self.frame_in_segment = 0;
            self.cursor = (self.cursor + 1) % self.timeline.len();
        }
        segment.pose
    }
}

impl Default for SyntheticBackend {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl LandmarkBackend for SyntheticBackend {
    fn name(&self) -> &'static str {
        "synthetic"
    }

    fn supports(&self, capability: DetectionCapability) -> bool {
        matches!(
            capability,
            DetectionCapability::HandLandmarks | DetectionCapability::Handedness
        )
    }

    fn detect(&mut self, _pixels: &[u8], _width: u32, _height: u32) -> Result<DetectionResult> {
        self.frames_generated += 1;
        let Some(pose) = self.next_pose() else {
            return Ok(DetectionResult::empty());
        };
        if SYNTHETIC_CONFIDENCE < self.min_confidence {
            return Ok(DetectionResult::empty());
        }
        let landmarks = with_jitter(&pose.landmarks(), &mut self.rng, self.jitter);
        Ok(DetectionResult::single(HandDetection {
            landmarks,
            confidence: SYNTHETIC_CONFIDENCE,
            handedness: Handedness::Right,
        }))
    }

    fn configure(&mut self, settings: &DetectorSettings) {
        self.min_confidence = settings.min_detection_confidence;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthetic;

    #[test]
    fn plays_timeline_in_order_and_loops() {
        let mut backend = SyntheticBackend::new(vec![
            Segment::hand(Pose::Rock, 2),
            Segment::empty(1),
            Segment::hand(Pose::Paper, 1),
        ]);
        let mut seen = Vec::new();
        for _ in 0..6 {
            let result = backend.detect(&[], 640, 480).unwrap();
            seen.push(result.primary().map(|h| h.landmarks));
        }
        assert_eq!(seen[0], Some(synthetic::closed_fist()));
        assert_eq!(seen[1], Some(synthetic::closed_fist()));
        assert_eq!(seen[2], None);
        assert_eq!(seen[3], Some(synthetic::open_hand()));
        assert_eq!(seen[4], Some(synthetic::closed_fist()));
        assert_eq!(backend.frames_generated(), 6);
    }

    #[test]
    fn empty_timeline_sees_no_hand() {
        let mut backend = SyntheticBackend::default();
        assert!(backend.detect(&[], 640, 480).unwrap().is_empty());
    }

    #[test]
    fn detection_threshold_is_honoured() {
        let mut backend = SyntheticBackend::constant(Pose::Scissors);
        backend.configure(&DetectorSettings {
            min_detection_confidence: 0.99,
            ..DetectorSettings::default()
        });
        assert!(backend.detect(&[], 640, 480).unwrap().is_empty());
    }

    #[test]
    fn jitter_is_reproducible() {
        let mut a = SyntheticBackend::constant(Pose::Paper).with_jitter(0.003, 42);
        let mut b = SyntheticBackend::constant(Pose::Paper).with_jitter(0.003, 42);
        let ra = a.detect(&[], 640, 480).unwrap();
        let rb = b.detect(&[], 640, 480).unwrap();
        assert_eq!(ra, rb);
        assert_ne!(ra.hands[0].landmarks, synthetic::open_hand());
    }
}
