//! Recorded landmark replay.
//!
//! Reads one JSON `DetectionResult` per line, for example
//! `{"hands":[{"landmarks":[[0.5,0.8,0.0], ...],"confidence":0.92,"handedness":"right"}]}`.
//! `{"hands":[]}` marks a frame with no hand. Blank lines and lines starting
//! with `#` are ignored. Malformed lines are logged and dropped.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use crate::detect::backend::{DetectionCapability, DetectorSettings, LandmarkBackend};
use crate::detect::result::DetectionResult;

/// Replay statistics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub frames_loaded: usize,
    pub lines_skipped: usize,
    pub frames_served: u64,
}

pub struct ReplayBackend {
    frames: Vec<DetectionResult>,
    cursor: usize,
    looping: bool,
    settings: DetectorSettings,
    stats: ReplayStats,
}

impl ReplayBackend {
    /// Load a recording from a local file.
    pub fn open(path: &Path) -> Result<Self> {
        let file =
            File::open(path).with_context(|| format!("open replay file {}", path.display()))?;
        let backend = Self::from_reader(BufReader::new(file))?;
        log::info!(
            "loaded {} replay frames from {}",
            backend.stats.frames_loaded,
            path.display()
        );
        Ok(backend)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut frames = Vec::new();
        let mut skipped = 0;
        for (line_no, line) in reader.lines().enumerate() {
            let line = line.context("read replay line")?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            match serde_json::from_str::<DetectionResult>(trimmed) {
                Ok(frame) => frames.push(frame),
                Err(err) => {
                    skipped += 1;
                    log::warn!("replay line {}: {}", line_no + 1, err);
                }
            }
        }
        Ok(Self {
            stats: ReplayStats {
                frames_loaded: frames.len(),
                lines_skipped: skipped,
                frames_served: 0,
            },
            frames,
            cursor: 0,
            looping: false,
            settings: DetectorSettings::default(),
        })
    }

    /// Restart from the first frame after the last one instead of stopping.
    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Frames left before the recording is exhausted.
    pub fn remaining(&self) -> usize {
        self.frames.len() - self.cursor
    }

    pub fn is_finished(&self) -> bool {
        !self.looping && self.cursor >= self.frames.len()
    }

    pub fn stats(&self) -> ReplayStats {
        self.stats
    }

    fn filter(&self, mut frame: DetectionResult) -> DetectionResult {
        let min = self.settings.min_detection_confidence;
        frame.hands.retain(|hand| hand.confidence >= min);
        frame
            .hands
            .sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        frame.hands.truncate(self.settings.max_hands);
        frame
    }
}

impl LandmarkBackend for ReplayBackend {
    fn name(&self) -> &'static str {
        "replay"
    }

    fn supports(&self, capability: DetectionCapability) -> bool {
        matches!(
            capability,
            DetectionCapability::HandLandmarks
                | DetectionCapability::Handedness
                | DetectionCapability::MultiHand
        )
    }

    fn detect(&mut self, _pixels: &[u8], _width: u32, _height: u32) -> Result<DetectionResult> {
        if self.cursor >= self.frames.len() {
            if self.looping && !self.frames.is_empty() {
                self.cursor = 0;
            } else {
                return Err(anyhow!(
                    "replay exhausted after {} frames",
                    self.stats.frames_served
                ));
            }
        }
        let frame = self.frames[self.cursor].clone();
        self.cursor += 1;
        self.stats.frames_served += 1;
        Ok(self.filter(frame))
    }

    fn configure(&mut self, settings: &DetectorSettings) {
        self.settings = *settings;
    }

    fn is_exhausted(&self) -> bool {
        self.is_finished()
    }
}
