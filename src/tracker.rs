//! Per-session gesture pipeline.
//!
//! `GestureTracker` owns the smoothing window and confirmation gate for one
//! stream and runs classify, smooth and confirm on every frame. It also keeps
//! running session statistics.

use std::time::Instant;

use serde::Serialize;

use crate::classifier::{classify, Classification, Gesture};
use crate::config::RecognitionConfig;
use crate::confirm::ConfirmationGate;
use crate::landmarks::{FrameShape, LandmarkSet};
use crate::smoothing::GestureSmoother;

/// What one frame produced.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct TrackerUpdate {
    pub raw: Classification,
    pub smoothed: Classification,
    /// Set on the single frame where a hold completes.
    pub confirmed: Option<Gesture>,
    pub progress: f32,
}

/// Per-label tally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct GestureTally {
    pub frames: u64,
    pub confidence_sum: f64,
    pub confirmations: u64,
}

impl GestureTally {
    pub fn mean_confidence(&self) -> f64 {
        if self.frames == 0 {
            0.0
        } else {
            self.confidence_sum / self.frames as f64
        }
    }
}

/// Running statistics for one session. Counts use the smoothed label.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SessionStats {
    pub frames: u64,
    pub hand_losses: u64,
    pub confirmations: u64,
    pub rock: GestureTally,
    pub paper: GestureTally,
    pub scissors: GestureTally,
    pub none: GestureTally,
}

impl SessionStats {
    pub fn tally(&self, gesture: Gesture) -> &GestureTally {
        match gesture {
            Gesture::Rock => &self.rock,
            Gesture::Paper => &self.paper,
            Gesture::Scissors => &self.scissors,
            Gesture::None => &self.none,
        }
    }

    fn tally_mut(&mut self, gesture: Gesture) -> &mut GestureTally {
        match gesture {
            Gesture::Rock => &mut self.rock,
            Gesture::Paper => &mut self.paper,
            Gesture::Scissors => &mut self.scissors,
            Gesture::None => &mut self.none,
        }
    }

    fn record(&mut self, smoothed: Classification, confirmed: Option<Gesture>) {
        self.frames += 1;
        let tally = self.tally_mut(smoothed.gesture);
        tally.frames += 1;
        tally.confidence_sum += f64::from(smoothed.confidence);
        if let Some(gesture) = confirmed {
            self.confirmations += 1;
            self.tally_mut(gesture).confirmations += 1;
        }
    }
}

pub struct GestureTracker {
    config: RecognitionConfig,
    smoother: GestureSmoother,
    gate: ConfirmationGate,
    stats: SessionStats,
}

impl GestureTracker {
    pub fn new(config: RecognitionConfig) -> Self {
        Self {
            smoother: GestureSmoother::new(config.smoothing_frames),
            gate: ConfirmationGate::new(),
            stats: SessionStats::default(),
            config,
        }
    }

    pub fn process(&mut self, landmarks: &LandmarkSet, shape: FrameShape) -> TrackerUpdate {
        self.process_at(landmarks, shape, Instant::now())
    }

    /// Run one frame observed at `now`.
    pub fn process_at(
        &mut self,
        landmarks: &LandmarkSet,
        shape: FrameShape,
        now: Instant,
    ) -> TrackerUpdate {
        let raw = classify(landmarks, shape, &self.config);
        let smoothed = self.smoother.smooth(raw);
        let hold = self.config.hold_time;
        let confirmed = self.gate.confirm_at(smoothed.gesture, hold, now);
        let progress = self.gate.progress_at(hold, now);
        self.stats.record(smoothed, confirmed);
        TrackerUpdate {
            raw,
            smoothed,
            confirmed,
            progress,
        }
    }

    /// The hand left the frame. Drops the window and any partial hold.
    pub fn hand_lost(&mut self) {
        if self.smoother.is_empty() && self.gate.current().is_none() {
            return;
        }
        self.stats.hand_losses += 1;
        log::info!("hand lost, resetting gesture state");
        self.reset();
    }

    /// Clear smoothing and confirmation state. Statistics are kept.
    pub fn reset(&mut self) {
        self.smoother.clear();
        self.gate.reset();
    }

    pub fn progress_at(&self, now: Instant) -> f32 {
        self.gate.progress_at(self.config.hold_time, now)
    }

    pub fn current(&self) -> Option<Gesture> {
        self.gate.current()
    }

    pub fn config(&self) -> &RecognitionConfig {
        &self.config
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }
}
