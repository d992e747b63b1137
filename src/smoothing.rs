//! Majority-vote smoothing over a trailing window of classifications.

use std::collections::VecDeque;

use crate::classifier::{Classification, Gesture};

/// Default number of frames in the smoothing window.
pub const DEFAULT_WINDOW: usize = 5;

/// Below this many samples the raw classification passes through unchanged.
const MIN_SAMPLES: usize = 3;

/// Bounded FIFO of recent per-frame classifications.
#[derive(Clone, Debug)]
pub struct GestureSmoother {
    window: VecDeque<Classification>,
    capacity: usize,
}

impl GestureSmoother {
    /// A zero capacity is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            window: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push the newest classification and return the stabilized one.
    ///
    /// Once at least three samples are buffered, the most frequent label wins
    /// if it holds at least `len / 2` (floor) slots, reporting the mean
    /// confidence of its own samples. Ties go to the label seen first in the
    /// window. Without such a label the result is `none` with zero confidence.
    pub fn smooth(&mut self, current: Classification) -> Classification {
        while self.window.len() >= self.capacity {
            self.window.pop_front();
        }
        self.window.push_back(current);

        if self.window.len() < MIN_SAMPLES {
            return current;
        }

        let mut tally: Vec<(Gesture, usize, f32)> = Vec::with_capacity(Gesture::ALL.len());
        for sample in &self.window {
            match tally.iter_mut().find(|(g, _, _)| *g == sample.gesture) {
                Some(entry) => {
                    entry.1 += 1;
                    entry.2 += sample.confidence;
                }
                None => tally.push((sample.gesture, 1, sample.confidence)),
            }
        }

        let mut best = tally[0];
        for entry in &tally[1..] {
            if entry.1 > best.1 {
                best = *entry;
            }
        }

        let majority = self.window.len() / 2;
        let (gesture, count, confidence_sum) = best;
        if count >= majority {
            Classification::new(gesture, confidence_sum / count as f32)
        } else {
            Classification::NONE
        }
    }

    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.window.clear();
    }
}

impl Default for GestureSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}
