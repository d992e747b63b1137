//! Hold-time confirmation gate.
//!
//! A smoothed gesture becomes a confirmed event only after it has been held
//! for `hold` without interruption. Each contiguous run of the same label
//! confirms at most once; changing the label re-arms the gate.

use std::time::{Duration, Instant};

use crate::classifier::Gesture;

#[derive(Clone, Debug, Default)]
pub struct ConfirmationGate {
    last: Option<Gesture>,
    started: Option<Instant>,
    confirmed: bool,
}

impl ConfirmationGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current smoothed gesture using the wall clock.
    pub fn confirm(&mut self, gesture: Gesture, hold: Duration) -> Option<Gesture> {
        self.confirm_at(gesture, hold, Instant::now())
    }

    /// Feed the current smoothed gesture observed at `now`.
    ///
    /// Returns the gesture on the single call where its run first reaches
    /// `hold`. `none` is tracked like any other label but never returned.
    pub fn confirm_at(&mut self, gesture: Gesture, hold: Duration, now: Instant) -> Option<Gesture> {
        if self.last != Some(gesture) {
            self.last = Some(gesture);
            self.started = Some(now);
            self.confirmed = false;
            return None;
        }

        let elapsed = self.elapsed(now);
        if elapsed >= hold && !self.confirmed {
            self.confirmed = true;
            if gesture.is_actionable() {
                log::info!("gesture confirmed: {} after {:?}", gesture, elapsed);
                return Some(gesture);
            }
        }
        None
    }

    /// Progress of the current run toward `hold`, in [0, 1].
    pub fn progress(&self, hold: Duration) -> f32 {
        self.progress_at(hold, Instant::now())
    }

    pub fn progress_at(&self, hold: Duration, now: Instant) -> f32 {
        match self.last {
            Some(gesture) if gesture.is_actionable() => {}
            _ => return 0.0,
        }
        if hold.is_zero() {
            return 1.0;
        }
        (self.elapsed(now).as_secs_f32() / hold.as_secs_f32()).min(1.0)
    }

    /// Label of the run currently being timed.
    pub fn current(&self) -> Option<Gesture> {
        self.last
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn elapsed(&self, now: Instant) -> Duration {
        self.started
            .map(|start| now.saturating_duration_since(start))
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOLD: Duration = Duration::from_millis(500);

    fn ms(base: Instant, millis: u64) -> Instant {
        base + Duration::from_millis(millis)
    }

    #[test]
    fn first_frame_never_confirms() {
        let mut gate = ConfirmationGate::new();
        let t0 = Instant::now();
        assert_eq!(gate.confirm_at(Gesture::Rock, Duration::ZERO, t0), None);
        assert_eq!(gate.confirm_at(Gesture::Rock, Duration::ZERO, t0), Some(Gesture::Rock));
    }

    #[test]
    fn fires_once_per_run() {
        let mut gate = ConfirmationGate::new();
        let t0 = Instant::now();
        assert_eq!(gate.confirm_at(Gesture::Paper, HOLD, t0), None);
        assert_eq!(gate.confirm_at(Gesture::Paper, HOLD, ms(t0, 250)), None);
        assert_eq!(gate.confirm_at(Gesture::Paper, HOLD, ms(t0, 510)), Some(Gesture::Paper));
        for step in 1..=10 {
            assert_eq!(gate.confirm_at(Gesture::Paper, HOLD, ms(t0, 510 + step * 60)), None);
        }
        assert!(gate.is_confirmed());
    }

    #[test]
    fn label_change_rearms() {
        let mut gate = ConfirmationGate::new();
        let t0 = Instant::now();
        gate.confirm_at(Gesture::Rock, HOLD, t0);
        assert_eq!(gate.confirm_at(Gesture::Rock, HOLD, ms(t0, 600)), Some(Gesture::Rock));

        assert_eq!(gate.confirm_at(Gesture::Scissors, HOLD, ms(t0, 700)), None);
        assert!(!gate.is_confirmed());
        assert_eq!(gate.confirm_at(Gesture::Rock, HOLD, ms(t0, 800)), None);
        assert_eq!(gate.confirm_at(Gesture::Rock, HOLD, ms(t0, 1300)), Some(Gesture::Rock));
    }

    #[test]
    fn interrupted_run_restarts_timer() {
        let mut gate = ConfirmationGate::new();
        let t0 = Instant::now();
        gate.confirm_at(Gesture::Rock, HOLD, t0);
        gate.confirm_at(Gesture::Paper, HOLD, ms(t0, 400));
        assert_eq!(gate.confirm_at(Gesture::Rock, HOLD, ms(t0, 450)), None);
        assert_eq!(gate.confirm_at(Gesture::Rock, HOLD, ms(t0, 900)), None);
        assert_eq!(gate.confirm_at(Gesture::Rock, HOLD, ms(t0, 950)), Some(Gesture::Rock));
    }

    #[test]
    fn none_is_never_emitted() {
        let mut gate = ConfirmationGate::new();
        let t0 = Instant::now();
        gate.confirm_at(Gesture::None, HOLD, t0);
        assert_eq!(gate.confirm_at(Gesture::None, HOLD, ms(t0, 2000)), None);
        assert_eq!(gate.progress_at(HOLD, ms(t0, 2000)), 0.0);
    }

    #[test]
    fn progress_tracks_elapsed_fraction() {
        let mut gate = ConfirmationGate::new();
        let t0 = Instant::now();
        assert_eq!(gate.progress_at(HOLD, t0), 0.0);
        gate.confirm_at(Gesture::Scissors, HOLD, t0);
        assert!((gate.progress_at(HOLD, ms(t0, 250)) - 0.5).abs() < 1e-3);
        assert_eq!(gate.progress_at(HOLD, ms(t0, 5000)), 1.0);
    }

    #[test]
    fn reset_clears_state() {
        let mut gate = ConfirmationGate::new();
        let t0 = Instant::now();
        gate.confirm_at(Gesture::Rock, HOLD, t0);
        gate.confirm_at(Gesture::Rock, HOLD, ms(t0, 600));
        gate.reset();
        assert_eq!(gate.progress_at(HOLD, ms(t0, 700)), 0.0);
        assert_eq!(gate.current(), None);
        assert_eq!(gate.confirm_at(Gesture::Rock, HOLD, ms(t0, 700)), None);
        assert_eq!(gate.confirm_at(Gesture::Rock, HOLD, ms(t0, 1200)), Some(Gesture::Rock));
    }
}
