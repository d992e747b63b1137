//! Gesture Kernel
//!
//! Rock/paper/scissors recognition over 21-point hand landmarks.
//!
//! # Pipeline
//!
//! 1. A detector backend (`detect`) turns a camera frame into zero or more
//!    normalized `LandmarkSet`s. Inference itself happens outside this crate.
//! 2. `fingers` decides which fingers are extended by joint-distance ratios
//!    and PIP angle voting.
//! 3. `fist` scores how closed the hand is; `classifier` combines both into a
//!    per-frame `(Gesture, confidence)`.
//! 4. `smoothing` majority-votes over a short trailing window.
//! 5. `confirm` turns a stable label held for the hold time into a one-shot
//!    confirmed event, and reports hold progress for UI feedback.
//!
//! `tracker` wires stages 2-5 together for one stream. `game` consumes the
//! confirmed gestures in survival mode.
//!
//! # Module Structure
//!
//! - `landmarks`, `geometry`: points, frame shape, distance and angle math
//! - `fingers`, `fist`, `classifier`: per-frame recognition
//! - `smoothing`, `confirm`, `tracker`: temporal stabilization
//! - `config`: thresholds and runtime configuration (TOML + env)
//! - `detect`: backend trait, registry, replay and synthetic backends
//! - `synthetic`: canonical hand poses for demos and tests

pub mod classifier;
pub mod config;
pub mod confirm;
pub mod detect;
pub mod fingers;
pub mod fist;
pub mod game;
pub mod geometry;
pub mod landmarks;
pub mod smoothing;
pub mod synthetic;
pub mod tracker;

pub use classifier::{classify, Classification, Gesture};
pub use config::{
    FingerThresholds, FistThresholds, GestureConfig, RecognitionConfig, ScissorsThresholds,
};
pub use confirm::ConfirmationGate;
pub use detect::{
    BackendRegistry, DetectionCapability, DetectionResult, DetectorSettings, HandDetection,
    Handedness, LandmarkBackend, ReplayBackend, SyntheticBackend,
};
pub use fingers::{finger_states, FingerStates};
pub use fist::{fist_closure, FistScore};
pub use game::{determine_winner, GameLogic, GameStats, Move, RoundResult};
pub use landmarks::{Finger, FrameShape, Landmark, LandmarkSet, LANDMARK_COUNT};
pub use smoothing::GestureSmoother;
pub use synthetic::Pose;
pub use tracker::{GestureTracker, SessionStats, TrackerUpdate};
