//! Hand-landmark detector backends.
//!
//! Camera capture and landmark inference live outside this crate. A backend
//! adapter turns whatever its detector produces into normalized
//! `LandmarkSet`s, so the recognition core never sees which detector API
//! generation or vendor produced the points.

mod backend;
mod backends;
mod registry;
mod result;

pub use backend::{DetectionCapability, DetectorSettings, LandmarkBackend};
pub use backends::synthetic::Segment;
pub use backends::{ReplayBackend, SyntheticBackend};
pub use registry::BackendRegistry;
pub use result::{DetectionResult, HandDetection, Handedness};
