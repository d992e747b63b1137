//! Distance and joint-angle math over landmarks.

use crate::landmarks::Landmark;

/// Denominator guard for zero-length vectors.
pub const EPS: f32 = 1e-6;

/// Euclidean distance between two landmarks.
pub fn distance_3d(a: Landmark, b: Landmark) -> f32 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    (dx * dx + dy * dy + dz * dz).sqrt()
}

/// Angle in degrees at `vertex` between the rays to `a` and `b`.
///
/// Uses cos(θ) = (v1 · v2) / (|v1| × |v2| + EPS), clamped to [-1, 1]
/// before `acos`. A zero-length ray yields 90°.
pub fn angle_deg(a: Landmark, vertex: Landmark, b: Landmark) -> f32 {
    let v1 = (a.x - vertex.x, a.y - vertex.y, a.z - vertex.z);
    let v2 = (b.x - vertex.x, b.y - vertex.y, b.z - vertex.z);

    let dot = v1.0 * v2.0 + v1.1 * v2.1 + v1.2 * v2.2;
    let mag1 = (v1.0 * v1.0 + v1.1 * v1.1 + v1.2 * v1.2).sqrt();
    let mag2 = (v2.0 * v2.0 + v2.1 * v2.1 + v2.2 * v2.2).sqrt();

    let cos_angle = (dot / (mag1 * mag2 + EPS)).clamp(-1.0, 1.0);
    cos_angle.acos().to_degrees()
}
