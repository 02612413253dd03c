//! Epsilon-guarded vector helpers
//!
//! Every normalized-direction computation in the engine must go through
//! `normalize_or_zero` / `alignment`: ball and player velocity are exactly
//! zero at kickoff, and a NaN produced here would poison the whole reward
//! signal for the iteration.

use nalgebra::Vector3;

/// 3D vector used throughout the engine
pub type Vec3 = Vector3<f32>;

/// Below this magnitude a vector has no defined direction
pub const DIR_EPSILON: f32 = 1e-6;

/// Normalize a vector, returning the zero vector when the magnitude is
/// too small to define a direction
#[inline]
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    let mag = v.norm();
    if mag < DIR_EPSILON {
        Vec3::zeros()
    } else {
        v / mag
    }
}

/// Cosine of the angle between two vectors
///
/// Returns 0.0 when either vector has no defined direction, so dependent
/// score terms degrade to zero instead of propagating NaN.
#[inline]
pub fn alignment(a: Vec3, b: Vec3) -> f32 {
    normalize_or_zero(a).dot(&normalize_or_zero(b))
}

/// Map `value` from `[min, max]` to `[0, 1]`, clamped at both ends
///
/// Degenerate ranges (`max <= min`) resolve to a step at `min`.
#[inline]
pub fn unit_range(value: f32, min: f32, max: f32) -> f32 {
    if max <= min {
        return if value >= min { 1.0 } else { 0.0 };
    }
    ((value - min) / (max - min)).clamp(0.0, 1.0)
}

/// Linear interpolation between `a` and `b`, with `t` clamped to `[0, 1]`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t.clamp(0.0, 1.0)
}
