//! Discrete curvature from three consecutive samples.

use nalgebra::Point2;

/// Estimates above this value halve the step ceiling for the next advance.
pub const CURVATURE_THRESHOLD: f64 = 0.1;

/// Deviation of `next` from the straight-line extrapolation of `prev → curr`,
/// relative to the length of `prev → curr`.
///
/// For evenly spaced samples this approximates the turning angle in radians.
/// Returns 0 without a previous point or when `prev` and `curr` coincide.
pub fn estimate_curvature(
    prev: Option<&Point2<f64>>,
    curr: &Point2<f64>,
    next: &Point2<f64>,
) -> f64 {
    let Some(prev) = prev else {
        return 0.0;
    };

    let heading = curr - prev;
    let segment = heading.norm();
    if !(segment > f64::EPSILON) {
        return 0.0;
    }

    let extrapolated = curr + heading;
    let deviation = (next - extrapolated).norm();
    if deviation.is_finite() {
        deviation / segment
    } else {
        0.0
    }
}
