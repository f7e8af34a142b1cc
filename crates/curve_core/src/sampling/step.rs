//! Step size adaptation.

/// Above this distance/target ratio the step shrinks proportionally.
pub const SHRINK_RATIO: f64 = 2.0;
/// Below this distance/target ratio the step grows.
pub const GROW_RATIO: f64 = 0.5;
pub const GROWTH_FACTOR: f64 = 1.5;

/// Proposes a new step from the distance the current step produced.
///
/// Overshooting by more than 2x divides the step by the overshoot, landing
/// near the target for locally linear curves. Undershooting by more than 2x
/// grows the step by 1.5x. Anything in between keeps the step. The result is
/// not clamped; callers apply their [`StepBounds`](super::StepBounds).
pub fn adapt_step(current_step: f64, observed_distance: f64, target_distance: f64) -> f64 {
    let ratio = observed_distance / target_distance;
    if ratio > SHRINK_RATIO {
        current_step / ratio
    } else if ratio < GROW_RATIO {
        current_step * GROWTH_FACTOR
    } else {
        current_step
    }
}
