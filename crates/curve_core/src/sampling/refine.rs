//! Bounded backtracking search for the next sample.

use super::step::adapt_step;
use super::types::{RefinementResult, StepBounds};
use crate::equation_engine::MathContext;
use crate::error::SamplerError;
use crate::traits::{DistanceMetric, PositionFunction};
use log::trace;
use nalgebra::Point2;

/// A candidate within this relative error of the target ends the search early.
pub const TOLERANCE_FACTOR: f64 = 0.1;

/// Candidates this close to the end of the domain snap to exactly 1.0.
pub const END_SNAP_TOLERANCE: f64 = 1e-9;

/// Everything needed to evaluate and measure a curve during one run.
pub struct SamplingContext<F, M> {
    pub function: F,
    pub metric: M,
    pub math: MathContext,
}

impl<F: PositionFunction, M: DistanceMetric> SamplingContext<F, M> {
    pub fn new(function: F, metric: M, math: MathContext) -> Self {
        Self {
            function,
            metric,
            math,
        }
    }

    /// Evaluates the curve, rejecting failures and non-finite points.
    pub fn evaluate(&self, t: f64) -> Result<Point2<f64>, SamplerError> {
        evaluate_checked(&self.function, t, &self.math)
    }

    pub fn distance(&self, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
        self.metric.distance(a, b)
    }
}

pub(crate) fn evaluate_checked<F: PositionFunction>(
    function: &F,
    t: f64,
    math: &MathContext,
) -> Result<Point2<f64>, SamplerError> {
    let point = function
        .evaluate(t, math)
        .map_err(|source| SamplerError::Evaluation { t, source })?;
    if !(point.x.is_finite() && point.y.is_finite()) {
        return Err(SamplerError::NonFinite {
            t,
            x: point.x,
            y: point.y,
        });
    }
    Ok(point)
}

/// Parameter reached by stepping `step` from `t`, capped at the end of the domain.
pub fn advance(t: f64, step: f64) -> f64 {
    let next = t + step;
    if next >= 1.0 - END_SNAP_TOLERANCE {
        1.0
    } else {
        next
    }
}

struct Candidate {
    t: f64,
    step: f64,
    point: Point2<f64>,
    distance: f64,
    error: f64,
}

/// Searches for the step whose sample lands closest to the target distance.
///
/// Every attempt evaluates one candidate, so a search costs at most
/// `max_attempts` evaluations. The best candidate is returned even when none
/// met the tolerance.
#[derive(Debug, Clone, Copy)]
pub struct BacktrackingRefiner {
    pub target_distance: f64,
    pub max_attempts: usize,
}

impl BacktrackingRefiner {
    pub fn new(target_distance: f64, max_attempts: usize) -> Self {
        Self {
            target_distance,
            max_attempts,
        }
    }

    /// Finds the next sample after `(t, current_point)` starting from `current_step`.
    ///
    /// Only evaluation failures are returned as errors.
    pub fn refine<F: PositionFunction, M: DistanceMetric>(
        &self,
        ctx: &SamplingContext<F, M>,
        bounds: &StepBounds,
        t: f64,
        current_point: &Point2<f64>,
        current_step: f64,
    ) -> Result<RefinementResult, SamplerError> {
        let tolerance = self.target_distance * TOLERANCE_FACTOR;

        let mut step = bounds.clamp(current_step);
        let mut best = self.probe(ctx, t, step, current_point)?;
        let mut attempts_used = 1;
        step = bounds.clamp(adapt_step(step, best.distance, self.target_distance));

        if best.error >= tolerance {
            while attempts_used < self.max_attempts {
                let candidate = self.probe(ctx, t, step, current_point)?;
                attempts_used += 1;
                step = bounds.clamp(adapt_step(step, candidate.distance, self.target_distance));

                let converged = candidate.error < tolerance;
                if candidate.error < best.error {
                    best = candidate;
                }
                if converged {
                    break;
                }
            }
        }

        trace!(
            "refined t={:.6} -> {:.6} (step {:.3e}, error {:.3e}, {} attempts)",
            t,
            best.t,
            best.step,
            best.error,
            attempts_used
        );

        Ok(RefinementResult {
            accepted_t: best.t,
            accepted_step: best.step,
            accepted_point: best.point,
            attempts_used,
        })
    }

    fn probe<F: PositionFunction, M: DistanceMetric>(
        &self,
        ctx: &SamplingContext<F, M>,
        t: f64,
        step: f64,
        current_point: &Point2<f64>,
    ) -> Result<Candidate, SamplerError> {
        let candidate_t = advance(t, step);
        let point = ctx.evaluate(candidate_t)?;
        let distance = ctx.distance(current_point, &point);
        Ok(Candidate {
            t: candidate_t,
            step,
            point,
            distance,
            error: (distance - self.target_distance).abs(),
        })
    }
}
