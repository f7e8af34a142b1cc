//! Pull-driven sample sequence over the whole parameter domain.

use super::curvature::{estimate_curvature, CURVATURE_THRESHOLD};
use super::refine::{BacktrackingRefiner, SamplingContext};
use super::types::{Sample, SamplingConfig, Termination};
use crate::equation_engine::MathContext;
use crate::error::SamplerError;
use crate::traits::{DistanceMetric, PositionFunction};
use log::debug;
use nalgebra::Point2;
use std::iter::FusedIterator;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Start,
    Stepping,
    Terminal(Termination),
    Failed,
}

/// Mutable state of one run. `last_point` is meaningful once the first sample exists.
#[derive(Debug, Clone)]
struct RunState {
    t: f64,
    step: f64,
    last_point: Point2<f64>,
    previous_point: Option<Point2<f64>>,
    earlier_point: Option<Point2<f64>>,
    sample_count: usize,
}

/// Adaptive sample sequence for one curve.
///
/// The sequence is finite and cannot be restarted; build a new one per render.
/// Each `next` call evaluates the curve at most `MAX_ADAPTION_ATTEMPTS` times.
/// An `Err` item ends the sequence; samples yielded before it remain valid.
pub struct SampleSequence<F, M> {
    ctx: SamplingContext<F, M>,
    config: SamplingConfig,
    refiner: BacktrackingRefiner,
    phase: Phase,
    state: RunState,
}

impl<F: PositionFunction, M: DistanceMetric> SampleSequence<F, M> {
    /// Validates `config` and prepares a run. No evaluation happens here.
    pub fn new(
        function: F,
        metric: M,
        config: SamplingConfig,
        math: MathContext,
    ) -> Result<Self, SamplerError> {
        Self::with_context(SamplingContext::new(function, metric, math), config)
    }

    pub fn with_context(
        ctx: SamplingContext<F, M>,
        config: SamplingConfig,
    ) -> Result<Self, SamplerError> {
        config.validate()?;
        Ok(Self {
            ctx,
            refiner: BacktrackingRefiner::new(config.target_distance, config.max_attempts),
            phase: Phase::Start,
            state: RunState {
                t: 0.0,
                step: config.bounds.max,
                last_point: Point2::origin(),
                previous_point: None,
                earlier_point: None,
                sample_count: 0,
            },
            config,
        })
    }

    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// Parameter of the most recent sample.
    pub fn t(&self) -> f64 {
        self.state.t
    }

    pub fn current_step(&self) -> f64 {
        self.state.step
    }

    pub fn sample_count(&self) -> usize {
        self.state.sample_count
    }

    /// Why the sequence ended, or `None` while it is running or after a failure.
    pub fn termination(&self) -> Option<Termination> {
        match self.phase {
            Phase::Terminal(termination) => Some(termination),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.phase == Phase::Failed
    }

    pub fn is_done(&self) -> bool {
        matches!(self.phase, Phase::Terminal(_) | Phase::Failed)
    }

    /// Drains the sequence, keeping every sample produced before it ended.
    pub fn collect_curve(mut self) -> SampledCurve {
        let mut samples = Vec::new();
        for item in self.by_ref() {
            match item {
                Ok(sample) => samples.push(sample),
                Err(err) => {
                    return SampledCurve {
                        samples,
                        outcome: SamplingOutcome::Failed(err),
                    }
                }
            }
        }

        let outcome = match self.termination() {
            Some(Termination::CapacityExceeded) => SamplingOutcome::CapacityExceeded,
            _ => SamplingOutcome::Completed,
        };
        SampledCurve { samples, outcome }
    }

    fn start(&mut self) -> Result<Sample, SamplerError> {
        let origin = self.ctx.evaluate(0.0)?;
        self.state = RunState {
            t: 0.0,
            step: self.config.bounds.max,
            last_point: origin,
            previous_point: None,
            earlier_point: None,
            sample_count: 1,
        };
        Ok(Sample {
            t: 0.0,
            location: origin,
            step: self.state.step,
        })
    }

    fn step_once(&mut self) -> Result<Sample, SamplerError> {
        let state = &self.state;
        let curvature = match state.previous_point.as_ref() {
            Some(previous) => {
                estimate_curvature(state.earlier_point.as_ref(), previous, &state.last_point)
            }
            None => 0.0,
        };

        let bounds = if curvature > CURVATURE_THRESHOLD {
            let capped = self.config.bounds.capped(self.config.bounds.max / 2.0);
            debug!(
                "curvature {:.3} at t={:.6}; capping step at {:.3e}",
                curvature, state.t, capped.max
            );
            capped
        } else {
            self.config.bounds
        };

        let result = self
            .refiner
            .refine(&self.ctx, &bounds, state.t, &state.last_point, state.step)?;

        let state = &mut self.state;
        state.earlier_point = state.previous_point.take();
        state.previous_point = Some(state.last_point);
        state.last_point = result.accepted_point;
        state.t = result.accepted_t;
        state.step = result.accepted_step;
        state.sample_count += 1;

        Ok(Sample {
            t: state.t,
            location: state.last_point,
            step: state.step,
        })
    }

    fn settle_phase(&mut self) {
        let state = &self.state;
        self.phase = if state.t >= 1.0 {
            debug!("curve completed with {} samples", state.sample_count);
            Phase::Terminal(Termination::Completed)
        } else if state.sample_count >= self.config.max_samples {
            debug!(
                "sample cap of {} reached at t={:.6}; curve is incomplete",
                self.config.max_samples, state.t
            );
            Phase::Terminal(Termination::CapacityExceeded)
        } else {
            Phase::Stepping
        };
    }
}

impl<F: PositionFunction, M: DistanceMetric> Iterator for SampleSequence<F, M> {
    type Item = Result<Sample, SamplerError>;

    fn next(&mut self) -> Option<Self::Item> {
        let produced = match self.phase {
            Phase::Start => self.start(),
            Phase::Stepping => self.step_once(),
            Phase::Terminal(_) | Phase::Failed => return None,
        };

        match produced {
            Ok(sample) => {
                self.settle_phase();
                Some(Ok(sample))
            }
            Err(err) => {
                debug!(
                    "sampling failed after {} samples: {}",
                    self.state.sample_count, err
                );
                self.phase = Phase::Failed;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.phase {
            Phase::Terminal(_) | Phase::Failed => (0, Some(0)),
            _ => (
                0,
                Some(self.config.max_samples - self.state.sample_count),
            ),
        }
    }
}

impl<F: PositionFunction, M: DistanceMetric> FusedIterator for SampleSequence<F, M> {}

/// How a drained sequence ended.
#[derive(Debug)]
pub enum SamplingOutcome {
    Completed,
    CapacityExceeded,
    Failed(SamplerError),
}

/// Every sample a sequence produced, with the reason it stopped.
#[derive(Debug)]
pub struct SampledCurve {
    pub samples: Vec<Sample>,
    pub outcome: SamplingOutcome,
}

impl SampledCurve {
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, SamplingOutcome::Completed)
    }

    pub fn error(&self) -> Option<&SamplerError> {
        match &self.outcome {
            SamplingOutcome::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn final_t(&self) -> Option<f64> {
        self.samples.last().map(|sample| sample.t)
    }
}
