//! Uniform sampling, useful as a reference rendering.

use super::refine::evaluate_checked;
use super::types::Sample;
use crate::equation_engine::MathContext;
use crate::error::SamplerError;
use crate::traits::PositionFunction;
use std::iter::FusedIterator;

pub const DEFAULT_FIXED_STEPS: usize = 1000;

/// Evaluates the curve at `t = i / steps` for `i = 0..=steps`.
pub struct FixedStepSequence<F> {
    function: F,
    math: MathContext,
    steps: usize,
    next_index: usize,
    failed: bool,
}

impl<F: PositionFunction> FixedStepSequence<F> {
    /// `steps` is raised to at least 1 so both endpoints are always sampled.
    pub fn new(function: F, steps: usize, math: MathContext) -> Self {
        Self {
            function,
            math,
            steps: steps.max(1),
            next_index: 0,
            failed: false,
        }
    }

    pub fn with_default_steps(function: F, math: MathContext) -> Self {
        Self::new(function, DEFAULT_FIXED_STEPS, math)
    }
}

impl<F: PositionFunction> Iterator for FixedStepSequence<F> {
    type Item = Result<Sample, SamplerError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.next_index > self.steps {
            return None;
        }

        let t = self.next_index as f64 / self.steps as f64;
        self.next_index += 1;
        match evaluate_checked(&self.function, t, &self.math) {
            Ok(location) => Some(Ok(Sample {
                t,
                location,
                step: 1.0 / self.steps as f64,
            })),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.failed {
            return (0, Some(0));
        }
        let remaining = (self.steps + 1).saturating_sub(self.next_index);
        (0, Some(remaining))
    }
}

impl<F: PositionFunction> FusedIterator for FixedStepSequence<F> {}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point2;

    #[test]
    fn covers_both_endpoints_uniformly() {
        let samples: Vec<Sample> = FixedStepSequence::new(
            |t: f64, _: &MathContext| Ok::<_, anyhow::Error>(Point2::new(t, t * t)),
            4,
            MathContext::default(),
        )
        .collect::<Result<_, _>>()
        .expect("every sample should evaluate");

        let ts: Vec<f64> = samples.iter().map(|s| s.t).collect();
        assert_eq!(ts, vec![0.0, 0.25, 0.5, 0.75, 1.0]);
        assert!(samples.iter().all(|s| s.step == 0.25));
    }

    #[test]
    fn stops_after_first_failure() {
        let mut sequence = FixedStepSequence::new(
            |t: f64, _: &MathContext| -> anyhow::Result<Point2<f64>> {
                if t >= 0.5 {
                    anyhow::bail!("no")
                }
                Ok(Point2::new(t, 0.0))
            },
            10,
            MathContext::default(),
        );
        let ok = sequence.by_ref().take_while(Result::is_ok).count();
        assert_eq!(ok, 5);
        assert!(sequence.next().is_none());
    }
}
