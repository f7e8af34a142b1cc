//! Core types for adaptive curve sampling.

use crate::error::ConfigError;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

/// A single accepted point on the curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub t: f64,
    pub location: Point2<f64>,
    /// Step that produced this sample. The first sample carries the initial step.
    pub step: f64,
}

/// Inclusive range of allowed step sizes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepBounds {
    #[serde(rename = "MIN_STEP")]
    pub min: f64,
    #[serde(rename = "MAX_STEP")]
    pub max: f64,
}

impl StepBounds {
    pub fn new(min: f64, max: f64) -> Result<Self, ConfigError> {
        let bounds = Self { min, max };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.min <= 0.0 || self.max <= 0.0 {
            return Err(ConfigError::NonPositiveStep {
                min: self.min,
                max: self.max,
            });
        }
        if self.min >= self.max {
            return Err(ConfigError::InvertedBounds {
                min: self.min,
                max: self.max,
            });
        }
        Ok(())
    }

    pub fn clamp(&self, step: f64) -> f64 {
        step.max(self.min).min(self.max)
    }

    pub fn contains(&self, step: f64) -> bool {
        self.min <= step && step <= self.max
    }

    /// Same bounds with the ceiling lowered to `ceiling`, never below `min`.
    pub fn capped(&self, ceiling: f64) -> Self {
        Self {
            min: self.min,
            max: self.max.min(ceiling).max(self.min),
        }
    }
}

/// Settings controlling one sampling run.
///
/// Serialized with the upper-case keys used by the drawing front end
/// (`MIN_STEP`, `MAX_STEP`, `TARGET_DISTANCE`, `MAX_ADAPTION_ATTEMPTS`, `MAX_SAMPLES`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    #[serde(flatten)]
    pub bounds: StepBounds,
    /// Desired spacing between consecutive samples, in the metric's units.
    #[serde(rename = "TARGET_DISTANCE")]
    pub target_distance: f64,
    /// Function evaluations allowed per advance.
    #[serde(rename = "MAX_ADAPTION_ATTEMPTS")]
    pub max_attempts: usize,
    /// Hard cap on emitted samples, including the one at `t = 0`.
    #[serde(rename = "MAX_SAMPLES")]
    pub max_samples: usize,
}

impl SamplingConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.bounds.validate()?;
        if !(self.target_distance.is_finite() && self.target_distance > 0.0) {
            return Err(ConfigError::InvalidTargetDistance(self.target_distance));
        }
        if self.max_attempts == 0 {
            return Err(ConfigError::NoAttempts);
        }
        if self.max_samples == 0 {
            return Err(ConfigError::NoSamples);
        }
        Ok(())
    }
}

impl Default for SamplingConfig {
    /// One pixel of spacing at a canvas scale of 60.
    fn default() -> Self {
        Self {
            bounds: StepBounds {
                min: 1.0 / 10_000.0,
                max: 1.0 / 50.0,
            },
            target_distance: 1.0 / 60.0,
            max_attempts: 3,
            max_samples: 50_000,
        }
    }
}

/// Outcome of one backtracking search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RefinementResult {
    pub accepted_t: f64,
    pub accepted_step: f64,
    pub accepted_point: Point2<f64>,
    pub attempts_used: usize,
}

/// Why a sequence stopped producing samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The parameter reached 1.0.
    Completed,
    /// The sample cap was hit first; the curve is incomplete.
    CapacityExceeded,
}
