//! Error taxonomy for curve sampling.
//!
//! Configuration problems are reported before any evaluation takes place.
//! Evaluation problems surface mid-sequence and leave earlier samples intact.
//! Running out of sample budget is not an error; see
//! [`Termination::CapacityExceeded`](crate::sampling::Termination).

use thiserror::Error;

/// Invalid sampling configuration, detected when a sequence is constructed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("step bounds must be finite and positive (min={min}, max={max})")]
    NonPositiveStep { min: f64, max: f64 },
    #[error("MIN_STEP ({min}) must be smaller than MAX_STEP ({max})")]
    InvertedBounds { min: f64, max: f64 },
    #[error("TARGET_DISTANCE must be finite and positive, got {0}")]
    InvalidTargetDistance(f64),
    #[error("MAX_ADAPTION_ATTEMPTS must be at least 1")]
    NoAttempts,
    #[error("MAX_SAMPLES must be at least 1")]
    NoSamples,
}

/// Errors raised while producing a sample sequence.
#[derive(Debug, Error)]
pub enum SamplerError {
    #[error("invalid sampling configuration: {0}")]
    Configuration(#[from] ConfigError),
    #[error("position function failed at t={t}: {source}")]
    Evaluation {
        t: f64,
        #[source]
        source: anyhow::Error,
    },
    #[error("position function returned a non-finite point ({x}, {y}) at t={t}")]
    NonFinite { t: f64, x: f64, y: f64 },
}

impl SamplerError {
    /// Parameter value at which evaluation failed, if this is an evaluation error.
    pub fn failed_at(&self) -> Option<f64> {
        match self {
            SamplerError::Configuration(_) => None,
            SamplerError::Evaluation { t, .. } | SamplerError::NonFinite { t, .. } => Some(*t),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluation_error_reports_parameter_and_cause() {
        let err = SamplerError::Evaluation {
            t: 0.25,
            source: anyhow::anyhow!("division by zero"),
        };
        let message = err.to_string();
        assert!(message.contains("t=0.25"), "got \"{message}\"");
        assert!(message.contains("division by zero"), "got \"{message}\"");
        assert_eq!(err.failed_at(), Some(0.25));
    }

    #[test]
    fn configuration_error_has_no_parameter() {
        let err: SamplerError = ConfigError::NoSamples.into();
        assert_eq!(err.failed_at(), None);
        assert!(err.to_string().contains("MAX_SAMPLES"));
    }
}
