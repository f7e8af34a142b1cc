//! Adaptive sampling of parametric curves.
//!
//! A [`SampleSequence`] walks `t` from 0 to 1. Each advance runs a bounded
//! backtracking search ([`BacktrackingRefiner`]) for the step whose sample lands
//! closest to the target spacing, with the step ceiling halved while the
//! recent samples bend sharply ([`estimate_curvature`]).

pub mod curvature;
pub mod fixed;
pub mod refine;
pub mod sequencer;
pub mod step;
pub mod types;

pub use curvature::{estimate_curvature, CURVATURE_THRESHOLD};
pub use fixed::FixedStepSequence;
pub use refine::{BacktrackingRefiner, SamplingContext};
pub use sequencer::{SampleSequence, SampledCurve, SamplingOutcome};
pub use step::adapt_step;
pub use types::{RefinementResult, Sample, SamplingConfig, StepBounds, Termination};
