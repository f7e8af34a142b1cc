pub mod color;
pub mod equation_engine;
pub mod error;
pub mod presets;
pub mod render;
pub mod sampling;
/// The `curve_core` crate turns user-authored parametric curves into sample
/// sequences dense enough to draw smoothly without oversampling flat regions.
///
/// Key components:
/// - **Traits**: `PositionFunction` (the curve) and `DistanceMetric` (sample spacing).
/// - **Equation Engine**: a sandboxed bytecode VM for user-written `x(t)`, `y(t)` expressions.
/// - **Sampling**: step adaptation, curvature estimation, backtracking refinement and the
///   pull-driven `SampleSequence`.
/// - **Color**: per-sample colour from user-written `r`, `g`, `b`, `a` expressions.
/// - **Render**: canvas transform and step statistics for consumers.
pub mod traits;

pub use color::{compile_color, ColorFunction, ColorSource, Rgba};
pub use equation_engine::{compile_curve, CompileError, ExpressionCurve, MathContext};
pub use error::{ConfigError, SamplerError};
pub use sampling::{
    SampleSequence, SampledCurve, Sample, SamplingConfig, SamplingOutcome, StepBounds,
    Termination,
};
pub use traits::{DistanceMetric, Euclidean, PositionFunction, ScaledEuclidean};
