//! Plain Rust sampling session behind the WASM runner.
//!
//! Kept free of `JsValue` so it can be exercised by native tests.

use curve_core::color::colorize;
use curve_core::render::{CanvasTransform, StepRange};
use curve_core::sampling::FixedStepSequence;
use curve_core::{
    compile_color, compile_curve, ColorFunction, ColorSource, ExpressionCurve, MathContext, Rgba,
    Sample, SampleSequence, SamplingConfig, ScaledEuclidean, Termination,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Progress snapshot returned after every batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplerProgress {
    pub done: bool,
    pub sample_count: usize,
    pub t: f64,
    pub step: f64,
    pub termination: Option<Termination>,
    pub error: Option<String>,
}

/// Everything a finished (or abandoned) session produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SamplerResult {
    pub samples: Vec<Sample>,
    pub termination: Option<Termination>,
    pub error: Option<String>,
    pub step_range: Option<StepRange>,
    /// One colour per sample when a colour function was supplied.
    pub colors: Option<Vec<Rgba>>,
}

pub(crate) struct SamplerSession {
    sequence: SampleSequence<ExpressionCurve, ScaledEuclidean>,
    color: Option<ColorFunction>,
    math: MathContext,
    samples: Vec<Sample>,
    error: Option<String>,
}

/// Default constants plus caller-supplied ones (which may override `PI` or `Tau`).
pub(crate) fn math_context(constants: Option<BTreeMap<String, f64>>) -> MathContext {
    constants
        .unwrap_or_default()
        .into_iter()
        .fold(MathContext::default(), |ctx, (name, value)| {
            ctx.with_constant(name, value)
        })
}

/// Compiles and test-evaluates a curve without sampling it.
pub(crate) fn check_curve(x_expr: &str, y_expr: &str, math: &MathContext) -> Result<(), String> {
    build_curve(x_expr, y_expr, math)?
        .validate(math)
        .map_err(|e| format!("Curve evaluation failed: {}", e))
}

/// Compiles a colour function and evaluates it once at `t = 0`.
pub(crate) fn check_color(source: &ColorSource, math: &MathContext) -> Result<ColorFunction, String> {
    let color = compile_color(source, math).map_err(|e| format!("Invalid color: {}", e))?;
    color
        .evaluate(0.0, math)
        .map_err(|e| format!("Color evaluation failed: {}", e))?;
    Ok(color)
}

fn build_curve(x_expr: &str, y_expr: &str, math: &MathContext) -> Result<ExpressionCurve, String> {
    compile_curve(x_expr, y_expr, math).map_err(|e| format!("Invalid curve: {}", e))
}

fn build_color(
    source: Option<&ColorSource>,
    math: &MathContext,
) -> Result<Option<ColorFunction>, String> {
    source.map(|source| check_color(source, math)).transpose()
}

/// Packs collected samples, colouring them when a colour function is present.
fn finish(
    samples: Vec<Sample>,
    termination: Option<Termination>,
    mut error: Option<String>,
    color: Option<&ColorFunction>,
    math: &MathContext,
) -> SamplerResult {
    let colors = match color.map(|color| colorize(&samples, color, math)) {
        Some(Ok(colors)) => Some(colors),
        Some(Err(err)) => {
            log::warn!("colouring samples failed: {}", err);
            if error.is_none() {
                error = Some(format!("Color evaluation failed: {}", err));
            }
            None
        }
        None => None,
    };
    SamplerResult {
        step_range: StepRange::from_samples(&samples),
        termination,
        error,
        samples,
        colors,
    }
}

/// Samples `steps + 1` uniformly spaced points in one go.
pub(crate) fn sample_fixed(
    x_expr: &str,
    y_expr: &str,
    color: Option<&ColorSource>,
    math: MathContext,
    steps: usize,
) -> Result<SamplerResult, String> {
    let curve = build_curve(x_expr, y_expr, &math)?;
    let color = build_color(color, &math)?;

    let mut samples = Vec::new();
    let mut error = None;
    for item in FixedStepSequence::new(curve, steps, math.clone()) {
        match item {
            Ok(sample) => samples.push(sample),
            Err(err) => {
                log::warn!("fixed-step sampling failed: {}", err);
                error = Some(err.to_string());
                break;
            }
        }
    }

    let termination = error.is_none().then_some(Termination::Completed);
    Ok(finish(samples, termination, error, color.as_ref(), &math))
}

impl SamplerSession {
    pub(crate) fn new(
        x_expr: &str,
        y_expr: &str,
        color: Option<&ColorSource>,
        math: MathContext,
        config: SamplingConfig,
        scale: f64,
    ) -> Result<Self, String> {
        if !(scale.is_finite() && scale > 0.0) {
            return Err(format!("Invalid canvas scale: {}", scale));
        }

        let curve = build_curve(x_expr, y_expr, &math)?;
        let color = build_color(color, &math)?;
        let sequence = SampleSequence::new(curve, ScaledEuclidean { scale }, config, math.clone())
            .map_err(|e| format!("Invalid sampler settings: {}", e))?;

        Ok(Self {
            sequence,
            color,
            math,
            samples: Vec::new(),
            error: None,
        })
    }

    pub(crate) fn is_done(&self) -> bool {
        self.sequence.is_done()
    }

    /// Pulls up to `batch_size` samples. Stops early at the end of the curve or on failure.
    pub(crate) fn run_steps(&mut self, batch_size: usize) -> SamplerProgress {
        for item in self.sequence.by_ref().take(batch_size) {
            match item {
                Ok(sample) => self.samples.push(sample),
                Err(err) => {
                    log::warn!("curve sampling failed: {}", err);
                    self.error = Some(err.to_string());
                    break;
                }
            }
        }
        self.progress()
    }

    pub(crate) fn progress(&self) -> SamplerProgress {
        SamplerProgress {
            done: self.is_done(),
            sample_count: self.samples.len(),
            t: self.samples.last().map_or(0.0, |sample| sample.t),
            step: self.sequence.current_step(),
            termination: self.sequence.termination(),
            error: self.error.clone(),
        }
    }

    pub(crate) fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Interleaved `[x0, y0, x1, y1, ...]` canvas coordinates of the samples so far.
    pub(crate) fn canvas_points(&self, transform: &CanvasTransform) -> Vec<f64> {
        self.samples
            .iter()
            .flat_map(|sample| {
                let pixel = transform.to_canvas(&sample.location);
                [pixel.x, pixel.y]
            })
            .collect()
    }

    pub(crate) fn into_result(self) -> SamplerResult {
        finish(
            self.samples,
            self.sequence.termination(),
            self.error,
            self.color.as_ref(),
            &self.math,
        )
    }
}
