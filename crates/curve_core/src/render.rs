//! Helpers for consumers that draw sampled curves on a canvas.

use crate::sampling::Sample;
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

pub const DEFAULT_SCALE: f64 = 60.0;
pub const DOT_SIZE_MIN: f64 = 2.0;
pub const DOT_SIZE_MAX: f64 = 5.0;

/// Maps curve coordinates to canvas pixels: scale, then offset by the center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasTransform {
    pub scale: f64,
    pub center: Point2<f64>,
}

impl CanvasTransform {
    pub fn new(scale: f64, center: Point2<f64>) -> Self {
        Self { scale, center }
    }

    /// Centered on a canvas of the given pixel size.
    pub fn for_canvas(scale: f64, width: f64, height: f64) -> Self {
        Self::new(scale, Point2::new(width / 2.0, height / 2.0))
    }

    pub fn to_canvas(&self, location: &Point2<f64>) -> Point2<f64> {
        self.center + location.coords * self.scale
    }

    pub fn from_canvas(&self, pixel: &Point2<f64>) -> Point2<f64> {
        Point2::from((pixel - self.center) / self.scale)
    }

    /// Canvas-space distance equivalent to `pixels` at this scale.
    pub fn pixels_to_units(&self, pixels: f64) -> f64 {
        pixels / self.scale
    }
}

impl Default for CanvasTransform {
    /// Scale 60 around the center of a 400x400 canvas.
    fn default() -> Self {
        Self::for_canvas(DEFAULT_SCALE, 400.0, 400.0)
    }
}

/// Smallest and largest step among a set of samples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepRange {
    pub min: f64,
    pub max: f64,
}

impl StepRange {
    pub fn from_samples(samples: &[Sample]) -> Option<Self> {
        let first = samples.first()?.step;
        let range = samples.iter().fold(
            Self {
                min: first,
                max: first,
            },
            |range, sample| Self {
                min: range.min.min(sample.step),
                max: range.max.max(sample.step),
            },
        );
        Some(range)
    }

    /// Position of `step` within the range, 0 at `min`; 0 for an empty range.
    pub fn normalize(&self, step: f64) -> f64 {
        if self.max > self.min {
            ((step - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Dot radius for a sample: fine steps (busy regions) get the largest dots.
    pub fn dot_radius(&self, step: f64) -> f64 {
        DOT_SIZE_MIN + (1.0 - self.normalize(step)) * (DOT_SIZE_MAX - DOT_SIZE_MIN)
    }
}

/// Canvas positions of every sample, in order.
pub fn project_samples(samples: &[Sample], transform: &CanvasTransform) -> Vec<Point2<f64>> {
    samples
        .iter()
        .map(|sample| transform.to_canvas(&sample.location))
        .collect()
}

/// Total polyline length of consecutive canvas points.
pub fn polyline_length(points: &[Point2<f64>]) -> f64 {
    points
        .windows(2)
        .map(|pair| (pair[1] - pair[0]).norm())
        .sum()
}
