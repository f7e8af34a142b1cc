use crate::equation_engine::MathContext;
use nalgebra::Point2;

/// A parametric curve supplied by the caller.
///
/// Implementations must be pure: evaluating twice at the same `t` with the
/// same context yields the same point.
pub trait PositionFunction {
    /// Evaluates the curve at `t ∈ [0, 1]`.
    /// ctx: constants the curve may read (never shared global state)
    fn evaluate(&self, t: f64, ctx: &MathContext) -> anyhow::Result<Point2<f64>>;
}

impl<F> PositionFunction for F
where
    F: Fn(f64, &MathContext) -> anyhow::Result<Point2<f64>>,
{
    fn evaluate(&self, t: f64, ctx: &MathContext) -> anyhow::Result<Point2<f64>> {
        self(t, ctx)
    }
}

/// Measures the spacing between two consecutive samples.
pub trait DistanceMetric {
    fn distance(&self, a: &Point2<f64>, b: &Point2<f64>) -> f64;
}

impl<F> DistanceMetric for F
where
    F: Fn(&Point2<f64>, &Point2<f64>) -> f64,
{
    fn distance(&self, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
        self(a, b)
    }
}

/// Plain Euclidean distance in function space.
#[derive(Debug, Clone, Copy, Default)]
pub struct Euclidean;

impl DistanceMetric for Euclidean {
    fn distance(&self, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
        nalgebra::distance(a, b)
    }
}

/// Euclidean distance after scaling into screen space.
/// With `scale` pixels per unit, target distances are expressed in pixels.
#[derive(Debug, Clone, Copy)]
pub struct ScaledEuclidean {
    pub scale: f64,
}

impl DistanceMetric for ScaledEuclidean {
    fn distance(&self, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
        nalgebra::distance(a, b) * self.scale.abs()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scaled_metric_multiplies_function_space_distance() {
        let a = Point2::new(0.0, 0.0);
        let b = Point2::new(3.0, 4.0);
        assert_eq!(Euclidean.distance(&a, &b), 5.0);
        assert_eq!(ScaledEuclidean { scale: 60.0 }.distance(&a, &b), 300.0);
    }

    #[test]
    fn closures_act_as_metrics_and_curves() {
        let manhattan = |a: &Point2<f64>, b: &Point2<f64>| (a.x - b.x).abs() + (a.y - b.y).abs();
        assert_eq!(manhattan.distance(&Point2::new(1.0, 1.0), &Point2::new(2.0, 3.0)), 3.0);

        let diagonal = |t: f64, _ctx: &MathContext| Ok::<_, anyhow::Error>(Point2::new(t, t));
        let point = diagonal
            .evaluate(0.5, &MathContext::default())
            .expect("closure curve should evaluate");
        assert_eq!(point, Point2::new(0.5, 0.5));
    }
}
