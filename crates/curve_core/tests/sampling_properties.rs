use curve_core::presets::PRESETS;
use curve_core::{
    Euclidean, MathContext, PositionFunction, Sample, SampleSequence, SamplerError, SamplingConfig,
    ScaledEuclidean, StepBounds, Termination,
};
use nalgebra::Point2;
use std::cell::Cell;
use std::f64::consts::TAU;

fn config(min: f64, max: f64, target: f64, attempts: usize, samples: usize) -> SamplingConfig {
    SamplingConfig {
        bounds: StepBounds { min, max },
        target_distance: target,
        max_attempts: attempts,
        max_samples: samples,
    }
}

fn collect_ok(samples: impl Iterator<Item = Result<Sample, SamplerError>>) -> Vec<Sample> {
    samples
        .collect::<Result<Vec<_>, _>>()
        .expect("sampling should not fail")
}

fn assert_sequence_invariants(samples: &[Sample], config: &SamplingConfig) {
    assert!(!samples.is_empty());
    assert!(samples.len() <= config.max_samples);
    assert_eq!(samples[0].t, 0.0);
    for pair in samples.windows(2) {
        assert!(pair[1].t >= pair[0].t, "t decreased: {} -> {}", pair[0].t, pair[1].t);
    }
    for sample in samples {
        assert!((0.0..=1.0).contains(&sample.t), "t out of domain: {}", sample.t);
        assert!(
            config.bounds.contains(sample.step),
            "step {} outside {:?}",
            sample.step,
            config.bounds
        );
    }
}

#[test_log::test]
fn straight_line_converges_to_target_spacing() {
    let config = config(0.001, 0.1, 0.1, 3, 1000);
    let mut sequence = SampleSequence::new(
        |t: f64, _: &MathContext| Ok::<_, anyhow::Error>(Point2::new(t, 0.0)),
        Euclidean,
        config,
        MathContext::default(),
    )
    .expect("config should be valid");

    let samples = collect_ok(sequence.by_ref());
    assert_sequence_invariants(&samples, &config);
    assert_eq!(sequence.termination(), Some(Termination::Completed));
    assert_eq!(samples.last().map(|s| s.t), Some(1.0));
    assert!((10..=12).contains(&samples.len()), "got {} samples", samples.len());
    assert!(samples.iter().all(|s| (s.step - 0.1).abs() < 1e-9));
}

#[test_log::test]
fn constant_function_saturates_at_max_step() {
    for max_step in [0.1, 0.3, 0.25] {
        let attempts = 3;
        let evaluations = Cell::new(0usize);
        let config = config(0.001, max_step, 0.1, attempts, 1000);
        let mut sequence = SampleSequence::new(
            |_t: f64, _: &MathContext| {
                evaluations.set(evaluations.get() + 1);
                Ok::<_, anyhow::Error>(Point2::origin())
            },
            Euclidean,
            config,
            MathContext::default(),
        )
        .expect("config should be valid");

        let mut samples = Vec::new();
        let mut previous_evaluations = 0;
        while let Some(sample) = sequence.next() {
            samples.push(sample.expect("constant curve should evaluate"));
            let used = evaluations.get() - previous_evaluations;
            assert!(used <= attempts, "advance used {used} evaluations");
            previous_evaluations = evaluations.get();
        }

        assert_sequence_invariants(&samples, &config);
        let expected = (1.0 / max_step).ceil() as usize + 1;
        assert_eq!(samples.len(), expected, "max_step {max_step}");
        assert!(samples.iter().all(|s| s.step == max_step));
        assert_eq!(evaluations.get(), 1 + (expected - 1) * attempts);
        assert_eq!(sequence.termination(), Some(Termination::Completed));
    }
}

#[test_log::test]
fn sample_cap_ends_sequence_early() {
    let config = config(0.0001, 0.1, 0.1, 3, 5);
    let mut sequence = SampleSequence::new(
        |t: f64, _: &MathContext| {
            Ok::<_, anyhow::Error>(Point2::new(10.0 * (TAU * t).cos(), 10.0 * (TAU * t).sin()))
        },
        Euclidean,
        config,
        MathContext::default(),
    )
    .expect("config should be valid");

    let samples = collect_ok(sequence.by_ref());
    assert_eq!(samples.len(), 5);
    assert!(samples[4].t < 1.0);
    assert_eq!(sequence.termination(), Some(Termination::CapacityExceeded));
    assert!(sequence.next().is_none());
}

#[test_log::test]
fn failure_on_fourth_evaluation_leaves_three_samples() {
    let evaluations = Cell::new(0usize);
    let config = config(0.001, 0.1, 0.1, 3, 1000);
    let sequence = SampleSequence::new(
        |t: f64, _: &MathContext| {
            evaluations.set(evaluations.get() + 1);
            if evaluations.get() == 4 {
                anyhow::bail!("evaluation {} failed", evaluations.get());
            }
            Ok(Point2::new(t, 0.0))
        },
        Euclidean,
        config,
        MathContext::default(),
    )
    .expect("config should be valid");

    let mut observed = Vec::new();
    let mut error = None;
    for item in sequence {
        match item {
            Ok(sample) => observed.push(sample),
            Err(err) => {
                error = Some(err);
                break;
            }
        }
    }

    assert_eq!(observed.len(), 3);
    let error = error.expect("fourth evaluation should fail");
    assert!(matches!(error, SamplerError::Evaluation { .. }));
    assert!(error.to_string().contains("evaluation 4 failed"));
}

#[test_log::test]
fn sharp_bends_halve_the_step_ceiling() {
    let config = config(0.001, 0.1, 1.0, 3, 1000);
    let sequence = SampleSequence::new(
        |t: f64, _: &MathContext| {
            Ok::<_, anyhow::Error>(Point2::new((TAU * t).cos(), (TAU * t).sin()))
        },
        Euclidean,
        config,
        MathContext::default(),
    )
    .expect("config should be valid");

    let curve = sequence.collect_curve();
    assert!(curve.is_complete());
    let samples = &curve.samples;
    assert_sequence_invariants(samples, &config);
    // Three samples are needed before curvature can be estimated.
    assert_eq!(samples[1].step, 0.1);
    assert_eq!(samples[2].step, 0.1);
    assert!(samples[3..].iter().all(|s| s.step <= 0.05));
}

#[test_log::test]
fn non_finite_points_stop_the_curve() {
    let config = config(0.001, 0.1, 0.1, 3, 1000);
    let sequence = SampleSequence::new(
        |t: f64, _: &MathContext| {
            let x = if t >= 0.5 { f64::NAN } else { t };
            Ok::<_, anyhow::Error>(Point2::new(x, 0.0))
        },
        Euclidean,
        config,
        MathContext::default(),
    )
    .expect("config should be valid");

    let curve = sequence.collect_curve();
    assert!(!curve.is_complete());
    assert!(matches!(curve.error(), Some(SamplerError::NonFinite { .. })));
    assert!(curve.final_t().is_some_and(|t| t < 0.5));
}

#[test_log::test]
fn presets_sample_within_bounds_in_pixel_space() {
    let ctx = MathContext::default();
    let config = config(1.0 / 10_000.0, 1.0 / 50.0, 2.0, 3, 5000);
    for preset in PRESETS {
        let curve = preset.compile(&ctx).expect("preset should compile");
        let sequence = SampleSequence::new(
            |t: f64, ctx: &MathContext| curve.evaluate(t, ctx),
            ScaledEuclidean { scale: 60.0 },
            config,
            ctx.clone(),
        )
        .expect("config should be valid");

        let sampled = sequence.collect_curve();
        assert!(sampled.is_complete(), "preset {} did not complete", preset.name);
        assert_sequence_invariants(&sampled.samples, &config);
    }
}
