//! Integration tests for the optimize-then-test pipeline.
//!
//! Purpose
//! -------
//! - Validate the end-to-end flow: validated sample pair, train/test split,
//!   stochastic gradient ascent on the power criterion, and a χ² test on
//!   the held-out half.
//! - Check the statistical behavior that only shows over many draws: the
//!   false-positive rate under the null (heuristic and optimized, ME and
//!   SCF) and the power under a mean shift.
//!
//! Coverage
//! --------
//! - `statistical_tests::data::TSTData`: construction, `split_tr_te`.
//! - `statistical_tests::mean_embedding::MeanEmbeddingTest` and
//!   `statistical_tests::smooth_cf::SmoothCFTest`: heuristic constructors,
//!   optimizers, `perform_test`.
//! - `optimization::gradient_ascent`: options, mini-batches, reproducibility,
//!   and the bandwidth staying positive along the trace.
//!
//! Exclusions
//! ----------
//! - Low-level feature, criterion, and validation checks; those are unit
//!   tests next to each module.
//! - Python bindings.
use ndarray::Array2;
use rust_two_sample::{
    optimization::gradient_ascent::{
        traits::{GradientMethod, SGAOptions},
        types::DEFAULT_MAX_ITER,
    },
    statistical_tests::{
        prelude::*,
        sampling::{seeded_rng, standard_normal_matrix},
    },
};

/// Purpose
/// -------
/// Draw `X ~ N(0, I_d)` and `Y ~ N(shift·e₁, I_d)` with `n` rows each.
///
/// Usage
/// -----
/// - `shift = 0.0` gives a null pair; any other value an alternative that
///   differs only along the first coordinate.
fn mean_shift_pair(n: usize, d: usize, shift: f64, seed: u64) -> TSTData {
    let mut rng = seeded_rng(seed);
    let x = standard_normal_matrix(n, d, &mut rng);
    let mut y = standard_normal_matrix(n, d, &mut rng);
    y.column_mut(0).mapv_inplace(|v| v + shift);
    TSTData::new(x, y).expect("Gaussian draws should form a valid sample pair")
}

fn short_run(mut opts: SGAOptions, max_iter: usize) -> SGAOptions {
    opts.max_iter = max_iter;
    opts
}

/// Purpose
/// -------
/// Share of `trials` null pairs (n = 500, d = 2) on which the
/// optimize-then-test pipeline rejects H0.
///
/// Usage
/// -----
/// - `fit_and_test` optimizes on the training half with the given options
///   (seeded per trial) and returns the held-out decision.
fn optimized_null_rejection_rate(
    trials: u64, base_seed: u64, opts: &SGAOptions,
    fit_and_test: impl Fn(&TSTData, &TSTData, &SGAOptions) -> bool,
) -> f64 {
    let mut rejections = 0;
    for trial in 0..trials {
        let data = mean_shift_pair(500, 2, 0.0, base_seed + trial);
        let (train, test) = data.split_tr_te(0.5, trial).expect("split should succeed");
        let trial_opts = SGAOptions { seed: trial, ..opts.clone() };
        if fit_and_test(&train, &test, &trial_opts) {
            rejections += 1;
        }
    }
    rejections as f64 / trials as f64
}

// ---- Size and power --------------------------------------------------------

#[test]
// Purpose
// -------
// Under the null the ME test rejects at roughly its nominal level.
//
// Given
// -----
// - 200 independent null pairs, n = 200, d = 2.
// - Heuristic locations (J = 3) and width, α = 0.05.
//
// Expect
// ------
// - Rejection rate in [0.01, 0.10].
fn me_false_positive_rate_is_near_alpha() {
    // Arrange
    let trials = 200_u64;
    let mut rejections = 0;

    // Act
    for trial in 0..trials {
        let data = mean_shift_pair(200, 2, 0.0, 1_000 + trial);
        let me = MeanEmbeddingTest::create_fit_gauss_heuristic(&data, 3, 0.05, trial)
            .expect("heuristic construction should succeed");
        let outcome = me.perform_test(&data).expect("null test should run");
        if outcome.h0_rejected() {
            rejections += 1;
        }
    }

    // Assert
    let rate = rejections as f64 / trials as f64;
    assert!((0.01..=0.10).contains(&rate), "false-positive rate {rate}");
}

#[test]
// Purpose
// -------
// Tuning on the training half and testing on the held-out half keeps the
// ME test at its nominal level.
//
// Given
// -----
// - 200 null pairs, n = 500, d = 2, split 0.5.
// - Joint optimization of J = 5 locations and the width (200 iterations),
//   α = 0.05.
//
// Expect
// ------
// - Rejection rate in [0.02, 0.08].
fn optimized_me_size_is_near_alpha() {
    // Arrange
    let opts = short_run(MeanEmbeddingTest::joint_options(), 200);

    // Act
    let rate = optimized_null_rejection_rate(200, 20_000, &opts, |train, test, opts| {
        let fitted = MeanEmbeddingTest::optimize_locs_width(train, 5, opts)
            .expect("optimization should return an outcome");
        let me = MeanEmbeddingTest::from_outcome(&fitted, 0.05).expect("valid final state");
        me.perform_test(test).expect("held-out test should run").h0_rejected()
    });

    // Assert
    assert!((0.02..=0.08).contains(&rate), "optimized ME size {rate}");
}

#[test]
// Purpose
// -------
// The optimized SCF pipeline also keeps its nominal level.
//
// Given
// -----
// - 200 null pairs, n = 500, d = 2, split 0.5.
// - Joint optimization of J = 5 frequencies and the width (200
//   iterations), α = 0.05, df = 10.
//
// Expect
// ------
// - Rejection rate in [0.02, 0.08].
fn optimized_scf_size_is_near_alpha() {
    // Arrange
    let opts = short_run(SmoothCFTest::joint_options(), 200);

    // Act
    let rate = optimized_null_rejection_rate(200, 30_000, &opts, |train, test, opts| {
        let fitted = SmoothCFTest::optimize_freqs_width(train, 5, opts)
            .expect("optimization should return an outcome");
        let scf = SmoothCFTest::from_outcome(&fitted, 0.05).expect("valid final state");
        scf.perform_test(test).expect("held-out test should run").h0_rejected()
    });

    // Assert
    assert!((0.02..=0.08).contains(&rate), "optimized SCF size {rate}");
}

#[test]
// Purpose
// -------
// Optimized ME tests reject a clear mean shift almost always.
//
// Given
// -----
// - 200 alternative pairs, n = 300, d = 2, shift 1.0 on the first axis.
// - Joint optimization of J = 2 locations and the width on the training
//   half (100 iterations), test on the held-out half at α = 0.01.
//
// Expect
// ------
// - Rejection rate > 0.9.
fn me_power_under_mean_shift_exceeds_ninety_percent() {
    // Arrange
    let trials = 200_u64;
    let opts = short_run(MeanEmbeddingTest::joint_options(), 100);
    let mut rejections = 0;

    // Act
    for trial in 0..trials {
        let data = mean_shift_pair(300, 2, 1.0, 5_000 + trial);
        let (train, test) = data.split_tr_te(0.5, trial).expect("split should succeed");
        let fitted = MeanEmbeddingTest::optimize_locs_width(&train, 2, &opts)
            .expect("optimization should return an outcome");
        let me = MeanEmbeddingTest::from_outcome(&fitted, 0.01).expect("valid final state");
        if me.perform_test(&test).expect("held-out test should run").h0_rejected() {
            rejections += 1;
        }
    }

    // Assert
    let rate = rejections as f64 / trials as f64;
    assert!(rate > 0.9, "power {rate}");
}

#[test]
// Purpose
// -------
// The SCF pipeline also detects a mean shift after optimization.
//
// Given
// -----
// - n = 400, d = 3, shift 1.0; J = 3 frequencies, 100 iterations.
//
// Expect
// ------
// - H0 rejected on the held-out half with df = 6.
fn scf_pipeline_rejects_mean_shift() {
    // Arrange
    let data = mean_shift_pair(400, 3, 1.0, 77);
    let (train, test) = data.split_tr_te(0.5, 3).unwrap();
    let opts = short_run(SmoothCFTest::joint_options(), 100);

    // Act
    let fitted = SmoothCFTest::optimize_freqs_width(&train, 3, &opts).unwrap();
    let scf = SmoothCFTest::from_outcome(&fitted, 0.01).unwrap();
    let outcome = scf.perform_test(&test).unwrap();

    // Assert
    assert_eq!(scf.degrees_of_freedom(), 6);
    assert!(outcome.h0_rejected(), "{outcome}");
}

// ---- Optimizer behavior ------------------------------------------------------

#[test]
// Purpose
// -------
// Full-batch ascent increases the power criterion over the run.
//
// Given
// -----
// - Shifted data, J = 2 joint ME optimization from seeded initial locations, full batch.
//
// Expect
// ------
// - The last recorded objective exceeds the first.
fn full_batch_ascent_improves_objective() {
    // Arrange
    let data = mean_shift_pair(200, 2, 0.7, 11);
    let opts = short_run(MeanEmbeddingTest::joint_options(), 150);

    // Act
    let fitted = MeanEmbeddingTest::optimize_locs_width(&data, 2, &opts).unwrap();

    // Assert
    let obj = &fitted.trace.obj_values;
    assert!(!fitted.stopped_on_fault(), "{:?}", fitted.status);
    assert!(obj[obj.len() - 1] > obj[0], "first {} last {}", obj[0], obj[obj.len() - 1]);
}

#[test]
// Purpose
// -------
// After a short burn-in, full-batch ascent is nearly monotone: the
// objective never drops by more than a small fraction of its value.
//
// Given
// -----
// - The shifted pair of `full_batch_ascent_improves_objective`, default
//   joint ME options (full batch, up to 400 iterations).
//
// Expect
// ------
// - From iteration 10 on, every drop `s_{t−1} − s_t` is at most
//   `0.01 · max(1, s_{t−1})`.
fn full_batch_trace_is_near_monotone_after_burn_in() {
    // Arrange
    let data = mean_shift_pair(200, 2, 0.7, 11);
    let opts = MeanEmbeddingTest::joint_options();

    // Act
    let fitted = MeanEmbeddingTest::optimize_locs_width(&data, 2, &opts).unwrap();

    // Assert
    let obj = &fitted.trace.obj_values;
    assert!(!fitted.stopped_on_fault(), "{:?}", fitted.status);
    for (t, pair) in obj.windows(2).enumerate().skip(10) {
        let (prev, next) = (pair[0], pair[1]);
        assert!(prev - next <= 0.01 * prev.max(1.0), "iteration {}: {prev} -> {next}", t + 1);
    }
}

#[test]
// Purpose
// -------
// The exposed bandwidth stays strictly positive on every iteration, also
// with mini-batches and finite-difference gradients.
//
// Given
// -----
// - SCF joint optimization with batch proportion 0.5 and both gradient
//   methods.
//
// Expect
// ------
// - Every traced width and the final width are finite and > 0.
fn bandwidth_trace_stays_positive() {
    // Arrange
    let data = mean_shift_pair(120, 2, 0.5, 21);

    for gradient in [GradientMethod::Analytic, GradientMethod::FiniteDiff] {
        let opts = SGAOptions {
            batch_proportion: 0.5,
            gradient,
            ..short_run(SmoothCFTest::joint_options(), 60)
        };

        // Act
        let fitted = SmoothCFTest::optimize_freqs_width(&data, 2, &opts).unwrap();

        // Assert
        assert!(fitted.gwidth.is_finite() && fitted.gwidth > 0.0);
        assert!(
            fitted.trace.gwidths.iter().all(|w| w.is_finite() && *w > 0.0),
            "{gradient:?}: {:?}",
            fitted.trace.gwidths
        );
    }
}

#[test]
// Purpose
// -------
// A fixed seed reproduces the initial locations, the final state, and the
// trace, mini-batches included.
//
// Given
// -----
// - Two ME joint runs with seed 42 and batch proportion 0.5.
//
// Expect
// ------
// - Identical `SGAOutcome`s; a different seed changes `T₀`.
fn fixed_seed_reproduces_whole_run() {
    // Arrange
    let data = mean_shift_pair(100, 2, 0.5, 31);
    let opts = SGAOptions {
        batch_proportion: 0.5,
        seed: 42,
        ..short_run(MeanEmbeddingTest::joint_options(), 40)
    };
    let other = SGAOptions { seed: 43, ..opts.clone() };

    // Act
    let first = MeanEmbeddingTest::optimize_locs_width(&data, 3, &opts).unwrap();
    let second = MeanEmbeddingTest::optimize_locs_width(&data, 3, &opts).unwrap();
    let third = MeanEmbeddingTest::optimize_locs_width(&data, 3, &other).unwrap();

    // Assert
    assert_eq!(first, second);
    assert_ne!(first.test_params0, third.test_params0);
}

#[test]
// Purpose
// -------
// Width-only optimization moves the width but never the test locations.
//
// Given
// -----
// - Heuristic ME locations on shifted data and the default iteration cap.
//
// Expect
// ------
// - `T` unchanged; trace no longer than `DEFAULT_MAX_ITER`; a valid test
//   can be rebuilt with the tuned width.
fn width_only_optimization_keeps_locations() {
    // Arrange
    let data = mean_shift_pair(150, 2, 0.8, 41);
    let me = MeanEmbeddingTest::create_fit_gauss_heuristic(&data, 2, 0.01, 5).unwrap();
    let locs: Array2<f64> = me.test_locs().clone();

    // Act
    let fitted = MeanEmbeddingTest::optimize_gwidth(
        &data,
        locs.clone(),
        None,
        &MeanEmbeddingTest::gwidth_options(),
    )
    .unwrap();
    let tuned = me.with_gaussian_width(fitted.gwidth).unwrap();

    // Assert
    assert_eq!(fitted.test_params, locs);
    assert!(fitted.iterations() <= DEFAULT_MAX_ITER);
    assert_eq!(tuned.test_locs(), &locs);
    assert!(tuned.perform_test(&data).is_ok());
}

#[test]
// Purpose
// -------
// Mismatched samples are rejected before any work happens.
//
// Given
// -----
// - X with 10 rows, Y with 12 rows.
//
// Expect
// ------
// - `TSTError::SampleSizeMismatch`.
fn mismatched_samples_are_rejected() {
    // Arrange
    let mut rng = seeded_rng(0);
    let x = standard_normal_matrix(10, 2, &mut rng);
    let y = standard_normal_matrix(12, 2, &mut rng);

    // Act
    let err = TSTData::new(x, y).unwrap_err();

    // Assert
    assert!(matches!(err, TSTError::SampleSizeMismatch { .. }), "{err}");
}
