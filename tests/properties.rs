//! Property tests for the feature maps and the χ² decision rule.
//!
//! Purpose
//! -------
//! - Check, over randomly generated inputs, the identities every two-sample
//!   test here relies on: antisymmetry of the difference features under a
//!   sample swap, and a well-formed `TSTOutcome`.
//!
//! Coverage
//! --------
//! - `FeatureMap::features` for `MeanEmbeddingFeatures` and
//!   `SmoothCFFeatures`.
//! - `TwoSampleTest::perform_test` / `compute_stat` for both tests.
//! - `TSTOutcome::from_stat`.
use proptest::prelude::*;
use rust_two_sample::statistical_tests::{
    prelude::*,
    sampling::{seeded_rng, standard_normal_matrix},
};

/// Seeded Gaussian sample pair with a location shift on every coordinate.
fn gaussian_pair(n: usize, d: usize, shift: f64, seed: u64) -> TSTData {
    let mut rng = seeded_rng(seed);
    let x = standard_normal_matrix(n, d, &mut rng);
    let y = standard_normal_matrix(n, d, &mut rng) + shift;
    TSTData::new(x, y).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // Purpose
    // -------
    // Swapping X and Y negates Z for both feature maps.
    #[test]
    fn features_are_antisymmetric_under_swap(
        n in 2_usize..30,
        d in 1_usize..4,
        j in 1_usize..4,
        gwidth in 0.05_f64..10.0,
        shift in -2.0_f64..2.0,
        seed in any::<u64>(),
    ) {
        let data = gaussian_pair(n, d, shift, seed);
        let t = standard_normal_matrix(j, d, &mut seeded_rng(seed.wrapping_add(1)));

        let z_me = MeanEmbeddingFeatures.features(data.x(), data.y(), &t, gwidth).unwrap();
        let z_me_swapped = MeanEmbeddingFeatures.features(data.y(), data.x(), &t, gwidth).unwrap();
        let z_cf = SmoothCFFeatures.features(data.x(), data.y(), &t, gwidth).unwrap();
        let z_cf_swapped = SmoothCFFeatures.features(data.y(), data.x(), &t, gwidth).unwrap();

        prop_assert_eq!(z_me.dim(), (n, j));
        prop_assert_eq!(z_cf.dim(), (n, 2 * j));
        prop_assert!(z_me.iter().zip(z_me_swapped.iter()).all(|(a, b)| (a + b).abs() <= 1e-12));
        prop_assert!(z_cf.iter().zip(z_cf_swapped.iter()).all(|(a, b)| (a + b).abs() <= 1e-12));
    }

    // Purpose
    // -------
    // Test outcomes are well formed: p-value in [0, 1], non-negative
    // statistic, and `h0_rejected == (pvalue < alpha)`; the statistic does
    // not depend on the sample order.
    #[test]
    fn perform_test_yields_valid_outcome(
        n in 30_usize..120,
        d in 1_usize..3,
        j in 1_usize..3,
        shift in -1.0_f64..1.0,
        alpha in 0.001_f64..0.5,
        seed in any::<u64>(),
    ) {
        let data = gaussian_pair(n, d, shift, seed);
        let me = MeanEmbeddingTest::create_fit_gauss_heuristic(&data, j, alpha, seed).unwrap();
        let scf = SmoothCFTest::create_randn(&data, j, alpha, seed).unwrap();

        for outcome in [me.perform_test(&data), scf.perform_test(&data)] {
            // Random data can still be numerically singular; only well-formed
            // results are checked.
            let Ok(outcome) = outcome else { continue };
            prop_assert!((0.0..=1.0).contains(&outcome.pvalue()));
            prop_assert!(outcome.test_stat() >= 0.0);
            prop_assert_eq!(outcome.h0_rejected(), outcome.pvalue() < outcome.alpha());
        }

        if let (Ok(s), Ok(s_swapped)) = (me.compute_stat(&data), me.compute_stat(&data.swapped())) {
            prop_assert!((s - s_swapped).abs() <= 1e-8 * s.abs().max(1.0));
        }
    }

    // Purpose
    // -------
    // `from_stat` maps any finite non-negative statistic to a valid outcome.
    #[test]
    fn outcome_from_stat_is_consistent(
        stat in 0.0_f64..500.0,
        df in 1_usize..40,
        alpha in 0.001_f64..0.999,
    ) {
        let outcome = TSTOutcome::from_stat(stat, df as f64, alpha).unwrap();

        prop_assert!((0.0..=1.0).contains(&outcome.pvalue()));
        prop_assert_eq!(outcome.h0_rejected(), outcome.pvalue() < alpha);
    }
}
