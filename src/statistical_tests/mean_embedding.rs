//! statistical_tests::mean_embedding — the mean-embedding (ME) test.
//!
//! Purpose
//! -------
//! Compare two samples through the difference of their Gaussian-kernel mean
//! embeddings evaluated at `J` test locations. The statistic is the power
//! criterion of [`MeanEmbeddingFeatures`] with the sample covariance, and
//! its null distribution is `χ²_J`.
//!
//! Key behaviors
//! -------------
//! - [`MeanEmbeddingTest::new`] validates locations, width, and α.
//! - Heuristic construction ([`MeanEmbeddingTest::create_fit_gauss_heuristic`])
//!   draws locations from a Gaussian fitted to the pooled sample and sets
//!   the width to `mean_std`.
//! - Optimization entrypoints tune the locations and/or the width on
//!   training data; [`MeanEmbeddingTest::from_outcome`] turns the result
//!   into a ready-to-use test.
//!
//! Invariants & assumptions
//! ------------------------
//! - `J ≥ 1`, all locations finite, width `> 0`, `0 < α < 1`.
//! - Data passed to `perform_test` must be disjoint from the training data.

use crate::{
    optimization::{
        errors::OptResult,
        gradient_ascent::{
            api::{optimize_gwidth, optimize_test_params, optimize_test_params_width},
            traits::{SGAOptions, SGAOutcome},
        },
    },
    statistical_tests::{
        data::TSTData,
        errors::{TSTError, TSTResult},
        features::{FeatureMap, MeanEmbeddingFeatures},
        outcome::{held_out_statistic, TwoSampleTest},
        sampling::seeded_rng,
        validation::{validate_alpha, validate_gaussian_width},
    },
};
use ndarray::Array2;

/// Default significance level.
pub const DEFAULT_ALPHA: f64 = 0.01;

/// Default number of test locations.
pub const DEFAULT_N_TEST_LOCS: usize = 10;

/// MeanEmbeddingTest — χ² test on mean-embedding differences.
///
/// Fields are private; use the getters and the validated constructors.
#[derive(Debug, Clone, PartialEq)]
pub struct MeanEmbeddingTest {
    test_locs: Array2<f64>,
    gaussian_width: f64,
    alpha: f64,
}

impl MeanEmbeddingTest {
    /// Construct a test from explicit locations and width.
    ///
    /// Errors
    /// ------
    /// - `TSTError::EmptyTestParams` / `TSTError::NonFiniteTestParams`.
    /// - `TSTError::InvalidGaussianWidth`, `TSTError::InvalidAlpha`.
    pub fn new(test_locs: Array2<f64>, gaussian_width: f64, alpha: f64) -> TSTResult<Self> {
        if test_locs.nrows() == 0 {
            return Err(TSTError::EmptyTestParams);
        }
        if let Some(((row, col), &value)) = test_locs.indexed_iter().find(|(_, v)| !v.is_finite())
        {
            return Err(TSTError::NonFiniteTestParams { row, col, value });
        }
        validate_gaussian_width(gaussian_width)?;
        validate_alpha(alpha)?;
        Ok(Self { test_locs, gaussian_width, alpha })
    }

    /// The same test with another width.
    ///
    /// Errors
    /// ------
    /// `TSTError::InvalidGaussianWidth` for a non-finite or non-positive
    /// width; `self` is left untouched.
    pub fn with_gaussian_width(&self, gaussian_width: f64) -> TSTResult<Self> {
        validate_gaussian_width(gaussian_width)?;
        Ok(Self { gaussian_width, ..self.clone() })
    }

    pub fn test_locs(&self) -> &Array2<f64> {
        &self.test_locs
    }

    pub fn gaussian_width(&self) -> f64 {
        self.gaussian_width
    }

    pub fn n_test_locs(&self) -> usize {
        self.test_locs.nrows()
    }

    /// Locations drawn from a Gaussian fitted to `[X; Y]`, width `mean_std`.
    pub fn create_fit_gauss_heuristic(
        data: &TSTData, n_test_locs: usize, alpha: f64, seed: u64,
    ) -> TSTResult<Self> {
        let test_locs = Self::init_locs_randn(data, n_test_locs, seed)?;
        Self::new(test_locs, data.mean_std(), alpha)
    }

    /// Draw `n_test_locs` points from a Gaussian fitted to the pooled
    /// sample (unbiased covariance).
    pub fn init_locs_randn(data: &TSTData, n_test_locs: usize, seed: u64) -> TSTResult<Array2<f64>> {
        if n_test_locs == 0 {
            return Err(TSTError::EmptyTestParams);
        }
        MeanEmbeddingFeatures.init_test_params(data, n_test_locs, &mut seeded_rng(seed))
    }

    /// Options used by [`Self::optimize_locs_width`] and
    /// [`Self::optimize_locs`] when the caller has no preference: location
    /// step 0.1, width step 0.01.
    pub fn joint_options() -> SGAOptions {
        SGAOptions { test_params_step_size: 0.1, gwidth_step_size: 0.01, ..SGAOptions::default() }
    }

    /// Options for width-only optimization: width step 0.1.
    pub fn gwidth_options() -> SGAOptions {
        SGAOptions { gwidth_step_size: 0.1, ..SGAOptions::default() }
    }

    /// Jointly optimize locations and width on training data.
    ///
    /// Parameters
    /// ----------
    /// - `data`: training pair.
    /// - `n_test_locs`: `J`.
    /// - `opts`: optimizer options; `opts.seed` also seeds the initial
    ///   draw of [`Self::init_locs_randn`].
    ///
    /// Returns
    /// -------
    /// `OptResult<SGAOutcome>`; the width starts at the data heuristic.
    ///
    /// Examples
    /// --------
    /// ```rust
    /// # use rust_two_sample::statistical_tests::prelude::*;
    /// # use rust_two_sample::statistical_tests::sampling::{seeded_rng, standard_normal_matrix};
    /// let mut rng = seeded_rng(0);
    /// let x = standard_normal_matrix(60, 2, &mut rng);
    /// let y = standard_normal_matrix(60, 2, &mut rng) + 0.5;
    /// let data = TSTData::new(x, y).unwrap();
    /// let (train, test) = data.split_tr_te(0.5, 3).unwrap();
    ///
    /// let mut opts = MeanEmbeddingTest::joint_options();
    /// opts.max_iter = 50;
    /// let outcome = MeanEmbeddingTest::optimize_locs_width(&train, 2, &opts).unwrap();
    /// let me = MeanEmbeddingTest::from_outcome(&outcome, 0.05).unwrap();
    /// let result = me.perform_test(&test).unwrap();
    /// assert!((0.0..=1.0).contains(&result.pvalue()));
    /// ```
    pub fn optimize_locs_width(
        data: &TSTData, n_test_locs: usize, opts: &SGAOptions,
    ) -> OptResult<SGAOutcome> {
        let test_locs0 = Self::init_locs_randn(data, n_test_locs, opts.seed)?;
        optimize_test_params_width(&MeanEmbeddingFeatures, data, test_locs0, None, opts)
    }

    /// Optimize the locations with the width fixed.
    pub fn optimize_locs(
        data: &TSTData, test_locs0: Array2<f64>, gaussian_width: f64, opts: &SGAOptions,
    ) -> OptResult<SGAOutcome> {
        optimize_test_params(&MeanEmbeddingFeatures, data, test_locs0, gaussian_width, opts)
    }

    /// Optimize the width with the locations fixed. `gwidth0 = None`
    /// starts from the data heuristic.
    pub fn optimize_gwidth(
        data: &TSTData, test_locs: Array2<f64>, gwidth0: Option<f64>, opts: &SGAOptions,
    ) -> OptResult<SGAOutcome> {
        optimize_gwidth(&MeanEmbeddingFeatures, data, test_locs, gwidth0, opts)
    }

    /// Build a test from the final locations and width of an optimization.
    pub fn from_outcome(outcome: &SGAOutcome, alpha: f64) -> TSTResult<Self> {
        Self::new(outcome.test_params.clone(), outcome.gwidth, alpha)
    }
}

impl TwoSampleTest for MeanEmbeddingTest {
    fn alpha(&self) -> f64 {
        self.alpha
    }

    fn degrees_of_freedom(&self) -> usize {
        MeanEmbeddingFeatures.n_features(self.n_test_locs())
    }

    fn compute_stat(&self, data: &TSTData) -> TSTResult<f64> {
        held_out_statistic(&MeanEmbeddingFeatures, data, &self.test_locs, self.gaussian_width)
    }
}
