//! statistical_tests::smooth_cf — the smooth characteristic function (SCF)
//! test.
//!
//! Purpose
//! -------
//! Compare two samples through their smoothed empirical characteristic
//! functions at `J` test frequencies. Each frequency contributes a sine and
//! a cosine feature, so the statistic is referred to `χ²_{2J}`.
//!
//! Key behaviors
//! -------------
//! - [`SmoothCFTest::create_randn`] draws standard-normal frequencies and
//!   sets the width to `mean_std`.
//! - Optimization entrypoints mirror the mean-embedding test with a
//!   frequency step of 0.2 by default.
//!
//! Invariants & assumptions
//! ------------------------
//! - `J ≥ 1`, all frequencies finite, width `> 0`, `0 < α < 1`.

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
        features::{FeatureMap, SmoothCFFeatures},
        outcome::{held_out_statistic, TwoSampleTest},
        sampling::seeded_rng,
        validation::{validate_alpha, validate_gaussian_width},
    },
};
use ndarray::Array2;

/// Default seed of [`SmoothCFTest::create_randn`].
pub const DEFAULT_RANDN_SEED: u64 = 19;

/// Default number of test frequencies.
pub const DEFAULT_N_TEST_FREQS: usize = 10;

/// SmoothCFTest — χ² test on smoothed characteristic-function differences.
#[derive(Debug, Clone, PartialEq)]
pub struct SmoothCFTest {
    test_freqs: Array2<f64>,
    gaussian_width: f64,
    alpha: f64,
}

impl SmoothCFTest {
    /// Construct a test from explicit frequencies and width.
    ///
    /// Errors
    /// ------
    /// - `TSTError::EmptyTestParams` / `TSTError::NonFiniteTestParams`.
    /// - `TSTError::InvalidGaussianWidth`, `TSTError::InvalidAlpha`.
    pub fn new(test_freqs: Array2<f64>, gaussian_width: f64, alpha: f64) -> TSTResult<Self> {
        if test_freqs.nrows() == 0 {
            return Err(TSTError::EmptyTestParams);
        }
        if let Some(((row, col), &value)) =
            test_freqs.indexed_iter().find(|(_, v)| !v.is_finite())
        {
            return Err(TSTError::NonFiniteTestParams { row, col, value });
        }
        validate_gaussian_width(gaussian_width)?;
        validate_alpha(alpha)?;
        Ok(Self { test_freqs, gaussian_width, alpha })
    }

    /// The same test with another width.
    pub fn with_gaussian_width(&self, gaussian_width: f64) -> TSTResult<Self> {
        validate_gaussian_width(gaussian_width)?;
        Ok(Self { gaussian_width, ..self.clone() })
    }

    pub fn test_freqs(&self) -> &Array2<f64> {
        &self.test_freqs
    }

    pub fn gaussian_width(&self) -> f64 {
        self.gaussian_width
    }

    pub fn n_test_freqs(&self) -> usize {
        self.test_freqs.nrows()
    }

    /// Standard-normal frequencies, width `mean_std`.
    pub fn create_randn(data: &TSTData, n_test_freqs: usize, alpha: f64, seed: u64) -> TSTResult<Self> {
        let test_freqs = Self::init_freqs_randn(data, n_test_freqs, seed)?;
        Self::new(test_freqs, data.mean_std(), alpha)
    }

    /// `n_test_freqs × d` matrix of i.i.d. standard-normal entries.
    pub fn init_freqs_randn(
        data: &TSTData, n_test_freqs: usize, seed: u64,
    ) -> TSTResult<Array2<f64>> {
        if n_test_freqs == 0 {
            return Err(TSTError::EmptyTestParams);
        }
        SmoothCFFeatures.init_test_params(data, n_test_freqs, &mut seeded_rng(seed))
    }

    /// Joint presets: frequency step 0.2, width step 0.01.
    pub fn joint_options() -> SGAOptions {
        SGAOptions { test_params_step_size: 0.2, gwidth_step_size: 0.01, ..SGAOptions::default() }
    }

    /// Width-only presets: width step 0.1.
    pub fn gwidth_options() -> SGAOptions {
        SGAOptions { gwidth_step_size: 0.1, ..SGAOptions::default() }
    }

    /// Jointly optimize frequencies and width from standard-normal
    /// frequencies (seeded with `opts.seed`) and the heuristic width.
    pub fn optimize_freqs_width(
        data: &TSTData, n_test_freqs: usize, opts: &SGAOptions,
    ) -> OptResult<SGAOutcome> {
        let test_freqs0 = Self::init_freqs_randn(data, n_test_freqs, opts.seed)?;
        optimize_test_params_width(&SmoothCFFeatures, data, test_freqs0, None, opts)
    }

    /// Optimize the frequencies with the width fixed.
    pub fn optimize_freqs(
        data: &TSTData, test_freqs0: Array2<f64>, gaussian_width: f64, opts: &SGAOptions,
    ) -> OptResult<SGAOutcome> {
        optimize_test_params(&SmoothCFFeatures, data, test_freqs0, gaussian_width, opts)
    }

    /// Optimize the width with the frequencies fixed.
    pub fn optimize_gwidth(
        data: &TSTData, test_freqs: Array2<f64>, gwidth0: Option<f64>, opts: &SGAOptions,
    ) -> OptResult<SGAOutcome> {
        optimize_gwidth(&SmoothCFFeatures, data, test_freqs, gwidth0, opts)
    }

    /// Build a test from the final frequencies and width of an optimization.
    pub fn from_outcome(outcome: &SGAOutcome, alpha: f64) -> TSTResult<Self> {
        Self::new(outcome.test_params.clone(), outcome.gwidth, alpha)
    }
}

impl TwoSampleTest for SmoothCFTest {
    fn alpha(&self) -> f64 {
        self.alpha
    }

    fn degrees_of_freedom(&self) -> usize {
        SmoothCFFeatures.n_features(self.n_test_freqs())
    }

    fn compute_stat(&self, data: &TSTData) -> TSTResult<f64> {
        held_out_statistic(&SmoothCFFeatures, data, &self.test_freqs, self.gaussian_width)
    }
}
