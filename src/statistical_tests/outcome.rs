//! statistical_tests::outcome — test decisions and the common test interface.
//!
//! Purpose
//! -------
//! Define [`TSTOutcome`], the immutable record returned by every two-sample
//! test, the χ² survival-function helper that turns a statistic into a
//! p-value, and the [`TwoSampleTest`] trait implemented by the
//! mean-embedding and smooth-CF tests.
//!
//! Key behaviors
//! -------------
//! - [`chi2_pvalue`] evaluates `P(χ²_df > stat)` through `statrs`, clamped
//!   to `[0, 1]`.
//! - [`TSTOutcome::from_stat`] fixes `h0_rejected = pvalue < alpha`.
//! - [`TwoSampleTest::perform_test`] has a default implementation in terms
//!   of `compute_stat`, `alpha`, and `degrees_of_freedom`.
//! - [`held_out_statistic`] evaluates a feature map's statistic with the
//!   sample covariance; both concrete tests delegate to it.
//!
//! Invariants & assumptions
//! ------------------------
//! - `pvalue ∈ [0, 1]`, `test_stat ≥ 0` for positive-definite covariances,
//!   and `h0_rejected == (pvalue < alpha)` for every constructed outcome.
//! - Data passed to `perform_test` must be disjoint from the data used to
//!   tune the test; this is the caller's contract and is not checked.

use crate::statistical_tests::{
    criterion::{power_criterion, CovEstimator},
    data::TSTData,
    errors::{TSTError, TSTResult},
    features::FeatureMap,
    validation::validate_test_params,
};
use ndarray::Array2;
use statrs::distribution::{ChiSquared, ContinuousCDF};

/// Upper-tail probability of a χ² distribution with `df` degrees of freedom.
///
/// Errors
/// ------
/// - `TSTError::InvalidDegreesOfFreedom` when `statrs` rejects `df`.
/// - `TSTError::NonFiniteStatistic` when `stat` is NaN or ±∞.
pub fn chi2_pvalue(stat: f64, df: f64) -> TSTResult<f64> {
    if !stat.is_finite() {
        return Err(TSTError::NonFiniteStatistic(stat));
    }
    let dist = ChiSquared::new(df).map_err(|_| TSTError::InvalidDegreesOfFreedom(df))?;
    Ok(dist.sf(stat.max(0.0)).clamp(0.0, 1.0))
}

/// Decision record of a two-sample test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TSTOutcome {
    alpha: f64,
    pvalue: f64,
    test_stat: f64,
    h0_rejected: bool,
}

impl TSTOutcome {
    /// Build an outcome from a statistic and the test's χ² reference.
    pub fn from_stat(test_stat: f64, df: f64, alpha: f64) -> TSTResult<Self> {
        let pvalue = chi2_pvalue(test_stat, df)?;
        Ok(Self { alpha, pvalue, test_stat, h0_rejected: pvalue < alpha })
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn pvalue(&self) -> f64 {
        self.pvalue
    }

    pub fn test_stat(&self) -> f64 {
        self.test_stat
    }

    pub fn h0_rejected(&self) -> bool {
        self.h0_rejected
    }
}

impl std::fmt::Display for TSTOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "TSTOutcome(alpha={}, pvalue={:.6}, test_stat={:.6}, h0_rejected={})",
            self.alpha, self.pvalue, self.test_stat, self.h0_rejected
        )
    }
}

/// A calibrated two-sample test with a χ² null distribution.
pub trait TwoSampleTest {
    /// Significance level.
    fn alpha(&self) -> f64;

    /// Degrees of freedom of the null χ² distribution.
    fn degrees_of_freedom(&self) -> usize;

    /// Statistic on `data`.
    fn compute_stat(&self, data: &TSTData) -> TSTResult<f64>;

    /// Statistic, p-value, and decision on held-out `data`.
    fn perform_test(&self, data: &TSTData) -> TSTResult<TSTOutcome> {
        let stat = self.compute_stat(data)?;
        TSTOutcome::from_stat(stat, self.degrees_of_freedom() as f64, self.alpha())
    }
}

/// Statistic of `map` on held-out `data` with the sample covariance
/// (`ddof = 1`).
///
/// Errors
/// ------
/// - `TSTError::TestParamsDimMismatch` (and the other test-parameter
///   checks) when `T` does not fit `data`.
/// - `TSTError::FeatureDimMismatch` when the map emits the wrong number of
///   columns.
/// - Criterion errors, e.g. `TSTError::SingularCovariance`.
pub fn held_out_statistic<M: FeatureMap>(
    map: &M, data: &TSTData, test_params: &Array2<f64>, gwidth: f64,
) -> TSTResult<f64> {
    validate_test_params(test_params, data.dim())?;
    let z = map.features(data.x(), data.y(), test_params, gwidth)?;
    let expected = map.n_features(test_params.nrows());
    if z.ncols() != expected {
        return Err(TSTError::FeatureDimMismatch { expected, found: z.ncols() });
    }
    power_criterion(&z, CovEstimator::Unbiased)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - χ² survival values at known quantiles.
    // - The rejection rule and its boundary.
    // - Rejection of invalid statistics and degrees of freedom.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Match textbook χ² quantiles.
    //
    // Given
    // -----
    // - χ²₁ upper 5% point 3.841459 and χ²₂ upper 1% point 9.210340.
    //
    // Expect
    // ------
    // - p-values 0.05 and 0.01 to 1e-6; p = 1 at stat 0.
    fn chi2_pvalue_matches_known_quantiles() {
        // Act / Assert
        assert_relative_eq!(chi2_pvalue(3.841459, 1.0).unwrap(), 0.05, epsilon = 1e-6);
        assert_relative_eq!(chi2_pvalue(9.210340, 2.0).unwrap(), 0.01, epsilon = 1e-6);
        assert_relative_eq!(chi2_pvalue(0.0, 3.0).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // The decision is exactly `pvalue < alpha`.
    //
    // Given
    // -----
    // - A large statistic (tiny p) and a zero statistic (p = 1), α = 0.05.
    //
    // Expect
    // ------
    // - Rejection only for the large statistic.
    fn outcome_rejects_iff_pvalue_below_alpha() {
        // Act
        let big = TSTOutcome::from_stat(50.0, 2.0, 0.05).unwrap();
        let zero = TSTOutcome::from_stat(0.0, 2.0, 0.05).unwrap();

        // Assert
        assert!(big.h0_rejected());
        assert!(big.pvalue() < 1e-6);
        assert!(!zero.h0_rejected());
        assert_eq!(big.h0_rejected(), big.pvalue() < big.alpha());
    }

    #[test]
    // Purpose
    // -------
    // Invalid statistics and degrees of freedom surface as errors.
    //
    // Given
    // -----
    // - stat = NaN; df = 0.
    //
    // Expect
    // ------
    // - `NonFiniteStatistic` and `InvalidDegreesOfFreedom`.
    fn chi2_pvalue_rejects_invalid_inputs() {
        // Act / Assert
        assert!(matches!(chi2_pvalue(f64::NAN, 1.0), Err(TSTError::NonFiniteStatistic(_))));
        assert_eq!(chi2_pvalue(1.0, 0.0), Err(TSTError::InvalidDegreesOfFreedom(0.0)));
    }

    #[test]
    // Purpose
    // -------
    // The held-out statistic checks `T` against the data before evaluating.
    //
    // Given
    // -----
    // - 2-D data, T with one column; then a valid T.
    //
    // Expect
    // ------
    // - `TestParamsDimMismatch`; a finite, non-negative statistic.
    fn held_out_statistic_checks_test_params() {
        // Arrange
        use crate::statistical_tests::{
            features::MeanEmbeddingFeatures,
            sampling::{seeded_rng, standard_normal_matrix},
        };
        let mut rng = seeded_rng(4);
        let data = TSTData::new(
            standard_normal_matrix(30, 2, &mut rng),
            standard_normal_matrix(30, 2, &mut rng),
        )
        .unwrap();

        // Act
        let bad = held_out_statistic(&MeanEmbeddingFeatures, &data, &ndarray::array![[0.0]], 1.0);
        let good =
            held_out_statistic(&MeanEmbeddingFeatures, &data, &ndarray::array![[0.0, 0.0]], 1.0)
                .unwrap();

        // Assert
        assert_eq!(bad, Err(TSTError::TestParamsDimMismatch { expected: 2, found: 1 }));
        assert!(good.is_finite() && good >= 0.0);
    }
}
