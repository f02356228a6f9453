//! statistical_tests::validation — shared input guards for two-sample tests.
//!
//! Purpose
//! -------
//! Centralize the checks on sample matrices, test-parameter matrices, and
//! scalar tuning constants (α, Gaussian width, split proportions) so every
//! entry point reports the same [`TSTError`] for the same mistake.
//!
//! Key behaviors
//! -------------
//! - Reject mismatched, degenerate, or non-finite samples before any kernel
//!   evaluation happens.
//! - Reject empty, wrongly-sized, or non-finite test locations/frequencies.
//! - Reject α outside (0, 1) and non-positive Gaussian widths.
//!
//! Invariants & assumptions
//! ------------------------
//! - A successful [`validate_samples`] guarantees `n ≥ 2`, `d ≥ 1`, equal
//!   shapes, and finite entries.
//! - These helpers never allocate beyond error construction and never panic.
//!
//! Testing notes
//! -------------
//! - Unit tests cover each error branch and a success path per helper.

use crate::statistical_tests::errors::{TSTError, TSTResult};
use ndarray::Array2;

/// Validate a pair of sample matrices.
///
/// Parameters
/// ----------
/// - `x`: `&Array2<f64>`
///   First sample, `n × d`.
/// - `y`: `&Array2<f64>`
///   Second sample, `n × d`.
///
/// Errors
/// ------
/// - `TSTError::SampleSizeMismatch` when the row counts differ.
/// - `TSTError::DimensionMismatch` when the column counts differ.
/// - `TSTError::InsufficientData` when `n < 2`.
/// - `TSTError::EmptyDimension` when `d == 0`.
/// - `TSTError::NonFiniteData` for the first NaN/±∞ entry found.
pub fn validate_samples(x: &Array2<f64>, y: &Array2<f64>) -> TSTResult<()> {
    let (nx, dx) = x.dim();
    let (ny, dy) = y.dim();
    if nx != ny {
        return Err(TSTError::SampleSizeMismatch { nx, ny });
    }
    if dx != dy {
        return Err(TSTError::DimensionMismatch { dx, dy });
    }
    if nx < 2 {
        return Err(TSTError::InsufficientData { n: nx });
    }
    if dx == 0 {
        return Err(TSTError::EmptyDimension);
    }
    for (sample, mat) in [("X", x), ("Y", y)] {
        if let Some(((row, col), &value)) = mat.indexed_iter().find(|(_, v)| !v.is_finite()) {
            return Err(TSTError::NonFiniteData { sample, row, col, value });
        }
    }
    Ok(())
}

/// Validate a `J × d` matrix of test locations or frequencies against the
/// data dimension `dim`.
///
/// Errors
/// ------
/// - `TSTError::EmptyTestParams` when `J == 0`.
/// - `TSTError::TestParamsDimMismatch` when the column count is not `dim`.
/// - `TSTError::NonFiniteTestParams` for the first NaN/±∞ entry.
pub fn validate_test_params(test_params: &Array2<f64>, dim: usize) -> TSTResult<()> {
    if test_params.nrows() == 0 {
        return Err(TSTError::EmptyTestParams);
    }
    if test_params.ncols() != dim {
        return Err(TSTError::TestParamsDimMismatch { expected: dim, found: test_params.ncols() });
    }
    if let Some(((row, col), &value)) = test_params.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(TSTError::NonFiniteTestParams { row, col, value });
    }
    Ok(())
}

/// Validate a significance level: `0 < alpha < 1`.
pub fn validate_alpha(alpha: f64) -> TSTResult<()> {
    if !alpha.is_finite() || alpha <= 0.0 || alpha >= 1.0 {
        return Err(TSTError::InvalidAlpha(alpha));
    }
    Ok(())
}

/// Validate a Gaussian width: finite and strictly positive.
pub fn validate_gaussian_width(gwidth: f64) -> TSTResult<()> {
    if !gwidth.is_finite() || gwidth <= 0.0 {
        return Err(TSTError::InvalidGaussianWidth(gwidth));
    }
    Ok(())
}

/// Validate a split proportion: `0 < p < 1`.
pub fn validate_proportion(p: f64) -> TSTResult<()> {
    if !p.is_finite() || p <= 0.0 || p >= 1.0 {
        return Err(TSTError::InvalidProportion(p));
    }
    Ok(())
}
