//! statistical_tests::criterion — the power criterion `s = n·Wᵀ Σ⁻¹ W`.
//!
//! Purpose
//! -------
//! Reduce a feature matrix `Z` (`n × m`) to the Hotelling-style quadratic
//! form that serves both as the test statistic and as the objective the
//! optimizer ascends, and provide its gradient with respect to `Z`.
//!
//! Key behaviors
//! -------------
//! - `W` is the column mean of `Z`; `Σ = (Z − W)ᵀ(Z − W) / (n − ddof)`.
//! - `Σ⁻¹W` is obtained from a Cholesky factorization and solve; no
//!   explicit inverse is formed.
//! - [`power_criterion_with_grad`] also returns
//!   `∂s/∂Z_ik = a_k·(2 − 2·n/(n − ddof)·r_i)` with `a = Σ⁻¹W` and
//!   `r = (Z − W)a`.
//!
//! Invariants & assumptions
//! ------------------------
//! - A failed factorization is reported as
//!   [`TSTError::SingularCovariance`]; non-finite inputs or outputs as
//!   [`TSTError::NonFiniteFeatures`] / [`TSTError::NonFiniteStatistic`].
//!   All three are numerical faults.
//! - For a positive-definite `Σ` the statistic is non-negative.
//!
//! Conventions
//! -----------
//! - [`CovEstimator::MaxLikelihood`] (`ddof = 0`) is used while optimizing;
//!   [`CovEstimator::Unbiased`] (`ddof = 1`) is used when testing.

use crate::statistical_tests::errors::{TSTError, TSTResult};
use nalgebra::{DMatrix, DVector};
use ndarray::{Array1, Array2, Axis};

/// Relative floor on conditional variances below which `Σ` counts as
/// singular even if the factorization went through.
pub const COND_VAR_RTOL: f64 = 1e-10;

/// Denominator used for the feature covariance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CovEstimator {
    /// Divide by `n`.
    MaxLikelihood,
    /// Divide by `n − 1`.
    Unbiased,
}

impl CovEstimator {
    fn ddof(self) -> usize {
        match self {
            CovEstimator::MaxLikelihood => 0,
            CovEstimator::Unbiased => 1,
        }
    }
}

struct Solved {
    stat: f64,
    a: Array1<f64>,
    centered: Array2<f64>,
    scale: f64,
}

fn solve(z: &Array2<f64>, cov: CovEstimator) -> TSTResult<Solved> {
    let (n, m) = z.dim();
    if let Some(((row, col), &value)) = z.indexed_iter().find(|(_, v)| !v.is_finite()) {
        return Err(TSTError::NonFiniteFeatures { row, col, value });
    }
    let denom = n.saturating_sub(cov.ddof());
    if n == 0 || m == 0 || denom == 0 {
        return Err(TSTError::SingularCovariance { dim: m });
    }

    let w = z.mean_axis(Axis(0)).ok_or(TSTError::SingularCovariance { dim: m })?;
    let centered = z - &w;
    let sigma = centered.t().dot(&centered) / denom as f64;

    let chol = DMatrix::from_fn(m, m, |i, j| sigma[[i, j]])
        .cholesky()
        .ok_or(TSTError::SingularCovariance { dim: m })?;
    // L_ii² is the variance of column i left after regressing on columns < i
    let l = chol.l_dirty();
    if (0..m).any(|i| l[(i, i)] * l[(i, i)] <= COND_VAR_RTOL * sigma[[i, i]]) {
        return Err(TSTError::SingularCovariance { dim: m });
    }
    let a_na = chol.solve(&DVector::from_iterator(m, w.iter().copied()));
    let a = Array1::from_iter(a_na.iter().copied());

    let stat = n as f64 * w.dot(&a);
    if !stat.is_finite() {
        return Err(TSTError::NonFiniteStatistic(stat));
    }
    Ok(Solved { stat, a, centered, scale: n as f64 / denom as f64 })
}

/// Evaluate `s = n·Wᵀ Σ⁻¹ W`.
///
/// Parameters
/// ----------
/// - `z`: `&Array2<f64>`
///   Feature matrix, `n × m`.
/// - `cov`: [`CovEstimator`]
///   Covariance denominator.
///
/// Returns
/// -------
/// `TSTResult<f64>`
///   The statistic.
///
/// Errors
/// ------
/// - `TSTError::NonFiniteFeatures` for a NaN/±∞ entry in `z`.
/// - `TSTError::SingularCovariance` when `Σ` is not positive definite (this
///   includes `n ≤ ddof`).
/// - `TSTError::NonFiniteStatistic` when the solve overflows.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_two_sample::statistical_tests::criterion::{power_criterion, CovEstimator};
/// let z = array![[1.0], [2.0], [3.0]];
/// // W = 2, Σ = 2/3, s = 3 · 2² / (2/3) = 18
/// let s = power_criterion(&z, CovEstimator::MaxLikelihood).unwrap();
/// assert!((s - 18.0).abs() < 1e-12);
/// ```
pub fn power_criterion(z: &Array2<f64>, cov: CovEstimator) -> TSTResult<f64> {
    solve(z, cov).map(|solved| solved.stat)
}

/// Evaluate the statistic and its gradient with respect to `z`.
///
/// Returns `(s, ∂s/∂Z)` with the gradient shaped like `z`. Errors as in
/// [`power_criterion`].
pub fn power_criterion_with_grad(
    z: &Array2<f64>, cov: CovEstimator,
) -> TSTResult<(f64, Array2<f64>)> {
    let Solved { stat, a, centered, scale } = solve(z, cov)?;
    let r = centered.dot(&a);
    let row_factor = r.mapv(|ri| 2.0 - 2.0 * scale * ri).insert_axis(Axis(1));
    let grad = row_factor * &a.insert_axis(Axis(0));
    Ok((stat, grad))
}
