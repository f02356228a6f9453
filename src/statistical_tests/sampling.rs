//! statistical_tests::sampling — seeded random draws used by the tests.
//!
//! Every draw in this crate goes through a caller-owned RNG built by
//! [`seeded_rng`]; nothing here touches thread-local or global random state,
//! so two calls with the same seed reproduce the same numbers.
//!
//! Provided helpers:
//! - [`standard_normal_matrix`]: i.i.d. N(0, 1) entries (frequency init).
//! - [`fit_gaussian_draw`]: rows drawn from a Gaussian fitted to data
//!   (location init).
//! - [`batch_size`], [`batch_indices`]: mini-batch selection without
//!   replacement.
//! - [`permutation`]: a shuffled index vector for train/test splits.

use crate::statistical_tests::errors::{TSTError, TSTResult};
use nalgebra::DMatrix;
use ndarray::{Array2, Axis};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Build the deterministic RNG used for one optimization or split.
pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// `rows × cols` matrix of independent standard-normal draws.
pub fn standard_normal_matrix<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Array2<f64> {
    Array2::from_shape_simple_fn((rows, cols), || rng.sample(StandardNormal))
}

/// Draw `n_draws` rows from `N(mean(data), cov(data))`.
///
/// Parameters
/// ----------
/// - `data`: `&Array2<f64>`
///   Observations in rows, `N × d`, `N ≥ 2`.
/// - `n_draws`: `usize`
///   Number of rows to return.
/// - `rng`: `&mut R`
///   Source of randomness.
///
/// Returns
/// -------
/// `TSTResult<Array2<f64>>`
///   An `n_draws × d` matrix.
///
/// Errors
/// ------
/// - `TSTError::InsufficientData` when `N < 2`.
///
/// Notes
/// -----
/// - The covariance uses the `N − 1` denominator.
/// - The square root is taken through a symmetric eigendecomposition with
///   negative eigenvalues clipped to zero, so rank-deficient data (e.g. a
///   constant column) still yields valid draws.
pub fn fit_gaussian_draw<R: Rng + ?Sized>(
    data: &Array2<f64>, n_draws: usize, rng: &mut R,
) -> TSTResult<Array2<f64>> {
    let (n, d) = data.dim();
    if n < 2 {
        return Err(TSTError::InsufficientData { n });
    }
    let mean = data.mean_axis(Axis(0)).ok_or(TSTError::InsufficientData { n })?;
    let centered = data - &mean;
    let cov = centered.t().dot(&centered) / (n as f64 - 1.0);

    let eig = DMatrix::from_fn(d, d, |i, j| cov[[i, j]]).symmetric_eigen();
    let root = Array2::from_shape_fn((d, d), |(i, j)| {
        eig.eigenvectors[(i, j)] * eig.eigenvalues[j].max(0.0).sqrt()
    });

    let z = standard_normal_matrix(n_draws, d, rng);
    Ok(z.dot(&root.t()) + &mean)
}

/// Products this close to an integer count as that integer in
/// [`batch_size`].
const BATCH_SNAP_TOL: f64 = 1e-9;

/// Mini-batch size `⌈proportion · n⌉`, clamped to `[1, n]`.
///
/// A product within rounding error of an integer (`0.07 · 100` evaluates
/// to `7.000000000000001`) is snapped to it before the ceiling.
pub fn batch_size(n: usize, proportion: f64) -> usize {
    let raw = proportion * n as f64;
    let nearest = raw.round();
    let size = if (raw - nearest).abs() <= BATCH_SNAP_TOL * nearest.max(1.0) {
        nearest
    } else {
        raw.ceil()
    };
    (size as usize).clamp(1, n.max(1))
}

/// `batch` distinct indices from `0..n`, in random order.
pub fn batch_indices<R: Rng + ?Sized>(n: usize, batch: usize, rng: &mut R) -> Vec<usize> {
    rand::seq::index::sample(rng, n, batch.min(n)).into_vec()
}

/// A random permutation of `0..n`.
pub fn permutation<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<usize> {
    let mut idx: Vec<usize> = (0..n).collect();
    idx.shuffle(rng);
    idx
}
