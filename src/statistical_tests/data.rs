//! statistical_tests::data — the paired-sample container.
//!
//! Purpose
//! -------
//! Hold the two samples `X` and `Y` of a two-sample problem in one
//! validated, immutable value and expose the small set of derived
//! quantities the tests need: dimension, sample size, pooled data, and the
//! `mean_std` scale heuristic used to initialize the Gaussian width.
//!
//! Key behaviors
//! -------------
//! - [`TSTData::new`] rejects mismatched, degenerate, or non-finite input
//!   via [`validate_samples`].
//! - [`TSTData::split_tr_te`] and [`TSTData::subsample`] derive new pairs
//!   with a caller-supplied seed, applying the same row permutation to both
//!   samples.
//!
//! Invariants & assumptions
//! ------------------------
//! - `x.dim() == y.dim() == (n, d)` with `n ≥ 2`, `d ≥ 1`, all finite.
//! - Rows are exchangeable; nothing here depends on row order.
//!
//! Downstream usage
//! ----------------
//! - Feature maps read `x()`/`y()`, the optimizer slices mini-batches via
//!   [`TSTData::batch`], and the tests call [`TSTData::mean_std`] for their
//!   width heuristics.

use crate::statistical_tests::{
    errors::{TSTError, TSTResult},
    sampling::{permutation, seeded_rng},
    validation::{validate_proportion, validate_samples},
};
use ndarray::{Array2, Axis};

/// TSTData — two equally-sized samples of the same dimension.
#[derive(Debug, Clone, PartialEq)]
pub struct TSTData {
    x: Array2<f64>,
    y: Array2<f64>,
}

impl TSTData {
    /// Construct a validated sample pair.
    ///
    /// Errors
    /// ------
    /// Any error of [`validate_samples`]: mismatched shapes, `n < 2`,
    /// `d == 0`, or non-finite entries.
    pub fn new(x: Array2<f64>, y: Array2<f64>) -> TSTResult<Self> {
        validate_samples(&x, &y)?;
        Ok(Self { x, y })
    }

    pub fn x(&self) -> &Array2<f64> {
        &self.x
    }

    pub fn y(&self) -> &Array2<f64> {
        &self.y
    }

    /// Both samples as a tuple `(X, Y)`.
    pub fn xy(&self) -> (&Array2<f64>, &Array2<f64>) {
        (&self.x, &self.y)
    }

    /// Number of columns `d`.
    pub fn dim(&self) -> usize {
        self.x.ncols()
    }

    /// Number of rows `n` in each sample.
    pub fn sample_size(&self) -> usize {
        self.x.nrows()
    }

    /// Vertically stacked `[X; Y]`, `2n × d`.
    pub fn stack_xy(&self) -> Array2<f64> {
        let n = self.sample_size();
        Array2::from_shape_fn((2 * n, self.dim()), |(i, j)| {
            if i < n { self.x[[i, j]] } else { self.y[[i - n, j]] }
        })
    }

    /// Scale heuristic: the average over X and Y of the mean per-coordinate
    /// standard deviation (population, `ddof = 0`).
    pub fn mean_std(&self) -> f64 {
        let avg_std = |m: &Array2<f64>| m.std_axis(Axis(0), 0.0).mean().unwrap_or(0.0);
        0.5 * (avg_std(&self.x) + avg_std(&self.y))
    }

    /// The pair with the roles of X and Y exchanged.
    pub fn swapped(&self) -> TSTData {
        TSTData { x: self.y.clone(), y: self.x.clone() }
    }

    /// Rows `idx` of both samples. Intended for mini-batches; the result is
    /// not re-validated.
    pub(crate) fn batch(&self, idx: &[usize]) -> (Array2<f64>, Array2<f64>) {
        (self.x.select(Axis(0), idx), self.y.select(Axis(0), idx))
    }

    /// Split into training and held-out pairs.
    ///
    /// Parameters
    /// ----------
    /// - `tr_proportion`: `f64`
    ///   Fraction of rows assigned to training, `0 < p < 1`. The training
    ///   part receives `⌊p · n⌋` rows.
    /// - `seed`: `u64`
    ///   Seed of the permutation shared by X and Y.
    ///
    /// Errors
    /// ------
    /// - `TSTError::InvalidProportion` for `p` outside (0, 1).
    /// - `TSTError::InsufficientData` when either part ends up with fewer
    ///   than two rows.
    pub fn split_tr_te(&self, tr_proportion: f64, seed: u64) -> TSTResult<(TSTData, TSTData)> {
        validate_proportion(tr_proportion)?;
        let n = self.sample_size();
        let n_tr = (tr_proportion * n as f64).floor() as usize;
        let perm = permutation(n, &mut seeded_rng(seed));
        let (tr_idx, te_idx) = perm.split_at(n_tr);
        let (xtr, ytr) = self.batch(tr_idx);
        let (xte, yte) = self.batch(te_idx);
        Ok((TSTData::new(xtr, ytr)?, TSTData::new(xte, yte)?))
    }

    /// Random subsample of `n` rows (same rows from X and Y).
    ///
    /// Errors
    /// ------
    /// - `TSTError::InvalidSubsampleSize` when `n == 0` or `n` exceeds the
    ///   sample size.
    /// - `TSTError::InsufficientData` when `n == 1`.
    pub fn subsample(&self, n: usize, seed: u64) -> TSTResult<TSTData> {
        let available = self.sample_size();
        if n == 0 || n > available {
            return Err(TSTError::InvalidSubsampleSize { requested: n, available });
        }
        let perm = permutation(available, &mut seeded_rng(seed));
        let (xs, ys) = self.batch(&perm[..n]);
        TSTData::new(xs, ys)
    }
}
