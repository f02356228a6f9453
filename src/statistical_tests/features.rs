//! statistical_tests::features — differentiable feature maps `(X, Y, T, γ) ↦ Z`.
//!
//! Purpose
//! -------
//! Turn a pair of samples, a matrix of test locations/frequencies `T`
//! (`J × d`), and a Gaussian width `γ` into the per-observation difference
//! features `Z` (`n × k·J`) consumed by the power criterion. Each map also
//! supplies its closed-form vector–Jacobian product so the optimizer can
//! push `∂s/∂Z` back to `T` and `γ` without a generic autodiff engine.
//!
//! Key behaviors
//! -------------
//! - [`MeanEmbeddingFeatures`]: `K(x, t) = exp(-‖x/γ − t‖²)`,
//!   `Z = K(X, T) − K(Y, T)`, `k = 1`.
//! - [`SmoothCFFeatures`]: with `x̃ = x/γ`, `f(x) = exp(-‖x̃‖²/2)`,
//!   features `[sin(x̃·Tᵀ)·f, cos(x̃·Tᵀ)·f]`, `Z = feat(X) − feat(Y)`, `k = 2`.
//! - [`FeatureMap::vjp`] returns `(∂⟨G, Z⟩/∂T, ∂⟨G, Z⟩/∂γ)` for an
//!   upstream gradient `G = ∂s/∂Z`. The default implementation reports
//!   [`TSTError::GradientNotImplemented`], which routes the optimizer to
//!   finite differences.
//!
//! Invariants & assumptions
//! ------------------------
//! - `X.rows == Y.rows`, `X.cols == Y.cols == T.cols`, `γ > 0` finite; all
//!   three are checked by [`check_inputs`] before any arithmetic.
//! - Swapping X and Y negates `Z` exactly (floating-point subtraction is
//!   antisymmetric).
//!
//! Conventions
//! -----------
//! - Columns of `Z` follow the row order of `T`; for the smooth-CF map the
//!   `J` sine columns come first, then the `J` cosine columns.
//!
//! Testing notes
//! -------------
//! - Unit tests check shapes, hand-computed values, antisymmetry, and the
//!   closed-form VJPs against central finite differences of `⟨G, Z⟩`.

use crate::statistical_tests::{
    data::TSTData,
    errors::{TSTError, TSTResult},
    sampling::{fit_gaussian_draw, standard_normal_matrix},
    validation::validate_gaussian_width,
};
use ndarray::{s, Array1, Array2, Axis};
use rand::rngs::StdRng;

/// Gradient of `⟨G, Z⟩` with respect to the test parameters and the width.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureGrad {
    pub test_params: Array2<f64>,
    pub gwidth: f64,
}

/// A feature map usable by the power criterion and the optimizer.
pub trait FeatureMap {
    /// Short name used in log records.
    fn name(&self) -> &'static str;

    /// Feature columns contributed by each row of `T` (1 or 2).
    fn features_per_param(&self) -> usize;

    /// Total feature count (and χ² degrees of freedom) for `J` rows of `T`.
    fn n_features(&self, n_params: usize) -> usize {
        self.features_per_param() * n_params
    }

    /// Evaluate `Z`.
    ///
    /// Errors
    /// ------
    /// Any error of [`check_inputs`].
    fn features(
        &self, x: &Array2<f64>, y: &Array2<f64>, test_params: &Array2<f64>, gwidth: f64,
    ) -> TSTResult<Array2<f64>>;

    /// Vector–Jacobian product of `Z` against `dz`.
    fn vjp(
        &self, _x: &Array2<f64>, _y: &Array2<f64>, _test_params: &Array2<f64>, _gwidth: f64,
        _dz: &Array2<f64>,
    ) -> TSTResult<FeatureGrad> {
        Err(TSTError::GradientNotImplemented)
    }

    /// Draw an initial `J × d` parameter matrix for `data`.
    fn init_test_params(
        &self, data: &TSTData, n_params: usize, rng: &mut StdRng,
    ) -> TSTResult<Array2<f64>>;
}

/// Shared precondition check for every feature map.
///
/// Errors
/// ------
/// - `TSTError::SampleSizeMismatch` when `X.rows != Y.rows`.
/// - `TSTError::DimensionMismatch` when `X.cols != Y.cols`.
/// - `TSTError::TestParamsDimMismatch` when `T.cols != X.cols`.
/// - `TSTError::EmptyTestParams` when `T` has no rows.
/// - `TSTError::InvalidGaussianWidth` when `γ` is not finite and positive.
pub fn check_inputs(
    x: &Array2<f64>, y: &Array2<f64>, test_params: &Array2<f64>, gwidth: f64,
) -> TSTResult<()> {
    if x.nrows() != y.nrows() {
        return Err(TSTError::SampleSizeMismatch { nx: x.nrows(), ny: y.nrows() });
    }
    if x.ncols() != y.ncols() {
        return Err(TSTError::DimensionMismatch { dx: x.ncols(), dy: y.ncols() });
    }
    if test_params.nrows() == 0 {
        return Err(TSTError::EmptyTestParams);
    }
    if test_params.ncols() != x.ncols() {
        return Err(TSTError::TestParamsDimMismatch {
            expected: x.ncols(),
            found: test_params.ncols(),
        });
    }
    validate_gaussian_width(gwidth)
}

fn check_upstream(dz: &Array2<f64>, expected: (usize, usize)) -> TSTResult<()> {
    if dz.dim() != expected {
        return Err(TSTError::GradientShapeMismatch { expected, found: dz.dim() });
    }
    Ok(())
}

fn row_sq_norms(a: &Array2<f64>) -> Array1<f64> {
    a.map_axis(Axis(1), |r| r.dot(&r))
}

/// Pairwise squared distances between rows of `a` (`n × d`) and `b`
/// (`J × d`), clipped at zero.
fn sq_dist(a: &Array2<f64>, b: &Array2<f64>) -> Array2<f64> {
    let mut d2 = a.dot(&b.t()) * -2.0;
    d2 += &row_sq_norms(a).insert_axis(Axis(1));
    d2 += &row_sq_norms(b).insert_axis(Axis(0));
    d2.mapv_inplace(|v| v.max(0.0));
    d2
}

// ---- Mean embedding ----

/// Gaussian kernel evaluated at test locations: `exp(-‖x/γ − t‖²)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MeanEmbeddingFeatures;

impl MeanEmbeddingFeatures {
    fn kernel(scaled: &Array2<f64>, test_locs: &Array2<f64>) -> Array2<f64> {
        sq_dist(scaled, test_locs).mapv_into(|d2| (-d2).exp())
    }
}

impl FeatureMap for MeanEmbeddingFeatures {
    fn name(&self) -> &'static str {
        "mean_embedding"
    }

    fn features_per_param(&self) -> usize {
        1
    }

    fn features(
        &self, x: &Array2<f64>, y: &Array2<f64>, test_locs: &Array2<f64>, gwidth: f64,
    ) -> TSTResult<Array2<f64>> {
        check_inputs(x, y, test_locs, gwidth)?;
        let kx = Self::kernel(&(x / gwidth), test_locs);
        let ky = Self::kernel(&(y / gwidth), test_locs);
        Ok(kx - ky)
    }

    // ∂K_ij/∂t_j = 2K_ij(x̃_i − t_j),  ∂K_ij/∂γ = 2K_ij(x̃_i − t_j)·x̃_i / γ
    fn vjp(
        &self, x: &Array2<f64>, y: &Array2<f64>, test_locs: &Array2<f64>, gwidth: f64,
        dz: &Array2<f64>,
    ) -> TSTResult<FeatureGrad> {
        check_inputs(x, y, test_locs, gwidth)?;
        check_upstream(dz, (x.nrows(), test_locs.nrows()))?;

        let mut grad_t = Array2::<f64>::zeros(test_locs.raw_dim());
        let mut grad_w = 0.0;
        for (sample, sign) in [(x, 1.0), (y, -1.0)] {
            let scaled = sample / gwidth;
            let weights = Self::kernel(&scaled, test_locs) * dz * sign;

            let col_mass = weights.sum_axis(Axis(0)).insert_axis(Axis(1));
            grad_t = grad_t + (weights.t().dot(&scaled) - &(test_locs * &col_mass)) * 2.0;

            let row_mass = weights.sum_axis(Axis(1));
            let cross = (&weights * &scaled.dot(&test_locs.t())).sum();
            grad_w += 2.0 / gwidth * (row_mass.dot(&row_sq_norms(&scaled)) - cross);
        }
        Ok(FeatureGrad { test_params: grad_t, gwidth: grad_w })
    }

    /// Locations drawn from a Gaussian fitted to the pooled sample `[X; Y]`.
    fn init_test_params(
        &self, data: &TSTData, n_params: usize, rng: &mut StdRng,
    ) -> TSTResult<Array2<f64>> {
        fit_gaussian_draw(&data.stack_xy(), n_params, rng)
    }
}

// ---- Smooth characteristic function ----

/// Smoothed empirical characteristic function at test frequencies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SmoothCFFeatures;

struct SmoothCFParts {
    scaled: Array2<f64>,
    smooth: Array1<f64>,
    phase: Array2<f64>,
}

impl SmoothCFFeatures {
    fn parts(sample: &Array2<f64>, test_freqs: &Array2<f64>, gwidth: f64) -> SmoothCFParts {
        let scaled = sample / gwidth;
        let smooth = scaled.map_axis(Axis(1), |r| (-0.5 * r.dot(&r)).exp());
        let phase = scaled.dot(&test_freqs.t());
        SmoothCFParts { scaled, smooth, phase }
    }

    fn side(sample: &Array2<f64>, test_freqs: &Array2<f64>, gwidth: f64) -> Array2<f64> {
        let SmoothCFParts { smooth, phase, .. } = Self::parts(sample, test_freqs, gwidth);
        let j = test_freqs.nrows();
        let f = smooth.insert_axis(Axis(1));
        let mut out = Array2::<f64>::zeros((sample.nrows(), 2 * j));
        out.slice_mut(s![.., ..j]).assign(&(phase.mapv(f64::sin) * &f));
        out.slice_mut(s![.., j..]).assign(&(phase.mapv(f64::cos) * &f));
        out
    }
}

impl FeatureMap for SmoothCFFeatures {
    fn name(&self) -> &'static str {
        "smooth_cf"
    }

    fn features_per_param(&self) -> usize {
        2
    }

    fn features(
        &self, x: &Array2<f64>, y: &Array2<f64>, test_freqs: &Array2<f64>, gwidth: f64,
    ) -> TSTResult<Array2<f64>> {
        check_inputs(x, y, test_freqs, gwidth)?;
        Ok(Self::side(x, test_freqs, gwidth) - Self::side(y, test_freqs, gwidth))
    }

    /// With `u = x̃·t` and `f = exp(-‖x̃‖²/2)`: `∂u/∂t = x̃`, `∂u/∂γ = -u/γ`,
    /// `∂f/∂γ = f·‖x̃‖²/γ`.
    fn vjp(
        &self, x: &Array2<f64>, y: &Array2<f64>, test_freqs: &Array2<f64>, gwidth: f64,
        dz: &Array2<f64>,
    ) -> TSTResult<FeatureGrad> {
        check_inputs(x, y, test_freqs, gwidth)?;
        let j = test_freqs.nrows();
        check_upstream(dz, (x.nrows(), 2 * j))?;
        let d_sin = dz.slice(s![.., ..j]);
        let d_cos = dz.slice(s![.., j..]);

        let mut grad_t = Array2::<f64>::zeros(test_freqs.raw_dim());
        let mut grad_w = 0.0;
        for (sample, sign) in [(x, 1.0), (y, -1.0)] {
            let SmoothCFParts { scaled, smooth, phase } = Self::parts(sample, test_freqs, gwidth);
            let sin_u = phase.mapv(f64::sin);
            let cos_u = phase.mapv(f64::cos);
            let f = smooth.view().insert_axis(Axis(1));

            // upstream gradients with respect to the phase u and the envelope f
            let g_phase = (&d_sin * &cos_u - &d_cos * &sin_u) * &f * sign;
            let g_smooth = (&d_sin * &sin_u + &d_cos * &cos_u).sum_axis(Axis(1)) * sign;

            grad_t = grad_t + g_phase.t().dot(&scaled);
            let envelope = (g_smooth * &smooth * &row_sq_norms(&scaled)).sum();
            grad_w += (envelope - (&g_phase * &phase).sum()) / gwidth;
        }
        Ok(FeatureGrad { test_params: grad_t, gwidth: grad_w })
    }

    /// Frequencies with i.i.d. standard-normal entries.
    fn init_test_params(
        &self, data: &TSTData, n_params: usize, rng: &mut StdRng,
    ) -> TSTResult<Array2<f64>> {
        Ok(standard_normal_matrix(n_params, data.dim(), rng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statistical_tests::sampling::seeded_rng;
    use approx::assert_relative_eq;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Output shapes and hand-computed values for both maps.
    // - Exact antisymmetry under swapping X and Y.
    // - Closed-form VJPs against central finite differences of ⟨G, Z⟩.
    // - Input guards shared through `check_inputs`.
    // -------------------------------------------------------------------------

    fn random_inputs(n: usize, d: usize, j: usize, seed: u64) -> (Array2<f64>, Array2<f64>, Array2<f64>) {
        let mut rng = seeded_rng(seed);
        let x = standard_normal_matrix(n, d, &mut rng);
        let y = standard_normal_matrix(n, d, &mut rng) + 0.5;
        let t = standard_normal_matrix(j, d, &mut rng);
        (x, y, t)
    }

    /// Central differences of `⟨G, Z⟩` in every entry of `T` and in `γ`.
    fn fd_vjp<M: FeatureMap>(
        map: &M, x: &Array2<f64>, y: &Array2<f64>, t: &Array2<f64>, gwidth: f64, g: &Array2<f64>,
    ) -> FeatureGrad {
        let h = 1e-6;
        let inner = |t: &Array2<f64>, w: f64| (map.features(x, y, t, w).unwrap() * g).sum();
        let mut grad_t = Array2::zeros(t.raw_dim());
        for idx in 0..t.len() {
            let (r, c) = (idx / t.ncols(), idx % t.ncols());
            let mut tp = t.clone();
            let mut tm = t.clone();
            tp[[r, c]] += h;
            tm[[r, c]] -= h;
            grad_t[[r, c]] = (inner(&tp, gwidth) - inner(&tm, gwidth)) / (2.0 * h);
        }
        let grad_w = (inner(t, gwidth + h) - inner(t, gwidth - h)) / (2.0 * h);
        FeatureGrad { test_params: grad_t, gwidth: grad_w }
    }

    #[test]
    // Purpose
    // -------
    // Check the mean-embedding map against a hand-computed kernel value.
    //
    // Given
    // -----
    // - x = (1, 0), y = (0, 0) (twice), t = (0, 0), γ = 1.
    //
    // Expect
    // ------
    // - Z = exp(-1) − 1 in every row; shape n × J.
    fn mean_embedding_matches_hand_computed_value() {
        // Arrange
        let x = array![[1.0, 0.0], [1.0, 0.0]];
        let y = array![[0.0, 0.0], [0.0, 0.0]];
        let t = array![[0.0, 0.0]];

        // Act
        let z = MeanEmbeddingFeatures.features(&x, &y, &t, 1.0).unwrap();

        // Assert
        assert_eq!(z.dim(), (2, 1));
        assert_relative_eq!(z[[0, 0]], (-1.0f64).exp() - 1.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Check the smooth-CF map layout (sines, then cosines) and values.
    //
    // Given
    // -----
    // - x = (1), y = (0), t = (1), γ = 1.
    //
    // Expect
    // ------
    // - Z = [sin(1)·e^{-1/2} − 0, cos(1)·e^{-1/2} − 1], shape n × 2J.
    fn smooth_cf_orders_sine_then_cosine_columns() {
        // Arrange
        let x = array![[1.0], [1.0]];
        let y = array![[0.0], [0.0]];
        let t = array![[1.0]];

        // Act
        let z = SmoothCFFeatures.features(&x, &y, &t, 1.0).unwrap();

        // Assert
        let f = (-0.5f64).exp();
        assert_eq!(z.dim(), (2, 2));
        assert_relative_eq!(z[[0, 0]], 1.0f64.sin() * f, epsilon = 1e-12);
        assert_relative_eq!(z[[0, 1]], 1.0f64.cos() * f - 1.0, epsilon = 1e-12);
    }

    #[test]
    // Purpose
    // -------
    // Swapping the samples negates the features for both maps.
    //
    // Given
    // -----
    // - Random 30 × 3 samples and 4 test rows.
    //
    // Expect
    // ------
    // - Z(Y, X) == −Z(X, Y) entry by entry.
    fn swapping_samples_negates_features() {
        // Arrange
        let (x, y, t) = random_inputs(30, 3, 4, 11);

        // Act
        let me_xy = MeanEmbeddingFeatures.features(&x, &y, &t, 1.3).unwrap();
        let me_yx = MeanEmbeddingFeatures.features(&y, &x, &t, 1.3).unwrap();
        let cf_xy = SmoothCFFeatures.features(&x, &y, &t, 1.3).unwrap();
        let cf_yx = SmoothCFFeatures.features(&y, &x, &t, 1.3).unwrap();

        // Assert
        assert_eq!(me_yx, me_xy.mapv(|v| -v));
        assert_eq!(cf_yx, cf_xy.mapv(|v| -v));
    }

    #[test]
    // Purpose
    // -------
    // The mean-embedding VJP agrees with finite differences.
    //
    // Given
    // -----
    // - Random 25 × 2 samples, 3 locations, γ = 0.9, random upstream G.
    //
    // Expect
    // ------
    // - Both gradient parts agree to 1e-5 (absolute or relative).
    fn mean_embedding_vjp_matches_finite_differences() {
        // Arrange
        let (x, y, t) = random_inputs(25, 2, 3, 5);
        let g = standard_normal_matrix(25, 3, &mut seeded_rng(6));
        let map = MeanEmbeddingFeatures;

        // Act
        let analytic = map.vjp(&x, &y, &t, 0.9, &g).unwrap();
        let numeric = fd_vjp(&map, &x, &y, &t, 0.9, &g);

        // Assert
        for (a, b) in analytic.test_params.iter().zip(numeric.test_params.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-5, max_relative = 1e-5);
        }
        assert_relative_eq!(analytic.gwidth, numeric.gwidth, epsilon = 1e-5, max_relative = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // The smooth-CF VJP agrees with finite differences.
    //
    // Given
    // -----
    // - Random 25 × 2 samples, 3 frequencies, γ = 1.4, random upstream G
    //   of width 2J.
    //
    // Expect
    // ------
    // - Both gradient parts agree to 1e-5 (absolute or relative).
    fn smooth_cf_vjp_matches_finite_differences() {
        // Arrange
        let (x, y, t) = random_inputs(25, 2, 3, 8);
        let g = standard_normal_matrix(25, 6, &mut seeded_rng(9));
        let map = SmoothCFFeatures;

        // Act
        let analytic = map.vjp(&x, &y, &t, 1.4, &g).unwrap();
        let numeric = fd_vjp(&map, &x, &y, &t, 1.4, &g);

        // Assert
        for (a, b) in analytic.test_params.iter().zip(numeric.test_params.iter()) {
            assert_relative_eq!(*a, *b, epsilon = 1e-5, max_relative = 1e-5);
        }
        assert_relative_eq!(analytic.gwidth, numeric.gwidth, epsilon = 1e-5, max_relative = 1e-5);
    }

    #[test]
    // Purpose
    // -------
    // Shared guards reject bad widths, dimension mismatches, and wrong
    // upstream shapes.
    //
    // Given
    // -----
    // - Valid 4 × 2 samples; γ = 0; T with 3 columns; G of the wrong shape.
    //
    // Expect
    // ------
    // - `InvalidGaussianWidth`, `TestParamsDimMismatch`, and
    //   `GradientShapeMismatch` respectively.
    fn feature_maps_reject_invalid_inputs() {
        // Arrange
        let (x, y, t) = random_inputs(4, 2, 2, 1);
        let t_wide = Array2::<f64>::zeros((2, 3));
        let bad_g = Array2::<f64>::zeros((4, 3));

        // Act / Assert
        assert_eq!(
            MeanEmbeddingFeatures.features(&x, &y, &t, 0.0),
            Err(TSTError::InvalidGaussianWidth(0.0))
        );
        assert_eq!(
            SmoothCFFeatures.features(&x, &y, &t_wide, 1.0),
            Err(TSTError::TestParamsDimMismatch { expected: 2, found: 3 })
        );
        assert!(matches!(
            SmoothCFFeatures.vjp(&x, &y, &t, 1.0, &bad_g),
            Err(TSTError::GradientShapeMismatch { .. })
        ));
    }

    #[test]
    // Purpose
    // -------
    // Initializers return `J × d` matrices and are seed-deterministic.
    //
    // Given
    // -----
    // - A 40 × 3 pair, J = 5, two RNGs seeded with 19.
    //
    // Expect
    // ------
    // - Shapes (5, 3) and identical draws for equal seeds.
    fn init_test_params_shapes_and_determinism() {
        // Arrange
        let (x, y, _) = random_inputs(40, 3, 1, 2);
        let data = TSTData::new(x, y).unwrap();

        // Act
        let me_a = MeanEmbeddingFeatures.init_test_params(&data, 5, &mut seeded_rng(19)).unwrap();
        let me_b = MeanEmbeddingFeatures.init_test_params(&data, 5, &mut seeded_rng(19)).unwrap();
        let cf = SmoothCFFeatures.init_test_params(&data, 5, &mut seeded_rng(19)).unwrap();

        // Assert
        assert_eq!(me_a.dim(), (5, 3));
        assert_eq!(cf.dim(), (5, 3));
        assert_eq!(me_a, me_b);
    }
}
