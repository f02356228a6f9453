//! Adapter that exposes the power criterion of a feature map as a function
//! of a flat parameter vector.
//!
//! [`PowerProblem`] evaluates `s(θ)` and `∇s(θ)` on one fixed pair of row
//! sets; [`SampledPower`] owns the whole sample pair and is the operator the
//! `argmin` executor hands to the ascent solver, which picks the rows of
//! every iteration. Values are always `s`; the solver reports `-s` as the
//! argmin cost.
//!
//! `θ` packs the free parameters only: the row-major entries of `T` when `T`
//! moves, then the width variable `v` (with `γ = v²`) when the width moves.
use crate::{
    optimization::{
        errors::{OptError, OptResult},
        gradient_ascent::{
            finite_diff::run_fd_diff,
            traits::{GradientMethod, OptimTarget},
            types::{Grad, TestParams, Theta},
            validation::{validate_grad, validate_value},
        },
        numerical_stability::transformations::{chain_width_grad, unconstrained_to_width},
    },
    statistical_tests::{
        criterion::{power_criterion, power_criterion_with_grad, CovEstimator},
        data::TSTData,
        errors::TSTError,
        features::FeatureMap,
    },
};
use ndarray::{s, Array1, Array2};

/// Position of `T` and `v` inside the flat parameter vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThetaLayout {
    pub n_params: usize,
    pub dim: usize,
    pub target: OptimTarget,
}

impl ThetaLayout {
    pub fn new(n_params: usize, dim: usize, target: OptimTarget) -> Self {
        Self { n_params, dim, target }
    }

    fn n_test_entries(&self) -> usize {
        if self.target.moves_test_params() {
            self.n_params * self.dim
        } else {
            0
        }
    }

    /// Length of `θ`.
    pub fn len(&self) -> usize {
        self.n_test_entries() + usize::from(self.target.moves_gwidth())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flatten the free parts of `(T, v)`.
    pub fn pack(&self, test_params: &TestParams, width_var: f64) -> Theta {
        let mut theta = Vec::with_capacity(self.len());
        if self.target.moves_test_params() {
            theta.extend(test_params.iter().copied());
        }
        if self.target.moves_gwidth() {
            theta.push(width_var);
        }
        Array1::from(theta)
    }

    /// Rebuild `(T, v)`, taking fixed parts from `fixed_test_params` and
    /// `fixed_width_var`.
    ///
    /// # Errors
    /// [`OptError::ThetaLengthMismatch`] when `θ` has the wrong length.
    pub fn unpack(
        &self, theta: &Theta, fixed_test_params: &TestParams, fixed_width_var: f64,
    ) -> OptResult<(TestParams, f64)> {
        if theta.len() != self.len() {
            return Err(OptError::ThetaLengthMismatch { expected: self.len(), actual: theta.len() });
        }
        let d = self.dim;
        let test_params = if self.target.moves_test_params() {
            Array2::from_shape_fn((self.n_params, d), |(r, c)| theta[r * d + c])
        } else {
            fixed_test_params.clone()
        };
        let width_var =
            if self.target.moves_gwidth() { theta[self.n_test_entries()] } else { fixed_width_var };
        Ok((test_params, width_var))
    }

    /// Split a gradient with this layout into its `T` block (row-major) and
    /// width entry.
    pub fn split_grad(&self, grad: &Grad) -> (Array1<f64>, f64) {
        let k = self.n_test_entries();
        let grad_t = grad.slice(s![..k]).to_owned();
        let grad_v = if self.target.moves_gwidth() { grad[k] } else { 0.0 };
        (grad_t, grad_v)
    }
}

/// Power criterion of `map` on one (mini-)batch, as a function of `θ`.
#[derive(Debug, Clone)]
pub struct PowerProblem<'a, M: FeatureMap> {
    pub map: &'a M,
    pub x: &'a Array2<f64>,
    pub y: &'a Array2<f64>,
    pub layout: ThetaLayout,
    pub fixed_test_params: &'a TestParams,
    pub fixed_width_var: f64,
    pub method: GradientMethod,
}

impl<'a, M: FeatureMap> PowerProblem<'a, M> {
    pub fn new(
        map: &'a M, x: &'a Array2<f64>, y: &'a Array2<f64>, layout: ThetaLayout,
        fixed_test_params: &'a TestParams, fixed_width_var: f64, method: GradientMethod,
    ) -> Self {
        Self { map, x, y, layout, fixed_test_params, fixed_width_var, method }
    }

    fn unpack(&self, theta: &Theta) -> OptResult<(TestParams, f64, f64)> {
        let (test_params, width_var) =
            self.layout.unpack(theta, self.fixed_test_params, self.fixed_width_var)?;
        let gwidth = unconstrained_to_width(width_var);
        if !gwidth.is_finite() || gwidth <= 0.0 {
            return Err(OptError::DegenerateWidth { value: gwidth });
        }
        Ok((test_params, width_var, gwidth))
    }

    fn feature_matrix(&self, test_params: &TestParams, gwidth: f64) -> OptResult<Array2<f64>> {
        let z = self.map.features(self.x, self.y, test_params, gwidth)?;
        let expected = self.map.n_features(test_params.nrows());
        if z.ncols() != expected {
            return Err(TSTError::FeatureDimMismatch { expected, found: z.ncols() }.into());
        }
        Ok(z)
    }

    /// Evaluate `s(θ)` with the maximum-likelihood covariance.
    ///
    /// # Errors
    /// - [`OptError::DegenerateWidth`] when `v²` is not a positive width.
    /// - Wrapped feature-map and criterion errors (numerical faults among
    ///   them), including a feature-dimension mismatch.
    /// - [`OptError::NonFiniteCost`] for a non-finite value.
    pub fn objective(&self, theta: &Theta) -> OptResult<f64> {
        let (test_params, _, gwidth) = self.unpack(theta)?;
        let z = self.feature_matrix(&test_params, gwidth)?;
        let value = power_criterion(&z, CovEstimator::MaxLikelihood)?;
        validate_value(value)?;
        Ok(value)
    }

    /// Evaluate `s(θ)` and `∇s(θ)` with the configured [`GradientMethod`].
    ///
    /// `Analytic` falls back to finite differences when the map reports
    /// that it has no VJP. All other errors propagate.
    pub fn value_and_gradient(&self, theta: &Theta) -> OptResult<(f64, Grad)> {
        match self.method {
            GradientMethod::Analytic => match self.analytic(theta) {
                Err(OptError::GradientNotImplemented) => self.finite_diff(theta),
                other => other,
            },
            GradientMethod::FiniteDiff => self.finite_diff(theta),
        }
    }

    fn finite_diff(&self, theta: &Theta) -> OptResult<(f64, Grad)> {
        let value = self.objective(theta)?;
        let grad = run_fd_diff(theta, &|t: &Theta| self.objective(t))?;
        Ok((value, grad))
    }

    fn analytic(&self, theta: &Theta) -> OptResult<(f64, Grad)> {
        let (test_params, width_var, gwidth) = self.unpack(theta)?;
        let z = self.feature_matrix(&test_params, gwidth)?;
        let (value, dz) = power_criterion_with_grad(&z, CovEstimator::MaxLikelihood)?;
        validate_value(value)?;
        let fgrad = self.map.vjp(self.x, self.y, &test_params, gwidth, &dz)?;

        let mut grad = Vec::with_capacity(self.layout.len());
        if self.layout.target.moves_test_params() {
            grad.extend(fgrad.test_params.iter().copied());
        }
        if self.layout.target.moves_gwidth() {
            grad.push(chain_width_grad(fgrad.gwidth, width_var));
        }
        let grad = Array1::from(grad);
        validate_grad(&grad, self.layout.len())?;
        Ok((value, grad))
    }
}

/// Power criterion over a whole sample pair, evaluated on the rows the
/// solver selects for each iteration.
///
/// This is the operator handed to `argmin`'s `Executor`; the fixed parts of
/// `(T, v)` are owned so the operator outlives the caller's initial values.
#[derive(Debug, Clone)]
pub struct SampledPower<'a, M: FeatureMap> {
    pub map: &'a M,
    pub data: &'a TSTData,
    pub layout: ThetaLayout,
    pub fixed_test_params: TestParams,
    pub fixed_width_var: f64,
    pub method: GradientMethod,
}

impl<'a, M: FeatureMap> SampledPower<'a, M> {
    pub fn new(
        map: &'a M, data: &'a TSTData, layout: ThetaLayout, fixed_test_params: TestParams,
        fixed_width_var: f64, method: GradientMethod,
    ) -> Self {
        Self { map, data, layout, fixed_test_params, fixed_width_var, method }
    }

    /// `s(θ)` and `∇s(θ)` on the rows in `batch`, or on every row for `None`.
    pub fn value_and_gradient(&self, theta: &Theta, batch: Option<&[usize]>) -> OptResult<(f64, Grad)> {
        match batch {
            None => {
                let (x, y) = self.data.xy();
                self.on_rows(x, y).value_and_gradient(theta)
            }
            Some(idx) => {
                let (x, y) = self.data.batch(idx);
                self.on_rows(&x, &y).value_and_gradient(theta)
            }
        }
    }

    fn on_rows<'b>(&'b self, x: &'b Array2<f64>, y: &'b Array2<f64>) -> PowerProblem<'b, M> {
        PowerProblem::new(
            self.map,
            x,
            y,
            self.layout,
            &self.fixed_test_params,
            self.fixed_width_var,
            self.method,
        )
    }
}
