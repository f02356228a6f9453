//! Public configuration and result types of the gradient-ascent optimizer.
//!
//! - [`SGAOptions`]: iteration cap, step sizes, mini-batch proportion,
//!   stopping tolerance, seed, and gradient strategy.
//! - [`GradientMethod`]: closed-form VJPs (with finite-difference fallback)
//!   or pure finite differences.
//! - [`OptimTarget`]: which of `T` and the width are free.
//! - [`OptimTrace`]: per-iteration record of `T`, width, and objective.
//! - [`SGAOutcome`]: normalized result of one optimization run.
//!
//! Convention: the optimizer *maximizes* the power criterion `s`. Values in
//! [`OptimTrace`] and [`SGAOutcome`] are always `s`, never the argmin cost.
use crate::optimization::{
    errors::{OptError, OptResult},
    gradient_ascent::{
        types::{
            TestParams, DEFAULT_BATCH_PROPORTION, DEFAULT_GWIDTH_STEP, DEFAULT_MAX_ITER,
            DEFAULT_SEED, DEFAULT_TEST_PARAMS_STEP, DEFAULT_TOL_FUN,
        },
        validation::{verify_batch_proportion, verify_max_iter, verify_step_size, verify_tol_fun},
    },
};
use argmin::core::{TerminationReason, TerminationStatus};
use ndarray::{Array3, Axis, ShapeError};
use std::str::FromStr;

/// How gradients of the power criterion are obtained.
///
/// Parsing:
/// This enum implements `FromStr` and accepts case-insensitive names
/// (`"analytic"`, `"finitediff"`). Unknown names return
/// `OptError::InvalidGradientMethod`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradientMethod {
    /// Chain rule through the criterion and the feature map's VJP; falls
    /// back to finite differences when the map has no VJP.
    Analytic,
    /// Central differences (forward on failure) of the objective.
    FiniteDiff,
}

impl FromStr for GradientMethod {
    type Err = OptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "analytic" => Ok(GradientMethod::Analytic),
            "finitediff" | "finite_diff" => Ok(GradientMethod::FiniteDiff),
            _ => Err(OptError::InvalidGradientMethod {
                name: s.to_string(),
                reason: "Valid options are case insensitive 'analytic' or 'finitediff'.",
            }),
        }
    }
}

/// Which parameters move during ascent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimTarget {
    /// Test locations/frequencies only; the width is held fixed.
    TestParams,
    /// The width only; `T` is held fixed.
    GaussianWidth,
    /// Both jointly.
    Joint,
}

impl OptimTarget {
    pub fn moves_test_params(self) -> bool {
        matches!(self, OptimTarget::TestParams | OptimTarget::Joint)
    }

    pub fn moves_gwidth(self) -> bool {
        matches!(self, OptimTarget::GaussianWidth | OptimTarget::Joint)
    }
}

/// Optimizer configuration.
///
/// Fields:
/// - `max_iter`: iteration cap (`> 0`).
/// - `test_params_step_size`: step size for `T` (`> 0`).
/// - `gwidth_step_size`: step size for the width variable (`> 0`).
/// - `batch_proportion`: mini-batch fraction in (0, 1]; `1.0` is full batch.
/// - `tol_fun`: stop once two successive objective values differ by at
///   most this much (`≥ 0`), from the third iteration on.
/// - `seed`: seed of every random draw made by one run.
/// - `gradient`: [`GradientMethod`].
///
/// Default:
/// - `max_iter = 400`, steps `0.05` / `0.01`, `batch_proportion = 1.0`,
///   `tol_fun = 1e-3`, `seed = 1`, `gradient = Analytic`.
#[derive(Debug, Clone, PartialEq)]
pub struct SGAOptions {
    pub max_iter: usize,
    pub test_params_step_size: f64,
    pub gwidth_step_size: f64,
    pub batch_proportion: f64,
    pub tol_fun: f64,
    pub seed: u64,
    pub gradient: GradientMethod,
}

impl SGAOptions {
    /// Create a validated set of optimizer options.
    ///
    /// # Errors
    /// - [`OptError::InvalidMaxIter`] for `max_iter == 0`.
    /// - [`OptError::InvalidStepSize`] for a non-finite or `≤ 0` step.
    /// - [`OptError::InvalidBatchProportion`] outside (0, 1].
    /// - [`OptError::InvalidTolFun`] for a non-finite or negative tolerance.
    pub fn new(
        max_iter: usize, test_params_step_size: f64, gwidth_step_size: f64,
        batch_proportion: f64, tol_fun: f64, seed: u64, gradient: GradientMethod,
    ) -> OptResult<Self> {
        verify_max_iter(max_iter)?;
        verify_step_size("test_params_step_size", test_params_step_size)?;
        verify_step_size("gwidth_step_size", gwidth_step_size)?;
        verify_batch_proportion(batch_proportion)?;
        verify_tol_fun(tol_fun)?;
        Ok(Self {
            max_iter,
            test_params_step_size,
            gwidth_step_size,
            batch_proportion,
            tol_fun,
            seed,
            gradient,
        })
    }

    /// Re-run every check of [`SGAOptions::new`]; used on options whose
    /// public fields may have been edited after construction.
    pub fn validate(&self) -> OptResult<()> {
        verify_max_iter(self.max_iter)?;
        verify_step_size("test_params_step_size", self.test_params_step_size)?;
        verify_step_size("gwidth_step_size", self.gwidth_step_size)?;
        verify_batch_proportion(self.batch_proportion)?;
        verify_tol_fun(self.tol_fun)
    }
}

impl Default for SGAOptions {
    fn default() -> Self {
        Self {
            max_iter: DEFAULT_MAX_ITER,
            test_params_step_size: DEFAULT_TEST_PARAMS_STEP,
            gwidth_step_size: DEFAULT_GWIDTH_STEP,
            batch_proportion: DEFAULT_BATCH_PROPORTION,
            tol_fun: DEFAULT_TOL_FUN,
            seed: DEFAULT_SEED,
            gradient: GradientMethod::Analytic,
        }
    }
}

/// Per-iteration record, truncated at the stopping iteration.
///
/// Entry `t` holds the objective evaluated *before* the update of
/// iteration `t`, and `T` and the width *after* it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OptimTrace {
    pub test_params: Vec<TestParams>,
    pub gwidths: Vec<f64>,
    pub obj_values: Vec<f64>,
}

impl OptimTrace {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            test_params: Vec::with_capacity(capacity),
            gwidths: Vec::with_capacity(capacity),
            obj_values: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, test_params: TestParams, gwidth: f64, obj_value: f64) {
        self.test_params.push(test_params);
        self.gwidths.push(gwidth);
        self.obj_values.push(obj_value);
    }

    pub fn len(&self) -> usize {
        self.obj_values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.obj_values.is_empty()
    }

    /// Stack the `T` snapshots into an `iterations × J × d` array; `J × d`
    /// is taken from the first snapshot and an empty trace gives shape
    /// `(0, 0, 0)`.
    ///
    /// # Errors
    /// [`ShapeError`] when the snapshots do not all share one shape.
    pub fn stacked_test_params(&self) -> Result<Array3<f64>, ShapeError> {
        if self.test_params.is_empty() {
            return Ok(Array3::zeros((0, 0, 0)));
        }
        let views: Vec<_> = self.test_params.iter().map(|t| t.view()).collect();
        ndarray::stack(Axis(0), &views)
    }
}

/// Canonical result of one gradient-ascent run.
///
/// - `test_params` / `gwidth`: final values (the last recorded ones, or the
///   initial ones when nothing was recorded).
/// - `test_params0` / `gwidth0`: starting values.
/// - `target`: which parameters moved.
/// - `trace`: per-iteration history.
/// - `status`: argmin termination status
///   (`MaxItersReached`, `SolverConverged`, or `SolverExit(reason)` on a
///   numerical fault).
/// - `converged`: `true` only for `SolverConverged`.
#[derive(Debug, Clone, PartialEq)]
pub struct SGAOutcome {
    pub test_params: TestParams,
    pub gwidth: f64,
    pub test_params0: TestParams,
    pub gwidth0: f64,
    pub target: OptimTarget,
    pub trace: OptimTrace,
    pub status: TerminationStatus,
    pub converged: bool,
}

impl SGAOutcome {
    /// Assemble the outcome from the starting point, the trace, and the
    /// termination reason.
    pub fn new(
        test_params0: TestParams, gwidth0: f64, target: OptimTarget, trace: OptimTrace,
        reason: TerminationReason,
    ) -> Self {
        let test_params = trace.test_params.last().cloned().unwrap_or_else(|| test_params0.clone());
        let gwidth = trace.gwidths.last().copied().unwrap_or(gwidth0);
        let converged = reason == TerminationReason::SolverConverged;
        Self {
            test_params,
            gwidth,
            test_params0,
            gwidth0,
            target,
            trace,
            status: TerminationStatus::Terminated(reason),
            converged,
        }
    }

    /// Number of recorded iterations.
    pub fn iterations(&self) -> usize {
        self.trace.len()
    }

    /// `true` when the run stopped on a numerical fault.
    pub fn stopped_on_fault(&self) -> bool {
        matches!(self.status, TerminationStatus::Terminated(TerminationReason::SolverExit(_)))
    }

    /// Last recorded objective value, if any.
    pub fn final_objective(&self) -> Option<f64> {
        self.trace.obj_values.last().copied()
    }
}
