//! gradient_ascent — mini-batch stochastic gradient ascent on the power
//! criterion.
//!
//! Purpose
//! -------
//! Tune the test locations/frequencies `T` and the Gaussian width `γ` of a
//! two-sample test by maximizing the power criterion
//! `s = n · Wᵀ Σ⁻¹ W` of a [`FeatureMap`](crate::statistical_tests::features::FeatureMap).
//! Callers choose a target (joint, `T` only, width only), configure
//! [`SGAOptions`], and receive an [`SGAOutcome`] with the trace.
//!
//! Key behaviors
//! -------------
//! - [`adapter::PowerProblem`] evaluates `s` and `∇s` on a (mini-)batch as
//!   a function of a flat parameter vector; [`adapter::SampledPower`] picks
//!   the rows of each iteration and is the operator argmin runs on.
//! - Gradients come from the feature map's VJP chained through the
//!   criterion ([`GradientMethod::Analytic`]) or from [`finite_diff`].
//!   Analytic mode falls back to finite differences when the map has no VJP.
//! - [`solver::PowerAscent`] is an argmin `Solver`: normalized steps for
//!   `T`, sign-and-clip steps for the width variable `v` (`γ = v²`), `1/√it`
//!   decay, early stop on a flat objective.
//! - [`run::run_sga`] runs it with argmin's `Executor` and adapts the result
//!   into an [`SGAOutcome`].
//! - Numerical faults (singular covariance, non-finite values or gradients,
//!   collapsed width) stop the loop gracefully; every other error
//!   propagates.
//!
//! Invariants & assumptions
//! ------------------------
//! - Exposed widths are always `> 0`; the trace never records a faulty
//!   iteration.
//! - All randomness flows from a local `StdRng` seeded with
//!   [`SGAOptions::seed`]; runs with equal inputs are identical.
//! - The optimizer uses the maximum-likelihood covariance (`ddof = 0`).
//!
//! Conventions
//! -----------
//! - User-facing objective values are `s`; only the argmin state carries
//!   the cost `-s`.
//! - Logging goes through `tracing` (`trace!` per step, `debug!` at start
//!   and end, `warn!` on a numerical fault); no subscriber is installed.
//!
//! Downstream usage
//! ----------------
//! - The mean-embedding and smooth-CF tests call [`api`] entrypoints with
//!   their own feature map and presets.
//!
//! Testing notes
//! -------------
//! - Unit tests cover the θ layout, analytic-vs-FD gradients, the solver's
//!   step and stopping rules, executor runs, fault truncation, and
//!   reproducibility.

pub mod adapter;
pub mod api;
pub mod finite_diff;
pub mod run;
pub mod solver;
pub mod traits;
pub mod types;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::api::{
    init_and_optimize, initial_width_var, optimize_gwidth, optimize_test_params,
    optimize_test_params_width,
};
pub use self::run::run_sga;
pub use self::solver::PowerAscent;
pub use self::traits::{GradientMethod, OptimTarget, OptimTrace, SGAOptions, SGAOutcome};
pub use self::types::{Grad, TestParams, Theta};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_two_sample::optimization::gradient_ascent::prelude::*;
//
// to import the main optimizer surface in a single line.

pub mod prelude {
    pub use super::api::{optimize_gwidth, optimize_test_params, optimize_test_params_width};
    pub use super::traits::{GradientMethod, OptimTarget, OptimTrace, SGAOptions, SGAOutcome};
}
