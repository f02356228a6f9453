//! gradient_ascent::types — shared numeric aliases and option defaults.
//!
//! Purpose
//! -------
//! Centralize the vector/matrix aliases and default constants used by the
//! gradient-ascent optimizer so the rest of the module stays agnostic to
//! `ndarray` generics.
//!
//! Conventions
//! -----------
//! - [`Theta`] is the flattened parameter vector the argmin adapter works
//!   on: the row-major entries of `T` (when optimized) followed by the
//!   width variable `v` (when optimized).
//! - [`Grad`] has the same layout as [`Theta`].
//! - [`Cost`] is the argmin cost `-s`; user-facing values are the power
//!   criterion `s` itself.
//!
//! Testing notes
//! -------------
//! - Only aliases and constants; exercised by the surrounding modules.
use ndarray::{Array1, Array2};

/// Flattened optimizer parameter vector.
pub type Theta = Array1<f64>;

/// Gradient vector with the layout of [`Theta`].
pub type Grad = Array1<f64>;

/// Scalar cost handed to argmin (`-s`).
pub type Cost = f64;

/// `J × d` matrix of test locations or frequencies.
pub type TestParams = Array2<f64>;

/// Default iteration cap.
pub const DEFAULT_MAX_ITER: usize = 400;

/// Default step size for test locations/frequencies.
pub const DEFAULT_TEST_PARAMS_STEP: f64 = 0.05;

/// Default step size for the width variable.
pub const DEFAULT_GWIDTH_STEP: f64 = 0.01;

/// Default mini-batch proportion (full batch).
pub const DEFAULT_BATCH_PROPORTION: f64 = 1.0;

/// Default tolerance on successive objective values.
pub const DEFAULT_TOL_FUN: f64 = 1e-3;

/// Default seed for initial draws and mini-batches.
pub const DEFAULT_SEED: u64 = 1;
