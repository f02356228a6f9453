//! gradient_ascent::finite_diff — finite-difference gradients of the power
//! criterion.
//!
//! Purpose
//! -------
//! Approximate `∇s(θ)` when a feature map has no closed-form VJP or the
//! caller asks for [`GradientMethod::FiniteDiff`](super::traits::GradientMethod)
//! explicitly, without exposing the `finitediff` API to the rest of the
//! optimizer.
//!
//! Key behaviors
//! -------------
//! - Central differences first; forward differences when the central pass
//!   captured an error or produced an invalid gradient.
//! - Errors raised by the objective inside the difference closure are
//!   captured in a `RefCell` (the closure must return `f64`) and surfaced
//!   after the pass.
//!
//! Invariants & assumptions
//! ------------------------
//! - Returned gradients satisfy [`validate_grad`] for `theta.len()`.
//! - The objective is evaluated on the same mini-batch for every
//!   perturbation; batch selection happens in the caller.
use crate::optimization::{
    errors::{OptError, OptResult},
    gradient_ascent::{
        types::{Grad, Theta},
        validation::validate_grad,
    },
};
use finitediff::FiniteDiff;
use std::cell::RefCell;

/// Finite-difference gradient of `func` at `theta`.
///
/// Parameters
/// ----------
/// - `theta`: `&Theta`
///   Evaluation point; its length fixes the gradient dimension.
/// - `func`: `&F`
///   Fallible scalar objective.
///
/// Returns
/// -------
/// `OptResult<Grad>`
///   The central-difference gradient when it is clean, otherwise the
///   forward-difference gradient.
///
/// Errors
/// ------
/// - The first error raised by `func` during the forward pass.
/// - `OptError::InvalidGradient` / `OptError::GradientDimMismatch` when the
///   forward gradient fails validation.
///
/// Examples
/// --------
/// ```rust
/// # use ndarray::array;
/// # use rust_two_sample::optimization::gradient_ascent::finite_diff::run_fd_diff;
/// # use rust_two_sample::optimization::errors::OptResult;
/// let theta = array![1.0, -2.0];
/// let g = run_fd_diff(&theta, &|t: &ndarray::Array1<f64>| -> OptResult<f64> { Ok(t.dot(t)) })
///     .unwrap();
/// assert!((g[0] - 2.0).abs() < 1e-5 && (g[1] + 4.0).abs() < 1e-5);
/// ```
pub fn run_fd_diff<F>(theta: &Theta, func: &F) -> OptResult<Grad>
where
    F: Fn(&Theta) -> OptResult<f64>,
{
    let dim = theta.len();
    let closure_err: RefCell<Option<OptError>> = RefCell::new(None);
    let wrapped = |t: &Theta| -> f64 {
        match func(t) {
            Ok(val) => val,
            Err(e) => {
                let mut slot = closure_err.borrow_mut();
                if slot.is_none() {
                    *slot = Some(e);
                }
                f64::NAN
            }
        }
    };

    let central = theta.central_diff(&wrapped);
    if closure_err.borrow().is_none() && validate_grad(&central, dim).is_ok() {
        return Ok(central);
    }

    closure_err.replace(None);
    let forward = theta.forward_diff(&wrapped);
    if let Some(err) = closure_err.take() {
        return Err(err);
    }
    validate_grad(&forward, dim)?;
    Ok(forward)
}
