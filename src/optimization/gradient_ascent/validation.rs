//! Validation helpers for gradient-ascent optimization.
//!
//! This module centralizes common consistency checks used across the
//! optimizer interface:
//!
//! - **Option checks**: [`verify_max_iter`], [`verify_step_size`],
//!   [`verify_tol_fun`], [`verify_batch_proportion`] reject values that
//!   would make the update rule meaningless.
//! - **Initial width**: [`verify_initial_width`] requires a finite,
//!   strictly positive width.
//! - **Gradient validation**: [`validate_grad`] enforces correct dimension
//!   and finite entries.
//! - **Objective values**: [`validate_value`] checks power-criterion outputs
//!   for finiteness.
//!
//! These helpers standardize error reporting by returning domain-specific
//! [`OptError`] variants.
use crate::optimization::{
    errors::{OptError, OptResult},
    gradient_ascent::types::Grad,
};

/// Validate the iteration cap: must be `> 0`.
///
/// # Errors
/// Returns [`OptError::InvalidMaxIter`] for `0`.
pub fn verify_max_iter(max_iter: usize) -> OptResult<()> {
    if max_iter == 0 {
        return Err(OptError::InvalidMaxIter {
            max_iter,
            reason: "Maximum iterations must be greater than zero.",
        });
    }
    Ok(())
}

/// Validate a step size: **finite** and **strictly positive**.
///
/// # Errors
/// Returns [`OptError::InvalidStepSize`] naming the offending option.
pub fn verify_step_size(name: &'static str, value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::InvalidStepSize { name, value, reason: "Step size must be finite." });
    }
    if value <= 0.0 {
        return Err(OptError::InvalidStepSize {
            name,
            value,
            reason: "Step size must be positive.",
        });
    }
    Ok(())
}

/// Validate the tolerance on successive objective values.
///
/// Zero is allowed and means "stop only on an exactly repeated value".
///
/// # Errors
/// Returns [`OptError::InvalidTolFun`] if the value is non-finite or < 0.
pub fn verify_tol_fun(tol: f64) -> OptResult<()> {
    if !tol.is_finite() {
        return Err(OptError::InvalidTolFun { tol, reason: "Tolerance must be finite." });
    }
    if tol < 0.0 {
        return Err(OptError::InvalidTolFun { tol, reason: "Tolerance must be non-negative." });
    }
    Ok(())
}

/// Validate the mini-batch proportion: `0 < p ≤ 1`.
///
/// # Errors
/// Returns [`OptError::InvalidBatchProportion`] otherwise.
pub fn verify_batch_proportion(value: f64) -> OptResult<()> {
    if !value.is_finite() || value <= 0.0 || value > 1.0 {
        return Err(OptError::InvalidBatchProportion {
            value,
            reason: "Batch proportion must satisfy 0 < p <= 1.",
        });
    }
    Ok(())
}

/// Validate a caller-supplied initial width.
///
/// # Errors
/// Returns [`OptError::InvalidInitialWidth`] for non-finite or `≤ 0` input.
pub fn verify_initial_width(gwidth: f64) -> OptResult<()> {
    if !gwidth.is_finite() || gwidth <= 0.0 {
        return Err(OptError::InvalidInitialWidth { value: gwidth });
    }
    Ok(())
}

/// Validate a gradient vector against dimension and finiteness.
///
/// Checks:
/// - `grad.len() == dim`
/// - every element is finite (`NaN` or `±∞` are rejected)
///
/// # Errors
/// - [`OptError::GradientDimMismatch`] if length does not match `dim`.
/// - [`OptError::InvalidGradient`] with the index/value/reason of the first
///   offending element.
pub fn validate_grad(grad: &Grad, dim: usize) -> OptResult<()> {
    if grad.len() != dim {
        return Err(OptError::GradientDimMismatch { expected: dim, found: grad.len() });
    }
    for (index, &value) in grad.iter().enumerate() {
        if !value.is_finite() {
            return Err(OptError::InvalidGradient {
                index,
                value,
                reason: "Gradient elements must be finite.",
            });
        }
    }
    Ok(())
}

/// Validate that an objective value is finite.
///
/// # Errors
/// Returns [`OptError::NonFiniteCost`] if the value is `NaN` or infinite.
pub fn validate_value(value: f64) -> OptResult<()> {
    if !value.is_finite() {
        return Err(OptError::NonFiniteCost { value });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Boundary behavior of the option guards.
    // - Gradient dimension and finiteness checks.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Option guards accept interior values and reject boundaries.
    //
    // Given
    // -----
    // - max_iter 0/1, step sizes 0/-1/NaN/0.1, tol -1/0, proportions 0/1/1.5.
    //
    // Expect
    // ------
    // - Errors exactly on the invalid values.
    fn option_guards_respect_boundaries() {
        assert!(verify_max_iter(0).is_err());
        assert!(verify_max_iter(1).is_ok());

        assert!(verify_step_size("test_params_step_size", 0.0).is_err());
        assert!(verify_step_size("test_params_step_size", -1.0).is_err());
        assert!(verify_step_size("gwidth_step_size", f64::NAN).is_err());
        assert!(verify_step_size("gwidth_step_size", 0.1).is_ok());

        assert!(verify_tol_fun(-1.0).is_err());
        assert!(verify_tol_fun(0.0).is_ok());

        assert!(verify_batch_proportion(0.0).is_err());
        assert!(verify_batch_proportion(1.0).is_ok());
        assert!(verify_batch_proportion(1.5).is_err());

        assert!(verify_initial_width(0.0).is_err());
        assert!(verify_initial_width(2.0).is_ok());
    }

    #[test]
    // Purpose
    // -------
    // Step-size errors name the offending option.
    //
    // Given
    // -----
    // - `verify_step_size("gwidth_step_size", -0.5)`.
    //
    // Expect
    // ------
    // - `InvalidStepSize { name: "gwidth_step_size", .. }`.
    fn step_size_error_names_option() {
        let err = verify_step_size("gwidth_step_size", -0.5).unwrap_err();
        assert!(matches!(err, OptError::InvalidStepSize { name: "gwidth_step_size", .. }));
    }

    #[test]
    // Purpose
    // -------
    // Gradient validation reports length and the first bad entry.
    //
    // Given
    // -----
    // - A length-2 gradient checked against 3; a gradient with ∞ at index 1.
    //
    // Expect
    // ------
    // - `GradientDimMismatch` then `InvalidGradient { index: 1, .. }`.
    fn validate_grad_reports_dimension_and_first_bad_entry() {
        assert_eq!(
            validate_grad(&array![1.0, 2.0], 3),
            Err(OptError::GradientDimMismatch { expected: 3, found: 2 })
        );
        assert!(matches!(
            validate_grad(&array![0.0, f64::INFINITY, f64::NAN], 3),
            Err(OptError::InvalidGradient { index: 1, .. })
        ));
        assert!(validate_value(f64::NAN).is_err());
    }
}
