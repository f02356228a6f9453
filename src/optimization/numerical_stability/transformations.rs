//! Numerical stability utilities for the Gaussian-width parameterization.
//!
//! The optimizer never moves the Gaussian width `γ` directly. It evolves an
//! unconstrained variable `v` and exposes `γ = v²`, so every reported width
//! is non-negative. The single bad point `v = 0` (γ = 0) is reported by the
//! optimizer as a numerical fault.
//!
//! # Provided items
//! - [`GWIDTH_EPS`]: offset added to the heuristic initial `v`.
//! - [`MAX_WIDTH_STEP`]: clip applied to the width gradient magnitude.
//! - [`STEP_DECAY_POW`]: exponent of the `it^p` step-size decay.
//! - [`width_to_unconstrained`] / [`unconstrained_to_width`]: `γ ↔ v`.
//! - [`heuristic_width_var`]: `v₀ = GWIDTH_EPS + mean_std^0.5`.
//! - [`chain_width_grad`]: `∂s/∂v = ∂s/∂γ · 2v`.
//! - [`clipped_sign_step`]: `sign(g)·min(|g|, MAX_WIDTH_STEP)`.
//! - [`step_decay`]: `it^STEP_DECAY_POW`.

/// Offset keeping the heuristic initial width variable away from zero.
pub const GWIDTH_EPS: f64 = 1e-4;

/// Largest magnitude of the width gradient used in a single step.
pub const MAX_WIDTH_STEP: f64 = 1.0;

/// Step sizes are divided by `it^STEP_DECAY_POW` at iteration `it ≥ 1`.
pub const STEP_DECAY_POW: f64 = 0.5;

/// Map a positive width `γ` to the unconstrained variable `v = √γ`.
pub fn width_to_unconstrained(gwidth: f64) -> f64 {
    gwidth.sqrt()
}

/// Map the unconstrained variable back to the width `γ = v²`.
pub fn unconstrained_to_width(v: f64) -> f64 {
    v * v
}

/// Heuristic initial width variable for data with scale `mean_std`.
///
/// The exposed initial width is therefore `(GWIDTH_EPS + √mean_std)²`,
/// close to `mean_std`.
pub fn heuristic_width_var(mean_std: f64) -> f64 {
    GWIDTH_EPS + mean_std.max(0.0).sqrt()
}

/// Chain rule through `γ = v²`.
pub fn chain_width_grad(grad_gwidth: f64, v: f64) -> f64 {
    grad_gwidth * 2.0 * v
}

/// Sign of `grad` times its magnitude clipped at [`MAX_WIDTH_STEP`]; zero
/// for a zero gradient.
pub fn clipped_sign_step(grad: f64) -> f64 {
    if grad == 0.0 {
        return 0.0;
    }
    grad.signum() * grad.abs().min(MAX_WIDTH_STEP)
}

/// Step-size divisor at 1-based iteration `it`.
pub fn step_decay(it: usize) -> f64 {
    (it.max(1) as f64).powf(STEP_DECAY_POW)
}
