//! numerical_stability — constrained-parameter transforms for the optimizer.
//!
//! Purpose
//! -------
//! Keep the Gaussian width strictly meaningful during gradient ascent by
//! optimizing an unconstrained variable `v` with `γ = v²`, and centralize
//! the small constants of the update rule (initial offset, width-step clip,
//! step decay exponent).
//!
//! Key behaviors
//! -------------
//! - Map widths to and from the unconstrained variable and push gradients
//!   through the map (`chain_width_grad`).
//! - Provide the sign-and-clip width step and the `it^0.5` decay.
//!
//! Invariants & assumptions
//! ------------------------
//! - All helpers are pure `f64` arithmetic: no allocation, logging, or
//!   global state.
//! - Validation of the values passed in happens in the optimizer layer.
//!
//! Testing notes
//! -------------
//! - Unit tests in [`transformations`] check round trips, the chain rule,
//!   and clipping/decay arithmetic.

pub mod transformations;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::transformations::{
    chain_width_grad, clipped_sign_step, heuristic_width_var, step_decay, unconstrained_to_width,
    width_to_unconstrained, GWIDTH_EPS, MAX_WIDTH_STEP, STEP_DECAY_POW,
};

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_two_sample::optimization::numerical_stability::prelude::*;
//
// to import the main numerical-stability surface in a single line.

pub mod prelude {
    pub use super::transformations::{
        heuristic_width_var, unconstrained_to_width, width_to_unconstrained, GWIDTH_EPS,
    };
}
