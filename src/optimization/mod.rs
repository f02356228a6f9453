//! optimization — power-criterion ascent, width transforms, and error surface.
//!
//! Purpose
//! -------
//! Provide the optimization layer that tunes two-sample tests: a
//! gradient-ascent optimizer over test locations/frequencies and the
//! Gaussian width, the constrained-width helpers it relies on, and a single
//! error/result surface.
//!
//! Key behaviors
//! -------------
//! - Maximize the power criterion of any feature map with mini-batch
//!   stochastic gradient ascent (`gradient_ascent`), jointly or one
//!   parameter group at a time.
//! - Keep the width positive by evolving `v` with `γ = v²`
//!   (`numerical_stability`).
//! - Normalize option errors, wrapped test errors, and backend (argmin)
//!   errors into `errors::OptError` with the alias `OptResult<T>`.
//!
//! Invariants & assumptions
//! ------------------------
//! - Configuration problems are returned as `Err` before any iteration.
//! - Numerical faults inside the loop never surface as `Err`; they end the
//!   run and are visible in the outcome's termination status.
//!
//! Conventions
//! -----------
//! - The optimizer maximizes `s`; the argmin state records the cost
//!   `c = -s`. Outcomes and traces are reported in terms of `s`.
//!
//! Downstream usage
//! ----------------
//! - `statistical_tests::{mean_embedding, smooth_cf}` call the
//!   `gradient_ascent` entrypoints with their feature maps.
//! - Front-ends import the curated surface via `optimization::prelude::*`.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each submodule; integration tests under
//!   `tests/` exercise optimize-then-test pipelines.

pub mod errors;
pub mod gradient_ascent;
pub mod numerical_stability;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_two_sample::optimization::prelude::*;
//
// to import the main optimization surface in a single line.

pub mod prelude {
    pub use super::errors::{OptError, OptResult};
    pub use super::gradient_ascent::prelude::*;
    pub use super::numerical_stability::prelude::*;
}
