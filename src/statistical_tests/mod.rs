//! statistical_tests — kernel two-sample tests with a χ² null.
//!
//! Purpose
//! -------
//! Decide whether two multivariate samples come from the same distribution
//! with linear-time tests built on a small set of features: the
//! mean-embedding (ME) test on Gaussian-kernel evaluations at test
//! locations and the smooth characteristic function (SCF) test on
//! sine/cosine features at test frequencies. This subtree holds the data
//! container, the feature maps, the power criterion, the tests themselves,
//! and their shared validation and error handling.
//!
//! Key behaviors
//! -------------
//! - [`TSTData`] validates a sample pair and provides the scale heuristic,
//!   pooled data, train/test splits, and subsampling.
//! - [`FeatureMap`] turns `(X, Y, T, γ)` into the difference features `Z`
//!   and supplies the closed-form VJP used by the optimizer.
//! - [`criterion`] reduces `Z` to `s = n·Wᵀ Σ⁻¹ W` (Cholesky solve) and
//!   differentiates it.
//! - [`MeanEmbeddingTest`] and [`SmoothCFTest`] implement
//!   [`TwoSampleTest`]: statistic on held-out data, χ² p-value, decision.
//!
//! Invariants & assumptions
//! ------------------------
//! - Samples have equal size `n ≥ 2`, equal dimension `d ≥ 1`, and finite
//!   entries; checked once when [`TSTData`] is built.
//! - Swapping X and Y negates `Z` and leaves every statistic unchanged.
//! - Failures are reported through [`TSTResult`]; numerical faults are
//!   recognizable via [`TSTError::is_numerical_fault`].
//!
//! Conventions
//! -----------
//! - Randomness (initial test parameters, splits, subsamples) always comes
//!   from a local `StdRng` built by [`sampling::seeded_rng`].
//! - Degrees of freedom equal the number of feature columns: `J` for ME,
//!   `2J` for SCF.
//!
//! Downstream usage
//! ----------------
//! - Typical Rust code imports the surface via
//!   `statistical_tests::prelude::*`, splits data with
//!   [`TSTData::split_tr_te`], tunes a test on the training half, and calls
//!   `perform_test` on the held-out half.
//! - The optimizer in `optimization::gradient_ascent` is generic over
//!   [`FeatureMap`] and reuses [`criterion`] with the ML covariance.
//!
//! Testing notes
//! -------------
//! - Unit tests live next to each module; `proptest` properties and
//!   end-to-end size/power checks live under `tests/`.

pub mod criterion;
pub mod data;
pub mod errors;
pub mod features;
pub mod mean_embedding;
pub mod outcome;
pub mod sampling;
pub mod smooth_cf;
pub mod validation;

// ---- Re-exports (primary public surface) ----------------------------------

pub use self::criterion::{power_criterion, power_criterion_with_grad, CovEstimator};
pub use self::data::TSTData;
pub use self::errors::{TSTError, TSTResult};
pub use self::features::{FeatureGrad, FeatureMap, MeanEmbeddingFeatures, SmoothCFFeatures};
pub use self::mean_embedding::MeanEmbeddingTest;
pub use self::outcome::{TSTOutcome, TwoSampleTest};
pub use self::smooth_cf::SmoothCFTest;

// ---- Optional convenience prelude for downstream crates -------------------
//
// Downstream crates can write
//
//     use rust_two_sample::statistical_tests::prelude::*;
//
// to import the main two-sample testing surface in a single line.

pub mod prelude {
    pub use super::data::TSTData;
    pub use super::errors::{TSTError, TSTResult};
    pub use super::features::{FeatureMap, MeanEmbeddingFeatures, SmoothCFFeatures};
    pub use super::mean_embedding::MeanEmbeddingTest;
    pub use super::outcome::{TSTOutcome, TwoSampleTest};
    pub use super::smooth_cf::SmoothCFTest;
}
