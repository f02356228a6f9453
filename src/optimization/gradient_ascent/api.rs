//! Public entrypoints of the gradient-ascent optimizer.
//!
//! Each entrypoint fixes an [`OptimTarget`], resolves the initial width
//! variable, and delegates to [`run_sga`]. They are generic over the
//! [`FeatureMap`], so the mean-embedding and smooth-CF tests share them.
use crate::{
    optimization::{
        errors::OptResult,
        gradient_ascent::{
            run::run_sga,
            traits::{OptimTarget, SGAOptions, SGAOutcome},
            types::TestParams,
            validation::verify_initial_width,
        },
        numerical_stability::transformations::{heuristic_width_var, width_to_unconstrained},
    },
    statistical_tests::{data::TSTData, features::FeatureMap, sampling::seeded_rng},
};

/// Resolve `v₀`: `√γ₀` for a supplied width, otherwise the data heuristic
/// `1e-4 + mean_std^0.5`.
///
/// # Errors
/// `OptError::InvalidInitialWidth` for a non-finite or non-positive `γ₀`.
pub fn initial_width_var(data: &TSTData, gwidth0: Option<f64>) -> OptResult<f64> {
    match gwidth0 {
        Some(gwidth) => {
            verify_initial_width(gwidth)?;
            Ok(width_to_unconstrained(gwidth))
        }
        None => Ok(heuristic_width_var(data.mean_std())),
    }
}

/// Jointly optimize the test parameters and the Gaussian width.
///
/// Parameters
/// ----------
/// - `map`: feature map defining the criterion.
/// - `data`: training pair (must be disjoint from the data later tested).
/// - `test_params0`: initial `J × d` matrix.
/// - `gwidth0`: initial width, or `None` for the data heuristic.
/// - `opts`: optimizer options.
///
/// Returns
/// -------
/// `OptResult<SGAOutcome>` with target [`OptimTarget::Joint`].
///
/// Errors
/// ------
/// - `OptError::InvalidInitialWidth`, option and parameter validation
///   errors, `OptError::BatchTooSmall`.
/// - Non-fault objective errors (see [`run_sga`]).
pub fn optimize_test_params_width<M: FeatureMap>(
    map: &M, data: &TSTData, test_params0: TestParams, gwidth0: Option<f64>, opts: &SGAOptions,
) -> OptResult<SGAOutcome> {
    let width_var0 = initial_width_var(data, gwidth0)?;
    run_sga(map, data, test_params0, width_var0, OptimTarget::Joint, opts)
}

/// Optimize the test parameters with the width held at `gwidth`.
pub fn optimize_test_params<M: FeatureMap>(
    map: &M, data: &TSTData, test_params0: TestParams, gwidth: f64, opts: &SGAOptions,
) -> OptResult<SGAOutcome> {
    verify_initial_width(gwidth)?;
    run_sga(map, data, test_params0, width_to_unconstrained(gwidth), OptimTarget::TestParams, opts)
}

/// Optimize the width with the test parameters held at `test_params`.
pub fn optimize_gwidth<M: FeatureMap>(
    map: &M, data: &TSTData, test_params: TestParams, gwidth0: Option<f64>, opts: &SGAOptions,
) -> OptResult<SGAOutcome> {
    let width_var0 = initial_width_var(data, gwidth0)?;
    run_sga(map, data, test_params, width_var0, OptimTarget::GaussianWidth, opts)
}

/// Draw `n_params` initial test parameters with the map's own initializer
/// (seeded from `opts.seed`), then optimize jointly from the heuristic
/// width.
pub fn init_and_optimize<M: FeatureMap>(
    map: &M, data: &TSTData, n_params: usize, opts: &SGAOptions,
) -> OptResult<SGAOutcome> {
    let mut rng = seeded_rng(opts.seed);
    let test_params0 = map.init_test_params(data, n_params, &mut rng)?;
    optimize_test_params_width(map, data, test_params0, None, opts)
}
