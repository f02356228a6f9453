//! Execution helper that runs mini-batch stochastic gradient ascent on the
//! power criterion through `argmin` and returns a crate-friendly
//! [`SGAOutcome`].
use crate::{
    optimization::{
        errors::{OptError, OptResult},
        gradient_ascent::{
            adapter::{SampledPower, ThetaLayout},
            solver::PowerAscent,
            traits::{OptimTarget, OptimTrace, SGAOptions, SGAOutcome},
            types::TestParams,
        },
        numerical_stability::transformations::unconstrained_to_width,
    },
    statistical_tests::{
        data::TSTData, features::FeatureMap, sampling::batch_size,
        validation::validate_test_params,
    },
};
use argmin::core::{Executor, State, TerminationReason, TerminationStatus};
use tracing::debug;

/// Run gradient ascent from `(test_params0, width_var0)`.
///
/// # Type Parameters
/// - `M`: the feature map whose power criterion is maximized.
///
/// # Arguments
/// - `test_params0`: initial `J × d` matrix; consumed into the outcome.
/// - `width_var0`: initial unconstrained width variable `v₀` (`γ₀ = v₀²`).
/// - `target`: which of `T` and `v` move.
/// - `opts`: validated [`SGAOptions`].
///
/// # Behavior
/// An `argmin` `Executor` drives [`PowerAscent`] on a [`SampledPower`]
/// operator for at most `opts.max_iter` iterations. Iteration
/// `t = 0, 1, …` (step counter `it = t + 1`):
/// 1. draws a mini-batch of `batch_size(n, batch_proportion)` rows without
///    replacement (the full sample when that is every row),
/// 2. evaluates `s` and `∇s` at the current `(T, v)`,
/// 3. moves `T` by `step_T · ∇_T s / √it / ‖∇_T s‖₂` (no move for a zero
///    gradient) and `v` by `step_γ · sign(g)·min(|g|, 1) / √it`,
/// 4. records `(T, γ, s)`,
/// 5. stops as converged once `t ≥ 2` and `|s_t − s_{t−1}| ≤ tol_fun`.
///
/// A numerical fault (see [`OptError::is_numerical_fault`]) ends the run
/// without recording the failing iteration; the outcome then carries
/// `TerminationReason::SolverExit` and the last recorded state.
///
/// # Errors
/// - Option and test-parameter validation errors.
/// - [`OptError::BatchTooSmall`] when the mini-batch has fewer than 2 rows.
/// - Any error of the objective that is not a numerical fault, e.g. a
///   feature-dimension mismatch, recovered from the executor's error.
pub fn run_sga<M: FeatureMap>(
    map: &M, data: &TSTData, test_params0: TestParams, width_var0: f64, target: OptimTarget,
    opts: &SGAOptions,
) -> OptResult<SGAOutcome> {
    opts.validate()?;
    validate_test_params(&test_params0, data.dim())?;
    let n = data.sample_size();
    let batch = batch_size(n, opts.batch_proportion);
    if batch < 2 {
        return Err(OptError::BatchTooSmall { batch, n });
    }

    let layout = ThetaLayout::new(test_params0.nrows(), data.dim(), target);
    let gwidth0 = unconstrained_to_width(width_var0);
    let theta0 = layout.pack(&test_params0, width_var0);
    debug!(
        map = map.name(),
        opt_target = ?target,
        n_params = test_params0.nrows(),
        batch,
        gwidth0,
        "starting gradient ascent"
    );

    let problem =
        SampledPower::new(map, data, layout, test_params0.clone(), width_var0, opts.gradient);
    let solver = PowerAscent::new(layout, opts, n, batch);
    let result = Executor::new(problem, solver)
        .configure(|state| state.param(theta0).max_iters(opts.max_iter as u64))
        .run()?;

    let reason = match result.state().get_termination_status() {
        TerminationStatus::Terminated(reason) => reason.clone(),
        TerminationStatus::NotTerminated => TerminationReason::MaxItersReached,
    };
    let solver = result.solver();
    let mut trace = OptimTrace::with_capacity(solver.obj_values().len());
    for (theta, &value) in solver.thetas().iter().zip(solver.obj_values()) {
        let (test_params, width_var) = layout.unpack(theta, &test_params0, width_var0)?;
        trace.push(test_params, unconstrained_to_width(width_var), value);
    }

    debug!(
        iterations = trace.len(),
        ?reason,
        objective = trace.obj_values.last().copied().unwrap_or(f64::NAN),
        "gradient ascent finished"
    );
    Ok(SGAOutcome::new(test_params0, gwidth0, target, trace, reason))
}
