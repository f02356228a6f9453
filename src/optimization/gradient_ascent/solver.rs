//! `argmin` solver for normalized stochastic gradient ascent on the power
//! criterion.
//!
//! [`PowerAscent`] is driven by `argmin::core::Executor` on a
//! [`SampledPower`] operator. Each `next_iter` draws the mini-batch, moves
//! `T` along the normalized gradient and the width variable by the clipped
//! sign step, and records `(θ, s)`. The executor's state carries `θ`, the
//! gradient, and the cost `-s`.
//!
//! Termination:
//! - `SolverConverged` once `t ≥ 2` and `|s_t − s_{t−1}| ≤ tol_fun`
//!   ([`Solver::terminate`]).
//! - `SolverExit(reason)` on a numerical fault; the failing iteration is
//!   not recorded and `θ` keeps its last value.
//! - `MaxItersReached` from the executor's own iteration cap.
use crate::{
    optimization::{
        errors::OptError,
        gradient_ascent::{
            adapter::{SampledPower, ThetaLayout},
            traits::SGAOptions,
            types::{Cost, Grad, Theta},
        },
        numerical_stability::transformations::{
            clipped_sign_step, step_decay, unconstrained_to_width,
        },
    },
    statistical_tests::{
        features::FeatureMap,
        sampling::{batch_indices, seeded_rng},
    },
};
use argmin::core::{
    ArgminError, Error, IterState, Problem, Solver, State, TerminationReason, TerminationStatus,
    KV,
};
use argmin_math::ArgminL2Norm;
use ndarray::s;
use rand::rngs::StdRng;
use tracing::{trace, warn};

/// Executor state used by [`PowerAscent`].
pub type AscentState = IterState<Theta, Grad, (), (), (), Cost>;

/// Normalized-`T`, sign-clipped-width gradient ascent.
///
/// Holds the step rules, the mini-batch RNG (seeded from
/// [`SGAOptions::seed`]), and the per-iteration history of `θ` and `s`.
#[derive(Debug, Clone)]
pub struct PowerAscent {
    layout: ThetaLayout,
    test_params_step_size: f64,
    gwidth_step_size: f64,
    tol_fun: f64,
    n: usize,
    batch: usize,
    rng: StdRng,
    thetas: Vec<Theta>,
    obj_values: Vec<f64>,
}

impl PowerAscent {
    /// Solver for `n` rows with mini-batches of `batch` rows (`batch == n`
    /// means every iteration sees the full sample).
    pub fn new(layout: ThetaLayout, opts: &SGAOptions, n: usize, batch: usize) -> Self {
        Self {
            layout,
            test_params_step_size: opts.test_params_step_size,
            gwidth_step_size: opts.gwidth_step_size,
            tol_fun: opts.tol_fun,
            n,
            batch,
            rng: seeded_rng(opts.seed),
            thetas: Vec::with_capacity(opts.max_iter),
            obj_values: Vec::with_capacity(opts.max_iter),
        }
    }

    /// `θ` after each recorded iteration.
    pub fn thetas(&self) -> &[Theta] {
        &self.thetas
    }

    /// `s` before each recorded iteration's step.
    pub fn obj_values(&self) -> &[f64] {
        &self.obj_values
    }

    fn draw_batch(&mut self) -> Option<Vec<usize>> {
        (self.batch < self.n).then(|| batch_indices(self.n, self.batch, &mut self.rng))
    }

    /// Apply one ascent step to `theta`.
    ///
    /// # Errors
    /// [`OptError::DegenerateWidth`] when the moved width variable no longer
    /// gives a finite positive width.
    fn step(&self, theta: &Theta, grad: &Grad, it: usize) -> Result<Theta, OptError> {
        let (grad_t, grad_v) = self.layout.split_grad(grad);
        let k = grad_t.len();
        let decay = step_decay(it);
        let mut next = theta.clone();
        if self.layout.target.moves_test_params() {
            let norm = grad_t.l2_norm();
            if norm > 0.0 {
                let scale = self.test_params_step_size / decay / norm;
                next.slice_mut(s![..k]).scaled_add(scale, &grad_t);
            }
        }
        if self.layout.target.moves_gwidth() {
            next[k] += self.gwidth_step_size * clipped_sign_step(grad_v) / decay;
            let gwidth = unconstrained_to_width(next[k]);
            if !gwidth.is_finite() || gwidth <= 0.0 {
                return Err(OptError::DegenerateWidth { value: gwidth });
            }
        }
        Ok(next)
    }
}

fn exit_on_fault(state: AscentState, iter: u64, err: &OptError) -> AscentState {
    warn!(iter, error = %err, "numerical fault, stopping gradient ascent");
    state.terminate_with(TerminationReason::SolverExit(err.to_string()))
}

impl<'a, M: FeatureMap> Solver<SampledPower<'a, M>, AscentState> for PowerAscent {
    const NAME: &'static str = "Normalized SGA";

    fn next_iter(
        &mut self, problem: &mut Problem<SampledPower<'a, M>>, state: AscentState,
    ) -> Result<(AscentState, Option<KV>), Error> {
        let iter = state.get_iter();
        let mut state = state;
        let theta = state.take_param().ok_or_else(|| ArgminError::NotInitialized {
            text: "gradient ascent needs an initial parameter vector".to_string(),
        })?;

        let batch = self.draw_batch();
        let evaluated =
            problem.problem("power_count", |op| Ok(op.value_and_gradient(&theta, batch.as_deref())))?;
        let (value, grad) = match evaluated {
            Ok(vg) => vg,
            Err(err) if err.is_numerical_fault() => {
                return Ok((exit_on_fault(state.param(theta), iter, &err), None));
            }
            Err(err) => return Err(err.into()),
        };

        let next = match self.step(&theta, &grad, iter as usize + 1) {
            Ok(next) => next,
            Err(err) => return Ok((exit_on_fault(state.param(theta), iter, &err), None)),
        };

        trace!(iter, objective = value, "gradient ascent step");
        self.thetas.push(next.clone());
        self.obj_values.push(value);
        Ok((state.param(next).gradient(grad).cost(-value), None))
    }

    fn terminate(&mut self, _state: &AscentState) -> TerminationStatus {
        match self.obj_values.as_slice() {
            [.., prev, last] if self.obj_values.len() >= 3 && (last - prev).abs() <= self.tol_fun => {
                TerminationStatus::Terminated(TerminationReason::SolverConverged)
            }
            _ => TerminationStatus::NotTerminated,
        }
    }
}
