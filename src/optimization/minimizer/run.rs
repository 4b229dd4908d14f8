//! Drive an argmin L-BFGS solver to completion and package the final state.
use crate::optimization::{
    errors::OptResult,
    minimizer::{Grad, MinimizerOptions, Objective, OptimOutcome, Theta, adapter::ArgMinAdapter},
};
use argmin::core::{CostFunction, Executor, Gradient, IterState, Solver, State};
use argmin_math::ArgminL2Norm;
use log::{Level, debug, log_enabled};

type LbfgsState = IterState<Theta, Grad, (), (), (), f64>;

/// Run `solver` on `problem` from `theta0`.
///
/// The iteration cap comes from `opts.tols.max_iter`. With the `obs_slog`
/// feature and `opts.verbose`, argmin's terminal observer is attached to
/// every iteration.
///
/// # Errors
/// Solver and line-search failures from argmin, and anything
/// [`OptimOutcome::new`] rejects in the final state.
pub fn run_lbfgs<'a, F, S>(
    theta0: Theta, opts: &MinimizerOptions, problem: ArgMinAdapter<'a, F>, solver: S,
) -> OptResult<OptimOutcome>
where
    F: Objective,
    S: Solver<ArgMinAdapter<'a, F>, LbfgsState> + Send + 'static,
{
    if log_enabled!(Level::Debug) {
        trace_start(&theta0, &problem)?;
    }

    let mut executor = Executor::new(problem, solver).configure(|state| state.param(theta0));
    if let Some(cap) = opts.tols.max_iter {
        executor = executor.configure(|state| state.max_iters(cap as u64));
    }
    #[cfg(feature = "obs_slog")]
    if opts.verbose {
        executor = executor.add_observer(
            argmin_observer_slog::SlogLogger::term_noblock(),
            argmin::core::observers::ObserverMode::Always,
        );
    }

    let mut state = executor.run()?.state().clone();
    let termination = state.get_termination_status().clone();
    let iterations = state.get_iter();
    let counts = state.get_func_counts().clone();
    let grad = state.take_gradient();
    debug!("L-BFGS stopped after {iterations} iterations: {termination:?}");
    OptimOutcome::new(
        state.take_best_param(),
        state.get_best_cost(),
        termination,
        iterations,
        counts,
        grad,
    )
}

// ---- Helper methods ----

fn trace_start<F: Objective>(theta0: &Theta, problem: &ArgMinAdapter<'_, F>) -> OptResult<()> {
    let cost = problem.cost(theta0)?;
    match problem.gradient(theta0) {
        Ok(g) => debug!("L-BFGS start: cost = {cost:.6e}, |grad| = {:.6e}", g.l2_norm()),
        Err(_) => debug!("L-BFGS start: cost = {cost:.6e}"),
    }
    Ok(())
}
