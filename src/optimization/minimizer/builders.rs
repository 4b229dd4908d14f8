//! L-BFGS construction for the GMM stages.
//!
//! Solvers are built without a starting point or iteration cap; both are
//! runtime settings applied by [`run_lbfgs`](super::run::run_lbfgs).
use crate::optimization::{
    errors::OptResult,
    minimizer::{
        traits::MinimizerOptions,
        types::{
            Cost, DEFAULT_LBFGS_MEM, Grad, HagerZhangLS, LbfgsHagerZhang, LbfgsMoreThuente,
            MoreThuenteLS, Theta,
        },
    },
};
use argmin::solver::quasinewton::LBFGS;

/// L-BFGS over More–Thuente, the default for the GMM criterion.
pub fn more_thuente_lbfgs(opts: &MinimizerOptions) -> OptResult<LbfgsMoreThuente> {
    lbfgs(MoreThuenteLS::new(), opts)
}

/// L-BFGS over Hager–Zhang.
pub fn hager_zhang_lbfgs(opts: &MinimizerOptions) -> OptResult<LbfgsHagerZhang> {
    lbfgs(HagerZhangLS::new(), opts)
}

/// Wrap `linesearch` in L-BFGS with the configured memory and tolerances.
///
/// Tolerances left as `None` keep argmin's defaults.
///
/// # Errors
/// Argmin's rejection of a tolerance, converted into `OptError`.
pub fn lbfgs<L>(linesearch: L, opts: &MinimizerOptions) -> OptResult<LBFGS<L, Theta, Grad, Cost>> {
    let mut solver = LBFGS::new(linesearch, opts.lbfgs_mem.unwrap_or(DEFAULT_LBFGS_MEM));
    if let Some(tol) = opts.tols.tol_grad {
        solver = solver.with_tolerance_grad(tol)?;
    }
    if let Some(tol) = opts.tols.tol_cost {
        solver = solver.with_tolerance_cost(tol)?;
    }
    Ok(solver)
}
