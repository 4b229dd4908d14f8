//! Numeric aliases for the minimizer and the argmin solver types built on
//! them.
//!
//! `Theta` holds the free factor loadings, the leading `(T − p) × p` block
//! of `F̂` stacked column by column; `Jacobian` has
//! one row per output of a differentiated map and one column per loading.
use argmin::solver::{
    linesearch::{HagerZhangLineSearch, MoreThuenteLineSearch},
    quasinewton::LBFGS,
};
use ndarray::{Array1, Array2};
use std::collections::HashMap;

pub type Theta = Array1<f64>;

pub type Grad = Array1<f64>;

pub type Jacobian = Array2<f64>;

/// Value of the GMM criterion `m̄(θ)ᵀ W m̄(θ)`.
pub type Cost = f64;

/// Argmin's evaluation counters, keyed by name (`"cost_count"`, ...).
pub type FnEvalMap = HashMap<String, u64>;

/// L-BFGS history length used when options leave it unset.
pub const DEFAULT_LBFGS_MEM: usize = 7;

pub type HagerZhangLS = HagerZhangLineSearch<Theta, Grad, Cost>;
pub type MoreThuenteLS = MoreThuenteLineSearch<Theta, Grad, Cost>;

pub type LbfgsHagerZhang = LBFGS<HagerZhangLS, Theta, Grad, Cost>;
pub type LbfgsMoreThuente = LBFGS<MoreThuenteLS, Theta, Grad, Cost>;
