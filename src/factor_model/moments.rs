//! factor_model::moments — quasi-long-differencing moment conditions.
//!
//! Purpose
//! -------
//! Express the factor loadings' identifying restrictions as a GMM criterion
//! over never-treated units. For control `c` with outcome path `y_c`
//! (length `T`) and instruments `z_c` (length `L`), the residual of the
//! quasi-long-differenced outcome in free period `t < T − p` is
//!
//! `r_c[t] = y_c[t] + Σ_j Θ[t, j] · y_c[T − p + j]`,
//!
//! which vanishes for every `t` exactly when `y_c` lies in the column space
//! of `F̂` (see [`FactorMatrix`]). The unit moment vector stacks
//! `m_c[t·L + l] = z_c[l] · r_c[t]`, so `K = L · (T − p)`.
//!
//! Key behaviors
//! -------------
//! - The sample mean `m̄(θ) = b + M θ` is affine in θ. `b` and the Jacobian
//!   `M` are precomputed once from the control cross moments.
//! - [`FactorMoments`] implements [`Objective`] with data = weighting matrix
//!   `W`, value `m̄ᵀ W m̄`, and analytic gradient `2 Mᵀ W m̄`.
//!
//! Invariants & assumptions
//! ------------------------
//! - At least one control unit; `p < T`.
//! - Outcomes are `T × N0` (periods × controls); instruments are `N0 × L`
//!   with rows aligned to outcome columns.
use crate::factor_model::{
    errors::{FactorError, FactorResult},
    factors::{FactorMatrix, n_loading_params},
};
use crate::optimization::{
    errors::{OptError, OptResult},
    minimizer::{Cost, Grad, Objective, Theta},
};
use ndarray::{Array1, Array2, ArrayView2, Axis, s};

/// Moment conditions of the `p`-factor model on control units.
#[derive(Debug, Clone, PartialEq)]
pub struct FactorMoments {
    p: usize,
    outcomes: Array2<f64>,
    instruments: Array2<f64>,
    intercept: Array1<f64>,
    jacobian: Array2<f64>,
}

impl FactorMoments {
    /// Precompute `b` and `M` for `p` factors.
    ///
    /// # Errors
    /// - `FactorError::NoControls` if `outcomes` has no columns.
    /// - `FactorError::UnitCountMismatch` if instrument rows differ from
    ///   outcome columns.
    /// - `FactorError::InvalidFactorCount` if `p ≥ T`.
    pub fn new(
        p: usize, outcomes: ArrayView2<f64>, instruments: ArrayView2<f64>,
    ) -> FactorResult<Self> {
        let (n_periods, n_controls) = outcomes.dim();
        if n_controls == 0 {
            return Err(FactorError::NoControls);
        }
        if instruments.nrows() != n_controls {
            return Err(FactorError::UnitCountMismatch {
                outcomes: n_controls,
                instruments: instruments.nrows(),
            });
        }
        if p >= n_periods {
            return Err(FactorError::InvalidFactorCount {
                p,
                n_periods,
                reason: "factor count must be smaller than the number of periods",
            });
        }

        let n_inst = instruments.ncols();
        let free = n_periods - p;
        // cross[s, l] = mean_c y_c[s] · z_c[l]
        let cross = outcomes.dot(&instruments) / n_controls as f64;

        let mut intercept = Array1::<f64>::zeros(free * n_inst);
        let mut jacobian = Array2::<f64>::zeros((free * n_inst, n_loading_params(p, n_periods)));
        for t in 0..free {
            for l in 0..n_inst {
                let k = t * n_inst + l;
                intercept[k] = cross[[t, l]];
                for j in 0..p {
                    jacobian[[k, j * free + t]] = cross[[free + j, l]];
                }
            }
        }

        Ok(Self {
            p,
            outcomes: outcomes.to_owned(),
            instruments: instruments.to_owned(),
            intercept,
            jacobian,
        })
    }

    pub fn n_factors(&self) -> usize {
        self.p
    }

    pub fn n_periods(&self) -> usize {
        self.outcomes.nrows()
    }

    pub fn n_controls(&self) -> usize {
        self.outcomes.ncols()
    }

    pub fn n_instruments(&self) -> usize {
        self.instruments.ncols()
    }

    /// Number of free loading parameters, `(T − p) · p`.
    pub fn n_params(&self) -> usize {
        self.jacobian.ncols()
    }

    /// Number of moment conditions, `L · (T − p)`.
    pub fn n_moments(&self) -> usize {
        self.intercept.len()
    }

    /// `∂m̄/∂θ`, constant in θ.
    pub fn jacobian(&self) -> &Array2<f64> {
        &self.jacobian
    }

    /// Sample-mean moment vector `b + M θ`.
    pub fn mean_moments(&self, theta: &Theta) -> OptResult<Array1<f64>> {
        self.check_len(theta)?;
        Ok(&self.intercept + &self.jacobian.dot(theta))
    }

    /// Per-control moment vectors, one row per control (`N0 × K`).
    pub fn unit_moments(&self, theta: &Theta) -> FactorResult<Array2<f64>> {
        let factors = FactorMatrix::from_theta(theta, self.p, self.n_periods())?;
        let free = self.n_periods() - self.p;
        let free_block = factors.leading(free);
        let residuals = self.outcomes.slice(s![..free, ..]).to_owned()
            + free_block.dot(&self.outcomes.slice(s![free.., ..]));

        let n_inst = self.n_instruments();
        let mut out = Array2::<f64>::zeros((self.n_controls(), self.n_moments()));
        for (c, mut row) in out.axis_iter_mut(Axis(0)).enumerate() {
            for (t, &r) in residuals.column(c).iter().enumerate() {
                for l in 0..n_inst {
                    row[t * n_inst + l] = self.instruments[[c, l]] * r;
                }
            }
        }
        Ok(out)
    }

    /// Centered moment covariance `S = (1/N0) Σ_c (m_c − m̄)(m_c − m̄)ᵀ`.
    pub fn covariance(&self, theta: &Theta) -> FactorResult<Array2<f64>> {
        let unit = self.unit_moments(theta)?;
        let mean = unit.mean_axis(Axis(0)).unwrap_or_else(|| Array1::zeros(unit.ncols()));
        let centered = unit - &mean;
        Ok(centered.t().dot(&centered) / self.n_controls() as f64)
    }

    fn check_len(&self, theta: &Theta) -> OptResult<()> {
        if theta.len() != self.n_params() {
            return Err(OptError::ThetaLengthMismatch {
                expected: self.n_params(),
                actual: theta.len(),
            });
        }
        Ok(())
    }
}

impl Objective for FactorMoments {
    /// Weighting matrix `W` (`K × K`, symmetric).
    type Data = Array2<f64>;

    fn value(&self, theta: &Theta, weight: &Array2<f64>) -> OptResult<Cost> {
        let m = self.mean_moments(theta)?;
        Ok(m.dot(&weight.dot(&m)))
    }

    fn check(&self, theta: &Theta, weight: &Array2<f64>) -> OptResult<()> {
        self.check_len(theta)?;
        let k = self.n_moments();
        if weight.dim() != (k, k) {
            return Err(OptError::WeightShapeMismatch { expected: (k, k), found: weight.dim() });
        }
        if let Some((index, &value)) = theta.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(OptError::InvalidThetaHat {
                index,
                value,
                reason: "starting loadings must be finite",
            });
        }
        Ok(())
    }

    fn grad(&self, theta: &Theta, weight: &Array2<f64>) -> OptResult<Grad> {
        let m = self.mean_moments(theta)?;
        Ok(2.0 * self.jacobian.t().dot(&weight.dot(&m)))
    }
}
