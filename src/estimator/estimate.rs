//! estimator::estimate — the estimation pipeline for one call.
//!
//! Steps
//! -----
//! 1. Derive panel metadata and validate the options against it.
//! 2. Optionally apply the within transformation.
//! 3. Fit the factor model on never-treated units (fixed `p`, or the
//!    sequential J-test search).
//! 4. Impute counterfactuals and average gaps into group-time cells.
//! 5. Build the influence function: direct part, plus the loading part
//!    unless the naive variance was requested.
//! 6. Aggregate to the requested effect type.
//! 7. Covariance `IFᵀ IF`, or bootstrap bands for uniform inference.
//! 8. Optionally attach the counterfactual table.
use crate::estimator::{
    errors::EstimateResult,
    options::{EffectType, QldOptions, VarianceType},
    results::{CounterfactualRow, Effects, FactorDiagnostics, Inference, QldEstimate},
    validation::{FactorSearch, ensure_adoption_after_factors, validate_options},
};
use crate::factor_model::{FactorFit, SelectionStep, fit_factor_model, select_factor_count};
use crate::imputation::{estimate_tau_gt, impute_y0, ms_tau_gt};
use crate::inference::{
    aggregate, cross_stage_jacobian, event_study_matrix, group_time_matrix, influence_function,
    loading_influence, multiplier_bootstrap, overall_matrix,
};
use crate::panel::{ColumnSpec, PanelData, PanelFrame, PanelMeta, within_transform};
use ndarray::{Array2, Axis};

/// estimate — QLD imputation estimate of staggered treatment effects.
///
/// Parameters
/// ----------
/// - `panel`: validated balanced panel.
/// - `options`: see [`QldOptions`].
///
/// Returns
/// -------
/// [`QldEstimate`] whose [`Effects`] and [`Inference`] variants follow
/// `options.effect` and `options.variance`.
///
/// Errors
/// ------
/// - Option validation errors before any estimation work.
/// - Optimizer failures (including non-convergence under the default
///   policy), imputation shape errors, and bootstrap errors.
pub fn estimate(panel: &PanelData, options: &QldOptions) -> EstimateResult<QldEstimate> {
    let meta = PanelMeta::from_panel(panel);
    let search = validate_options(options, &meta)?;
    log::debug!(
        "panel: {} periods, {} units ({} never treated), {} cohorts, T0 = {}",
        meta.n_periods,
        meta.n_units,
        meta.controls.len(),
        meta.cells.n_groups(),
        meta.pre_periods
    );

    let outcomes = if options.within_transform {
        within_transform(panel.outcomes.clone(), &meta.controls, meta.pre_periods)
    } else {
        panel.outcomes.clone()
    };

    let (fit, selection, selection_accepted) =
        fit_loadings(&outcomes, panel, &meta, search, options)?;
    let p = fit.n_factors();
    ensure_adoption_after_factors(p, &meta)?;
    log::info!("factor model: p = {p}, J = {:.4} on {} df, p-value = {:.4}", fit.j_stat, fit.df, fit.p_value);

    let cells = &meta.cells;
    let tau = estimate_tau_gt(&fit.theta, p, outcomes.view(), cells)?;
    let ms = ms_tau_gt(&fit.theta, &tau, p, outcomes.view(), cells)?;
    let influence = match options.variance {
        VarianceType::Naive => influence_function(ms.view(), None)?,
        VarianceType::Pointwise | VarianceType::Uniform => {
            let jacobian = cross_stage_jacobian(&fit.theta, &tau, p, outcomes.view(), cells)?;
            let phi = loading_influence(&fit, &meta.controls, meta.n_units)?;
            influence_function(ms.view(), Some((&jacobian, &phi)))?
        }
    };

    let (matrix, labels) = match options.effect {
        EffectType::GroupTime => (group_time_matrix(cells), None),
        EffectType::EventStudy => {
            let (matrix, labels) = event_study_matrix(cells);
            (matrix, Some(labels))
        }
        EffectType::Overall => (overall_matrix(cells)?, None),
    };
    let (estimates, agg_influence) = aggregate(&matrix, &tau, influence.view())?;

    let effects = match (options.effect, labels) {
        (EffectType::EventStudy, Some(relative_times)) => {
            Effects::EventStudy { estimates, relative_times }
        }
        (EffectType::Overall, _) => Effects::Overall { estimate: estimates[0] },
        _ => Effects::GroupTime { estimates, cells: cells.cell_keys(), counts: cells.cell_counts() },
    };

    let inference = match options.variance {
        VarianceType::Uniform => {
            let boot = &options.bootstrap;
            let band =
                multiplier_bootstrap(agg_influence.view(), boot.draws, boot.confidence, boot.seed)?;
            log::info!("uniform critical value {:.4} from {} draws", band.critical_value, boot.draws);
            Inference::Uniform { std_errors: band.std_errors, critical_value: band.critical_value }
        }
        VarianceType::Pointwise | VarianceType::Naive => {
            Inference::Covariance(agg_influence.t().dot(&agg_influence))
        }
    };

    let counterfactual = if options.return_counterfactual {
        let imputed = impute_y0(&fit.theta, p, outcomes.view(), cells, meta.pre_periods)?;
        Some(counterfactual_rows(panel, &outcomes, &imputed))
    } else {
        None
    };

    Ok(QldEstimate {
        factor_count: p,
        variance: options.variance,
        effects,
        inference,
        counterfactual,
        diagnostics: FactorDiagnostics {
            theta: fit.theta.clone(),
            j_stat: fit.j_stat,
            df: fit.df,
            p_value: fit.p_value,
            selection,
            selection_accepted,
        },
    })
}

/// estimate_frame — [`estimate`] on named columns.
///
/// # Errors
/// Column and panel validation errors from [`PanelData::from_frame`], then
/// everything [`estimate`] reports.
pub fn estimate_frame(
    frame: &PanelFrame, columns: &ColumnSpec, options: &QldOptions,
) -> EstimateResult<QldEstimate> {
    let panel = PanelData::from_frame(frame, columns)?;
    estimate(&panel, options)
}

// ---- Helper methods ----

fn fit_loadings(
    outcomes: &Array2<f64>, panel: &PanelData, meta: &PanelMeta, search: FactorSearch,
    options: &QldOptions,
) -> EstimateResult<(FactorFit, Vec<SelectionStep>, bool)> {
    let control_y = outcomes.select(Axis(1), &meta.controls);
    let control_z = panel.instruments.select(Axis(0), &meta.controls);
    match search {
        FactorSearch::Fixed(p) => {
            let fit = fit_factor_model(p, control_y.view(), control_z.view(), &options.gmm)?;
            let step = SelectionStep { p, j_stat: fit.j_stat, df: fit.df, p_value: fit.p_value };
            Ok((fit, vec![step], true))
        }
        FactorSearch::Select { max_p, pvalue_threshold } => {
            let sel = select_factor_count(
                control_y.view(),
                control_z.view(),
                max_p,
                pvalue_threshold,
                &options.gmm,
            )?;
            Ok((sel.fit, sel.path, sel.accepted))
        }
    }
}

fn counterfactual_rows(
    panel: &PanelData, outcomes: &Array2<f64>, imputed: &Array2<f64>,
) -> Vec<CounterfactualRow> {
    let mut rows = Vec::with_capacity(outcomes.len());
    for (i, (&unit, &cohort)) in panel.units.iter().zip(&panel.cohorts).enumerate() {
        for (t, &time) in panel.periods.iter().enumerate() {
            rows.push(CounterfactualRow {
                unit,
                time,
                cohort,
                outcome: outcomes[[t, i]],
                imputed: imputed[[t, i]],
            });
        }
    }
    rows
}
