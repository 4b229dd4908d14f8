//! Integration tests for the QLD estimation pipeline.
//!
//! Purpose
//! -------
//! - Run `estimate_frame` end to end on seeded synthetic factor panels and
//!   on a small hand-checkable panel.
//! - Check the tagged result shapes for every effect and variance type.
//!
//! Coverage
//! --------
//! - `panel`: frame conversion, balance validation, within transform.
//! - `factor_model`: fixed and selected factor counts.
//! - `imputation` / `inference`: effect recovery, covariance, bootstrap.
//! - `estimator`: option validation and the counterfactual table.
//!
//! Exclusions
//! ----------
//! - Low-level algebra (projections, quantiles, aggregation weights); those
//!   are covered by unit tests.
use approx::assert_abs_diff_eq;
use ndarray::Array1;
use qld_did::{
    estimator::{
        BootstrapOptions, ConvergencePolicy, EffectType, Effects, FactorCount, GmmOptions,
        Inference, QldError, QldOptions, VarianceType, estimate_frame,
    },
    panel::{ColumnSpec, Cohort, PanelError, PanelFrame},
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;

const FACTOR: [f64; 6] = [0.2, 1.5, 1.6, 2.0, 1.2, 0.6];
const EARLY: i64 = 4;
const LATE: i64 = 5;

/// Synthetic one-factor panel over periods 1..=6.
///
/// `y_it = α_i + β_t + f_t λ_i + δ · 1[t ≥ g_i] + ε_it`, with two
/// instruments `(1, λ_i + u_i)`. Units `0..n_never` are never treated; the
/// rest are split evenly between adoption at 4 and at 5.
struct Design {
    n_never: usize,
    n_treated: usize,
    delta: f64,
    noise: f64,
    two_way_effects: bool,
}

impl Design {
    fn standard() -> Self {
        Design { n_never: 300, n_treated: 300, delta: 2.0, noise: 0.1, two_way_effects: false }
    }

    fn frame(&self, seed: u64) -> PanelFrame {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        let beta: Vec<f64> = (0..6).map(|t| if self.two_way_effects { 3.0 * t as f64 } else { 0.0 }).collect();
        let (mut y, mut id, mut time, mut group, mut z1, mut z2) =
            (vec![], vec![], vec![], vec![], vec![], vec![]);

        for i in 0..self.n_never + self.n_treated {
            let adoption = if i < self.n_never {
                None
            } else if (i - self.n_never) % 2 == 0 {
                Some(EARLY)
            } else {
                Some(LATE)
            };
            let lambda = 1.0 + rng.gen_range(-0.5..0.5);
            let alpha = if self.two_way_effects { rng.gen_range(-5.0..5.0) } else { 0.0 };
            let instrument = lambda + 0.1 * rng.gen_range(-1.0..1.0);
            for (t, (&f, &b)) in FACTOR.iter().zip(&beta).enumerate() {
                let period = t as i64 + 1;
                let treated = adoption.is_some_and(|g| period >= g);
                let effect = if treated { self.delta } else { 0.0 };
                y.push(alpha + b + f * lambda + effect + self.noise * rng.gen_range(-1.0..1.0));
                id.push(i as f64);
                time.push(period as f64);
                group.push(adoption.map_or(f64::INFINITY, |g| g as f64));
                z1.push(1.0);
                z2.push(instrument);
            }
        }
        PanelFrame::new()
            .with_column("y", y)
            .with_column("id", id)
            .with_column("t", time)
            .with_column("g", group)
            .with_column("z1", z1)
            .with_column("z2", z2)
    }
}

/// Route the crate's `log` output through the test harness.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn columns() -> ColumnSpec {
    ColumnSpec::new("y", "id", "t", "g", &["z1", "z2"])
}

#[test]
// Purpose
// -------
// A panel missing one unit-period is rejected before estimation.
//
// Given
// -----
// - The small six-unit panel with its last row removed.
//
// Expect
// ------
// - `QldError::Panel(PanelError::Unbalanced { unit: 6, .. })`.
fn unbalanced_panel_is_rejected() {
    init_logging();

    // Arrange
    let mut frame = PanelFrame::new();
    for (name, mut values) in small_panel_columns() {
        values.pop();
        frame.insert(name, values);
    }

    // Act
    let err = estimate_frame(&frame, &columns(), &QldOptions::new(FactorCount::Fixed(1)))
        .expect_err("unbalanced");

    // Assert
    assert!(matches!(err, QldError::Panel(PanelError::Unbalanced { unit: 6, .. })), "{err}");
}

#[test]
// Purpose
// -------
// A fixed factor count is echoed and a constant effect is recovered.
//
// Given
// -----
// - 300 controls, 300 treated units, δ = 2, p = 1, overall effect.
//
// Expect
// ------
// - `factor_count == 1`; estimate within 0.1 of 2; a 1 × 1 covariance with
//   a standard error below 0.1.
fn fixed_factor_count_recovers_overall_effect() {
    init_logging();

    // Arrange
    let frame = Design::standard().frame(1);
    let opts = QldOptions::new(FactorCount::Fixed(1)).with_effect(EffectType::Overall);

    // Act
    let est = estimate_frame(&frame, &columns(), &opts).expect("estimate");

    // Assert
    assert_eq!(est.factor_count, 1);
    assert_eq!(est.variance, VarianceType::Pointwise);
    let Effects::Overall { estimate } = est.effects else { panic!("expected overall effect") };
    assert_abs_diff_eq!(estimate, 2.0, epsilon = 0.1);
    let Inference::Covariance(cov) = &est.inference else { panic!("expected covariance") };
    assert_eq!(cov.dim(), (1, 1));
    assert!(cov[[0, 0]] > 0.0 && cov[[0, 0]].sqrt() < 0.1);
    assert_eq!(est.diagnostics.selection.len(), 1);
    assert!(est.diagnostics.selection_accepted);
    assert_eq!(est.diagnostics.theta.len(), 5);
}

#[test]
// Purpose
// -------
// Factor selection stays within `[0, T0 − 1]` and rejects p = 0 on a
// one-factor panel.
//
// Given
// -----
// - The standard design with selection at 0.05 (T0 = 3).
//
// Expect
// ------
// - `1 ≤ factor_count ≤ 2`; the selection path starts at 0 and ends at the
//   selected count, which the search accepted.
fn selected_factor_count_is_in_range() {
    init_logging();

    // Arrange
    let frame = Design::standard().frame(2);
    let opts = QldOptions::new(FactorCount::select(0.05).expect("threshold"));

    // Act
    let est = estimate_frame(&frame, &columns(), &opts).expect("estimate");

    // Assert
    assert!((1..=2).contains(&est.factor_count), "selected {}", est.factor_count);
    let path = &est.diagnostics.selection;
    assert_eq!(path[0].p, 0);
    assert!(path[0].p_value <= 0.05);
    assert_eq!(path[path.len() - 1].p, est.factor_count);
    assert!(est.diagnostics.selection_accepted);
}

#[test]
// Purpose
// -------
// An exhausted factor-count search is reported as not accepted.
//
// Given
// -----
// - The standard design with the early cohort moved to adoption at 2, so
//   T0 = 1 and the search can only try p = 0.
// - Selection at 0.05; p = 0 is rejected on a one-factor panel.
//
// Expect
// ------
// - `factor_count == 0`; a single-step path with p-value at most 0.05.
// - `selection_accepted == false`.
fn exhausted_selection_is_flagged() {
    init_logging();

    // Arrange
    let mut frame = Design::standard().frame(3);
    let moved: Vec<f64> = frame
        .column("g")
        .expect("group column")
        .iter()
        .map(|&g| if g == EARLY as f64 { 2.0 } else { g })
        .collect();
    frame.insert("g", moved);
    let opts = QldOptions::new(FactorCount::select(0.05).expect("threshold"));

    // Act
    let est = estimate_frame(&frame, &columns(), &opts).expect("estimate");

    // Assert
    assert_eq!(est.factor_count, 0);
    let path = &est.diagnostics.selection;
    assert_eq!(path.len(), 1);
    assert_eq!(path[0].p, 0);
    assert!(path[0].p_value <= 0.05);
    assert!(!est.diagnostics.selection_accepted);
}

#[test]
// Purpose
// -------
// Event-study estimates carry sorted relative-time labels and are near
// zero before adoption and near δ after.
//
// Given
// -----
// - The standard design; cohorts at 4 and 5 over periods 1..=6.
//
// Expect
// ------
// - Labels −4..=2; estimates within 0.15 of 0 (e < 0) or 2 (e ≥ 0);
//   a 7 × 7 covariance.
fn event_study_labels_and_estimates() {
    init_logging();

    // Arrange
    let frame = Design::standard().frame(3);
    let opts = QldOptions::new(FactorCount::Fixed(1)).with_effect(EffectType::EventStudy);

    // Act
    let est = estimate_frame(&frame, &columns(), &opts).expect("estimate");

    // Assert
    let Effects::EventStudy { estimates, relative_times } = &est.effects else {
        panic!("expected event study")
    };
    assert_eq!(relative_times, &vec![-4, -3, -2, -1, 0, 1, 2]);
    for (&e, &value) in relative_times.iter().zip(estimates.iter()) {
        let target = if e >= 0 { 2.0 } else { 0.0 };
        assert_abs_diff_eq!(value, target, epsilon = 0.15);
    }
    let Inference::Covariance(cov) = &est.inference else { panic!("expected covariance") };
    assert_eq!(cov.dim(), (7, 7));
}

#[test]
// Purpose
// -------
// Uniform inference returns bootstrap standard errors and a critical value,
// reproducibly for a fixed seed.
//
// Given
// -----
// - The standard design, event study, 500 draws at 0.95 with seed 9, run
//   twice.
//
// Expect
// ------
// - Seven positive standard errors, a critical value above 1.5, and
//   identical results across runs.
fn uniform_inference_is_seeded() {
    init_logging();

    // Arrange
    let frame = Design::standard().frame(4);
    let opts = QldOptions::new(FactorCount::Fixed(1))
        .with_variance(VarianceType::Uniform)
        .with_bootstrap(BootstrapOptions::new(500, 0.95, 9).expect("bootstrap"));

    // Act
    let first = estimate_frame(&frame, &columns(), &opts).expect("estimate");
    let second = estimate_frame(&frame, &columns(), &opts).expect("estimate");

    // Assert
    let Inference::Uniform { std_errors, critical_value } = &first.inference else {
        panic!("expected uniform inference")
    };
    assert_eq!(std_errors.len(), 7);
    assert!(std_errors.iter().all(|&s| s > 0.0));
    assert!(critical_value.is_finite() && *critical_value > 1.5);
    assert_eq!(first, second);
}

#[test]
// Purpose
// -------
// Naive and pointwise variances differ only through loading uncertainty.
//
// Given
// -----
// - The standard design, group-time effects, both variance types.
//
// Expect
// ------
// - Same estimates and labels; covariance matrices of the same shape that
//   are not identical.
fn naive_variance_drops_loading_term() {
    init_logging();

    // Arrange
    let frame = Design::standard().frame(5);
    let base = QldOptions::new(FactorCount::Fixed(1)).with_effect(EffectType::GroupTime);

    // Act
    let pointwise = estimate_frame(&frame, &columns(), &base).expect("pointwise");
    let naive = estimate_frame(&frame, &columns(), &base.clone().with_variance(VarianceType::Naive))
        .expect("naive");

    // Assert
    assert_eq!(pointwise.effects, naive.effects);
    let Effects::GroupTime { cells, counts, .. } = &naive.effects else {
        panic!("expected group-time effects")
    };
    assert_eq!(cells.len(), 12);
    assert_eq!(cells[0], (EARLY, 1));
    assert_eq!(counts[0], 150);
    let (Inference::Covariance(a), Inference::Covariance(b)) = (&pointwise.inference, &naive.inference)
    else {
        panic!("expected covariances")
    };
    assert_eq!(a.dim(), b.dim());
    assert_ne!(a, b);
}

#[test]
// Purpose
// -------
// The within transform removes additive unit and period effects.
//
// Given
// -----
// - The standard design plus unit effects in [−5, 5] and a linear trend.
//
// Expect
// ------
// - The overall effect is within 0.15 of δ = 2.
fn within_transform_absorbs_two_way_effects() {
    init_logging();

    // Arrange
    let design = Design { two_way_effects: true, ..Design::standard() };
    let frame = design.frame(6);
    let opts = QldOptions::new(FactorCount::Fixed(1))
        .with_within_transform(true)
        .with_effect(EffectType::Overall);

    // Act
    let est = estimate_frame(&frame, &columns(), &opts).expect("estimate");

    // Assert
    let Effects::Overall { estimate } = est.effects else { panic!("expected overall effect") };
    assert_abs_diff_eq!(estimate, 2.0, epsilon = 0.15);
}

#[test]
// Purpose
// -------
// The counterfactual table lists every unit-period with its imputation.
//
// Given
// -----
// - A smaller standard design (100 + 100 units), counterfactual requested.
//
// Expect
// ------
// - 1 200 rows ordered by unit then time; post-adoption gaps average ≈ δ;
//   never-treated rows carry `Cohort::NeverTreated`.
fn counterfactual_table_covers_all_units() {
    init_logging();

    // Arrange
    let design = Design { n_never: 100, n_treated: 100, ..Design::standard() };
    let frame = design.frame(7);
    let opts = QldOptions::new(FactorCount::Fixed(1)).with_counterfactual(true);

    // Act
    let est = estimate_frame(&frame, &columns(), &opts).expect("estimate");

    // Assert
    let rows = est.counterfactual.as_ref().expect("counterfactual rows");
    assert_eq!(rows.len(), 200 * 6);
    assert_eq!((rows[0].unit, rows[0].time, rows[0].cohort), (0, 1, Cohort::NeverTreated));
    assert_eq!(rows[7].time, 2);
    let post: Vec<f64> = rows
        .iter()
        .filter(|r| r.cohort.adoption().is_some_and(|g| r.time >= g))
        .map(|r| r.outcome - r.imputed)
        .collect();
    let mean_gap = post.iter().sum::<f64>() / post.len() as f64;
    assert_abs_diff_eq!(mean_gap, 2.0, epsilon = 0.15);
}

#[test]
// Purpose
// -------
// Factor counts outside the admissible range fail before estimation.
//
// Given
// -----
// - T0 = 3 and two instruments; p = 3.
//
// Expect
// ------
// - `QldError::InvalidFactorCount { value: 3, max: 2, .. }`.
fn out_of_range_factor_count_fails_fast() {
    init_logging();

    // Arrange
    let frame = Design::standard().frame(8);

    // Act
    let err = estimate_frame(&frame, &columns(), &QldOptions::new(FactorCount::Fixed(3)))
        .expect_err("invalid count");

    // Assert
    assert!(matches!(err, QldError::InvalidFactorCount { value: 3, max: 2, .. }), "{err}");
}

// ---- Hand-checkable scenario --------------------------------------------------

/// Four periods, six units: 1–2 never treated, 3–4 adopt at 3, 5–6 adopt at 4.
fn small_panel_columns() -> Vec<(&'static str, Vec<f64>)> {
    let paths: [(f64, [f64; 4], f64); 6] = [
        (f64::INFINITY, [1.0, 2.1, 2.9, 4.2], 0.5),
        (f64::INFINITY, [2.0, 3.8, 6.1, 8.3], 1.7),
        (3.0, [1.5, 2.9, 6.0, 7.5], 0.9),
        (3.0, [0.8, 1.9, 4.1, 5.0], 0.3),
        (4.0, [1.2, 2.5, 3.4, 7.9], 1.1),
        (4.0, [2.2, 4.1, 6.3, 10.5], 2.0),
    ];
    let mut cols: Vec<(&'static str, Vec<f64>)> =
        ["y", "id", "t", "g", "z1", "z2"].into_iter().map(|n| (n, Vec::new())).collect();
    for (i, (group, y, z)) in paths.iter().enumerate() {
        for (t, &value) in y.iter().enumerate() {
            let row = [value, (i + 1) as f64, (t + 1) as f64, *group, 1.0, *z];
            for (col, v) in cols.iter_mut().zip(row) {
                col.1.push(v);
            }
        }
    }
    cols
}

/// Gap `y − F̂ λ̂` in period `t` for one unit, with λ̂ fitted on `0..shift`.
fn one_factor_gap(fhat: &[f64; 4], y: &[f64], shift: usize, t: usize) -> f64 {
    let num: f64 = (0..shift).map(|s| fhat[s] * y[s]).sum();
    let den: f64 = (0..shift).map(|s| fhat[s] * fhat[s]).sum();
    y[t] - fhat[t] * num / den
}

#[test]
// Purpose
// -------
// The overall estimate on the small panel matches a hand computation from
// the fitted loadings.
//
// Given
// -----
// - Four periods, six units, cohorts 3 and 4, two instruments, p = 1,
//   overall effect.
//
// Expect
// ------
// - A scalar estimate equal to the count-weighted mean of post-treatment
//   cell gaps computed by hand from `diagnostics.theta`, and a finite,
//   non-negative 1 × 1 covariance.
fn small_panel_overall_effect_matches_hand_computation() {
    init_logging();

    // Arrange
    let mut frame = PanelFrame::new();
    for (name, values) in small_panel_columns() {
        frame.insert(name, values);
    }
    let gmm = GmmOptions { convergence: ConvergencePolicy::Warn, ..GmmOptions::default() };
    let opts = QldOptions::new(FactorCount::Fixed(1)).with_effect(EffectType::Overall).with_gmm(gmm);

    // Act
    let est = estimate_frame(&frame, &columns(), &opts).expect("estimate");

    // Assert
    let theta = &est.diagnostics.theta;
    assert_eq!(theta.len(), 3);
    let fhat = [theta[0], theta[1], theta[2], -1.0];
    let y3 = [[1.5, 2.9, 6.0, 7.5], [0.8, 1.9, 4.1, 5.0]];
    let y4 = [[1.2, 2.5, 3.4, 7.9], [2.2, 4.1, 6.3, 10.5]];
    let tau = |ys: &[[f64; 4]; 2], shift: usize, t: usize| {
        ys.iter().map(|y| one_factor_gap(&fhat, y, shift, t)).sum::<f64>() / 2.0
    };
    let expected = (tau(&y3, 2, 2) + tau(&y3, 2, 3) + tau(&y4, 3, 3)) / 3.0;

    let Effects::Overall { estimate } = est.effects else { panic!("expected overall effect") };
    assert_abs_diff_eq!(estimate, expected, epsilon = 1e-9);
    let Inference::Covariance(cov) = &est.inference else { panic!("expected covariance") };
    assert_eq!(cov.dim(), (1, 1));
    assert!(cov[[0, 0]].is_finite() && cov[[0, 0]] >= 0.0);
    assert_eq!(est.std_errors(), Array1::from_elem(1, cov[[0, 0]].sqrt()));
}
