use popsynth::{
    ControlKind, IpfAlgorithm, IpfConfig, ZeroCellPolicy, build_matrix, fit, reconcile_margins,
};

use crate::utils::{cell, init_logging, marginal_source, two_by_two, uniform_matrix};

#[test]
fn test_two_by_two_converges_to_marginals() {
    init_logging();
    let (dict, row, col) = two_by_two();
    let control = build_matrix(
        &dict,
        "marginals",
        vec![
            marginal_source(&dict, "rows", ControlKind::Frequency, row, &[("r1", 0.6), ("r2", 0.4)]),
            marginal_source(&dict, "cols", ControlKind::Frequency, col, &[("c1", 0.7), ("c2", 0.3)]),
        ],
    )
    .unwrap();
    let seed = uniform_matrix(&dict, &[row, col], ControlKind::Frequency, 0.25);

    let margins = reconcile_margins(&dict, &control, &seed).unwrap();
    assert_eq!(margins.len(), 4);

    let (fitted, report) = fit(seed, &margins, 100, 1e-5).unwrap();
    assert!(report.converged, "{report}");
    assert!(report.error <= 1e-5);
    assert!(report.steps <= 2);

    assert!((cell(&dict, &fitted, &[(row, "r1")]) - 0.6).abs() < 1e-5);
    assert!((cell(&dict, &fitted, &[(row, "r2")]) - 0.4).abs() < 1e-5);
    assert!((cell(&dict, &fitted, &[(col, "c1")]) - 0.7).abs() < 1e-5);
    assert!((cell(&dict, &fitted, &[(col, "c2")]) - 0.3).abs() < 1e-5);
    assert!((cell(&dict, &fitted, &[(row, "r1"), (col, "c1")]) - 0.42).abs() < 1e-5);
    assert!(fitted.cells().iter().all(|c| c.value() >= 0.0));
}

#[test]
fn test_history_tracks_every_step() {
    let (dict, row, col) = two_by_two();
    let control = build_matrix(
        &dict,
        "marginals",
        vec![
            marginal_source(&dict, "rows", ControlKind::Contingency, row, &[("r1", 300.0), ("r2", 700.0)]),
            marginal_source(&dict, "cols", ControlKind::Contingency, col, &[("c1", 450.0), ("c2", 550.0)]),
        ],
    )
    .unwrap();
    let mut seed = uniform_matrix(&dict, &[row, col], ControlKind::Contingency, 1.0);
    let r1 = dict.value_of(row, "r1").unwrap();
    let c1 = dict.value_of(col, "c1").unwrap();
    seed.set(&[r1, c1], popsynth::Control::new(6.0).unwrap()).unwrap();

    let margins = reconcile_margins(&dict, &control, &seed).unwrap();
    let report = IpfAlgorithm::new(IpfConfig::default().with_delta(1e-8))
        .fit(&mut seed, &margins)
        .unwrap();

    assert!(report.converged);
    assert_eq!(report.history.len(), report.steps + 1);
    assert!(report.history[report.steps] < report.history[0]);
    assert!((cell(&dict, &seed, &[(row, "r1")]) - 2.7).abs() < 1e-6);
}

#[test]
fn test_unfitted_error_is_relative_to_control_mass() {
    let (dict, row, col) = two_by_two();
    let control = build_matrix(
        &dict,
        "marginals",
        vec![
            marginal_source(&dict, "rows", ControlKind::Contingency, row, &[("r1", 300.0), ("r2", 700.0)]),
            marginal_source(&dict, "cols", ControlKind::Contingency, col, &[("c1", 450.0), ("c2", 550.0)]),
        ],
    )
    .unwrap();
    let seed = uniform_matrix(&dict, &[row, col], ControlKind::Contingency, 1.0);

    let margins = reconcile_margins(&dict, &control, &seed).unwrap();
    let (_, report) = fit(seed, &margins, 0, 1e-5).unwrap();

    // Targets scaled to mass 4: rows 1.2/2.8, cols 1.8/2.2, deviations sum to 2
    assert_eq!(report.steps, 0);
    assert!((report.error - 0.5).abs() < 1e-12, "{report}");
    assert!(!report.converged);
}

#[test]
fn test_zero_cells_skip_without_nan() {
    init_logging();
    let (dict, row, col) = two_by_two();
    let control = build_matrix(
        &dict,
        "rows",
        vec![marginal_source(&dict, "rows", ControlKind::Frequency, row, &[("r1", 0.6), ("r2", 0.4)])],
    )
    .unwrap();
    let mut seed = uniform_matrix(&dict, &[row, col], ControlKind::Frequency, 0.0);
    let r2 = dict.value_of(row, "r2").unwrap();
    for value in dict.values(col).unwrap().to_vec() {
        seed.set(&[r2, value], popsynth::Control::new(0.5).unwrap()).unwrap();
    }

    let margins = reconcile_margins(&dict, &control, &seed).unwrap();
    let (fitted, report) = fit(seed, &margins, 5, 1e-5).unwrap();

    assert!(!report.converged);
    assert_eq!(report.steps, 5);
    assert_eq!(report.skipped_factors, 5);
    assert!(fitted.cells().iter().all(|c| c.value().is_finite() && c.value() >= 0.0));
    assert!((cell(&dict, &fitted, &[(row, "r2")]) - 0.4).abs() < 1e-12);
}

#[test]
fn test_floor_policy_revives_zero_cells() {
    let (dict, row, col) = two_by_two();
    let control = build_matrix(
        &dict,
        "rows",
        vec![marginal_source(&dict, "rows", ControlKind::Frequency, row, &[("r1", 0.6), ("r2", 0.4)])],
    )
    .unwrap();
    let mut seed = uniform_matrix(&dict, &[row, col], ControlKind::Frequency, 0.0);
    let r2 = dict.value_of(row, "r2").unwrap();
    for value in dict.values(col).unwrap().to_vec() {
        seed.set(&[r2, value], popsynth::Control::new(0.5).unwrap()).unwrap();
    }

    let margins = reconcile_margins(&dict, &control, &seed).unwrap();
    let config = IpfConfig::default().with_zero_policy(ZeroCellPolicy::Floor { ratio: 0.01 });
    let report = IpfAlgorithm::new(config).fit(&mut seed, &margins).unwrap();

    assert!(report.converged);
    assert_eq!(report.skipped_factors, 0);
    assert!((cell(&dict, &seed, &[(row, "r1")]) - 0.6).abs() < 1e-5);
}

#[test]
fn test_invalid_delta_rejected() {
    let (dict, row, col) = two_by_two();
    let control = build_matrix(
        &dict,
        "rows",
        vec![marginal_source(&dict, "rows", ControlKind::Frequency, row, &[("r1", 0.5), ("r2", 0.5)])],
    )
    .unwrap();
    let seed = uniform_matrix(&dict, &[row, col], ControlKind::Frequency, 0.25);
    let margins = reconcile_margins(&dict, &control, &seed).unwrap();

    assert!(matches!(
        fit(seed, &margins, 10, f64::NAN),
        Err(popsynth::SynthesisError::InvalidParameter(_))
    ));
}
