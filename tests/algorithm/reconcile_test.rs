use std::collections::BTreeSet;

use popsynth::{
    AttributeDictionary, AttributeId, ControlKind, DataType, MatrixSource, SynthesisError,
    algorithm::MatchKind, build_matrix, fit, reconcile_margins,
};

use crate::utils::{init_logging, marginal_source, uniform_matrix};

struct Fixture {
    dict: AttributeDictionary,
    age: AttributeId,
    band: AttributeId,
    sex: AttributeId,
}

fn fixture() -> Fixture {
    let mut dict = AttributeDictionary::new();
    let age = dict
        .add_range("age", &["0-9", "10-19", "20-29", "30+"])
        .unwrap();
    let band = dict
        .add_mapped(
            "band",
            DataType::Nominal,
            age,
            &["young", "adult"],
            &[
                (&["young"][..], &["0-9", "10-19"][..]),
                (&["adult"][..], &["20-29", "30+"][..]),
            ],
        )
        .unwrap();
    let sex = dict.add_unique("sex", DataType::Nominal, &["F", "M"]).unwrap();
    Fixture { dict, age, band, sex }
}

#[test]
fn test_coarse_control_translates_to_fine_seed() {
    init_logging();
    let Fixture { dict, age, band, sex } = fixture();

    let mut source = MatrixSource::new("census", ControlKind::Contingency, &[band, sex]);
    for (band_label, sex_label, count) in [
        ("young", "F", 20.0),
        ("young", "M", 30.0),
        ("adult", "F", 25.0),
        ("adult", "M", 25.0),
    ] {
        source.push_labelled(&dict, &[band_label, sex_label], count).unwrap();
    }
    let control = build_matrix(&dict, "census", vec![source]).unwrap();
    let seed = uniform_matrix(&dict, &[age, sex], ControlKind::Contingency, 1.0);

    let margins = reconcile_margins(&dict, &control, &seed).unwrap();
    assert_eq!(margins.margins_for(age).len(), 4);
    assert_eq!(margins.margins_for(sex).len(), 4);
    assert!(margins.unmatched().is_empty());
    assert!(
        margins
            .matches()
            .iter()
            .any(|m| m.control == band && m.seed == age && m.kind == MatchKind::ByReferent)
    );

    let young: BTreeSet<_> = ["0-9", "10-19"]
        .iter()
        .map(|label| dict.value_of(age, label).unwrap())
        .collect();
    let female = dict.value_of(sex, "F").unwrap();
    let young_female = margins
        .margins_for(age)
        .iter()
        .find(|m| m.values == young && m.descriptor.allowed(sex) == Some(&BTreeSet::from([female])))
        .unwrap();
    // 20 out of 100 scaled to a seed mass of 8
    assert!((young_female.target - 1.6).abs() < 1e-12);

    let (fitted, report) = fit(seed, &margins, 100, 1e-9).unwrap();
    assert!(report.converged);
    let young_values: Vec<_> = young.iter().copied().collect();
    let fitted_young_female: f64 = young_values
        .iter()
        .map(|value| fitted.get_val(&[*value, female]).unwrap().value())
        .sum();
    assert!((fitted_young_female - 1.6).abs() < 1e-6);
}

#[test]
fn test_fine_control_aggregates_onto_coarse_seed() {
    let Fixture { dict, age, band, .. } = fixture();
    let control = build_matrix(
        &dict,
        "ages",
        vec![marginal_source(
            &dict,
            "ages",
            ControlKind::Contingency,
            age,
            &[("0-9", 10.0), ("10-19", 20.0), ("20-29", 30.0), ("30+", 40.0)],
        )],
    )
    .unwrap();
    let seed = uniform_matrix(&dict, &[band], ControlKind::Frequency, 0.5);

    let margins = reconcile_margins(&dict, &control, &seed).unwrap();
    let on_band = margins.margins_for(band);
    assert_eq!(on_band.len(), 2);
    let young = dict.value_of(band, "young").unwrap();
    let young_margin = on_band.iter().find(|m| m.values.contains(&young)).unwrap();
    assert!((young_margin.target - 0.3).abs() < 1e-12);
}

#[test]
fn test_unmatched_control_attribute_is_reported() {
    let Fixture { mut dict, age, sex, .. } = fixture();
    let region = dict.add_unique("region", DataType::Nominal, &["north", "south"]).unwrap();

    let mut source = MatrixSource::new("regional", ControlKind::Contingency, &[sex, region]);
    for (sex_label, region_label) in [("F", "north"), ("F", "south"), ("M", "north"), ("M", "south")] {
        source.push_labelled(&dict, &[sex_label, region_label], 5.0).unwrap();
    }
    let control = build_matrix(&dict, "regional", vec![source]).unwrap();
    let seed = uniform_matrix(&dict, &[age, sex], ControlKind::Contingency, 1.0);

    let margins = reconcile_margins(&dict, &control, &seed).unwrap();
    assert_eq!(margins.unmatched(), &[region]);
    assert_eq!(margins.margins_for(sex).len(), 2);
    assert!(margins.margins_for(age).is_empty());
}

#[test]
fn test_no_shared_attribute_is_an_error() {
    let Fixture { mut dict, sex, .. } = fixture();
    let region = dict.add_unique("region", DataType::Nominal, &["north", "south"]).unwrap();
    let control = build_matrix(
        &dict,
        "regions",
        vec![marginal_source(
            &dict,
            "regions",
            ControlKind::Contingency,
            region,
            &[("north", 1.0), ("south", 1.0)],
        )],
    )
    .unwrap();
    let seed = uniform_matrix(&dict, &[sex], ControlKind::Contingency, 1.0);

    let err = reconcile_margins(&dict, &control, &seed).unwrap_err();
    match err {
        SynthesisError::NoMatchingAttributes { seed_dimensions } => {
            assert_eq!(seed_dimensions, "sex");
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_repeated_sources_fit_once() {
    let Fixture { dict, sex, .. } = fixture();
    let control = build_matrix(
        &dict,
        "twice",
        vec![
            marginal_source(&dict, "first", ControlKind::Contingency, sex, &[("F", 3.0), ("M", 1.0)]),
            marginal_source(&dict, "second", ControlKind::Contingency, sex, &[("F", 3.0), ("M", 1.0)]),
        ],
    )
    .unwrap();
    let seed = uniform_matrix(&dict, &[sex], ControlKind::Contingency, 1.0);

    let margins = reconcile_margins(&dict, &control, &seed).unwrap();
    assert_eq!(margins.len(), 4);
    assert_eq!(margins.distinct().len(), 2);
}

#[test]
fn test_massless_seed_rejected() {
    let Fixture { dict, sex, .. } = fixture();
    let control = build_matrix(
        &dict,
        "sex",
        vec![marginal_source(&dict, "sex", ControlKind::Contingency, sex, &[("F", 1.0), ("M", 1.0)])],
    )
    .unwrap();
    let seed = uniform_matrix(&dict, &[sex], ControlKind::Contingency, 0.0);

    assert!(matches!(
        reconcile_margins(&dict, &control, &seed),
        Err(SynthesisError::InvalidDistribution(_))
    ));
}
