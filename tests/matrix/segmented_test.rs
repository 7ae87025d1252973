use popsynth::{
    AttributeDictionary, AttributeId, ControlKind, DataType, Matrix, MatrixSource,
    NDimensionalMatrix, SynthesisError, build_matrix,
};

struct Fixture {
    dict: AttributeDictionary,
    row: AttributeId,
    col: AttributeId,
    size: AttributeId,
    matrix: Matrix,
}

fn fixture() -> Fixture {
    let mut dict = AttributeDictionary::new();
    let row = dict.add_unique("row", DataType::Nominal, &["r1", "r2"]).unwrap();
    let col = dict.add_unique("col", DataType::Nominal, &["c1", "c2"]).unwrap();
    let size = dict.add_unique("size", DataType::Order, &["s", "l"]).unwrap();

    let mut joint = MatrixSource::new("row by col", ControlKind::Contingency, &[row, col]);
    for (r, c, count) in [("r1", "c1", 10.0), ("r1", "c2", 30.0), ("r2", "c1", 20.0), ("r2", "c2", 40.0)] {
        joint.push_labelled(&dict, &[r, c], count).unwrap();
    }
    let mut sizes = MatrixSource::new("col by size", ControlKind::Contingency, &[col, size]);
    for (c, s, count) in [("c1", "s", 20.0), ("c1", "l", 10.0), ("c2", "s", 35.0), ("c2", "l", 35.0)] {
        sizes.push_labelled(&dict, &[c, s], count).unwrap();
    }

    let matrix = build_matrix(&dict, "survey", vec![joint, sizes]).unwrap();
    Fixture { dict, row, col, size, matrix }
}

fn value(dict: &AttributeDictionary, attribute: AttributeId, label: &str) -> popsynth::ValueId {
    dict.value_of(attribute, label).unwrap()
}

#[test]
fn test_dimensions_and_involvement() {
    let Fixture { dict, row, col, size, matrix } = fixture();
    assert!(matrix.is_segmented());
    assert_eq!(matrix.dimensions(), vec![row, col, size]);
    assert_eq!(matrix.matrices_involving(&dict, col).unwrap().len(), 2);
    assert_eq!(matrix.matrices_involving(&dict, row).unwrap().len(), 1);
}

#[test]
fn test_covered_lookup_uses_one_inner_matrix() {
    let Fixture { dict, row, col, size, matrix } = fixture();
    let r1c1 = matrix
        .get_val(&[value(&dict, row, "r1"), value(&dict, col, "c1")])
        .unwrap();
    assert!((r1c1.value() - 10.0).abs() < 1e-12);
    let c1s = matrix
        .get_val(&[value(&dict, col, "c1"), value(&dict, size, "s")])
        .unwrap();
    assert!((c1s.value() - 20.0).abs() < 1e-12);
}

#[test]
fn test_split_lookup_is_estimated() {
    let Fixture { dict, row, size, matrix, .. } = fixture();
    let estimate = matrix
        .get_val(&[value(&dict, row, "r1"), value(&dict, size, "s")])
        .unwrap();
    // 40 of 100 are r1, 55 of 100 are small
    assert!((estimate.value() - 22.0).abs() < 1e-9);
}

#[test]
fn test_collapse_keeps_inner_marginals() {
    let Fixture { dict, row, col, size, matrix } = fixture();
    let collapsed = matrix.into_full(&dict).unwrap();

    assert_eq!(collapsed.dimensions(), &[row, col, size]);
    assert_eq!(collapsed.kind(), ControlKind::Frequency);
    assert!((collapsed.total() - 1.0).abs() < 1e-12);
    let r1c1 = collapsed
        .get_val(&[value(&dict, row, "r1"), value(&dict, col, "c1")])
        .unwrap();
    assert!((r1c1.value() - 0.1).abs() < 1e-12);
    let c1s = collapsed
        .get_val(&[value(&dict, col, "c1"), value(&dict, size, "s")])
        .unwrap();
    assert!((c1s.value() - 0.2).abs() < 1e-12);
}

#[test]
fn test_mixed_control_kinds_rejected() {
    let mut dict = AttributeDictionary::new();
    let sex = dict.add_unique("sex", DataType::Nominal, &["F", "M"]).unwrap();
    let mut counts = MatrixSource::new("counts", ControlKind::Contingency, &[sex]);
    counts.push_labelled(&dict, &["F"], 3.0).unwrap();
    let mut shares = MatrixSource::new("shares", ControlKind::Frequency, &[sex]);
    shares.push_labelled(&dict, &["F"], 1.0).unwrap();

    assert!(matches!(
        build_matrix(&dict, "mixed", vec![counts, shares]),
        Err(SynthesisError::InvalidMatrix(_))
    ));
}

#[test]
fn test_normalize_each_inner_matrix() {
    let Fixture { mut matrix, .. } = fixture();
    matrix.normalize().unwrap();
    assert_eq!(matrix.kind(), ControlKind::Frequency);
    assert!(matrix
        .inner_matrices()
        .iter()
        .all(|inner| (inner.total() - 1.0).abs() < 1e-12));
}
