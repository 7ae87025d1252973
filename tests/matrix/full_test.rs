use popsynth::{Control, ControlKind, Coordinate, DataType, FullMatrix, NDimensionalMatrix, SynthesisError};

use crate::utils::two_by_two;

#[test]
fn test_partial_coordinates_contained_in_full_ones() {
    let (dict, row, col) = two_by_two();
    let matrix = FullMatrix::new(&dict, &[row, col], ControlKind::Contingency, "grid").unwrap();
    let r1 = dict.value_of(row, "r1").unwrap();
    let partial = Coordinate::new(&dict, [r1]).unwrap();

    let covering = matrix.get_coordinates(&[r1]).unwrap();
    assert_eq!(covering.len(), 2);
    assert!(covering.iter().all(|full| full.contains(&partial)));
    assert!(!partial.contains(&covering[0]));
}

#[test]
fn test_aggregation_sums_containing_cells() {
    let (dict, row, col) = two_by_two();
    let mut matrix = FullMatrix::new(&dict, &[row, col], ControlKind::Contingency, "grid").unwrap();
    for (index, count) in [1_u64, 2, 3, 4].into_iter().enumerate() {
        let coordinate = matrix.coordinate_at(index);
        matrix.set(coordinate.values(), Control::count(count)).unwrap();
    }

    for value in dict.values(row).unwrap().to_vec() {
        let direct = matrix.get_val(&[value]).unwrap().value();
        let summed: f64 = matrix
            .get_coordinates(&[value])
            .unwrap()
            .iter()
            .map(|c| matrix.get_val(c.values()).unwrap().value())
            .sum();
        assert!((direct - summed).abs() < 1e-12);
    }
    assert!((matrix.get_val(&[]).unwrap().value() - 10.0).abs() < 1e-12);
}

#[test]
fn test_normalize_conserves_proportions() {
    let (dict, row, col) = two_by_two();
    let mut matrix = FullMatrix::new(&dict, &[row, col], ControlKind::Contingency, "grid").unwrap();
    for (index, count) in [5_u64, 15, 30, 50].into_iter().enumerate() {
        let coordinate = matrix.coordinate_at(index);
        matrix.set(coordinate.values(), Control::count(count)).unwrap();
    }
    let before: Vec<f64> = matrix.cells().iter().map(|c| c.value() / 100.0).collect();

    NDimensionalMatrix::normalize(&mut matrix).unwrap();

    assert_eq!(matrix.kind(), ControlKind::Frequency);
    assert!((matrix.total() - 1.0).abs() < 1e-12);
    for (cell, expected) in matrix.cells().iter().zip(before) {
        assert!((cell.value() - expected).abs() < 1e-12);
    }
}

#[test]
fn test_from_sample_counts_coordinates() {
    let (dict, row, col) = two_by_two();
    let r1 = dict.value_of(row, "r1").unwrap();
    let r2 = dict.value_of(row, "r2").unwrap();
    let c1 = dict.value_of(col, "c1").unwrap();
    let sample = vec![
        Coordinate::new(&dict, [r1, c1]).unwrap(),
        Coordinate::new(&dict, [r1, c1]).unwrap(),
        Coordinate::new(&dict, [r2, c1]).unwrap(),
    ];

    let matrix = FullMatrix::from_sample(&dict, &[row, col], &sample, "sample").unwrap();
    assert!((matrix.get_val(&[r1, c1]).unwrap().value() - 2.0).abs() < f64::EPSILON);
    assert!((matrix.get_val(&[c1]).unwrap().value() - 3.0).abs() < f64::EPSILON);
    assert!(matrix.get_val(&[r2]).unwrap().value() > 0.0);
}

#[test]
fn test_out_of_space_lookup_is_distinct_from_zero() {
    let (mut dict, row, col) = two_by_two();
    let other = dict.add_unique("other", DataType::Nominal, &["x"]).unwrap();
    let x = dict.value_of(other, "x").unwrap();
    let matrix = FullMatrix::new(&dict, &[row, col], ControlKind::Contingency, "grid").unwrap();

    let r1 = dict.value_of(row, "r1").unwrap();
    assert!(matrix.get_val(&[r1]).unwrap().is_zero());
    assert!(matches!(matrix.get_val(&[x]), Err(SynthesisError::NoSuchCoordinate(_))));
}

#[test]
fn test_frequency_matrix_must_sum_to_one() {
    let (dict, row, _) = two_by_two();
    let mut matrix = FullMatrix::new(&dict, &[row], ControlKind::Frequency, "freq").unwrap();
    let r1 = dict.value_of(row, "r1").unwrap();
    matrix.set(&[r1], Control::new(0.7).unwrap()).unwrap();
    assert!(matches!(matrix.validate(), Err(SynthesisError::InvalidDistribution(_))));
}
