//! Shared fixtures for integration tests

use popsynth::{
    AttributeDictionary, AttributeId, Control, ControlKind, Coordinate, DataType, Distribution,
    FullMatrix, MatrixSource,
};

/// Route `log` output through the test harness
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Dictionary with a two-valued `row` and a two-valued `col` attribute
#[must_use]
pub fn two_by_two() -> (AttributeDictionary, AttributeId, AttributeId) {
    let mut dict = AttributeDictionary::new();
    let row = dict.add_unique("row", DataType::Nominal, &["r1", "r2"]).unwrap();
    let col = dict.add_unique("col", DataType::Nominal, &["c1", "c2"]).unwrap();
    (dict, row, col)
}

/// Matrix with every cell set to the same control
#[must_use]
pub fn uniform_matrix(
    dict: &AttributeDictionary,
    dimensions: &[AttributeId],
    kind: ControlKind,
    cell: f64,
) -> FullMatrix {
    let mut matrix = FullMatrix::new(dict, dimensions, kind, "seed").unwrap();
    for index in 0..matrix.len() {
        let coordinate = matrix.coordinate_at(index);
        matrix.set(coordinate.values(), Control::new(cell).unwrap()).unwrap();
    }
    matrix
}

/// One-dimensional source table from `(label, control)` pairs
#[must_use]
pub fn marginal_source(
    dict: &AttributeDictionary,
    label: &str,
    kind: ControlKind,
    attribute: AttributeId,
    cells: &[(&str, f64)],
) -> MatrixSource {
    let mut source = MatrixSource::new(label, kind, &[attribute]);
    for (value, control) in cells {
        source.push_labelled(dict, &[*value], *control).unwrap();
    }
    source
}

/// Control of the cell holding the given input labels
#[must_use]
pub fn cell(dict: &AttributeDictionary, matrix: &FullMatrix, labels: &[(AttributeId, &str)]) -> f64 {
    let values: Vec<_> = labels
        .iter()
        .map(|(attribute, label)| dict.value_of(*attribute, label).unwrap())
        .collect();
    matrix.get_val(&values).unwrap().value()
}

/// Distribution over one attribute's values with the given probabilities
#[must_use]
pub fn categorical(probabilities: &[f64]) -> (AttributeDictionary, Distribution) {
    let mut dict = AttributeDictionary::new();
    let inputs: Vec<String> = (0..probabilities.len()).map(|i| format!("k{i}")).collect();
    let labels: Vec<&str> = inputs.iter().map(String::as_str).collect();
    let attribute = dict.add_unique("category", DataType::Nominal, &labels).unwrap();
    let entries = dict
        .values(attribute)
        .unwrap()
        .iter()
        .zip(probabilities)
        .map(|(value, p)| (Coordinate::new(&dict, [*value]).unwrap(), *p))
        .collect();
    let distribution = Distribution::new(entries, 1e-9).unwrap();
    (dict, distribution)
}

/// Pearson's statistic of observed counts against expected probabilities
#[must_use]
pub fn chi_square(observed: &[usize], probabilities: &[f64]) -> f64 {
    let n: usize = observed.iter().sum();
    observed
        .iter()
        .zip(probabilities)
        .map(|(o, p)| {
            let expected = *p * n as f64;
            let diff = *o as f64 - expected;
            diff * diff / expected
        })
        .sum()
}
