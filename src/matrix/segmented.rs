//! Segmented matrix
//!
//! When no single source covers all attributes jointly, the distribution is
//! carried as several full matrices over overlapping dimension subsets.
//! Lookups first locate an inner matrix covering the query; a query that
//! splits across matrices is estimated by chaining the pieces under
//! conditional independence.

use log::debug;

use super::control::{Control, ControlKind};
use super::coordinate::Coordinate;
use super::full::FullMatrix;
use crate::error::{Result, SynthesisError};
use crate::model::{AttributeDictionary, AttributeId, ValueId};

/// Distribution made of several full matrices with overlapping dimensions
#[derive(Debug, Clone)]
pub struct SegmentedMatrix {
    label: String,
    kind: ControlKind,
    matrices: Vec<FullMatrix>,
}

impl SegmentedMatrix {
    /// Combine inner matrices of the same control kind
    pub fn new(label: &str, matrices: Vec<FullMatrix>) -> Result<Self> {
        let Some(first) = matrices.first() else {
            return Err(SynthesisError::InvalidMatrix(format!(
                "segmented matrix '{label}' has no inner matrices"
            )));
        };
        let kind = first.kind();
        if let Some(odd) = matrices.iter().find(|m| m.kind() != kind) {
            return Err(SynthesisError::InvalidMatrix(format!(
                "segmented matrix '{label}' mixes control kinds ('{}' is {:?}, expected {kind:?})",
                odd.label(),
                odd.kind()
            )));
        }
        Ok(Self {
            label: label.to_string(),
            kind,
            matrices,
        })
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn kind(&self) -> ControlKind {
        self.kind
    }

    #[must_use]
    pub fn matrices(&self) -> &[FullMatrix] {
        &self.matrices
    }

    /// Union of the inner matrices' dimensions, sorted by id
    #[must_use]
    pub fn dimensions(&self) -> Vec<AttributeId> {
        let mut dims: Vec<AttributeId> = self
            .matrices
            .iter()
            .flat_map(|m| m.dimensions().iter().copied())
            .collect();
        dims.sort_unstable();
        dims.dedup();
        dims
    }

    /// Inner matrices whose dimensions contain `attribute` or its referent
    pub fn matrices_involving(
        &self,
        dict: &AttributeDictionary,
        attribute: AttributeId,
    ) -> Result<Vec<&FullMatrix>> {
        let referent = dict.attribute(attribute)?.referent();
        Ok(self
            .matrices
            .iter()
            .filter(|m| m.spans(attribute) || m.spans(referent))
            .collect())
    }

    /// Control of a value set
    ///
    /// If one inner matrix covers every value, its aggregated control is
    /// returned. Otherwise the values are split greedily across matrices and
    /// the pieces are chained: the first piece's control times, for each
    /// further piece, that piece's share of its own matrix.
    pub fn get_val(&self, values: &[ValueId]) -> Result<Control> {
        if let Some(matrix) = self.covering(values) {
            return matrix.get_val(values);
        }

        let mut remaining: Vec<ValueId> = values.to_vec();
        let mut estimate: Option<f64> = None;
        while !remaining.is_empty() {
            let (matrix, covered) = self
                .matrices
                .iter()
                .map(|m| {
                    let covered: Vec<ValueId> = remaining
                        .iter()
                        .copied()
                        .filter(|v| m.holds(*v))
                        .collect();
                    (m, covered)
                })
                .max_by_key(|(_, covered)| covered.len())
                .ok_or_else(|| self.miss(values))?;
            if covered.is_empty() {
                return Err(self.miss(values));
            }

            let piece = matrix.get_val(&covered)?.value();
            estimate = Some(match estimate {
                None => piece,
                Some(current) => {
                    let total = matrix.total();
                    if total > 0.0 { current * piece / total } else { 0.0 }
                }
            });
            remaining.retain(|v| !covered.contains(v));
        }
        Control::new(estimate.unwrap_or(0.0))
    }

    /// Full coordinates of every inner matrix covering the value set
    pub fn get_coordinates(&self, values: &[ValueId]) -> Result<Vec<Coordinate>> {
        let mut coordinates = Vec::new();
        let mut found = false;
        for matrix in &self.matrices {
            if let Ok(mut matched) = matrix.get_coordinates(values) {
                found = true;
                coordinates.append(&mut matched);
            }
        }
        if found { Ok(coordinates) } else { Err(self.miss(values)) }
    }

    /// Normalize every inner matrix to sum to one
    pub fn normalize(&mut self) -> Result<()> {
        for matrix in &mut self.matrices {
            matrix.normalize()?;
        }
        self.kind = ControlKind::Frequency;
        Ok(())
    }

    /// Merge the inner matrices into one best-effort full frequency matrix
    ///
    /// Matrices are folded in order of decreasing dimensionality. Each new
    /// matrix contributes its dimensions not yet covered, conditioned on the
    /// dimensions it shares with the running joint:
    /// `joint'(x, n) = joint(x) * M(n, s) / M(s)` with `s` the shared part of `x`.
    pub fn collapse(&self, dict: &AttributeDictionary) -> Result<FullMatrix> {
        let mut order: Vec<&FullMatrix> = self.matrices.iter().collect();
        order.sort_by_key(|m| std::cmp::Reverse(m.dimensions().len()));

        let mut joint = order[0].clone();
        joint.normalize()?;

        for matrix in order.iter().skip(1) {
            let shared: Vec<AttributeId> = matrix
                .dimensions()
                .iter()
                .copied()
                .filter(|d| joint.spans(*d))
                .collect();
            if shared.len() == matrix.dimensions().len() {
                debug!(
                    "Matrix '{}' adds no dimension to '{}', skipping",
                    matrix.label(),
                    self.label
                );
                continue;
            }

            let shared_marginal = if shared.is_empty() {
                None
            } else {
                Some(matrix.marginalize(&shared)?)
            };
            let matrix_total = matrix.total();

            let mut dims = joint.dimensions().to_vec();
            dims.extend(matrix.dimensions().iter().copied().filter(|d| !joint.spans(*d)));
            let mut merged = FullMatrix::new(dict, &dims, ControlKind::Frequency, &self.label)?;

            for index in 0..merged.len() {
                let coordinate = merged.coordinate_at(index);
                let values = coordinate.values();
                let (Some(joint_index), Some(matrix_index)) =
                    (joint.project_index(values), matrix.project_index(values))
                else {
                    continue;
                };
                let base = joint.cells()[joint_index].value();
                let numerator = matrix.cells()[matrix_index].value();
                let denominator = match &shared_marginal {
                    Some(marginal) => marginal
                        .project_index(values)
                        .map_or(0.0, |i| marginal.cells()[i].value()),
                    None => matrix_total,
                };
                if denominator > 0.0 {
                    merged.set(values, Control::new(base * numerator / denominator)?)?;
                }
            }
            joint = merged;
        }

        joint.normalize()?;
        Ok(joint)
    }

    fn covering(&self, values: &[ValueId]) -> Option<&FullMatrix> {
        self.matrices
            .iter()
            .find(|m| values.iter().all(|v| m.holds(*v)))
    }

    fn miss(&self, values: &[ValueId]) -> SynthesisError {
        let ids: Vec<String> = values.iter().map(|v| format!("#{}", v.index())).collect();
        SynthesisError::NoSuchCoordinate(format!(
            "no inner matrix of '{}' covers values [{}]",
            self.label,
            ids.join(", ")
        ))
    }
}
