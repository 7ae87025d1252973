//! Matrix construction from source tables
//!
//! Source readers hand over one [`MatrixSource`] per input table. A single
//! source becomes a full matrix; several sources become a segmented matrix
//! because no one table spans every attribute jointly.

use std::time::Instant;

use super::control::{Control, ControlKind};
use super::full::FullMatrix;
use super::segmented::SegmentedMatrix;
use super::Matrix;
use crate::error::{Result, SynthesisError};
use crate::model::{AttributeDictionary, AttributeId, ValueId};
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Raw cells of one source table
#[derive(Debug, Clone)]
pub struct MatrixSource {
    pub label: String,
    pub kind: ControlKind,
    pub dimensions: Vec<AttributeId>,
    /// Full value sets with their controls; repeated value sets accumulate
    pub cells: Vec<(Vec<ValueId>, f64)>,
}

impl MatrixSource {
    #[must_use]
    pub fn new(label: &str, kind: ControlKind, dimensions: &[AttributeId]) -> Self {
        Self {
            label: label.to_string(),
            kind,
            dimensions: dimensions.to_vec(),
            cells: Vec::new(),
        }
    }

    /// Add a cell given by value ids
    #[must_use]
    pub fn with_cell(mut self, values: &[ValueId], control: f64) -> Self {
        self.cells.push((values.to_vec(), control));
        self
    }

    /// Add a cell given by input labels, one per dimension in the order the
    /// dimensions were passed to [`MatrixSource::new`]
    pub fn push_labelled(
        &mut self,
        dict: &AttributeDictionary,
        labels: &[&str],
        control: f64,
    ) -> Result<()> {
        if labels.len() != self.dimensions.len() {
            return Err(SynthesisError::InvalidMatrix(format!(
                "source '{}' expects {} labels per cell, got {}",
                self.label,
                self.dimensions.len(),
                labels.len()
            )));
        }
        let values = self
            .dimensions
            .iter()
            .zip(labels)
            .map(|(attribute, label)| dict.value_of(*attribute, label))
            .collect::<Result<Vec<_>>>()?;
        self.cells.push((values, control));
        Ok(())
    }

    fn into_matrix(self, dict: &AttributeDictionary) -> Result<FullMatrix> {
        let mut matrix = FullMatrix::new(dict, &self.dimensions, self.kind, &self.label)?;
        for (values, control) in self.cells {
            matrix.add(&values, Control::new(control)?)?;
        }
        matrix.validate()?;
        Ok(matrix)
    }
}

/// Build a matrix from one or more source tables
///
/// # Arguments
/// * `dict` - Dictionary owning every attribute the sources use
/// * `label` - Name of the resulting matrix
/// * `sources` - Source tables; at least one
///
/// # Returns
/// A full matrix for a single source, a segmented matrix otherwise
pub fn build_matrix(
    dict: &AttributeDictionary,
    label: &str,
    sources: Vec<MatrixSource>,
) -> Result<Matrix> {
    let start = Instant::now();
    log_operation_start("Building matrix", label);

    let count = sources.len();
    let mut matrices = sources
        .into_iter()
        .map(|source| source.into_matrix(dict))
        .collect::<Result<Vec<_>>>()?;

    let matrix = match matrices.len() {
        0 => {
            return Err(SynthesisError::InvalidMatrix(format!(
                "matrix '{label}' has no sources"
            )));
        }
        1 => Matrix::Full(matrices.remove(0)),
        _ => Matrix::Segmented(SegmentedMatrix::new(label, matrices)?),
    };

    log_operation_complete("built", label, count, Some(start.elapsed()));
    Ok(matrix)
}
