//! N-dimensional matrices over attribute value spaces
//!
//! This module provides the discrete joint-distribution representation:
//! coordinates, controls, full matrices over a Cartesian product and
//! segmented matrices combining several partial sources.

pub mod builder;
pub mod control;
pub mod coordinate;
pub mod full;
pub mod segmented;

// Re-export commonly used items
pub use builder::{MatrixSource, build_matrix};
pub use control::{Control, ControlKind, FREQUENCY_EPSILON};
pub use coordinate::Coordinate;
pub use full::FullMatrix;
pub use segmented::SegmentedMatrix;

use crate::error::Result;
use crate::model::{AttributeDictionary, AttributeId, ValueId};

/// Common contract of full and segmented matrices
pub trait NDimensionalMatrix {
    /// Name used in logs and diagnostics
    fn label(&self) -> &str;

    /// Whether controls are counts or frequencies
    fn kind(&self) -> ControlKind;

    /// Attributes spanned, sorted by id
    fn dimensions(&self) -> Vec<AttributeId>;

    /// Aggregated control of a full or partial value set
    fn get_val(&self, values: &[ValueId]) -> Result<Control>;

    /// Full coordinates containing a partial value set
    fn get_coordinates(&self, values: &[ValueId]) -> Result<Vec<Coordinate>>;

    fn is_segmented(&self) -> bool;

    /// Rescale so the matrix sums to one
    fn normalize(&mut self) -> Result<()>;
}

impl NDimensionalMatrix for FullMatrix {
    fn label(&self) -> &str {
        FullMatrix::label(self)
    }

    fn kind(&self) -> ControlKind {
        FullMatrix::kind(self)
    }

    fn dimensions(&self) -> Vec<AttributeId> {
        FullMatrix::dimensions(self).to_vec()
    }

    fn get_val(&self, values: &[ValueId]) -> Result<Control> {
        FullMatrix::get_val(self, values)
    }

    fn get_coordinates(&self, values: &[ValueId]) -> Result<Vec<Coordinate>> {
        FullMatrix::get_coordinates(self, values)
    }

    fn is_segmented(&self) -> bool {
        false
    }

    fn normalize(&mut self) -> Result<()> {
        FullMatrix::normalize(self)
    }
}

impl NDimensionalMatrix for SegmentedMatrix {
    fn label(&self) -> &str {
        SegmentedMatrix::label(self)
    }

    fn kind(&self) -> ControlKind {
        SegmentedMatrix::kind(self)
    }

    fn dimensions(&self) -> Vec<AttributeId> {
        SegmentedMatrix::dimensions(self)
    }

    fn get_val(&self, values: &[ValueId]) -> Result<Control> {
        SegmentedMatrix::get_val(self, values)
    }

    fn get_coordinates(&self, values: &[ValueId]) -> Result<Vec<Coordinate>> {
        SegmentedMatrix::get_coordinates(self, values)
    }

    fn is_segmented(&self) -> bool {
        true
    }

    fn normalize(&mut self) -> Result<()> {
        SegmentedMatrix::normalize(self)
    }
}

/// A matrix built from source data
#[derive(Debug, Clone)]
pub enum Matrix {
    Full(FullMatrix),
    Segmented(SegmentedMatrix),
}

impl Matrix {
    /// Full matrices making up this matrix: itself, or the inner matrices
    #[must_use]
    pub fn inner_matrices(&self) -> Vec<&FullMatrix> {
        match self {
            Self::Full(matrix) => vec![matrix],
            Self::Segmented(matrix) => matrix.matrices().iter().collect(),
        }
    }

    /// Full matrices whose dimensions contain `attribute` or its referent
    pub fn matrices_involving(
        &self,
        dict: &AttributeDictionary,
        attribute: AttributeId,
    ) -> Result<Vec<&FullMatrix>> {
        match self {
            Self::Full(matrix) => {
                let referent = dict.attribute(attribute)?.referent();
                Ok(if matrix.spans(attribute) || matrix.spans(referent) {
                    vec![matrix]
                } else {
                    Vec::new()
                })
            }
            Self::Segmented(matrix) => matrix.matrices_involving(dict, attribute),
        }
    }

    /// Turn into a single full matrix, collapsing segments if needed
    pub fn into_full(self, dict: &AttributeDictionary) -> Result<FullMatrix> {
        match self {
            Self::Full(matrix) => Ok(matrix),
            Self::Segmented(matrix) => matrix.collapse(dict),
        }
    }

    fn inner(&self) -> &dyn NDimensionalMatrix {
        match self {
            Self::Full(matrix) => matrix,
            Self::Segmented(matrix) => matrix,
        }
    }
}

impl NDimensionalMatrix for Matrix {
    fn label(&self) -> &str {
        self.inner().label()
    }

    fn kind(&self) -> ControlKind {
        self.inner().kind()
    }

    fn dimensions(&self) -> Vec<AttributeId> {
        self.inner().dimensions()
    }

    fn get_val(&self, values: &[ValueId]) -> Result<Control> {
        self.inner().get_val(values)
    }

    fn get_coordinates(&self, values: &[ValueId]) -> Result<Vec<Coordinate>> {
        self.inner().get_coordinates(values)
    }

    fn is_segmented(&self) -> bool {
        matches!(self, Self::Segmented(_))
    }

    fn normalize(&mut self) -> Result<()> {
        match self {
            Self::Full(matrix) => matrix.normalize(),
            Self::Segmented(matrix) => matrix.normalize(),
        }
    }
}

impl From<FullMatrix> for Matrix {
    fn from(matrix: FullMatrix) -> Self {
        Self::Full(matrix)
    }
}

impl From<SegmentedMatrix> for Matrix {
    fn from(matrix: SegmentedMatrix) -> Self {
        Self::Segmented(matrix)
    }
}
