//! Full N-dimensional matrix
//!
//! A full matrix holds one control for every cell of the Cartesian product
//! of its dimensions' value spaces. Cells are stored densely in row-major
//! order (last dimension fastest) and addressed through per-dimension
//! strides, which keeps marginal lookups a matter of enumerating the free
//! dimensions.

use std::collections::BTreeSet;

use itertools::Itertools;
use rustc_hash::FxHashMap;

use super::control::{Control, ControlKind, FREQUENCY_EPSILON};
use super::coordinate::Coordinate;
use crate::error::{Result, SynthesisError};
use crate::model::{AttributeDictionary, AttributeId, ValueId};

/// Dense matrix over the full Cartesian product of its dimensions
#[derive(Debug, Clone)]
pub struct FullMatrix {
    label: String,
    kind: ControlKind,
    dimensions: Vec<AttributeId>,
    dimension_names: Vec<String>,
    axes: Vec<Vec<ValueId>>,
    strides: Vec<usize>,
    /// value -> (dimension position, position on that dimension's axis)
    positions: FxHashMap<ValueId, (usize, usize)>,
    cells: Vec<Control>,
}

impl FullMatrix {
    /// Create a matrix with every cell set to zero
    ///
    /// # Arguments
    /// * `dict` - Dictionary owning the dimensions
    /// * `dimensions` - Attributes spanned by the matrix, in any order
    /// * `kind` - Whether cells hold counts or frequencies
    /// * `label` - Name used in logs and diagnostics
    pub fn new(
        dict: &AttributeDictionary,
        dimensions: &[AttributeId],
        kind: ControlKind,
        label: &str,
    ) -> Result<Self> {
        if dimensions.is_empty() {
            return Err(SynthesisError::InvalidMatrix(format!(
                "matrix '{label}' has no dimensions"
            )));
        }
        let mut dims = dimensions.to_vec();
        dims.sort_unstable();
        if let Some(pair) = dims.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(SynthesisError::InvalidMatrix(format!(
                "matrix '{label}' lists dimension '{}' twice",
                dict.attribute_name(pair[0])
            )));
        }

        let mut names = Vec::with_capacity(dims.len());
        let mut axes = Vec::with_capacity(dims.len());
        for dim in &dims {
            let attr = dict.attribute(*dim)?;
            if attr.is_record() {
                return Err(SynthesisError::InvalidMatrix(format!(
                    "record attribute '{}' cannot be a dimension of '{label}'",
                    attr.name()
                )));
            }
            if attr.values().is_empty() {
                return Err(SynthesisError::InvalidMatrix(format!(
                    "attribute '{}' has an empty value space",
                    attr.name()
                )));
            }
            names.push(attr.name().to_string());
            axes.push(attr.values().to_vec());
        }

        Self::from_axes(label, kind, dims, names, axes)
    }

    fn from_axes(
        label: &str,
        kind: ControlKind,
        dimensions: Vec<AttributeId>,
        dimension_names: Vec<String>,
        axes: Vec<Vec<ValueId>>,
    ) -> Result<Self> {
        let mut strides = vec![1; axes.len()];
        let mut size: usize = 1;
        for dim in (0..axes.len()).rev() {
            strides[dim] = size;
            size = size.checked_mul(axes[dim].len()).ok_or_else(|| {
                SynthesisError::InvalidMatrix(format!("matrix '{label}' has too many cells"))
            })?;
        }

        let mut positions = FxHashMap::default();
        for (dim, axis) in axes.iter().enumerate() {
            for (pos, value) in axis.iter().enumerate() {
                positions.insert(*value, (dim, pos));
            }
        }

        Ok(Self {
            label: label.to_string(),
            kind,
            dimensions,
            dimension_names,
            axes,
            strides,
            positions,
            cells: vec![Control::ZERO; size],
        })
    }

    /// Build a contingency matrix by counting the coordinates of a population sample
    ///
    /// Every coordinate must hold a value for each of `dimensions`; values of
    /// other attributes are ignored.
    pub fn from_sample(
        dict: &AttributeDictionary,
        dimensions: &[AttributeId],
        sample: &[Coordinate],
        label: &str,
    ) -> Result<Self> {
        let mut matrix = Self::new(dict, dimensions, ControlKind::Contingency, label)?;
        for coordinate in sample {
            let index = matrix.project_index(coordinate.values()).ok_or_else(|| {
                SynthesisError::NoSuchCoordinate(format!(
                    "sample coordinate {} does not span matrix '{label}'",
                    coordinate.describe(dict)
                ))
            })?;
            matrix.cells[index].add_assign(Control::count(1));
        }
        Ok(matrix)
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub const fn kind(&self) -> ControlKind {
        self.kind
    }

    /// Dimensions, sorted by attribute id
    #[must_use]
    pub fn dimensions(&self) -> &[AttributeId] {
        &self.dimensions
    }

    /// Whether `attribute` is one of the dimensions
    #[must_use]
    pub fn spans(&self, attribute: AttributeId) -> bool {
        self.dimensions.binary_search(&attribute).is_ok()
    }

    /// Whether `value` lies on one of the axes
    #[must_use]
    pub fn holds(&self, value: ValueId) -> bool {
        self.positions.contains_key(&value)
    }

    /// Values of one dimension, in cell order
    #[must_use]
    pub fn axis(&self, attribute: AttributeId) -> Option<&[ValueId]> {
        self.dimensions
            .binary_search(&attribute)
            .ok()
            .map(|dim| self.axes[dim].as_slice())
    }

    /// Number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[must_use]
    pub fn cells(&self) -> &[Control] {
        &self.cells
    }

    /// Control of one cell by dense index
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<Control> {
        self.cells.get(index).copied()
    }

    /// Coordinate of one cell by dense index
    #[must_use]
    pub fn coordinate_at(&self, index: usize) -> Coordinate {
        Coordinate::from_values_unchecked(
            self.axes
                .iter()
                .zip(&self.strides)
                .map(|(axis, stride)| axis[(index / stride) % axis.len()]),
        )
    }

    /// Iterate over every cell with its coordinate
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, Control)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, control)| (self.coordinate_at(index), *control))
    }

    /// Sum of all controls
    #[must_use]
    pub fn total(&self) -> f64 {
        self.cells.iter().map(|c| c.value()).sum()
    }

    /// Whether the controls sum to one within `tolerance`
    #[must_use]
    pub fn is_normalized(&self, tolerance: f64) -> bool {
        (self.total() - 1.0).abs() <= tolerance
    }

    /// Dense index of a full coordinate
    pub fn index_of(&self, values: &[ValueId]) -> Result<usize> {
        let fixed = self.fixed_positions(values)?;
        let mut index = 0;
        for (dim, position) in fixed.iter().enumerate() {
            let Some(position) = position else {
                return Err(SynthesisError::NoSuchCoordinate(format!(
                    "coordinate does not fix dimension '{}' of matrix '{}'",
                    self.dimension_names[dim], self.label
                )));
            };
            index += position * self.strides[dim];
        }
        Ok(index)
    }

    /// Dense index of the cell matching the values that fall on this matrix's
    /// dimensions, ignoring the rest; `None` if a dimension is left open
    #[must_use]
    pub fn project_index(&self, values: &[ValueId]) -> Option<usize> {
        let mut fixed = vec![None; self.dimensions.len()];
        for value in values {
            if let Some((dim, pos)) = self.positions.get(value) {
                fixed[*dim] = Some(*pos);
            }
        }
        fixed
            .iter()
            .zip(&self.strides)
            .try_fold(0, |index, (position, stride)| position.map(|p| index + p * stride))
    }

    /// Overwrite the control of a full coordinate
    pub fn set(&mut self, values: &[ValueId], control: Control) -> Result<()> {
        let index = self.index_of(values)?;
        self.cells[index] = control;
        Ok(())
    }

    /// Add to the control of a full coordinate
    pub fn add(&mut self, values: &[ValueId], control: Control) -> Result<()> {
        let index = self.index_of(values)?;
        self.cells[index].add_assign(control);
        Ok(())
    }

    /// Control of a full or partial value set
    ///
    /// A partial set returns the sum over all cells containing it.
    pub fn get_val(&self, values: &[ValueId]) -> Result<Control> {
        let fixed = self.fixed_positions(values)?;
        Ok(self
            .indices_for_fixed(&fixed)
            .into_iter()
            .map(|index| self.cells[index])
            .sum())
    }

    /// All full coordinates containing a partial value set
    pub fn get_coordinates(&self, values: &[ValueId]) -> Result<Vec<Coordinate>> {
        let fixed = self.fixed_positions(values)?;
        Ok(self
            .indices_for_fixed(&fixed)
            .into_iter()
            .map(|index| self.coordinate_at(index))
            .collect())
    }

    /// Dense indices of cells whose value on each constrained attribute lies
    /// in the allowed set
    ///
    /// Allowed values foreign to a dimension's axis are ignored, so a set
    /// holding only foreign values selects nothing.
    pub fn indices_where(&self, constraints: &[(AttributeId, BTreeSet<ValueId>)]) -> Result<Vec<usize>> {
        let mut choices: Vec<Vec<usize>> = self.axes.iter().map(|axis| (0..axis.len()).collect()).collect();
        for (attribute, allowed) in constraints {
            let dim = self.dimensions.binary_search(attribute).map_err(|_| {
                SynthesisError::NoSuchCoordinate(format!(
                    "attribute #{} is not a dimension of matrix '{}'",
                    attribute.index(),
                    self.label
                ))
            })?;
            let axis = &self.axes[dim];
            choices[dim].retain(|pos| allowed.contains(&axis[*pos]));
        }
        Ok(self.indices_for_choices(&choices))
    }

    /// Sum the matrix down onto a subset of its dimensions
    pub fn marginalize(&self, dimensions: &[AttributeId]) -> Result<Self> {
        let mut kept = Vec::with_capacity(dimensions.len());
        for attribute in dimensions {
            let dim = self.dimensions.binary_search(attribute).map_err(|_| {
                SynthesisError::InvalidMatrix(format!(
                    "cannot marginalize matrix '{}' onto foreign attribute #{}",
                    self.label,
                    attribute.index()
                ))
            })?;
            kept.push(dim);
        }
        kept.sort_unstable();
        kept.dedup();
        if kept.is_empty() {
            return Err(SynthesisError::InvalidMatrix(format!(
                "cannot marginalize matrix '{}' onto no dimensions",
                self.label
            )));
        }

        let mut marginal = Self::from_axes(
            &self.label,
            self.kind,
            kept.iter().map(|dim| self.dimensions[*dim]).collect(),
            kept.iter().map(|dim| self.dimension_names[*dim].clone()).collect(),
            kept.iter().map(|dim| self.axes[*dim].clone()).collect(),
        )?;

        for (index, control) in self.cells.iter().enumerate() {
            let target: usize = kept
                .iter()
                .zip(&marginal.strides)
                .map(|(dim, stride)| ((index / self.strides[*dim]) % self.axes[*dim].len()) * stride)
                .sum();
            marginal.cells[target].add_assign(*control);
        }
        Ok(marginal)
    }

    /// Rescale every control so the matrix sums to one
    pub fn normalize(&mut self) -> Result<()> {
        let total = self.total();
        if !total.is_finite() || total <= 0.0 {
            return Err(SynthesisError::InvalidDistribution(format!(
                "cannot normalize matrix '{}' with total mass {total}",
                self.label
            )));
        }
        let factor = 1.0 / total;
        for cell in &mut self.cells {
            cell.multiply(factor)?;
        }
        self.kind = ControlKind::Frequency;
        Ok(())
    }

    /// Check the frequency invariant
    pub fn validate(&self) -> Result<()> {
        if self.kind == ControlKind::Frequency && !self.is_normalized(FREQUENCY_EPSILON) {
            return Err(SynthesisError::InvalidDistribution(format!(
                "frequency matrix '{}' sums to {} instead of 1",
                self.label,
                self.total()
            )));
        }
        Ok(())
    }

    pub(crate) fn sum_cells(&self, indices: &[usize]) -> f64 {
        indices.iter().map(|index| self.cells[*index].value()).sum()
    }

    pub(crate) fn scale_cells(&mut self, indices: &[usize], factor: f64) -> Result<()> {
        for index in indices {
            self.cells[*index].multiply(factor)?;
        }
        Ok(())
    }

    pub(crate) fn fill_cells(&mut self, indices: &[usize], control: Control) {
        for index in indices {
            self.cells[*index] = control;
        }
    }

    fn fixed_positions(&self, values: &[ValueId]) -> Result<Vec<Option<usize>>> {
        let mut fixed = vec![None; self.dimensions.len()];
        for value in values {
            let (dim, pos) = self.positions.get(value).copied().ok_or_else(|| {
                SynthesisError::NoSuchCoordinate(format!(
                    "value #{} is not in matrix '{}' (dimensions: {})",
                    value.index(),
                    self.label,
                    self.dimension_names.join(", ")
                ))
            })?;
            if fixed[dim].is_some_and(|existing| existing != pos) {
                return Err(SynthesisError::NoSuchCoordinate(format!(
                    "two values given for dimension '{}' of matrix '{}'",
                    self.dimension_names[dim], self.label
                )));
            }
            fixed[dim] = Some(pos);
        }
        Ok(fixed)
    }

    fn indices_for_fixed(&self, fixed: &[Option<usize>]) -> Vec<usize> {
        if fixed.iter().all(Option::is_some) {
            return vec![
                fixed
                    .iter()
                    .zip(&self.strides)
                    .map(|(pos, stride)| pos.unwrap_or(0) * stride)
                    .sum::<usize>(),
            ];
        }
        let choices: Vec<Vec<usize>> = fixed
            .iter()
            .zip(&self.axes)
            .map(|(pos, axis)| pos.map_or_else(|| (0..axis.len()).collect(), |p| vec![p]))
            .collect();
        self.indices_for_choices(&choices)
    }

    fn indices_for_choices(&self, choices: &[Vec<usize>]) -> Vec<usize> {
        choices
            .iter()
            .map(|positions| positions.iter().copied())
            .multi_cartesian_product()
            .map(|combo| combo.iter().zip(&self.strides).map(|(p, s)| p * s).sum::<usize>())
            .collect()
    }
}
