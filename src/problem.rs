//! Synthesis problems described in JSON
//!
//! A problem bundles the run configuration, the attribute definitions, the
//! seed table, the control tables and the number of individuals to draw.
//! Table cells name their values by input string.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::config::SynthesisConfig;
use crate::error::Result;
use crate::matrix::{ControlKind, FullMatrix, Matrix, MatrixSource, build_matrix};
use crate::model::{AttributeDefinition, AttributeDictionary};
use crate::synthesis::{Synthesis, synthesize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellDefinition {
    /// One input string per table dimension, in dimension order
    pub values: Vec<String>,
    pub control: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableDefinition {
    pub label: String,
    #[serde(default)]
    pub kind: ControlKind,
    pub dimensions: Vec<String>,
    #[serde(default)]
    pub cells: Vec<CellDefinition>,
}

impl TableDefinition {
    fn to_source(&self, dict: &AttributeDictionary) -> Result<MatrixSource> {
        let dimensions = self
            .dimensions
            .iter()
            .map(|name| dict.attribute_id(name))
            .collect::<Result<Vec<_>>>()?;
        let mut source = MatrixSource::new(&self.label, self.kind, &dimensions);
        for cell in &self.cells {
            let labels: Vec<&str> = cell.values.iter().map(String::as_str).collect();
            source.push_labelled(dict, &labels, cell.control)?;
        }
        Ok(source)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(default)]
    pub config: SynthesisConfig,
    pub attributes: Vec<AttributeDefinition>,
    pub seed: TableDefinition,
    pub controls: Vec<TableDefinition>,
    #[serde(default)]
    pub draws: usize,
}

impl Problem {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let problem: Self = serde_json::from_str(json)?;
        problem.config.validate()?;
        Ok(problem)
    }

    /// Read and parse a problem file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Dictionary, seed matrix and control matrix of the problem
    pub fn build(&self) -> Result<(AttributeDictionary, FullMatrix, Matrix)> {
        let dict = AttributeDictionary::from_definitions(&self.attributes)?;
        let seed = build_matrix(&dict, &self.seed.label, vec![self.seed.to_source(&dict)?])?
            .into_full(&dict)?;
        let sources = self
            .controls
            .iter()
            .map(|table| table.to_source(&dict))
            .collect::<Result<Vec<_>>>()?;
        let control = build_matrix(&dict, "control", sources)?;
        Ok((dict, seed, control))
    }

    /// Build and run the problem
    pub fn run(&self) -> Result<(AttributeDictionary, Synthesis)> {
        let (dict, seed, control) = self.build()?;
        let synthesis = synthesize(&dict, &self.config, seed, &control, self.draws)?;
        Ok((dict, synthesis))
    }
}
