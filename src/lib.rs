//! A Rust library for synthesizing populations from aggregate constraints.
//!
//! A seed joint distribution over categorical attributes is fitted to
//! control marginals with iterative proportional fitting, then sampled to
//! produce synthetic individuals.

pub mod algorithm;
pub mod config;
pub mod error;
pub mod matrix;
pub mod model;
pub mod problem;
pub mod sampler;
pub mod synthesis;
pub mod utils;

// Re-export the most common types for easier use
// Core types
pub use config::SynthesisConfig;
pub use error::{Result, SynthesisError};
pub use model::{AttributeDefinition, AttributeDictionary, AttributeId, DataType, ValueId};

// Matrices
pub use matrix::{
    Control, ControlKind, Coordinate, FullMatrix, Matrix, MatrixSource, NDimensionalMatrix,
    SegmentedMatrix, build_matrix,
};

// Fitting
pub use algorithm::{FitReport, IpfAlgorithm, IpfConfig, MarginSet, ZeroCellPolicy, fit, reconcile_margins};

// Sampling
pub use sampler::{CoordinateSampler, Distribution, Sampler, SamplerKind, make_sampler};

// Pipeline
pub use problem::Problem;
pub use synthesis::{Synthesis, synthesize};
