//! Finalized probability distributions over coordinates

use crate::error::{Result, SynthesisError};
use crate::matrix::{Coordinate, FullMatrix};

/// Outcomes with strictly positive probabilities summing to one
///
/// Zero-mass outcomes are dropped on construction. Mass outside the
/// tolerance is rejected, never renormalized.
#[derive(Debug, Clone, PartialEq)]
pub struct Distribution {
    outcomes: Vec<Coordinate>,
    probabilities: Vec<f64>,
}

impl Distribution {
    /// Build from coordinate/probability pairs
    pub fn new(entries: Vec<(Coordinate, f64)>, tolerance: f64) -> Result<Self> {
        let mut outcomes = Vec::with_capacity(entries.len());
        let mut probabilities = Vec::with_capacity(entries.len());
        let mut total = 0.0;
        for (coordinate, probability) in entries {
            if !probability.is_finite() || probability < 0.0 {
                return Err(SynthesisError::InvalidDistribution(format!(
                    "outcome {coordinate} has probability {probability}"
                )));
            }
            total += probability;
            if probability > 0.0 {
                outcomes.push(coordinate);
                probabilities.push(probability);
            }
        }

        if outcomes.is_empty() {
            return Err(SynthesisError::InvalidDistribution(
                "distribution has no outcome with positive probability".to_string(),
            ));
        }
        if (total - 1.0).abs() > tolerance {
            return Err(SynthesisError::InvalidDistribution(format!(
                "probabilities sum to {total}, outside 1 ± {tolerance}"
            )));
        }
        Ok(Self {
            outcomes,
            probabilities,
        })
    }

    /// Flatten a frequency matrix
    pub fn from_matrix(matrix: &FullMatrix, tolerance: f64) -> Result<Self> {
        Self::new(
            matrix.iter().map(|(coordinate, control)| (coordinate, control.value())).collect(),
            tolerance,
        )
        .map_err(|e| match e {
            SynthesisError::InvalidDistribution(reason) => SynthesisError::InvalidDistribution(
                format!("matrix '{}': {reason}", matrix.label()),
            ),
            other => other,
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    #[must_use]
    pub fn outcomes(&self) -> &[Coordinate] {
        &self.outcomes
    }

    #[must_use]
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    #[must_use]
    pub fn outcome(&self, index: usize) -> Option<&Coordinate> {
        self.outcomes.get(index)
    }

    /// Probability of a coordinate; zero when absent
    #[must_use]
    pub fn probability_of(&self, coordinate: &Coordinate) -> f64 {
        self.outcomes
            .iter()
            .position(|c| c == coordinate)
            .map_or(0.0, |index| self.probabilities[index])
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.probabilities.iter().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Coordinate, f64)> {
        self.outcomes.iter().zip(self.probabilities.iter().copied())
    }
}
