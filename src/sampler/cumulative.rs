//! Cumulative probability table shared by the scan and search samplers

use crate::error::{Result, SynthesisError};

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CumulativeTable {
    bounds: Vec<f64>,
}

impl CumulativeTable {
    pub(crate) fn new(probabilities: &[f64]) -> Self {
        let bounds = probabilities
            .iter()
            .scan(0.0, |running, p| {
                *running += p;
                Some(*running)
            })
            .collect();
        Self { bounds }
    }

    pub(crate) fn bounds(&self) -> &[f64] {
        &self.bounds
    }

    /// Largest cumulative value
    pub(crate) fn max(&self) -> f64 {
        self.bounds.last().copied().unwrap_or(0.0)
    }

    pub(crate) fn exhausted(&self, drawn: f64) -> SynthesisError {
        SynthesisError::SamplingExhausted {
            drawn,
            lower: self.bounds.first().copied().unwrap_or(0.0),
            upper: self.max(),
            buckets: self.bounds.len(),
        }
    }

    /// Reject draws outside `[0, max]` before any lookup
    pub(crate) fn check(&self, drawn: f64) -> Result<()> {
        if (0.0..=self.max()).contains(&drawn) {
            Ok(())
        } else {
            Err(self.exhausted(drawn))
        }
    }
}
