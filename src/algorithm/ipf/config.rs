//! IPF configuration

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthesisError};

/// What to do with a target whose seed cells all hold zero
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "policy")]
pub enum ZeroCellPolicy {
    /// Leave the cells at zero; the factor is skipped and counted
    #[default]
    Skip,
    /// Seed the cells with `ratio` times the target, spread evenly, before fitting
    Floor { ratio: f64 },
}

impl fmt::Display for ZeroCellPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "skip"),
            Self::Floor { ratio } => write!(f, "floor ({ratio})"),
        }
    }
}

/// Configuration for iterative proportional fitting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IpfConfig {
    /// Maximum number of full passes over the margins
    pub max_step: usize,
    /// Relative error at which fitting stops
    pub delta: f64,
    /// Handling of targets that meet only zero cells
    pub zero_policy: ZeroCellPolicy,
    /// Whether to render a progress bar
    pub show_progress: bool,
}

impl Default for IpfConfig {
    fn default() -> Self {
        Self {
            max_step: 100,
            delta: 1e-5,
            zero_policy: ZeroCellPolicy::Skip,
            show_progress: false,
        }
    }
}

impl IpfConfig {
    #[must_use]
    pub const fn with_max_step(mut self, max_step: usize) -> Self {
        self.max_step = max_step;
        self
    }

    #[must_use]
    pub const fn with_delta(mut self, delta: f64) -> Self {
        self.delta = delta;
        self
    }

    #[must_use]
    pub const fn with_zero_policy(mut self, zero_policy: ZeroCellPolicy) -> Self {
        self.zero_policy = zero_policy;
        self
    }

    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Reject parameters fitting cannot work with
    pub fn validate(&self) -> Result<()> {
        if !self.delta.is_finite() || self.delta < 0.0 {
            return Err(SynthesisError::InvalidParameter(format!(
                "IPF delta must be a finite non-negative number, got {}",
                self.delta
            )));
        }
        if let ZeroCellPolicy::Floor { ratio } = self.zero_policy {
            if !ratio.is_finite() || ratio <= 0.0 || ratio > 1.0 {
                return Err(SynthesisError::InvalidParameter(format!(
                    "zero-cell floor ratio must lie in (0, 1], got {ratio}"
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Display for IpfConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IPF Configuration:")?;
        writeln!(f, "  Max Step: {}", self.max_step)?;
        writeln!(f, "  Delta: {}", self.delta)?;
        writeln!(f, "  Zero Cells: {}", self.zero_policy)?;
        writeln!(f, "  Progress: {}", self.show_progress)
    }
}
