//! Configuration for a synthesis run

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::algorithm::ipf::{IpfConfig, ZeroCellPolicy};
use crate::error::{Result, SynthesisError};
use crate::matrix::FREQUENCY_EPSILON;
use crate::sampler::SamplerKind;

/// Configuration for fitting a seed and drawing from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisConfig {
    /// Fitting parameters
    pub ipf: IpfConfig,
    /// Sampling strategy
    pub sampler: SamplerKind,
    /// Allowed deviation of a distribution's mass from one
    pub tolerance: f64,
    /// Seed for reproducible draws; OS entropy when absent
    pub seed: Option<u64>,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            ipf: IpfConfig::default(),
            sampler: SamplerKind::default(),
            tolerance: FREQUENCY_EPSILON,
            seed: None,
        }
    }
}

impl SynthesisConfig {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    #[must_use]
    pub const fn with_ipf(mut self, ipf: IpfConfig) -> Self {
        self.ipf = ipf;
        self
    }

    #[must_use]
    pub const fn with_max_step(mut self, max_step: usize) -> Self {
        self.ipf.max_step = max_step;
        self
    }

    #[must_use]
    pub const fn with_delta(mut self, delta: f64) -> Self {
        self.ipf.delta = delta;
        self
    }

    #[must_use]
    pub const fn with_zero_policy(mut self, zero_policy: ZeroCellPolicy) -> Self {
        self.ipf.zero_policy = zero_policy;
        self
    }

    #[must_use]
    pub const fn with_sampler(mut self, sampler: SamplerKind) -> Self {
        self.sampler = sampler;
        self
    }

    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    #[must_use]
    pub const fn with_progress(mut self, show_progress: bool) -> Self {
        self.ipf.show_progress = show_progress;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.ipf.validate()?;
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(SynthesisError::InvalidParameter(format!(
                "distribution tolerance must be a finite non-negative number, got {}",
                self.tolerance
            )));
        }
        Ok(())
    }
}

impl fmt::Display for SynthesisConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Synthesis Configuration:")?;
        write!(f, "{}", self.ipf)?;
        writeln!(f, "  Sampler: {}", self.sampler)?;
        writeln!(f, "  Tolerance: {}", self.tolerance)?;
        match self.seed {
            Some(seed) => writeln!(f, "  Seed: {seed}"),
            None => writeln!(f, "  Seed: from entropy"),
        }
    }
}
