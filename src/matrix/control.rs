//! Numeric controls attached to matrix cells

use std::fmt;
use std::iter::Sum;
use std::ops::Add;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthesisError};

/// Tolerance for a frequency matrix to count as summing to one
pub const FREQUENCY_EPSILON: f64 = 1e-6;

/// What the controls of a matrix represent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlKind {
    /// Counts from a contingency table
    #[default]
    Contingency,
    /// Frequencies summing to one
    Frequency,
}

/// Non-negative numeric payload of a matrix cell
///
/// Contingency controls start as whole counts but become expected counts
/// once IPF rescales them, so both kinds are carried as `f64`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default)]
pub struct Control(f64);

impl Control {
    pub const ZERO: Self = Self(0.0);

    /// Create a control, rejecting negative and non-finite numbers
    pub fn new(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(SynthesisError::InvalidControl {
                value,
                reason: "controls must be finite and non-negative".to_string(),
            });
        }
        Ok(Self(value))
    }

    /// Control for a whole count
    #[must_use]
    pub fn count(count: u64) -> Self {
        Self(count as f64)
    }

    #[must_use]
    pub const fn value(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    /// Add another control in place
    pub fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }

    /// Multiply in place by a non-negative finite factor
    pub fn multiply(&mut self, factor: f64) -> Result<()> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(SynthesisError::InvalidControl {
                value: factor,
                reason: "multiplication factor must be finite and non-negative".to_string(),
            });
        }
        self.0 *= factor;
        Ok(())
    }
}

impl Add for Control {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sum for Control {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Control {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
