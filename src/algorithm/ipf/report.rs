//! Outcome of a fitting run

use std::fmt;
use std::time::Duration;

/// Summary of one IPF run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FitReport {
    /// Full passes performed
    pub steps: usize,
    /// Relative error after the last pass
    pub error: f64,
    /// Whether the error reached the configured delta
    pub converged: bool,
    /// Error after each pass, starting with the unfitted seed
    pub history: Vec<f64>,
    /// Factors skipped because the matching cells held no mass
    pub skipped_factors: usize,
    /// Margins whose zero target forced their cells to zero
    pub zeroed_margins: usize,
    /// Margins fitted
    pub margins: usize,
    pub elapsed: Duration,
}

impl fmt::Display for FitReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "IPF Report:")?;
        writeln!(f, "  Converged: {}", self.converged)?;
        writeln!(f, "  Steps: {}", self.steps)?;
        writeln!(f, "  Final Error: {:.3e}", self.error)?;
        writeln!(f, "  Margins: {}", self.margins)?;
        writeln!(f, "  Skipped Factors: {}", self.skipped_factors)?;
        writeln!(f, "  Zeroed Margins: {}", self.zeroed_margins)?;
        write!(f, "  Elapsed: {:.2?}", self.elapsed)
    }
}
