//! Fitting algorithms
//!
//! Reconciliation derives marginal targets from control matrices; IPF fits
//! a seed matrix to those targets.

pub mod ipf;
pub mod reconcile;

pub use ipf::{FitReport, IpfAlgorithm, IpfConfig, ZeroCellPolicy, fit};
pub use reconcile::{AttributeMatch, Margin, MarginSet, MatchKind, ValueSubset, reconcile_margins};
