//! Iterative proportional fitting
//!
//! The seed matrix is rescaled in place, one margin at a time, until every
//! marginal target is met within the configured relative error or the step
//! budget runs out. Running out of steps is reported, never raised.

pub mod config;
pub mod report;

pub use config::{IpfConfig, ZeroCellPolicy};
pub use report::FitReport;

use std::time::Instant;

use log::{debug, info, warn};

use super::reconcile::MarginSet;
use crate::error::{Result, SynthesisError};
use crate::matrix::{Control, ControlKind, FullMatrix};
use crate::utils::logging::{create_main_progress_bar, finish_progress_bar, log_warning};

/// A margin resolved to dense seed cell indices
#[derive(Debug, Clone)]
struct Constraint {
    indices: Vec<usize>,
    target: f64,
}

/// Fits seed matrices to marginal targets
#[derive(Debug, Clone, Default)]
pub struct IpfAlgorithm {
    config: IpfConfig,
}

impl IpfAlgorithm {
    #[must_use]
    pub const fn new(config: IpfConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &IpfConfig {
        &self.config
    }

    /// Fit `seed` to `margins` in place
    ///
    /// Each pass visits every distinct margin and multiplies its cells by
    /// `target / current`. A zero target forces its cells to zero; a zero
    /// current with a positive target is skipped. The error after a pass is
    /// the summed absolute deviation divided by the total control mass for a
    /// contingency seed, or by the number of margins for a frequency seed.
    pub fn fit(&self, seed: &mut FullMatrix, margins: &MarginSet) -> Result<FitReport> {
        self.config.validate()?;
        let start = Instant::now();
        info!(
            "Fitting seed '{}' ({} cells) to {}",
            seed.label(),
            seed.len(),
            margins
        );

        let constraints = resolve(seed, margins)?;
        if constraints.is_empty() {
            return Err(SynthesisError::InvalidDistribution(format!(
                "no margin selects any cell of seed '{}'",
                seed.label()
            )));
        }
        // Targets are scaled to the seed's mass, so that mass is the control mass
        let control_mass = seed.total();
        if let ZeroCellPolicy::Floor { ratio } = self.config.zero_policy {
            apply_floor(seed, &constraints, ratio)?;
        }

        let normalizer = match seed.kind() {
            ControlKind::Contingency => control_mass,
            #[allow(clippy::cast_precision_loss)]
            ControlKind::Frequency => constraints.len() as f64,
        };
        let normalizer = if normalizer > 0.0 { normalizer } else { 1.0 };

        let mut report = FitReport {
            margins: constraints.len(),
            ..FitReport::default()
        };
        report.error = fit_error(seed, &constraints, normalizer);
        report.history.push(report.error);
        report.converged = report.error <= self.config.delta;

        let pb = create_main_progress_bar(
            self.config.max_step as u64,
            Some("Fitting"),
            self.config.show_progress,
        );

        while !report.converged && report.steps < self.config.max_step {
            for constraint in &constraints {
                let current = seed.sum_cells(&constraint.indices);
                if constraint.target <= 0.0 {
                    if current > 0.0 {
                        seed.fill_cells(&constraint.indices, Control::ZERO);
                        report.zeroed_margins += 1;
                    }
                    continue;
                }
                let factor = constraint.target / current;
                if current <= 0.0 || !factor.is_finite() {
                    report.skipped_factors += 1;
                    continue;
                }
                seed.scale_cells(&constraint.indices, factor)?;
            }

            report.steps += 1;
            report.error = fit_error(seed, &constraints, normalizer);
            report.history.push(report.error);
            report.converged = report.error <= self.config.delta;
            debug!("IPF step {}: error {:.3e}", report.steps, report.error);
            pb.inc(1);
        }

        report.elapsed = start.elapsed();
        if report.converged {
            finish_progress_bar(&pb, Some("Converged"));
            info!(
                "Seed '{}' converged after {} steps (error {:.3e})",
                seed.label(),
                report.steps,
                report.error
            );
        } else {
            finish_progress_bar(&pb, Some("Step budget exhausted"));
            warn!(
                "Seed '{}' did not converge within {} steps (error {:.3e}, delta {:.3e})",
                seed.label(),
                self.config.max_step,
                report.error,
                self.config.delta
            );
        }
        if report.skipped_factors > 0 {
            log_warning(
                &format!(
                    "{} factors skipped on cells without mass",
                    report.skipped_factors
                ),
                Some(seed.label()),
            );
        }
        Ok(report)
    }
}

/// Fit `seed` to `margins` with the default zero-cell policy
///
/// Convenience wrapper returning the fitted matrix together with its report.
pub fn fit(
    mut seed: FullMatrix,
    margins: &MarginSet,
    max_step: usize,
    delta: f64,
) -> Result<(FullMatrix, FitReport)> {
    let config = IpfConfig::default().with_max_step(max_step).with_delta(delta);
    let report = IpfAlgorithm::new(config).fit(&mut seed, margins)?;
    Ok((seed, report))
}

fn resolve(seed: &FullMatrix, margins: &MarginSet) -> Result<Vec<Constraint>> {
    let mut constraints = Vec::new();
    for margin in margins.distinct() {
        let subset = margin.subset();
        let indices = seed.indices_where(subset.constraints())?;
        if indices.is_empty() {
            if margin.target > 0.0 {
                debug!(
                    "Margin from '{}' with target {} selects no seed cell, dropped",
                    margin.source, margin.target
                );
            }
            continue;
        }
        constraints.push(Constraint {
            indices,
            target: margin.target,
        });
    }
    Ok(constraints)
}

fn apply_floor(seed: &mut FullMatrix, constraints: &[Constraint], ratio: f64) -> Result<()> {
    for constraint in constraints {
        if constraint.target > 0.0 && seed.sum_cells(&constraint.indices) <= 0.0 {
            #[allow(clippy::cast_precision_loss)]
            let share = ratio * constraint.target / constraint.indices.len() as f64;
            seed.fill_cells(&constraint.indices, Control::new(share)?);
        }
    }
    Ok(())
}

fn fit_error(seed: &FullMatrix, constraints: &[Constraint], normalizer: f64) -> f64 {
    constraints
        .iter()
        .map(|c| (c.target - seed.sum_cells(&c.indices)).abs())
        .sum::<f64>()
        / normalizer
}
