//! End-to-end synthesis
//!
//! Reconcile the controls against the seed, fit the seed, normalize it into
//! a distribution and draw synthetic individuals from it.

use std::time::Instant;

use log::info;
use rustc_hash::FxHashMap;

use crate::algorithm::ipf::{FitReport, IpfAlgorithm};
use crate::algorithm::reconcile::{MarginSet, reconcile_margins};
use crate::config::SynthesisConfig;
use crate::error::Result;
use crate::matrix::{Coordinate, FullMatrix, Matrix, NDimensionalMatrix};
use crate::model::AttributeDictionary;
use crate::sampler::{Distribution, Sampler, make_sampler};
use crate::utils::logging::{create_spinner, finish_progress_bar};

/// Outcome of a synthesis run
#[derive(Debug, Clone)]
pub struct Synthesis {
    /// Seed after fitting and normalization
    pub fitted: FullMatrix,
    pub margins: MarginSet,
    pub report: FitReport,
    pub draws: Vec<Coordinate>,
}

impl Synthesis {
    /// Drawn coordinates with their counts, most frequent first
    #[must_use]
    pub fn tally(&self) -> Vec<(Coordinate, usize)> {
        let mut counts: FxHashMap<&Coordinate, usize> = FxHashMap::default();
        for coordinate in &self.draws {
            *counts.entry(coordinate).or_insert(0) += 1;
        }
        let mut tally: Vec<(Coordinate, usize)> = counts
            .into_iter()
            .map(|(coordinate, count)| (coordinate.clone(), count))
            .collect();
        tally.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tally
    }
}

/// Fit `seed` to `control` and draw `n` coordinates from the result
///
/// Draws are reproducible when the configuration carries a seed.
pub fn synthesize(
    dict: &AttributeDictionary,
    config: &SynthesisConfig,
    mut seed: FullMatrix,
    control: &Matrix,
    n: usize,
) -> Result<Synthesis> {
    config.validate()?;
    let start = Instant::now();
    info!(
        "Synthesizing {n} individuals from seed '{}' and control '{}'",
        seed.label(),
        control.label()
    );

    let margins = reconcile_margins(dict, control, &seed)?;
    let report = IpfAlgorithm::new(config.ipf.clone()).fit(&mut seed, &margins)?;
    seed.normalize()?;

    let distribution = Distribution::from_matrix(&seed, config.tolerance)?;
    let sampler = make_sampler(config.sampler, distribution);
    let spinner = create_spinner(Some("Drawing"), config.ipf.show_progress);
    let draws = match config.seed {
        Some(value) => sampler.draw_n_seeded(n, value)?,
        None => sampler.draw_n(n)?,
    };
    finish_progress_bar(&spinner, Some(&format!("Drew {} individuals", draws.len())));

    info!(
        "Synthesis of '{}' finished in {:?}",
        seed.label(),
        start.elapsed()
    );
    Ok(Synthesis {
        fitted: seed,
        margins,
        report,
        draws,
    })
}
