//! Walker alias sampler
//!
//! Vose's construction: probabilities are scaled by the outcome count so the
//! average column holds mass one. Light columns (below one) are topped up
//! from heavy columns until one worklist runs dry; whatever remains gets
//! probability one. A draw then costs one uniform column pick and one coin.

use rand::Rng;

use super::distribution::Distribution;
use super::{Sampler, SamplerKind};
use crate::error::Result;

#[derive(Debug, Clone)]
pub struct AliasSampler {
    distribution: Distribution,
    probability: Vec<f64>,
    alias: Vec<usize>,
}

impl AliasSampler {
    #[must_use]
    pub fn new(distribution: Distribution) -> Self {
        let n = distribution.len();
        let total = distribution.total();
        #[allow(clippy::cast_precision_loss)]
        let scale = n as f64 / total;
        let mut scaled: Vec<f64> = distribution.probabilities().iter().map(|p| p * scale).collect();

        let mut probability = vec![0.0; n];
        let mut alias: Vec<usize> = (0..n).collect();
        let (mut light, mut heavy): (Vec<usize>, Vec<usize>) = (0..n).partition(|i| scaled[*i] < 1.0);

        while !light.is_empty() && !heavy.is_empty() {
            let (Some(l), Some(g)) = (light.pop(), heavy.pop()) else {
                break;
            };
            probability[l] = scaled[l];
            alias[l] = g;
            scaled[g] = (scaled[g] + scaled[l]) - 1.0;
            if scaled[g] < 1.0 {
                light.push(g);
            } else {
                heavy.push(g);
            }
        }
        // Rounding can strand columns on either list
        for i in heavy.into_iter().chain(light) {
            probability[i] = 1.0;
            alias[i] = i;
        }

        Self {
            distribution,
            probability,
            alias,
        }
    }

    /// Probability of keeping each column's own outcome
    #[must_use]
    pub fn probability(&self) -> &[f64] {
        &self.probability
    }

    /// Outcome taken when a column's coin fails
    #[must_use]
    pub fn alias(&self) -> &[usize] {
        &self.alias
    }

    /// Probability the tables assign to outcome `index`
    #[must_use]
    pub fn outcome_probability(&self, index: usize) -> f64 {
        let mass: f64 = self
            .probability
            .iter()
            .zip(&self.alias)
            .enumerate()
            .map(|(column, (keep, alias))| {
                let own = if column == index { *keep } else { 0.0 };
                let aliased = if *alias == index && column != index { 1.0 - keep } else { 0.0 };
                own + aliased
            })
            .sum();
        #[allow(clippy::cast_precision_loss)]
        let columns = self.probability.len() as f64;
        mass / columns
    }

    /// Outcome index for a column and a coin in `[0, 1)`
    #[must_use]
    pub fn index_for(&self, column: usize, coin: f64) -> usize {
        if coin < self.probability[column] { column } else { self.alias[column] }
    }
}

impl Sampler for AliasSampler {
    fn kind(&self) -> SamplerKind {
        SamplerKind::Alias
    }

    fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    fn draw_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize> {
        let column = rng.random_range(0..self.probability.len());
        Ok(self.index_for(column, rng.random::<f64>()))
    }
}
