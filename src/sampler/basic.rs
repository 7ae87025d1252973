//! Linear scan sampler

use rand::Rng;

use super::cumulative::CumulativeTable;
use super::distribution::Distribution;
use super::{Sampler, SamplerKind};
use crate::error::Result;

/// Walks the cumulative table until the first bound at or above the draw
#[derive(Debug, Clone)]
pub struct BasicSampler {
    distribution: Distribution,
    table: CumulativeTable,
}

impl BasicSampler {
    #[must_use]
    pub fn new(distribution: Distribution) -> Self {
        let table = CumulativeTable::new(distribution.probabilities());
        Self {
            distribution,
            table,
        }
    }

    #[must_use]
    pub fn cumulative(&self) -> &[f64] {
        self.table.bounds()
    }

    /// Outcome index for a value in `[0, max cumulative]`
    pub fn index_for(&self, u: f64) -> Result<usize> {
        self.table.check(u)?;
        self.table
            .bounds()
            .iter()
            .position(|bound| *bound >= u)
            .ok_or_else(|| self.table.exhausted(u))
    }
}

impl Sampler for BasicSampler {
    fn kind(&self) -> SamplerKind {
        SamplerKind::Basic
    }

    fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    fn draw_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize> {
        self.index_for(rng.random::<f64>() * self.table.max())
    }
}
