//! Binary search sampler

use rand::Rng;

use super::cumulative::CumulativeTable;
use super::distribution::Distribution;
use super::{Sampler, SamplerKind};
use crate::error::Result;

/// Same cumulative table as [`super::BasicSampler`], searched in O(log n)
#[derive(Debug, Clone)]
pub struct BinarySampler {
    distribution: Distribution,
    table: CumulativeTable,
}

impl BinarySampler {
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
    ///
    /// A value sitting exactly on a breakpoint belongs to the bucket the
    /// breakpoint closes.
    pub fn index_for(&self, u: f64) -> Result<usize> {
        self.table.check(u)?;
        let index = self.table.bounds().partition_point(|bound| *bound < u);
        if index < self.table.bounds().len() {
            Ok(index)
        } else {
            Err(self.table.exhausted(u))
        }
    }
}

impl Sampler for BinarySampler {
    fn kind(&self) -> SamplerKind {
        SamplerKind::Binary
    }

    fn distribution(&self) -> &Distribution {
        &self.distribution
    }

    fn draw_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize> {
        self.index_for(rng.random::<f64>() * self.table.max())
    }
}
