//! Sampling coordinates from a fitted distribution
//!
//! Three interchangeable strategies share one contract: a linear scan over
//! the cumulative table, a binary search over the same table, and Walker's
//! alias method. Samplers are immutable once built and can be shared across
//! threads; bulk draws run in parallel with one RNG per chunk.

pub mod alias;
pub mod basic;
pub mod binary;
mod cumulative;
pub mod distribution;

pub use alias::AliasSampler;
pub use basic::BasicSampler;
pub use binary::BinarySampler;
pub use distribution::Distribution;

use std::fmt;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SynthesisError};
use crate::matrix::Coordinate;
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Draws handed to one RNG in bulk sampling
pub const DRAW_CHUNK: usize = 4096;

/// Sampling strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplerKind {
    Basic,
    Binary,
    #[default]
    Alias,
}

impl fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic => write!(f, "basic"),
            Self::Binary => write!(f, "binary"),
            Self::Alias => write!(f, "alias"),
        }
    }
}

/// Common contract of the samplers
pub trait Sampler: Send + Sync {
    fn kind(&self) -> SamplerKind;

    /// Distribution the sampler draws from
    fn distribution(&self) -> &Distribution;

    /// Index of one drawn outcome
    fn draw_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize>;

    /// Draw one coordinate using the given RNG
    fn draw_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Coordinate> {
        let index = self.draw_index(rng)?;
        self.distribution().outcome(index).cloned().ok_or_else(|| {
            SynthesisError::InvalidDistribution(format!(
                "drawn index {index} outside {} outcomes",
                self.distribution().len()
            ))
        })
    }

    /// Draw one coordinate using the thread-local RNG
    fn draw(&self) -> Result<Coordinate> {
        self.draw_with(&mut rand::rng())
    }

    /// Draw `n` coordinates in parallel from OS-seeded RNGs
    fn draw_n(&self, n: usize) -> Result<Vec<Coordinate>>
    where
        Self: Sized,
    {
        draw_chunked(self, n, None)
    }

    /// Draw `n` coordinates in parallel, reproducibly for a given seed
    ///
    /// Chunk `i` uses an RNG seeded with `seed + i`, so the result does not
    /// depend on how rayon schedules the chunks.
    fn draw_n_seeded(&self, n: usize, seed: u64) -> Result<Vec<Coordinate>>
    where
        Self: Sized,
    {
        draw_chunked(self, n, Some(seed))
    }
}

fn draw_chunked<S: Sampler>(sampler: &S, n: usize, seed: Option<u64>) -> Result<Vec<Coordinate>> {
    let start = Instant::now();
    let label = sampler.kind().to_string();
    log_operation_start("Drawing with sampler", &label);

    let chunks = n.div_ceil(DRAW_CHUNK);
    let drawn: Vec<Vec<Coordinate>> = (0..chunks)
        .into_par_iter()
        .map(|chunk| {
            let mut rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(chunk as u64)),
                None => StdRng::from_os_rng(),
            };
            let size = DRAW_CHUNK.min(n - chunk * DRAW_CHUNK);
            (0..size).map(|_| sampler.draw_with(&mut rng)).collect::<Result<Vec<_>>>()
        })
        .collect::<Result<Vec<_>>>()?;

    let draws: Vec<Coordinate> = drawn.into_iter().flatten().collect();
    log_operation_complete("drew", &label, draws.len(), Some(start.elapsed()));
    Ok(draws)
}

/// Sampler chosen at runtime
#[derive(Debug, Clone)]
pub enum CoordinateSampler {
    Basic(BasicSampler),
    Binary(BinarySampler),
    Alias(AliasSampler),
}

impl Sampler for CoordinateSampler {
    fn kind(&self) -> SamplerKind {
        match self {
            Self::Basic(sampler) => sampler.kind(),
            Self::Binary(sampler) => sampler.kind(),
            Self::Alias(sampler) => sampler.kind(),
        }
    }

    fn distribution(&self) -> &Distribution {
        match self {
            Self::Basic(sampler) => sampler.distribution(),
            Self::Binary(sampler) => sampler.distribution(),
            Self::Alias(sampler) => sampler.distribution(),
        }
    }

    fn draw_index<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<usize> {
        match self {
            Self::Basic(sampler) => sampler.draw_index(rng),
            Self::Binary(sampler) => sampler.draw_index(rng),
            Self::Alias(sampler) => sampler.draw_index(rng),
        }
    }
}

/// Build a sampler of the requested kind over a finalized distribution
#[must_use]
pub fn make_sampler(kind: SamplerKind, distribution: Distribution) -> CoordinateSampler {
    log::debug!(
        "Building {kind} sampler over {} outcomes",
        distribution.len()
    );
    match kind {
        SamplerKind::Basic => CoordinateSampler::Basic(BasicSampler::new(distribution)),
        SamplerKind::Binary => CoordinateSampler::Binary(BinarySampler::new(distribution)),
        SamplerKind::Alias => CoordinateSampler::Alias(AliasSampler::new(distribution)),
    }
}
