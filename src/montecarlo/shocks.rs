//! Random return shocks
//!
//! Every path draws from its own stream, derived only from the base seed and the
//! path index. The order in which paths are simulated therefore cannot change
//! the result.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;

/// Source of standard-normal draws for a single path
pub trait ShockSource {
    fn standard_normal(&mut self) -> f64;
}

/// Factory handing out one independent [`ShockSource`] per path
pub trait ShockStreams: Sync {
    type Stream: ShockSource;

    fn stream(&self, path: usize) -> Self::Stream;
}

/// Weyl increment used to spread path indices over the seed space
const STREAM_GAMMA: u64 = 0x9E37_79B9_7F4A_7C15;

fn stream_seed(base_seed: u64, path: usize) -> u64 {
    base_seed.wrapping_add((path as u64).wrapping_mul(STREAM_GAMMA))
}

/// Per-path `StdRng` streams derived from a base seed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeededStreams {
    base_seed: u64,
}

impl SeededStreams {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    /// Use the given seed, or fresh OS entropy when there is none
    pub fn from_seed(seed: Option<u64>) -> Self {
        Self::new(seed.unwrap_or_else(|| rand::thread_rng().gen()))
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }
}

impl ShockStreams for SeededStreams {
    type Stream = PathRng;

    fn stream(&self, path: usize) -> PathRng {
        PathRng(StdRng::seed_from_u64(stream_seed(self.base_seed, path)))
    }
}

/// Seeded generator for one path
#[derive(Debug, Clone)]
pub struct PathRng(StdRng);

impl ShockSource for PathRng {
    fn standard_normal(&mut self) -> f64 {
        self.0.sample(StandardNormal)
    }
}
