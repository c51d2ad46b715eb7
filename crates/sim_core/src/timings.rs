//! Phase durations and the mining duration distribution.
//!
//! Driving and unloading take fixed time; mining is drawn uniformly from an
//! inclusive range by a generator seeded with a constant, which keeps runs
//! bit-identical for the same fleet/station configuration.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::clock::Minutes;

/// Default seed for the mining duration generator.
pub const DEFAULT_SEED: u64 = 0;

/// Durations governing the haul cycle, in simulated minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HaulTimings {
    pub unloading_minutes: Minutes,
    pub driving_minutes: Minutes,
    pub mining_min_minutes: Minutes,
    pub mining_max_minutes: Minutes,
    /// Simulated horizon: the dispatch loop stops at the first event past
    /// start + horizon.
    pub horizon_minutes: Minutes,
}

impl Default for HaulTimings {
    fn default() -> Self {
        Self {
            unloading_minutes: 5,
            driving_minutes: 30,
            mining_min_minutes: 60,
            mining_max_minutes: 60 * 5,
            horizon_minutes: 60 * 24 * 3,
        }
    }
}

/// Uniform integer mining durations from a seeded generator.
#[derive(Debug, Clone)]
pub struct MiningDurationSampler {
    rng: StdRng,
    min: Minutes,
    max: Minutes,
}

impl MiningDurationSampler {
    pub fn new(seed: u64, min: Minutes, max: Minutes) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            min,
            max,
        }
    }

    pub fn from_timings(seed: u64, timings: &HaulTimings) -> Self {
        Self::new(seed, timings.mining_min_minutes, timings.mining_max_minutes)
    }

    /// Next mining duration, uniform over `[min, max]` inclusive.
    pub fn sample(&mut self) -> Minutes {
        self.rng.gen_range(self.min..=self.max)
    }
}
