//! Scenario parameters for a simulation run.

use serde::{Deserialize, Serialize};

use crate::clock::Minutes;
use crate::timings::{HaulTimings, DEFAULT_SEED};

/// Parameters for building a simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioParams {
    /// Number of trucks in the fleet. Must be >= 1.
    pub num_trucks: usize,
    /// Number of unloading stations. Must be >= 1.
    pub num_stations: usize,
    /// Seed for the mining duration generator.
    pub seed: u64,
    pub timings: HaulTimings,
}

impl Default for ScenarioParams {
    fn default() -> Self {
        Self {
            num_trucks: 100,
            num_stations: 10,
            seed: DEFAULT_SEED,
            timings: HaulTimings::default(),
        }
    }
}

impl ScenarioParams {
    pub fn new(num_trucks: usize, num_stations: usize) -> Self {
        Self {
            num_trucks,
            num_stations,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_timings(mut self, timings: HaulTimings) -> Self {
        self.timings = timings;
        self
    }

    /// Stop the dispatch loop at the first event past this many simulated
    /// minutes.
    pub fn with_horizon_minutes(mut self, horizon: Minutes) -> Self {
        self.timings.horizon_minutes = horizon;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_override_the_defaults() {
        let params = ScenarioParams::new(7, 2)
            .with_seed(99)
            .with_horizon_minutes(600);
        assert_eq!(params.num_trucks, 7);
        assert_eq!(params.num_stations, 2);
        assert_eq!(params.seed, 99);
        assert_eq!(params.timings.horizon_minutes, 600);
        // Untouched timings keep their defaults.
        assert_eq!(params.timings.unloading_minutes, 5);
        assert_eq!(params.timings.driving_minutes, 30);
    }
}
