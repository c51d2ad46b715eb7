//! End-of-run statistics over trucks and stations.
//!
//! Everything here consumes the core through the read-only entity views;
//! nothing feeds back into the simulation.

use crate::clock::Minutes;
use crate::stations::Station;
use crate::trucks::{Phase, Truck};

/// Running mean and variance of a stream of observations (Welford's online
/// algorithm).
#[derive(Debug, Clone, Copy, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    total: f64,
}

impl RunningStats {
    pub fn add_observation(&mut self, value: f64) {
        self.count += 1;
        self.total += value;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Sample standard deviation; zero for fewer than two observations.
    pub fn stddev(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).sqrt()
        }
    }
}

/// Per-phase duration statistics accumulated across the fleet.
#[derive(Debug, Clone, Default)]
pub struct FleetStats {
    per_phase: [RunningStats; Phase::ALL.len()],
}

impl FleetStats {
    /// Fold one truck's cumulative counters into the fleet aggregate.
    pub fn absorb_truck(&mut self, truck: &Truck) {
        for phase in Phase::ALL {
            self.per_phase[phase.index()]
                .add_observation(truck.phase_durations()[phase.index()] as f64);
        }
    }

    pub fn phase(&self, phase: Phase) -> &RunningStats {
        &self.per_phase[phase.index()]
    }

    /// Share of total truck time spent mining.
    pub fn utilization(&self) -> f64 {
        let total: f64 = Phase::ALL
            .iter()
            .map(|phase| self.per_phase[phase.index()].total())
            .sum();
        if total == 0.0 {
            0.0
        } else {
            self.phase(Phase::Mining).total() / total
        }
    }
}

/// Aggregate idle/busy time across all stations.
#[derive(Debug, Clone, Copy, Default)]
pub struct StationStats {
    idle_total: Minutes,
    busy_total: Minutes,
}

impl StationStats {
    pub fn absorb_station(&mut self, station: &Station) {
        self.idle_total += station.idle_minutes();
        self.busy_total += station.busy_minutes();
    }

    pub fn idle_total(&self) -> Minutes {
        self.idle_total
    }

    pub fn busy_total(&self) -> Minutes {
        self.busy_total
    }

    /// Share of accounted station time spent unloading.
    pub fn utilization(&self) -> f64 {
        let total = (self.idle_total + self.busy_total) as f64;
        if total == 0.0 {
            0.0
        } else {
            self.busy_total as f64 / total
        }
    }
}
