//! Summary report printed after a run.

use std::time::Duration;

use sim_core::clock::Minutes;
use sim_core::simulation::Simulation;
use sim_core::telemetry::{FleetStats, StationStats};
use sim_core::trucks::Phase;

pub fn print_summary(sim: &Simulation, elapsed: Minutes, wall: Duration) {
    let mut fleet = FleetStats::default();
    for truck in sim.trucks() {
        fleet.absorb_truck(truck);
    }
    let mut stations = StationStats::default();
    for station in sim.stations() {
        stations.absorb_station(station);
    }

    println!(
        "Finished simulation. Simulated time: [{elapsed} min]; Real time: [{:.3} sec]",
        wall.as_secs_f64()
    );
    println!(
        "Trucks avg utilization: {:.2}; Phase breakdown:",
        fleet.utilization()
    );
    println!("{:<12}{:>12}{:>12}", "", "Avg", "Stddev");
    for phase in Phase::ALL {
        let stats = fleet.phase(phase);
        println!(
            "{:<12}{:>12.2}{:>12.2}",
            phase.label(),
            stats.mean(),
            stats.stddev()
        );
    }
    println!("Avg station utilization: {:.2}", stations.utilization());
}
