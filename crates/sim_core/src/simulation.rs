//! The simulation coordinator.
//!
//! [Simulation] is the only component that touches both trucks and stations.
//! The timer service dispatches each fired event into the coordinator's
//! handlers; a handler updates the relevant entities, possibly through the
//! station board, and returns whatever follow-on events that transition
//! implies. Everything runs on one thread with no suspension point.
//!
//! Scaling out is a matter of running one simulation per mining area and
//! exchanging dispatch messages between them; each simulation stays
//! single-threaded.

use tracing::{debug, info};

use crate::clock::{Event, EventHandlers, EventKind, Minutes, TimerService, Timestamp};
use crate::error::SimError;
use crate::scenario::ScenarioParams;
use crate::stations::{Arrival, Station, StationBoard, StationId};
use crate::timings::{HaulTimings, MiningDurationSampler};
use crate::trucks::{Phase, Truck, TruckFleet, TruckId};

/// Owns the entity state and implements the event handlers. Split out from
/// [Simulation] so the timer service can borrow it mutably during dispatch.
#[derive(Debug)]
struct Dispatcher {
    fleet: TruckFleet,
    board: StationBoard,
    sampler: MiningDurationSampler,
    timings: HaulTimings,
}

impl Dispatcher {
    fn new(params: &ScenarioParams) -> Self {
        Self {
            fleet: TruckFleet::new(params.num_trucks),
            board: StationBoard::new(params.num_stations, params.timings),
            sampler: MiningDurationSampler::from_timings(params.seed, &params.timings),
            timings: params.timings,
        }
    }
}

impl EventHandlers for Dispatcher {
    /// The truck is done mining: send it to the station that will be free
    /// soonest. Selection itself queues the truck at that station and puts
    /// it on the road.
    fn on_mining_finished(
        &mut self,
        now: Timestamp,
        truck: TruckId,
    ) -> Result<Vec<Event>, SimError> {
        let station = self
            .board
            .select_unloading_station(&mut self.fleet, truck, now)?;
        debug!(%truck, %station, now, "mining finished, dispatching");
        Ok(vec![Event {
            timestamp: now + self.timings.driving_minutes,
            kind: EventKind::ArrivedAtStation { truck, station },
        }])
    }

    /// The truck pulled in at its assigned station: it either starts
    /// unloading right away or queues up. A waiting truck gets no new event
    /// here; its unloading is triggered transitively when the station frees
    /// up.
    fn on_arrived_at_station(
        &mut self,
        now: Timestamp,
        truck: TruckId,
        station: StationId,
    ) -> Result<Vec<Event>, SimError> {
        let arrived = self.fleet.get(truck);
        if arrived.phase() != Phase::Driving {
            return Err(SimError::PhaseConflict {
                truck,
                expected: Phase::Driving.label(),
                actual: arrived.phase(),
                at: now,
            });
        }
        if arrived.assigned_station() != Some(station) {
            return Err(SimError::AssignmentMismatch {
                truck,
                expected: station,
                actual: arrived.assigned_station(),
                at: now,
            });
        }

        match self
            .board
            .on_truck_arrived(&mut self.fleet, station, truck, now)?
        {
            Arrival::Unloading => {
                debug!(%truck, %station, now, "arrived, unloading");
                Ok(vec![Event {
                    timestamp: now + self.timings.unloading_minutes,
                    kind: EventKind::UnloadingFinished { truck, station },
                }])
            }
            Arrival::Waiting => {
                debug!(%truck, %station, now, "arrived, waiting");
                Ok(Vec::new())
            }
        }
    }

    /// The truck is unloaded: draw a fresh mining duration and send it back
    /// to the mine. At the station, promote the next waiting truck into the
    /// slot, if any, and schedule its finish.
    fn on_unloading_finished(
        &mut self,
        now: Timestamp,
        truck: TruckId,
        station: StationId,
    ) -> Result<Vec<Event>, SimError> {
        let mining = self.sampler.sample();
        self.fleet.get_mut(truck).begin_mining(now, now + mining)?;
        let mut follow_ups = vec![Event {
            timestamp: now + mining,
            kind: EventKind::MiningFinished { truck },
        }];

        let promoted = self
            .board
            .on_unloading_finished(&mut self.fleet, station, truck, now)?;
        if let Some(next) = promoted {
            follow_ups.push(Event {
                timestamp: now + self.timings.unloading_minutes,
                kind: EventKind::UnloadingFinished {
                    truck: next,
                    station,
                },
            });
        }
        debug!(%truck, %station, now, promoted = ?promoted, "unloading finished");
        Ok(follow_ups)
    }
}

/// A configured simulation: the timer service plus the coordinator state.
#[derive(Debug)]
pub struct Simulation {
    timer: TimerService,
    dispatcher: Dispatcher,
    horizon_minutes: Minutes,
}

impl Simulation {
    /// Build a simulation with every truck in the just-finished-unloading
    /// state. Fails if either count is below 1.
    pub fn new(params: ScenarioParams) -> Result<Self, SimError> {
        if params.num_trucks < 1 || params.num_stations < 1 {
            return Err(SimError::Config {
                trucks: params.num_trucks,
                stations: params.num_stations,
            });
        }
        Ok(Self {
            timer: TimerService::default(),
            dispatcher: Dispatcher::new(&params),
            horizon_minutes: params.timings.horizon_minutes,
        })
    }

    /// Run the dispatch loop: put every truck into its first mining round,
    /// then dispatch events in timestamp order until the clock passes the
    /// horizon or the queue drains. Returns the elapsed simulated minutes,
    /// i.e. the timestamp of the first event beyond the horizon.
    pub fn run(&mut self) -> Result<Minutes, SimError> {
        let start = self.timer.now();
        info!(
            trucks = self.dispatcher.fleet.len(),
            stations = self.dispatcher.board.len(),
            horizon = self.horizon_minutes,
            "starting simulation"
        );

        for i in 0..self.dispatcher.fleet.len() {
            let truck = TruckId(i);
            let mining = self.dispatcher.sampler.sample();
            self.dispatcher
                .fleet
                .get_mut(truck)
                .begin_mining(start, start + mining)?;
            self.timer.schedule(Event {
                timestamp: start + mining,
                kind: EventKind::MiningFinished { truck },
            });
        }

        while let Some(event) = self.timer.dispatch_next(&mut self.dispatcher)? {
            if event.timestamp - start > self.horizon_minutes {
                break;
            }
        }

        let elapsed = self.timer.now() - start;
        info!(elapsed, "simulation finished");
        Ok(elapsed)
    }

    pub fn now(&self) -> Timestamp {
        self.timer.now()
    }

    /// Read-only view of every truck, for end-of-run reporting.
    pub fn trucks(&self) -> impl Iterator<Item = &Truck> + '_ {
        self.dispatcher.fleet.iter()
    }

    /// Read-only view of every station, for utilization reporting.
    pub fn stations(&self) -> impl Iterator<Item = &Station> + '_ {
        self.dispatcher.board.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dispatcher(trucks: usize, stations: usize) -> Dispatcher {
        Dispatcher::new(&ScenarioParams::new(trucks, stations))
    }

    #[test]
    fn mining_finished_dispatches_to_the_least_loaded_station() {
        let mut d = dispatcher(1, 2);
        d.fleet.get_mut(TruckId(0)).begin_mining(0, 40).unwrap();

        let events = d.on_mining_finished(40, TruckId(0)).unwrap();
        assert_eq!(
            events,
            vec![Event {
                timestamp: 70,
                kind: EventKind::ArrivedAtStation {
                    truck: TruckId(0),
                    station: StationId(0),
                },
            }]
        );
        assert_eq!(d.fleet.get(TruckId(0)).phase(), Phase::Driving);
        assert_eq!(d.fleet.get(TruckId(0)).assigned_station(), Some(StationId(0)));
    }

    #[test]
    fn arrival_at_the_wrong_station_is_an_invariant_error() {
        let mut d = dispatcher(1, 2);
        d.fleet.get_mut(TruckId(0)).begin_mining(0, 40).unwrap();
        d.on_mining_finished(40, TruckId(0)).unwrap();

        assert_eq!(
            d.on_arrived_at_station(70, TruckId(0), StationId(1)),
            Err(SimError::AssignmentMismatch {
                truck: TruckId(0),
                expected: StationId(1),
                actual: Some(StationId(0)),
                at: 70,
            })
        );
    }

    #[test]
    fn unloading_finished_promotes_the_next_waiter() {
        let mut d = dispatcher(2, 1);
        d.fleet.get_mut(TruckId(0)).begin_mining(0, 10).unwrap();
        d.fleet.get_mut(TruckId(1)).begin_mining(0, 10).unwrap();

        d.on_mining_finished(10, TruckId(0)).unwrap();
        d.on_mining_finished(10, TruckId(1)).unwrap();

        let first = d.on_arrived_at_station(40, TruckId(0), StationId(0)).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(
            first[0].kind,
            EventKind::UnloadingFinished {
                truck: TruckId(0),
                station: StationId(0),
            }
        );

        // The second truck queues up; no event until the slot frees.
        let second = d.on_arrived_at_station(40, TruckId(1), StationId(0)).unwrap();
        assert!(second.is_empty());
        assert_eq!(d.fleet.get(TruckId(1)).phase(), Phase::Waiting);

        let follow_ups = d
            .on_unloading_finished(45, TruckId(0), StationId(0))
            .unwrap();
        assert_eq!(d.fleet.get(TruckId(0)).phase(), Phase::Mining);
        assert_eq!(d.fleet.get(TruckId(1)).phase(), Phase::Unloading);
        assert_eq!(follow_ups.len(), 2);
        assert!(matches!(
            follow_ups[0].kind,
            EventKind::MiningFinished { truck: TruckId(0) }
        ));
        assert_eq!(
            follow_ups[1],
            Event {
                timestamp: 50,
                kind: EventKind::UnloadingFinished {
                    truck: TruckId(1),
                    station: StationId(0),
                },
            }
        );
    }
}
