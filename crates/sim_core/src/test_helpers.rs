//! Test helpers for placing entities into arbitrary mid-simulation states.
//!
//! Production code only reaches these states through the coordinator; tests
//! use these builders to jump straight to them (or to intentionally invalid
//! ones) without replaying a run.

use crate::clock::{Event, EventHandlers, EventKind, Timestamp};
use crate::error::SimError;
use crate::stations::{Station, StationId};
use crate::trucks::{Phase, Truck, TruckFleet, TruckId};

/// Build a truck frozen in `phase` with the given entry/exit timestamps and
/// station assignment. Counters start at zero.
pub fn truck_in_phase(
    id: usize,
    phase: Phase,
    entry_ts: Timestamp,
    exit_ts: Timestamp,
    station: Option<StationId>,
) -> Truck {
    Truck::with_state(TruckId(id), phase, entry_ts, exit_ts, station)
}

/// Build a fleet from explicit trucks. Each truck's id must match its index.
pub fn fleet_of(trucks: Vec<Truck>) -> TruckFleet {
    TruckFleet::from_trucks(trucks)
}

/// Builder for a station in an arbitrary queue state.
#[derive(Debug, Default)]
pub struct StationStateBuilder {
    unloading: Option<TruckId>,
    waiting: Vec<TruckId>,
    arriving: Vec<TruckId>,
    phase_start_ts: Timestamp,
}

impl StationStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn unloading(mut self, truck: TruckId) -> Self {
        self.unloading = Some(truck);
        self
    }

    pub fn waiting(mut self, trucks: &[TruckId]) -> Self {
        self.waiting = trucks.to_vec();
        self
    }

    pub fn arriving(mut self, trucks: &[TruckId]) -> Self {
        self.arriving = trucks.to_vec();
        self
    }

    pub fn phase_start_ts(mut self, ts: Timestamp) -> Self {
        self.phase_start_ts = ts;
        self
    }

    pub fn build(self, id: usize) -> Station {
        Station::with_state(
            StationId(id),
            self.unloading,
            self.waiting,
            self.arriving,
            self.phase_start_ts,
        )
    }
}

/// An [EventHandlers] implementation that records every dispatched event and
/// schedules nothing, for observing dispatch order in isolation.
#[derive(Debug, Default)]
pub struct RecordingHandlers {
    pub events: Vec<Event>,
}

impl EventHandlers for RecordingHandlers {
    fn on_mining_finished(
        &mut self,
        now: Timestamp,
        truck: TruckId,
    ) -> Result<Vec<Event>, SimError> {
        self.events.push(Event {
            timestamp: now,
            kind: EventKind::MiningFinished { truck },
        });
        Ok(Vec::new())
    }

    fn on_arrived_at_station(
        &mut self,
        now: Timestamp,
        truck: TruckId,
        station: StationId,
    ) -> Result<Vec<Event>, SimError> {
        self.events.push(Event {
            timestamp: now,
            kind: EventKind::ArrivedAtStation { truck, station },
        });
        Ok(Vec::new())
    }

    fn on_unloading_finished(
        &mut self,
        now: Timestamp,
        truck: TruckId,
        station: StationId,
    ) -> Result<Vec<Event>, SimError> {
        self.events.push(Event {
            timestamp: now,
            kind: EventKind::UnloadingFinished { truck, station },
        });
        Ok(Vec::new())
    }
}
