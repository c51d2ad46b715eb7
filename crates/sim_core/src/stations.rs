//! Unloading stations and the least-loaded directory.
//!
//! [StationBoard] keeps every station in an ordered view keyed by projected
//! free time. The key is derived from mutable queue state, so a station's
//! entry is unlinked before any mutation and relinked with a freshly computed
//! key afterwards; a station is never mutated while its entry is live. Ties
//! between equally loaded stations break towards the lowest station id.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;

use crate::clock::{Minutes, Timestamp};
use crate::error::SimError;
use crate::timings::HaulTimings;
use crate::trucks::{Phase, TruckFleet, TruckId};

/// Stable index of a station in the board's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StationId(pub usize);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "station-{}", self.0)
    }
}

/// One unloading station.
#[derive(Debug, Clone)]
pub struct Station {
    id: StationId,
    /// The truck occupying the single unloading slot, if any.
    unloading: Option<TruckId>,
    /// Trucks that have arrived and are waiting their turn, FIFO.
    waiting: VecDeque<TruckId>,
    /// Trucks dispatched here but not yet arrived, FIFO by dispatch time and
    /// hence by arrival time.
    arriving: VecDeque<TruckId>,
    idle_minutes: Minutes,
    busy_minutes: Minutes,
    /// Start of the current idle/busy stretch; the station keeps toggling
    /// between the two.
    phase_start_ts: Timestamp,
}

impl Station {
    pub(crate) fn new(id: StationId) -> Self {
        Self {
            id,
            unloading: None,
            waiting: VecDeque::new(),
            arriving: VecDeque::new(),
            idle_minutes: 0,
            busy_minutes: 0,
            phase_start_ts: 0,
        }
    }

    pub(crate) fn with_state(
        id: StationId,
        unloading: Option<TruckId>,
        waiting: Vec<TruckId>,
        arriving: Vec<TruckId>,
        phase_start_ts: Timestamp,
    ) -> Self {
        Self {
            id,
            unloading,
            waiting: waiting.into(),
            arriving: arriving.into(),
            idle_minutes: 0,
            busy_minutes: 0,
            phase_start_ts,
        }
    }

    pub fn id(&self) -> StationId {
        self.id
    }

    pub fn unloading(&self) -> Option<TruckId> {
        self.unloading
    }

    pub fn waiting(&self) -> impl Iterator<Item = TruckId> + '_ {
        self.waiting.iter().copied()
    }

    pub fn arriving(&self) -> impl Iterator<Item = TruckId> + '_ {
        self.arriving.iter().copied()
    }

    pub fn idle_minutes(&self) -> Minutes {
        self.idle_minutes
    }

    pub fn busy_minutes(&self) -> Minutes {
        self.busy_minutes
    }

    /// When will this station be able to accept one more truck with zero
    /// additional wait, given its current queues? The already-waiting queue
    /// extends the in-progress unloading; a dispatched truck then either
    /// queues behind that backlog or, when it lands after the backlog clears,
    /// resets the free time to its own arrival plus one unloading slot. The
    /// arriving queue must be folded in dispatch order.
    pub fn projected_free_ts(
        &self,
        fleet: &TruckFleet,
        now: Timestamp,
        unloading_minutes: Minutes,
    ) -> Timestamp {
        let mut ts = now;
        if let Some(truck) = self.unloading {
            ts = fleet.get(truck).phase_exit_ts();
        }
        ts += self.waiting.len() as Minutes * unloading_minutes;
        for &truck in &self.arriving {
            let truck = fleet.get(truck);
            debug_assert_eq!(truck.phase(), Phase::Driving);
            let arrival = truck.phase_exit_ts();
            if arrival <= ts {
                // Lands while the backlog is still draining; queues behind it.
                ts += unloading_minutes;
            } else {
                // The station runs dry before this truck shows up.
                ts = arrival + unloading_minutes;
            }
        }
        ts
    }
}

/// Outcome of processing a truck's arrival at a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrival {
    /// The truck went straight into the idle unloading slot.
    Unloading,
    /// The slot was taken; the truck joined the waiting queue.
    Waiting,
}

/// All stations, held in an index-stable arena plus an ordered view keyed by
/// projected free time.
#[derive(Debug)]
pub struct StationBoard {
    stations: Vec<Station>,
    /// The least-loaded view: `(key the station was filed under, id)`.
    ordered: BTreeSet<(Timestamp, StationId)>,
    /// The key each station is currently filed under, so unlinking does not
    /// have to recompute a key that may have drifted since filing.
    filed_key: Vec<Timestamp>,
    timings: HaulTimings,
}

impl StationBoard {
    pub fn new(count: usize, timings: HaulTimings) -> Self {
        let stations: Vec<Station> = (0..count).map(|i| Station::new(StationId(i))).collect();
        // Every station starts empty, free at t=0.
        let ordered = stations.iter().map(|st| (0, st.id())).collect();
        Self {
            stations,
            ordered,
            filed_key: vec![0; count],
            timings,
        }
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn get(&self, id: StationId) -> &Station {
        &self.stations[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> + '_ {
        self.stations.iter()
    }

    fn unlink(&mut self, id: StationId) {
        let was_filed = self.ordered.remove(&(self.filed_key[id.0], id));
        debug_assert!(was_filed, "station must be filed while at rest");
    }

    fn relink(&mut self, id: StationId, fleet: &TruckFleet, now: Timestamp) {
        let station = &self.stations[id.0];
        debug_assert!(
            station.unloading.is_some() || station.waiting.is_empty(),
            "a waiting truck requires an unloading truck"
        );
        let key = station.projected_free_ts(fleet, now, self.timings.unloading_minutes);
        self.filed_key[id.0] = key;
        self.ordered.insert((key, id));
    }

    /// Pick the station that will be free soonest and dispatch `truck` to it:
    /// the truck transitions to Driving and joins the station's arriving
    /// queue. The dispatch itself changes the station's projected free time,
    /// so its position is refreshed as part of selection rather than left
    /// stale for the next query.
    pub fn select_unloading_station(
        &mut self,
        fleet: &mut TruckFleet,
        truck: TruckId,
        now: Timestamp,
    ) -> Result<StationId, SimError> {
        let id = match self.ordered.iter().next() {
            Some(&(_, id)) => id,
            None => return Err(SimError::EmptyDirectory { at: now }),
        };
        fleet
            .get_mut(truck)
            .depart_for_station(now, id, self.timings.driving_minutes)?;
        self.unlink(id);
        self.stations[id.0].arriving.push_back(truck);
        self.relink(id, fleet, now);
        Ok(id)
    }

    /// Process the arrival of `truck`, which must be the front of this
    /// station's arriving queue. It either occupies the idle unloading slot,
    /// closing out the station's idle stretch, or queues up behind the trucks
    /// already here; the truck's own transition happens accordingly before
    /// the station is relinked.
    pub fn on_truck_arrived(
        &mut self,
        fleet: &mut TruckFleet,
        station: StationId,
        truck: TruckId,
        now: Timestamp,
    ) -> Result<Arrival, SimError> {
        let unloading_minutes = self.timings.unloading_minutes;
        let st = &self.stations[station.0];
        match st.arriving.front() {
            None => return Err(SimError::EmptyArrivingQueue { station, at: now }),
            Some(&front) if front != truck => {
                return Err(SimError::ArrivalOrderViolation {
                    station,
                    expected: truck,
                    actual: front,
                    at: now,
                })
            }
            Some(_) => {}
        }
        if let Some(head) = st.unloading {
            let head_truck = fleet.get(head);
            if head_truck.phase() != Phase::Unloading {
                return Err(SimError::PhaseConflict {
                    truck: head,
                    expected: Phase::Unloading.label(),
                    actual: head_truck.phase(),
                    at: now,
                });
            }
        }

        self.unlink(station);
        let st = &mut self.stations[station.0];
        st.arriving.pop_front();
        let outcome = match st.unloading {
            None => {
                // The station was idle until this very moment.
                st.idle_minutes += now - st.phase_start_ts;
                st.phase_start_ts = now;
                st.unloading = Some(truck);
                fleet.get_mut(truck).begin_unloading(now, unloading_minutes)?;
                Arrival::Unloading
            }
            Some(head) => {
                let ready_at = fleet.get(head).phase_exit_ts()
                    + st.waiting.len() as Minutes * unloading_minutes;
                st.waiting.push_back(truck);
                fleet.get_mut(truck).begin_waiting(now, ready_at)?;
                Arrival::Waiting
            }
        };
        self.relink(station, fleet, now);
        Ok(outcome)
    }

    /// Retire the occupied unloading slot (its truck just finished) and
    /// promote the front of the waiting queue into it, if any. The promoted
    /// truck transitions to Unloading here; the returned id lets the caller
    /// schedule its finish. Closes out the station's busy stretch either way.
    pub fn on_unloading_finished(
        &mut self,
        fleet: &mut TruckFleet,
        station: StationId,
        truck: TruckId,
        now: Timestamp,
    ) -> Result<Option<TruckId>, SimError> {
        let unloading_minutes = self.timings.unloading_minutes;
        let st = &self.stations[station.0];
        match st.unloading {
            None => return Err(SimError::EmptyUnloadingSlot { station, at: now }),
            Some(occupant) if occupant != truck => {
                return Err(SimError::UnloadingSlotMismatch {
                    station,
                    expected: truck,
                    actual: occupant,
                    at: now,
                })
            }
            Some(_) => {}
        }

        self.unlink(station);
        let st = &mut self.stations[station.0];
        st.unloading = None;
        let promoted = st.waiting.pop_front();
        if let Some(next) = promoted {
            fleet.get_mut(next).begin_unloading(now, unloading_minutes)?;
            st.unloading = Some(next);
        }
        st.busy_minutes += now - st.phase_start_ts;
        st.phase_start_ts = now;
        self.relink(station, fleet, now);
        Ok(promoted)
    }
}
