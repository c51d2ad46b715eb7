//! Truck state machine and the fleet arena.
//!
//! Every phase's duration is known the moment the phase begins, so the exit
//! timestamp is precomputed at entry and the per-phase counter is credited up
//! front. Transitions are validated against the current phase; a violation is
//! an internal invariant error, not a recoverable condition.

use std::fmt;

use crate::clock::{Minutes, Timestamp};
use crate::error::SimError;
use crate::stations::StationId;

/// Stable index of a truck in the fleet arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TruckId(pub usize);

impl fmt::Display for TruckId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "truck-{}", self.0)
    }
}

/// A truck's current activity.
///
/// Legal cycle:
///
/// ```text
/// Mining -> Driving ----------> Unloading ---> Mining
///             |                     ^
///             v                     |
///           Waiting -----------------
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Mining,
    Driving,
    Waiting,
    Unloading,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Mining, Phase::Driving, Phase::Waiting, Phase::Unloading];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Mining => "Mining",
            Phase::Driving => "Driving",
            Phase::Waiting => "Waiting",
            Phase::Unloading => "Unloading",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One truck within the simulation.
#[derive(Debug, Clone)]
pub struct Truck {
    id: TruckId,
    phase: Phase,
    phase_entry_ts: Timestamp,
    phase_exit_ts: Timestamp,
    /// `None` exactly while Mining; otherwise the station assigned for this
    /// round of unloading.
    assigned_station: Option<StationId>,
    /// Cumulative time spent in each phase, indexed by [Phase::index].
    phase_durations: [Minutes; Phase::ALL.len()],
}

impl Truck {
    /// Trucks start off as if they have just finished unloading and are about
    /// to begin mining.
    pub(crate) fn new(id: TruckId) -> Self {
        Self {
            id,
            phase: Phase::Unloading,
            phase_entry_ts: 0,
            phase_exit_ts: 0,
            assigned_station: None,
            phase_durations: [0; Phase::ALL.len()],
        }
    }

    pub(crate) fn with_state(
        id: TruckId,
        phase: Phase,
        phase_entry_ts: Timestamp,
        phase_exit_ts: Timestamp,
        assigned_station: Option<StationId>,
    ) -> Self {
        Self {
            id,
            phase,
            phase_entry_ts,
            phase_exit_ts,
            assigned_station,
            phase_durations: [0; Phase::ALL.len()],
        }
    }

    pub fn id(&self) -> TruckId {
        self.id
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn assigned_station(&self) -> Option<StationId> {
        self.assigned_station
    }

    pub fn phase_entry_ts(&self) -> Timestamp {
        self.phase_entry_ts
    }

    pub fn phase_exit_ts(&self) -> Timestamp {
        self.phase_exit_ts
    }

    /// Cumulative time spent in each phase so far, indexed by [Phase::index].
    pub fn phase_durations(&self) -> &[Minutes; Phase::ALL.len()] {
        &self.phase_durations
    }

    fn enter(&mut self, phase: Phase, now: Timestamp, exit: Timestamp) {
        debug_assert!(exit >= now, "phase exit must not precede its entry");
        self.phase = phase;
        self.phase_entry_ts = now;
        self.phase_exit_ts = exit;
        self.phase_durations[phase.index()] += exit - now;
    }

    /// Head back to the mine. `end` is drawn by the caller, since mining is
    /// the one phase with a random duration.
    pub fn begin_mining(&mut self, now: Timestamp, end: Timestamp) -> Result<(), SimError> {
        if self.phase != Phase::Unloading {
            return Err(SimError::PhaseConflict {
                truck: self.id,
                expected: Phase::Unloading.label(),
                actual: self.phase,
                at: now,
            });
        }
        self.assigned_station = None;
        self.enter(Phase::Mining, now, end);
        Ok(())
    }

    /// Drive towards the assigned unloading station.
    pub fn depart_for_station(
        &mut self,
        now: Timestamp,
        station: StationId,
        driving_minutes: Minutes,
    ) -> Result<(), SimError> {
        if self.phase != Phase::Mining {
            return Err(SimError::PhaseConflict {
                truck: self.id,
                expected: Phase::Mining.label(),
                actual: self.phase,
                at: now,
            });
        }
        if self.assigned_station.is_some() {
            return Err(SimError::StationAlreadyAssigned {
                truck: self.id,
                at: now,
            });
        }
        self.assigned_station = Some(station);
        self.enter(Phase::Driving, now, now + driving_minutes);
        Ok(())
    }

    /// Occupy the station's unloading slot, either straight off the road or
    /// after waiting in the queue.
    pub fn begin_unloading(
        &mut self,
        now: Timestamp,
        unloading_minutes: Minutes,
    ) -> Result<(), SimError> {
        if !matches!(self.phase, Phase::Driving | Phase::Waiting) {
            return Err(SimError::PhaseConflict {
                truck: self.id,
                expected: "Driving or Waiting",
                actual: self.phase,
                at: now,
            });
        }
        if self.assigned_station.is_none() {
            return Err(SimError::NoAssignedStation {
                truck: self.id,
                at: now,
            });
        }
        self.enter(Phase::Unloading, now, now + unloading_minutes);
        Ok(())
    }

    /// Queue up at the assigned station. `ready_at` is when the backlog ahead
    /// of this truck clears: the unloading truck's exit plus one unloading
    /// slot per truck already waiting ahead.
    pub fn begin_waiting(&mut self, now: Timestamp, ready_at: Timestamp) -> Result<(), SimError> {
        if self.phase != Phase::Driving {
            return Err(SimError::PhaseConflict {
                truck: self.id,
                expected: Phase::Driving.label(),
                actual: self.phase,
                at: now,
            });
        }
        if self.assigned_station.is_none() {
            return Err(SimError::NoAssignedStation {
                truck: self.id,
                at: now,
            });
        }
        self.enter(Phase::Waiting, now, ready_at);
        Ok(())
    }
}

/// Index-stable arena holding every truck in the simulation. All
/// cross-references between entities are [TruckId]/[crate::stations::StationId]
/// indices resolved through the arenas.
#[derive(Debug)]
pub struct TruckFleet {
    trucks: Vec<Truck>,
}

impl TruckFleet {
    pub fn new(count: usize) -> Self {
        Self {
            trucks: (0..count).map(|i| Truck::new(TruckId(i))).collect(),
        }
    }

    pub(crate) fn from_trucks(trucks: Vec<Truck>) -> Self {
        debug_assert!(
            trucks.iter().enumerate().all(|(i, t)| t.id() == TruckId(i)),
            "truck ids must match their arena index"
        );
        Self { trucks }
    }

    pub fn len(&self) -> usize {
        self.trucks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trucks.is_empty()
    }

    pub fn get(&self, id: TruckId) -> &Truck {
        &self.trucks[id.0]
    }

    pub fn get_mut(&mut self, id: TruckId) -> &mut Truck {
        &mut self.trucks[id.0]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Truck> + '_ {
        self.trucks.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::truck_in_phase;

    #[test]
    fn truck_lifecycle_accumulates_phase_durations() {
        let st = StationId(1);
        let mut truck = Truck::new(TruckId(1));
        assert_eq!(truck.phase(), Phase::Unloading);

        let mut ts = 10;
        truck.begin_mining(ts, ts + 114).unwrap();
        assert_eq!(truck.phase(), Phase::Mining);
        assert_eq!(truck.assigned_station(), None);
        assert_eq!(truck.phase_entry_ts(), ts);
        assert_eq!(truck.phase_exit_ts(), ts + 114);

        ts += 114;
        truck.depart_for_station(ts, st, 30).unwrap();
        assert_eq!(truck.phase(), Phase::Driving);
        assert_eq!(truck.assigned_station(), Some(st));
        assert_eq!(truck.phase_entry_ts(), ts);
        assert_eq!(truck.phase_exit_ts(), ts + 30);

        ts += 30;
        truck.begin_unloading(ts, 5).unwrap();
        assert_eq!(truck.phase(), Phase::Unloading);
        assert_eq!(truck.assigned_station(), Some(st));
        assert_eq!(truck.phase_exit_ts(), ts + 5);

        ts += 5;
        truck.begin_mining(ts, ts + 219).unwrap();
        ts += 219;
        truck.depart_for_station(ts, st, 30).unwrap();
        ts += 30;

        // This round the station is backed up: the in-progress unloading
        // finishes in 2 minutes and one truck is already waiting ahead.
        truck.begin_waiting(ts, ts + 2 + 5).unwrap();
        assert_eq!(truck.phase(), Phase::Waiting);
        assert_eq!(truck.phase_exit_ts(), ts + 7);

        let stats = truck.phase_durations();
        assert_eq!(stats[Phase::Mining.index()], 114 + 219);
        assert_eq!(stats[Phase::Driving.index()], 30 + 30);
        assert_eq!(stats[Phase::Waiting.index()], 7);
        assert_eq!(stats[Phase::Unloading.index()], 5);
    }

    #[test]
    fn transitions_outside_the_legal_cycle_are_rejected() {
        let mut truck = Truck::new(TruckId(0));
        truck.begin_mining(0, 100).unwrap();

        assert_eq!(
            truck.begin_mining(100, 200),
            Err(SimError::PhaseConflict {
                truck: TruckId(0),
                expected: "Unloading",
                actual: Phase::Mining,
                at: 100,
            })
        );
        assert_eq!(
            truck.begin_waiting(100, 110),
            Err(SimError::PhaseConflict {
                truck: TruckId(0),
                expected: "Driving",
                actual: Phase::Mining,
                at: 100,
            })
        );

        truck.depart_for_station(100, StationId(0), 30).unwrap();
        assert_eq!(
            truck.depart_for_station(130, StationId(1), 30),
            Err(SimError::PhaseConflict {
                truck: TruckId(0),
                expected: "Mining",
                actual: Phase::Driving,
                at: 130,
            })
        );
    }

    #[test]
    fn unloading_without_an_assigned_station_is_rejected() {
        // An intentionally inconsistent state: driving with no assignment.
        let mut truck = truck_in_phase(3, Phase::Driving, 0, 30, None);
        assert_eq!(
            truck.begin_unloading(30, 5),
            Err(SimError::NoAssignedStation {
                truck: TruckId(3),
                at: 30,
            })
        );
    }
}
