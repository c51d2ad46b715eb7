//! Error type for the simulation engine.
//!
//! `SimError` carries one externally-triggered configuration variant; every
//! other variant is an internal invariant violation carrying the offending
//! entity id, the expected versus actual state, and the timestamp at which
//! the inconsistency was detected.

use thiserror::Error;

use crate::clock::Timestamp;
use crate::stations::StationId;
use crate::trucks::{Phase, TruckId};

/// Errors produced by the simulation engine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SimError {
    /// Invalid scenario configuration: both counts must be at least one.
    #[error("invalid configuration: {trucks} trucks, {stations} stations")]
    Config { trucks: usize, stations: usize },

    /// A truck was asked to make a transition illegal for its current phase.
    #[error("phase conflict for {truck}: expected {expected}, found {actual} at {at}")]
    PhaseConflict {
        truck: TruckId,
        expected: &'static str,
        actual: Phase,
        at: Timestamp,
    },

    /// A truck tried to take a second station assignment while still holding one.
    #[error("{truck} already assigned to a station at {at}")]
    StationAlreadyAssigned { truck: TruckId, at: Timestamp },

    /// A truck needed an assigned station but had none.
    #[error("{truck} has no assigned station at {at}")]
    NoAssignedStation { truck: TruckId, at: Timestamp },

    /// An arrival's assigned station disagreed with where it arrived.
    #[error("{truck} assignment mismatch: expected {expected}, found {actual:?} at {at}")]
    AssignmentMismatch {
        truck: TruckId,
        expected: StationId,
        actual: Option<StationId>,
        at: Timestamp,
    },

    /// Dispatch was attempted with no stations in the directory.
    #[error("station directory is empty at {at}")]
    EmptyDirectory { at: Timestamp },

    /// An arrival was processed for a station with an empty arriving queue.
    #[error("{station} has an empty arriving queue at {at}")]
    EmptyArrivingQueue { station: StationId, at: Timestamp },

    /// The front of the arriving queue was not the truck being processed.
    #[error("{station} arrival order violation: expected {expected}, found {actual} at {at}")]
    ArrivalOrderViolation {
        station: StationId,
        expected: TruckId,
        actual: TruckId,
        at: Timestamp,
    },

    /// An unloading completion was processed for a station with no occupant.
    #[error("{station} has an empty unloading slot at {at}")]
    EmptyUnloadingSlot { station: StationId, at: Timestamp },

    /// The station's unloading slot held a different truck than expected.
    #[error("{station} unloading slot mismatch: expected {expected}, found {actual} at {at}")]
    UnloadingSlotMismatch {
        station: StationId,
        expected: TruckId,
        actual: TruckId,
        at: Timestamp,
    },
}
