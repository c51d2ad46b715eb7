//! Event queue and logical clock.
//!
//! Pending events are dispatched in strict timestamp order, with ties broken
//! FIFO by insertion sequence, so a run is reproducible event for event. The
//! clock only advances when an event fires, and it advances *before* the
//! event's handler is invoked.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::error::SimError;
use crate::stations::StationId;
use crate::trucks::TruckId;

/// Simulated timepoint, in minutes since the start of the run.
pub type Timestamp = u64;
/// Simulated duration, in minutes.
pub type Minutes = u64;

/// What happens at an event's timestamp. Events carry no logic; the timer
/// service knows the handler for each kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    MiningFinished { truck: TruckId },
    ArrivedAtStation { truck: TruckId, station: StationId },
    UnloadingFinished { truck: TruckId, station: StationId },
}

/// A scheduled occurrence. Immutable once scheduled; nothing is ever removed
/// from the queue except by dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub timestamp: Timestamp,
    pub kind: EventKind,
}

/// The three handler operations the timer service dispatches into. The
/// simulation coordinator implements this; tests can supply a recording
/// implementation to observe dispatch without any handler logic running.
///
/// A handler returns the follow-up events its transition implies; the timer
/// service schedules them before `dispatch_next` returns.
pub trait EventHandlers {
    fn on_mining_finished(&mut self, now: Timestamp, truck: TruckId)
        -> Result<Vec<Event>, SimError>;

    fn on_arrived_at_station(
        &mut self,
        now: Timestamp,
        truck: TruckId,
        station: StationId,
    ) -> Result<Vec<Event>, SimError>;

    fn on_unloading_finished(
        &mut self,
        now: Timestamp,
        truck: TruckId,
        station: StationId,
    ) -> Result<Vec<Event>, SimError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct QueuedEvent {
    event: Event,
    seq: u64,
}

impl Ord for QueuedEvent {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering to make BinaryHeap a min-heap by (timestamp, seq).
        other
            .event
            .timestamp
            .cmp(&self.event.timestamp)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Schedules events and dispatches them in timestamp order.
#[derive(Debug, Default)]
pub struct TimerService {
    now: Timestamp,
    next_seq: u64,
    events: BinaryHeap<QueuedEvent>,
}

impl TimerService {
    pub fn now(&self) -> Timestamp {
        self.now
    }

    /// Insert an event keyed by its timestamp. Callers must not schedule in
    /// the past relative to the current clock.
    pub fn schedule(&mut self, event: Event) {
        debug_assert!(
            event.timestamp >= self.now,
            "event timestamp must be >= current time"
        );
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(QueuedEvent { event, seq });
    }

    /// Remove the earliest pending event, advance the clock to its timestamp,
    /// invoke its handler, and schedule whatever follow-up events the handler
    /// produced. Returns the dispatched event, or `None` once the queue is
    /// empty. Runs to completion; there is no suspension point.
    pub fn dispatch_next(
        &mut self,
        handlers: &mut dyn EventHandlers,
    ) -> Result<Option<Event>, SimError> {
        let Some(queued) = self.events.pop() else {
            return Ok(None);
        };
        let event = queued.event;
        self.now = event.timestamp;
        let follow_ups = match event.kind {
            EventKind::MiningFinished { truck } => handlers.on_mining_finished(self.now, truck)?,
            EventKind::ArrivedAtStation { truck, station } => {
                handlers.on_arrived_at_station(self.now, truck, station)?
            }
            EventKind::UnloadingFinished { truck, station } => {
                handlers.on_unloading_finished(self.now, truck, station)?
            }
        };
        for follow_up in follow_ups {
            self.schedule(follow_up);
        }
        Ok(Some(event))
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
