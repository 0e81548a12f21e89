//! In-memory store adapters.
//!
//! These back the bundled server and the test suite. Each adapter guards its
//! state with a single `parking_lot` lock, so every operation is atomic.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::models::{
    AdjustmentMap, AdjustmentWrite, ClockAction, ClockEvent, EventId, EventPaymentAssignment,
    NewClockEvent, PaymentAdjustment, TimeRange, WorkEventId, WorkerId,
};

use super::{
    AdjustmentLedger, DefaultClock, EventPaymentSource, EventStore, LastEvent, SharedClock,
    StoreError,
};

#[derive(Debug, Default)]
struct EventLog {
    streams: HashMap<WorkerId, Vec<ClockEvent>>,
    next_sequence: u64,
}

impl EventLog {
    /// Inserts keeping each stream sorted by `(timestamp, sequence)`.
    fn insert(&mut self, event: NewClockEvent) -> ClockEvent {
        self.next_sequence += 1;
        let event = ClockEvent {
            id: EventId::new_v4(),
            sequence: self.next_sequence,
            worker_id: event.worker_id,
            action: event.action,
            timestamp: event.timestamp,
            division: event.division,
            notes: event.notes,
        };

        let stream = self.streams.entry(event.worker_id.clone()).or_default();
        let key = event.ordering_key();
        let position = stream.partition_point(|existing| existing.ordering_key() <= key);
        stream.insert(position, event.clone());
        event
    }
}

/// Event store holding every stream in process memory.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    log: RwLock<EventLog>,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends without a precondition, for loading existing history.
    pub fn import(&self, event: NewClockEvent) -> ClockEvent {
        self.log.write().insert(event)
    }

    /// Returns the number of stored events across all workers.
    pub fn len(&self) -> usize {
        self.log.read().streams.values().map(Vec::len).sum()
    }

    /// Returns true if no events are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(
        &self,
        event: NewClockEvent,
        expected_last: Option<EventId>,
    ) -> Result<ClockEvent, StoreError> {
        let mut log = self.log.write();
        let actual = log
            .streams
            .get(&event.worker_id)
            .and_then(|stream| stream.last())
            .map(|last| last.id);

        if actual != expected_last {
            return Err(StoreError::PreconditionFailed {
                worker_id: event.worker_id,
                expected: LastEvent(expected_last),
                actual: LastEvent(actual),
            });
        }

        Ok(log.insert(event))
    }

    async fn query(
        &self,
        worker_id: &WorkerId,
        range: TimeRange,
    ) -> Result<Vec<ClockEvent>, StoreError> {
        let log = self.log.read();
        Ok(log
            .streams
            .get(worker_id)
            .map(|stream| {
                stream
                    .iter()
                    .filter(|event| range.contains(event.timestamp))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn query_last(
        &self,
        worker_id: &WorkerId,
        action: ClockAction,
    ) -> Result<Option<ClockEvent>, StoreError> {
        let log = self.log.read();
        Ok(log.streams.get(worker_id).and_then(|stream| {
            stream
                .iter()
                .rev()
                .find(|event| event.action == action)
                .cloned()
        }))
    }

    async fn last_event(&self, worker_id: &WorkerId) -> Result<Option<ClockEvent>, StoreError> {
        let log = self.log.read();
        Ok(log
            .streams
            .get(worker_id)
            .and_then(|stream| stream.last())
            .cloned())
    }
}

/// Adjustment ledger holding rows in process memory.
pub struct InMemoryAdjustmentLedger {
    rows: RwLock<BTreeMap<(WorkEventId, WorkerId), PaymentAdjustment>>,
    clock: SharedClock,
}

impl InMemoryAdjustmentLedger {
    /// Creates an empty ledger stamping rows with `clock`.
    pub fn new(clock: SharedClock) -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            clock,
        }
    }

    /// Returns the stored row for a key, if any.
    pub fn row(&self, work_event_id: &WorkEventId, worker_id: &WorkerId) -> Option<PaymentAdjustment> {
        self.rows
            .read()
            .get(&(work_event_id.clone(), worker_id.clone()))
            .cloned()
    }

    /// Returns the number of stored rows.
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Returns true if no rows are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryAdjustmentLedger {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

#[async_trait]
impl AdjustmentLedger for InMemoryAdjustmentLedger {
    async fn upsert(
        &self,
        work_event_id: &WorkEventId,
        worker_id: &WorkerId,
        amount: Decimal,
        note: Option<String>,
    ) -> Result<AdjustmentWrite, StoreError> {
        let key = (work_event_id.clone(), worker_id.clone());
        let mut rows = self.rows.write();

        if amount.is_zero() {
            let removed = rows.remove(&key).is_some();
            return Ok(AdjustmentWrite::Cleared { removed });
        }

        let adjustment = PaymentAdjustment {
            work_event_id: work_event_id.clone(),
            worker_id: worker_id.clone(),
            amount,
            note,
            updated_at: self.clock.utc(),
        };
        rows.insert(key, adjustment.clone());
        Ok(AdjustmentWrite::Stored { adjustment })
    }

    async fn fetch(&self, work_event_ids: &[WorkEventId]) -> Result<AdjustmentMap, StoreError> {
        let rows = self.rows.read();
        let mut map = AdjustmentMap::new();
        for ((work_event_id, worker_id), row) in rows.iter() {
            if work_event_ids.contains(work_event_id) {
                map.insert(work_event_id.clone(), worker_id.clone(), row.amount);
            }
        }
        Ok(map)
    }
}

/// Event payment source holding assignments in process memory.
#[derive(Debug, Default)]
pub struct InMemoryEventPaymentSource {
    assignments: RwLock<BTreeMap<WorkEventId, Vec<EventPaymentAssignment>>>,
}

impl InMemoryEventPaymentSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an assignment, replacing the worker's previous assignment to
    /// the same work event.
    pub fn insert(&self, assignment: EventPaymentAssignment) {
        let mut assignments = self.assignments.write();
        let event = assignments
            .entry(assignment.work_event_id.clone())
            .or_default();
        event.retain(|existing| existing.worker_id != assignment.worker_id);
        event.push(assignment);
    }
}

#[async_trait]
impl EventPaymentSource for InMemoryEventPaymentSource {
    async fn assignments(
        &self,
        work_event_ids: &[WorkEventId],
    ) -> Result<Vec<EventPaymentAssignment>, StoreError> {
        let assignments = self.assignments.read();
        Ok(work_event_ids
            .iter()
            .filter_map(|id| assignments.get(id))
            .flatten()
            .cloned()
            .collect())
    }
}
