//! Store ports consumed by the engine services.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::models::{
    AdjustmentMap, AdjustmentWrite, ClockAction, ClockEvent, EventId, EventPaymentAssignment,
    NewClockEvent, TimeRange, WorkEventId, WorkerId,
};

use super::StoreError;

/// Append-only, per-worker ordered log of clock actions.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends `event` if the worker's last event is still `expected_last`.
    ///
    /// `expected_last` is `None` when the caller saw an empty stream. A
    /// mismatch fails with [`StoreError::PreconditionFailed`] and nothing is
    /// written. The store assigns the event id and sequence number.
    async fn append(
        &self,
        event: NewClockEvent,
        expected_last: Option<EventId>,
    ) -> Result<ClockEvent, StoreError>;

    /// Returns the worker's events inside `range`, ascending by
    /// `(timestamp, sequence)`.
    async fn query(&self, worker_id: &WorkerId, range: TimeRange)
    -> Result<Vec<ClockEvent>, StoreError>;

    /// Returns the worker's latest event with the given action.
    async fn query_last(
        &self,
        worker_id: &WorkerId,
        action: ClockAction,
    ) -> Result<Option<ClockEvent>, StoreError>;

    /// Returns the worker's latest event of any action.
    async fn last_event(&self, worker_id: &WorkerId) -> Result<Option<ClockEvent>, StoreError>;
}

/// Manual monetary corrections keyed by `(work_event_id, worker_id)`.
#[async_trait]
pub trait AdjustmentLedger: Send + Sync {
    /// Stores `amount` for the key, replacing any previous row. A zero
    /// amount deletes the row instead.
    async fn upsert(
        &self,
        work_event_id: &WorkEventId,
        worker_id: &WorkerId,
        amount: Decimal,
        note: Option<String>,
    ) -> Result<AdjustmentWrite, StoreError>;

    /// Returns every stored amount for the given work events.
    async fn fetch(&self, work_event_ids: &[WorkEventId]) -> Result<AdjustmentMap, StoreError>;
}

/// Supplies the per-event payment figures assigned to each worker.
#[async_trait]
pub trait EventPaymentSource: Send + Sync {
    /// Returns the assignments of the given work events. Unknown events
    /// contribute nothing.
    async fn assignments(
        &self,
        work_event_ids: &[WorkEventId],
    ) -> Result<Vec<EventPaymentAssignment>, StoreError>;
}
