//! Payment adjustment model.
//!
//! Adjustments are manual signed monetary corrections keyed by
//! `(work_event_id, worker_id)`. A zero amount is never stored.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{WorkEventId, WorkerId};

/// A stored adjustment row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentAdjustment {
    /// The work event the adjustment applies to.
    pub work_event_id: WorkEventId,
    /// The worker whose pay is adjusted.
    pub worker_id: WorkerId,
    /// Signed correction; never zero for a stored row.
    pub amount: Decimal,
    /// Why the adjustment was made.
    #[serde(default)]
    pub note: Option<String>,
    /// When the row was last written.
    pub updated_at: DateTime<Utc>,
}

/// The outcome of an adjustment upsert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum AdjustmentWrite {
    /// A non-zero amount was stored, replacing any previous row.
    Stored {
        /// The row as stored.
        adjustment: PaymentAdjustment,
    },
    /// A zero amount removed the row (or there was nothing to remove).
    Cleared {
        /// True if a row existed and was deleted.
        removed: bool,
    },
}

/// Adjustment amounts by work event, then worker. Absent entries mean zero.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AdjustmentMap(BTreeMap<WorkEventId, BTreeMap<WorkerId, Decimal>>);

impl AdjustmentMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `amount` for a key. Zero amounts are not recorded.
    pub fn insert(&mut self, work_event_id: WorkEventId, worker_id: WorkerId, amount: Decimal) {
        if amount.is_zero() {
            return;
        }
        self.0
            .entry(work_event_id)
            .or_default()
            .insert(worker_id, amount);
    }

    /// Returns the stored amount for a key, if any.
    pub fn get(&self, work_event_id: &WorkEventId, worker_id: &WorkerId) -> Option<Decimal> {
        self.0
            .get(work_event_id)
            .and_then(|workers| workers.get(worker_id))
            .copied()
    }

    /// Returns the amount for a key, defaulting to zero.
    pub fn amount_for(&self, work_event_id: &WorkEventId, worker_id: &WorkerId) -> Decimal {
        self.get(work_event_id, worker_id).unwrap_or(Decimal::ZERO)
    }

    /// Returns the number of stored entries.
    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    /// Returns true if no adjustments are recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
