//! Adjustment ledger access with input validation.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::info;

use crate::error::{EngineError, EngineResult};
use crate::models::{AdjustmentMap, AdjustmentWrite, WorkEventId, WorkerId};
use crate::store::AdjustmentLedger;

use super::{ADJUSTMENT_LEDGER, require_work_event_id, require_worker_id};

/// Writes and reads manual payment adjustments.
pub struct AdjustmentService {
    ledger: Arc<dyn AdjustmentLedger>,
}

impl AdjustmentService {
    /// Creates a service over `ledger`.
    pub fn new(ledger: Arc<dyn AdjustmentLedger>) -> Self {
        Self { ledger }
    }

    /// Sets the adjustment for a key. A zero amount removes it.
    ///
    /// Amounts are rounded to cents before they are stored, so an amount
    /// that rounds to zero also removes the row.
    pub async fn upsert(
        &self,
        work_event_id: &WorkEventId,
        worker_id: &WorkerId,
        amount: Decimal,
        note: Option<String>,
    ) -> EngineResult<AdjustmentWrite> {
        require_work_event_id("work_event_id", work_event_id)?;
        require_worker_id("worker_id", worker_id)?;

        let amount = amount
            .round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
            .normalize();
        let note = note.filter(|note| !note.trim().is_empty());

        let write = self
            .ledger
            .upsert(work_event_id, worker_id, amount, note)
            .await
            .map_err(|e| EngineError::upstream(ADJUSTMENT_LEDGER, e))?;

        match &write {
            AdjustmentWrite::Stored { adjustment } => info!(
                work_event_id = %work_event_id,
                worker_id = %worker_id,
                amount = %adjustment.amount,
                "Adjustment stored"
            ),
            AdjustmentWrite::Cleared { removed } => info!(
                work_event_id = %work_event_id,
                worker_id = %worker_id,
                removed,
                "Adjustment cleared"
            ),
        }

        Ok(write)
    }

    /// Returns the adjustments recorded for `work_event_ids`.
    pub async fn fetch(&self, work_event_ids: &[WorkEventId]) -> EngineResult<AdjustmentMap> {
        if work_event_ids.is_empty() {
            return Err(EngineError::validation(
                "work_event_ids",
                "at least one work event id is required",
            ));
        }
        for work_event_id in work_event_ids {
            require_work_event_id("work_event_ids", work_event_id)?;
        }

        self.ledger
            .fetch(work_event_ids)
            .await
            .map_err(|e| EngineError::upstream(ADJUSTMENT_LEDGER, e))
    }
}
