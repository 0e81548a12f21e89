//! Weekly hours accumulation.
//!
//! For every requested `(work_event, reference_date, workers)` entry the
//! accumulator sums each worker's closed intervals between the Monday anchor
//! of the reference date's ISO week and the start of the reference date.
//! Store reads are fanned out with a concurrency bound and the results are
//! folded back into one report.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculation::{PriorWeekWindow, reconstruct_sessions};
use crate::config::{AggregationConfig, AggregationFailurePolicy};
use crate::error::{EngineError, EngineResult};
use crate::models::{TimeRange, WeeklyHourSummary, WorkEventId, WorkerId};
use crate::store::{EventStore, StoreError};

use super::{EVENT_STORE, require_work_event_id, require_worker_id};

/// One entry of a weekly hours batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHoursRequest {
    /// The work event the hours are requested for.
    pub work_event_id: WorkEventId,
    /// The date the work event takes place.
    pub reference_date: NaiveDate,
    /// Workers assigned to the event.
    pub worker_ids: Vec<WorkerId>,
}

/// Accumulated prior-week hours for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHoursReport {
    /// Hours by work event, then worker.
    pub hours: BTreeMap<WorkEventId, BTreeMap<WorkerId, Decimal>>,
    /// The per-worker summaries the hours were taken from, by work event.
    pub summaries: BTreeMap<WorkEventId, Vec<WeeklyHourSummary>>,
}

impl WeeklyHoursReport {
    /// Returns the hours for a key; combinations not in the report are zero.
    pub fn hours_for(&self, work_event_id: &WorkEventId, worker_id: &WorkerId) -> Decimal {
        self.hours
            .get(work_event_id)
            .and_then(|workers| workers.get(worker_id))
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

type ReadKey = (WorkerId, NaiveDate);

/// Sums prior-week worked hours for batches of work events.
pub struct WeeklyAccumulator {
    store: Arc<dyn EventStore>,
    config: AggregationConfig,
}

impl WeeklyAccumulator {
    /// Creates an accumulator reading from `store`.
    pub fn new(store: Arc<dyn EventStore>, config: AggregationConfig) -> Self {
        Self { store, config }
    }

    /// Accumulates prior-week hours for every entry of `batch`.
    ///
    /// Entries whose reference date is the Monday anchor contribute zero
    /// without reading the store. A worker appearing under several entries
    /// with the same reference date is read once.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for an empty batch, a blank work
    /// event id, a reference date whose week starts before the earliest
    /// representable date, an entry without workers or a blank worker id. Store
    /// failures return [`EngineError::Upstream`] unless the failure policy is
    /// [`AggregationFailurePolicy::ZeroFill`].
    pub async fn accumulate(&self, batch: &[WeeklyHoursRequest]) -> EngineResult<WeeklyHoursReport> {
        let started = Instant::now();
        let windows = validate_batch(batch)?;

        let mut reads: BTreeMap<ReadKey, PriorWeekWindow> = BTreeMap::new();
        for (entry, window) in batch.iter().zip(&windows) {
            if window.is_empty() {
                continue;
            }
            for worker_id in &entry.worker_ids {
                reads.insert((worker_id.clone(), entry.reference_date), *window);
            }
        }
        let queries = reads.len();

        let results: Vec<(ReadKey, Result<Decimal, StoreError>)> = stream::iter(reads)
            .map(|(key, window)| async move {
                let hours = self.window_hours(&key.0, &window).await;
                (key, hours)
            })
            .buffer_unordered(self.config.max_concurrency.max(1))
            .collect()
            .await;

        let mut accumulated: BTreeMap<ReadKey, Decimal> = BTreeMap::new();
        for ((worker_id, reference_date), result) in results {
            let hours = match result {
                Ok(hours) => hours,
                Err(e) => match self.config.on_worker_failure {
                    AggregationFailurePolicy::Abort => {
                        warn!(
                            worker_id = %worker_id,
                            reference_date = %reference_date,
                            error = %e,
                            "Weekly hours read failed, aborting batch"
                        );
                        return Err(EngineError::upstream(EVENT_STORE, e));
                    }
                    AggregationFailurePolicy::ZeroFill => {
                        warn!(
                            worker_id = %worker_id,
                            reference_date = %reference_date,
                            error = %e,
                            "Weekly hours read failed, counting zero hours"
                        );
                        Decimal::ZERO
                    }
                },
            };
            accumulated.insert((worker_id, reference_date), hours);
        }

        let mut report = WeeklyHoursReport::default();
        for (entry, window) in batch.iter().zip(&windows) {
            let hours = report.hours.entry(entry.work_event_id.clone()).or_default();
            let summaries = report
                .summaries
                .entry(entry.work_event_id.clone())
                .or_default();

            for worker_id in &entry.worker_ids {
                if hours.contains_key(worker_id) {
                    continue;
                }
                let accumulated_hours = accumulated
                    .get(&(worker_id.clone(), entry.reference_date))
                    .copied()
                    .unwrap_or(Decimal::ZERO);
                hours.insert(worker_id.clone(), accumulated_hours);
                summaries.push(WeeklyHourSummary {
                    worker_id: worker_id.clone(),
                    week_anchor: window.week_anchor,
                    cutoff_instant: window.cutoff,
                    accumulated_hours,
                });
            }
        }

        info!(
            entries = batch.len(),
            queries,
            duration_ms = started.elapsed().as_millis() as u64,
            "Weekly hours accumulated"
        );

        Ok(report)
    }

    async fn window_hours(
        &self,
        worker_id: &WorkerId,
        window: &PriorWeekWindow,
    ) -> Result<Decimal, StoreError> {
        let events = self
            .store
            .query(worker_id, TimeRange::between(window.start, window.cutoff))
            .await?;
        let reconstruction = reconstruct_sessions(worker_id, &events);
        Ok(window.closed_hours(&reconstruction))
    }
}

/// Checks the batch and returns the window of every entry, in order.
fn validate_batch(batch: &[WeeklyHoursRequest]) -> EngineResult<Vec<PriorWeekWindow>> {
    if batch.is_empty() {
        return Err(EngineError::validation(
            "entries",
            "at least one entry is required",
        ));
    }
    let mut windows = Vec::with_capacity(batch.len());
    for (index, entry) in batch.iter().enumerate() {
        require_work_event_id(&format!("entries[{}].work_event_id", index), &entry.work_event_id)?;
        let window = PriorWeekWindow::for_reference_date(entry.reference_date).ok_or_else(|| {
            EngineError::validation(
                format!("entries[{}].reference_date", index),
                format!("week of {} starts before the earliest supported date", entry.reference_date),
            )
        })?;
        if entry.worker_ids.is_empty() {
            return Err(EngineError::validation(
                format!("entries[{}].worker_ids", index),
                "at least one worker id is required",
            ));
        }
        for worker_id in &entry.worker_ids {
            require_worker_id(&format!("entries[{}].worker_ids", index), worker_id)?;
        }
        windows.push(window);
    }
    Ok(windows)
}
