//! Payroll runs.
//!
//! A run gathers the payment assignments of the requested work events, reads
//! prior-week hours for every assigned worker once, then computes each
//! payment from that snapshot. The calculation step never goes back to the
//! event store.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::calculation::{CommissionPolicy, PriorWeekWindow, calculate_payment, classify_hours};
use crate::config::TierThresholds;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AdjustmentMap, EventPaymentAssignment, PaymentInput, WorkEventId, WorkerId, WorkerPayment,
};
use crate::store::{AdjustmentLedger, EventPaymentSource};

use super::{
    ADJUSTMENT_LEDGER, EVENT_PAYMENT_SOURCE, WeeklyAccumulator, WeeklyHoursReport,
    WeeklyHoursRequest, require_work_event_id, require_worker_id,
};

/// What a payroll run should pay.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRunRequest {
    /// Work events whose assignments are loaded from the event payment source.
    #[serde(default)]
    pub work_event_ids: Vec<WorkEventId>,
    /// Assignments supplied directly by the caller.
    #[serde(default)]
    pub assignments: Vec<EventPaymentAssignment>,
}

/// The output of one payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayrollRun {
    /// Identifies the run in logs.
    pub run_id: Uuid,
    /// One payment per `(work_event, worker)`, ordered by key.
    pub payments: Vec<WorkerPayment>,
    /// Sum of every payment's total.
    pub total_pay: Decimal,
}

/// Computes payments for batches of work events.
pub struct PayrollRunner {
    accumulator: Arc<WeeklyAccumulator>,
    ledger: Arc<dyn AdjustmentLedger>,
    source: Arc<dyn EventPaymentSource>,
    tiers: TierThresholds,
    commission: Arc<dyn CommissionPolicy>,
}

impl PayrollRunner {
    /// Creates a runner.
    pub fn new(
        accumulator: Arc<WeeklyAccumulator>,
        ledger: Arc<dyn AdjustmentLedger>,
        source: Arc<dyn EventPaymentSource>,
        tiers: TierThresholds,
        commission: Arc<dyn CommissionPolicy>,
    ) -> Self {
        Self {
            accumulator,
            ledger,
            source,
            tiers,
            commission,
        }
    }

    /// Executes a payroll run.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] when nothing is requested, an id
    /// is blank, a `(work_event, worker)` pair is assigned twice or a payment
    /// input is invalid. Collaborator failures return
    /// [`EngineError::Upstream`].
    pub async fn run(&self, request: PayrollRunRequest) -> EngineResult<PayrollRun> {
        let started = Instant::now();
        let run_id = Uuid::new_v4();

        let assignments = self.collect_assignments(request).await?;
        if assignments.is_empty() {
            return Ok(PayrollRun {
                run_id,
                payments: Vec::new(),
                total_pay: Decimal::ZERO,
            });
        }

        let snapshot = self.accumulator.accumulate(&weekly_batch(&assignments)).await?;

        let work_event_ids: Vec<WorkEventId> = assignments
            .iter()
            .map(|assignment| assignment.work_event_id.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let adjustments = self
            .ledger
            .fetch(&work_event_ids)
            .await
            .map_err(|e| EngineError::upstream(ADJUSTMENT_LEDGER, e))?;

        let payments = self.calculate(&assignments, &snapshot, &adjustments)?;
        let total_pay: Decimal = payments
            .iter()
            .map(|payment| payment.calculation.summary.total_pay)
            .sum();

        info!(
            run_id = %run_id,
            work_events = work_event_ids.len(),
            payments = payments.len(),
            total_pay = %total_pay,
            duration_ms = started.elapsed().as_millis() as u64,
            "Payroll run completed"
        );

        Ok(PayrollRun {
            run_id,
            payments,
            total_pay,
        })
    }

    /// Computes payments from an already-read hours snapshot.
    fn calculate(
        &self,
        assignments: &[EventPaymentAssignment],
        snapshot: &WeeklyHoursReport,
        adjustments: &AdjustmentMap,
    ) -> EngineResult<Vec<WorkerPayment>> {
        assignments
            .iter()
            .map(|assignment| -> EngineResult<WorkerPayment> {
                let prior_week_hours =
                    snapshot.hours_for(&assignment.work_event_id, &assignment.worker_id);

                let (hours, classification_step) = match assignment.hours {
                    Some(hours) => (hours, None),
                    None => {
                        let classified = classify_hours(
                            prior_week_hours,
                            assignment.event_hours,
                            &self.tiers,
                            1,
                        )?;
                        (classified.hours, Some(classified.audit_step))
                    }
                };

                let input = PaymentInput {
                    hours,
                    base_rate: assignment.base_rate,
                    commission: assignment.commission,
                    tips: assignment.tips,
                    adjustment: adjustments
                        .amount_for(&assignment.work_event_id, &assignment.worker_id),
                    division: assignment.division.clone(),
                };

                let first_step = if classification_step.is_some() { 2 } else { 1 };
                let mut calculation = calculate_payment(&input, self.commission.as_ref(), first_step)?;
                if let Some(step) = classification_step {
                    calculation.audit_steps.insert(0, step);
                }

                Ok(WorkerPayment {
                    work_event_id: assignment.work_event_id.clone(),
                    worker_id: assignment.worker_id.clone(),
                    prior_week_hours,
                    hours,
                    calculation,
                })
            })
            .collect()
    }

    async fn collect_assignments(
        &self,
        request: PayrollRunRequest,
    ) -> EngineResult<Vec<EventPaymentAssignment>> {
        if request.work_event_ids.is_empty() && request.assignments.is_empty() {
            return Err(EngineError::validation(
                "work_event_ids",
                "at least one work event id or assignment is required",
            ));
        }
        for work_event_id in &request.work_event_ids {
            require_work_event_id("work_event_ids", work_event_id)?;
        }

        let mut assignments = if request.work_event_ids.is_empty() {
            Vec::new()
        } else {
            self.source
                .assignments(&request.work_event_ids)
                .await
                .map_err(|e| EngineError::upstream(EVENT_PAYMENT_SOURCE, e))?
        };
        assignments.extend(request.assignments);

        let mut seen: BTreeSet<(WorkEventId, WorkerId)> = BTreeSet::new();
        for (index, assignment) in assignments.iter().enumerate() {
            require_work_event_id(
                &format!("assignments[{}].work_event_id", index),
                &assignment.work_event_id,
            )?;
            require_worker_id(
                &format!("assignments[{}].worker_id", index),
                &assignment.worker_id,
            )?;
            if PriorWeekWindow::for_reference_date(assignment.reference_date).is_none() {
                return Err(EngineError::validation(
                    format!("assignments[{}].reference_date", index),
                    format!(
                        "week of {} starts before the earliest supported date",
                        assignment.reference_date
                    ),
                ));
            }
            if !seen.insert((assignment.work_event_id.clone(), assignment.worker_id.clone())) {
                return Err(EngineError::validation(
                    format!("assignments[{}]", index),
                    format!(
                        "worker '{}' is assigned to work event '{}' more than once",
                        assignment.worker_id, assignment.work_event_id
                    ),
                ));
            }
        }

        assignments.sort_by(|a, b| {
            (&a.work_event_id, &a.worker_id).cmp(&(&b.work_event_id, &b.worker_id))
        });
        Ok(assignments)
    }
}

/// Groups assignments into one weekly batch entry per work event and date.
fn weekly_batch(assignments: &[EventPaymentAssignment]) -> Vec<WeeklyHoursRequest> {
    let mut grouped: BTreeMap<(WorkEventId, NaiveDate), Vec<WorkerId>> = BTreeMap::new();
    for assignment in assignments {
        grouped
            .entry((assignment.work_event_id.clone(), assignment.reference_date))
            .or_default()
            .push(assignment.worker_id.clone());
    }
    grouped
        .into_iter()
        .map(|((work_event_id, reference_date), worker_ids)| WeeklyHoursRequest {
            work_event_id,
            reference_date,
            worker_ids,
        })
        .collect()
}
