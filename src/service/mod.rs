//! Engine services.
//!
//! Services sit between the HTTP surface and the store ports. They validate
//! input, call the pure calculation functions and convert store failures into
//! [`EngineError`]s.

mod adjustments;
mod clock;
mod payroll;
mod weekly;

pub use adjustments::AdjustmentService;
pub use clock::{ClockRequest, ClockService, SessionState};
pub use payroll::{PayrollRun, PayrollRunRequest, PayrollRunner};
pub use weekly::{WeeklyAccumulator, WeeklyHoursReport, WeeklyHoursRequest};

use crate::error::{EngineError, EngineResult};
use crate::models::{WorkEventId, WorkerId};

pub(crate) const EVENT_STORE: &str = "event_store";
pub(crate) const ADJUSTMENT_LEDGER: &str = "adjustment_ledger";
pub(crate) const EVENT_PAYMENT_SOURCE: &str = "event_payment_source";

pub(crate) fn require_worker_id(field: &str, worker_id: &WorkerId) -> EngineResult<()> {
    if worker_id.is_blank() {
        return Err(EngineError::validation(field, "worker id must not be empty"));
    }
    Ok(())
}

pub(crate) fn require_work_event_id(field: &str, work_event_id: &WorkEventId) -> EngineResult<()> {
    if work_event_id.is_blank() {
        return Err(EngineError::validation(
            field,
            "work event id must not be empty",
        ));
    }
    Ok(())
}
