//! Request types for the payroll engine API.
//!
//! Clock actions and payroll runs reuse the service request types directly;
//! this module holds the bodies and query strings that only exist at the
//! HTTP edge.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{TimeRange, WorkEventId, WorkerId};
use crate::service::WeeklyHoursRequest;

/// Request body for `POST /weekly-hours`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeeklyHoursBody {
    /// The batch entries.
    pub entries: Vec<WeeklyHoursRequest>,
}

/// Request body for `PUT /adjustments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentUpsertRequest {
    /// The work event the adjustment applies to.
    pub work_event_id: WorkEventId,
    /// The worker whose pay is adjusted.
    pub worker_id: WorkerId,
    /// Signed amount; zero removes the adjustment.
    pub amount: Decimal,
    /// Why the adjustment was made.
    #[serde(default)]
    pub note: Option<String>,
}

/// Request body for `POST /adjustments/query`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdjustmentQueryRequest {
    /// Work events to read adjustments for.
    pub work_event_ids: Vec<WorkEventId>,
}

/// Query string for `GET /workers/:worker_id/intervals`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IntervalsQuery {
    /// Inclusive lower bound (RFC 3339).
    #[serde(default)]
    pub from: Option<DateTime<Utc>>,
    /// Exclusive upper bound (RFC 3339).
    #[serde(default)]
    pub to: Option<DateTime<Utc>>,
}

impl From<IntervalsQuery> for TimeRange {
    fn from(query: IntervalsQuery) -> Self {
        TimeRange {
            start: query.from,
            end: query.to,
        }
    }
}
