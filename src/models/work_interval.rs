//! Work interval and weekly summary models.
//!
//! Work intervals are derived from clock events on demand and are never
//! persisted directly.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{EventId, WorkerId};

const SECONDS_PER_HOUR: i64 = 3600;

/// A `(start, end)` span reconstructed from a clock-in/clock-out pair.
///
/// `ended_at == None` denotes an open session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkInterval {
    /// The worker the interval belongs to.
    pub worker_id: WorkerId,
    /// When the session started.
    pub started_at: DateTime<Utc>,
    /// When the session ended, if it has.
    pub ended_at: Option<DateTime<Utc>>,
    /// The clock events that formed this interval, in stream order.
    pub source_event_ids: Vec<EventId>,
}

impl WorkInterval {
    /// Returns true if the session has not been closed yet.
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }

    /// Returns the worked hours of a closed interval, or `None` if open.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::models::{WorkInterval, WorkerId};
    /// use chrono::{TimeZone, Utc};
    /// use rust_decimal::Decimal;
    ///
    /// let interval = WorkInterval {
    ///     worker_id: WorkerId::new("w-001"),
    ///     started_at: Utc.with_ymd_and_hms(2025, 1, 14, 14, 0, 0).unwrap(),
    ///     ended_at: Some(Utc.with_ymd_and_hms(2025, 1, 14, 17, 30, 0).unwrap()),
    ///     source_event_ids: vec![],
    /// };
    /// assert_eq!(interval.hours(), Some(Decimal::new(35, 1)));
    /// ```
    pub fn hours(&self) -> Option<Decimal> {
        self.worked_seconds().map(hours_from_seconds)
    }

    /// Returns the worked whole seconds of a closed interval, or `None` if
    /// open.
    pub fn worked_seconds(&self) -> Option<i64> {
        self.ended_at
            .map(|ended_at| (ended_at - self.started_at).num_seconds())
    }

    /// Returns true if the interval is closed and lies entirely in
    /// `[window_start, window_end)`.
    pub fn closed_within(&self, window_start: DateTime<Utc>, window_end: DateTime<Utc>) -> bool {
        match self.ended_at {
            Some(ended_at) => self.started_at >= window_start && ended_at < window_end,
            None => false,
        }
    }
}

/// Returns the total hours of the closed intervals; open ones count zero.
///
/// Seconds are summed first and converted to hours once.
pub fn total_hours<'a, I>(intervals: I) -> Decimal
where
    I: IntoIterator<Item = &'a WorkInterval>,
{
    let seconds = intervals
        .into_iter()
        .filter_map(WorkInterval::worked_seconds)
        .fold(0i64, i64::saturating_add);
    hours_from_seconds(seconds)
}

fn hours_from_seconds(seconds: i64) -> Decimal {
    Decimal::from(seconds) / Decimal::from(SECONDS_PER_HOUR)
}

/// Prior-week hours accumulated for one worker up to a cutoff instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklyHourSummary {
    /// The worker the hours belong to.
    pub worker_id: WorkerId,
    /// Monday (UTC) of the ISO week being accumulated.
    pub week_anchor: NaiveDate,
    /// Exclusive upper bound of the accumulation window.
    pub cutoff_instant: DateTime<Utc>,
    /// Sum of the closed interval hours inside the window.
    pub accumulated_hours: Decimal,
}
