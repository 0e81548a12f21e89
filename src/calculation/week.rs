//! Week anchoring and prior-week windows.
//!
//! Prior-week hours are accumulated over `[Monday 00:00Z, reference_date
//! 00:00Z)`. When the reference date is itself the Monday, the window is
//! empty and no events need to be read.

use chrono::{DateTime, Datelike, Days, NaiveDate, Utc};
use rust_decimal::Decimal;

use super::Reconstruction;
use crate::models::total_hours;

/// Returns the Monday of the ISO week containing `date`, or `None` when
/// that Monday precedes the earliest representable date.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::week_anchor;
/// use chrono::NaiveDate;
///
/// let wednesday = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
/// assert_eq!(week_anchor(wednesday), NaiveDate::from_ymd_opt(2025, 1, 13));
/// ```
pub fn week_anchor(date: NaiveDate) -> Option<NaiveDate> {
    let days_from_monday = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(days_from_monday))
}

/// The accumulation window for one reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriorWeekWindow {
    /// Monday of the reference date's ISO week.
    pub week_anchor: NaiveDate,
    /// Inclusive start: `week_anchor` at 00:00Z.
    pub start: DateTime<Utc>,
    /// Exclusive end: `reference_date` at 00:00Z.
    pub cutoff: DateTime<Utc>,
}

impl PriorWeekWindow {
    /// Builds the window for `reference_date`; `None` when the week's
    /// Monday is out of range.
    pub fn for_reference_date(reference_date: NaiveDate) -> Option<Self> {
        let anchor = week_anchor(reference_date)?;
        Some(Self {
            week_anchor: anchor,
            start: midnight_utc(anchor),
            cutoff: midnight_utc(reference_date),
        })
    }

    /// Returns true when the reference date is the anchor Monday, in which
    /// case the prior-week contribution is zero by definition.
    pub fn is_empty(&self) -> bool {
        self.cutoff <= self.start
    }

    /// Sums the hours of closed intervals lying entirely inside the window.
    ///
    /// Sessions crossing either edge are not split and contribute nothing.
    pub fn closed_hours(&self, reconstruction: &Reconstruction) -> Decimal {
        total_hours(
            reconstruction
                .closed
                .iter()
                .filter(|interval| interval.closed_within(self.start, self.cutoff)),
        )
    }
}

fn midnight_utc(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}
