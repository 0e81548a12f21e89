//! Clock event model and related types.
//!
//! A [`ClockEvent`] is an immutable, timestamped record of a worker starting
//! or ending a work session. Events are totally ordered per worker by
//! `(timestamp, sequence)`, where `sequence` is the store-assigned insertion
//! order.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EventId, WorkerId};

/// The kind of clock action a worker performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockAction {
    /// The worker started a work session.
    ClockIn,
    /// The worker ended a work session.
    ClockOut,
}

impl ClockAction {
    /// Returns the snake_case name used on the wire and in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            ClockAction::ClockIn => "clock_in",
            ClockAction::ClockOut => "clock_out",
        }
    }
}

/// A persisted clock event.
///
/// # Example
///
/// ```
/// use payroll_engine::models::{ClockAction, ClockEvent, EventId, WorkerId};
/// use chrono::{TimeZone, Utc};
///
/// let event = ClockEvent {
///     id: EventId::new_v4(),
///     sequence: 1,
///     worker_id: WorkerId::new("w-001"),
///     action: ClockAction::ClockIn,
///     timestamp: Utc.with_ymd_and_hms(2025, 1, 14, 9, 0, 0).unwrap(),
///     division: Some("events".to_string()),
///     notes: None,
/// };
/// assert_eq!(event.action.as_str(), "clock_in");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockEvent {
    /// Unique identifier of the event.
    pub id: EventId,
    /// Store-assigned insertion order, used to break timestamp ties.
    pub sequence: u64,
    /// The worker who performed the action.
    pub worker_id: WorkerId,
    /// Whether the worker clocked in or out.
    pub action: ClockAction,
    /// When the action happened.
    pub timestamp: DateTime<Utc>,
    /// The business division the worker was clocked against.
    #[serde(default)]
    pub division: Option<String>,
    /// Free-form notes supplied with the action.
    #[serde(default)]
    pub notes: Option<String>,
}

impl ClockEvent {
    /// Returns the key events are totally ordered by.
    pub fn ordering_key(&self) -> (DateTime<Utc>, u64) {
        (self.timestamp, self.sequence)
    }
}

/// A clock event that has not yet been appended to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewClockEvent {
    /// The worker performing the action.
    pub worker_id: WorkerId,
    /// Whether the worker is clocking in or out.
    pub action: ClockAction,
    /// When the action happened.
    pub timestamp: DateTime<Utc>,
    /// The business division the worker is clocked against.
    pub division: Option<String>,
    /// Free-form notes supplied with the action.
    pub notes: Option<String>,
}

/// A half-open time range `[start, end)`; either bound may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive lower bound.
    #[serde(default)]
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    #[serde(default)]
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// A range covering all of time.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// A range `[start, end)`.
    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Returns true if `instant` falls inside the range.
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| instant >= start) && self.end.is_none_or(|end| instant < end)
    }

    /// Returns true if the range cannot contain any instant.
    pub fn is_empty(&self) -> bool {
        matches!((self.start, self.end), (Some(start), Some(end)) if end <= start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_action_serializes_snake_case() {
        assert_eq!(
            serde_json::to_string(&ClockAction::ClockIn).unwrap(),
            "\"clock_in\""
        );
        let action: ClockAction = serde_json::from_str("\"clock_out\"").unwrap();
        assert_eq!(action, ClockAction::ClockOut);
    }

    #[test]
    fn test_unknown_action_is_rejected() {
        let result: Result<ClockAction, _> = serde_json::from_str("\"clock_sideways\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_range_is_half_open() {
        let range = TimeRange::between(at(13, 0), at(15, 0));
        assert!(range.contains(at(13, 0)));
        assert!(range.contains(at(14, 23)));
        assert!(!range.contains(at(15, 0)));
        assert!(!range.contains(at(12, 23)));
    }

    #[test]
    fn test_unbounded_range_contains_everything() {
        let range = TimeRange::unbounded();
        assert!(range.contains(at(1, 0)));
        assert!(!range.is_empty());
    }

    #[test]
    fn test_empty_range() {
        assert!(TimeRange::between(at(13, 0), at(13, 0)).is_empty());
        assert!(!TimeRange::between(at(13, 0), at(13, 1)).is_empty());
    }

    #[test]
    fn test_ordering_key_breaks_ties_by_sequence() {
        let base = ClockEvent {
            id: EventId::new_v4(),
            sequence: 1,
            worker_id: WorkerId::new("w"),
            action: ClockAction::ClockIn,
            timestamp: at(14, 9),
            division: None,
            notes: None,
        };
        let later = ClockEvent {
            id: EventId::new_v4(),
            sequence: 2,
            ..base.clone()
        };
        assert!(base.ordering_key() < later.ordering_key());
    }
}
