//! Session reconstruction.
//!
//! This module pairs clock-in/clock-out events into [`WorkInterval`]s.
//! Reconstruction is tolerant of malformed history: duplicate clock-ins
//! collapse into the session that is already open and orphan clock-outs are
//! dropped. It never fails.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{ClockAction, ClockEvent, WorkInterval, WorkerId, total_hours};

/// The result of replaying one worker's event stream.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Reconstruction {
    /// Closed intervals in stream order.
    pub closed: Vec<WorkInterval>,
    /// The trailing open session, if the stream ends mid-session.
    pub open: Option<WorkInterval>,
    /// Clock-ins ignored because a session was already open.
    pub ignored_clock_ins: usize,
    /// Clock-outs dropped because no session was open.
    pub orphan_clock_outs: usize,
}

impl Reconstruction {
    /// Returns the summed hours of all closed intervals.
    pub fn closed_hours(&self) -> Decimal {
        total_hours(&self.closed)
    }

    /// Returns every interval, closed ones first, then the open one.
    pub fn intervals(&self) -> impl Iterator<Item = &WorkInterval> {
        self.closed.iter().chain(self.open.iter())
    }
}

/// Replays a worker's clock events into work intervals.
///
/// Events are processed in `(timestamp, sequence)` order; events belonging to
/// other workers are skipped. A clock-out at the exact instant of the open
/// session's start closes the session without emitting an interval.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::reconstruct_sessions;
/// use payroll_engine::models::{ClockAction, ClockEvent, EventId, WorkerId};
/// use chrono::{TimeZone, Utc};
/// use rust_decimal::Decimal;
///
/// let worker = WorkerId::new("w-001");
/// let event = |sequence: u64, action, hour, minute| ClockEvent {
///     id: EventId::new_v4(),
///     sequence,
///     worker_id: worker.clone(),
///     action,
///     timestamp: Utc.with_ymd_and_hms(2025, 1, 14, hour, minute, 0).unwrap(),
///     division: None,
///     notes: None,
/// };
/// let events = vec![
///     event(1, ClockAction::ClockIn, 9, 0),
///     event(2, ClockAction::ClockOut, 13, 0),
///     event(3, ClockAction::ClockIn, 14, 0),
///     event(4, ClockAction::ClockOut, 17, 30),
/// ];
///
/// let result = reconstruct_sessions(&worker, &events);
/// assert_eq!(result.closed.len(), 2);
/// assert!(result.open.is_none());
/// assert_eq!(result.closed_hours(), Decimal::new(75, 1));
/// ```
pub fn reconstruct_sessions(worker_id: &WorkerId, events: &[ClockEvent]) -> Reconstruction {
    let mut ordered: Vec<&ClockEvent> = events
        .iter()
        .filter(|event| &event.worker_id == worker_id)
        .collect();
    ordered.sort_by_key(|event| event.ordering_key());

    let mut result = Reconstruction::default();
    let mut current: Option<WorkInterval> = None;

    for event in ordered {
        match (event.action, current.take()) {
            (ClockAction::ClockIn, None) => {
                current = Some(WorkInterval {
                    worker_id: worker_id.clone(),
                    started_at: event.timestamp,
                    ended_at: None,
                    source_event_ids: vec![event.id],
                });
            }
            (ClockAction::ClockIn, Some(mut open)) => {
                open.source_event_ids.push(event.id);
                result.ignored_clock_ins += 1;
                current = Some(open);
            }
            (ClockAction::ClockOut, Some(mut interval)) => {
                if event.timestamp > interval.started_at {
                    interval.ended_at = Some(event.timestamp);
                    interval.source_event_ids.push(event.id);
                    result.closed.push(interval);
                }
            }
            (ClockAction::ClockOut, None) => {
                result.orphan_clock_outs += 1;
            }
        }
    }

    result.open = current;

    if result.ignored_clock_ins > 0 || result.orphan_clock_outs > 0 {
        debug!(
            worker_id = %worker_id,
            ignored_clock_ins = result.ignored_clock_ins,
            orphan_clock_outs = result.orphan_clock_outs,
            "Tolerated malformed clock history"
        );
    }

    result
}

/// Decides whether a session is open from the latest clock-in and clock-out.
///
/// A session is open iff a clock-in exists and either no clock-out exists or
/// the latest clock-in is strictly later than the latest clock-out. Under
/// alternating usage this agrees with a full [`reconstruct_sessions`] replay.
pub fn session_open_from_latest(
    last_clock_in: Option<&ClockEvent>,
    last_clock_out: Option<&ClockEvent>,
) -> bool {
    match (last_clock_in, last_clock_out) {
        (None, _) => false,
        (Some(_), None) => true,
        (Some(clock_in), Some(clock_out)) => clock_in.ordering_key() > clock_out.ordering_key(),
    }
}
