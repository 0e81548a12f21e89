//! Clock-in and clock-out handling.
//!
//! A clock action is accepted only if it agrees with the worker's current
//! session state. The state check and the append are not atomic on their
//! own, so the append is made conditional on the last event the check saw.
//! When another action slipped in between, the store rejects the append and
//! the caller receives a conflict.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::calculation::{Reconstruction, reconstruct_sessions, session_open_from_latest};
use crate::error::{EngineError, EngineResult};
use crate::models::{ClockAction, ClockEvent, NewClockEvent, TimeRange, WorkInterval, WorkerId};
use crate::store::{EventStore, SharedClock};

use super::{EVENT_STORE, require_worker_id};

/// Optional details accompanying a clock action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClockRequest {
    /// When the action happened; defaults to now.
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    /// Division the worker is clocked against.
    #[serde(default)]
    pub division: Option<String>,
    /// Free-form notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Whether a worker currently has an open session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// True while the worker is clocked in.
    pub open: bool,
    /// The open session, if any.
    pub session: Option<WorkInterval>,
}

/// Accepts clock actions and answers session queries.
pub struct ClockService {
    store: Arc<dyn EventStore>,
    clock: SharedClock,
}

impl ClockService {
    /// Creates a service appending to `store` and stamping with `clock`.
    pub fn new(store: Arc<dyn EventStore>, clock: SharedClock) -> Self {
        Self { store, clock }
    }

    /// Opens a session for `worker_id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Conflict`] if a session is already open or a
    /// concurrent clock action won the race.
    pub async fn clock_in(
        &self,
        worker_id: &WorkerId,
        request: ClockRequest,
    ) -> EngineResult<ClockEvent> {
        self.record(worker_id, ClockAction::ClockIn, request).await
    }

    /// Closes the open session of `worker_id`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Conflict`] if no session is open or a
    /// concurrent clock action won the race.
    pub async fn clock_out(
        &self,
        worker_id: &WorkerId,
        request: ClockRequest,
    ) -> EngineResult<ClockEvent> {
        self.record(worker_id, ClockAction::ClockOut, request).await
    }

    /// Returns whether `worker_id` is clocked in, with the open session.
    pub async fn open_session(&self, worker_id: &WorkerId) -> EngineResult<SessionState> {
        require_worker_id("worker_id", worker_id)?;

        let last_in = self.query_last(worker_id, ClockAction::ClockIn).await?;
        let last_out = self.query_last(worker_id, ClockAction::ClockOut).await?;
        if !session_open_from_latest(last_in.as_ref(), last_out.as_ref()) {
            return Ok(SessionState {
                open: false,
                session: None,
            });
        }

        // Everything after the last clock-out belongs to the open session.
        let range = TimeRange {
            start: last_out.map(|event| event.timestamp),
            end: None,
        };
        let events = self
            .store
            .query(worker_id, range)
            .await
            .map_err(|e| EngineError::upstream(EVENT_STORE, e))?;

        Ok(SessionState {
            open: true,
            session: reconstruct_sessions(worker_id, &events).open,
        })
    }

    /// Reconstructs the worker's intervals from events inside `range`.
    pub async fn intervals(
        &self,
        worker_id: &WorkerId,
        range: TimeRange,
    ) -> EngineResult<Reconstruction> {
        require_worker_id("worker_id", worker_id)?;
        if range.is_empty() {
            return Err(EngineError::validation("to", "must be later than from"));
        }

        let events = self
            .store
            .query(worker_id, range)
            .await
            .map_err(|e| EngineError::upstream(EVENT_STORE, e))?;
        Ok(reconstruct_sessions(worker_id, &events))
    }

    async fn record(
        &self,
        worker_id: &WorkerId,
        action: ClockAction,
        request: ClockRequest,
    ) -> EngineResult<ClockEvent> {
        require_worker_id("worker_id", worker_id)?;

        let last = self
            .store
            .last_event(worker_id)
            .await
            .map_err(|e| EngineError::upstream(EVENT_STORE, e))?;
        let last_in = self.query_last(worker_id, ClockAction::ClockIn).await?;
        let last_out = self.query_last(worker_id, ClockAction::ClockOut).await?;
        let open = session_open_from_latest(last_in.as_ref(), last_out.as_ref());

        match (action, open) {
            (ClockAction::ClockIn, true) => {
                warn!(worker_id = %worker_id, "Clock-in rejected: session already open");
                return Err(EngineError::conflict(
                    worker_id.as_str(),
                    "a session is already open",
                ));
            }
            (ClockAction::ClockOut, false) => {
                warn!(worker_id = %worker_id, "Clock-out rejected: no open session");
                return Err(EngineError::conflict(
                    worker_id.as_str(),
                    "no session is open",
                ));
            }
            _ => {}
        }

        let timestamp = request.timestamp.unwrap_or_else(|| self.clock.utc());
        if let Some(previous) = last.as_ref().filter(|event| timestamp < event.timestamp) {
            return Err(EngineError::validation(
                "timestamp",
                format!(
                    "must not precede the worker's latest event at {}",
                    previous.timestamp.to_rfc3339()
                ),
            ));
        }

        let event = NewClockEvent {
            worker_id: worker_id.clone(),
            action,
            timestamp,
            division: request.division,
            notes: request.notes,
        };

        let appended = self
            .store
            .append(event, last.map(|event| event.id))
            .await
            .map_err(|e| {
                if e.is_precondition_failed() {
                    warn!(
                        worker_id = %worker_id,
                        action = action.as_str(),
                        "Clock action lost a concurrent race"
                    );
                    EngineError::conflict(
                        worker_id.as_str(),
                        "another clock action was recorded concurrently",
                    )
                } else {
                    EngineError::upstream(EVENT_STORE, e)
                }
            })?;

        info!(
            worker_id = %worker_id,
            action = action.as_str(),
            event_id = %appended.id,
            sequence = appended.sequence,
            "Clock action recorded"
        );

        Ok(appended)
    }

    async fn query_last(
        &self,
        worker_id: &WorkerId,
        action: ClockAction,
    ) -> EngineResult<Option<ClockEvent>> {
        self.store
            .query_last(worker_id, action)
            .await
            .map_err(|e| EngineError::upstream(EVENT_STORE, e))
    }
}
