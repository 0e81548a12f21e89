//! Errors raised by store adapters.

use thiserror::Error;

use crate::models::{EventId, WorkerId};

/// Failures reported by the event store, adjustment ledger and event
/// payment source.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing store could not be reached or failed mid-operation.
    #[error("store unavailable: {message}")]
    Unavailable {
        /// A description of the failure.
        message: String,
    },

    /// A conditional append found a different last event than expected.
    #[error("precondition failed for worker '{worker_id}': expected last event {expected}, found {actual}")]
    PreconditionFailed {
        /// The worker whose stream was appended to.
        worker_id: WorkerId,
        /// The last event id the caller observed, rendered for display.
        expected: LastEvent,
        /// The last event id actually present.
        actual: LastEvent,
    },
}

impl StoreError {
    /// Builds an [`StoreError::Unavailable`] from any message.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Returns true for precondition failures of a conditional append.
    pub fn is_precondition_failed(&self) -> bool {
        matches!(self, Self::PreconditionFailed { .. })
    }
}

/// The last event of a worker's stream, or none for an empty stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LastEvent(pub Option<EventId>);

impl std::fmt::Display for LastEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(id) => write!(f, "{}", id),
            None => write!(f, "<none>"),
        }
    }
}
