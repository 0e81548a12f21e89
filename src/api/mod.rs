//! HTTP API module for the payroll engine.
//!
//! This module exposes clock actions, session queries, weekly hours,
//! adjustments and payroll runs as REST endpoints.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::{ACTOR_HEADER, Actor, create_router};
pub use request::{AdjustmentQueryRequest, AdjustmentUpsertRequest, IntervalsQuery, WeeklyHoursBody};
pub use response::{ApiError, ApiErrorResponse};
pub use state::{AppState, Ports};
