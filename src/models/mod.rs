//! Core data models for the payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod adjustment;
mod clock_event;
mod ids;
mod payment;
mod work_interval;

pub use adjustment::{AdjustmentMap, AdjustmentWrite, PaymentAdjustment};
pub use clock_event::{ClockAction, ClockEvent, NewClockEvent, TimeRange};
pub use ids::{EventId, WorkEventId, WorkerId};
pub use payment::{
    AuditStep, EventPaymentAssignment, HourBreakdown, PaymentCalculation, PaymentInput,
    PaymentSummary, WorkerPayment,
};
pub use work_interval::{WeeklyHourSummary, WorkInterval, total_hours};
