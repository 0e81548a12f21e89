//! Calculation logic for the payroll engine.
//!
//! This module contains the pure functions of the engine: session
//! reconstruction from clock events, prior-week windowing, hour tier
//! classification, integer-cent money handling and the payroll calculator.
//! Nothing in here performs I/O.

mod hour_tiers;
mod money;
mod payroll;
mod sessions;
mod week;

pub use hour_tiers::{TierClassification, classify_hours};
pub use money::Cents;
pub use payroll::{
    AlwaysEligible, CommissionPolicy, DOUBLETIME_MULTIPLIER, DivisionCommissionPolicy,
    OVERTIME_MULTIPLIER, calculate_payment,
};
pub use sessions::{Reconstruction, reconstruct_sessions, session_open_from_latest};
pub use week::{PriorWeekWindow, week_anchor};
