//! Time-Entry Event Log & Payroll Hours Engine
//!
//! This crate records clock-in/clock-out actions as an append-only event log,
//! reconstructs work sessions from it, accumulates prior-week hours for
//! batches of work events and computes per-worker payments from hour tiers,
//! base rate, commission, tips and manual adjustments.

#![warn(missing_docs)]

pub mod api;
pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
pub mod service;
pub mod store;
pub mod telemetry;
