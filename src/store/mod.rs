//! Store ports and their in-memory adapters.
//!
//! The engine reads and writes through three ports: the [`EventStore`] of
//! clock actions, the [`AdjustmentLedger`] and the [`EventPaymentSource`].
//! Adapters report failures as [`StoreError`], which services convert into
//! [`EngineError`](crate::error::EngineError).

mod clock;
mod error;
mod memory;
mod ports;

pub use clock::{Clock, DefaultClock, ManualClock, SharedClock};
pub use error::{LastEvent, StoreError};
pub use memory::{InMemoryAdjustmentLedger, InMemoryEventPaymentSource, InMemoryEventStore};
pub use ports::{AdjustmentLedger, EventPaymentSource, EventStore};
