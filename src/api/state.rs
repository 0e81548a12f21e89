//! Application state for the payroll engine API.
//!
//! This module defines the shared application state that is available
//! to all request handlers.

use std::sync::Arc;

use crate::calculation::CommissionPolicy;
use crate::config::ConfigLoader;
use crate::service::{AdjustmentService, ClockService, PayrollRunner, WeeklyAccumulator};
use crate::store::{
    AdjustmentLedger, DefaultClock, EventPaymentSource, EventStore, InMemoryAdjustmentLedger,
    InMemoryEventPaymentSource, InMemoryEventStore, SharedClock,
};

/// The store adapters a server runs against.
#[derive(Clone)]
pub struct Ports {
    /// Clock event log.
    pub events: Arc<dyn EventStore>,
    /// Adjustment ledger.
    pub ledger: Arc<dyn AdjustmentLedger>,
    /// Event payment source.
    pub payments: Arc<dyn EventPaymentSource>,
    /// Wall clock.
    pub clock: SharedClock,
}

impl Ports {
    /// In-memory adapters stamped with the system clock.
    pub fn in_memory() -> Self {
        let clock: SharedClock = Arc::new(DefaultClock);
        Self {
            events: Arc::new(InMemoryEventStore::new()),
            ledger: Arc::new(InMemoryAdjustmentLedger::new(clock.clone())),
            payments: Arc::new(InMemoryEventPaymentSource::new()),
            clock,
        }
    }
}

/// Shared application state.
///
/// Holds the loaded configuration and the services built from it.
#[derive(Clone)]
pub struct AppState {
    config: Arc<ConfigLoader>,
    clock: Arc<ClockService>,
    weekly: Arc<WeeklyAccumulator>,
    adjustments: Arc<AdjustmentService>,
    payroll: Arc<PayrollRunner>,
}

impl AppState {
    /// Wires the services over `ports` using `config`.
    pub fn new(config: ConfigLoader, ports: Ports) -> Self {
        let engine = config.config();
        let weekly = Arc::new(WeeklyAccumulator::new(
            ports.events.clone(),
            engine.aggregation().clone(),
        ));
        let commission: Arc<dyn CommissionPolicy> = Arc::new(config.commission_policy());
        let payroll = PayrollRunner::new(
            weekly.clone(),
            ports.ledger.clone(),
            ports.payments,
            engine.tiers().clone(),
            commission,
        );

        Self {
            clock: Arc::new(ClockService::new(ports.events, ports.clock)),
            adjustments: Arc::new(AdjustmentService::new(ports.ledger)),
            payroll: Arc::new(payroll),
            weekly,
            config: Arc::new(config),
        }
    }

    /// Returns a reference to the configuration loader.
    pub fn config(&self) -> &ConfigLoader {
        &self.config
    }

    /// Returns the clock service.
    pub fn clock(&self) -> &ClockService {
        &self.clock
    }

    /// Returns the weekly accumulator.
    pub fn weekly(&self) -> &WeeklyAccumulator {
        &self.weekly
    }

    /// Returns the adjustment service.
    pub fn adjustments(&self) -> &AdjustmentService {
        &self.adjustments
    }

    /// Returns the payroll runner.
    pub fn payroll(&self) -> &PayrollRunner {
        &self.payroll
    }
}
