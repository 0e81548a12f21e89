//! Payment models for the payroll calculator.
//!
//! This module contains the calculator inputs ([`HourBreakdown`],
//! [`PaymentInput`]), its outputs ([`PaymentSummary`], [`AuditStep`]) and
//! the per-event assignment figures supplied by the event payment
//! collaborator.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{WorkEventId, WorkerId};

/// Hours worked split into pay tiers.
///
/// # Example
///
/// ```
/// use payroll_engine::models::HourBreakdown;
/// use rust_decimal::Decimal;
///
/// let hours = HourBreakdown {
///     regular: Decimal::from(8),
///     overtime: Decimal::from(2),
///     doubletime: Decimal::ZERO,
/// };
/// assert_eq!(hours.total(), Decimal::from(10));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct HourBreakdown {
    /// Hours paid at the base rate.
    #[serde(default)]
    pub regular: Decimal,
    /// Hours paid at 1.5x the base rate.
    #[serde(default)]
    pub overtime: Decimal,
    /// Hours paid at 2x the base rate.
    #[serde(default)]
    pub doubletime: Decimal,
}

impl HourBreakdown {
    /// Returns the sum of all tiers.
    pub fn total(&self) -> Decimal {
        self.regular + self.overtime + self.doubletime
    }
}

/// Everything the payroll calculator needs for one `(work_event, worker)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentInput {
    /// Hours split into tiers.
    pub hours: HourBreakdown,
    /// Hourly base rate.
    pub base_rate: Decimal,
    /// Commission figure before eligibility is applied.
    #[serde(default)]
    pub commission: Decimal,
    /// Tips received.
    #[serde(default)]
    pub tips: Decimal,
    /// Manual adjustment from the adjustment ledger.
    #[serde(default)]
    pub adjustment: Decimal,
    /// Division the work was performed for, consulted by commission policies.
    #[serde(default)]
    pub division: Option<String>,
}

/// The final payment figures for one `(work_event, worker)`.
///
/// All amounts have a scale of two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentSummary {
    /// Regular hours times the base rate.
    pub regular_pay: Decimal,
    /// Overtime hours times 1.5x the base rate.
    pub overtime_pay: Decimal,
    /// Doubletime hours times 2x the base rate.
    pub doubletime_pay: Decimal,
    /// Commission actually paid (zero when ineligible).
    pub commission: Decimal,
    /// Tips paid through.
    pub tips: Decimal,
    /// Manual adjustment applied.
    pub adjustment: Decimal,
    /// Sum of everything above.
    pub total_pay: Decimal,
}

/// A single step in the audit trace recording a calculation decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditStep {
    /// The sequential step number.
    pub step_number: u32,
    /// The identifier of the rule that was applied.
    pub rule_id: String,
    /// The human-readable name of the rule.
    pub rule_name: String,
    /// The input data for this step.
    pub input: serde_json::Value,
    /// The output data from this step.
    pub output: serde_json::Value,
    /// Human-readable explanation of the decision.
    pub reasoning: String,
}

/// Calculator output: the summary plus how it was reached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentCalculation {
    /// The payment figures.
    pub summary: PaymentSummary,
    /// Ordered audit steps describing each figure.
    pub audit_steps: Vec<AuditStep>,
}

/// Per-event payment figures assigned to a worker by the event payment
/// collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventPaymentAssignment {
    /// The work event.
    pub work_event_id: WorkEventId,
    /// The assigned worker.
    pub worker_id: WorkerId,
    /// The date the event is worked; anchors the prior-week window.
    pub reference_date: NaiveDate,
    /// Division the event belongs to.
    #[serde(default)]
    pub division: Option<String>,
    /// Hours worked at the event itself, classified into tiers by the engine.
    #[serde(default)]
    pub event_hours: Decimal,
    /// Explicit tier breakdown; when present it is used verbatim.
    #[serde(default)]
    pub hours: Option<HourBreakdown>,
    /// Hourly base rate.
    pub base_rate: Decimal,
    /// Commission figure.
    #[serde(default)]
    pub commission: Decimal,
    /// Tips figure.
    #[serde(default)]
    pub tips: Decimal,
}

/// One line of a payroll run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerPayment {
    /// The work event.
    pub work_event_id: WorkEventId,
    /// The paid worker.
    pub worker_id: WorkerId,
    /// Prior-week hours used for tier classification.
    pub prior_week_hours: Decimal,
    /// The hour tiers that were paid.
    pub hours: HourBreakdown,
    /// The payment figures and audit trace.
    pub calculation: PaymentCalculation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hour_breakdown_defaults_missing_tiers() {
        let hours: HourBreakdown = serde_json::from_str(r#"{"regular": "6.5"}"#).unwrap();
        assert_eq!(hours.regular, Decimal::new(65, 1));
        assert_eq!(hours.overtime, Decimal::ZERO);
        assert_eq!(hours.doubletime, Decimal::ZERO);
    }

    #[test]
    fn test_assignment_without_breakdown() {
        let json = r#"{
            "work_event_id": "evt-1",
            "worker_id": "w-1",
            "reference_date": "2025-01-15",
            "event_hours": "9",
            "base_rate": "20"
        }"#;
        let assignment: EventPaymentAssignment = serde_json::from_str(json).unwrap();
        assert!(assignment.hours.is_none());
        assert_eq!(assignment.event_hours, Decimal::from(9));
        assert_eq!(assignment.commission, Decimal::ZERO);
    }

    #[test]
    fn test_assignment_requires_base_rate() {
        let json = r#"{
            "work_event_id": "evt-1",
            "worker_id": "w-1",
            "reference_date": "2025-01-15"
        }"#;
        let result: Result<EventPaymentAssignment, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
