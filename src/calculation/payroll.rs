//! Payroll calculation.
//!
//! This module turns an hour breakdown, base rate, commission, tips and
//! adjustment into a [`PaymentSummary`]. The calculation is a pure function:
//! it performs no I/O, reads no clock and returns identical output for
//! identical input.
//!
//! ## Rate Structure
//!
//! - Regular hours: 100% of the base rate
//! - Overtime hours: 150% of the base rate
//! - Doubletime hours: 200% of the base rate

use std::collections::BTreeSet;

use rust_decimal::Decimal;

use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, PaymentCalculation, PaymentInput, PaymentSummary};

use super::Cents;

/// Multiplier applied to the base rate for overtime hours.
pub const OVERTIME_MULTIPLIER: Decimal = Decimal::from_parts(15, 0, 0, false, 1);

/// Multiplier applied to the base rate for doubletime hours.
pub const DOUBLETIME_MULTIPLIER: Decimal = Decimal::from_parts(2, 0, 0, false, 0);

/// Decides whether a worker's commission is paid for a work event.
///
/// Jurisdiction and division rules live behind this trait; the calculator
/// only consults it. Closures taking a [`PaymentInput`] implement it too.
pub trait CommissionPolicy: Send + Sync {
    /// Returns true if the commission in `input` should be paid.
    fn is_eligible(&self, input: &PaymentInput) -> bool;
}

impl<F> CommissionPolicy for F
where
    F: Fn(&PaymentInput) -> bool + Send + Sync,
{
    fn is_eligible(&self, input: &PaymentInput) -> bool {
        self(input)
    }
}

/// Pays every commission.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysEligible;

impl CommissionPolicy for AlwaysEligible {
    fn is_eligible(&self, _input: &PaymentInput) -> bool {
        true
    }
}

/// Withholds commission for work performed in excluded divisions.
///
/// Division names are compared case-insensitively. Work without a division
/// is always eligible.
#[derive(Debug, Clone, Default)]
pub struct DivisionCommissionPolicy {
    excluded: BTreeSet<String>,
}

impl DivisionCommissionPolicy {
    /// Creates a policy excluding the given divisions.
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            excluded: excluded
                .into_iter()
                .map(|division| division.as_ref().trim().to_lowercase())
                .collect(),
        }
    }
}

impl CommissionPolicy for DivisionCommissionPolicy {
    fn is_eligible(&self, input: &PaymentInput) -> bool {
        input
            .division
            .as_deref()
            .is_none_or(|division| !self.excluded.contains(&division.trim().to_lowercase()))
    }
}

/// Calculates the payment for one `(work_event, worker)`.
///
/// Every pay line and monetary input is rounded to whole cents before the
/// cents are summed, so the total is exact.
///
/// # Arguments
///
/// * `input` - Hours, rate, commission, tips and adjustment
/// * `policy` - Decides whether the commission is paid
/// * `step_number_start` - The first step number for audit trail sequencing
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when an hour tier or the base rate is
/// negative, or when an amount does not fit in 64-bit cents.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::{calculate_payment, AlwaysEligible};
/// use payroll_engine::models::{HourBreakdown, PaymentInput};
/// use rust_decimal::Decimal;
///
/// let input = PaymentInput {
///     hours: HourBreakdown {
///         regular: Decimal::from(8),
///         overtime: Decimal::from(2),
///         doubletime: Decimal::ZERO,
///     },
///     base_rate: Decimal::from(20),
///     commission: Decimal::from(50),
///     tips: Decimal::from(30),
///     adjustment: Decimal::from(-10),
///     division: None,
/// };
///
/// let result = calculate_payment(&input, &AlwaysEligible, 1).unwrap();
/// assert_eq!(result.summary.total_pay, Decimal::from(290));
/// ```
pub fn calculate_payment(
    input: &PaymentInput,
    policy: &dyn CommissionPolicy,
    step_number_start: u32,
) -> EngineResult<PaymentCalculation> {
    validate_non_negative("hours.regular", input.hours.regular)?;
    validate_non_negative("hours.overtime", input.hours.overtime)?;
    validate_non_negative("hours.doubletime", input.hours.doubletime)?;
    validate_non_negative("base_rate", input.base_rate)?;

    let mut audit_steps = Vec::new();
    let mut step_number = step_number_start;

    let tiers = [
        ("regular_pay", "Regular Pay", input.hours.regular, Decimal::ONE),
        ("overtime_pay", "Overtime Pay", input.hours.overtime, OVERTIME_MULTIPLIER),
        ("doubletime_pay", "Doubletime Pay", input.hours.doubletime, DOUBLETIME_MULTIPLIER),
    ];

    let mut tier_amounts = [Cents::ZERO; 3];
    for (slot, (rule_id, rule_name, hours, multiplier)) in tier_amounts.iter_mut().zip(tiers) {
        let amount = tier_amount(rule_id, hours, input.base_rate, multiplier)?;
        *slot = amount;

        audit_steps.push(AuditStep {
            step_number,
            rule_id: rule_id.to_string(),
            rule_name: rule_name.to_string(),
            input: serde_json::json!({
                "hours": hours.normalize().to_string(),
                "base_rate": input.base_rate.normalize().to_string(),
                "multiplier": multiplier.normalize().to_string()
            }),
            output: serde_json::json!({
                "amount": amount.to_decimal().to_string()
            }),
            reasoning: format!(
                "{} hours × ${} × {} = ${}",
                hours.normalize(),
                input.base_rate.normalize(),
                multiplier.normalize(),
                amount.to_decimal()
            ),
        });
        step_number += 1;
    }
    let [regular_pay, overtime_pay, doubletime_pay] = tier_amounts;

    let eligible = policy.is_eligible(input);
    let commission = if eligible {
        Cents::from_decimal(input.commission, "commission")?
    } else {
        Cents::ZERO
    };
    audit_steps.push(AuditStep {
        step_number,
        rule_id: "commission_eligibility".to_string(),
        rule_name: "Commission Eligibility".to_string(),
        input: serde_json::json!({
            "commission": input.commission.normalize().to_string(),
            "division": input.division
        }),
        output: serde_json::json!({
            "eligible": eligible,
            "commission": commission.to_decimal().to_string()
        }),
        reasoning: if eligible {
            format!("Commission of ${} paid", commission.to_decimal())
        } else {
            format!(
                "Commission of ${} withheld by commission policy",
                input.commission.normalize()
            )
        },
    });
    step_number += 1;

    let tips = Cents::from_decimal(input.tips, "tips")?;
    let adjustment = Cents::from_decimal(input.adjustment, "adjustment")?;

    let total = [regular_pay, overtime_pay, doubletime_pay, commission, tips, adjustment]
        .into_iter()
        .try_fold(Cents::ZERO, Cents::checked_add)
        .ok_or_else(|| EngineError::validation("total_pay", "total is out of range"))?;

    audit_steps.push(AuditStep {
        step_number,
        rule_id: "total_pay".to_string(),
        rule_name: "Total Pay".to_string(),
        input: serde_json::json!({
            "regular_pay": regular_pay.to_decimal().to_string(),
            "overtime_pay": overtime_pay.to_decimal().to_string(),
            "doubletime_pay": doubletime_pay.to_decimal().to_string(),
            "commission": commission.to_decimal().to_string(),
            "tips": tips.to_decimal().to_string(),
            "adjustment": adjustment.to_decimal().to_string()
        }),
        output: serde_json::json!({
            "total_pay": total.to_decimal().to_string()
        }),
        reasoning: format!(
            "${} + ${} + ${} + ${} + ${} + ${} = ${}",
            regular_pay.to_decimal(),
            overtime_pay.to_decimal(),
            doubletime_pay.to_decimal(),
            commission.to_decimal(),
            tips.to_decimal(),
            adjustment.to_decimal(),
            total.to_decimal()
        ),
    });

    Ok(PaymentCalculation {
        summary: PaymentSummary {
            regular_pay: regular_pay.to_decimal(),
            overtime_pay: overtime_pay.to_decimal(),
            doubletime_pay: doubletime_pay.to_decimal(),
            commission: commission.to_decimal(),
            tips: tips.to_decimal(),
            adjustment: adjustment.to_decimal(),
            total_pay: total.to_decimal(),
        },
        audit_steps,
    })
}

fn validate_non_negative(field: &str, value: Decimal) -> EngineResult<()> {
    if value < Decimal::ZERO {
        return Err(EngineError::validation(
            field,
            format!("must not be negative, got {}", value),
        ));
    }
    Ok(())
}

fn tier_amount(
    field: &str,
    hours: Decimal,
    base_rate: Decimal,
    multiplier: Decimal,
) -> EngineResult<Cents> {
    let amount = hours
        .checked_mul(base_rate)
        .and_then(|amount| amount.checked_mul(multiplier))
        .ok_or_else(|| EngineError::validation(field, "amount is out of range"))?;
    Cents::from_decimal(amount, field)
}
