//! Hour tier classification.
//!
//! This module splits the hours a worker spent at one work event into
//! regular, overtime and doubletime tiers, taking into account the hours the
//! same worker already accumulated earlier in the week.
//!
//! ## Tier Rules
//!
//! - Daily: hours beyond `daily_overtime_after` are overtime, hours beyond
//!   `daily_doubletime_after` are doubletime.
//! - Weekly: regular hours that push the week past `weekly_overtime_after`
//!   are paid as overtime instead.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::TierThresholds;
use crate::error::{EngineError, EngineResult};
use crate::models::{AuditStep, HourBreakdown};

/// The result of classifying an event's hours into tiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierClassification {
    /// The hours split into tiers.
    pub hours: HourBreakdown,
    /// Regular hours moved to overtime by the weekly threshold.
    pub weekly_spill: Decimal,
    /// The audit step recording this classification.
    pub audit_step: AuditStep,
}

/// Classifies `event_hours` into pay tiers.
///
/// # Arguments
///
/// * `prior_week_hours` - Hours already worked earlier in the same week
/// * `event_hours` - Hours worked at this event
/// * `thresholds` - The daily and weekly tier thresholds
/// * `step_number` - The step number for audit trail sequencing
///
/// # Errors
///
/// Returns [`EngineError::Validation`] when either hour figure is negative.
///
/// # Examples
///
/// ```
/// use payroll_engine::calculation::classify_hours;
/// use payroll_engine::config::TierThresholds;
/// use rust_decimal::Decimal;
///
/// // 36 hours earlier in the week, then a 10 hour event.
/// let result = classify_hours(
///     Decimal::from(36),
///     Decimal::from(10),
///     &TierThresholds::default(),
///     1,
/// ).unwrap();
///
/// assert_eq!(result.hours.regular, Decimal::from(4));
/// assert_eq!(result.hours.overtime, Decimal::from(6));
/// assert_eq!(result.hours.doubletime, Decimal::ZERO);
/// ```
pub fn classify_hours(
    prior_week_hours: Decimal,
    event_hours: Decimal,
    thresholds: &TierThresholds,
    step_number: u32,
) -> EngineResult<TierClassification> {
    if prior_week_hours.is_sign_negative() && !prior_week_hours.is_zero() {
        return Err(EngineError::validation(
            "prior_week_hours",
            format!("must not be negative, got {}", prior_week_hours),
        ));
    }
    if event_hours.is_sign_negative() && !event_hours.is_zero() {
        return Err(EngineError::validation(
            "event_hours",
            format!("must not be negative, got {}", event_hours),
        ));
    }

    let daily_regular = event_hours.min(thresholds.daily_overtime_after);
    let daily_overtime = (event_hours - thresholds.daily_overtime_after)
        .max(Decimal::ZERO)
        .min(thresholds.daily_doubletime_after - thresholds.daily_overtime_after);
    let doubletime = (event_hours - thresholds.daily_doubletime_after).max(Decimal::ZERO);

    // Room left under the weekly threshold before regular hours become overtime
    let weekly_room = (thresholds.weekly_overtime_after - prior_week_hours).max(Decimal::ZERO);
    let weekly_spill = (daily_regular - weekly_room).max(Decimal::ZERO);

    let hours = HourBreakdown {
        regular: daily_regular - weekly_spill,
        overtime: daily_overtime + weekly_spill,
        doubletime,
    };

    let reasoning = if weekly_spill > Decimal::ZERO {
        format!(
            "{} event hours after {} prior-week hours: {} hours exceed the {} hour weekly threshold and are paid as overtime",
            event_hours.normalize(),
            prior_week_hours.normalize(),
            weekly_spill.normalize(),
            thresholds.weekly_overtime_after.normalize()
        )
    } else if hours.overtime > Decimal::ZERO || hours.doubletime > Decimal::ZERO {
        format!(
            "{} event hours exceed the {} hour daily threshold, triggering overtime",
            event_hours.normalize(),
            thresholds.daily_overtime_after.normalize()
        )
    } else {
        format!(
            "{} event hours are within daily and weekly thresholds, all regular",
            event_hours.normalize()
        )
    };

    let audit_step = AuditStep {
        step_number,
        rule_id: "hour_tier_classification".to_string(),
        rule_name: "Hour Tier Classification".to_string(),
        input: serde_json::json!({
            "prior_week_hours": prior_week_hours.normalize().to_string(),
            "event_hours": event_hours.normalize().to_string(),
            "daily_overtime_after": thresholds.daily_overtime_after.normalize().to_string(),
            "daily_doubletime_after": thresholds.daily_doubletime_after.normalize().to_string(),
            "weekly_overtime_after": thresholds.weekly_overtime_after.normalize().to_string()
        }),
        output: serde_json::json!({
            "regular": hours.regular.normalize().to_string(),
            "overtime": hours.overtime.normalize().to_string(),
            "doubletime": hours.doubletime.normalize().to_string()
        }),
        reasoning,
    };

    Ok(TierClassification {
        hours,
        weekly_spill,
        audit_step,
    })
}
