//! Integer-cent arithmetic.
//!
//! Payroll figures are rounded to whole cents once and then summed as
//! integers, so re-running a payroll can never drift by a fraction of a
//! cent.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};

/// A monetary amount in whole cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cents(i64);

impl Cents {
    /// Zero cents.
    pub const ZERO: Cents = Cents(0);

    /// Creates an amount from a raw cent count.
    pub const fn new(cents: i64) -> Self {
        Self(cents)
    }

    /// Rounds a decimal amount to the nearest cent, halves away from zero.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] naming `field` when the amount
    /// does not fit in 64-bit cents.
    ///
    /// # Examples
    ///
    /// ```
    /// use payroll_engine::calculation::Cents;
    /// use rust_decimal::Decimal;
    ///
    /// let cents = Cents::from_decimal(Decimal::new(42805, 3), "amount").unwrap();
    /// assert_eq!(cents.as_i64(), 4281);
    /// ```
    pub fn from_decimal(amount: Decimal, field: &str) -> EngineResult<Self> {
        let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        rounded
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .map(Self)
            .ok_or_else(|| EngineError::validation(field, format!("amount {} is out of range", amount)))
    }

    /// Returns the raw cent count.
    pub const fn as_i64(&self) -> i64 {
        self.0
    }

    /// Converts back to a decimal with a scale of two.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    /// Adds two amounts, failing on overflow.
    pub fn checked_add(self, other: Cents) -> Option<Cents> {
        self.0.checked_add(other.0).map(Cents)
    }
}
