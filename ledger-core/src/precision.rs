//! Precision unit and integer unit-space helpers
//!
//! A [`Precision`] is the smallest amount a balance may move by. The ledger
//! converts every amount into a whole number of these units, splits in integer
//! space, and only converts back to [`Decimal`] at the edge. That is what keeps
//! the sum of all shares equal to the original amount.

use crate::error::ValidationError;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Smallest indivisible currency amount (e.g. 0.01)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Precision(Decimal);

impl Precision {
    /// Create a precision unit; must be strictly positive
    pub fn new(unit: Decimal) -> Result<Self, ValidationError> {
        if unit <= Decimal::ZERO {
            return Err(ValidationError::InvalidPrecision(unit));
        }
        Ok(Self(unit))
    }

    /// The unit as a decimal
    pub fn unit(&self) -> Decimal {
        self.0
    }

    /// Whole number of units in `amount`
    ///
    /// Amounts that are not an exact multiple of the unit are rejected rather
    /// than rounded.
    pub fn to_units(&self, amount: Decimal) -> Result<i64, ValidationError> {
        // Exact remainder; the quotient below may be rounded
        if !self.is_multiple(amount) {
            return Err(ValidationError::AmountNotMultipleOfPrecision {
                amount,
                precision: self.0,
            });
        }

        amount
            .checked_div(self.0)
            .filter(|units| units.fract().is_zero())
            .and_then(|units| units.to_i64())
            .ok_or(ValidationError::AmountOutOfRange {
                amount,
                precision: self.0,
            })
    }

    /// Decimal value of `units` whole units
    ///
    /// Fails when the value does not fit in a [`Decimal`].
    pub fn from_units(&self, units: impl Into<i128>) -> Result<Decimal, ValidationError> {
        let units = units.into();
        Decimal::from_i128(units)
            .and_then(|value| value.checked_mul(self.0))
            .ok_or(ValidationError::BalanceOutOfRange {
                units,
                precision: self.0,
            })
    }

    /// Whether `amount` is an exact multiple of the unit
    pub fn is_multiple(&self, amount: Decimal) -> bool {
        matches!(amount.checked_rem(self.0), Some(rem) if rem.is_zero())
    }
}

impl Default for Precision {
    fn default() -> Self {
        Self(Decimal::new(1, 2))
    }
}

impl TryFrom<Decimal> for Precision {
    type Error = ValidationError;

    fn try_from(unit: Decimal) -> Result<Self, Self::Error> {
        Self::new(unit)
    }
}

impl From<Precision> for Decimal {
    fn from(precision: Precision) -> Self {
        precision.0
    }
}

impl FromStr for Precision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let unit = Decimal::from_str(s.trim())
            .map_err(|e| format!("invalid precision '{}': {}", s, e))?;
        Self::new(unit).map_err(|e| e.to_string())
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Split `total` units `ways` ways
///
/// Every slot gets `total / ways` units and the first `total % ways` slots get
/// one more, so the slots always sum to `total`. Returns `None` when `ways`
/// is zero.
pub fn split_units(total: i64, ways: usize) -> Option<Vec<i64>> {
    let n = i64::try_from(ways).ok().filter(|n| *n > 0)?;
    let base = total.div_euclid(n);
    let remainder = total.rem_euclid(n);

    Some(
        (0..n)
            .map(|slot| if slot < remainder { base + 1 } else { base })
            .collect(),
    )
}
