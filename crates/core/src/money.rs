//! Money as an amount in the smallest currency unit (cents).
//!
//! Value object: immutable, compared by value. Integer cents keep sale totals
//! exact; floating point never enters the domain layer.

use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// A non-negative monetary amount in cents.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Construct from cents. Fails on negative amounts.
    pub fn from_cents(cents: i64) -> DomainResult<Self> {
        if cents < 0 {
            return Err(DomainError::validation(format!(
                "money cannot be negative: {cents}"
            )));
        }
        Ok(Self(cents))
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    /// Total for `quantity` units at this unit price.
    ///
    /// Overflow is a validation failure, not a panic.
    pub fn times(&self, quantity: i64) -> DomainResult<Money> {
        if quantity < 0 {
            return Err(DomainError::validation(format!(
                "quantity cannot be negative: {quantity}"
            )));
        }
        self.0
            .checked_mul(quantity)
            .map(Money)
            .ok_or_else(|| DomainError::validation("total overflows".to_string()))
    }

    /// Sum that saturates instead of wrapping; report totals only.
    pub fn saturating_add(&self, other: Money) -> Money {
        Money(self.0.saturating_add(other.0))
    }
}

impl core::fmt::Display for Money {
    /// Renders as dollars, e.g. `$6.00`.
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_negative_amounts() {
        assert!(Money::from_cents(-1).is_err());
        assert_eq!(Money::from_cents(0).unwrap(), Money::ZERO);
    }

    #[test]
    fn times_computes_exact_totals() {
        let price = Money::from_cents(200).unwrap();
        assert_eq!(price.times(3).unwrap().cents(), 600);
    }

    #[test]
    fn times_rejects_overflow_and_negative_quantity() {
        let price = Money::from_cents(i64::MAX).unwrap();
        assert!(price.times(2).is_err());
        assert!(price.times(-1).is_err());
    }

    #[test]
    fn renders_as_dollars() {
        assert_eq!(Money::from_cents(600).unwrap().to_string(), "$6.00");
        assert_eq!(Money::from_cents(1205).unwrap().to_string(), "$12.05");
        assert_eq!(Money::from_cents(7).unwrap().to_string(), "$0.07");
    }
}
