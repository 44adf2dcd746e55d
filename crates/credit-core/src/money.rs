//! # Money
//!
//! Integer-cent amounts for limits, balances, order totals and payments.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  Every credit check is an exact comparison on whole cents:           │
//! │                                                                      │
//! │    limit 500000  ≥  balance 499999 + order 1   → accepted            │
//! │    limit 500000  <  balance 499999 + order 2   → shortfall 1 cent    │
//! │                                                                      │
//! │  No float ever touches a ledger amount.                              │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ```rust
//! use credit_core::money::Money;
//!
//! let limit = Money::from_major(5000);
//! let balance = Money::from_cents(400_000);
//! assert_eq!(limit.saturating_sub(balance), Money::from_major(1000));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

/// An amount in cents.
///
/// Signed so that a raw `limit - balance` can be inspected before it is
/// clamped; stored balances themselves are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Whole dollars. `Money::from_major(5000)` is a $5000.00 limit.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps a negative amount to zero.
    ///
    /// ```rust
    /// use credit_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(-250).non_negative(), Money::zero());
    /// assert_eq!(Money::from_cents(250).non_negative().cents(), 250);
    /// ```
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            *self
        }
    }

    /// `self - other`, never below zero. Available credit and outstanding
    /// amounts are computed this way.
    #[inline]
    pub const fn saturating_sub(&self, other: Money) -> Self {
        Money(self.0.saturating_sub(other.0)).non_negative()
    }

    #[inline]
    pub fn min(self, other: Money) -> Self {
        Money(self.0.min(other.0))
    }
}

/// `$1234.56` style, for logs and error messages.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "${}.{:02}", abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        Money(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        Money(iter.map(|m| m.0).sum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_major_units() {
        assert_eq!(Money::from_major(5000).cents(), 500_000);
        assert_eq!(Money::from_major(0), Money::zero());
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
        assert_eq!(Money::from_major(5000).to_string(), "$5000.00");
        assert_eq!(Money::from_cents(-550).to_string(), "-$5.50");
        assert_eq!(Money::from_cents(-5).to_string(), "-$0.05");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_balance_arithmetic() {
        let mut balance = Money::from_major(10);
        balance += Money::from_major(5);
        balance -= Money::from_cents(200);
        assert_eq!(balance.cents(), 1300);
        assert_eq!((balance - Money::from_cents(300)).cents(), 1000);
    }

    #[test]
    fn test_available_credit_floors_at_zero() {
        let limit = Money::from_major(100);
        let balance = Money::from_major(150);
        assert_eq!(limit.saturating_sub(balance), Money::zero());
        assert_eq!(balance.saturating_sub(limit), Money::from_major(50));
        assert!((limit - balance).is_negative());
    }

    #[test]
    fn test_payment_capped_at_outstanding() {
        let outstanding = Money::from_major(80);
        assert_eq!(Money::from_major(100).min(outstanding), outstanding);
        assert_eq!(Money::from_major(30).min(outstanding), Money::from_major(30));
    }

    #[test]
    fn test_ledger_total() {
        let total: Money = [100, 250, 650].into_iter().map(Money::from_cents).sum();
        assert_eq!(total.cents(), 1000);
        assert!(total.is_positive());
    }
}
