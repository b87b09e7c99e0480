//! Money type for currency amounts
//!
//! All amounts in cadence are integer minor-currency-units (cents) held in
//! an i64. There is no floating-point currency anywhere in the crate;
//! conversion to decimal dollars happens only in the display layer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use crate::error::{CadenceError, CadenceResult};

/// A monetary amount in cents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Create an amount from cents
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create an amount from whole dollars
    pub const fn from_dollars(dollars: i64) -> Self {
        Self(dollars * 100)
    }

    /// The zero amount
    pub const fn zero() -> Self {
        Self(0)
    }

    /// The amount in cents
    pub const fn cents(&self) -> i64 {
        self.0
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Absolute value
    pub const fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Larger of two amounts
    pub fn max(self, other: Self) -> Self {
        Self(self.0.max(other.0))
    }

    /// Divide evenly, truncating toward zero (used for amortization)
    pub const fn div(&self, divisor: i64) -> Self {
        Self(self.0 / divisor)
    }

    /// Multiply by an integer count
    pub const fn times(&self, count: i64) -> Self {
        Self(self.0 * count)
    }

    /// Parse a decimal-dollar string into an amount.
    ///
    /// Accepts `10.50`, `-10.50`, `$10.50`, `1,234.56`, `10`. A bare
    /// integer is read as dollars, not cents. At most two decimal places
    /// are honored; a single decimal digit means tenths.
    pub fn parse(input: &str) -> CadenceResult<Self> {
        let s = input.trim();
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let s = s.strip_prefix('$').unwrap_or(s).trim();
        let s: String = s.chars().filter(|c| *c != ',').collect();

        let bad = || CadenceError::Parse(format!("invalid money amount: {input}"));

        let cents = match s.split_once('.') {
            Some((whole, frac)) => {
                let dollars: i64 = whole.parse().map_err(|_| bad())?;
                let frac_cents: i64 = match frac.len() {
                    0 => 0,
                    1 => frac.parse::<i64>().map_err(|_| bad())? * 10,
                    2 => frac.parse().map_err(|_| bad())?,
                    _ => frac[..2].parse().map_err(|_| bad())?,
                };
                dollars * 100 + frac_cents
            }
            None => s.parse::<i64>().map_err(|_| bad())? * 100,
        };

        Ok(Self(if negative { -cents } else { cents }))
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.is_negative() { "-" } else { "" };
        let abs = self.0.abs();
        write!(f, "{}${}.{:02}", sign, abs / 100, abs % 100)
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self {
        Self(-self.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cents_roundtrip() {
        let m = Money::from_cents(1050);
        assert_eq!(m.cents(), 1050);
        assert_eq!(Money::from_dollars(10).cents(), 1000);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_cents(1050).to_string(), "$10.50");
        assert_eq!(Money::from_cents(-1050).to_string(), "-$10.50");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::zero().to_string(), "$0.00");
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("$10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("-10.50").unwrap().cents(), -1050);
        assert_eq!(Money::parse("1,234.56").unwrap().cents(), 123456);
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("ten dollars").is_err());
        assert!(Money::parse("").is_err());
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(250);
        assert_eq!((a + b).cents(), 1250);
        assert_eq!((a - b).cents(), 750);
        assert_eq!((-a).cents(), -1000);
        assert_eq!(a.div(7).cents(), 142);
        assert_eq!(b.times(4).cents(), 1000);
    }

    #[test]
    fn test_max() {
        assert_eq!(Money::from_cents(-5).max(Money::zero()), Money::zero());
        assert_eq!(
            Money::from_cents(10).max(Money::zero()),
            Money::from_cents(10)
        );
    }

    #[test]
    fn test_sum() {
        let total: Money = [100, 200, 300]
            .into_iter()
            .map(Money::from_cents)
            .sum();
        assert_eq!(total.cents(), 600);
    }

    #[test]
    fn test_serde_transparent() {
        let m = Money::from_cents(1050);
        assert_eq!(serde_json::to_string(&m).unwrap(), "1050");
        let back: Money = serde_json::from_str("1050").unwrap();
        assert_eq!(back, m);
    }
}
