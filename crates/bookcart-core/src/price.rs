#![forbid(unsafe_code)]

//! Non-negative monetary amounts.
//!
//! Prices are held as whole cents so that sums are exact: `19.99 + 22.50`
//! is `42.49`, not `42.489999...`. On the wire a price is a plain JSON
//! number with up to two meaningful decimals.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign};

/// Largest decimal amount accepted when converting from `f64`.
const MAX_DECIMAL: f64 = 1e13;

/// How far `value * 100` may sit from a whole number and still count as
/// exact cents (absorbs binary representation error such as `19.99`).
const CENT_TOLERANCE: f64 = 1e-6;

/// Errors produced when building a [`Price`] from untrusted input.
#[derive(Debug, Clone, PartialEq)]
pub enum PriceError {
    /// The text is not a decimal number.
    NotANumber(String),
    /// The amount is below zero.
    Negative(f64),
    /// The amount is NaN, infinite, or too large to represent.
    OutOfRange(f64),
    /// The amount has a fraction of a cent.
    SubCent(f64),
}

impl fmt::Display for PriceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotANumber(text) => write!(f, "not a price: {text:?}"),
            Self::Negative(v) => write!(f, "price cannot be negative: {v}"),
            Self::OutOfRange(v) => write!(f, "price out of range: {v}"),
            Self::SubCent(v) => write!(f, "price is not a whole number of cents: {v}"),
        }
    }
}

impl std::error::Error for PriceError {}

/// A non-negative amount of money in cents.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Price {
    cents: u64,
}

impl Price {
    /// Zero.
    pub const ZERO: Self = Self { cents: 0 };

    /// Build a price from whole cents.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self { cents }
    }

    /// Convert a decimal amount that is a whole number of cents.
    pub fn from_decimal(value: f64) -> Result<Self, PriceError> {
        if !value.is_finite() || value > MAX_DECIMAL {
            return Err(PriceError::OutOfRange(value));
        }
        if value < 0.0 {
            return Err(PriceError::Negative(value));
        }
        let scaled = value * 100.0;
        let whole = scaled.round();
        // Large amounts lose precision below a cent; allow a few ulps.
        let tolerance = CENT_TOLERANCE.max(scaled * f64::EPSILON * 4.0);
        if (scaled - whole).abs() > tolerance {
            return Err(PriceError::SubCent(value));
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let cents = whole as u64;
        Ok(Self { cents })
    }

    /// Parse user-entered text such as `"12"`, `"12.5"` or `" 0.99 "`.
    pub fn parse(text: &str) -> Result<Self, PriceError> {
        let trimmed = text.trim();
        let value: f64 = trimmed
            .parse()
            .map_err(|_| PriceError::NotANumber(trimmed.to_string()))?;
        Self::from_decimal(value)
    }

    /// The amount in cents.
    #[must_use]
    pub const fn cents(self) -> u64 {
        self.cents
    }

    /// The amount as a decimal number.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn as_decimal(self) -> f64 {
        self.cents as f64 / 100.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.cents == 0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.cents / 100, self.cents % 100)
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price {
            cents: self.cents.saturating_add(rhs.cents),
        }
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Price) {
        *self = *self + rhs;
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Price> for Price {
    fn sum<I: Iterator<Item = &'a Price>>(iter: I) -> Price {
        iter.copied().sum()
    }
}

impl Serialize for Price {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.as_decimal())
    }
}

impl<'de> Deserialize<'de> for Price {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Price::from_decimal(value).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_are_exact() {
        let a = Price::from_decimal(19.99).unwrap();
        let b = Price::from_decimal(22.5).unwrap();
        assert_eq!((a + b).cents(), 4249);
        assert_eq!([a, b].iter().sum::<Price>(), Price::from_cents(4249));
    }

    #[test]
    fn display_has_two_decimals() {
        assert_eq!(Price::from_cents(4249).to_string(), "$42.49");
        assert_eq!(Price::from_cents(2000).to_string(), "$20.00");
        assert_eq!(Price::from_cents(5).to_string(), "$0.05");
        assert_eq!(Price::ZERO.to_string(), "$0.00");
    }

    #[test]
    fn parse_accepts_plain_decimals() {
        assert_eq!(Price::parse("12").unwrap().cents(), 1200);
        assert_eq!(Price::parse(" 12.5 ").unwrap().cents(), 1250);
        assert_eq!(Price::parse("19.99").unwrap().cents(), 1999);
    }

    #[test]
    fn fractions_of_a_cent_are_rejected() {
        assert!(matches!(Price::parse("0.999"), Err(PriceError::SubCent(_))));
        assert!(matches!(Price::from_decimal(0.004), Err(PriceError::SubCent(_))));
        assert!(serde_json::from_str::<Price>("0.004").is_err());
        let large = Price::from_decimal(12_345_678_901.23).unwrap();
        assert_eq!(large.cents(), 1_234_567_890_123);
    }

    #[test]
    fn parse_rejects_bad_input() {
        assert!(matches!(Price::parse("abc"), Err(PriceError::NotANumber(_))));
        assert!(matches!(Price::parse("-1"), Err(PriceError::Negative(_))));
        assert!(matches!(Price::parse("inf"), Err(PriceError::OutOfRange(_))));
        assert!(matches!(Price::parse("NaN"), Err(PriceError::OutOfRange(_))));
    }

    #[test]
    fn serde_uses_decimal_numbers() {
        let p: Price = serde_json::from_str("24.99").unwrap();
        assert_eq!(p.cents(), 2499);
        assert_eq!(serde_json::to_string(&p).unwrap(), "24.99");
        assert!(serde_json::from_str::<Price>("-3").is_err());
    }
}
