//! Exact decimal money type for drug costs.
//!
//! Uses `rust_decimal` internally so that sums over many records carry
//! no binary floating-point error. Unlike fixed-scale money types, this
//! one keeps the natural scale of its inputs: the accumulated total
//! renders with exactly the precision the data produced.

use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign};
use std::str::FromStr;

/// An exact decimal monetary amount.
///
/// This type wraps `rust_decimal::Decimal` without rescaling, so
/// `100.10 + 200.20` is exactly `300.30` and serializes as that text.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use pharmacy_report::Currency;
///
/// let a = Currency::from_str("100.10").unwrap();
/// let b = Currency::from_str("200.20").unwrap();
/// assert_eq!((a + b).to_string(), "300.30");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Currency(Decimal);

impl Currency {
    /// Zero value.
    pub const ZERO: Self = Currency(Decimal::ZERO);

    /// Returns `true` for amounts strictly below zero.
    ///
    /// A negatively-signed zero such as `-0.00` counts as non-negative.
    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }
}

impl FromStr for Currency {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        let decimal = Decimal::from_str(trimmed)?;
        Ok(Currency(decimal))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Currency {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Currency(self.0 + rhs.0)
    }
}

impl AddAssign for Currency {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Serialize for Currency {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}
