use std::fmt;
use std::str::FromStr;

use bincode::{Decode, Encode};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Number of fractional digits carried by [`Decimal`]
pub const DECIMAL_PRECISION: u32 = 18;
const SCALE: u128 = 1_000_000_000_000_000_000;

/// Error returned when parsing a decimal string
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalParseError {
    #[error("empty decimal string")]
    Empty,
    #[error("invalid decimal {0:?}")]
    Invalid(String),
    #[error("decimal {0:?} has more than 18 fractional digits")]
    TooPrecise(String),
    #[error("decimal {0:?} is out of range")]
    Overflow(String),
}

/// Non-negative fixed-point number with 18 fractional digits.
///
/// Used for vote thresholds and quorums so that every node compares
/// fractions with the same integer arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Encode, Decode)]
pub struct Decimal(u128);

impl Decimal {
    pub const ZERO: Decimal = Decimal(0);
    pub const ONE: Decimal = Decimal(SCALE);

    pub const fn raw(&self) -> u128 {
        self.0
    }

    /// `numerator / denominator`, truncated. `None` if the denominator is zero.
    pub fn from_ratio(numerator: u64, denominator: u64) -> Option<Self> {
        if denominator == 0 {
            return None;
        }
        Some(Decimal(numerator as u128 * SCALE / denominator as u128))
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Whether `numerator / denominator >= self`, computed exactly.
    ///
    /// A zero denominator never meets a threshold.
    pub fn is_met_by(&self, numerator: u64, denominator: u64) -> bool {
        if denominator == 0 {
            return false;
        }
        let lhs = numerator as u128 * SCALE;
        match self.0.checked_mul(denominator as u128) {
            Some(rhs) => lhs >= rhs,
            None => false,
        }
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let integer = self.0 / SCALE;
        let fraction = self.0 % SCALE;
        if fraction == 0 {
            return write!(f, "{}", integer);
        }
        let digits = format!("{:018}", fraction);
        write!(f, "{}.{}", integer, digits.trim_end_matches('0'))
    }
}

impl FromStr for Decimal {
    type Err = DecimalParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DecimalParseError::Empty);
        }

        let (integer_part, fraction_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };

        let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
        if integer_part.is_empty() || !all_digits(integer_part) || !all_digits(fraction_part) {
            return Err(DecimalParseError::Invalid(s.to_string()));
        }
        if s.ends_with('.') {
            return Err(DecimalParseError::Invalid(s.to_string()));
        }
        if fraction_part.len() > DECIMAL_PRECISION as usize {
            return Err(DecimalParseError::TooPrecise(s.to_string()));
        }

        let integer: u128 = integer_part
            .parse()
            .map_err(|_| DecimalParseError::Overflow(s.to_string()))?;
        let mut fraction: u128 = 0;
        if !fraction_part.is_empty() {
            fraction = fraction_part
                .parse()
                .map_err(|_| DecimalParseError::Invalid(s.to_string()))?;
            fraction *= 10u128.pow(DECIMAL_PRECISION - fraction_part.len() as u32);
        }

        integer
            .checked_mul(SCALE)
            .and_then(|scaled| scaled.checked_add(fraction))
            .map(Decimal)
            .ok_or_else(|| DecimalParseError::Overflow(s.to_string()))
    }
}

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
