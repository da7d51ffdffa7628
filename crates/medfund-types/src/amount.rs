use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::TypeError;

/// Most fractional digits a `Decimal` can hold.
const MAX_SCALE: u32 = 28;

/// An exact decimal amount of money.
///
/// Amounts are stored normalized: no exponent, no trailing fractional zeros,
/// and no negative zero. The canonical text form is therefore unique for
/// every value (`"300"`, `"4000.32"`, `"0.5"`) and is what both the persisted
/// records and the `getRaised` projection carry.
///
/// Parsing accepts plain decimal text and scientific notation (`"3E+2"`), so
/// amounts written by older ledger readers in exponent form still decode.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(Decimal);

impl Amount {
    /// The zero amount.
    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Wrap a decimal, normalizing it to canonical form.
    pub fn new(value: Decimal) -> Self {
        if value.is_zero() {
            Self::ZERO
        } else {
            Self(value.normalize())
        }
    }

    /// Parse any finite decimal, signed or not.
    ///
    /// Input that cannot be held exactly (more than 28 fractional digits, or
    /// more significant digits than the 96-bit mantissa) is rejected rather
    /// than rounded.
    pub fn parse(text: &str) -> Result<Self, TypeError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(invalid(text, "empty amount"));
        }
        let value = match trimmed.split_once(['e', 'E']) {
            Some((mantissa, exponent)) => scientific(text, mantissa, exponent)?,
            None => Decimal::from_str_exact(trimmed).map_err(|e| invalid(text, &e.to_string()))?,
        };
        Ok(Self::new(value))
    }

    /// The underlying decimal.
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Exact addition; `None` on overflow of the 96-bit mantissa.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Self::new)
    }

    /// Exact subtraction; `None` on overflow.
    pub fn checked_sub(self, other: Amount) -> Option<Amount> {
        self.0.checked_sub(other.0).map(Self::new)
    }
}

fn invalid(input: &str, reason: &str) -> TypeError {
    TypeError::InvalidAmount {
        input: input.to_string(),
        reason: reason.to_string(),
    }
}

/// Exact value of `mantissa * 10^exponent`.
fn scientific(text: &str, mantissa: &str, exponent: &str) -> Result<Decimal, TypeError> {
    let mut value =
        Decimal::from_str_exact(mantissa).map_err(|e| invalid(text, &e.to_string()))?;
    let exponent: i64 = exponent
        .parse()
        .map_err(|_| invalid(text, "malformed exponent"))?;
    let scale = i64::from(value.scale()) - exponent;
    if scale > i64::from(MAX_SCALE) {
        return Err(invalid(text, "more than 28 fractional digits"));
    }
    if scale >= 0 {
        value
            .set_scale(scale as u32)
            .map_err(|e| invalid(text, &e.to_string()))?;
        return Ok(value);
    }
    value
        .set_scale(0)
        .map_err(|e| invalid(text, &e.to_string()))?;
    for _ in 0..scale.unsigned_abs() {
        value = value
            .checked_mul(Decimal::TEN)
            .ok_or_else(|| invalid(text, "too large"))?;
    }
    Ok(value)
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self::new(value)
    }
}

impl FromStr for Amount {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.0)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(AmountVisitor)
    }
}

/// Accepts the canonical string form and plain JSON numbers.
struct AmountVisitor;

impl<'de> Visitor<'de> for AmountVisitor {
    type Value = Amount;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal amount as a string or number")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
        Amount::parse(v).map_err(E::custom)
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
        Ok(Amount::new(Decimal::from(v)))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Amount, E> {
        if !v.is_finite() {
            return Err(E::custom("non-finite amount"));
        }
        // f64 Display prints the shortest round-trip digits without exponent.
        Amount::parse(&v.to_string()).map_err(E::custom)
    }
}
