//! Fixed-point decimal used by `BigDecimal` columns.

use crate::error::{FlowError, FlowResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Largest supported number of fractional digits.
pub const MAX_SCALE: u8 = 38;

/// A decimal number stored as a scaled integer (`value / 10^scale`).
///
/// Equality and ordering are numeric: `1.50` equals `1.5`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Decimal {
    value: i128,
    scale: u8,
}

impl Decimal {
    /// Creates a decimal from a scaled integer.
    ///
    /// Scales above [`MAX_SCALE`] are clamped.
    #[must_use]
    pub const fn new(value: i128, scale: u8) -> Self {
        let scale = if scale > MAX_SCALE { MAX_SCALE } else { scale };
        Self { value, scale }
    }

    /// Creates an integral decimal.
    #[must_use]
    pub const fn from_integer(value: i64) -> Self {
        Self {
            value: value as i128,
            scale: 0,
        }
    }

    /// Returns the unscaled integer.
    #[must_use]
    pub const fn mantissa(&self) -> i128 {
        self.value
    }

    /// Returns the number of fractional digits.
    #[must_use]
    pub const fn scale(&self) -> u8 {
        self.scale
    }

    /// Returns the same number with trailing fractional zeros removed.
    #[must_use]
    pub fn normalized(&self) -> Self {
        let mut value = self.value;
        let mut scale = self.scale;
        while scale > 0 && value % 10 == 0 {
            value /= 10;
            scale -= 1;
        }
        Self { value, scale }
    }

    /// Approximates the decimal as a float.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        self.value as f64 / 10f64.powi(i32::from(self.scale))
    }

    /// Rescales both operands to a common scale, if representable.
    fn aligned(&self, other: &Self) -> Option<(i128, i128)> {
        let scale = self.scale.max(other.scale);
        let lhs = self
            .value
            .checked_mul(10i128.checked_pow(u32::from(scale - self.scale))?)?;
        let rhs = other
            .value
            .checked_mul(10i128.checked_pow(u32::from(scale - other.scale))?)?;
        Some((lhs, rhs))
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        let (a, b) = (self.normalized(), other.normalized());
        a.value == b.value && a.scale == b.scale
    }
}

impl Eq for Decimal {}

impl Hash for Decimal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let n = self.normalized();
        n.value.hash(state);
        n.scale.hash(state);
    }
}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.aligned(other) {
            Some((a, b)) => a.cmp(&b),
            None => self.to_f64().total_cmp(&other.to_f64()),
        }
    }
}

impl FromStr for Decimal {
    type Err = FlowError;

    /// Accepts an optional sign, digits with an optional fraction, and an
    /// optional `e`/`E` exponent (`"1.5e3"`, `"25E-2"`).
    fn from_str(s: &str) -> FlowResult<Self> {
        let err = || FlowError::parse_error(s, "BigDecimal");
        let text = s.trim();
        let (negative, unsigned) = match text.as_bytes().first() {
            Some(b'-') => (true, &text[1..]),
            Some(b'+') => (false, &text[1..]),
            _ => (false, text),
        };
        let (digits, exponent) = match unsigned.split_once(['e', 'E']) {
            Some((d, e)) => (d, e.parse::<i32>().map_err(|_| err())?),
            None => (unsigned, 0),
        };
        let (int_part, frac_part) = match digits.split_once('.') {
            Some((i, f)) => (i, f),
            None => (digits, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(err());
        }
        if !int_part.bytes().chain(frac_part.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(err());
        }

        let mut value: i128 = 0;
        for b in int_part.bytes().chain(frac_part.bytes()) {
            value = value
                .checked_mul(10)
                .and_then(|v| v.checked_add(i128::from(b - b'0')))
                .ok_or_else(err)?;
        }
        if negative {
            value = -value;
        }

        let frac_len = i64::try_from(frac_part.len()).map_err(|_| err())?;
        let scale = frac_len - i64::from(exponent);
        if scale < 0 {
            // Positive exponents beyond the fraction scale the mantissa up.
            let factor = u32::try_from(-scale)
                .ok()
                .and_then(|p| 10i128.checked_pow(p))
                .ok_or_else(err)?;
            value = value.checked_mul(factor).ok_or_else(err)?;
            return Ok(Self::new(value, 0));
        }
        let scale = u8::try_from(scale)
            .ok()
            .filter(|s| *s <= MAX_SCALE)
            .ok_or_else(err)?;
        Ok(Self::new(value, scale))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.scale == 0 {
            return write!(f, "{}", self.value);
        }
        let divisor = 10u128.pow(u32::from(self.scale));
        let magnitude = self.value.unsigned_abs();
        let sign = if self.value < 0 { "-" } else { "" };
        write!(
            f,
            "{sign}{}.{:0>width$}",
            magnitude / divisor,
            magnitude % divisor,
            width = usize::from(self.scale)
        )
    }
}

impl From<Decimal> for String {
    fn from(d: Decimal) -> Self {
        d.to_string()
    }
}

impl TryFrom<String> for Decimal {
    type Error = FlowError;

    fn try_from(s: String) -> FlowResult<Self> {
        s.parse()
    }
}

impl From<i64> for Decimal {
    fn from(n: i64) -> Self {
        Self::from_integer(n)
    }
}
