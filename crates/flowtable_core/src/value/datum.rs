//! Raw value payload.

use crate::value::{hex, Decimal, TypeTag};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A raw, untyped-at-rest value.
///
/// `Datum` is the payload carried by a [`Value`](crate::Value) and the
/// input accepted by value writes. Its `Display` output is the canonical
/// text form, which [`TypeTag::parse`] accepts back.
///
/// Equality is by value: floats compare by bit pattern with every NaN
/// folded into one, so `NaN == NaN` and `0.0 != -0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Datum {
    /// Absent value.
    Null,
    /// UTF-8 text.
    String(String),
    /// Boolean.
    Boolean(bool),
    /// 8-bit signed integer.
    Byte(i8),
    /// Raw bytes.
    ByteArray(Vec<u8>),
    /// Single character.
    Character(char),
    /// UTC timestamp.
    Date(DateTime<Utc>),
    /// 64-bit float.
    Double(f64),
    /// 32-bit float.
    Float(f32),
    /// 32-bit signed integer.
    Integer(i32),
    /// 64-bit signed integer.
    Long(i64),
    /// 16-bit signed integer.
    Short(i16),
    /// Fixed-point decimal.
    BigDecimal(Decimal),
    /// List of values.
    List(Vec<Datum>),
}

impl Datum {
    /// Builds a list datum from anything convertible.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Datum>,
    {
        Datum::List(items.into_iter().map(Into::into).collect())
    }

    /// Returns true if this is the absent value.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Null)
    }

    /// Returns the type tag matching this datum's shape.
    #[must_use]
    pub fn type_tag(&self) -> Option<TypeTag> {
        TypeTag::of(self)
    }

    /// Returns a short name for this datum's shape, for error messages.
    #[must_use]
    pub fn shape_name(&self) -> &'static str {
        self.type_tag().map_or("null", TypeTag::name)
    }

    /// Get this value as text, if it is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Datum::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get this value as a boolean, if it is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Datum::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Get this value as an `i32`, if it is an integer that fits.
    pub fn as_i32(&self) -> Option<i32> {
        self.as_i64().and_then(|n| i32::try_from(n).ok())
    }

    /// Get this value as an `i64`, widening smaller integers.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Datum::Byte(n) => Some(i64::from(*n)),
            Datum::Short(n) => Some(i64::from(*n)),
            Datum::Integer(n) => Some(i64::from(*n)),
            Datum::Long(n) => Some(*n),
            _ => None,
        }
    }

    /// Get this value as an `f64`, widening floats.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Datum::Float(f) => Some(f64::from(*f)),
            Datum::Double(f) => Some(*f),
            _ => None,
        }
    }

    /// Get this value as a character, if it is one.
    pub fn as_char(&self) -> Option<char> {
        match self {
            Datum::Character(c) => Some(*c),
            _ => None,
        }
    }

    /// Get this value as bytes, if it is a byte array.
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Datum::ByteArray(b) => Some(b),
            _ => None,
        }
    }

    /// Get this value as a timestamp, if it is a date.
    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            Datum::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Get this value as a decimal, if it is one.
    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Datum::BigDecimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Get this value as a list, if it is one.
    pub fn as_list(&self) -> Option<&[Datum]> {
        match self {
            Datum::List(items) => Some(items),
            _ => None,
        }
    }
}

impl PartialEq for Datum {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Datum::Null, Datum::Null) => true,
            (Datum::String(a), Datum::String(b)) => a == b,
            (Datum::Boolean(a), Datum::Boolean(b)) => a == b,
            (Datum::Byte(a), Datum::Byte(b)) => a == b,
            (Datum::ByteArray(a), Datum::ByteArray(b)) => a == b,
            (Datum::Character(a), Datum::Character(b)) => a == b,
            (Datum::Date(a), Datum::Date(b)) => a == b,
            (Datum::Double(a), Datum::Double(b)) => double_bits(*a) == double_bits(*b),
            (Datum::Float(a), Datum::Float(b)) => float_bits(*a) == float_bits(*b),
            (Datum::Integer(a), Datum::Integer(b)) => a == b,
            (Datum::Long(a), Datum::Long(b)) => a == b,
            (Datum::Short(a), Datum::Short(b)) => a == b,
            (Datum::BigDecimal(a), Datum::BigDecimal(b)) => a == b,
            (Datum::List(a), Datum::List(b)) => a == b,
            _ => false,
        }
    }
}

fn double_bits(v: f64) -> u64 {
    if v.is_nan() {
        f64::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

fn float_bits(v: f32) -> u32 {
    if v.is_nan() {
        f32::NAN.to_bits()
    } else {
        v.to_bits()
    }
}

impl fmt::Display for Datum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Datum::Null => f.write_str("null"),
            Datum::String(s) => f.write_str(s),
            Datum::Boolean(b) => write!(f, "{b}"),
            Datum::Byte(n) => write!(f, "{n}"),
            Datum::ByteArray(b) => write!(f, "0x{}", hex::encode(b)),
            Datum::Character(c) => write!(f, "{c}"),
            Datum::Date(d) => f.write_str(&d.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Datum::Double(v) => write!(f, "{v}"),
            Datum::Float(v) => write!(f, "{v}"),
            Datum::Integer(n) => write!(f, "{n}"),
            Datum::Long(n) => write!(f, "{n}"),
            Datum::Short(n) => write!(f, "{n}"),
            Datum::BigDecimal(d) => write!(f, "{d}"),
            Datum::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

impl From<bool> for Datum {
    fn from(b: bool) -> Self {
        Datum::Boolean(b)
    }
}

impl From<i8> for Datum {
    fn from(n: i8) -> Self {
        Datum::Byte(n)
    }
}

impl From<i16> for Datum {
    fn from(n: i16) -> Self {
        Datum::Short(n)
    }
}

impl From<i32> for Datum {
    fn from(n: i32) -> Self {
        Datum::Integer(n)
    }
}

impl From<i64> for Datum {
    fn from(n: i64) -> Self {
        Datum::Long(n)
    }
}

impl From<f32> for Datum {
    fn from(v: f32) -> Self {
        Datum::Float(v)
    }
}

impl From<f64> for Datum {
    fn from(v: f64) -> Self {
        Datum::Double(v)
    }
}

impl From<char> for Datum {
    fn from(c: char) -> Self {
        Datum::Character(c)
    }
}

impl From<String> for Datum {
    fn from(s: String) -> Self {
        Datum::String(s)
    }
}

impl From<&str> for Datum {
    fn from(s: &str) -> Self {
        Datum::String(s.to_string())
    }
}

impl From<Vec<u8>> for Datum {
    fn from(b: Vec<u8>) -> Self {
        Datum::ByteArray(b)
    }
}

impl From<&[u8]> for Datum {
    fn from(b: &[u8]) -> Self {
        Datum::ByteArray(b.to_vec())
    }
}

impl From<Vec<Datum>> for Datum {
    fn from(items: Vec<Datum>) -> Self {
        Datum::List(items)
    }
}

impl From<DateTime<Utc>> for Datum {
    fn from(d: DateTime<Utc>) -> Self {
        Datum::Date(d)
    }
}

impl From<Decimal> for Datum {
    fn from(d: Decimal) -> Self {
        Datum::BigDecimal(d)
    }
}

impl<T: Into<Datum>> From<Option<T>> for Datum {
    fn from(v: Option<T>) -> Self {
        v.map_or(Datum::Null, Into::into)
    }
}

impl From<()> for Datum {
    fn from((): ()) -> Self {
        Datum::Null
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn accessors() {
        assert!(Datum::Null.is_null());
        assert_eq!(Datum::Short(7).as_i64(), Some(7));
        assert_eq!(Datum::Long(i64::MAX).as_i32(), None);
        assert_eq!(Datum::Float(1.5).as_f64(), Some(1.5));
        assert_eq!(Datum::from("x").as_str(), Some("x"));
        assert_eq!(Datum::Integer(1).as_str(), None);
        assert_eq!(Datum::Null.shape_name(), "null");
        assert_eq!(Datum::ByteArray(vec![]).shape_name(), "byte[]");
    }

    #[test]
    fn display_is_canonical_text() {
        let date = Utc.with_ymd_and_hms(2021, 6, 30, 12, 0, 5).unwrap();
        assert_eq!(Datum::Date(date).to_string(), "2021-06-30T12:00:05Z");
        assert_eq!(Datum::ByteArray(vec![1, 171]).to_string(), "0x01ab");
        assert_eq!(
            Datum::list([1i32, 2, 3]).to_string(),
            "[1, 2, 3]"
        );
        assert_eq!(Datum::Double(5.0).to_string(), "5");
        assert_eq!(Datum::Null.to_string(), "null");
    }

    #[test]
    fn floats_compare_by_value() {
        assert_eq!(Datum::Double(f64::NAN), Datum::Double(-f64::NAN));
        assert_eq!(Datum::Float(f32::NAN), Datum::Float(f32::NAN));
        assert_ne!(Datum::Double(0.0), Datum::Double(-0.0));
        assert_ne!(Datum::Double(1.0), Datum::Float(1.0));
        assert_eq!(
            Datum::list([f64::NAN, 2.0]),
            Datum::list([f64::NAN, 2.0])
        );
    }

    #[test]
    fn option_conversion() {
        assert_eq!(Datum::from(None::<i32>), Datum::Null);
        assert_eq!(Datum::from(Some(3i32)), Datum::Integer(3));
        assert_eq!(Datum::from(()), Datum::Null);
    }

    #[test]
    fn serde_json_shape() {
        let json = serde_json::to_string(&Datum::Integer(5)).unwrap();
        assert_eq!(json, r#"{"Integer":5}"#);
        let back: Datum = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Datum::Integer(5));

        let dec: Datum = serde_json::from_str(r#"{"BigDecimal":"2.50"}"#).unwrap();
        assert_eq!(dec, Datum::BigDecimal(Decimal::new(25, 1)));
    }
}
