//! Column type taxonomy.

use crate::error::{FlowError, FlowResult};
use crate::value::{hex, Datum, Decimal};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix of the interchange type identifiers (`id_Integer`, ...).
const TYPE_ID_PREFIX: &str = "id_";

/// Declared type of a column.
///
/// Each tag has a canonical value shape (a [`Datum`] variant), a text
/// parser, and an identifier used for type interchange with external ETL
/// tooling. `Object` columns accept any value unchecked; `List` columns
/// accept list values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TypeTag {
    /// UTF-8 text.
    String,
    /// Boolean.
    Boolean,
    /// 8-bit signed integer.
    Byte,
    /// Raw bytes.
    ByteArray,
    /// Single character.
    Character,
    /// UTC timestamp.
    Date,
    /// 64-bit float.
    Double,
    /// 32-bit float.
    Float,
    /// 32-bit signed integer.
    Integer,
    /// 64-bit signed integer.
    Long,
    /// 16-bit signed integer.
    Short,
    /// Any value, unchecked.
    Object,
    /// Fixed-point decimal.
    BigDecimal,
    /// List of values.
    List,
}

impl TypeTag {
    /// Every type tag, in declaration order.
    pub const ALL: [TypeTag; 14] = [
        TypeTag::String,
        TypeTag::Boolean,
        TypeTag::Byte,
        TypeTag::ByteArray,
        TypeTag::Character,
        TypeTag::Date,
        TypeTag::Double,
        TypeTag::Float,
        TypeTag::Integer,
        TypeTag::Long,
        TypeTag::Short,
        TypeTag::Object,
        TypeTag::BigDecimal,
        TypeTag::List,
    ];

    /// Returns the canonical type name (`Integer`, `byte[]`, ...).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            TypeTag::String => "String",
            TypeTag::Boolean => "Boolean",
            TypeTag::Byte => "Byte",
            TypeTag::ByteArray => "byte[]",
            TypeTag::Character => "Character",
            TypeTag::Date => "Date",
            TypeTag::Double => "Double",
            TypeTag::Float => "Float",
            TypeTag::Integer => "Integer",
            TypeTag::Long => "Long",
            TypeTag::Short => "Short",
            TypeTag::Object => "Object",
            TypeTag::BigDecimal => "BigDecimal",
            TypeTag::List => "List",
        }
    }

    /// Returns the upper-case constant name (`BYTE_ARRAY`, `BIGDECIMAL`, ...).
    #[must_use]
    pub const fn constant_name(self) -> &'static str {
        match self {
            TypeTag::String => "STRING",
            TypeTag::Boolean => "BOOLEAN",
            TypeTag::Byte => "BYTE",
            TypeTag::ByteArray => "BYTE_ARRAY",
            TypeTag::Character => "CHARACTER",
            TypeTag::Date => "DATE",
            TypeTag::Double => "DOUBLE",
            TypeTag::Float => "FLOAT",
            TypeTag::Integer => "INTEGER",
            TypeTag::Long => "LONG",
            TypeTag::Short => "SHORT",
            TypeTag::Object => "OBJECT",
            TypeTag::BigDecimal => "BIGDECIMAL",
            TypeTag::List => "LIST",
        }
    }

    /// Returns the interchange identifier (`id_Integer`, `id_byte[]`, ...).
    #[must_use]
    pub fn talend_id(self) -> String {
        format!("{TYPE_ID_PREFIX}{}", self.name())
    }

    /// Resolves an interchange identifier back to its type.
    pub fn from_talend_id(id: &str) -> FlowResult<Self> {
        id.strip_prefix(TYPE_ID_PREFIX)
            .and_then(|name| Self::ALL.into_iter().find(|t| t.name() == name))
            .ok_or_else(|| FlowError::UnknownTypeId { id: id.to_string() })
    }

    /// Returns the tag matching a datum's shape, or `None` for null.
    #[must_use]
    pub fn of(datum: &Datum) -> Option<Self> {
        Some(match datum {
            Datum::Null => return None,
            Datum::String(_) => TypeTag::String,
            Datum::Boolean(_) => TypeTag::Boolean,
            Datum::Byte(_) => TypeTag::Byte,
            Datum::ByteArray(_) => TypeTag::ByteArray,
            Datum::Character(_) => TypeTag::Character,
            Datum::Date(_) => TypeTag::Date,
            Datum::Double(_) => TypeTag::Double,
            Datum::Float(_) => TypeTag::Float,
            Datum::Integer(_) => TypeTag::Integer,
            Datum::Long(_) => TypeTag::Long,
            Datum::Short(_) => TypeTag::Short,
            Datum::BigDecimal(_) => TypeTag::BigDecimal,
            Datum::List(_) => TypeTag::List,
        })
    }

    /// Returns true if the datum already has this type's shape.
    ///
    /// `Object` accepts everything; null fits every type.
    #[must_use]
    pub fn accepts(self, datum: &Datum) -> bool {
        match Self::of(datum) {
            None => true,
            Some(_) if self == TypeTag::Object => true,
            Some(tag) => tag == self,
        }
    }

    /// Parses text into a datum of this type.
    ///
    /// Integral types drop a decimal fraction (`"5.7"` parses as `5`).
    /// Dates accept RFC 3339 or `YYYY-MM-DD`; byte arrays accept
    /// `0x`-prefixed hex, decimals an optional exponent (`1.5e3`). Lists
    /// cannot be parsed from text.
    pub fn parse(self, text: &str) -> FlowResult<Datum> {
        let err = || FlowError::parse_error(text, self.name());
        match self {
            TypeTag::String | TypeTag::Object => Ok(Datum::String(text.to_string())),
            TypeTag::Byte => integral_part(text)
                .and_then(|s| s.parse().ok())
                .map(Datum::Byte)
                .ok_or_else(err),
            TypeTag::Short => integral_part(text)
                .and_then(|s| s.parse().ok())
                .map(Datum::Short)
                .ok_or_else(err),
            TypeTag::Integer => integral_part(text)
                .and_then(|s| s.parse().ok())
                .map(Datum::Integer)
                .ok_or_else(err),
            TypeTag::Long => integral_part(text)
                .and_then(|s| s.parse().ok())
                .map(Datum::Long)
                .ok_or_else(err),
            TypeTag::Float => text.trim().parse().map(Datum::Float).map_err(|_| err()),
            TypeTag::Double => text.trim().parse().map(Datum::Double).map_err(|_| err()),
            TypeTag::Boolean => {
                let t = text.trim();
                if t.eq_ignore_ascii_case("true") {
                    Ok(Datum::Boolean(true))
                } else if t.eq_ignore_ascii_case("false") {
                    Ok(Datum::Boolean(false))
                } else {
                    Err(err())
                }
            }
            TypeTag::Character => text.chars().next().map(Datum::Character).ok_or_else(err),
            TypeTag::Date => parse_date(text).map(Datum::Date).ok_or_else(err),
            TypeTag::BigDecimal => text
                .parse::<Decimal>()
                .map(Datum::BigDecimal)
                .map_err(|_| err()),
            TypeTag::ByteArray => text
                .trim()
                .strip_prefix("0x")
                .and_then(hex::decode)
                .map(Datum::ByteArray)
                .ok_or_else(err),
            TypeTag::List => Err(err()),
        }
    }

    /// Parses several literals, dropping the ones that do not parse.
    #[must_use]
    pub fn parse_list(self, elements: &[&str]) -> Vec<Datum> {
        elements
            .iter()
            .filter_map(|e| self.parse(e).ok())
            .filter(|d| !d.is_null())
            .collect()
    }

    /// Splits text on `separator` and parses each piece, dropping failures.
    #[must_use]
    pub fn parse_separated(self, text: &str, separator: &str) -> Vec<Datum> {
        let pieces: Vec<&str> = text.split(separator).collect();
        self.parse_list(&pieces)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TypeTag {
    type Err = FlowError;

    /// Accepts the canonical name or the constant name, ignoring case.
    fn from_str(s: &str) -> FlowResult<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s) || t.constant_name().eq_ignore_ascii_case(s))
            .ok_or_else(|| FlowError::UnknownTypeId { id: s.to_string() })
    }
}

/// Strips a trailing decimal fraction from an integral literal.
fn integral_part(text: &str) -> Option<&str> {
    let text = text.trim();
    match text.split_once('.') {
        None => Some(text),
        Some((int, frac)) if frac.bytes().all(|b| b.is_ascii_digit() || b == b'.') => Some(int),
        Some(_) => None,
    }
}

fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn talend_ids() {
        assert_eq!(TypeTag::Integer.talend_id(), "id_Integer");
        assert_eq!(TypeTag::ByteArray.talend_id(), "id_byte[]");
        assert_eq!(TypeTag::BigDecimal.talend_id(), "id_BigDecimal");
        for tag in TypeTag::ALL {
            assert_eq!(TypeTag::from_talend_id(&tag.talend_id()).unwrap(), tag);
        }
        assert!(matches!(
            TypeTag::from_talend_id("Integer"),
            Err(FlowError::UnknownTypeId { .. })
        ));
        assert!(TypeTag::from_talend_id("id_Int").is_err());
    }

    #[test]
    fn from_str_accepts_both_names() {
        assert_eq!("integer".parse::<TypeTag>().unwrap(), TypeTag::Integer);
        assert_eq!("BYTE_ARRAY".parse::<TypeTag>().unwrap(), TypeTag::ByteArray);
        assert_eq!("byte[]".parse::<TypeTag>().unwrap(), TypeTag::ByteArray);
        assert!("uuid".parse::<TypeTag>().is_err());
    }

    #[test]
    fn integral_types_drop_fraction() {
        assert_eq!(TypeTag::Integer.parse("5").unwrap(), Datum::Integer(5));
        assert_eq!(TypeTag::Integer.parse("5.7").unwrap(), Datum::Integer(5));
        assert_eq!(TypeTag::Long.parse("-12.").unwrap(), Datum::Long(-12));
        assert_eq!(TypeTag::Short.parse(" 300 ").unwrap(), Datum::Short(300));
        assert!(TypeTag::Byte.parse("300").is_err());
        assert!(TypeTag::Integer.parse("5.x").is_err());
        assert!(TypeTag::Integer.parse("five").is_err());
    }

    #[test]
    fn booleans_are_strict() {
        assert_eq!(TypeTag::Boolean.parse("TRUE").unwrap(), Datum::Boolean(true));
        assert_eq!(TypeTag::Boolean.parse("false").unwrap(), Datum::Boolean(false));
        assert!(matches!(
            TypeTag::Boolean.parse("yes"),
            Err(FlowError::ParseError { .. })
        ));
    }

    #[test]
    fn dates() {
        let expected = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        assert_eq!(TypeTag::Date.parse("2024-03-01").unwrap(), Datum::Date(expected));
        assert_eq!(
            TypeTag::Date.parse("2024-03-01T02:00:00+02:00").unwrap(),
            Datum::Date(expected)
        );
        assert_eq!(
            TypeTag::Date.parse("2024-03-01 00:00:00").unwrap(),
            Datum::Date(expected)
        );
        assert!(TypeTag::Date.parse("01/03/2024").is_err());
    }

    #[test]
    fn misc_parsers() {
        assert_eq!(TypeTag::Character.parse("xyz").unwrap(), Datum::Character('x'));
        assert!(TypeTag::Character.parse("").is_err());
        assert_eq!(
            TypeTag::ByteArray.parse("0x0aff").unwrap(),
            Datum::ByteArray(vec![0x0a, 0xff])
        );
        assert!(TypeTag::ByteArray.parse("0aff").is_err());
        assert_eq!(
            TypeTag::BigDecimal.parse("1.25").unwrap(),
            Datum::BigDecimal(Decimal::new(125, 2))
        );
        assert_eq!(TypeTag::Double.parse("2.5").unwrap(), Datum::Double(2.5));
        assert_eq!(
            TypeTag::Object.parse("anything").unwrap(),
            Datum::String("anything".into())
        );
        assert!(TypeTag::List.parse("[1, 2]").is_err());
    }

    #[test]
    fn separated_lists_skip_garbage() {
        let parsed = TypeTag::Integer.parse_separated("1;2;x;4.5", ";");
        assert_eq!(
            parsed,
            vec![Datum::Integer(1), Datum::Integer(2), Datum::Integer(4)]
        );
        assert!(TypeTag::Boolean.parse_list(&["maybe"]).is_empty());
    }

    #[test]
    fn accepts_shapes() {
        assert!(TypeTag::Integer.accepts(&Datum::Integer(1)));
        assert!(!TypeTag::Integer.accepts(&Datum::Long(1)));
        assert!(TypeTag::Object.accepts(&Datum::Long(1)));
        assert!(TypeTag::Short.accepts(&Datum::Null));
        assert_eq!(TypeTag::of(&Datum::Null), None);
    }
}
