//! Typed values.
//!
//! A [`Value`] is an immutable [`Datum`] that has been checked against
//! (or parsed into) the declared type of a [`Column`].

mod datum;
mod decimal;
mod type_tag;

pub use datum::Datum;
pub use decimal::{Decimal, MAX_SCALE};
pub use type_tag::TypeTag;

use crate::column::Column;
use crate::error::{FlowError, FlowResult};
use std::fmt;

/// An immutable value bound to a column.
///
/// Two values are equal when their data are equal; the column they were
/// built for is not part of equality.
#[derive(Debug, Clone)]
pub struct Value {
    column: Column,
    datum: Datum,
}

impl Value {
    /// Builds a value for `column`, coercing text through the column type.
    ///
    /// # Errors
    ///
    /// `ParseError` if text does not parse as the column type,
    /// `TypeMismatch` if a non-text datum has the wrong shape.
    pub fn new(column: &Column, datum: impl Into<Datum>) -> FlowResult<Self> {
        let datum = coerce(column.type_tag(), column.name(), datum.into())?;
        Ok(Self {
            column: column.clone(),
            datum,
        })
    }

    /// Returns the column this value was built for.
    #[must_use]
    pub fn column(&self) -> &Column {
        &self.column
    }

    /// Returns the underlying datum.
    #[must_use]
    pub fn datum(&self) -> &Datum {
        &self.datum
    }

    /// Consumes the value, returning the datum.
    #[must_use]
    pub fn into_datum(self) -> Datum {
        self.datum
    }

    /// Returns true if the value is absent.
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.datum.is_null()
    }

    /// Returns true if the value equals its column's default.
    ///
    /// Always false for a null value or a column without default.
    #[must_use]
    pub fn is_column_default(&self) -> bool {
        !self.datum.is_null() && self.column.default_value() == Some(&self.datum)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.datum == other.datum
    }
}

impl PartialEq<Datum> for Value {
    fn eq(&self, other: &Datum) -> bool {
        &self.datum == other
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.datum.fmt(f)
    }
}

/// Checks `datum` against `tag`, parsing it when it is text.
pub(crate) fn coerce(tag: TypeTag, column: &str, datum: Datum) -> FlowResult<Datum> {
    if tag.accepts(&datum) {
        return Ok(datum);
    }
    match datum {
        Datum::String(text) => tag.parse(&text),
        other => Err(FlowError::TypeMismatch {
            column: column.to_string(),
            expected: tag.name().to_string(),
            actual: other.shape_name().to_string(),
        }),
    }
}

/// Lower-case hex helpers for `byte[]` text forms.
pub(crate) mod hex {
    use std::fmt::Write;

    pub(crate) fn encode(bytes: &[u8]) -> String {
        let mut out = String::with_capacity(bytes.len() * 2);
        for b in bytes {
            // Writing to a String cannot fail.
            let _ = write!(out, "{b:02x}");
        }
        out
    }

    pub(crate) fn decode(text: &str) -> Option<Vec<u8>> {
        if text.len() % 2 != 0 || !text.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        (0..text.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ColumnSpec, FlowConfig, Table};

    fn table() -> Table {
        let table = Table::new("values", FlowConfig::new()).unwrap();
        table.add_column(ColumnSpec::new("n", TypeTag::Integer).default(7)).unwrap();
        table.add_column(("any", TypeTag::Object)).unwrap();
        table.add_column(("items", TypeTag::List)).unwrap();
        table
    }

    #[test]
    fn text_is_parsed_through_column_type() {
        let t = table();
        let n = t.column("n").unwrap();
        let v = Value::new(&n, "42").unwrap();
        assert_eq!(v.datum(), &Datum::Integer(42));
        assert_eq!(v, Value::new(&n, 42).unwrap());
    }

    #[test]
    fn wrong_shape_is_a_type_mismatch() {
        let t = table();
        let n = t.column("n").unwrap();
        let err = Value::new(&n, 1.5f64).unwrap_err();
        assert!(matches!(err, FlowError::TypeMismatch { ref expected, .. } if expected == "Integer"));
        assert!(matches!(
            Value::new(&n, "x").unwrap_err(),
            FlowError::ParseError { .. }
        ));
    }

    #[test]
    fn object_and_list_columns() {
        let t = table();
        let any = t.column("any").unwrap();
        assert_eq!(Value::new(&any, 1.5f64).unwrap().datum(), &Datum::Double(1.5));
        assert_eq!(Value::new(&any, "text").unwrap().datum(), &Datum::from("text"));

        let items = t.column("items").unwrap();
        let list = Value::new(&items, Datum::list([1i32, 2])).unwrap();
        assert_eq!(list.datum().as_list().map(<[Datum]>::len), Some(2));
        assert!(Value::new(&items, 3i32).is_err());
    }

    #[test]
    fn null_and_defaults() {
        let t = table();
        let n = t.column("n").unwrap();
        let null = Value::new(&n, Datum::Null).unwrap();
        assert!(null.is_null());
        assert!(!null.is_column_default());
        assert!(Value::new(&n, 7).unwrap().is_column_default());
        assert!(!Value::new(&n, 8).unwrap().is_column_default());
        assert!(!Value::new(&t.column("any").unwrap(), 7).unwrap().is_column_default());
    }

    #[test]
    fn equality_ignores_column() {
        let t = table();
        let a = Value::new(&t.column("n").unwrap(), 3).unwrap();
        let b = Value::new(&t.column("any").unwrap(), 3).unwrap();
        assert_eq!(a, b);
        assert_eq!(a, Datum::Integer(3));
    }

    #[test]
    fn hex_helpers() {
        assert_eq!(hex::encode(&[0, 15, 255]), "000fff");
        assert_eq!(hex::decode("000fff"), Some(vec![0, 15, 255]));
        assert_eq!(hex::decode("0"), None);
        assert_eq!(hex::decode("zz"), None);
        assert_eq!(hex::decode("+f"), None);
    }
}
