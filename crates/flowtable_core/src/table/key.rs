//! Primary key tuples.

use crate::value::Datum;
use std::fmt;

/// The values of a row's key columns, in key column order.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyTuple(Vec<Datum>);

impl KeyTuple {
    pub(crate) fn new(values: Vec<Datum>) -> Self {
        Self(values)
    }

    /// Returns the key values.
    #[must_use]
    pub fn values(&self) -> &[Datum] {
        &self.0
    }

    /// Returns the number of key columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the tuple holds no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for KeyTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, v) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{v}")?;
        }
        f.write_str(")")
    }
}
