//! Mapping between rows and caller-defined record types.
//!
//! A [`RecordMapping`] lists, for each field of a record type, the column
//! name it maps to, the column type it expects, and a getter/setter pair.
//! Columns are matched by name ignoring case; fields whose column does not
//! exist are skipped, and a column with a different type is an error.
//!
//! ```rust,ignore
//! #[derive(Default)]
//! struct Customer { id: i32, name: String }
//!
//! let mapping = RecordMapping::new()
//!     .field("id", TypeTag::Integer,
//!         |c: &Customer| c.id.into(),
//!         |c, d| { c.id = d.as_i32().unwrap_or_default(); Ok(()) })
//!     .field("name", TypeTag::String,
//!         |c: &Customer| c.name.as_str().into(),
//!         |c, d| { c.name = d.as_str().unwrap_or_default().to_string(); Ok(()) });
//!
//! mapping.write_row(&customer, &row)?;
//! let back: Customer = mapping.read_row(&row)?;
//! ```

use crate::column::{Column, ColumnSpec};
use crate::error::{FlowError, FlowResult};
use crate::row::Row;
use crate::table::Table;
use crate::value::{Datum, TypeTag};
use std::fmt;

type Getter<T> = Box<dyn Fn(&T) -> Datum + Send + Sync>;
type Setter<T> = Box<dyn Fn(&mut T, Datum) -> FlowResult<()> + Send + Sync>;

struct FieldMapping<T> {
    name: String,
    type_tag: TypeTag,
    get: Getter<T>,
    set: Setter<T>,
}

/// Column-name-to-accessor mapping for a record type.
pub struct RecordMapping<T> {
    fields: Vec<FieldMapping<T>>,
}

impl<T> RecordMapping<T> {
    /// Creates an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self { fields: Vec::new() }
    }

    /// Adds a field.
    #[must_use]
    pub fn field<G, S>(mut self, name: impl Into<String>, type_tag: TypeTag, get: G, set: S) -> Self
    where
        G: Fn(&T) -> Datum + Send + Sync + 'static,
        S: Fn(&mut T, Datum) -> FlowResult<()> + Send + Sync + 'static,
    {
        self.fields.push(FieldMapping {
            name: name.into(),
            type_tag,
            get: Box::new(get),
            set: Box::new(set),
        });
        self
    }

    /// Returns the mapped field names and types, in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, TypeTag)> + '_ {
        self.fields.iter().map(|f| (f.name.as_str(), f.type_tag))
    }

    /// Returns the number of mapped fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if no field is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Adds a column for every mapped field the table does not have yet.
    ///
    /// Returns the columns that were created.
    pub fn define_columns(&self, table: &Table) -> FlowResult<Vec<Column>> {
        let mut created = Vec::new();
        for field in &self.fields {
            if !table.has_column(&field.name) {
                created.push(table.add_column(ColumnSpec::new(field.name.clone(), field.type_tag))?);
            }
        }
        Ok(created)
    }

    /// Copies every mapped field into the row.
    ///
    /// # Errors
    ///
    /// `ColumnTypeMismatch` if a column's type differs from the field's,
    /// plus every error of [`Row::set_value`].
    pub fn write_row(&self, record: &T, row: &Row) -> FlowResult<()> {
        let table = row
            .table()
            .ok_or_else(|| FlowError::detached_row(row.table_name()))?;
        for field in &self.fields {
            if let Some(column) = self.column_for(&table, field)? {
                row.set_value(&column, (field.get)(record))?;
            }
        }
        Ok(())
    }

    /// Builds a record from the row's committed values.
    ///
    /// Fields without a column keep their default; columns without a
    /// value hand `Datum::Null` to the setter.
    pub fn read_row(&self, row: &Row) -> FlowResult<T>
    where
        T: Default,
    {
        let table = row
            .table()
            .ok_or_else(|| FlowError::detached_row(row.table_name()))?;
        let mut record = T::default();
        for field in &self.fields {
            if let Some(column) = self.column_for(&table, field)? {
                let datum = row.get_value(&column)?.unwrap_or(Datum::Null);
                (field.set)(&mut record, datum)?;
            }
        }
        Ok(record)
    }

    fn column_for(&self, table: &Table, field: &FieldMapping<T>) -> FlowResult<Option<Column>> {
        let Some(column) = table.column(&field.name) else {
            return Ok(None);
        };
        if column.type_tag() != field.type_tag {
            return Err(FlowError::ColumnTypeMismatch {
                column: column.name().to_string(),
                table: table.name().to_string(),
                expected: column.type_tag().name().to_string(),
                actual: field.type_tag.name().to_string(),
            });
        }
        Ok(Some(column))
    }
}

impl<T> Default for RecordMapping<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for RecordMapping<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.fields()).finish()
    }
}
