//! Column management.

use super::Table;
use crate::column::{Column, ColumnSpec};
use crate::error::{FlowError, FlowResult};
use crate::value::coerce;
use tracing::debug;

impl Table {
    /// Adds a column.
    ///
    /// A text default is parsed through the column type. Key columns need
    /// a transactional table without committed or draft rows.
    ///
    /// # Errors
    ///
    /// - `InvalidName` if the name is blank
    /// - `NameAlreadyUsed` if another column has the same name ignoring case
    /// - `InvalidDefault` or `ParseError` if the default does not fit the type
    /// - `KeyNotSupported` / `NonEmptyTable` for rejected key columns
    pub fn add_column(&self, spec: impl Into<ColumnSpec>) -> FlowResult<Column> {
        let mut spec = spec.into();
        if spec.name.trim().is_empty() {
            return Err(FlowError::invalid_name(spec.name));
        }

        let mut state = self.shared.state.write();
        let lower = spec.name.to_lowercase();
        if state.column_index.contains_key(&lower) {
            return Err(FlowError::name_already_used(spec.name, self.name()));
        }

        if let Some(default) = spec.default.take() {
            let rendered = default.to_string();
            let coerced = coerce(spec.type_tag, &spec.name, default).map_err(|e| match e {
                FlowError::TypeMismatch { .. } => FlowError::InvalidDefault {
                    column: spec.name.clone(),
                    expected: spec.type_tag.name().to_string(),
                    value: rendered,
                },
                other => other,
            })?;
            spec.default = Some(coerced);
        }

        if spec.is_key {
            if !self.supports_transactions() {
                return Err(FlowError::KeyNotSupported {
                    table: self.name().to_string(),
                });
            }
            if !state.rows.is_empty() || !state.draft_rows.is_empty() {
                return Err(FlowError::NonEmptyTable {
                    table: self.name().to_string(),
                });
            }
        }

        let id = state.next_column_id;
        state.next_column_id = id.next();
        let column = Column::new(id, self.shared.id, state.columns.len(), spec);
        state.columns.push(column.clone());
        state.column_index.insert(lower, column.clone());
        if column.is_key() {
            state.key_columns.push(column.clone());
        }

        debug!(
            table = %self.name(),
            column = %column.name(),
            position = column.position(),
            key = column.is_key(),
            "column added"
        );
        Ok(column)
    }

    /// Removes a column and clears its values from every row.
    ///
    /// Columns of other tables, or already removed, are ignored. Later
    /// columns move down one position.
    ///
    /// # Errors
    ///
    /// `KeyColumnInUse` if the column is a key column and the table has
    /// committed or draft rows.
    pub fn remove_column(&self, column: &Column) -> FlowResult<()> {
        if !column.belongs_to(self.shared.id) {
            return Ok(());
        }

        let mut state = self.shared.state.write();
        if column.is_key() && (!state.rows.is_empty() || !state.draft_rows.is_empty()) {
            return Err(FlowError::KeyColumnInUse {
                column: column.name().to_string(),
                table: self.name().to_string(),
            });
        }

        let Some(position) = state.columns.iter().position(|c| c == column) else {
            return Ok(());
        };
        for later in &state.columns[position + 1..] {
            later.set_position(later.position() - 1);
        }
        state.columns.remove(position);
        state.column_index.remove(&column.name().to_lowercase());
        state.key_columns.retain(|c| c != column);

        let id = column.id();
        for row in state.rows.iter().chain(state.draft_rows.iter()) {
            let mut row_state = row.state();
            row_state.committed.remove(&id);
            row_state.draft.remove(&id);
        }
        column.detach();

        debug!(table = %self.name(), column = %column.name(), "column removed");
        Ok(())
    }

    /// Returns the column with the given name, ignoring case.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<Column> {
        self.shared
            .state
            .read()
            .column_index
            .get(&name.to_lowercase())
            .cloned()
    }

    /// Returns the column at `index`.
    #[must_use]
    pub fn column_at(&self, index: usize) -> Option<Column> {
        self.shared.state.read().columns.get(index).cloned()
    }

    /// Returns the columns in position order.
    #[must_use]
    pub fn columns(&self) -> Vec<Column> {
        self.shared.state.read().columns.clone()
    }

    /// Returns the key columns in declaration order.
    #[must_use]
    pub fn key_columns(&self) -> Vec<Column> {
        self.shared.state.read().key_columns.clone()
    }

    /// Returns true if a column has this name, ignoring case.
    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.shared
            .state
            .read()
            .column_index
            .contains_key(&name.to_lowercase())
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.shared.state.read().columns.len()
    }

    /// Returns true if the table has at least one column.
    #[must_use]
    pub fn has_columns(&self) -> bool {
        !self.shared.state.read().columns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::{ColumnSpec, Datum, FlowConfig, FlowError, Table, TypeTag};

    fn txn_table() -> Table {
        Table::new("t", FlowConfig::new().transactional(true)).unwrap()
    }

    #[test]
    fn positions_are_dense() {
        let t = txn_table();
        let a = t.add_column(("a", TypeTag::String)).unwrap();
        let b = t.add_column(("b", TypeTag::Integer)).unwrap();
        let c = t.add_column(("c", TypeTag::Double)).unwrap();
        assert_eq!((a.position(), b.position(), c.position()), (0, 1, 2));

        t.remove_column(&a).unwrap();
        assert_eq!((b.position(), c.position()), (0, 1));
        assert_eq!(t.column_at(0), Some(b));
        assert!(!a.is_attached());
        assert!(!t.has_column("a"));
        assert_eq!(t.column_count(), 2);
    }

    #[test]
    fn names_are_case_insensitive() {
        let t = txn_table();
        t.add_column(("Name", TypeTag::String)).unwrap();
        assert!(t.has_column("NAME"));
        let err = t.add_column(("name", TypeTag::Integer)).unwrap_err();
        assert!(matches!(err, FlowError::NameAlreadyUsed { ref name, .. } if name == "name"));
        assert!(matches!(
            t.add_column(("", TypeTag::Integer)),
            Err(FlowError::InvalidName { .. })
        ));
    }

    #[test]
    fn text_default_is_coerced() {
        let t = txn_table();
        let x = t
            .add_column(ColumnSpec::new("x", TypeTag::Integer).default("5"))
            .unwrap();
        assert_eq!(x.default_value(), Some(&Datum::Integer(5)));
    }

    #[test]
    fn bad_defaults() {
        let t = txn_table();
        let err = t
            .add_column(ColumnSpec::new("x", TypeTag::Integer).default(1.5f64))
            .unwrap_err();
        assert!(matches!(err, FlowError::InvalidDefault { ref value, .. } if value == "1.5"));
        assert!(matches!(
            t.add_column(ColumnSpec::new("y", TypeTag::Integer).default("five")),
            Err(FlowError::ParseError { .. })
        ));
        assert!(!t.has_columns());
    }

    #[test]
    fn key_columns_need_transactions() {
        let t = Table::new("plain", FlowConfig::new()).unwrap();
        assert!(matches!(
            t.add_column(ColumnSpec::new("id", TypeTag::Integer).key()),
            Err(FlowError::KeyNotSupported { .. })
        ));
    }

    #[test]
    fn key_columns_need_empty_table() {
        let t = txn_table();
        t.add_column(("name", TypeTag::String)).unwrap();
        t.new_row().unwrap();
        assert!(matches!(
            t.add_column(ColumnSpec::new("id", TypeTag::Integer).key()),
            Err(FlowError::NonEmptyTable { .. })
        ));
        t.rollback();
        let id = t
            .add_column(ColumnSpec::new("id", TypeTag::Integer).key())
            .unwrap();
        assert_eq!(t.key_columns(), vec![id]);
    }

    #[test]
    fn key_column_in_use() {
        let t = txn_table();
        let id = t
            .add_column(ColumnSpec::new("id", TypeTag::Integer).key())
            .unwrap();
        let row = t.new_row().unwrap();
        row.set_value("id", 1).unwrap();
        t.commit().unwrap();

        assert!(matches!(
            t.remove_column(&id),
            Err(FlowError::KeyColumnInUse { .. })
        ));
        assert!(id.is_attached());
    }

    #[test]
    fn removing_a_column_clears_values() {
        let t = txn_table();
        let a = t.add_column(("a", TypeTag::Integer)).unwrap();
        t.add_column(("b", TypeTag::Integer)).unwrap();
        let committed = t.new_row().unwrap();
        committed.set_value("a", 1).unwrap();
        committed.set_value("b", 2).unwrap();
        t.commit().unwrap();
        let draft = t.new_row().unwrap();
        draft.set_value("a", 3).unwrap();

        t.remove_column(&a).unwrap();
        assert_eq!(committed.value_count(), 1);
        assert!(!draft.is_changed());
        assert!(committed.get_value("a").is_err());
        assert_eq!(committed.get_value("b").unwrap(), Some(Datum::Integer(2)));
    }

    #[test]
    fn foreign_column_removal_is_a_no_op() {
        let t = txn_table();
        let other = txn_table();
        let foreign = other.add_column(("a", TypeTag::Integer)).unwrap();
        t.add_column(("a", TypeTag::Integer)).unwrap();
        t.remove_column(&foreign).unwrap();
        assert!(t.has_column("a"));
        assert!(foreign.is_attached());
    }

    #[test]
    fn comments_are_kept() {
        let t = txn_table();
        let c = t
            .add_column(ColumnSpec::new("c", TypeTag::String).comment("customer code"))
            .unwrap();
        assert_eq!(c.comment(), Some("customer code"));
    }
}
