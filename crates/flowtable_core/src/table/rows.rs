//! Row creation and value writes.

use super::{Table, TableState};
use crate::column::{Column, ColumnRef};
use crate::error::{FlowError, FlowResult};
use crate::row::{PendingValue, Row, RowState, RowStatus};
use crate::value::{Datum, Value};
use tracing::trace;

impl Table {
    /// Creates a row pre-filled with column defaults.
    ///
    /// Transactional tables queue the row for the next commit; other
    /// tables append it to the committed rows right away, evicting the
    /// oldest row when `max_size` is reached.
    pub fn new_row(&self) -> FlowResult<Row> {
        let defers = self.shared.config.defers_writes();
        let transactional = self.supports_transactions();

        let mut state = self.shared.state.write();
        let row = Row::new(&self.shared);
        {
            let mut row_state = row.state();
            for column in &state.columns {
                if let Some(default) = column.default_value() {
                    let value = Value::new(column, default.clone())?;
                    if defers {
                        row_state.draft.insert(column.id(), PendingValue::Set(value));
                    } else {
                        row_state.committed.insert(column.id(), value);
                    }
                }
            }
            if transactional {
                row_state.pending = true;
            } else {
                row_state.status = RowStatus::Committed;
                row_state.present = true;
            }
        }

        if transactional {
            if let Some(evicted) = state.draft_rows.append(row.clone()) {
                drop_evicted_draft(&evicted);
            }
        } else if let Some(evicted) = state.rows.append(row.clone()) {
            evicted.state().detach(false);
            self.shared.stats.record_evicted(1);
        }
        self.shared.stats.record_row_created();

        trace!(
            table = %self.name(),
            rows = state.rows.len(),
            drafts = state.draft_rows.len(),
            "row created"
        );
        Ok(row)
    }

    /// Writes a value into a row of this table.
    ///
    /// Text is parsed through the column type. A null value removes the
    /// column's entry. On tables that defer writes the value is buffered
    /// until commit; a buffered write to a committed row queues the row
    /// for the next commit as an update.
    ///
    /// # Errors
    ///
    /// Checked in this order:
    /// - `DetachedRow` if the row belongs to another table
    /// - `UnknownColumn` if the column is not part of this table
    /// - `KeyColumnImmutable` for key columns of rows already merged
    /// - `DetachedRow` if the row was rolled back, evicted or truncated
    /// - `TypeMismatch` / `ParseError` if the value does not fit
    pub fn set_value<'a>(
        &self,
        row: &Row,
        column: impl Into<ColumnRef<'a>>,
        value: impl Into<Datum>,
    ) -> FlowResult<()> {
        if !row.belongs_to(self.shared.id) {
            return Err(FlowError::detached_row(self.name()));
        }
        let column = column.into();

        let mut state = self.shared.state.write();
        let column = state.resolve(&self.shared.name, self.shared.id, column)?;
        let mut row_state = row.state();
        if row_state.present && column.is_key() {
            return Err(FlowError::KeyColumnImmutable {
                column: column.name().to_string(),
                table: self.name().to_string(),
            });
        }
        if row_state.status == RowStatus::Detached {
            return Err(FlowError::detached_row(self.name()));
        }

        let value = Value::new(&column, value)?;
        let value = (!value.is_null()).then_some(value);
        self.stage(&mut state, row, &mut row_state, &column, value);
        Ok(())
    }

    /// Returns the committed values of a column, in row order.
    ///
    /// Rows without a value for the column are skipped.
    ///
    /// # Errors
    ///
    /// `UnknownColumn` if the column is not part of this table.
    pub fn slice_column<'a>(&self, column: impl Into<ColumnRef<'a>>) -> FlowResult<Vec<Value>> {
        let state = self.shared.state.read();
        let column = state.resolve(&self.shared.name, self.shared.id, column.into())?;
        let id = column.id();
        Ok(state
            .rows
            .iter()
            .filter_map(|row| row.state().committed.get(&id).cloned())
            .collect())
    }

    pub(crate) fn reset_row(&self, row: &Row) -> FlowResult<()> {
        if !row.belongs_to(self.shared.id) {
            return Err(FlowError::detached_row(self.name()));
        }
        let mut state = self.shared.state.write();
        let columns = state.columns.clone();
        let mut row_state = row.state();
        if row_state.status == RowStatus::Detached {
            return Err(FlowError::detached_row(self.name()));
        }
        for column in &columns {
            // Merged key values are frozen.
            if row_state.present && column.is_key() {
                continue;
            }
            let value = column
                .default_value()
                .map(|d| Value::new(column, d.clone()))
                .transpose()?;
            self.stage(&mut state, row, &mut row_state, column, value);
        }
        Ok(())
    }

    pub(crate) fn duplicate_row(&self, source: &Row) -> FlowResult<Row> {
        if !source.belongs_to(self.shared.id) {
            return Err(FlowError::detached_row(self.name()));
        }
        let values: Vec<(Column, Datum)> = {
            let state = self.shared.state.read();
            let source_state = source.state();
            state
                .columns
                .iter()
                .map(|c| {
                    let datum = source_state.latest(c.id()).cloned().unwrap_or(Datum::Null);
                    (c.clone(), datum)
                })
                .collect()
        };

        let copy = self.new_row()?;
        for (column, datum) in values {
            self.set_value(&copy, &column, datum)?;
        }
        Ok(copy)
    }

    /// Stores a value (or clears it) following the table's write policy.
    fn stage(
        &self,
        state: &mut TableState,
        row: &Row,
        row_state: &mut RowState,
        column: &Column,
        value: Option<Value>,
    ) {
        let id = column.id();
        if !self.shared.config.defers_writes() {
            match value {
                Some(v) => {
                    row_state.committed.insert(id, v);
                }
                None => {
                    row_state.committed.remove(&id);
                }
            }
            return;
        }

        let pending = value.map_or(PendingValue::Clear, PendingValue::Set);
        row_state.draft.insert(id, pending);
        match row_state.status {
            RowStatus::Fresh => row_state.status = RowStatus::Drafted,
            RowStatus::Committed if !row_state.pending => {
                row_state.pending = true;
                if let Some(evicted) = state.draft_rows.append(row.clone()) {
                    drop_evicted_draft(&evicted);
                }
                trace!(table = %self.name(), "committed row queued for update");
            }
            _ => {}
        }
    }
}

/// Releases a row pushed out of the draft buffer.
///
/// Committed rows lose their buffered update; new rows leave the table.
fn drop_evicted_draft(row: &Row) {
    let mut row_state = row.state();
    if row_state.status == RowStatus::Committed {
        row_state.draft.clear();
        row_state.pending = false;
    } else {
        row_state.detach(false);
    }
}
