//! Rows.
//!
//! A [`Row`] is a handle onto shared row state: the committed values, the
//! draft (not yet committed) writes, and where the row stands in its
//! table's lifecycle. Writes always go through the owning [`Table`] so
//! that key and routing rules are enforced under the table lock.

use crate::column::{Column, ColumnRef};
use crate::error::{FlowError, FlowResult};
use crate::table::{KeyTuple, Table, TableShared};
use crate::types::{ColumnId, TableId};
use crate::value::{Datum, Value};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

/// Where a row stands in its table's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowStatus {
    /// Created, holding only column defaults.
    Fresh,
    /// Has buffered writes waiting for commit.
    Drafted,
    /// Part of the table's committed rows.
    Committed,
    /// No longer part of the table (rolled back, evicted or truncated).
    Detached,
}

/// A buffered write.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum PendingValue {
    /// Store this value on commit.
    Set(Value),
    /// Remove the column's value on commit.
    Clear,
}

#[derive(Debug)]
pub(crate) struct RowState {
    /// Committed values, keyed by column.
    pub(crate) committed: BTreeMap<ColumnId, Value>,
    /// Buffered writes, keyed by column.
    pub(crate) draft: BTreeMap<ColumnId, PendingValue>,
    pub(crate) status: RowStatus,
    /// Row has been merged into the table at least once and its key is frozen.
    pub(crate) present: bool,
    /// Row is queued in the table's draft rows.
    pub(crate) pending: bool,
}

impl RowState {
    /// Latest datum for a column: the draft if any, else the committed value.
    pub(crate) fn latest(&self, id: ColumnId) -> Option<&Datum> {
        match self.draft.get(&id) {
            Some(PendingValue::Set(v)) => Some(v.datum()),
            Some(PendingValue::Clear) => None,
            None => self.committed.get(&id).map(Value::datum),
        }
    }

    /// Applies buffered writes to the committed values.
    pub(crate) fn merge_draft(&mut self) {
        for (id, pending) in std::mem::take(&mut self.draft) {
            match pending {
                PendingValue::Set(v) => {
                    self.committed.insert(id, v);
                }
                PendingValue::Clear => {
                    self.committed.remove(&id);
                }
            }
        }
    }

    /// Marks the row as no longer part of its table.
    pub(crate) fn detach(&mut self, present: bool) {
        self.draft.clear();
        self.status = RowStatus::Detached;
        self.present = present;
        self.pending = false;
    }

    pub(crate) fn key_tuple(&self, key_columns: &[Column]) -> Option<KeyTuple> {
        if key_columns.is_empty() {
            return None;
        }
        key_columns
            .iter()
            .map(|c| self.latest(c.id()).cloned())
            .collect::<Option<Vec<_>>>()
            .map(KeyTuple::new)
    }
}

struct RowInner {
    table: Weak<TableShared>,
    table_id: TableId,
    table_name: String,
    state: Mutex<RowState>,
}

/// Handle to a row of a table.
///
/// Cloning is cheap; clones refer to the same row.
#[derive(Clone)]
pub struct Row(Arc<RowInner>);

impl Row {
    pub(crate) fn new(table: &Arc<TableShared>) -> Self {
        Self(Arc::new(RowInner {
            table: Arc::downgrade(table),
            table_id: table.id,
            table_name: table.name.clone(),
            state: Mutex::new(RowState {
                committed: BTreeMap::new(),
                draft: BTreeMap::new(),
                status: RowStatus::Fresh,
                present: false,
                pending: false,
            }),
        }))
    }

    pub(crate) fn state(&self) -> parking_lot::MutexGuard<'_, RowState> {
        self.0.state.lock()
    }

    /// Returns the owning table, if it still exists.
    #[must_use]
    pub fn table(&self) -> Option<Table> {
        self.0.table.upgrade().map(Table::from_shared)
    }

    /// Returns the ID of the owning table.
    #[must_use]
    pub fn table_id(&self) -> TableId {
        self.0.table_id
    }

    /// Returns the name of the owning table.
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.0.table_name
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub fn status(&self) -> RowStatus {
        self.state().status
    }

    /// Returns true once the row has been merged into its table.
    ///
    /// Stays true for a row rolled back before its first commit, which
    /// freezes its key columns.
    #[must_use]
    pub fn present_in_table(&self) -> bool {
        self.state().present
    }

    /// Returns true if the row has buffered writes.
    #[must_use]
    pub fn is_changed(&self) -> bool {
        !self.state().draft.is_empty()
    }

    /// Returns true if the row is waiting for the next commit.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state().pending
    }

    /// Returns the number of committed values.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.state().committed.len()
    }

    /// Returns true if the row holds neither committed nor buffered values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        let state = self.state();
        state.committed.is_empty() && state.draft.is_empty()
    }

    /// Returns the committed datum for a column.
    ///
    /// # Errors
    ///
    /// `UnknownColumn` if the column is not part of the table.
    pub fn get_value<'a>(&self, column: impl Into<ColumnRef<'a>>) -> FlowResult<Option<Datum>> {
        Ok(self.value(column)?.map(Value::into_datum))
    }

    /// Returns the committed value for a column.
    pub fn value<'a>(&self, column: impl Into<ColumnRef<'a>>) -> FlowResult<Option<Value>> {
        let column = self.resolve(column.into())?;
        Ok(self.state().committed.get(&column.id()).cloned())
    }

    /// Returns the latest datum for a column, buffered writes first.
    pub fn get_latest<'a>(&self, column: impl Into<ColumnRef<'a>>) -> FlowResult<Option<Datum>> {
        let column = self.resolve(column.into())?;
        Ok(self.state().latest(column.id()).cloned())
    }

    /// Returns the committed values in column order.
    #[must_use]
    pub fn values(&self) -> Vec<Value> {
        self.state().committed.values().cloned().collect()
    }

    /// Writes a value through the owning table.
    ///
    /// # Errors
    ///
    /// `DetachedRow` if the table is gone or the row left it, plus every
    /// error of [`Table::set_value`].
    pub fn set_value<'a>(
        &self,
        column: impl Into<ColumnRef<'a>>,
        value: impl Into<Datum>,
    ) -> FlowResult<()> {
        self.owner()?.set_value(self, column, value)
    }

    /// Returns the latest key values, or `None` if a key column has no
    /// value or the table has no key.
    #[must_use]
    pub fn key_tuple(&self) -> Option<KeyTuple> {
        let table = self.table()?;
        let keys = table.key_columns();
        self.state().key_tuple(&keys)
    }

    /// Restores column defaults.
    ///
    /// Committed key values stay untouched.
    pub fn reset(&self) -> FlowResult<()> {
        self.owner()?.reset_row(self)
    }

    /// Creates a new row in the same table holding this row's latest values.
    pub fn duplicate(&self) -> FlowResult<Row> {
        self.owner()?.duplicate_row(self)
    }

    /// Returns the committed values keyed by column name.
    #[must_use]
    pub fn to_record(&self) -> BTreeMap<String, Datum> {
        self.state()
            .committed
            .values()
            .map(|v| (v.column().name().to_string(), v.datum().clone()))
            .collect()
    }

    /// Runs `f` against this row.
    pub fn visit<R>(&self, f: impl FnOnce(&Row) -> R) -> R {
        f(self)
    }

    pub(crate) fn belongs_to(&self, table_id: TableId) -> bool {
        self.0.table_id == table_id
    }

    fn owner(&self) -> FlowResult<Table> {
        self.table()
            .ok_or_else(|| FlowError::detached_row(&self.0.table_name))
    }

    fn resolve(&self, column: ColumnRef<'_>) -> FlowResult<Column> {
        match column {
            ColumnRef::Column(c) if c.belongs_to(self.0.table_id) => Ok(c.clone()),
            ColumnRef::Column(c) => Err(FlowError::unknown_column(c.name(), &self.0.table_name)),
            other => self.owner()?.resolve_column(other),
        }
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Row {}

impl fmt::Debug for Row {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state();
        f.debug_struct("Row")
            .field("table", &self.0.table_name)
            .field("status", &state.status)
            .field("present", &state.present)
            .field("values", &state.committed.len())
            .field("drafts", &state.draft.len())
            .finish()
    }
}

impl fmt::Display for Row {
    /// Renders `{Row flow=t, id=1 (Integer - PK), name='foo' (String)}`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{Row flow={}", self.0.table_name)?;
        let state = self.state();
        for value in state.committed.values() {
            let column = value.column();
            write!(f, ", {}=", column.name())?;
            match value.datum() {
                Datum::String(s) => write!(f, "'{s}'")?,
                other => write!(f, "{other}")?,
            }
            if column.is_key() {
                write!(f, " ({} - PK)", column.type_tag())?;
            } else {
                write!(f, " ({})", column.type_tag())?;
            }
        }
        f.write_str("}")
    }
}
