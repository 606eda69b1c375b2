//! Tables (flows).
//!
//! A [`Table`] owns an ordered column set, the committed rows, the draft
//! rows waiting for commit and the index of committed key tuples. All of
//! it sits behind one `RwLock`; operations that change rows or schema take
//! the write guard, reads take the read guard and see whole sequences.
//! Each row additionally guards its own values with a mutex, always
//! acquired after the table lock.

mod key;
mod rows;
mod schema;
mod txn;

pub use key::KeyTuple;
pub use txn::CommitOutcome;

use crate::column::{Column, ColumnRef};
use crate::config::FlowConfig;
use crate::error::{FlowError, FlowResult};
use crate::row::Row;
use crate::sequence::BoundedSequence;
use crate::stats::TableStats;
use crate::types::{ColumnId, TableId};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

pub(crate) struct TableShared {
    pub(crate) id: TableId,
    pub(crate) name: String,
    config: FlowConfig,
    state: RwLock<TableState>,
    stats: TableStats,
}

struct TableState {
    columns: Vec<Column>,
    /// Lower-cased name -> column.
    column_index: HashMap<String, Column>,
    key_columns: Vec<Column>,
    rows: BoundedSequence<Row>,
    draft_rows: BoundedSequence<Row>,
    key_presence: BoundedSequence<KeyTuple>,
    truncate_pending: bool,
    next_column_id: ColumnId,
}

impl TableState {
    fn resolve(&self, table: &str, table_id: TableId, column: ColumnRef<'_>) -> FlowResult<Column> {
        let found = match column {
            ColumnRef::Name(name) => self.column_index.get(&name.to_lowercase()).cloned(),
            ColumnRef::Index(index) => self.columns.get(index).cloned(),
            ColumnRef::Column(c) => c.belongs_to(table_id).then(|| c.clone()),
        };
        found.ok_or_else(|| FlowError::unknown_column(column.to_string(), table))
    }
}

/// Handle to a table.
///
/// Cloning is cheap; clones refer to the same table.
///
/// # Example
///
/// ```rust,ignore
/// use flowtable_core::{ColumnSpec, FlowConfig, Table, TypeTag};
///
/// let t = Table::new("t", FlowConfig::new().transactional(true))?;
/// t.add_column(ColumnSpec::new("id", TypeTag::Integer).key())?;
/// t.add_column(ColumnSpec::new("name", TypeTag::String).default("foo"))?;
///
/// let row = t.new_row()?;
/// row.set_value("id", 1)?;
/// t.commit()?;
/// assert_eq!(t.row(0)?.get_value("name")?, Some("foo".into()));
/// ```
#[derive(Clone)]
pub struct Table {
    shared: Arc<TableShared>,
}

impl Table {
    /// Creates an empty table.
    ///
    /// # Errors
    ///
    /// `InvalidName` if the name is blank, `InvalidCapacity` if
    /// `max_size` is zero.
    pub fn new(name: impl Into<String>, config: FlowConfig) -> FlowResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(FlowError::invalid_name(name));
        }
        let key_capacity = if config.transactional {
            config.row_capacity()
        } else {
            None
        };
        let state = TableState {
            columns: Vec::new(),
            column_index: HashMap::new(),
            key_columns: Vec::new(),
            rows: BoundedSequence::new(config.row_capacity())?,
            draft_rows: BoundedSequence::new(config.draft_capacity())?,
            key_presence: BoundedSequence::new(key_capacity)?,
            truncate_pending: false,
            next_column_id: ColumnId::new(1),
        };
        Ok(Self {
            shared: Arc::new(TableShared {
                id: TableId::new(),
                name,
                config,
                state: RwLock::new(state),
                stats: TableStats::new(),
            }),
        })
    }

    pub(crate) fn from_shared(shared: Arc<TableShared>) -> Self {
        Self { shared }
    }

    /// Returns the table ID.
    #[must_use]
    pub fn id(&self) -> TableId {
        self.shared.id
    }

    /// Returns the table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.shared.name
    }

    /// Returns the configuration the table was created with.
    #[must_use]
    pub fn config(&self) -> &FlowConfig {
        &self.shared.config
    }

    /// Returns true if writes are staged and applied by `commit`.
    #[must_use]
    pub fn supports_transactions(&self) -> bool {
        self.shared.config.transactional
    }

    /// Returns the committed row bound.
    #[must_use]
    pub fn max_size(&self) -> Option<usize> {
        self.shared.config.max_size
    }

    /// Returns the activity counters.
    #[must_use]
    pub fn stats(&self) -> &TableStats {
        &self.shared.stats
    }

    /// Returns the committed row at `index`.
    ///
    /// # Errors
    ///
    /// `IndexOutOfRange` if `index` is past the last row.
    pub fn row(&self, index: usize) -> FlowResult<Row> {
        let state = self.shared.state.read();
        state
            .rows
            .get(index)
            .cloned()
            .ok_or_else(|| FlowError::IndexOutOfRange {
                table: self.shared.name.clone(),
                index,
                len: state.rows.len(),
            })
    }

    /// Returns the committed rows, oldest first.
    #[must_use]
    pub fn rows(&self) -> Vec<Row> {
        self.shared.state.read().rows.to_vec()
    }

    /// Returns the rows waiting for the next commit.
    #[must_use]
    pub fn draft_rows(&self) -> Vec<Row> {
        self.shared.state.read().draft_rows.to_vec()
    }

    /// Returns the number of committed rows.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.shared.state.read().rows.len()
    }

    /// Returns the number of rows waiting for the next commit.
    #[must_use]
    pub fn draft_count(&self) -> usize {
        self.shared.state.read().draft_rows.len()
    }

    /// Returns the number of tracked key tuples.
    #[must_use]
    pub fn key_count(&self) -> usize {
        self.shared.state.read().key_presence.len()
    }

    /// Returns true if `key` belongs to a committed row.
    #[must_use]
    pub fn contains_key(&self, key: &KeyTuple) -> bool {
        self.shared.state.read().key_presence.contains(key)
    }

    /// Returns true if a truncate waits for the next commit.
    #[must_use]
    pub fn is_truncate_pending(&self) -> bool {
        self.shared.state.read().truncate_pending
    }

    /// Returns true if a commit would change anything.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        let state = self.shared.state.read();
        state.truncate_pending || !state.draft_rows.is_empty()
    }

    /// Runs `f` against this table.
    pub fn visit<R>(&self, f: impl FnOnce(&Table) -> R) -> R {
        f(self)
    }

    pub(crate) fn resolve_column(&self, column: ColumnRef<'_>) -> FlowResult<Column> {
        self.shared
            .state
            .read()
            .resolve(&self.shared.name, self.shared.id, column)
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl Eq for Table {}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.shared.state.read();
        f.debug_struct("Table")
            .field("id", &self.shared.id)
            .field("name", &self.shared.name)
            .field("columns", &state.columns.len())
            .field("rows", &state.rows.len())
            .field("drafts", &state.draft_rows.len())
            .field("truncate_pending", &state.truncate_pending)
            .finish()
    }
}
