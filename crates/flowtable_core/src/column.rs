//! Column definitions.

use crate::types::{ColumnId, TableId};
use crate::value::{Datum, TypeTag};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Handle to a column of a table.
///
/// Cloning is cheap; clones refer to the same column. The position is
/// live: removing an earlier column shifts it down by one. A column only
/// knows the id of its table, never the table itself.
#[derive(Clone)]
pub struct Column(Arc<ColumnInner>);

struct ColumnInner {
    id: ColumnId,
    table_id: TableId,
    name: String,
    position: AtomicUsize,
    type_tag: TypeTag,
    default: Option<Datum>,
    is_key: bool,
    comment: Option<String>,
    attached: AtomicBool,
}

impl Column {
    pub(crate) fn new(id: ColumnId, table_id: TableId, position: usize, spec: ColumnSpec) -> Self {
        Self(Arc::new(ColumnInner {
            id,
            table_id,
            name: spec.name,
            position: AtomicUsize::new(position),
            type_tag: spec.type_tag,
            default: spec.default,
            is_key: spec.is_key,
            comment: spec.comment,
            attached: AtomicBool::new(true),
        }))
    }

    /// Returns the column ID.
    #[must_use]
    pub fn id(&self) -> ColumnId {
        self.0.id
    }

    /// Returns the ID of the owning table.
    #[must_use]
    pub fn table_id(&self) -> TableId {
        self.0.table_id
    }

    /// Returns the column name as declared.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0.name
    }

    /// Returns the current index of the column in its table.
    #[must_use]
    pub fn position(&self) -> usize {
        self.0.position.load(Ordering::Acquire)
    }

    /// Returns the declared type.
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.0.type_tag
    }

    /// Returns the default value, if one was configured.
    #[must_use]
    pub fn default_value(&self) -> Option<&Datum> {
        self.0.default.as_ref()
    }

    /// Returns true if the column is part of the primary key.
    #[must_use]
    pub fn is_key(&self) -> bool {
        self.0.is_key
    }

    /// Returns the free-form comment.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.0.comment.as_deref()
    }

    /// Returns false once the column has been removed from its table.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.0.attached.load(Ordering::Acquire)
    }

    /// Returns true if this column was created by the given table and is still part of it.
    #[must_use]
    pub fn belongs_to(&self, table_id: TableId) -> bool {
        self.0.table_id == table_id && self.is_attached()
    }

    pub(crate) fn set_position(&self, position: usize) {
        self.0.position.store(position, Ordering::Release);
    }

    pub(crate) fn detach(&self) {
        self.0.attached.store(false, Ordering::Release);
    }
}

impl PartialEq for Column {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for Column {}

impl Hash for Column {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.table_id.hash(state);
        self.0.id.hash(state);
    }
}

impl fmt::Debug for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column")
            .field("name", &self.0.name)
            .field("position", &self.position())
            .field("type", &self.0.type_tag)
            .field("default", &self.0.default)
            .field("is_key", &self.0.is_key)
            .finish()
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.name)
    }
}

/// Definition of a column to add to a table.
///
/// ```rust,ignore
/// table.add_column(ColumnSpec::new("id", TypeTag::Integer).key())?;
/// table.add_column(ColumnSpec::new("name", TypeTag::String).default("foo"))?;
/// table.add_column(("total", TypeTag::BigDecimal))?;
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSpec {
    pub(crate) name: String,
    pub(crate) type_tag: TypeTag,
    pub(crate) default: Option<Datum>,
    pub(crate) is_key: bool,
    pub(crate) comment: Option<String>,
}

impl ColumnSpec {
    /// Creates a definition with no default that is not part of the key.
    pub fn new(name: impl Into<String>, type_tag: TypeTag) -> Self {
        Self {
            name: name.into(),
            type_tag,
            default: None,
            is_key: false,
            comment: None,
        }
    }

    /// Sets the default value. Text is parsed through the column type.
    #[must_use]
    pub fn default(mut self, value: impl Into<Datum>) -> Self {
        let value = value.into();
        self.default = if value.is_null() { None } else { Some(value) };
        self
    }

    /// Marks the column as part of the primary key.
    #[must_use]
    pub fn key(mut self) -> Self {
        self.is_key = true;
        self
    }

    /// Sets whether the column is part of the primary key.
    #[must_use]
    pub fn is_key(mut self, is_key: bool) -> Self {
        self.is_key = is_key;
        self
    }

    /// Attaches a comment.
    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns the column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    #[must_use]
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }
}

impl From<(&str, TypeTag)> for ColumnSpec {
    fn from((name, type_tag): (&str, TypeTag)) -> Self {
        Self::new(name, type_tag)
    }
}

impl From<(String, TypeTag)> for ColumnSpec {
    fn from((name, type_tag): (String, TypeTag)) -> Self {
        Self::new(name, type_tag)
    }
}

/// A way to name a column: by name (case-insensitive), by index, or by handle.
#[derive(Debug, Clone, Copy)]
pub enum ColumnRef<'a> {
    /// Column name, matched ignoring case.
    Name(&'a str),
    /// Column position.
    Index(usize),
    /// Column handle.
    Column(&'a Column),
}

impl<'a> From<&'a str> for ColumnRef<'a> {
    fn from(name: &'a str) -> Self {
        ColumnRef::Name(name)
    }
}

impl<'a> From<&'a String> for ColumnRef<'a> {
    fn from(name: &'a String) -> Self {
        ColumnRef::Name(name)
    }
}

impl From<usize> for ColumnRef<'_> {
    fn from(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

impl<'a> From<&'a Column> for ColumnRef<'a> {
    fn from(column: &'a Column) -> Self {
        ColumnRef::Column(column)
    }
}

impl fmt::Display for ColumnRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Name(name) => f.write_str(name),
            ColumnRef::Index(index) => write!(f, "#{index}"),
            ColumnRef::Column(column) => f.write_str(column.name()),
        }
    }
}
