//! Error types for FlowTable core.

use thiserror::Error;

/// Result type for flow operations.
pub type FlowResult<T> = Result<T, FlowError>;

/// Errors that can occur in flow operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FlowError {
    /// Column or flow name is empty or otherwise unusable.
    #[error("invalid name: {name:?}")]
    InvalidName {
        /// The rejected name.
        name: String,
    },

    /// Name is already taken (case-insensitive for columns).
    #[error("name {name:?} is already used in {owner}")]
    NameAlreadyUsed {
        /// The duplicated name.
        name: String,
        /// Table or model that already holds the name.
        owner: String,
    },

    /// A column default does not fit the column type.
    #[error("invalid default {value} for column {column} of type {expected}")]
    InvalidDefault {
        /// Column being defined.
        column: String,
        /// Declared column type.
        expected: String,
        /// Rendered default value.
        value: String,
    },

    /// A value does not fit the column type and cannot be coerced.
    #[error("type mismatch on column {column}: expected {expected}, got {actual}")]
    TypeMismatch {
        /// Target column.
        column: String,
        /// Declared column type.
        expected: String,
        /// Shape of the supplied value.
        actual: String,
    },

    /// Text could not be parsed into the requested type.
    #[error("cannot parse {input:?} as {target}")]
    ParseError {
        /// The offending text.
        input: String,
        /// Target type name.
        target: String,
    },

    /// Unrecognised interchange type identifier.
    #[error("unknown type id: {id:?}")]
    UnknownTypeId {
        /// The identifier.
        id: String,
    },

    /// Key columns require a transactional table.
    #[error("table {table} does not support transactions, key columns are not allowed")]
    KeyNotSupported {
        /// Table name.
        table: String,
    },

    /// Key columns can only be added while the table holds no rows.
    #[error("table {table} is not empty, key columns cannot be added")]
    NonEmptyTable {
        /// Table name.
        table: String,
    },

    /// A key column cannot be removed while rows exist.
    #[error("key column {column} of table {table} is in use")]
    KeyColumnInUse {
        /// Column name.
        column: String,
        /// Table name.
        table: String,
    },

    /// Key values of a row already in the table are frozen.
    #[error("key column {column} of table {table} cannot be altered once committed")]
    KeyColumnImmutable {
        /// Column name.
        column: String,
        /// Table name.
        table: String,
    },

    /// Commit would produce a duplicate primary key.
    #[error("duplicate key {key} in table {table}")]
    DuplicateKey {
        /// Table name.
        table: String,
        /// Rendered key tuple.
        key: String,
    },

    /// A pending row lacks a value for one of the key columns.
    #[error("row in table {table} has no value for key column {column}")]
    IncompleteKey {
        /// Table name.
        table: String,
        /// First key column without a value.
        column: String,
    },

    /// Column does not belong to this table.
    #[error("unknown column {column} in table {table}")]
    UnknownColumn {
        /// Requested column (name, index or rendered handle).
        column: String,
        /// Table name.
        table: String,
    },

    /// No flow with this name in the model.
    #[error("unknown flow: {name}")]
    UnknownFlow {
        /// Requested flow name.
        name: String,
    },

    /// Row index is past the end of the table.
    #[error("row {index} out of range for table {table} with {len} rows")]
    IndexOutOfRange {
        /// Table name.
        table: String,
        /// Requested index.
        index: usize,
        /// Current row count.
        len: usize,
    },

    /// Row is no longer part of its table (rolled back, evicted or truncated).
    #[error("row is detached from table {table}")]
    DetachedRow {
        /// Table name.
        table: String,
    },

    /// A mapped record field does not have the column's type.
    #[error("column {column} of table {table} is {expected}, field is {actual}")]
    ColumnTypeMismatch {
        /// Column name.
        column: String,
        /// Table name.
        table: String,
        /// Column type.
        expected: String,
        /// Field type.
        actual: String,
    },

    /// Bounded sequence capacity must be positive.
    #[error("invalid capacity: {capacity}")]
    InvalidCapacity {
        /// The rejected capacity.
        capacity: usize,
    },

    /// Batch does not fit into a bounded sequence even after evicting everything.
    #[error("capacity exceeded: {requested} items do not fit in {capacity}")]
    CapacityExceeded {
        /// Number of items offered.
        requested: usize,
        /// Sequence capacity.
        capacity: usize,
    },
}

impl FlowError {
    /// Creates an invalid name error.
    pub fn invalid_name(name: impl Into<String>) -> Self {
        Self::InvalidName { name: name.into() }
    }

    /// Creates a name already used error.
    pub fn name_already_used(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self::NameAlreadyUsed {
            name: name.into(),
            owner: owner.into(),
        }
    }

    /// Creates a parse error.
    pub fn parse_error(input: impl Into<String>, target: impl Into<String>) -> Self {
        Self::ParseError {
            input: input.into(),
            target: target.into(),
        }
    }

    /// Creates an unknown column error.
    pub fn unknown_column(column: impl Into<String>, table: impl Into<String>) -> Self {
        Self::UnknownColumn {
            column: column.into(),
            table: table.into(),
        }
    }

    /// Creates a detached row error.
    pub fn detached_row(table: impl Into<String>) -> Self {
        Self::DetachedRow {
            table: table.into(),
        }
    }

    /// Returns true for schema definition errors the caller can correct.
    #[must_use]
    pub fn is_schema_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidName { .. } | Self::NameAlreadyUsed { .. } | Self::InvalidDefault { .. }
        )
    }

    /// Returns true for primary key constraint violations.
    #[must_use]
    pub fn is_key_violation(&self) -> bool {
        matches!(
            self,
            Self::KeyNotSupported { .. }
                | Self::NonEmptyTable { .. }
                | Self::KeyColumnInUse { .. }
                | Self::KeyColumnImmutable { .. }
                | Self::DuplicateKey { .. }
                | Self::IncompleteKey { .. }
        )
    }
}
