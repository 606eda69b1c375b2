//! Core identifier types for FlowTable.

use std::fmt;
use uuid::Uuid;

/// Unique identifier for a table.
///
/// Table IDs are random 128-bit UUIDs assigned at construction. Columns
/// and rows use them as a non-owning reference back to their table.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TableId([u8; 16]);

impl TableId {
    /// Creates a new random table ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().into_bytes())
    }

    /// Creates a table ID from raw bytes.
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Returns the raw bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// Converts to a UUID.
    #[must_use]
    pub fn to_uuid(&self) -> Uuid {
        Uuid::from_bytes(self.0)
    }
}

impl Default for TableId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TableId({})", self.to_uuid())
    }
}

impl fmt::Display for TableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_uuid())
    }
}

/// Identifier for a column within its table.
///
/// Column IDs are assigned in creation order and never reused, unlike
/// positions which shift when an earlier column is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColumnId(pub u64);

impl ColumnId {
    /// Creates a new column ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw ID value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }

    /// Returns the next column ID.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "col:{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_ids_are_unique() {
        assert_ne!(TableId::new(), TableId::new());
    }

    #[test]
    fn table_id_uuid_roundtrip() {
        let id = TableId::new();
        assert_eq!(TableId::from_bytes(id.to_uuid().into_bytes()), id);
    }

    #[test]
    fn column_id_next() {
        let c = ColumnId::new(5);
        assert_eq!(c.next().as_u64(), 6);
        assert!(c < c.next());
        assert_eq!(format!("{c}"), "col:5");
    }
}
