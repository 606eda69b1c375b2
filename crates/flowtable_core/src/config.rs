//! Table configuration.

use serde::{Deserialize, Serialize};

/// Configuration for creating a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlowConfig {
    /// Maximum number of committed rows retained (FIFO eviction). `None` = unbounded.
    ///
    /// Drafts may transiently exceed this by one row while waiting for commit.
    pub max_size: Option<usize>,

    /// Whether writes are staged as drafts and applied by `commit`.
    pub transactional: bool,

    /// Whether value writes on a transactional table bypass the draft map.
    ///
    /// Rows still join the table only on commit.
    pub autosave: bool,
}

impl Default for FlowConfig {
    fn default() -> Self {
        Self {
            max_size: None,
            transactional: false,
            autosave: false,
        }
    }
}

impl FlowConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum number of retained rows.
    #[must_use]
    pub const fn max_size(mut self, size: usize) -> Self {
        self.max_size = Some(size);
        self
    }

    /// Removes the row limit.
    #[must_use]
    pub const fn unbounded(mut self) -> Self {
        self.max_size = None;
        self
    }

    /// Sets whether the table supports transactions.
    #[must_use]
    pub const fn transactional(mut self, value: bool) -> Self {
        self.transactional = value;
        self
    }

    /// Sets whether value writes bypass the draft map.
    #[must_use]
    pub const fn autosave(mut self, value: bool) -> Self {
        self.autosave = value;
        self
    }

    /// Returns true if value writes land in the draft map.
    #[must_use]
    pub const fn defers_writes(&self) -> bool {
        self.transactional && !self.autosave
    }

    /// Capacity of the committed row sequence.
    pub(crate) fn row_capacity(&self) -> Option<usize> {
        self.max_size
    }

    /// Capacity of the draft sequence: one extra slot for the in-flight row.
    pub(crate) fn draft_capacity(&self) -> Option<usize> {
        self.max_size.map(|n| n.saturating_add(1))
    }
}
