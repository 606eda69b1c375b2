//! Table statistics.
//!
//! Counters for table activity, readable while other threads keep
//! writing to the table.
//!
//! # Usage
//!
//! ```rust,ignore
//! let table = Table::new("orders", FlowConfig::new().transactional(true))?;
//! // ... rows, commits ...
//! let snap = table.stats().snapshot();
//! println!("commits: {}, evicted: {}", snap.commits, snap.rows_evicted);
//! ```

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Table statistics.
///
/// All counters are atomic and monotonically increasing.
#[derive(Debug, Default)]
pub struct TableStats {
    /// Rows created with `new_row` or `duplicate`.
    rows_created: AtomicU64,
    /// Successful commits that had something to apply.
    commits: AtomicU64,
    /// Rollbacks that discarded pending work.
    rollbacks: AtomicU64,
    /// Truncates requested.
    truncates: AtomicU64,
    /// Rows that joined the committed sequence.
    rows_committed: AtomicU64,
    /// Rows dropped by FIFO eviction.
    rows_evicted: AtomicU64,
    /// Commits rejected for duplicate keys.
    duplicate_key_rejections: AtomicU64,
}

impl TableStats {
    /// Creates a new stats instance.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_row_created(&self) {
        self.rows_created.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_commit(&self, inserted: usize, evicted: usize) {
        self.commits.fetch_add(1, Ordering::Relaxed);
        self.rows_committed
            .fetch_add(inserted as u64, Ordering::Relaxed);
        self.record_evicted(evicted);
    }

    pub(crate) fn record_evicted(&self, count: usize) {
        self.rows_evicted.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub(crate) fn record_rollback(&self) {
        self.rollbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_truncate(&self) {
        self.truncates.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_duplicate_key(&self) {
        self.duplicate_key_rejections.fetch_add(1, Ordering::Relaxed);
    }

    /// Returns the number of rows created.
    pub fn rows_created(&self) -> u64 {
        self.rows_created.load(Ordering::Relaxed)
    }

    /// Returns the number of applied commits.
    pub fn commits(&self) -> u64 {
        self.commits.load(Ordering::Relaxed)
    }

    /// Returns the number of rollbacks.
    pub fn rollbacks(&self) -> u64 {
        self.rollbacks.load(Ordering::Relaxed)
    }

    /// Returns the number of truncates.
    pub fn truncates(&self) -> u64 {
        self.truncates.load(Ordering::Relaxed)
    }

    /// Returns the number of rows that were committed.
    pub fn rows_committed(&self) -> u64 {
        self.rows_committed.load(Ordering::Relaxed)
    }

    /// Returns the number of rows evicted by the size bound.
    pub fn rows_evicted(&self) -> u64 {
        self.rows_evicted.load(Ordering::Relaxed)
    }

    /// Returns the number of commits rejected for duplicate keys.
    pub fn duplicate_key_rejections(&self) -> u64 {
        self.duplicate_key_rejections.load(Ordering::Relaxed)
    }

    /// Returns a snapshot of all counters.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            rows_created: self.rows_created(),
            commits: self.commits(),
            rollbacks: self.rollbacks(),
            truncates: self.truncates(),
            rows_committed: self.rows_committed(),
            rows_evicted: self.rows_evicted(),
            duplicate_key_rejections: self.duplicate_key_rejections(),
        }
    }
}

/// A point-in-time copy of [`TableStats`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct StatsSnapshot {
    /// Rows created.
    pub rows_created: u64,
    /// Applied commits.
    pub commits: u64,
    /// Rollbacks.
    pub rollbacks: u64,
    /// Truncates.
    pub truncates: u64,
    /// Rows committed.
    pub rows_committed: u64,
    /// Rows evicted.
    pub rows_evicted: u64,
    /// Duplicate-key rejections.
    pub duplicate_key_rejections: u64,
}
