//! Commit, rollback and truncate.

use super::{KeyTuple, Table};
use crate::column::Column;
use crate::error::{FlowError, FlowResult};
use crate::row::{Row, RowState, RowStatus};
use tracing::debug;

/// What a commit changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitOutcome {
    /// New rows appended to the committed rows.
    pub inserted: usize,
    /// Committed rows whose buffered updates were applied.
    pub updated: usize,
    /// Rows dropped to stay within `max_size`.
    pub evicted: usize,
    /// Rows removed by a pending truncate.
    pub truncated: Option<usize>,
}

impl CommitOutcome {
    /// Returns true if the commit changed nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

impl Table {
    /// Applies pending work.
    ///
    /// A pending truncate takes priority: it clears the committed rows and
    /// the key index, and rows queued after the truncate wait for the next
    /// commit. Otherwise every queued row is validated before anything is
    /// merged, so a rejected commit leaves the table and the queue as they
    /// were. New rows are appended (evicting the oldest rows past
    /// `max_size`, which frees their keys) and buffered updates of
    /// committed rows are applied in place.
    ///
    /// Does nothing on non-transactional tables.
    ///
    /// # Errors
    ///
    /// - `IncompleteKey` if a new row has no value for a key column
    /// - `DuplicateKey` if a new row's key is committed already or repeats
    ///   within the batch. Rejecting in-batch repeats keeps the key index
    ///   one entry per committed row.
    pub fn commit(&self) -> FlowResult<CommitOutcome> {
        if !self.supports_transactions() {
            return Ok(CommitOutcome::default());
        }

        let mut state = self.shared.state.write();
        if state.truncate_pending {
            let cleared = state.rows.drain_all();
            for row in &cleared {
                row.state().detach(false);
            }
            state.key_presence.clear();
            state.truncate_pending = false;
            // Updates queued for rows that were just cleared have nothing left to apply.
            state
                .draft_rows
                .retain(|row| row.state().status != RowStatus::Detached);

            debug!(table = %self.name(), cleared = cleared.len(), "truncate committed");
            return Ok(CommitOutcome {
                truncated: Some(cleared.len()),
                ..CommitOutcome::default()
            });
        }
        if state.draft_rows.is_empty() {
            return Ok(CommitOutcome::default());
        }

        let key_columns = state.key_columns.clone();
        let mut updates: Vec<Row> = Vec::new();
        let mut inserts: Vec<(Row, Option<KeyTuple>)> = Vec::new();
        for row in &state.draft_rows {
            let row_state = row.state();
            if row_state.status == RowStatus::Committed {
                updates.push(row.clone());
                continue;
            }
            let key = if key_columns.is_empty() {
                None
            } else {
                let key = self.complete_key(&row_state, &key_columns)?;
                let repeated = inserts.iter().any(|(_, k)| k.as_ref() == Some(&key));
                if repeated || state.key_presence.contains(&key) {
                    self.shared.stats.record_duplicate_key();
                    return Err(FlowError::DuplicateKey {
                        table: self.name().to_string(),
                        key: key.to_string(),
                    });
                }
                Some(key)
            };
            inserts.push((row.clone(), key));
        }

        state.draft_rows.clear();
        for row in &updates {
            let mut row_state = row.state();
            row_state.merge_draft();
            row_state.pending = false;
        }

        // A batch larger than the bound keeps only its newest rows.
        let overflow = match state.rows.capacity() {
            Some(cap) if inserts.len() > cap => inserts.len() - cap,
            _ => 0,
        };
        let kept = inserts.split_off(overflow);
        for (row, _) in &inserts {
            let mut row_state = row.state();
            row_state.merge_draft();
            row_state.detach(false);
        }

        let evicted = state
            .rows
            .append_many(kept.iter().map(|(row, _)| row.clone()))?;
        for row in &evicted {
            let mut row_state = row.state();
            if let Some(key) = row_state.key_tuple(&key_columns) {
                state.key_presence.retain(|k| k != &key);
            }
            row_state.detach(false);
        }

        for (row, key) in &kept {
            let mut row_state = row.state();
            row_state.merge_draft();
            row_state.status = RowStatus::Committed;
            row_state.present = true;
            row_state.pending = false;
            if let Some(key) = key {
                if !state.key_presence.contains(key) {
                    state.key_presence.append(key.clone());
                }
            }
        }

        let outcome = CommitOutcome {
            inserted: kept.len(),
            updated: updates.len(),
            evicted: evicted.len() + overflow,
            truncated: None,
        };
        self.shared.stats.record_commit(outcome.inserted, outcome.evicted);
        debug!(
            table = %self.name(),
            inserted = outcome.inserted,
            updated = outcome.updated,
            evicted = outcome.evicted,
            rows = state.rows.len(),
            "commit applied"
        );
        Ok(outcome)
    }

    /// Discards pending work.
    ///
    /// Buffered writes are dropped and a pending truncate is cancelled.
    /// Committed rows keep their committed values; rows never committed
    /// leave the table but keep their key columns frozen. Returns the
    /// number of rows taken off the queue.
    ///
    /// Does nothing on non-transactional tables.
    pub fn rollback(&self) -> usize {
        if !self.supports_transactions() {
            return 0;
        }
        let mut state = self.shared.state.write();
        let drafts = state.draft_rows.drain_all();
        for row in &drafts {
            let mut row_state = row.state();
            if row_state.status == RowStatus::Committed {
                row_state.draft.clear();
                row_state.pending = false;
            } else {
                row_state.detach(true);
            }
        }
        let cancelled = std::mem::replace(&mut state.truncate_pending, false);
        if !drafts.is_empty() || cancelled {
            self.shared.stats.record_rollback();
        }

        debug!(
            table = %self.name(),
            discarded = drafts.len(),
            truncate_cancelled = cancelled,
            "rollback"
        );
        drafts.len()
    }

    /// Removes every row.
    ///
    /// Transactional tables drop their queued rows now and clear the
    /// committed rows on the next commit; other tables clear them now.
    pub fn truncate(&self) {
        let mut state = self.shared.state.write();
        if self.supports_transactions() {
            for row in state.draft_rows.drain_all() {
                let mut row_state = row.state();
                if row_state.status == RowStatus::Committed {
                    row_state.draft.clear();
                    row_state.pending = false;
                } else {
                    row_state.detach(false);
                }
            }
            state.truncate_pending = true;
        } else {
            for row in state.rows.drain_all() {
                row.state().detach(false);
            }
        }
        self.shared.stats.record_truncate();
        debug!(
            table = %self.name(),
            deferred = state.truncate_pending,
            "truncate"
        );
    }

    fn complete_key(&self, row_state: &RowState, key_columns: &[Column]) -> FlowResult<KeyTuple> {
        key_columns
            .iter()
            .map(|c| {
                row_state
                    .latest(c.id())
                    .cloned()
                    .ok_or_else(|| FlowError::IncompleteKey {
                        table: self.name().to_string(),
                        column: c.name().to_string(),
                    })
            })
            .collect::<FlowResult<Vec<_>>>()
            .map(KeyTuple::new)
    }
}
