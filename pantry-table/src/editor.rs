//! Optimistic cell editors.
//!
//! An edit writes the new value into the row store immediately, then calls
//! the backend. The response either replaces the optimistic value with the
//! backend's authoritative one, or rolls the cell back.
//!
//! Overlapping edits to the same cell are not cancelled. Each edit takes a
//! sequence number; only the latest edit may touch the store when it
//! resolves. An earlier edit that succeeds after being superseded still
//! becomes the value a later failure rolls back to. If that later edit has
//! already rolled back when the earlier success arrives, the success is
//! written to the store and reported as committed.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::error::MutationError;
use crate::row::EditableRow;
use crate::table::InventoryTable;

/// Sends a single-cell change to the backend.
#[async_trait]
pub trait CellMutation<T: EditableRow>: Send + Sync {
    /// Commits `value` for the cell and returns the authoritative row.
    async fn commit(&self, key: &T::Key, column_id: &str, value: &T::Value) -> Result<T, pantry_lib::Error>;
}

#[async_trait]
impl<T: EditableRow, M: CellMutation<T> + ?Sized> CellMutation<T> for Arc<M> {
    async fn commit(&self, key: &T::Key, column_id: &str, value: &T::Value) -> Result<T, pantry_lib::Error> {
        (**self).commit(key, column_id, value).await
    }
}

/// Whether a cell is waiting on the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EditorState {
    #[default]
    Idle,
    Pending,
}

/// How an edit resolved.
#[derive(Debug)]
pub enum EditOutcome<V> {
    /// The backend accepted the edit; the store holds this value.
    Committed(V),
    /// The edit failed; the store was reverted to `restored`.
    RolledBack { restored: V, error: MutationError },
    /// A later edit of the same cell owns the result.
    Superseded,
    /// The row left the table before the response arrived.
    Discarded,
}

impl<V> EditOutcome<V> {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed(_))
    }

    pub fn is_rolled_back(&self) -> bool {
        matches!(self, Self::RolledBack { .. })
    }
}

/// Shared per-cell bookkeeping.
#[derive(Debug)]
pub(crate) struct EditorSlot<V> {
    /// Sequence number of the latest edit.
    seq: u64,
    /// Latest edit whose success has been recorded.
    confirmed_seq: u64,
    /// Value to roll back to while pending.
    baseline: Option<V>,
    state: EditorState,
    last_error: Option<String>,
}

impl<V> Default for EditorSlot<V> {
    fn default() -> Self {
        Self {
            seq: 0,
            confirmed_seq: 0,
            baseline: None,
            state: EditorState::Idle,
            last_error: None,
        }
    }
}

impl<V> EditorSlot<V> {
    pub(crate) fn is_pending(&self) -> bool {
        self.state == EditorState::Pending
    }

    pub(crate) fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}

/// Editor for one cell, identified by row key and column id.
///
/// Cheap to clone; clones share state. Obtain one with
/// [`InventoryTable::editor`].
#[derive(Debug, Clone)]
pub struct CellEditor<T: EditableRow> {
    table: InventoryTable<T>,
    key: T::Key,
    column_id: String,
    slot: Arc<Mutex<EditorSlot<T::Value>>>,
}

impl<T: EditableRow> CellEditor<T> {
    pub(crate) fn new(
        table: InventoryTable<T>,
        key: T::Key,
        column_id: String,
        slot: Arc<Mutex<EditorSlot<T::Value>>>,
    ) -> Self {
        Self {
            table,
            key,
            column_id,
            slot,
        }
    }

    pub fn key(&self) -> &T::Key {
        &self.key
    }

    pub fn column_id(&self) -> &str {
        &self.column_id
    }

    pub fn state(&self) -> EditorState {
        self.slot.lock().map(|s| s.state).unwrap_or_default()
    }

    /// Message of the most recent rollback, cleared by the next commit.
    pub fn last_error(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|s| s.last_error.clone())
    }

    /// The value the cell currently shows.
    pub fn value(&self) -> Option<T::Value> {
        self.table
            .inner
            .read()
            .ok()
            .and_then(|g| g.store.field(&self.key, &self.column_id))
    }

    /// Applies `value` optimistically and reconciles it with `mutation`.
    ///
    /// Fails without touching the store when the row is gone or the column
    /// does not hold an editable field. Every other failure is reported as
    /// [`EditOutcome::RolledBack`].
    pub async fn edit<M>(&self, mutation: &M, value: T::Value) -> Result<EditOutcome<T::Value>, MutationError>
    where
        M: CellMutation<T> + ?Sized,
    {
        let seq = self.begin(value.clone())?;
        debug!("Edit #{} of {}/{} pending", seq, self.key, self.column_id);

        let timeout = self.table.config().request_timeout;
        let result = match tokio::time::timeout(timeout, mutation.commit(&self.key, &self.column_id, &value)).await {
            Ok(Ok(row)) => Ok(row),
            Ok(Err(e)) => Err(MutationError::Remote(e)),
            Err(_) => Err(MutationError::Timeout(timeout)),
        };

        Ok(self.resolve(seq, value, result))
    }

    fn begin(&self, value: T::Value) -> Result<u64, MutationError> {
        let mut table = self
            .table
            .inner
            .write()
            .map_err(|_| MutationError::RowNotFound(self.key.to_string()))?;
        let index = table
            .store
            .index_of(&self.key)
            .ok_or_else(|| MutationError::RowNotFound(self.key.to_string()))?;
        let current = table
            .store
            .get(index)
            .and_then(|row| row.get_field(&self.column_id))
            .ok_or_else(|| MutationError::NotEditable(self.column_id.clone()))?;
        if !table.store.update_cell(index, &self.column_id, value) {
            return Err(MutationError::NotEditable(self.column_id.clone()));
        }
        drop(table);
        self.table.mark_dirty();

        let mut slot = self
            .slot
            .lock()
            .map_err(|_| MutationError::NotEditable(self.column_id.clone()))?;
        if slot.state == EditorState::Idle {
            slot.baseline = Some(current);
        }
        slot.seq += 1;
        slot.state = EditorState::Pending;
        Ok(slot.seq)
    }

    fn resolve(&self, seq: u64, sent: T::Value, result: Result<T, MutationError>) -> EditOutcome<T::Value> {
        let (Ok(mut table), Ok(mut slot)) = (self.table.inner.write(), self.slot.lock()) else {
            return EditOutcome::Discarded;
        };

        if slot.seq != seq {
            let confirmed = match &result {
                Ok(row) if seq > slot.confirmed_seq => row.get_field(&self.column_id),
                _ => None,
            };
            let Some(confirmed) = confirmed else {
                debug!("Edit #{} of {}/{} superseded by #{}", seq, self.key, self.column_id, slot.seq);
                return EditOutcome::Superseded;
            };
            slot.confirmed_seq = seq;

            if slot.is_pending() {
                slot.baseline = Some(confirmed);
                debug!("Edit #{} of {}/{} superseded by #{}", seq, self.key, self.column_id, slot.seq);
                return EditOutcome::Superseded;
            }

            // The latest edit already rolled back, so this is now the newest backend value.
            let Some(index) = table.store.index_of(&self.key) else {
                warn!("Discarding response for removed row {}", self.key);
                return EditOutcome::Discarded;
            };
            table.store.update_cell(index, &self.column_id, confirmed.clone());
            slot.last_error = None;
            info!("Committed late edit #{} of {}/{} = {:?}", seq, self.key, self.column_id, confirmed);
            drop(slot);
            drop(table);
            self.table.mark_dirty();
            return EditOutcome::Committed(confirmed);
        }

        slot.state = EditorState::Idle;
        let baseline = slot.baseline.take();

        let Some(index) = table.store.index_of(&self.key) else {
            warn!("Discarding response for removed row {}", self.key);
            return EditOutcome::Discarded;
        };

        let outcome = match result {
            Ok(row) => {
                let authoritative = row.get_field(&self.column_id).unwrap_or(sent);
                table.store.update_cell(index, &self.column_id, authoritative.clone());
                slot.confirmed_seq = seq;
                slot.last_error = None;
                info!("Committed {}/{} = {:?}", self.key, self.column_id, authoritative);
                EditOutcome::Committed(authoritative)
            }
            Err(error) => {
                let restored = match baseline {
                    Some(value) => value,
                    None => match table.store.field(&self.key, &self.column_id) {
                        Some(value) => value,
                        None => return EditOutcome::Discarded,
                    },
                };
                table.store.update_cell(index, &self.column_id, restored.clone());
                warn!(
                    "Rolled back {}/{} to {:?}: {}",
                    self.key, self.column_id, restored, error
                );
                slot.last_error = Some(error.to_string());
                EditOutcome::RolledBack { restored, error }
            }
        };

        drop(slot);
        drop(table);
        self.table.mark_dirty();
        outcome
    }
}
