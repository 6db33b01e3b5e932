//! Ordered row storage with copy-on-write updates.

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;
use log::warn;

use crate::row::EditableRow;
use crate::row::TableRow;

/// An ordered collection of rows keyed by [`TableRow::key`].
///
/// Every mutation produces a new backing vector when a snapshot is still
/// held elsewhere, so a snapshot taken with [`RowStore::snapshot`] never
/// changes underneath its reader. All operations are total: invalid
/// indices and unknown keys are no-ops.
#[derive(Debug, Clone)]
pub struct RowStore<T: TableRow> {
    rows: Arc<Vec<T>>,
    version: u64,
}

impl<T: TableRow> Default for RowStore<T> {
    fn default() -> Self {
        Self {
            rows: Arc::new(Vec::new()),
            version: 0,
        }
    }
}

impl<T: TableRow> RowStore<T> {
    /// Creates a new store from an initial snapshot.
    ///
    /// Rows repeating an earlier key are dropped.
    pub fn new(rows: Vec<T>) -> Self {
        let mut seen = HashSet::with_capacity(rows.len());
        let total = rows.len();
        let rows: Vec<T> = rows.into_iter().filter(|row| seen.insert(row.key())).collect();
        if rows.len() != total {
            warn!("Dropped {} rows with duplicate keys", total - rows.len());
        }
        Self {
            rows: Arc::new(rows),
            version: 0,
        }
    }

    /// Current rows. Later mutations do not affect the returned snapshot.
    pub fn snapshot(&self) -> Arc<Vec<T>> {
        Arc::clone(&self.rows)
    }

    /// Incremented by every mutation that changed the store.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.rows.get(index)
    }

    /// Get the index of a row by key.
    pub fn index_of(&self, key: &T::Key) -> Option<usize> {
        self.rows.iter().position(|row| &row.key() == key)
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.index_of(key).is_some()
    }

    /// Find a row by key.
    pub fn find(&self, key: &T::Key) -> Option<&T> {
        self.rows.iter().find(|row| &row.key() == key)
    }

    /// Removes the row at `index`; later rows shift left.
    pub fn remove_row(&mut self, index: usize) -> Option<T> {
        if index >= self.rows.len() {
            debug!("remove_row: index {} out of range ({} rows)", index, self.rows.len());
            return None;
        }
        let removed = Arc::make_mut(&mut self.rows).remove(index);
        self.version += 1;
        Some(removed)
    }

    /// Removes the row with `key`, wherever it currently is.
    pub fn remove_by_key(&mut self, key: &T::Key) -> Option<T> {
        let index = self.index_of(key)?;
        self.remove_row(index)
    }

    /// Appends a row.
    ///
    /// A row whose key is already present is ignored and `false` returned.
    pub fn add_row(&mut self, row: T) -> bool {
        let key = row.key();
        if self.contains(&key) {
            warn!("add_row: key {} already present", key);
            return false;
        }
        Arc::make_mut(&mut self.rows).push(row);
        self.version += 1;
        true
    }

    /// Replaces every row, as when a fresh snapshot arrives.
    pub fn replace_all(&mut self, rows: Vec<T>) {
        let version = self.version + 1;
        *self = Self::new(rows);
        self.version = version;
    }
}

impl<T: EditableRow> RowStore<T> {
    /// Replaces one field of the row at `index`.
    ///
    /// Returns `false` without touching any row when the index is out of
    /// range or the row rejects the value.
    pub fn update_cell(&mut self, index: usize, column_id: &str, value: T::Value) -> bool {
        let Some(current) = self.rows.get(index) else {
            debug!("update_cell: index {} out of range ({} rows)", index, self.rows.len());
            return false;
        };

        let mut updated = current.clone();
        if let Err(e) = updated.set_field(column_id, value) {
            warn!("update_cell: {}", e);
            return false;
        }

        Arc::make_mut(&mut self.rows)[index] = updated;
        self.version += 1;
        true
    }

    /// Replaces one field of the row with `key`, wherever it currently is.
    pub fn update_by_key(&mut self, key: &T::Key, column_id: &str, value: T::Value) -> bool {
        match self.index_of(key) {
            Some(index) => self.update_cell(index, column_id, value),
            None => false,
        }
    }

    /// Reads one field of the row with `key`.
    pub fn field(&self, key: &T::Key, column_id: &str) -> Option<T::Value> {
        self.find(key).and_then(|row| row.get_field(column_id))
    }
}
