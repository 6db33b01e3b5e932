//! Inventory table handle.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use log::debug;

use crate::column::ColumnDef;
use crate::config::TableConfig;
use crate::editor::CellEditor;
use crate::editor::EditorSlot;
use crate::engine::{HeaderDescriptor, TableEngine, TableView};
use crate::error::TableError;
use crate::filter::FilterMode;
use crate::row::EditableRow;
use crate::sort::{SortDirection, SortState};
use crate::store::RowStore;
use crate::virtualizer::{VisibleWindow, estimated_window};

type EditorKey<K> = (K, String);

/// Internal state for the inventory table.
#[derive(Debug)]
pub(crate) struct TableInner<T: EditableRow> {
    /// The rows.
    pub store: RowStore<T>,
    /// Columns plus sort, filter and width state.
    pub engine: TableEngine<T>,
    /// Vertical scroll offset in pixels.
    pub scroll_offset: u64,
    /// Viewport height in pixels.
    pub viewport_height: u64,
    /// Editor state per (row key, column id).
    pub editors: HashMap<EditorKey<T::Key>, Arc<Mutex<EditorSlot<T::Value>>>>,
}

impl<T: EditableRow> TableInner<T> {
    fn forget_editors(&mut self, key: &T::Key) {
        self.editors.retain(|(k, _), _| k != key);
    }
}

/// A filtered, sorted view together with the rows currently on screen.
#[derive(Debug, Clone)]
pub struct VisibleRows<T> {
    pub view: TableView<T>,
    pub window: VisibleWindow,
}

impl<T: EditableRow> VisibleRows<T> {
    /// On-screen rows with their view positions.
    pub fn iter(&self) -> impl Iterator<Item = (usize, &T)> {
        self.window
            .range()
            .filter_map(|i| self.view.row(i).map(|row| (i, row)))
    }
}

/// An editable, virtualized inventory table.
///
/// `InventoryTable<T>` is a cheap-to-clone handle over:
/// - a [`RowStore`] holding the rows
/// - a [`TableEngine`] holding columns, sort, filters and widths
/// - the viewport used for virtualization
/// - per-cell [`CellEditor`] state
///
/// Row mutations go through the store's three operations and mark the
/// table dirty; every read derives from a snapshot.
#[derive(Debug, Clone)]
pub struct InventoryTable<T: EditableRow> {
    pub(crate) inner: Arc<RwLock<TableInner<T>>>,
    dirty: Arc<AtomicBool>,
    config: Arc<TableConfig>,
}

impl<T: EditableRow> InventoryTable<T> {
    /// Create a table with columns and an initial snapshot.
    pub fn new(columns: Vec<ColumnDef<T>>, rows: Vec<T>, config: TableConfig) -> Result<Self, TableError> {
        let engine = TableEngine::new(columns, &config)?;
        let inner = TableInner {
            store: RowStore::new(rows),
            engine,
            scroll_offset: 0,
            viewport_height: 0,
            editors: HashMap::new(),
        };
        Ok(Self {
            inner: Arc::new(RwLock::new(inner)),
            dirty: Arc::new(AtomicBool::new(true)),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    /// Returns `true` if anything changed since the last [`clear_dirty`](Self::clear_dirty).
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::SeqCst)
    }

    pub fn clear_dirty(&self) {
        self.dirty.store(false, Ordering::SeqCst);
    }

    pub(crate) fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::SeqCst);
    }

    // -------------------------------------------------------------------------
    // Row access
    // -------------------------------------------------------------------------

    /// Get the number of rows.
    pub fn len(&self) -> usize {
        self.inner.read().map(|g| g.store.len()).unwrap_or(0)
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current rows in store order.
    pub fn rows(&self) -> Arc<Vec<T>> {
        self.inner
            .read()
            .map(|g| g.store.snapshot())
            .unwrap_or_default()
    }

    /// Get a row by store index.
    pub fn row(&self, index: usize) -> Option<T> {
        self.inner
            .read()
            .ok()
            .and_then(|g| g.store.get(index).cloned())
    }

    /// Find a row by key.
    pub fn find(&self, key: &T::Key) -> Option<T> {
        self.inner
            .read()
            .ok()
            .and_then(|g| g.store.find(key).cloned())
    }

    /// Current store index of a row.
    pub fn index_of(&self, key: &T::Key) -> Option<usize> {
        self.inner.read().ok().and_then(|g| g.store.index_of(key))
    }

    pub fn contains(&self, key: &T::Key) -> bool {
        self.index_of(key).is_some()
    }

    // -------------------------------------------------------------------------
    // Row mutation
    // -------------------------------------------------------------------------

    /// Replaces one field of the row at a store index. No-op when invalid.
    pub fn update_cell(&self, index: usize, column_id: &str, value: T::Value) -> bool {
        let changed = self
            .inner
            .write()
            .map(|mut g| g.store.update_cell(index, column_id, value))
            .unwrap_or(false);
        if changed {
            self.mark_dirty();
        }
        changed
    }

    /// Removes the row at a store index. No-op when invalid.
    pub fn remove_row(&self, index: usize) -> Option<T> {
        let removed = self.inner.write().ok().and_then(|mut g| {
            let row = g.store.remove_row(index)?;
            g.forget_editors(&row.key());
            Some(row)
        });
        if removed.is_some() {
            self.mark_dirty();
        }
        removed
    }

    /// Removes a row by key, resolving its current index first.
    pub fn remove_by_key(&self, key: &T::Key) -> Option<T> {
        let index = self.index_of(key)?;
        self.remove_row(index)
    }

    /// Appends a row. Returns `false` if its key is already present.
    pub fn add_row(&self, row: T) -> bool {
        let added = self
            .inner
            .write()
            .map(|mut g| g.store.add_row(row))
            .unwrap_or(false);
        if added {
            self.mark_dirty();
        }
        added
    }

    /// Replaces all rows with a fresh snapshot, forgetting editor state.
    pub fn replace_rows(&self, rows: Vec<T>) {
        if let Ok(mut guard) = self.inner.write() {
            guard.store.replace_all(rows);
            guard.editors.clear();
            self.mark_dirty();
        }
    }

    // -------------------------------------------------------------------------
    // Sort, filter, resize
    // -------------------------------------------------------------------------

    pub fn sort(&self) -> SortState {
        self.inner
            .read()
            .map(|g| g.engine.sort().clone())
            .unwrap_or_default()
    }

    /// Cycles a sortable column through ascending, descending and unsorted.
    pub fn toggle_sort(&self, column_id: &str) -> Option<SortDirection> {
        let mut guard = self.inner.write().ok()?;
        let direction = guard.engine.toggle_sort(column_id);
        self.mark_dirty();
        direction
    }

    pub fn set_sort(&self, sort: SortState) {
        if let Ok(mut guard) = self.inner.write() {
            guard.engine.set_sort(sort);
            self.mark_dirty();
        }
    }

    /// Sets a column filter; an empty value clears it.
    pub fn set_filter(&self, column_id: &str, value: impl Into<String>) -> bool {
        let applied = self
            .inner
            .write()
            .map(|mut g| g.engine.set_filter(column_id, value))
            .unwrap_or(false);
        if applied {
            self.mark_dirty();
        }
        applied
    }

    pub fn clear_filters(&self) {
        if let Ok(mut guard) = self.inner.write() {
            guard.engine.clear_filters();
            self.mark_dirty();
        }
    }

    pub fn set_filter_mode(&self, mode: FilterMode) {
        if let Ok(mut guard) = self.inner.write() {
            guard.engine.set_filter_mode(mode);
            self.mark_dirty();
        }
    }

    /// Applies a drag delta to a column width. Returns the new width.
    pub fn resize_column(&self, column_id: &str, delta: i32) -> Option<u32> {
        let width = self.inner.write().ok()?.engine.resize(column_id, delta)?;
        self.mark_dirty();
        Some(width)
    }

    pub fn column_width(&self, column_id: &str) -> Option<u32> {
        self.inner.read().ok()?.engine.width(column_id)
    }

    /// Get the column definitions.
    pub fn columns(&self) -> Vec<ColumnDef<T>> {
        self.inner
            .read()
            .map(|g| g.engine.columns().to_vec())
            .unwrap_or_default()
    }

    pub fn headers(&self) -> Vec<HeaderDescriptor> {
        self.inner
            .read()
            .map(|g| g.engine.headers())
            .unwrap_or_default()
    }

    // -------------------------------------------------------------------------
    // Derivation and viewport
    // -------------------------------------------------------------------------

    /// Filtered and sorted rows.
    pub fn view(&self) -> Option<TableView<T>> {
        let guard = self.inner.read().ok()?;
        Some(guard.engine.derive(guard.store.snapshot()))
    }

    pub fn set_viewport_height(&self, height: u64) {
        if let Ok(mut guard) = self.inner.write() {
            guard.viewport_height = height;
            self.mark_dirty();
        }
    }

    pub fn scroll_offset(&self) -> u64 {
        self.inner.read().map(|g| g.scroll_offset).unwrap_or(0)
    }

    /// Scroll to an absolute pixel offset.
    pub fn scroll_to(&self, offset: u64) {
        if let Ok(mut guard) = self.inner.write() {
            guard.scroll_offset = offset;
            self.mark_dirty();
        }
    }

    /// The derived view and the window of it currently on screen.
    pub fn visible(&self) -> Option<VisibleRows<T>> {
        let guard = self.inner.read().ok()?;
        let view = guard.engine.derive(guard.store.snapshot());
        let window = estimated_window(
            view.len(),
            guard.viewport_height,
            self.config.row_height,
            guard.scroll_offset,
            self.config.overscan,
        );
        debug!(
            "Visible rows {}..{} of {}",
            window.start_index,
            window.end_index,
            view.len()
        );
        Some(VisibleRows { view, window })
    }

    // -------------------------------------------------------------------------
    // Editors
    // -------------------------------------------------------------------------

    /// Editor for one cell, sharing state with every other handle to it.
    pub fn editor(&self, key: T::Key, column_id: impl Into<String>) -> CellEditor<T> {
        let column_id = column_id.into();
        let slot = self
            .inner
            .write()
            .map(|mut g| {
                Arc::clone(
                    g.editors
                        .entry((key.clone(), column_id.clone()))
                        .or_default(),
                )
            })
            .unwrap_or_default();
        CellEditor::new(self.clone(), key, column_id, slot)
    }

    /// Returns `true` while a cell has an unresolved edit.
    pub fn is_pending(&self, key: &T::Key, column_id: &str) -> bool {
        let Ok(guard) = self.inner.read() else {
            return false;
        };
        guard
            .editors
            .get(&(key.clone(), column_id.to_string()))
            .and_then(|slot| slot.lock().ok().map(|s| s.is_pending()))
            .unwrap_or(false)
    }

    /// Message of a cell's last rolled-back edit, until its next commit.
    pub fn last_error(&self, key: &T::Key, column_id: &str) -> Option<String> {
        let guard = self.inner.read().ok()?;
        let slot = guard.editors.get(&(key.clone(), column_id.to_string()))?;
        let slot = slot.lock().ok()?;
        slot.last_error().map(str::to_string)
    }
}
