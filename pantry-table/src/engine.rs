//! Derived table view: filter, sort, resize and headers.

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;

use crate::column::ColumnDef;
use crate::config::TableConfig;
use crate::error::TableError;
use crate::filter::FilterMode;
use crate::filter::FilterState;
use crate::filter::TextMatcher;
use crate::row::TableRow;
use crate::sort::SortDirection;
use crate::sort::SortState;
use crate::value::CellValue;

// =============================================================================
// HeaderDescriptor
// =============================================================================

/// Everything a renderer needs to draw one column header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderDescriptor {
    pub column_id: String,
    pub label: String,
    /// Current width, after resizing.
    pub width: u32,
    pub sortable: bool,
    pub filterable: bool,
    /// Set when this column drives the current sort.
    pub sort: Option<SortDirection>,
    /// Active filter value.
    pub filter: Option<String>,
}

// =============================================================================
// TableView
// =============================================================================

/// Filtered and sorted rows, referencing a store snapshot.
#[derive(Debug, Clone)]
pub struct TableView<T> {
    rows: Arc<Vec<T>>,
    order: Vec<usize>,
    headers: Vec<HeaderDescriptor>,
}

impl<T: TableRow> TableView<T> {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Row at a view position.
    pub fn row(&self, index: usize) -> Option<&T> {
        self.order.get(index).and_then(|&i| self.rows.get(i))
    }

    /// Store index of the row at a view position.
    ///
    /// Only valid for the snapshot this view was derived from; resolve rows
    /// by key before mutating.
    pub fn store_index(&self, index: usize) -> Option<usize> {
        self.order.get(index).copied()
    }

    /// Rows in view order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.order.iter().filter_map(|&i| self.rows.get(i))
    }

    /// Row keys in view order.
    pub fn keys(&self) -> Vec<T::Key> {
        self.iter().map(TableRow::key).collect()
    }

    pub fn headers(&self) -> &[HeaderDescriptor] {
        &self.headers
    }
}

// =============================================================================
// TableEngine
// =============================================================================

/// Column model plus the sort, filter and width state applied to it.
///
/// Never mutates rows; [`derive`](Self::derive) reads a store snapshot.
#[derive(Debug, Clone)]
pub struct TableEngine<T> {
    columns: Vec<ColumnDef<T>>,
    widths: Vec<u32>,
    sort: SortState,
    filters: FilterState,
    mode: FilterMode,
    min_column_width: u32,
}

impl<T: TableRow> TableEngine<T> {
    /// Create an engine over a fixed column set.
    pub fn new(columns: Vec<ColumnDef<T>>, config: &TableConfig) -> Result<Self, TableError> {
        let mut seen = HashSet::new();
        for col in &columns {
            if !seen.insert(col.id.as_str()) {
                return Err(TableError::DuplicateColumn(col.id.clone()));
            }
        }

        let min_column_width = config.min_column_width.max(1);
        let widths = columns
            .iter()
            .map(|c| c.initial_width.max(min_column_width))
            .collect();

        Ok(Self {
            columns,
            widths,
            sort: SortState::new(),
            filters: FilterState::new(),
            mode: config.filter_mode,
            min_column_width,
        })
    }

    // -------------------------------------------------------------------------
    // Columns
    // -------------------------------------------------------------------------

    pub fn columns(&self) -> &[ColumnDef<T>] {
        &self.columns
    }

    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == column_id)
    }

    pub fn column(&self, column_id: &str) -> Option<&ColumnDef<T>> {
        self.columns.iter().find(|c| c.id == column_id)
    }

    /// Current width of a column.
    pub fn width(&self, column_id: &str) -> Option<u32> {
        self.column_index(column_id).map(|i| self.widths[i])
    }

    /// Applies a drag delta to a column's width, clamped to the minimum.
    ///
    /// Returns the new width, or `None` for an unknown column.
    pub fn resize(&mut self, column_id: &str, delta: i32) -> Option<u32> {
        let index = self.column_index(column_id)?;
        let width = (i64::from(self.widths[index]) + i64::from(delta))
            .clamp(i64::from(self.min_column_width), i64::from(u32::MAX)) as u32;
        self.widths[index] = width;
        debug!("Resized column '{}' to {}", column_id, width);
        Some(width)
    }

    // -------------------------------------------------------------------------
    // Sort
    // -------------------------------------------------------------------------

    pub fn sort(&self) -> &SortState {
        &self.sort
    }

    /// Header click: cycles a sortable column through asc, desc and unsorted.
    ///
    /// Unsortable and unknown columns leave the sort untouched.
    pub fn toggle_sort(&mut self, column_id: &str) -> Option<SortDirection> {
        if !self.column(column_id).is_some_and(|c| c.sortable) {
            return self.sort.direction_of(column_id);
        }
        self.sort.toggle(column_id)
    }

    /// Replaces the sort, dropping entries for unsortable columns.
    pub fn set_sort(&mut self, sort: SortState) {
        let mut kept = SortState::new();
        if let Some(primary) = sort
            .entries()
            .iter()
            .find(|s| self.column(&s.column_id).is_some_and(|c| c.sortable))
        {
            kept = SortState::by(primary.column_id.clone(), primary.direction);
        }
        self.sort = kept;
    }

    // -------------------------------------------------------------------------
    // Filter
    // -------------------------------------------------------------------------

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn filter_mode(&self) -> FilterMode {
        self.mode
    }

    pub fn set_filter_mode(&mut self, mode: FilterMode) {
        self.mode = mode;
    }

    /// Sets a column filter; an empty value clears it.
    ///
    /// Returns `false` for unknown or unfilterable columns.
    pub fn set_filter(&mut self, column_id: &str, value: impl Into<String>) -> bool {
        if !self.column(column_id).is_some_and(|c| c.filterable) {
            return false;
        }
        self.filters.set(column_id, value);
        true
    }

    pub fn clear_filters(&mut self) {
        self.filters = FilterState::new();
    }

    // -------------------------------------------------------------------------
    // Derivation
    // -------------------------------------------------------------------------

    /// Header descriptors in column order.
    pub fn headers(&self) -> Vec<HeaderDescriptor> {
        self.columns
            .iter()
            .zip(&self.widths)
            .map(|(col, &width)| HeaderDescriptor {
                column_id: col.id.clone(),
                label: col.header.clone(),
                width,
                sortable: col.sortable,
                filterable: col.filterable,
                sort: self.sort.direction_of(&col.id),
                filter: self.filters.get(&col.id).map(str::to_string),
            })
            .collect()
    }

    /// Filters then stably sorts a snapshot.
    ///
    /// Rows must pass every active filter. Rows with equal sort values keep
    /// their snapshot order in both directions.
    pub fn derive(&self, rows: Arc<Vec<T>>) -> TableView<T> {
        let mut matchers: Vec<(&ColumnDef<T>, TextMatcher)> = self
            .filters
            .iter()
            .filter_map(|(id, value)| {
                self.column(id)
                    .filter(|c| c.filterable)
                    .map(|c| (c, TextMatcher::new(value, self.mode)))
            })
            .collect();

        let mut order: Vec<usize> = (0..rows.len())
            .filter(|&i| {
                matchers
                    .iter_mut()
                    .all(|(col, matcher)| matcher.matches(&col.text(&rows[i])))
            })
            .collect();

        let sort_column = self.sort.primary().and_then(|s| {
            self.column(&s.column_id)
                .filter(|c| c.sortable)
                .map(|c| (c, s.direction))
        });

        if let Some((col, direction)) = sort_column {
            let keys: Vec<CellValue> = order.iter().map(|&i| col.value(&rows[i])).collect();
            let mut positions: Vec<usize> = (0..order.len()).collect();
            positions.sort_by(|&a, &b| match direction {
                SortDirection::Ascending => keys[a].sort_cmp(&keys[b]),
                SortDirection::Descending => keys[b].sort_cmp(&keys[a]),
            });
            order = positions.into_iter().map(|p| order[p]).collect();
        }

        debug!(
            "Derived {} of {} rows ({} filters, sort {:?})",
            order.len(),
            rows.len(),
            matchers.len(),
            self.sort.primary()
        );

        TableView {
            rows,
            order,
            headers: self.headers(),
        }
    }
}
