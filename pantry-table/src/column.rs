//! Column definitions.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;
use std::sync::Arc;

use log::warn;

use crate::value::CellValue;

/// Derives a cell value from a row.
pub type Accessor<T> = Arc<dyn Fn(&T) -> CellValue + Send + Sync>;

/// Renders a custom cell to text.
pub type CustomRenderer<T> = Arc<dyn Fn(&T, &CellValue) -> String + Send + Sync>;

/// Default column width when none is given.
pub const DEFAULT_COLUMN_WIDTH: u32 = 150;

// =============================================================================
// CellKind
// =============================================================================

/// How a cell is rendered and interacted with.
pub enum CellKind<T> {
    /// A boolean switch backed by a cell editor.
    Toggle,
    /// A date picker backed by a cell editor.
    Date,
    /// Plain text.
    Text,
    /// A column-supplied renderer.
    Custom(CustomRenderer<T>),
}

impl<T> CellKind<T> {
    /// Creates a custom cell kind from a render callback.
    pub fn custom(render: impl Fn(&T, &CellValue) -> String + Send + Sync + 'static) -> Self {
        Self::Custom(Arc::new(render))
    }

    /// Returns `true` for kinds that edit the row in place.
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Toggle | Self::Date)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Toggle => "toggle",
            Self::Date => "date",
            Self::Text => "text",
            Self::Custom(_) => "custom",
        }
    }
}

impl<T> Clone for CellKind<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Toggle => Self::Toggle,
            Self::Date => Self::Date,
            Self::Text => Self::Text,
            Self::Custom(render) => Self::Custom(Arc::clone(render)),
        }
    }
}

impl<T> std::fmt::Debug for CellKind<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// ColumnDef
// =============================================================================

/// A table column definition.
///
/// Columns are static per table; only their width changes at runtime, and
/// that lives in the [`TableEngine`](crate::TableEngine).
pub struct ColumnDef<T> {
    /// Unique identifier for this column.
    pub id: String,
    /// Header text.
    pub header: String,
    /// Derives the displayed value.
    pub accessor: Accessor<T>,
    /// Rendering and interaction.
    pub kind: CellKind<T>,
    pub sortable: bool,
    pub filterable: bool,
    /// Width before any user resize.
    pub initial_width: u32,
}

impl<T> ColumnDef<T> {
    /// Creates a new sortable, filterable text column.
    pub fn new(
        id: impl Into<String>,
        header: impl Into<String>,
        accessor: impl Fn(&T) -> CellValue + Send + Sync + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            header: header.into(),
            accessor: Arc::new(accessor),
            kind: CellKind::Text,
            sortable: true,
            filterable: true,
            initial_width: DEFAULT_COLUMN_WIDTH,
        }
    }

    /// Set the cell kind.
    pub fn kind(mut self, kind: CellKind<T>) -> Self {
        self.kind = kind;
        self
    }

    /// Set whether clicking the header sorts.
    pub fn sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// Set whether the column accepts a filter value.
    pub fn filterable(mut self, filterable: bool) -> Self {
        self.filterable = filterable;
        self
    }

    /// Set the initial width.
    pub fn width(mut self, width: u32) -> Self {
        self.initial_width = width;
        self
    }

    /// Derives this column's value for a row.
    ///
    /// A panicking accessor yields [`CellValue::Empty`].
    pub fn value(&self, row: &T) -> CellValue {
        match catch_unwind(AssertUnwindSafe(|| (self.accessor)(row))) {
            Ok(value) => value,
            Err(panic) => {
                warn!(
                    "Accessor for column '{}' panicked: {}",
                    self.id,
                    panic_message(&panic)
                );
                CellValue::Empty
            }
        }
    }

    /// Derives this column's value as text for filtering.
    pub fn text(&self, row: &T) -> String {
        self.value(row).to_string()
    }
}

impl<T> Clone for ColumnDef<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            header: self.header.clone(),
            accessor: Arc::clone(&self.accessor),
            kind: self.kind.clone(),
            sortable: self.sortable,
            filterable: self.filterable,
            initial_width: self.initial_width,
        }
    }
}

impl<T> std::fmt::Debug for ColumnDef<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ColumnDef")
            .field("id", &self.id)
            .field("header", &self.header)
            .field("kind", &self.kind)
            .field("sortable", &self.sortable)
            .field("filterable", &self.filterable)
            .field("initial_width", &self.initial_width)
            .finish()
    }
}

fn panic_message(panic: &Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let col = ColumnDef::<String>::new("name", "Name", |s: &String| CellValue::from(s.as_str()));
        assert!(col.sortable);
        assert!(col.filterable);
        assert_eq!(col.initial_width, DEFAULT_COLUMN_WIDTH);
        assert!(!col.kind.is_editable());
    }

    #[test]
    fn test_panicking_accessor_is_empty() {
        let col = ColumnDef::<String>::new("bad", "Bad", |_: &String| panic!("boom"));
        assert_eq!(col.value(&"x".to_string()), CellValue::Empty);
        assert_eq!(col.text(&"x".to_string()), "");
    }

    #[test]
    fn test_custom_kind_renders() {
        let kind = CellKind::<String>::custom(|row, _| format!("<{}>", row));
        match kind {
            CellKind::Custom(render) => assert_eq!(render(&"a".to_string(), &CellValue::Empty), "<a>"),
            _ => panic!("expected custom"),
        }
    }
}
