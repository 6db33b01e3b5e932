//! Row traits.

use std::fmt::Debug;
use std::fmt::Display;
use std::hash::Hash;

use pantry_lib::error::FieldError;

/// Trait for rows that can be displayed in an inventory table.
///
/// # Example
///
/// ```ignore
/// #[derive(Clone)]
/// struct Item {
///     id: String,
///     name: String,
/// }
///
/// impl TableRow for Item {
///     type Key = String;
///
///     fn key(&self) -> String {
///         self.id.clone()
///     }
/// }
/// ```
pub trait TableRow: Clone + Send + Sync + 'static {
    /// The key type used to identify this row.
    type Key: Clone + Eq + Hash + Debug + Display + Send + Sync + 'static;

    /// Return a unique, stable key for this row.
    fn key(&self) -> Self::Key;
}

/// Rows whose fields can be written by column id.
pub trait EditableRow: TableRow {
    /// Value type written into editable cells.
    type Value: Clone + PartialEq + Debug + Send + Sync + 'static;

    /// Reads the editable field displayed under `column_id`.
    fn get_field(&self, column_id: &str) -> Option<Self::Value>;

    /// Replaces the editable field displayed under `column_id`.
    ///
    /// Must leave the row untouched on error.
    fn set_field(&mut self, column_id: &str, value: Self::Value) -> Result<(), FieldError>;
}
