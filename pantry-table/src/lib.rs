//! Editable, virtualized inventory table.
//!
//! The table is split into small, independently testable pieces:
//!
//! - [`RowStore`]: ordered rows with copy-on-write updates
//! - [`ColumnDef`]: accessors, cell kinds, sortability and width
//! - [`TableEngine`]: filter, sort, resize and header descriptors
//! - [`Virtualizer`]: which rows of the derived view are on screen
//! - [`CellEditor`]: optimistic edits reconciled against the backend
//! - [`PantrySession`]: a mounted pantry with its add/remove actions
//!
//! [`InventoryTable`] ties the store, engine and viewport together behind a
//! cheap-to-clone handle.

pub mod column;
pub mod config;
pub mod editor;
pub mod engine;
pub mod error;
pub mod filter;
pub mod pantry;
pub mod picker;
pub mod render;
pub mod row;
pub mod session;
pub mod sort;
pub mod store;
pub mod table;
pub mod value;
pub mod virtualizer;

pub use column::{CellKind, ColumnDef};
pub use config::TableConfig;
pub use editor::{CellEditor, CellMutation, EditOutcome, EditorState};
pub use engine::{HeaderDescriptor, TableEngine, TableView};
pub use error::{MutationError, TableError};
pub use filter::{FilterMode, FilterState};
pub use row::{EditableRow, TableRow};
pub use pantry::{GatewayMutation, pantry_columns};
pub use picker::{IngredientPicker, PickerEntry, PickerGroup};
pub use render::{CellStatus, RenderContext, render_table};
pub use session::PantrySession;
pub use sort::{ColumnSort, SortDirection, SortState};
pub use store::RowStore;
pub use table::{InventoryTable, VisibleRows};
pub use value::CellValue;
pub use virtualizer::{Virtualizer, VisibleWindow, estimated_window, visible_window};
