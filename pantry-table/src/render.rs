//! Plain-text rendering of a table window.

use chrono::NaiveDate;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::column::{CellKind, ColumnDef};
use crate::engine::HeaderDescriptor;
use crate::row::EditableRow;
use crate::table::InventoryTable;
use crate::value::CellValue;

/// Shown in place of rows when the view is empty.
pub const EMPTY_MESSAGE: &str = "Nothing found";

/// Shown for a date cell with no date.
pub const NO_DATE: &str = "--/--/----";

/// Inputs that affect how cells read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    /// Dates before this are marked expired.
    pub today: NaiveDate,
    /// Pixels per character when mapping column widths to text.
    pub px_per_char: u32,
}

impl RenderContext {
    pub fn new(today: NaiveDate) -> Self {
        Self { today, px_per_char: 10 }
    }

    fn chars(&self, width_px: u32) -> usize {
        (width_px / self.px_per_char.max(1)).max(1) as usize
    }
}

/// Appended to a cell whose edit is waiting on the backend.
pub const PENDING_MARK: &str = "…";

/// Appended to a cell whose last edit was rolled back.
pub const ERROR_MARK: &str = " !";

/// Edit state of one cell as far as rendering is concerned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CellStatus {
    pub pending: bool,
    pub failed: bool,
}

impl CellStatus {
    fn decorate(self, mut text: String) -> String {
        if self.pending {
            text.push_str(PENDING_MARK);
        } else if self.failed {
            text.push_str(ERROR_MARK);
        }
        text
    }
}

/// Renders one cell according to its column kind.
pub fn render_cell<T>(column: &ColumnDef<T>, row: &T, status: CellStatus, ctx: &RenderContext) -> String {
    let value = column.value(row);
    match &column.kind {
        CellKind::Toggle => {
            let mark = match value {
                CellValue::Bool(true) => "[x]",
                _ => "[ ]",
            };
            status.decorate(mark.to_string())
        }
        CellKind::Date => {
            let text = match value {
                CellValue::Date(date) if date < ctx.today => format!("{} !!", date.format("%m/%d/%Y")),
                CellValue::Date(date) => date.format("%m/%d/%Y").to_string(),
                _ => NO_DATE.to_string(),
            };
            status.decorate(text)
        }
        CellKind::Text => value.to_string(),
        CellKind::Custom(render) => render(row, &value),
    }
}

/// Renders a header label with its sort indicator and filter value.
pub fn render_header(header: &HeaderDescriptor) -> String {
    let mut text = header.label.clone();
    if let Some(direction) = header.sort {
        text.push(' ');
        text.push_str(direction.indicator());
    }
    if let Some(filter) = &header.filter {
        text.push_str(&format!(" [{}]", filter));
    }
    text
}

/// Renders the header and the rows currently on screen, one line each.
pub fn render_table<T: EditableRow>(table: &InventoryTable<T>, ctx: &RenderContext) -> Vec<String> {
    let Some(visible) = table.visible() else {
        return Vec::new();
    };
    let headers = visible.view.headers();
    let widths: Vec<usize> = headers.iter().map(|h| ctx.chars(h.width)).collect();

    let mut lines = Vec::with_capacity(visible.window.len() + 1);
    lines.push(join_cells(headers.iter().map(render_header), &widths));

    if visible.view.is_empty() {
        lines.push(EMPTY_MESSAGE.to_string());
        return lines;
    }

    let columns = table.columns();
    for (_, row) in visible.iter() {
        let key = row.key();
        let cells = columns.iter().map(|col| {
            let status = if col.kind.is_editable() {
                CellStatus {
                    pending: table.is_pending(&key, &col.id),
                    failed: table.last_error(&key, &col.id).is_some(),
                }
            } else {
                CellStatus::default()
            };
            render_cell(col, row, status, ctx)
        });
        lines.push(join_cells(cells, &widths));
    }
    lines
}

fn join_cells(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| fit(&cell, width))
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end()
        .to_string()
}

/// Truncates with an ellipsis or pads to exactly `width` display columns.
fn fit(text: &str, width: usize) -> String {
    let current = text.width();
    if current <= width {
        return format!("{}{}", text, " ".repeat(width - current));
    }

    let target = width.saturating_sub(1);
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > target {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out.push_str(&" ".repeat(target - used));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sort::SortDirection;

    fn ctx() -> RenderContext {
        RenderContext::new(NaiveDate::from_ymd_opt(2025, 1, 10).unwrap())
    }

    fn date_column() -> ColumnDef<Option<NaiveDate>> {
        ColumnDef::new("expiration", "Expiration", |d: &Option<NaiveDate>| CellValue::from(*d)).kind(CellKind::Date)
    }

    #[test]
    fn test_date_cells() {
        let col = date_column();
        assert_eq!(render_cell(&col, &None, CellStatus::default(), &ctx()), NO_DATE);
        let fresh = NaiveDate::from_ymd_opt(2025, 2, 3);
        assert_eq!(render_cell(&col, &fresh, CellStatus::default(), &ctx()), "02/03/2025");
        let old = NaiveDate::from_ymd_opt(2025, 1, 9);
        assert_eq!(render_cell(&col, &old, CellStatus::default(), &ctx()), "01/09/2025 !!");
        let today = NaiveDate::from_ymd_opt(2025, 1, 10);
        assert_eq!(render_cell(&col, &today, CellStatus::default(), &ctx()), "01/10/2025");
    }

    #[test]
    fn test_cleared_date_shows_pending_and_error_marks() {
        let col = date_column();
        let pending = CellStatus { pending: true, failed: false };
        assert_eq!(render_cell(&col, &None, pending, &ctx()), "--/--/----…");
        let failed = CellStatus { pending: false, failed: true };
        assert_eq!(render_cell(&col, &None, failed, &ctx()), "--/--/---- !");
    }

    #[test]
    fn test_toggle_cells() {
        let col = ColumnDef::new("inStock", "In Stock", |b: &bool| CellValue::Bool(*b)).kind(CellKind::Toggle);
        let pending = CellStatus { pending: true, failed: false };
        let failed = CellStatus { pending: false, failed: true };
        assert_eq!(render_cell(&col, &true, CellStatus::default(), &ctx()), "[x]");
        assert_eq!(render_cell(&col, &false, pending, &ctx()), "[ ]…");
        assert_eq!(render_cell(&col, &false, failed, &ctx()), "[ ] !");
    }

    #[test]
    fn test_header() {
        let header = HeaderDescriptor {
            column_id: "name".into(),
            label: "Name".into(),
            width: 300,
            sortable: true,
            filterable: true,
            sort: Some(SortDirection::Descending),
            filter: Some("egg".into()),
        };
        assert_eq!(render_header(&header), "Name ▼ [egg]");
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("Eggs", 6), "Eggs  ");
        assert_eq!(fit("Chicken Breast", 5), "Chic…");
        assert_eq!(fit("卵とミルク", 6), "卵と… ");
    }
}
