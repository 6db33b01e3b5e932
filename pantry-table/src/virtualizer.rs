//! Visible-window computation for long row lists.
//!
//! Pure functions of row heights, viewport and scroll offset; nothing here
//! knows about a rendering surface.

/// The slice of rows to materialize, plus the space to reserve around it.
///
/// `padding_top + visible height + padding_bottom == total_height` always holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VisibleWindow {
    /// First rendered row (inclusive).
    pub start_index: usize,
    /// End of the rendered rows (exclusive).
    pub end_index: usize,
    /// Height of the rows before `start_index`.
    pub padding_top: u64,
    /// Height of the rows from `end_index` on.
    pub padding_bottom: u64,
    /// Height of all rows.
    pub total_height: u64,
}

impl VisibleWindow {
    /// Rendered row indices.
    pub fn range(&self) -> std::ops::Range<usize> {
        self.start_index..self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index - self.start_index
    }

    pub fn is_empty(&self) -> bool {
        self.start_index == self.end_index
    }

    /// Height of the rendered rows.
    pub fn visible_height(&self) -> u64 {
        self.total_height - self.padding_top - self.padding_bottom
    }
}

/// Row offsets for a list of rows with known heights.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Virtualizer {
    /// cumulative[i] = top of row i; cumulative[len] = total height.
    cumulative: Vec<u64>,
}

impl Virtualizer {
    /// Create from per-row heights.
    pub fn from_heights(heights: impl IntoIterator<Item = u32>) -> Self {
        let mut cumulative = vec![0u64];
        let mut total = 0u64;
        for h in heights {
            total += u64::from(h);
            cumulative.push(total);
        }
        Self { cumulative }
    }

    /// Create for `count` rows of the same height.
    pub fn uniform(count: usize, row_height: u32) -> Self {
        Self::from_heights(std::iter::repeat_n(row_height, count))
    }

    pub fn row_count(&self) -> usize {
        self.cumulative.len() - 1
    }

    /// Get total content height. O(1).
    pub fn total_height(&self) -> u64 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Get height of row at index. O(1).
    pub fn row_height(&self, index: usize) -> u64 {
        if index < self.row_count() {
            self.cumulative[index + 1] - self.cumulative[index]
        } else {
            0
        }
    }

    /// Find row index at given Y offset. O(log n) binary search.
    ///
    /// Offsets past the end resolve to the last row.
    pub fn row_at_offset(&self, y: u64) -> usize {
        self.cumulative[..self.row_count()]
            .partition_point(|&h| h <= y)
            .saturating_sub(1)
    }

    /// Rows covering `[scroll_offset, scroll_offset + viewport_height)` plus
    /// `overscan` rows on each side.
    ///
    /// The scroll offset is clamped so the viewport never starts past the
    /// last full screen of content.
    pub fn window(&self, scroll_offset: u64, viewport_height: u64, overscan: usize) -> VisibleWindow {
        let count = self.row_count();
        let total_height = self.total_height();
        if count == 0 {
            return VisibleWindow::default();
        }

        let scroll = scroll_offset.min(total_height.saturating_sub(viewport_height));
        let first = self.row_at_offset(scroll);
        let bottom = scroll.saturating_add(viewport_height);
        let last = self.cumulative[..count]
            .partition_point(|&top| top < bottom)
            .max(first);

        let start_index = first.saturating_sub(overscan);
        let end_index = last.saturating_add(overscan).min(count);
        VisibleWindow {
            start_index,
            end_index,
            padding_top: self.cumulative[start_index],
            padding_bottom: total_height - self.cumulative[end_index],
            total_height,
        }
    }
}

/// Window over rows with individual heights.
pub fn visible_window(
    heights: &[u32],
    scroll_offset: u64,
    viewport_height: u64,
    overscan: usize,
) -> VisibleWindow {
    Virtualizer::from_heights(heights.iter().copied()).window(scroll_offset, viewport_height, overscan)
}

/// Window over `row_count` rows of `estimated_row_height` each.
///
/// Allocation-free equivalent of [`Virtualizer::uniform`] followed by
/// [`Virtualizer::window`].
pub fn estimated_window(
    row_count: usize,
    viewport_height: u64,
    estimated_row_height: u32,
    scroll_offset: u64,
    overscan: usize,
) -> VisibleWindow {
    let h = u64::from(estimated_row_height);
    if row_count == 0 || h == 0 {
        return VisibleWindow {
            start_index: 0,
            end_index: if h == 0 { row_count } else { 0 },
            ..VisibleWindow::default()
        };
    }

    let total_height = row_count as u64 * h;
    let scroll = scroll_offset.min(total_height.saturating_sub(viewport_height));
    let first = ((scroll / h) as usize).min(row_count - 1);
    let last = (scroll.saturating_add(viewport_height).div_ceil(h) as usize)
        .min(row_count)
        .max(first);

    let start_index = first.saturating_sub(overscan);
    let end_index = last.saturating_add(overscan).min(row_count);
    VisibleWindow {
        start_index,
        end_index,
        padding_top: start_index as u64 * h,
        padding_bottom: (row_count - end_index) as u64 * h,
        total_height,
    }
}
