//! Table configuration.

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::filter::FilterMode;

/// Tunables for a mounted inventory table.
///
/// ```
/// use std::time::Duration;
/// use pantry_table::{FilterMode, TableConfig};
///
/// let config = TableConfig::default()
///     .row_height(32)
///     .request_timeout(Duration::from_secs(5))
///     .filter_mode(FilterMode::CaseInsensitive);
/// assert_eq!(config.overscan, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TableConfig {
    /// Estimated row height in pixels.
    pub row_height: u32,
    /// Rows rendered beyond each edge of the viewport.
    pub overscan: usize,
    /// Lower bound for resized column widths.
    pub min_column_width: u32,
    /// Bound on every remote mutation.
    #[serde(rename = "requestTimeoutMs", with = "duration_ms")]
    pub request_timeout: Duration,
    pub filter_mode: FilterMode,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            row_height: 40,
            overscan: 10,
            min_column_width: 20,
            request_timeout: Duration::from_secs(10),
            filter_mode: FilterMode::CaseSensitive,
        }
    }
}

impl TableConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the estimated row height. Clamped to at least 1.
    pub fn row_height(mut self, px: u32) -> Self {
        self.row_height = px.max(1);
        self
    }

    /// Set the overscan count.
    pub fn overscan(mut self, rows: usize) -> Self {
        self.overscan = rows;
        self
    }

    /// Set the minimum column width. Clamped to at least 1.
    pub fn min_column_width(mut self, width: u32) -> Self {
        self.min_column_width = width.max(1);
        self
    }

    /// Set the mutation timeout.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the filter matching mode.
    pub fn filter_mode(mut self, mode: FilterMode) -> Self {
        self.filter_mode = mode;
        self
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::Deserialize;
    use serde::Deserializer;
    use serde::Serializer;

    pub fn serialize<S: Serializer>(value: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(value.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
