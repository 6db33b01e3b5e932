//! Sort state.

use serde::Deserialize;
use serde::Serialize;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    /// Header indicator.
    pub fn indicator(&self) -> &'static str {
        match self {
            Self::Ascending => "▲",
            Self::Descending => "▼",
        }
    }
}

/// A single sort entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnSort {
    pub column_id: String,
    pub direction: SortDirection,
}

impl ColumnSort {
    pub fn new(column_id: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            column_id: column_id.into(),
            direction,
        }
    }
}

/// Ordered list of sort entries; empty preserves store order.
///
/// Only the first entry drives ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortState(Vec<ColumnSort>);

impl SortState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort by a single column.
    pub fn by(column_id: impl Into<String>, direction: SortDirection) -> Self {
        Self(vec![ColumnSort::new(column_id, direction)])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn entries(&self) -> &[ColumnSort] {
        &self.0
    }

    /// The entry that drives ordering.
    pub fn primary(&self) -> Option<&ColumnSort> {
        self.0.first()
    }

    /// Direction applied to `column_id`, if it is the primary column.
    pub fn direction_of(&self, column_id: &str) -> Option<SortDirection> {
        self.primary()
            .filter(|s| s.column_id == column_id)
            .map(|s| s.direction)
    }

    /// Advances `column_id` through unsorted, ascending, descending, unsorted.
    ///
    /// Toggling a column other than the primary one starts it at ascending.
    pub fn toggle(&mut self, column_id: &str) -> Option<SortDirection> {
        let next = match self.direction_of(column_id) {
            None => Some(SortDirection::Ascending),
            Some(SortDirection::Ascending) => Some(SortDirection::Descending),
            Some(SortDirection::Descending) => None,
        };
        self.0 = next
            .map(|direction| vec![ColumnSort::new(column_id, direction)])
            .unwrap_or_default();
        next
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_cycles() {
        let mut sort = SortState::new();
        assert_eq!(sort.toggle("name"), Some(SortDirection::Ascending));
        assert_eq!(sort.toggle("name"), Some(SortDirection::Descending));
        assert_eq!(sort.toggle("name"), None);
        assert!(sort.is_empty());
    }

    #[test]
    fn test_toggle_other_column_restarts() {
        let mut sort = SortState::by("name", SortDirection::Descending);
        assert_eq!(sort.toggle("category"), Some(SortDirection::Ascending));
        assert_eq!(sort.direction_of("name"), None);
        assert_eq!(sort.entries().len(), 1);
    }

    #[test]
    fn test_serde_shape() {
        let sort = SortState::by("inStock", SortDirection::Ascending);
        let json = serde_json::to_string(&sort).unwrap();
        assert_eq!(json, r#"[{"columnId":"inStock","direction":"ascending"}]"#);
    }
}
