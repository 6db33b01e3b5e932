//! Column filters.

use std::collections::BTreeMap;

use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use serde::Deserialize;
use serde::Serialize;

/// How a filter value is matched against a cell's text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FilterMode {
    /// Substring, exact case.
    #[default]
    CaseSensitive,
    /// Substring, ignoring case.
    CaseInsensitive,
    /// Fuzzy subsequence match, ignoring case.
    Fuzzy,
}

/// Free-text filter value per column id.
///
/// Empty values are never stored, so every entry is an active constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterState(BTreeMap<String, String>);

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the filter for a column; an empty value clears it.
    pub fn set(&mut self, column_id: impl Into<String>, value: impl Into<String>) {
        let column_id = column_id.into();
        let value = value.into();
        if value.is_empty() {
            self.0.remove(&column_id);
        } else {
            self.0.insert(column_id, value);
        }
    }

    pub fn clear(&mut self, column_id: &str) {
        self.0.remove(column_id);
    }

    pub fn get(&self, column_id: &str) -> Option<&str> {
        self.0.get(column_id).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Active `(column_id, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// A compiled filter value.
pub(crate) struct TextMatcher {
    needle: String,
    mode: FilterMode,
    fuzzy: Option<(Pattern, Matcher)>,
    buf: Vec<char>,
}

impl TextMatcher {
    pub(crate) fn new(needle: &str, mode: FilterMode) -> Self {
        let fuzzy = (mode == FilterMode::Fuzzy).then(|| {
            (
                Pattern::new(needle, CaseMatching::Ignore, Normalization::Smart, AtomKind::Fuzzy),
                Matcher::new(Config::DEFAULT),
            )
        });
        let needle = match mode {
            FilterMode::CaseInsensitive => needle.to_lowercase(),
            _ => needle.to_string(),
        };
        Self {
            needle,
            mode,
            fuzzy,
            buf: Vec::new(),
        }
    }

    pub(crate) fn matches(&mut self, haystack: &str) -> bool {
        match self.mode {
            FilterMode::CaseSensitive => haystack.contains(&self.needle),
            FilterMode::CaseInsensitive => haystack.to_lowercase().contains(&self.needle),
            FilterMode::Fuzzy => match &mut self.fuzzy {
                Some((pattern, matcher)) => {
                    self.buf.clear();
                    let haystack = Utf32Str::new(haystack, &mut self.buf);
                    pattern.score(haystack, matcher).is_some()
                }
                None => false,
            },
        }
    }
}
