use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;

/// Byte range of a node or token in the pattern text. Patterns are a single
/// line, so positions are shown as columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Span { start, end }
    }

    /// From this span's start up to `end`
    pub fn until(self, end: usize) -> Span {
        Span::new(self.start, end.max(self.start))
    }

    pub fn merge(self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Whether this span begins exactly at `offset`, with nothing in between
    pub fn starts_at(&self, offset: usize) -> bool {
        self.start == offset
    }

    pub fn to_range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Carets under the spanned characters of `source`, for diagnostics
    pub fn underline(&self, source: &str) -> String {
        let column = |offset: usize| source.get(..offset).map_or(offset, |s| s.chars().count());
        let start = column(self.start);
        let width = column(self.end).saturating_sub(start).max(1);
        format!("{}{}", " ".repeat(start), "^".repeat(width))
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

/// One-based columns
impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.end <= self.start + 1 {
            write!(f, "column {}", self.start + 1)
        } else {
            write!(f, "columns {}-{}", self.start + 1, self.end)
        }
    }
}
