//! Span - half-open character range over the shared text
//!
//! Offsets count Unicode scalar values (`char`s), not bytes, so a span
//! produced by the builder's cursor can be compared directly with spans of
//! pre-existing markup over the same text.

use std::fmt;
use std::ops::Range;

/// A half-open `[start, end)` range of character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    /// First character covered
    pub start: usize,
    /// One past the last character covered
    pub end: usize,
}

impl Span {
    /// Create a new span
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Create a zero-width span at `pos`
    #[inline]
    pub const fn empty_at(pos: usize) -> Self {
        Self { start: pos, end: pos }
    }

    /// Number of characters covered
    #[inline]
    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Check if this span covers no characters
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// `start <= end`
    #[inline]
    pub const fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    /// True if `other` lies within this span (boundaries may coincide)
    #[inline]
    pub const fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// True if `pos` lies strictly between the boundaries
    #[inline]
    pub const fn strictly_contains_pos(&self, pos: usize) -> bool {
        self.start < pos && pos < self.end
    }

    /// True if the spans share at least one character; a zero-width span
    /// shares none
    #[inline]
    pub const fn overlaps(&self, other: Span) -> bool {
        !self.is_empty() && !other.is_empty() && self.start < other.end && other.start < self.end
    }

    /// Extract the covered characters from `text`
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        let mut indices = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len()));
        let Some(start) = indices.nth(self.start) else {
            return "";
        };
        let end = if self.is_empty() {
            start
        } else {
            match indices.nth(self.len() - 1) {
                Some(end) => end,
                None => return "",
            }
        };
        &text[start..end]
    }
}

impl From<Range<usize>> for Span {
    fn from(range: Range<usize>) -> Self {
        Span::new(range.start, range.end)
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.start, self.end)
    }
}
