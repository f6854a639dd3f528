//! Byte spans, line/column positions and diagnostic locations.
//!
//! Positions are 0-based internally. [`Location::line`] and
//! [`Location::column`] convert to the 1-based values shown to users.

use crate::id::DocumentId;
use core::fmt;
use serde::{Deserialize, Serialize};

/// A half-open byte range `[start, end)` into a source unit's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Offset of the first byte.
    pub start: usize,
    /// Offset one past the last byte.
    pub end: usize,
}

impl Span {
    /// Creates a span covering `[start, end)`.
    #[must_use]
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {start} is after end {end}");
        Self { start, end }
    }

    /// Creates an empty span at `offset`.
    #[must_use]
    pub fn empty(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    /// Returns the length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the span covers no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns the smallest span covering both `self` and `other`.
    #[must_use]
    pub fn to(&self, other: Span) -> Span {
        Span::new(self.start.min(other.start), self.end.max(other.end))
    }

    /// Returns true if `other` lies entirely within this span.
    #[must_use]
    pub fn contains(&self, other: Span) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    /// Returns the slice of `text` covered by this span.
    ///
    /// Returns an empty string when the span is out of range.
    #[must_use]
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        text.get(self.start..self.end).unwrap_or_default()
    }
}

/// A 0-based line and character column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LineCol {
    /// 0-based line number.
    pub line: u32,
    /// 0-based column, counted in characters.
    pub column: u32,
}

/// Maps byte offsets of one text to [`LineCol`] positions.
#[derive(Debug, Clone, Default)]
pub struct LineIndex {
    line_starts: Vec<usize>,
}

impl LineIndex {
    /// Builds the index for `text`.
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        for (offset, byte) in text.bytes().enumerate() {
            if byte == b'\n' {
                line_starts.push(offset + 1);
            }
        }
        Self { line_starts }
    }

    /// Returns the number of lines.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Converts a byte offset of `text` into a line/column position.
    #[must_use]
    pub fn line_col(&self, text: &str, offset: usize) -> LineCol {
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(next) => next - 1,
        };
        let line_start = self.line_starts[line];
        let column = text
            .get(line_start..offset.min(text.len()))
            .map_or(0, |prefix| prefix.chars().count());
        LineCol {
            line: line as u32,
            column: column as u32,
        }
    }

    /// Builds the [`Location`] of `span` in `text`, which belongs to `document`.
    #[must_use]
    pub fn location(&self, document: DocumentId, text: &str, span: Span) -> Location {
        Location {
            document,
            span,
            start: self.line_col(text, span.start),
            end: self.line_col(text, span.end),
        }
    }
}

/// Where a diagnostic or symbol lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// Document containing the location.
    pub document: DocumentId,
    /// Byte span within the document.
    pub span: Span,
    /// 0-based start position.
    pub start: LineCol,
    /// 0-based end position.
    pub end: LineCol,
}

impl Location {
    /// Returns the 1-based start line.
    #[must_use]
    pub fn line(&self) -> u32 {
        self.start.line + 1
    }

    /// Returns the 1-based start column.
    #[must_use]
    pub fn column(&self) -> u32 {
        self.start.column + 1
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.document, self.line(), self.column())
    }
}
