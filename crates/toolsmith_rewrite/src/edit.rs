//! Text edits applied in a single pass.

use crate::error::RewriteError;
use serde::{Deserialize, Serialize};
use toolsmith_syntax::Span;

/// Replaces the text under `span` with `replacement`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    /// Replaced text; empty for an insertion.
    pub span: Span,
    /// New text.
    pub replacement: String,
}

impl TextEdit {
    /// Inserts `text` at `offset`.
    pub fn insert(offset: usize, text: impl Into<String>) -> Self {
        Self {
            span: Span::empty(offset),
            replacement: text.into(),
        }
    }

    /// Replaces the text under `span` with `text`.
    pub fn replace(span: Span, text: impl Into<String>) -> Self {
        Self {
            span,
            replacement: text.into(),
        }
    }
}

/// An immutable document text plus the edits to apply to it.
///
/// Edits may be pushed in any order. Insertions at the same offset are applied
/// in the order they were pushed.
#[derive(Debug)]
pub struct EditBuffer<'a> {
    text: &'a str,
    edits: Vec<TextEdit>,
}

impl<'a> EditBuffer<'a> {
    /// Creates a buffer over `text` with no edits.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            edits: Vec::new(),
        }
    }

    /// Adds an edit.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::OutOfRange`] if the edit's span is not a
    /// character-aligned range of the text.
    pub fn push(&mut self, edit: TextEdit) -> Result<(), RewriteError> {
        let Span { start, end } = edit.span;
        if start > end
            || end > self.text.len()
            || !self.text.is_char_boundary(start)
            || !self.text.is_char_boundary(end)
        {
            return Err(RewriteError::OutOfRange {
                start,
                end,
                len: self.text.len(),
            });
        }
        self.edits.push(edit);
        Ok(())
    }

    /// Returns the number of edits.
    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    /// Returns true if there are no edits.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Applies every edit, leaving all other text byte-identical.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::Overlap`] if two edits replace overlapping
    /// text.
    pub fn apply(mut self) -> Result<String, RewriteError> {
        self.edits
            .sort_by_key(|edit| (edit.span.start, edit.span.end));
        for pair in self.edits.windows(2) {
            if pair[0].span.end > pair[1].span.start {
                return Err(RewriteError::Overlap {
                    first: pair[0].span,
                    second: pair[1].span,
                });
            }
        }

        let added: usize = self.edits.iter().map(|edit| edit.replacement.len()).sum();
        let mut output = String::with_capacity(self.text.len() + added);
        let mut cursor = 0;
        for edit in &self.edits {
            output.push_str(&self.text[cursor..edit.span.start]);
            output.push_str(&edit.replacement);
            cursor = edit.span.end;
        }
        output.push_str(&self.text[cursor..]);
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_apply_in_offset_order() {
        let mut buffer = EditBuffer::new("one two three");
        buffer.push(TextEdit::replace(Span::new(8, 13), "3")).unwrap();
        buffer.push(TextEdit::insert(0, "[")).unwrap();
        buffer.push(TextEdit::replace(Span::new(4, 7), "2")).unwrap();
        assert_eq!(buffer.len(), 3);
        assert_eq!(buffer.apply().unwrap(), "[one 2 3");
    }

    #[test]
    fn insertions_at_one_offset_keep_push_order() {
        let mut buffer = EditBuffer::new("ab");
        buffer.push(TextEdit::insert(1, "x")).unwrap();
        buffer.push(TextEdit::insert(1, "y")).unwrap();
        assert_eq!(buffer.apply().unwrap(), "axyb");
    }

    #[test]
    fn no_edits_is_identity() {
        let buffer = EditBuffer::new("unchanged\n");
        assert!(buffer.is_empty());
        assert_eq!(buffer.apply().unwrap(), "unchanged\n");
    }

    #[test]
    fn overlapping_edits_are_rejected() {
        let mut buffer = EditBuffer::new("abcdef");
        buffer.push(TextEdit::replace(Span::new(0, 3), "x")).unwrap();
        buffer.push(TextEdit::replace(Span::new(2, 4), "y")).unwrap();
        assert_eq!(
            buffer.apply(),
            Err(RewriteError::Overlap {
                first: Span::new(0, 3),
                second: Span::new(2, 4),
            })
        );
    }

    #[test]
    fn out_of_range_edits_are_rejected() {
        let mut buffer = EditBuffer::new("é");
        assert!(matches!(
            buffer.push(TextEdit::insert(1, "x")),
            Err(RewriteError::OutOfRange { start: 1, .. })
        ));
        assert!(buffer.push(TextEdit::insert(5, "x")).is_err());
        assert!(buffer.push(TextEdit::insert(2, "x")).is_ok());
    }
}
