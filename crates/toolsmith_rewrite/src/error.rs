//! Error types for source rewriting.

use thiserror::Error;
use toolsmith_syntax::{DocumentId, Span};

/// Errors that can occur while applying edits to a document.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// An edit does not fall on character boundaries inside the document.
    #[error("Edit {start}..{end} is out of range for a document of {len} bytes")]
    OutOfRange {
        /// Start offset of the edit.
        start: usize,
        /// End offset of the edit.
        end: usize,
        /// Length of the document.
        len: usize,
    },

    /// Two edits replace overlapping text.
    #[error("Overlapping edits at {first:?} and {second:?}")]
    Overlap {
        /// The earlier edit.
        first: Span,
        /// The edit overlapping it.
        second: Span,
    },

    /// No document with this ID exists.
    #[error("Unknown document: {0}")]
    UnknownDocument(DocumentId),
}
