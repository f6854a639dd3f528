//! Error types for the outline front end.

use crate::id::{DocumentId, ModuleId};
use crate::span::Location;
use thiserror::Error;

/// Errors raised while building a [`Package`](crate::Package) from source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A string, template or block was opened and never closed.
    #[error("{location}: unterminated {what}")]
    Unterminated {
        /// Where the construct starts.
        location: Location,
        /// What was left open.
        what: &'static str,
    },

    /// A token did not fit the grammar.
    #[error("{location}: expected {expected}, found `{found}`")]
    Unexpected {
        /// Location of the offending token.
        location: Location,
        /// What the parser was looking for.
        expected: String,
        /// Text of the offending token.
        found: String,
    },

    /// The document ended in the middle of a construct.
    #[error("{document}: unexpected end of input, expected {expected}")]
    UnexpectedEof {
        /// The truncated document.
        document: DocumentId,
        /// What the parser was looking for.
        expected: String,
    },

    /// A document was added to a module the builder does not know.
    #[error("unknown module: {0}")]
    UnknownModule(ModuleId),
}

impl ParseError {
    /// Creates an [`Unexpected`](Self::Unexpected) error.
    pub fn unexpected(
        location: Location,
        expected: impl Into<String>,
        found: impl Into<String>,
    ) -> Self {
        Self::Unexpected {
            location,
            expected: expected.into(),
            found: found.into(),
        }
    }
}
