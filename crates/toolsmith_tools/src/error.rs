//! Error types for parameter schema generation.

use thiserror::Error;

/// Errors that can occur while generating a parameter schema.
///
/// Any of these fails generation for the whole function; the validator
/// reports it as a diagnostic and substitutes `()`.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// The type has no JSON Schema representation.
    #[error("Unsupported type: {0}")]
    UnsupportedType(String),

    /// JSON serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SchemaError {
    /// Creates an [`UnsupportedType`](Self::UnsupportedType).
    pub fn unsupported_type(type_name: impl Into<String>) -> Self {
        Self::UnsupportedType(type_name.into())
    }
}
