//! Turns annotated functions into AI agent tools.
//!

pub use toolsmith_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use toolsmith_internal::prelude::*;
}
