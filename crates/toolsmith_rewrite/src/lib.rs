//! Minimal-diff source rewriting for toolsmith.
//!
//! Turns what analysis recorded into new document text. Text outside the
//! edited regions stays byte-identical, and no edit adds or removes a line
//! before the end of the document, so diagnostics already reported keep their
//! positions.
//!
//! # Architecture
//!
//! - [`EditBuffer`] / [`TextEdit`]: an immutable text plus sorted edits,
//!   applied in one pass
//! - [`AnnotationMerger`]: fills the missing `name`, `description` and
//!   `parameters` fields of a tool annotation
//! - [`ModuleInitSynthesizer`]: strips agent initializers and builds the
//!   module initializer receiving them
//! - [`SourceRewriter`]: walks a document's members once and emits a
//!   [`RewrittenUnit`]

pub mod edit;
pub mod error;
pub mod init;
pub mod merge;
pub mod rewriter;

pub use edit::{EditBuffer, TextEdit};
pub use error::RewriteError;
pub use init::ModuleInitSynthesizer;
pub use merge::AnnotationMerger;
pub use rewriter::{RewrittenUnit, SourceRewriter};
