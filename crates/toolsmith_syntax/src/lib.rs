//! Host front-end model for toolsmith.
//!
//! Analysis and rewriting never parse text themselves; they consume the model
//! defined here.
//!
//! # Architecture
//!
//! - [`id`]: module, document and node identities
//! - [`span`]: byte spans, line/column positions and locations
//! - [`types`]: the closed type model, stored in a [`TypeArena`]
//! - [`semantic`]: the [`SemanticModel`] trait with subtype queries
//! - [`syntax`]: the outline of a source unit: imports, functions,
//!   annotations, module-level variables
//! - [`outline`]: a lightweight front end building a [`Package`] from text

pub mod error;
pub mod id;
pub mod outline;
pub mod package;
pub mod semantic;
pub mod span;
pub mod syntax;
pub mod types;

pub use error::ParseError;
pub use id::{DocumentId, ModuleId, NodeId};
pub use outline::PackageBuilder;
pub use package::{ModuleInfo, Package};
pub use semantic::{SemanticModel, StructuralSemantics, Universe};
pub use span::{LineCol, LineIndex, Location, Span};
pub use syntax::{
    Annotation, ClassDef, Documentation, DocumentKind, FunctionDef, ImportDecl,
    MappingConstructor, MappingField, Member, ModuleVarDecl, Param, QualifiedName, SourceUnit,
    TypeDef,
};
pub use types::{ModuleRef, RecordField, TypeArena, TypeId, TypeKind, TypeReference};
