//! Tool function analysis for toolsmith.
//!
//! This crate decides whether annotated functions can be exposed to an agent
//! as tools, computes the configuration to merge into their annotations, and
//! collects module-level agent declarations. Nothing here touches source
//! text; results are recorded in a [`ConfigStore`] for the rewriter.
//!
//! # Example
//!
//! ```
//! use toolsmith_syntax::Package;
//! use toolsmith_tools::{ConfigStore, DiagnosticSink, SymbolNames, ToolValidator};
//!
//! let source = "import ballerinax/ai.agent;\n\n@agent:Tool\nfunction greet(string name) returns string => name;\n";
//! let package = Package::from_source("main.bal", source).unwrap();
//! let semantics = package.semantics();
//! let names = SymbolNames::default();
//! let (sink, store) = (DiagnosticSink::new(), ConfigStore::new());
//!
//! let recorded = ToolValidator::new(&semantics, &names).analyze_unit(&package.units()[0], &sink, &store);
//! assert_eq!(recorded, 1);
//! assert!(sink.is_empty());
//! ```
//!
//! # Architecture
//!
//! - [`ToolValidator`]: parameter, XML and return-type checks, then defaults
//!   for missing annotation fields
//! - [`TypeSchemaGenerator`]: parameter list to JSON Schema, through
//!   [`TypeMapper`] and [`normalize_tool_schema`]
//! - [`XmlReachabilityChecker`]: cycle-safe search for `xml` inside a type
//! - [`InitFunctionScanner`] / [`AgentDeclarationScanner`]: module-level
//!   scans feeding the initializer synthesis
//! - [`ConfigStore`] / [`ModuleInitTracking`]: concurrent pass-wide state
//! - [`Diagnostic`] / [`DiagnosticSink`]: everything reported to the user

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod scan;
pub mod schema;
pub mod store;
pub mod validate;
pub mod xml;

pub use config::{AnnotationSite, SymbolNames, ToolConfig};
pub use diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, Severity};
pub use error::SchemaError;
pub use scan::{AgentDeclaration, AgentDeclarationScanner, InitFunctionScanner};
pub use schema::{
    NIL_EXPRESSION, ParameterInfo, ParameterSchema, TypeMapper, TypeSchemaGenerator,
    normalize_tool_schema,
};
pub use store::{ConfigStore, ModuleInitTracking, SourceUnitState};
pub use validate::{ToolAnalysis, ToolValidator};
pub use xml::{XmlReachabilityChecker, includes_xml};
