//! # Toolsmith Internal Library
//!
//! Re-exports the toolsmith crates for convenience.

/// Front-end model: documents, syntax outline, types and type queries.
pub use toolsmith_syntax;

/// Tool analysis: validation, parameter schemas and agent declarations.
pub use toolsmith_tools;

/// Minimal-diff source rewriting.
pub use toolsmith_rewrite;

/// Plugin registration and the compilation pass.
pub use toolsmith_plugin;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use toolsmith_plugin::{
        CompilationPass, CompilerPlugin, PassOutput, PluginConfig, TaskRegistry, ToolsmithPlugin,
        TracingConfig, TracingFormat,
    };
    pub use toolsmith_rewrite::{RewrittenUnit, SourceRewriter};
    pub use toolsmith_syntax::{
        DocumentId, DocumentKind, Location, ModuleId, Package, PackageBuilder, SemanticModel,
        SourceUnit,
    };
    pub use toolsmith_tools::{
        ConfigStore, Diagnostic, DiagnosticCode, DiagnosticSink, ModuleInitTracking, Severity,
        SymbolNames, ToolConfig, ToolValidator, TypeSchemaGenerator,
    };
}
