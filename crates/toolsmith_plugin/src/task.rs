//! The tasks a compilation pass runs.
//!
//! Analysis tasks look at one document at a time and record what they find in
//! the pass-wide stores of an [`AnalysisContext`]. Modifier tasks run after
//! every analysis task has finished and turn the recorded state into new
//! document text.

use toolsmith_rewrite::{RewriteError, RewrittenUnit, SourceRewriter};
use toolsmith_syntax::{SemanticModel, SourceUnit};
use toolsmith_tools::{
    AgentDeclarationScanner, ConfigStore, DiagnosticSink, InitFunctionScanner,
    ModuleInitTracking, SymbolNames, ToolValidator,
};

// ─────────────────────────────────────────────────────────────────────────────
// Contexts
// ─────────────────────────────────────────────────────────────────────────────

/// Pass-wide state handed to every analysis task.
#[derive(Clone, Copy)]
pub struct AnalysisContext<'a> {
    /// Type queries for the package.
    pub semantics: &'a dyn SemanticModel,
    /// Names the plugin looks for.
    pub names: &'a SymbolNames,
    /// Where diagnostics go.
    pub sink: &'a DiagnosticSink,
    /// Recorded tool configurations and agent declarations.
    pub store: &'a ConfigStore,
    /// Which modules define or receive an initializer.
    pub tracking: &'a ModuleInitTracking,
}

/// Pass-wide state handed to every modifier task.
#[derive(Debug, Clone, Copy)]
pub struct ModifyContext<'a> {
    /// Names the plugin looks for.
    pub names: &'a SymbolNames,
    /// State recorded during analysis.
    pub store: &'a ConfigStore,
    /// Which modules define or receive an initializer.
    pub tracking: &'a ModuleInitTracking,
}

// ─────────────────────────────────────────────────────────────────────────────
// Task traits
// ─────────────────────────────────────────────────────────────────────────────

/// A per-document analysis.
///
/// Invocations on different documents may run concurrently.
pub trait AnalysisTask: Send + Sync + 'static {
    /// Analyzes `unit`.
    fn analyze(&self, unit: &SourceUnit, ctx: &AnalysisContext<'_>);

    /// Returns the task's name for logs and errors.
    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

/// A per-document source modification.
///
/// Runs only after every analysis task of the pass has completed.
pub trait SourceModifierTask: Send + Sync + 'static {
    /// Returns the new text of `unit`, or `None` to leave it unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`RewriteError`] if the document cannot be rewritten.
    fn modify(
        &self,
        unit: &SourceUnit,
        ctx: &ModifyContext<'_>,
    ) -> Result<Option<RewrittenUnit>, RewriteError>;

    /// Returns the task's name for logs and errors.
    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tasks
// ─────────────────────────────────────────────────────────────────────────────

/// Validates tool functions and records their configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolAnnotationTask;

impl AnalysisTask for ToolAnnotationTask {
    fn analyze(&self, unit: &SourceUnit, ctx: &AnalysisContext<'_>) {
        ToolValidator::new(ctx.semantics, ctx.names).analyze_unit(unit, ctx.sink, ctx.store);
    }

    fn name(&self) -> &'static str {
        "tool-annotation"
    }
}

/// Marks modules that define their own initializer.
#[derive(Debug, Clone, Copy, Default)]
pub struct InitFunctionTask;

impl AnalysisTask for InitFunctionTask {
    fn analyze(&self, unit: &SourceUnit, ctx: &AnalysisContext<'_>) {
        InitFunctionScanner::new(ctx.names).scan(unit, ctx.tracking);
    }

    fn name(&self) -> &'static str {
        "init-function"
    }
}

/// Records module-level agent declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct AgentDeclarationTask;

impl AnalysisTask for AgentDeclarationTask {
    fn analyze(&self, unit: &SourceUnit, ctx: &AnalysisContext<'_>) {
        AgentDeclarationScanner::new(ctx.names).scan(unit, ctx.sink, ctx.store);
    }

    fn name(&self) -> &'static str {
        "agent-declaration"
    }
}

/// Merges tool configurations and desugars agent declarations.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolSourceModifier;

impl SourceModifierTask for ToolSourceModifier {
    fn modify(
        &self,
        unit: &SourceUnit,
        ctx: &ModifyContext<'_>,
    ) -> Result<Option<RewrittenUnit>, RewriteError> {
        SourceRewriter::new(ctx.store, ctx.tracking, ctx.names).rewrite(unit)
    }

    fn name(&self) -> &'static str {
        "tool-source-modifier"
    }
}
