//! Compiler plugin registration and the compilation pass driver.
//!
//! The host builds a [`TaskRegistry`] from one or more [`CompilerPlugin`]s,
//! then runs a [`CompilationPass`] per package: every analysis task over every
//! document, a barrier, then every source modifier. The pass returns the
//! collected diagnostics and the documents whose text changed.
//!
//! # Architecture
//!
//! - [`config`]: [`PluginConfig`] and [`TracingConfig`], deserializable with
//!   defaults
//! - [`telemetry`]: installs the `tracing` subscriber
//! - [`task`]: the analysis and modifier task traits and their
//!   implementations
//! - [`pass`]: the two-phase pass over scoped worker threads
//! - [`plugin`]: [`CompilerPlugin`], [`TaskRegistry`] and [`ToolsmithPlugin`]

pub mod config;
pub mod error;
pub mod pass;
pub mod plugin;
pub mod task;
pub mod telemetry;

pub use config::{PluginConfig, TracingConfig, TracingFormat};
pub use error::PluginError;
pub use pass::{AnalyzedPass, CompilationPass, PassOutput};
pub use plugin::{CompilerPlugin, TaskRegistry, ToolsmithPlugin};
pub use task::{
    AgentDeclarationTask, AnalysisContext, AnalysisTask, InitFunctionTask, ModifyContext,
    SourceModifierTask, ToolAnnotationTask, ToolSourceModifier,
};
