//! Plugin registration.
//!
//! A [`CompilerPlugin`] contributes tasks to a [`TaskRegistry`] in
//! [`build`](CompilerPlugin::build); the host then runs them through a
//! [`CompilationPass`]. [`ToolsmithPlugin`] registers the three analysis tasks
//! and the source modifier.
//!
//! # Example
//!
//! ```
//! use toolsmith_plugin::{PluginConfig, ToolsmithPlugin};
//! use toolsmith_syntax::Package;
//!
//! let source = "import ballerinax/ai.agent;\n\n@agent:Tool\nfunction ping() {}\n";
//! let package = Package::from_source("main.bal", source).unwrap();
//!
//! let output = ToolsmithPlugin::new(PluginConfig::default()).run(&package).unwrap();
//! assert!(output.diagnostics.is_empty());
//! assert!(output.documents[0].text.contains("@agent:Tool{name:\"ping\",description:\"ping\",parameters:()}"));
//! ```

use crate::config::PluginConfig;
use crate::error::PluginError;
use crate::pass::{CompilationPass, PassOutput};
use crate::task::{
    AgentDeclarationTask, AnalysisTask, InitFunctionTask, SourceModifierTask, ToolAnnotationTask,
    ToolSourceModifier,
};
use crate::telemetry;
use toolsmith_syntax::Package;

// ─────────────────────────────────────────────────────────────────────────────
// TaskRegistry
// ─────────────────────────────────────────────────────────────────────────────

/// The tasks contributed by plugins, in registration order.
#[derive(Default)]
pub struct TaskRegistry {
    analysis: Vec<Box<dyn AnalysisTask>>,
    modifiers: Vec<Box<dyn SourceModifierTask>>,
}

impl TaskRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a plugin's tasks and returns the registry.
    pub fn add_plugin(&mut self, plugin: &impl CompilerPlugin) -> &mut Self {
        plugin.build(self);
        tracing::debug!(
            plugin = plugin.name(),
            analysis = self.analysis.len(),
            modifiers = self.modifiers.len(),
            "registered plugin tasks"
        );
        self
    }

    /// Adds an analysis task.
    pub fn add_analysis_task(&mut self, task: impl AnalysisTask) -> &mut Self {
        self.analysis.push(Box::new(task));
        self
    }

    /// Adds a source modifier task.
    pub fn add_modifier_task(&mut self, task: impl SourceModifierTask) -> &mut Self {
        self.modifiers.push(Box::new(task));
        self
    }

    /// Returns the analysis tasks.
    pub fn analysis_tasks(&self) -> impl Iterator<Item = &dyn AnalysisTask> {
        self.analysis.iter().map(|task| &**task)
    }

    /// Returns the source modifier tasks.
    pub fn modifier_tasks(&self) -> impl Iterator<Item = &dyn SourceModifierTask> {
        self.modifiers.iter().map(|task| &**task)
    }

    /// Returns the names of every registered task, analysis tasks first.
    #[must_use]
    pub fn task_names(&self) -> Vec<&'static str> {
        self.analysis_tasks()
            .map(AnalysisTask::name)
            .chain(self.modifier_tasks().map(SourceModifierTask::name))
            .collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// CompilerPlugin
// ─────────────────────────────────────────────────────────────────────────────

/// A unit of compiler functionality.
///
/// Plugins follow a short lifecycle:
///
/// 1. **Build Phase** - `build()` registers the plugin's tasks
/// 2. **Ready Phase** - `ready()` performs one-time process setup
pub trait CompilerPlugin: Send + Sync + 'static {
    /// Registers the plugin's tasks.
    fn build(&self, registry: &mut TaskRegistry);

    /// Called once before the first pass runs.
    fn ready(&self) {}

    /// Returns the plugin's name for debugging and error messages.
    ///
    /// Default implementation returns the type name.
    fn name(&self) -> &str {
        core::any::type_name::<Self>()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// ToolsmithPlugin
// ─────────────────────────────────────────────────────────────────────────────

/// Generates tool configuration and desugars agent declarations.
///
/// # Tasks Registered
///
/// | Task | Kind |
/// |------|------|
/// | [`ToolAnnotationTask`] | analysis |
/// | [`InitFunctionTask`] | analysis |
/// | [`AgentDeclarationTask`] | analysis |
/// | [`ToolSourceModifier`] | source modifier |
#[derive(Debug, Clone, Default)]
pub struct ToolsmithPlugin {
    config: PluginConfig,
}

impl ToolsmithPlugin {
    /// Creates the plugin.
    #[must_use]
    pub fn new(config: PluginConfig) -> Self {
        Self { config }
    }

    /// Returns the plugin configuration.
    #[must_use]
    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Runs one compilation pass of this plugin alone over `package`.
    ///
    /// # Errors
    ///
    /// Returns a [`PluginError`] if a task panics or a document cannot be
    /// rewritten.
    pub fn run(&self, package: &Package) -> Result<PassOutput, PluginError> {
        let mut registry = TaskRegistry::new();
        registry.add_plugin(self);
        CompilationPass::new(package, &self.config.names, &registry).run()
    }
}

impl CompilerPlugin for ToolsmithPlugin {
    fn build(&self, registry: &mut TaskRegistry) {
        registry
            .add_analysis_task(ToolAnnotationTask)
            .add_analysis_task(InitFunctionTask)
            .add_analysis_task(AgentDeclarationTask)
            .add_modifier_task(ToolSourceModifier);
    }

    fn ready(&self) {
        telemetry::init(&self.config.tracing);
    }

    fn name(&self) -> &str {
        "toolsmith"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toolsmith_plugin_registers_four_tasks() {
        let mut registry = TaskRegistry::new();
        registry.add_plugin(&ToolsmithPlugin::default());
        assert_eq!(
            registry.task_names(),
            [
                "tool-annotation",
                "init-function",
                "agent-declaration",
                "tool-source-modifier"
            ]
        );
    }

    #[test]
    fn empty_registry_has_no_tasks() {
        assert!(TaskRegistry::new().task_names().is_empty());
    }
}
