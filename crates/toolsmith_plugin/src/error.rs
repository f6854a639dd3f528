//! Error types for the toolsmith plugin.

use thiserror::Error;
use toolsmith_rewrite::RewriteError;

/// Errors that stop a compilation pass or plugin setup.
///
/// Problems in the analyzed source are never errors; they are reported as
/// diagnostics.
#[derive(Debug, Error)]
pub enum PluginError {
    /// The plugin configuration could not be parsed.
    #[error("invalid plugin configuration: {0}")]
    Config(#[from] serde_json::Error),

    /// A document could not be rewritten.
    #[error("rewrite failed: {0}")]
    Rewrite(#[from] RewriteError),

    /// A worker thread panicked while running a task.
    #[error("a task panicked during {phase}")]
    TaskPanicked {
        /// The pass phase that was running.
        phase: &'static str,
    },
}
