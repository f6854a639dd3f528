//! Plugin configuration.
//!
//! Everything has a default matching the published agent package, so an empty
//! configuration document is valid:
//!
//! ```
//! use toolsmith_plugin::PluginConfig;
//!
//! let config = PluginConfig::from_json("{}").unwrap();
//! assert_eq!(config, PluginConfig::default());
//!
//! let config = PluginConfig::from_json(r#"{"names": {"agent_org": "acme"}, "tracing": {"format": "json"}}"#).unwrap();
//! assert_eq!(config.names.agent_org, "acme");
//! assert_eq!(config.names.agent_module, "ai.agent");
//! ```

use crate::error::PluginError;
use serde::{Deserialize, Serialize};
use toolsmith_tools::SymbolNames;
use tracing::Level;

// ─────────────────────────────────────────────────────────────────────────────
// TracingFormat
// ─────────────────────────────────────────────────────────────────────────────

/// Tracing output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TracingFormat {
    /// Human-readable colored output (default).
    #[default]
    Pretty,
    /// Compact single-line output.
    Compact,
    /// JSON structured output for log aggregation.
    Json,
}

// ─────────────────────────────────────────────────────────────────────────────
// TracingConfig
// ─────────────────────────────────────────────────────────────────────────────

/// How the plugin sets up `tracing` output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracingConfig {
    /// Maximum log level, as accepted by [`Level`]'s `FromStr`.
    pub level: String,
    /// Output format.
    pub format: TracingFormat,
    /// Environment filter (e.g., `"toolsmith_tools=trace,toolsmith_rewrite=debug"`).
    /// Takes precedence over `level` when it parses.
    pub env_filter: Option<String>,
    /// Whether to include span enter/exit events.
    pub span_events: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO.to_string(),
            format: TracingFormat::Pretty,
            env_filter: None,
            span_events: false,
        }
    }
}

impl TracingConfig {
    /// Sets the maximum log level.
    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level.to_string();
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn with_format(mut self, format: TracingFormat) -> Self {
        self.format = format;
        self
    }

    /// Sets a custom environment filter string.
    ///
    /// Format: `target=level,target=level,...`
    #[must_use]
    pub fn with_env_filter(mut self, filter: impl Into<String>) -> Self {
        self.env_filter = Some(filter.into());
        self
    }

    /// Enables span enter/exit events in output.
    #[must_use]
    pub fn with_span_events(mut self, enabled: bool) -> Self {
        self.span_events = enabled;
        self
    }

    /// Returns the configured level, or `INFO` if it does not parse.
    #[must_use]
    pub fn max_level(&self) -> Level {
        self.level.parse().unwrap_or(Level::INFO)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PluginConfig
// ─────────────────────────────────────────────────────────────────────────────

/// Configuration of the toolsmith plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginConfig {
    /// Names of the annotation, classes and modules the plugin looks for.
    pub names: SymbolNames,
    /// Logging setup.
    pub tracing: TracingConfig,
}

impl PluginConfig {
    /// Creates the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a configuration from JSON, filling absent fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::Config`] if `json` is not a valid configuration.
    pub fn from_json(json: &str) -> Result<Self, PluginError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Replaces the symbol names.
    #[must_use]
    pub fn with_names(mut self, names: SymbolNames) -> Self {
        self.names = names;
        self
    }

    /// Sets the organization and module of the agent package.
    #[must_use]
    pub fn with_agent_package(mut self, org: impl Into<String>, module: impl Into<String>) -> Self {
        self.names.agent_org = org.into();
        self.names.agent_module = module.into();
        self
    }

    /// Replaces the tracing setup.
    #[must_use]
    pub fn with_tracing(mut self, tracing: TracingConfig) -> Self {
        self.tracing = tracing;
        self
    }
}
