//! Computed tool configuration and the names analysis looks for.

use serde::{Deserialize, Serialize};
use toolsmith_syntax::{Annotation, DocumentId, NodeId, SourceUnit};

/// Field of the tool annotation holding the tool name.
pub const NAME_FIELD: &str = "name";
/// Field of the tool annotation holding the tool description.
pub const DESCRIPTION_FIELD: &str = "description";
/// Field of the tool annotation holding the parameter schema.
pub const PARAMETERS_FIELD: &str = "parameters";

/// The annotation fields analysis fills in, in insertion order.
pub const TOOL_FIELDS: [&str; 3] = [NAME_FIELD, DESCRIPTION_FIELD, PARAMETERS_FIELD];

/// One specific annotation occurrence in one document.
///
/// Equality is by identity: two textually identical annotations are
/// different sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnnotationSite {
    /// Document containing the annotation.
    pub document: DocumentId,
    /// The annotation node.
    pub node: NodeId,
}

impl AnnotationSite {
    /// Identifies `annotation` within `unit`.
    #[must_use]
    pub fn of(unit: &SourceUnit, annotation: &Annotation) -> Self {
        Self {
            document: unit.id,
            node: annotation.id,
        }
    }
}

/// Values to merge into a tool annotation.
///
/// `name` and `description` are source literals, already quoted;
/// `parameter_schema` is raw JSON or `()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolConfig {
    /// Tool name literal.
    pub name: String,
    /// Tool description literal.
    pub description: Option<String>,
    /// Parameter schema expression.
    pub parameter_schema: String,
}

impl ToolConfig {
    /// Returns the value for an annotation field name.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        match field {
            NAME_FIELD => Some(&self.name),
            DESCRIPTION_FIELD => self.description.as_deref(),
            PARAMETERS_FIELD => Some(&self.parameter_schema),
            _ => None,
        }
    }
}

/// The fixed names analysis recognizes.
///
/// # Example
///
/// ```
/// use toolsmith_tools::SymbolNames;
///
/// let names = SymbolNames::default();
/// assert_eq!(names.agent_org, "ballerinax");
/// assert_eq!(names.agent_module, "ai.agent");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SymbolNames {
    /// Organization of the agent package.
    pub agent_org: String,
    /// Module name of the agent package.
    pub agent_module: String,
    /// Name of the tool annotation.
    pub tool_annotation: String,
    /// Name of the agent class.
    pub agent_class: String,
    /// Reserved name of a module initializer.
    pub init_function: String,
    /// Organization of the HTTP package.
    pub http_org: String,
    /// Module name of the HTTP package.
    pub http_module: String,
    /// HTTP response type a tool may return.
    pub http_response: String,
}

impl Default for SymbolNames {
    fn default() -> Self {
        Self {
            agent_org: "ballerinax".to_string(),
            agent_module: "ai.agent".to_string(),
            tool_annotation: "Tool".to_string(),
            agent_class: "Agent".to_string(),
            init_function: "init".to_string(),
            http_org: "ballerina".to_string(),
            http_module: "http".to_string(),
            http_response: "Response".to_string(),
        }
    }
}

impl SymbolNames {
    /// Returns the prefix `unit` refers to the agent package by, or `None`
    /// when `unit` does not import it.
    #[must_use]
    pub fn agent_prefix<'a>(&self, unit: &'a SourceUnit) -> Option<&'a str> {
        unit.prefix_for(&self.agent_org, &self.agent_module)
    }

    /// Returns true if `annotation` is the tool annotation of the agent
    /// package, as imported by `unit`.
    #[must_use]
    pub fn is_tool_annotation(&self, unit: &SourceUnit, annotation: &Annotation) -> bool {
        let reference = &annotation.reference;
        reference.identifier == self.tool_annotation
            && reference.prefix.is_some()
            && reference.prefix.as_deref() == self.agent_prefix(unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolsmith_syntax::Package;

    #[test]
    fn config_fields_by_name() {
        let config = ToolConfig {
            name: "\"greet\"".to_string(),
            description: None,
            parameter_schema: "()".to_string(),
        };
        assert_eq!(config.get(NAME_FIELD), Some("\"greet\""));
        assert_eq!(config.get(DESCRIPTION_FIELD), None);
        assert_eq!(config.get(PARAMETERS_FIELD), Some("()"));
        assert_eq!(config.get("other"), None);
    }

    #[test]
    fn names_deserialize_with_defaults() {
        let names: SymbolNames = serde_json::from_str(r#"{"tool_annotation": "Fn"}"#).unwrap();
        assert_eq!(names.tool_annotation, "Fn");
        assert_eq!(names.agent_class, "Agent");
    }

    #[test]
    fn tool_annotation_follows_import_alias() {
        let source = "import ballerinax/ai.agent as ai;\n\n@ai:Tool\nfunction a() {}\n\n@agent:Tool\nfunction b() {}\n";
        let package = Package::from_source("main.bal", source).unwrap();
        let unit = &package.units()[0];
        let names = SymbolNames::default();

        let recognized: Vec<_> = unit
            .functions()
            .map(|function| names.is_tool_annotation(unit, &function.annotations[0]))
            .collect();
        assert_eq!(recognized, vec![true, false]);
        assert_eq!(names.agent_prefix(unit), Some("ai"));
    }

    #[test]
    fn package_with_the_same_module_name_is_not_the_agent_package() {
        let package = Package::from_source(
            "main.bal",
            "import myorg/agent;\n\n@agent:Tool\nfunction a() {}\n",
        )
        .unwrap();
        let unit = &package.units()[0];
        let names = SymbolNames::default();

        assert_eq!(names.agent_prefix(unit), None);
        let function = unit.functions().next().unwrap();
        assert!(!names.is_tool_annotation(unit, &function.annotations[0]));
    }
}
