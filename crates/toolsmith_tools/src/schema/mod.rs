//! Parameter schemas for tool functions.
//!
//! Provides [`ParameterInfo`] for individual parameter schemas,
//! [`ParameterSchema`] for assembling the object schema of a whole parameter
//! list, and [`TypeSchemaGenerator`] which builds one from a function
//! signature.
//!
//! Generation runs in two steps: [`TypeMapper`] produces a baseline schema for
//! each parameter type, and [`normalize_tool_schema`] narrows it to the keys
//! tool arguments are validated against.

mod mapper;
mod normalize;

pub use mapper::TypeMapper;
pub use normalize::normalize_tool_schema;

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use toolsmith_syntax::{FunctionDef, TypeArena};

/// The source literal standing in for "no parameter schema".
pub const NIL_EXPRESSION: &str = "()";

/// Schema information for a single tool parameter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterInfo {
    /// Parameter name.
    pub name: String,
    /// Parameter description (from the function's documentation).
    pub description: Option<String>,
    /// JSON Schema for this parameter's type.
    pub schema: serde_json::Value,
    /// Whether this parameter is required.
    pub required: bool,
}

impl ParameterInfo {
    /// Creates a new required parameter with the given name and schema.
    pub fn new(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            description: None,
            schema,
            required: true,
        }
    }

    /// Sets the parameter description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Sets whether the parameter is required.
    #[must_use]
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }
}

/// The object schema of a parameter list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParameterSchema {
    /// Parameters in declaration order.
    pub parameters: Vec<ParameterInfo>,
}

impl ParameterSchema {
    /// Creates an empty parameter list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a parameter.
    #[must_use]
    pub fn add_parameter(mut self, param: ParameterInfo) -> Self {
        self.parameters.push(param);
        self
    }

    /// Returns true if there are no parameters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// Builds `{"type": "object", "required": [...], "properties": {...}}`.
    ///
    /// `required` lists required parameters in declaration order; `properties`
    /// holds every parameter, with its description attached.
    #[must_use]
    pub fn to_value(&self) -> serde_json::Value {
        let mut properties = serde_json::Map::new();
        let mut required = Vec::new();

        for param in &self.parameters {
            let mut param_schema = param.schema.clone();
            if let Some(desc) = &param.description
                && let Some(obj) = param_schema.as_object_mut()
            {
                obj.insert(
                    "description".to_string(),
                    serde_json::Value::String(desc.clone()),
                );
            }
            properties.insert(param.name.clone(), param_schema);

            if param.required {
                required.push(param.name.clone());
            }
        }

        serde_json::json!({
            "type": "object",
            "required": required,
            "properties": properties
        })
    }

    /// Serializes the schema as compact, single-line JSON, or
    /// [`NIL_EXPRESSION`] when there are no parameters.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Serialization`] if serialization fails.
    pub fn to_json(&self) -> Result<String, SchemaError> {
        if self.is_empty() {
            return Ok(NIL_EXPRESSION.to_string());
        }
        Ok(serde_json::to_string(&self.to_value())?)
    }
}

/// Builds parameter schemas for function signatures.
#[derive(Debug, Clone, Copy)]
pub struct TypeSchemaGenerator<'a> {
    types: &'a TypeArena,
}

impl<'a> TypeSchemaGenerator<'a> {
    /// Creates a generator over `types`.
    #[must_use]
    pub fn new(types: &'a TypeArena) -> Self {
        Self { types }
    }

    /// Collects the normalized schema of every parameter of `function`.
    ///
    /// Parameters with a default value are optional. Descriptions come from
    /// the function's `+ name - text` documentation lines, and only when the
    /// documentation has a description of its own.
    ///
    /// # Errors
    ///
    /// Returns the first [`SchemaError`] of any parameter type.
    pub fn parameters(&self, function: &FunctionDef) -> Result<ParameterSchema, SchemaError> {
        let documented = function
            .documentation
            .as_ref()
            .filter(|doc| !doc.description.is_empty());

        let mut schema = ParameterSchema::new();
        for param in &function.params {
            let baseline = TypeMapper::new(self.types).map(param.ty)?;
            let mut info = ParameterInfo::new(&param.name, normalize_tool_schema(baseline.into()))
                .with_required(!param.has_default);
            if let Some(description) = documented.and_then(|doc| doc.params.get(&param.name)) {
                info = info.with_description(description);
            }
            schema = schema.add_parameter(info);
        }
        Ok(schema)
    }

    /// Generates the parameter schema text of `function`.
    ///
    /// # Errors
    ///
    /// Returns a [`SchemaError`] if any parameter type cannot be mapped.
    pub fn generate(&self, function: &FunctionDef) -> Result<String, SchemaError> {
        let schema = self.parameters(function)?.to_json()?;
        tracing::trace!(function = %function.name, %schema, "generated parameter schema");
        Ok(schema)
    }
}
