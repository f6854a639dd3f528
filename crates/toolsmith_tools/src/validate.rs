//! Validation of tool functions.
//!
//! [`ToolValidator`] checks every function carrying the tool annotation and,
//! when the function is usable as a tool, computes the [`ToolConfig`] to merge
//! into the annotation.
//!
//! Checks, in order:
//!
//! 1. An annotation body made of a single spread field is skipped entirely.
//! 2. Every parameter must be `anydata` (`AI_102`) and must not reach `xml`
//!    (`AI_103`). All parameters are checked.
//! 3. When all parameters are `anydata`, a declared return type must be
//!    `anydata`, `error`, an HTTP response or a union of those (`AI_104`).
//!
//! `AI_102` and `AI_104` leave the annotation untouched. `AI_103` alone does
//! not.

use crate::config::{
    AnnotationSite, DESCRIPTION_FIELD, NAME_FIELD, PARAMETERS_FIELD, SymbolNames, ToolConfig,
};
use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::schema::{NIL_EXPRESSION, TypeSchemaGenerator};
use crate::store::ConfigStore;
use crate::xml::includes_xml;
use toolsmith_syntax::{
    Annotation, FunctionDef, MappingField, SemanticModel, SourceUnit, TypeId, TypeKind,
    TypeReference, Universe,
};

/// What analyzing one tool annotation produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolAnalysis {
    /// Problems found, in the order they were found.
    pub diagnostics: Vec<Diagnostic>,
    /// Configuration to merge, when the function is a valid tool.
    pub config: Option<ToolConfig>,
}

/// Validates tool functions and computes their configuration.
#[derive(Clone, Copy)]
pub struct ToolValidator<'a> {
    semantics: &'a dyn SemanticModel,
    names: &'a SymbolNames,
}

impl<'a> ToolValidator<'a> {
    /// Creates a validator answering type queries with `semantics`.
    #[must_use]
    pub fn new(semantics: &'a dyn SemanticModel, names: &'a SymbolNames) -> Self {
        Self { semantics, names }
    }

    /// Analyzes every tool annotation of `unit`, on functions and on class
    /// methods.
    ///
    /// Diagnostics go to `sink`. Configurations of module-level functions are
    /// recorded in `store`; returns how many were recorded.
    pub fn analyze_unit(
        &self,
        unit: &SourceUnit,
        sink: &DiagnosticSink,
        store: &ConfigStore,
    ) -> usize {
        let mut recorded = 0;
        for function in unit.functions() {
            for annotation in &function.annotations {
                if !self.names.is_tool_annotation(unit, annotation) {
                    continue;
                }
                let analysis = self.analyze(unit, function, annotation);
                for diagnostic in analysis.diagnostics {
                    sink.report(diagnostic);
                }
                if let Some(config) = analysis.config {
                    tracing::debug!(
                        document = %unit.id,
                        function = %function.name,
                        "recorded tool configuration"
                    );
                    store.add_tool(AnnotationSite::of(unit, annotation), config);
                    recorded += 1;
                }
            }
        }

        // Method tools are checked but their annotations are never rewritten.
        for method in unit.methods() {
            for annotation in &method.annotations {
                if !self.names.is_tool_annotation(unit, annotation) {
                    continue;
                }
                let analysis = self.analyze(unit, method, annotation);
                for diagnostic in analysis.diagnostics {
                    sink.report(diagnostic);
                }
            }
        }
        recorded
    }

    /// Analyzes one tool annotation on `function`.
    #[must_use]
    pub fn analyze(
        &self,
        unit: &SourceUnit,
        function: &FunctionDef,
        annotation: &Annotation,
    ) -> ToolAnalysis {
        let mut analysis = ToolAnalysis::default();
        if annotation
            .body
            .as_ref()
            .is_some_and(|body| body.is_spread_only())
        {
            tracing::trace!(function = %function.name, "skipped spread-only tool annotation");
            return analysis;
        }

        let function_location = unit.location(function.name_span);
        let mut params_are_anydata = true;
        for param in &function.params {
            let location = unit.location(param.name_span);
            if !self.semantics.is_subtype(param.ty, Universe::Anydata) {
                params_are_anydata = false;
                analysis.diagnostics.push(Diagnostic::new(
                    DiagnosticCode::ParameterIsNotASubtypeOfAnydata,
                    location,
                    &[&function.name, &param.name],
                ));
            }
            if includes_xml(self.semantics, param.ty) {
                analysis.diagnostics.push(Diagnostic::new(
                    DiagnosticCode::XmlParameterNotSupportedByTool,
                    location,
                    &[&function.name, &param.name],
                ));
            }
        }
        if !params_are_anydata {
            return analysis;
        }

        if let Some(return_type) = function.return_type
            && !self.is_allowed_return_type(return_type)
        {
            analysis.diagnostics.push(Diagnostic::new(
                DiagnosticCode::InvalidReturnTypeInTool,
                function_location,
                &[&function.name],
            ));
            return analysis;
        }

        let existing = |field: &str| {
            annotation
                .body
                .as_ref()
                .and_then(|body| body.field(field))
                .and_then(|field| match field {
                    MappingField::Specific {
                        value: Some(value), ..
                    } => Some(unit.slice(*value).trim().to_string()),
                    _ => None,
                })
        };

        let name = existing(NAME_FIELD).unwrap_or_else(|| quote(&function.name));
        let description = existing(DESCRIPTION_FIELD).unwrap_or_else(|| {
            let summary = function
                .documentation
                .as_ref()
                .map(|doc| doc.description.as_str())
                .filter(|description| !description.is_empty())
                .unwrap_or(&function.name);
            quote(summary)
        });
        let parameter_schema = existing(PARAMETERS_FIELD).unwrap_or_else(|| {
            match TypeSchemaGenerator::new(self.semantics.types()).generate(function) {
                Ok(schema) => schema,
                Err(err) => {
                    tracing::warn!(
                        function = %function.name,
                        error = %err,
                        "failed to generate parameter schema"
                    );
                    analysis.diagnostics.push(Diagnostic::new(
                        DiagnosticCode::UnableToGenerateSchemaForFunction,
                        function_location,
                        &[&function.name],
                    ));
                    NIL_EXPRESSION.to_string()
                }
            }
        });

        analysis.config = Some(ToolConfig {
            name,
            description: Some(description),
            parameter_schema,
        });
        analysis
    }

    /// Returns true if a tool may return `ty`.
    #[must_use]
    pub fn is_allowed_return_type(&self, ty: TypeId) -> bool {
        match self.semantics.types().get(ty) {
            TypeKind::Reference(reference) if self.is_http_response(reference) => true,
            TypeKind::Union(members) => members
                .iter()
                .all(|member| self.is_allowed_return_type(*member)),
            _ => {
                self.semantics.is_subtype(ty, Universe::Anydata)
                    || self.semantics.is_subtype(ty, Universe::Error)
            }
        }
    }

    fn is_http_response(&self, reference: &TypeReference) -> bool {
        reference.name == self.names.http_response
            && reference.module.as_ref().is_some_and(|module| {
                module.org == self.names.http_org && module.name == self.names.http_module
            })
    }
}

/// Renders `text` as a single-line string literal.
fn quote(text: &str) -> String {
    let mut literal = String::with_capacity(text.len() + 2);
    literal.push('"');
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' => literal.push_str("\\\""),
            '\\' => literal.push_str("\\\\"),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                literal.push(' ');
            }
            '\n' | '\u{000B}' | '\u{000C}' | '\u{0085}' | '\u{2028}' | '\u{2029}' => {
                literal.push(' ');
            }
            c => literal.push(c),
        }
    }
    literal.push('"');
    literal
}
