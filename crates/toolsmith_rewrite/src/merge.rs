//! Merging computed tool configuration into annotation text.
//!
//! The merger only ever inserts text, never on a new line, so every line of
//! the document keeps its number.

use crate::edit::TextEdit;
use toolsmith_syntax::{Annotation, SourceUnit};
use toolsmith_tools::ToolConfig;
use toolsmith_tools::config::{DESCRIPTION_FIELD, NAME_FIELD, PARAMETERS_FIELD, TOOL_FIELDS};

/// Computes the edit that fills in a tool annotation.
#[derive(Debug, Clone, Copy, Default)]
pub struct AnnotationMerger;

impl AnnotationMerger {
    /// Returns the edit merging `config` into `annotation`, or `None` if the
    /// annotation already names every field.
    ///
    /// - Without a body, `{name:…,description:…,parameters:…}` is inserted
    ///   right after the annotation reference.
    /// - With a body, each missing field is inserted as `field:value` before
    ///   the closing brace, after a `,` unless the body is empty.
    #[must_use]
    pub fn merge(
        &self,
        unit: &SourceUnit,
        annotation: &Annotation,
        config: &ToolConfig,
    ) -> Option<TextEdit> {
        let Some(body) = &annotation.body else {
            let literal = format!(
                "{{{NAME_FIELD}:{},{DESCRIPTION_FIELD}:{},{PARAMETERS_FIELD}:{}}}",
                config.name,
                single_line(description(config)),
                config.parameter_schema,
            );
            // No line break after `}`: a line break would shift every later line.
            return Some(TextEdit::insert(annotation.reference.span.end, literal));
        };

        let missing: Vec<String> = TOOL_FIELDS
            .iter()
            .filter(|field| body.field(field).is_none())
            .map(|field| {
                let value = match *field {
                    DESCRIPTION_FIELD => description(config),
                    field => config.get(field).unwrap_or_default(),
                };
                format!("{field}:{value}")
            })
            .collect();
        if missing.is_empty() {
            return None;
        }

        let close = body.span.end.saturating_sub(1);
        let preceding = &unit.text[body.span.start..close];
        let separator = if preceding.trim_end().ends_with('{') {
            ""
        } else {
            ","
        };
        tracing::trace!(
            document = %unit.id,
            fields = missing.len(),
            "filling tool annotation fields"
        );
        Some(TextEdit::insert(close, format!("{separator}{}", missing.join(","))))
    }
}

fn description(config: &ToolConfig) -> &str {
    config.description.as_deref().unwrap_or(&config.name)
}

fn single_line(text: &str) -> String {
    text.replace("\r\n", " ").replace(['\n', '\r'], " ")
}
