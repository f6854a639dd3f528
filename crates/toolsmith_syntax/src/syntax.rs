//! Syntax outline of a source unit.
//!
//! The outline keeps only what analysis and rewriting need: imports, the
//! ordered module members, class method signatures, and for each member the
//! spans that edits target. Everything else is an opaque [`Member::Other`]
//! span.

use crate::id::{DocumentId, NodeId};
use crate::span::{LineIndex, Location, Span};
use crate::types::TypeId;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Whether a document is part of the module sources or its tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DocumentKind {
    /// A regular source document.
    #[default]
    Source,
    /// A test document.
    Test,
}

/// One parsed document.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Document identity.
    pub id: DocumentId,
    /// File name, e.g. `main.bal`.
    pub name: String,
    /// Source or test document.
    pub kind: DocumentKind,
    /// The unmodified document text.
    pub text: String,
    /// Line table for `text`.
    pub line_index: LineIndex,
    /// Import declarations in source order.
    pub imports: Vec<ImportDecl>,
    /// Module-level members in source order.
    pub members: Vec<Member>,
}

impl SourceUnit {
    /// Returns the location of `span` in this document.
    #[must_use]
    pub fn location(&self, span: Span) -> Location {
        self.line_index.location(self.id, &self.text, span)
    }

    /// Returns the text covered by `span`.
    #[must_use]
    pub fn slice(&self, span: Span) -> &str {
        span.slice(&self.text)
    }

    /// Returns the prefix this document uses for the module `org/module`.
    #[must_use]
    pub fn prefix_for(&self, org: &str, module: &str) -> Option<&str> {
        self.imports
            .iter()
            .find(|import| import.org.as_deref() == Some(org) && import.module_path() == module)
            .map(ImportDecl::effective_prefix)
    }

    /// Iterates over the module-level function definitions.
    pub fn functions(&self) -> impl Iterator<Item = &FunctionDef> {
        self.members.iter().filter_map(|member| match member {
            Member::Function(function) => Some(function),
            _ => None,
        })
    }

    /// Iterates over the methods of every class, class by class.
    pub fn methods(&self) -> impl Iterator<Item = &FunctionDef> {
        self.members
            .iter()
            .filter_map(|member| match member {
                Member::Class(class) => Some(class.methods.iter()),
                _ => None,
            })
            .flatten()
    }

    /// Iterates over the module-level variable declarations.
    pub fn module_vars(&self) -> impl Iterator<Item = &ModuleVarDecl> {
        self.members.iter().filter_map(|member| match member {
            Member::ModuleVar(decl) => Some(decl),
            _ => None,
        })
    }
}

/// `import org/a.b as p;`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportDecl {
    /// Organization, when given.
    pub org: Option<String>,
    /// Module name segments, e.g. `["ai", "agent"]`.
    pub module_name: Vec<String>,
    /// Explicit `as` prefix.
    pub prefix: Option<String>,
    /// The whole declaration.
    pub span: Span,
}

impl ImportDecl {
    /// Returns the prefix the module is referred to by: the alias, else the
    /// last module name segment.
    #[must_use]
    pub fn effective_prefix(&self) -> &str {
        self.prefix
            .as_deref()
            .or_else(|| self.module_name.last().map(String::as_str))
            .unwrap_or_default()
    }

    /// Returns the dotted module name, e.g. `ai.agent`.
    #[must_use]
    pub fn module_path(&self) -> String {
        self.module_name.join(".")
    }
}

/// A module-level member.
#[derive(Debug, Clone)]
pub enum Member {
    /// A function definition.
    Function(FunctionDef),
    /// A module-level variable declaration.
    ModuleVar(ModuleVarDecl),
    /// A type or enum definition.
    TypeDef(TypeDef),
    /// A class definition.
    Class(ClassDef),
    /// Any other member, kept as its span.
    Other(Span),
}

impl Member {
    /// Returns the span of the member.
    #[must_use]
    pub fn span(&self) -> Span {
        match self {
            Member::Function(function) => function.span,
            Member::ModuleVar(decl) => decl.span,
            Member::TypeDef(def) => def.span,
            Member::Class(class) => class.span,
            Member::Other(span) => *span,
        }
    }
}

/// `function name(params) returns T { ... }`
#[derive(Debug, Clone)]
pub struct FunctionDef {
    /// Node identity.
    pub id: NodeId,
    /// From the first annotation to the end of the body.
    pub span: Span,
    /// Function name.
    pub name: String,
    /// Span of the name token.
    pub name_span: Span,
    /// Annotations attached to the function.
    pub annotations: Vec<Annotation>,
    /// Parameters in declaration order.
    pub params: Vec<Param>,
    /// Declared return type.
    pub return_type: Option<TypeId>,
    /// Documentation comment.
    pub documentation: Option<Documentation>,
}

/// A function parameter.
#[derive(Debug, Clone)]
pub struct Param {
    /// Parameter name.
    pub name: String,
    /// Span of the name token.
    pub name_span: Span,
    /// Parameter type.
    pub ty: TypeId,
    /// Declared with a default value.
    pub has_default: bool,
}

/// A parsed documentation comment.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Documentation {
    /// Text before the first `+` line.
    pub description: String,
    /// `+ name - text` lines.
    pub params: IndexMap<String, String>,
    /// `+ return - text` line.
    pub returns: Option<String>,
}

impl Documentation {
    /// Parses documentation lines with their leading `#` already removed.
    pub fn from_lines<'a>(lines: impl IntoIterator<Item = &'a str>) -> Self {
        let mut description = Vec::new();
        let mut params: IndexMap<String, String> = IndexMap::new();
        let mut returns: Option<String> = None;
        // `Some(None)` continues the return line, `Some(Some(name))` a parameter.
        let mut current: Option<Option<String>> = None;

        for line in lines {
            let line = line.strip_prefix(' ').unwrap_or(line);
            let trimmed = line.trim();
            if let Some(entry) = trimmed.strip_prefix('+') {
                let entry = entry.trim();
                let (name, text) = match entry.split_once(" - ") {
                    Some((name, text)) => (name.trim(), text.trim()),
                    None => entry
                        .split_once(char::is_whitespace)
                        .map_or((entry, ""), |(name, text)| (name, text.trim())),
                };
                if name == "return" {
                    returns = Some(text.to_string());
                    current = Some(None);
                } else {
                    params.insert(name.to_string(), text.to_string());
                    current = Some(Some(name.to_string()));
                }
                continue;
            }
            match &current {
                Some(_) if trimmed.is_empty() => {}
                Some(Some(name)) => {
                    if let Some(text) = params.get_mut(name) {
                        append_line(text, trimmed);
                    }
                }
                Some(None) => {
                    if let Some(text) = returns.as_mut() {
                        append_line(text, trimmed);
                    }
                }
                None => description.push(line.trim_end()),
            }
        }

        Self {
            description: description.join("\n").trim().to_string(),
            params,
            returns,
        }
    }
}

fn append_line(text: &mut String, line: &str) {
    if !text.is_empty() {
        text.push(' ');
    }
    text.push_str(line);
}

/// `prefix:identifier`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    /// Module prefix, if qualified.
    pub prefix: Option<String>,
    /// The identifier.
    pub identifier: String,
    /// The whole reference.
    pub span: Span,
}

/// `@reference { ... }`
#[derive(Debug, Clone)]
pub struct Annotation {
    /// Node identity.
    pub id: NodeId,
    /// From `@` to the end of the body, or of the reference when bodiless.
    pub span: Span,
    /// The annotation tag.
    pub reference: QualifiedName,
    /// The mapping constructor, if present.
    pub body: Option<MappingConstructor>,
}

/// `{ field, ... }`
#[derive(Debug, Clone)]
pub struct MappingConstructor {
    /// From `{` to `}` inclusive.
    pub span: Span,
    /// Fields in source order.
    pub fields: Vec<MappingField>,
}

impl MappingConstructor {
    /// Returns the specific field named `name`.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&MappingField> {
        self.fields
            .iter()
            .find(|field| matches!(field, MappingField::Specific { name: field_name, .. } if field_name == name))
    }

    /// Returns true if the body is exactly one spread field.
    #[must_use]
    pub fn is_spread_only(&self) -> bool {
        matches!(self.fields.as_slice(), [MappingField::Spread { .. }])
    }
}

/// A field of a mapping constructor.
#[derive(Debug, Clone)]
pub enum MappingField {
    /// `name: value` or the shorthand `name`.
    Specific {
        /// Field name, unquoted.
        name: String,
        /// Span of the value expression; `None` for the shorthand form.
        value: Option<Span>,
        /// The whole field.
        span: Span,
    },
    /// `...expr`
    Spread {
        /// The whole field.
        span: Span,
    },
}

/// `[qualifiers] T name [= initializer];`
#[derive(Debug, Clone)]
pub struct ModuleVarDecl {
    /// Node identity.
    pub id: NodeId,
    /// From the first qualifier (or the type) to `;` inclusive.
    pub span: Span,
    /// Qualifiers such as `final` or `public`, in source order.
    pub qualifiers: Vec<String>,
    /// The declared type as written, when it is a plain name.
    pub type_name: Option<QualifiedName>,
    /// Span of the type descriptor.
    pub type_span: Span,
    /// The declared type.
    pub ty: TypeId,
    /// Variable name.
    pub name: String,
    /// Span of the name token.
    pub name_span: Span,
    /// Span of the initializer expression.
    pub initializer: Option<Span>,
}

impl ModuleVarDecl {
    /// Returns true if the declaration carries the `final` qualifier.
    #[must_use]
    pub fn is_final(&self) -> bool {
        self.qualifiers.iter().any(|qualifier| qualifier == "final")
    }
}

/// `type Name T;` or `enum Name { ... }`
#[derive(Debug, Clone)]
pub struct TypeDef {
    /// The whole definition.
    pub span: Span,
    /// Type name.
    pub name: String,
    /// Span of the name token.
    pub name_span: Span,
    /// The named type.
    pub ty: TypeId,
}

/// `class Name { ... }`
///
/// Fields and resource methods are skipped; only regular and remote methods
/// are kept.
#[derive(Debug, Clone)]
pub struct ClassDef {
    /// The whole definition.
    pub span: Span,
    /// Class name.
    pub name: String,
    /// Span of the name token.
    pub name_span: Span,
    /// Methods in declaration order.
    pub methods: Vec<FunctionDef>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documentation_splits_description_and_params() {
        let doc = Documentation::from_lines([
            " Adds two numbers.",
            " Second line.",
            "",
            " + a - first operand",
            " + b - second",
            "   operand",
            " + return - the sum",
        ]);
        assert_eq!(doc.description, "Adds two numbers.\nSecond line.");
        assert_eq!(doc.params["a"], "first operand");
        assert_eq!(doc.params["b"], "second operand");
        assert_eq!(doc.returns.as_deref(), Some("the sum"));
    }

    #[test]
    fn documentation_with_params_only_has_empty_description() {
        let doc = Documentation::from_lines([" + city - the city"]);
        assert!(doc.description.is_empty());
        assert_eq!(doc.params.len(), 1);
    }

    #[test]
    fn effective_prefix_prefers_alias() {
        let import = ImportDecl {
            org: Some("ballerinax".to_string()),
            module_name: vec!["ai".to_string(), "agent".to_string()],
            prefix: None,
            span: Span::empty(0),
        };
        assert_eq!(import.effective_prefix(), "agent");
        assert_eq!(import.module_path(), "ai.agent");

        let aliased = ImportDecl {
            prefix: Some("ai".to_string()),
            ..import
        };
        assert_eq!(aliased.effective_prefix(), "ai");
    }
}
