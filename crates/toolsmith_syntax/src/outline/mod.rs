//! A lightweight front end that builds a [`Package`] from source text.
//!
//! The outline front end understands the parts of the language analysis and
//! rewriting look at: imports, documentation, annotations, function
//! signatures, module-level variables and type definitions. Type names are
//! declared for every document of a module before any document is parsed, so
//! types may refer to each other in any order and across documents.
//!
//! # Example
//!
//! ```
//! use toolsmith_syntax::{DocumentKind, PackageBuilder};
//!
//! let mut builder = PackageBuilder::new();
//! let module = builder.add_module("greeter");
//! builder
//!     .add_document(module, "main.bal", DocumentKind::Source, "function greet(string name) {}")
//!     .unwrap();
//! let package = builder.build().unwrap();
//! assert_eq!(package.units()[0].functions().count(), 1);
//! ```

mod lexer;
mod parser;

use crate::error::ParseError;
use crate::id::{DocumentId, ModuleId};
use crate::package::{ModuleInfo, Package};
use crate::span::LineIndex;
use crate::syntax::{DocumentKind, SourceUnit};
use parser::{ModuleScope, PackageState, UnitParser};

struct PendingDocument {
    id: DocumentId,
    name: String,
    kind: DocumentKind,
    text: String,
}

/// Collects modules and documents, then parses them into a [`Package`].
#[derive(Default)]
pub struct PackageBuilder {
    modules: Vec<ModuleInfo>,
    documents: Vec<PendingDocument>,
}

impl PackageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a module and returns its ID.
    pub fn add_module(&mut self, name: impl Into<String>) -> ModuleId {
        let id = ModuleId::new(self.modules.len() as u32);
        self.modules.push(ModuleInfo {
            id,
            name: name.into(),
        });
        id
    }

    /// Adds a document to `module`. Documents of a module keep the order they
    /// were added in.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::UnknownModule`] if `module` was not created by
    /// this builder.
    pub fn add_document(
        &mut self,
        module: ModuleId,
        name: impl Into<String>,
        kind: DocumentKind,
        text: impl Into<String>,
    ) -> Result<DocumentId, ParseError> {
        if module.index() as usize >= self.modules.len() {
            return Err(ParseError::UnknownModule(module));
        }
        let index = self
            .documents
            .iter()
            .filter(|document| document.id.module() == module)
            .count();
        let id = DocumentId::new(module, index as u32);
        self.documents.push(PendingDocument {
            id,
            name: name.into(),
            kind,
            text: text.into(),
        });
        Ok(id)
    }

    /// Parses every document.
    ///
    /// # Errors
    ///
    /// Returns the first [`ParseError`] encountered.
    pub fn build(self) -> Result<Package, ParseError> {
        let mut state = PackageState::default();

        let mut lexed = Vec::with_capacity(self.documents.len());
        for document in self.documents {
            let line_index = LineIndex::new(&document.text);
            let tokens = lexer::tokenize(document.id, &document.text, &line_index)?;
            lexed.push((document, line_index, tokens));
        }

        let mut scopes: Vec<ModuleScope> = self
            .modules
            .iter()
            .map(|_| ModuleScope::default())
            .collect();
        for (document, _, tokens) in &lexed {
            let scope = &mut scopes[document.id.module().index() as usize];
            parser::declare_names(&document.text, tokens, scope, &mut state.types);
        }

        let mut units = Vec::with_capacity(lexed.len());
        for (document, line_index, tokens) in lexed {
            let scope = &scopes[document.id.module().index() as usize];
            let parsed = UnitParser::new(
                document.id,
                &document.text,
                &line_index,
                &tokens,
                scope,
                &mut state,
            )
            .parse()?;
            tracing::debug!(
                document = %document.id,
                name = %document.name,
                members = parsed.members.len(),
                "parsed source unit"
            );
            units.push(SourceUnit {
                id: document.id,
                name: document.name,
                kind: document.kind,
                text: document.text,
                line_index,
                imports: parsed.imports,
                members: parsed.members,
            });
        }

        Ok(Package::new(state.types, self.modules, units))
    }
}
