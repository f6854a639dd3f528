//! A parsed package: its modules, documents and types.

use crate::error::ParseError;
use crate::id::{DocumentId, ModuleId};
use crate::outline::PackageBuilder;
use crate::semantic::StructuralSemantics;
use crate::syntax::{DocumentKind, SourceUnit};
use crate::types::TypeArena;

/// A module of a package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleInfo {
    /// Module identity.
    pub id: ModuleId,
    /// Module name.
    pub name: String,
}

/// Every module and document of one compilation.
#[derive(Debug, Clone)]
pub struct Package {
    types: TypeArena,
    modules: Vec<ModuleInfo>,
    units: Vec<SourceUnit>,
}

impl Package {
    /// Assembles a package from already parsed parts.
    #[must_use]
    pub fn new(types: TypeArena, modules: Vec<ModuleInfo>, units: Vec<SourceUnit>) -> Self {
        Self {
            types,
            modules,
            units,
        }
    }

    /// Parses a single source document into a one-module package.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the text cannot be parsed.
    pub fn from_source(name: impl Into<String>, text: impl Into<String>) -> Result<Self, ParseError> {
        let mut builder = PackageBuilder::new();
        let module = builder.add_module("main");
        builder.add_document(module, name, DocumentKind::Source, text)?;
        builder.build()
    }

    /// Returns the type arena.
    #[must_use]
    pub fn types(&self) -> &TypeArena {
        &self.types
    }

    /// Returns a structural semantic model over this package's types.
    #[must_use]
    pub fn semantics(&self) -> StructuralSemantics<'_> {
        StructuralSemantics::new(&self.types)
    }

    /// Returns every module.
    #[must_use]
    pub fn modules(&self) -> &[ModuleInfo] {
        &self.modules
    }

    /// Returns every document, grouped by module in the order they were added.
    #[must_use]
    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    /// Returns the document with the given ID.
    #[must_use]
    pub fn unit(&self, id: DocumentId) -> Option<&SourceUnit> {
        self.units.iter().find(|unit| unit.id == id)
    }

    /// Returns the first document called `name`.
    #[must_use]
    pub fn unit_named(&self, name: &str) -> Option<&SourceUnit> {
        self.units.iter().find(|unit| unit.name == name)
    }

    /// Iterates over the documents of `module`.
    pub fn units_in(&self, module: ModuleId) -> impl Iterator<Item = &SourceUnit> {
        self.units
            .iter()
            .filter(move |unit| unit.id.module() == module)
    }
}
