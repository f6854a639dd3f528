//! Module-level scans: user-defined initializers and agent declarations.

use crate::config::SymbolNames;
use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::store::{ConfigStore, ModuleInitTracking};
use serde::{Deserialize, Serialize};
use toolsmith_syntax::{DocumentId, ModuleVarDecl, NodeId, SourceUnit, Span};

/// A module-level variable declaration of the agent class with an
/// initializer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentDeclaration {
    /// Document containing the declaration.
    pub document: DocumentId,
    /// The declaration node.
    pub node: NodeId,
    /// The whole declaration, `;` included.
    pub span: Span,
    /// The variable name.
    pub name_span: Span,
    /// Variable name.
    pub name: String,
    /// Whether the declaration is `final`.
    pub is_final: bool,
    /// The initialization, as an assignment statement: `name = expr;`.
    pub statement: String,
}

/// Finds module-level functions named like the module initializer.
#[derive(Debug, Clone, Copy)]
pub struct InitFunctionScanner<'a> {
    names: &'a SymbolNames,
}

impl<'a> InitFunctionScanner<'a> {
    /// Creates a scanner.
    #[must_use]
    pub fn new(names: &'a SymbolNames) -> Self {
        Self { names }
    }

    /// Returns true if `unit` defines the module initializer.
    #[must_use]
    pub fn defines_init(&self, unit: &SourceUnit) -> bool {
        unit.functions()
            .any(|function| function.name == self.names.init_function)
    }

    /// Marks the module of `unit` in `tracking` if `unit` defines the module
    /// initializer. Returns whether it does.
    pub fn scan(&self, unit: &SourceUnit, tracking: &ModuleInitTracking) -> bool {
        let found = self.defines_init(unit);
        if found {
            tracing::debug!(document = %unit.id, "found user-defined module initializer");
            tracking.mark_user_defined(unit.id.module());
        }
        found
    }
}

/// Finds module-level agent declarations.
///
/// A declaration matches when its type is written as `prefix:Agent`, where
/// `prefix` is what the document imports the agent package as, and it has an
/// initializer.
#[derive(Debug, Clone, Copy)]
pub struct AgentDeclarationScanner<'a> {
    names: &'a SymbolNames,
}

impl<'a> AgentDeclarationScanner<'a> {
    /// Creates a scanner.
    #[must_use]
    pub fn new(names: &'a SymbolNames) -> Self {
        Self { names }
    }

    /// Returns the agent declarations of `unit` in source order.
    ///
    /// A document that does not import the agent package has none.
    #[must_use]
    pub fn find(&self, unit: &SourceUnit) -> Vec<AgentDeclaration> {
        let Some(prefix) = self.names.agent_prefix(unit) else {
            return Vec::new();
        };
        unit.module_vars()
            .filter(|decl| self.is_agent_type(decl, prefix))
            .filter_map(|decl| {
                let initializer = decl.initializer?;
                Some(AgentDeclaration {
                    document: unit.id,
                    node: decl.id,
                    span: decl.span,
                    name_span: decl.name_span,
                    name: decl.name.clone(),
                    is_final: decl.is_final(),
                    statement: format!("{} = {};", decl.name, unit.slice(initializer)),
                })
            })
            .collect()
    }

    /// Records the agent declarations of `unit` in `store`, reporting
    /// `AI_105` for each one that is not `final`. Returns how many were
    /// recorded.
    pub fn scan(&self, unit: &SourceUnit, sink: &DiagnosticSink, store: &ConfigStore) -> usize {
        let declarations = self.find(unit);
        let count = declarations.len();
        for declaration in declarations {
            if !declaration.is_final {
                sink.report(Diagnostic::new(
                    DiagnosticCode::ModuleLevelAgentMustBeFinal,
                    unit.location(Span::empty(declaration.span.start)),
                    &[&declaration.name],
                ));
            }
            tracing::debug!(
                document = %unit.id,
                agent = %declaration.name,
                "recorded module-level agent"
            );
            store.add_agent(declaration);
        }
        count
    }

    fn is_agent_type(&self, decl: &ModuleVarDecl, prefix: &str) -> bool {
        decl.type_name.as_ref().is_some_and(|type_name| {
            type_name.identifier == self.names.agent_class
                && type_name.prefix.as_deref() == Some(prefix)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use toolsmith_syntax::Package;

    const AGENTS: &str = r#"import ballerinax/ai.agent as ai;

final ai:Agent first = check new (model);
ai:Agent second = check new (model,
    tools = []);
final ai:Agent unset;
final agent:Agent wrongPrefix = check new (model);
final int count = 1;
"#;

    #[test]
    fn finds_agents_through_the_import_alias() {
        let package = Package::from_source("main.bal", AGENTS).unwrap();
        let names = SymbolNames::default();
        let found = AgentDeclarationScanner::new(&names).find(&package.units()[0]);

        let summary: Vec<_> = found
            .iter()
            .map(|agent| (agent.name.as_str(), agent.is_final))
            .collect();
        assert_eq!(summary, [("first", true), ("second", false)]);
        assert_eq!(found[0].statement, "first = check new (model);");
        assert_eq!(found[1].statement, "second = check new (model,\n    tools = []);");
    }

    #[test]
    fn non_final_agents_are_reported_and_recorded() {
        let package = Package::from_source("main.bal", AGENTS).unwrap();
        let names = SymbolNames::default();
        let sink = DiagnosticSink::new();
        let store = ConfigStore::new();

        let count = AgentDeclarationScanner::new(&names).scan(&package.units()[0], &sink, &store);
        assert_eq!(count, 2);
        let diagnostics = sink.into_sorted();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::ModuleLevelAgentMustBeFinal);
        assert_eq!(
            (diagnostics[0].location.line(), diagnostics[0].location.column()),
            (4, 1)
        );
        assert_eq!(store.agents_in_module(package.units()[0].id.module()).len(), 2);
    }

    #[test]
    fn no_agents_without_the_import() {
        let package =
            Package::from_source("main.bal", "final agent:Agent a = check new ();\n").unwrap();
        let names = SymbolNames::default();
        assert!(AgentDeclarationScanner::new(&names).find(&package.units()[0]).is_empty());
    }

    #[test]
    fn unrelated_package_named_agent_is_ignored() {
        let package =
            Package::from_source("main.bal", "import myorg/agent;\nagent:Agent helper = new ();\n")
                .unwrap();
        let names = SymbolNames::default();
        let sink = DiagnosticSink::new();
        let store = ConfigStore::new();

        let count = AgentDeclarationScanner::new(&names).scan(&package.units()[0], &sink, &store);
        assert_eq!(count, 0);
        assert!(sink.is_empty());
        assert!(store.agents_in_module(package.units()[0].id.module()).is_empty());
    }

    #[test]
    fn init_function_marks_the_module() {
        let package = Package::from_source(
            "main.bal",
            "function init() returns error? {}\nfunction other() {}\n",
        )
        .unwrap();
        let names = SymbolNames::default();
        let tracking = ModuleInitTracking::new();
        let unit = &package.units()[0];

        assert!(InitFunctionScanner::new(&names).scan(unit, &tracking));
        assert!(tracking.has_user_defined(unit.id.module()));
    }

    #[test]
    fn no_init_function() {
        let package = Package::from_source("main.bal", "function initialize() {}\n").unwrap();
        let names = SymbolNames::default();
        assert!(!InitFunctionScanner::new(&names).defines_init(&package.units()[0]));
    }
}
