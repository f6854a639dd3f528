//! Pass-wide state shared between analysis and rewriting.
//!
//! Both stores are written concurrently by analysis tasks and read by the
//! rewriter after every analysis task has finished. Keys are identities
//! (document, module, annotation node), never content.

use crate::config::{AnnotationSite, ToolConfig};
use crate::scan::AgentDeclaration;
use dashmap::{DashMap, DashSet};
use indexmap::IndexMap;
use toolsmith_syntax::{DocumentId, ModuleId};

/// What analysis recorded for one document.
#[derive(Debug, Clone, Default)]
pub struct SourceUnitState {
    /// Tool configurations by annotation site, in the order they were added.
    pub annotations: IndexMap<AnnotationSite, ToolConfig>,
    /// Agent declarations of the document, in the order they were added.
    pub agents: Vec<AgentDeclaration>,
}

impl SourceUnitState {
    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty() && self.agents.is_empty()
    }
}

/// Tool configurations and agent declarations, by document.
///
/// Agent declarations are additionally collected per module, so every
/// document of a module sees the declarations of its siblings.
#[derive(Debug, Default)]
pub struct ConfigStore {
    units: DashMap<DocumentId, SourceUnitState>,
    module_agents: DashMap<ModuleId, Vec<AgentDeclaration>>,
}

impl ConfigStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the configuration of a tool annotation.
    pub fn add_tool(&self, site: AnnotationSite, config: ToolConfig) {
        self.units
            .entry(site.document)
            .or_default()
            .annotations
            .insert(site, config);
    }

    /// Records a module-level agent declaration.
    pub fn add_agent(&self, declaration: AgentDeclaration) {
        self.module_agents
            .entry(declaration.document.module())
            .or_default()
            .push(declaration.clone());
        self.units
            .entry(declaration.document)
            .or_default()
            .agents
            .push(declaration);
    }

    /// Returns the configuration recorded for `site`.
    #[must_use]
    pub fn tool_config(&self, site: AnnotationSite) -> Option<ToolConfig> {
        self.units
            .get(&site.document)
            .and_then(|state| state.annotations.get(&site).cloned())
    }

    /// Returns every document with recorded state, in ascending order.
    #[must_use]
    pub fn documents(&self) -> Vec<DocumentId> {
        let mut documents: Vec<_> = self.units.iter().map(|entry| *entry.key()).collect();
        documents.sort_unstable();
        documents
    }

    /// Removes and returns the state of `document`.
    ///
    /// Each document's state is consumed once; a second call returns `None`.
    pub fn take(&self, document: DocumentId) -> Option<SourceUnitState> {
        self.units.remove(&document).map(|(_, state)| state)
    }

    /// Returns the agent declarations of `module` in source order: by
    /// document, then by position.
    #[must_use]
    pub fn agents_in_module(&self, module: ModuleId) -> Vec<AgentDeclaration> {
        let mut agents = self
            .module_agents
            .get(&module)
            .map(|agents| agents.clone())
            .unwrap_or_default();
        agents.sort_by_key(|agent| (agent.document, agent.span.start));
        agents
    }

    /// Returns the number of documents with recorded state.
    #[must_use]
    pub fn len(&self) -> usize {
        self.units.len()
    }

    /// Returns true if no document has recorded state.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Which modules define their own initializer and which already received a
/// synthesized one.
///
/// A module never receives two synthesized initializers, and none at all if
/// it defines its own.
#[derive(Debug, Default)]
pub struct ModuleInitTracking {
    user_defined: DashSet<ModuleId>,
    synthesized: DashSet<ModuleId>,
}

impl ModuleInitTracking {
    /// Creates empty tracking state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that `module` defines its own initializer.
    pub fn mark_user_defined(&self, module: ModuleId) {
        self.user_defined.insert(module);
    }

    /// Returns true if `module` defines its own initializer.
    #[must_use]
    pub fn has_user_defined(&self, module: ModuleId) -> bool {
        self.user_defined.contains(&module)
    }

    /// Claims the right to synthesize the initializer of `module`.
    ///
    /// Returns true for exactly one caller per module, and never for a module
    /// with a user-defined initializer.
    pub fn claim_synthesis(&self, module: ModuleId) -> bool {
        !self.has_user_defined(module) && self.synthesized.insert(module)
    }

    /// Returns true if an initializer was synthesized for `module`.
    #[must_use]
    pub fn has_synthesized(&self, module: ModuleId) -> bool {
        self.synthesized.contains(&module)
    }
}
