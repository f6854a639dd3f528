//! The document-level rewrite driver.

use crate::edit::EditBuffer;
use crate::error::RewriteError;
use crate::init::ModuleInitSynthesizer;
use crate::merge::AnnotationMerger;
use serde::{Deserialize, Serialize};
use toolsmith_syntax::{DocumentId, DocumentKind, Member, Package, SourceUnit};
use toolsmith_tools::{AnnotationSite, ConfigStore, ModuleInitTracking, SymbolNames};

/// The new text of a modified document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RewrittenUnit {
    /// The document.
    pub document: DocumentId,
    /// Whether the document is a source or a test document.
    pub kind: DocumentKind,
    /// Full updated text.
    pub text: String,
}

/// Applies what analysis recorded to document text.
///
/// For each document, the member list is walked once: tool annotations with a
/// recorded configuration are merged and agent declarations are desugared. The
/// module initializer is appended to the module's first document holding an
/// agent declaration. Modules defining their own initializer keep their agent
/// declarations as written.
#[derive(Debug, Clone, Copy)]
pub struct SourceRewriter<'a> {
    store: &'a ConfigStore,
    tracking: &'a ModuleInitTracking,
    names: &'a SymbolNames,
}

impl<'a> SourceRewriter<'a> {
    /// Creates a rewriter reading analysis results from `store` and
    /// `tracking`.
    #[must_use]
    pub fn new(
        store: &'a ConfigStore,
        tracking: &'a ModuleInitTracking,
        names: &'a SymbolNames,
    ) -> Self {
        Self {
            store,
            tracking,
            names,
        }
    }

    /// Rewrites `unit`, consuming its recorded state.
    ///
    /// Returns `None` when nothing in the document changes.
    ///
    /// # Errors
    ///
    /// Returns a [`RewriteError`] if the computed edits cannot be applied.
    pub fn rewrite(&self, unit: &SourceUnit) -> Result<Option<RewrittenUnit>, RewriteError> {
        let Some(state) = self.store.take(unit.id) else {
            return Ok(None);
        };
        let module = unit.id.module();
        let desugar_agents = !self.tracking.has_user_defined(module);
        let merger = AnnotationMerger;
        let synthesizer = ModuleInitSynthesizer::new(&self.names.init_function);

        let mut buffer = EditBuffer::new(&unit.text);
        for member in &unit.members {
            match member {
                Member::Function(function) => {
                    for annotation in &function.annotations {
                        let site = AnnotationSite::of(unit, annotation);
                        let Some(config) = state.annotations.get(&site) else {
                            continue;
                        };
                        if let Some(edit) = merger.merge(unit, annotation, config) {
                            buffer.push(edit)?;
                        }
                    }
                }
                Member::ModuleVar(decl) if desugar_agents => {
                    if let Some(agent) = state.agents.iter().find(|agent| agent.node == decl.id) {
                        buffer.push(synthesizer.desugar(unit, agent))?;
                    }
                }
                _ => {}
            }
        }

        if desugar_agents && !state.agents.is_empty() {
            let agents = self.store.agents_in_module(module);
            let hosts_initializer = agents.first().map(|agent| agent.document) == Some(unit.id);
            if hosts_initializer && self.tracking.claim_synthesis(module) {
                tracing::debug!(
                    document = %unit.id,
                    module = %module,
                    agents = agents.len(),
                    "synthesized module initializer"
                );
                buffer.push(synthesizer.append_initializer(unit, &agents))?;
            }
        }

        if buffer.is_empty() {
            return Ok(None);
        }
        let edits = buffer.len();
        let text = buffer.apply()?;
        tracing::debug!(document = %unit.id, edits, "rewrote source unit");
        Ok(Some(RewrittenUnit {
            document: unit.id,
            kind: unit.kind,
            text,
        }))
    }

    /// Rewrites every document of `package` in order.
    ///
    /// # Errors
    ///
    /// Returns the first [`RewriteError`] encountered.
    pub fn rewrite_package(&self, package: &Package) -> Result<Vec<RewrittenUnit>, RewriteError> {
        let mut rewritten = Vec::new();
        for unit in package.units() {
            if let Some(unit) = self.rewrite(unit)? {
                rewritten.push(unit);
            }
        }
        Ok(rewritten)
    }

    /// Rewrites the document `document` of `package`.
    ///
    /// # Errors
    ///
    /// Returns [`RewriteError::UnknownDocument`] if the package has no such
    /// document, or any error of [`rewrite`](Self::rewrite).
    pub fn rewrite_document(
        &self,
        package: &Package,
        document: DocumentId,
    ) -> Result<Option<RewrittenUnit>, RewriteError> {
        let unit = package
            .unit(document)
            .ok_or(RewriteError::UnknownDocument(document))?;
        self.rewrite(unit)
    }
}
