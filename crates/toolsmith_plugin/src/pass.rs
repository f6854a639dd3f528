//! The compilation pass driver.
//!
//! A pass owns the pass-wide state (diagnostics, recorded configurations,
//! initializer tracking) and runs in two phases:
//!
//! 1. [`CompilationPass::analyze`] runs every analysis task on every document,
//!    spread over scoped worker threads.
//! 2. [`AnalyzedPass::modify`] runs every modifier task on every document.
//!
//! The second phase is only reachable through the value the first returns,
//! so no document is rewritten while another is still being analyzed.

use crate::error::PluginError;
use crate::plugin::TaskRegistry;
use crate::task::{AnalysisContext, AnalysisTask, ModifyContext};
use core::num::NonZeroUsize;
use core::sync::atomic::{AtomicUsize, Ordering};
use parking_lot::Mutex;
use serde::Serialize;
use std::thread;
use toolsmith_rewrite::{RewriteError, RewrittenUnit};
use toolsmith_syntax::{DocumentId, Package, SourceUnit};
use toolsmith_tools::{ConfigStore, Diagnostic, DiagnosticSink, ModuleInitTracking, SymbolNames};

/// Everything a pass hands back to the host.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassOutput {
    /// Diagnostics ordered by document and position.
    pub diagnostics: Vec<Diagnostic>,
    /// Documents whose text changed, in document order.
    pub documents: Vec<RewrittenUnit>,
}

/// A compilation pass over one package, before analysis.
pub struct CompilationPass<'a> {
    package: &'a Package,
    names: &'a SymbolNames,
    registry: &'a TaskRegistry,
    sink: DiagnosticSink,
    store: ConfigStore,
    tracking: ModuleInitTracking,
}

impl<'a> CompilationPass<'a> {
    /// Creates a pass running the tasks of `registry` over `package`.
    #[must_use]
    pub fn new(package: &'a Package, names: &'a SymbolNames, registry: &'a TaskRegistry) -> Self {
        Self {
            package,
            names,
            registry,
            sink: DiagnosticSink::new(),
            store: ConfigStore::new(),
            tracking: ModuleInitTracking::new(),
        }
    }

    /// Runs every analysis task on every document and waits for all of them.
    ///
    /// # Errors
    ///
    /// Returns [`PluginError::TaskPanicked`] if a task panicked.
    pub fn analyze(self) -> Result<AnalyzedPass<'a>, PluginError> {
        let semantics = self.package.semantics();
        let ctx = AnalysisContext {
            semantics: &semantics,
            names: self.names,
            sink: &self.sink,
            store: &self.store,
            tracking: &self.tracking,
        };
        let jobs: Vec<(&dyn AnalysisTask, &SourceUnit)> = self
            .registry
            .analysis_tasks()
            .flat_map(|task| self.package.units().iter().map(move |unit| (task, unit)))
            .collect();

        tracing::debug!(
            documents = self.package.units().len(),
            tasks = self.registry.analysis_tasks().count(),
            "starting analysis"
        );
        run_parallel(&jobs, |&(task, unit)| {
            tracing::trace!(task = task.name(), document = %unit.id, "running analysis task");
            task.analyze(unit, &ctx);
        })
        .map_err(|()| PluginError::TaskPanicked { phase: "analysis" })?;
        tracing::debug!(
            diagnostics = self.sink.len(),
            recorded = self.store.len(),
            "analysis finished"
        );

        Ok(AnalyzedPass { pass: self })
    }

    /// Runs both phases.
    ///
    /// # Errors
    ///
    /// Returns the first error of either phase.
    pub fn run(self) -> Result<PassOutput, PluginError> {
        self.analyze()?.modify()
    }
}

/// A compilation pass whose analysis has completed.
pub struct AnalyzedPass<'a> {
    pass: CompilationPass<'a>,
}

impl AnalyzedPass<'_> {
    /// Returns the diagnostics reported during analysis.
    #[must_use]
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.pass.sink.snapshot()
    }

    /// Returns the state recorded during analysis.
    #[must_use]
    pub fn store(&self) -> &ConfigStore {
        &self.pass.store
    }

    /// Runs every modifier task on every document.
    ///
    /// # Errors
    ///
    /// Returns the first [`RewriteError`] in document order, or
    /// [`PluginError::TaskPanicked`] if a task panicked.
    pub fn modify(self) -> Result<PassOutput, PluginError> {
        let pass = self.pass;
        let ctx = ModifyContext {
            names: pass.names,
            store: &pass.store,
            tracking: &pass.tracking,
        };
        let results: Mutex<Vec<(DocumentId, Result<RewrittenUnit, RewriteError>)>> =
            Mutex::new(Vec::new());

        run_parallel(pass.package.units(), |unit| {
            for task in pass.registry.modifier_tasks() {
                let result = match task.modify(unit, &ctx) {
                    Ok(Some(rewritten)) => Ok(rewritten),
                    Ok(None) => continue,
                    Err(error) => {
                        tracing::warn!(task = task.name(), document = %unit.id, %error, "rewrite failed");
                        Err(error)
                    }
                };
                results.lock().push((unit.id, result));
            }
        })
        .map_err(|()| PluginError::TaskPanicked { phase: "modification" })?;

        let mut results = results.into_inner();
        results.sort_by_key(|(document, _)| *document);
        let documents = results
            .into_iter()
            .map(|(_, result)| result)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!(rewritten = documents.len(), "modification finished");
        Ok(PassOutput {
            diagnostics: pass.sink.into_sorted(),
            documents,
        })
    }
}

/// Runs `work` on every item, spread over scoped worker threads.
///
/// Returns `Err` if any invocation panicked.
fn run_parallel<T: Sync>(items: &[T], work: impl Fn(&T) + Sync) -> Result<(), ()> {
    let cursor = &AtomicUsize::new(0);
    let work = &work;
    let workers = thread::available_parallelism()
        .map_or(1, NonZeroUsize::get)
        .min(items.len())
        .max(1);

    thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(move || {
                    while let Some(item) = items.get(cursor.fetch_add(1, Ordering::Relaxed)) {
                        work(item);
                    }
                })
            })
            .collect();
        handles
            .into_iter()
            .map(thread::ScopedJoinHandle::join)
            .collect::<Result<Vec<()>, _>>()
            .map(|_| ())
            .map_err(|_| ())
    })
}
