//! Concurrent access tests for the pass-wide stores.
//!
//! These tests verify that analysis running on several threads can record
//! into the same stores without losing entries.

use std::sync::{Arc, Barrier};
use std::thread;

use toolsmith_syntax::{DocumentId, ModuleId, NodeId, Span};
use toolsmith_tools::{
    AgentDeclaration, AnnotationSite, ConfigStore, Diagnostic, DiagnosticCode, DiagnosticSink,
    ModuleInitTracking, ToolConfig,
};

const THREADS: u32 = 8;

fn config(index: u32) -> ToolConfig {
    ToolConfig {
        name: format!("\"tool{index}\""),
        description: None,
        parameter_schema: "()".to_string(),
    }
}

/// Test that every thread's tool configurations survive concurrent insertion
/// into shared documents.
#[test]
fn concurrent_tool_insertion() {
    let store = Arc::new(ConfigStore::new());

    let handles: Vec<_> = (0..THREADS)
        .map(|thread_index| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                for i in 0..100 {
                    let site = AnnotationSite {
                        document: DocumentId::new(ModuleId::new(0), i % 4),
                        node: NodeId::new(thread_index * 1000 + i),
                    };
                    store.add_tool(site, config(i));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    assert_eq!(store.len(), 4);
    let total: usize = store
        .documents()
        .into_iter()
        .map(|document| store.take(document).unwrap().annotations.len())
        .sum();
    assert_eq!(total, (THREADS * 100) as usize);
}

/// Test that agents recorded from many threads come back in source order.
#[test]
fn concurrent_agent_collection_is_ordered() {
    let store = Arc::new(ConfigStore::new());
    let module = ModuleId::new(2);

    let handles: Vec<_> = (0..THREADS)
        .map(|index| {
            let store = Arc::clone(&store);
            thread::spawn(move || {
                let start = 10 * index as usize;
                store.add_agent(AgentDeclaration {
                    document: DocumentId::new(module, index % 2),
                    node: NodeId::new(index),
                    span: Span::new(start, start + 5),
                    name_span: Span::new(start + 1, start + 2),
                    name: format!("agent{index}"),
                    is_final: true,
                    statement: format!("agent{index} = check new ();"),
                });
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    let agents = store.agents_in_module(module);
    assert_eq!(agents.len(), THREADS as usize);
    let order: Vec<_> = agents
        .iter()
        .map(|agent| (agent.document.index(), agent.span.start))
        .collect();
    let mut sorted = order.clone();
    sorted.sort_unstable();
    assert_eq!(order, sorted);
}

/// Test that exactly one of many racing threads wins the synthesis claim.
#[test]
fn synthesis_claim_has_a_single_winner() {
    let tracking = Arc::new(ModuleInitTracking::new());
    let barrier = Arc::new(Barrier::new(THREADS as usize));
    let module = ModuleId::new(0);

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let tracking = Arc::clone(&tracking);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                tracking.claim_synthesis(module)
            })
        })
        .collect();

    let winners = handles
        .into_iter()
        .map(|handle| handle.join().expect("Thread panicked"))
        .filter(|won| *won)
        .count();
    assert_eq!(winners, 1);
}

/// Test that diagnostics reported from many threads are all kept.
#[test]
fn concurrent_diagnostic_reports() {
    let sink = Arc::new(DiagnosticSink::new());
    let package = toolsmith_syntax::Package::from_source("main.bal", "int x = 1;\n").unwrap();
    let location = package.units()[0].location(Span::new(0, 3));

    thread::scope(|scope| {
        for _ in 0..THREADS {
            let sink = Arc::clone(&sink);
            scope.spawn(move || {
                for _ in 0..50 {
                    sink.report(Diagnostic::new(
                        DiagnosticCode::ModuleLevelAgentMustBeFinal,
                        location,
                        &["x"],
                    ));
                }
            });
        }
    });

    assert_eq!(sink.len(), (THREADS * 50) as usize);
}
