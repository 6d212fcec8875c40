//! Shared helpers for the integration tests

#![allow(dead_code)]

use ctor::ctor;
use fire_behavior_core::{catalog, Configuration, DependencyGraph, UnitsRegistry};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Route engine logs through the test harness; `RUST_LOG` raises the level
#[ctor]
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

pub fn units() -> Arc<UnitsRegistry> {
    Arc::new(UnitsRegistry::standard())
}

/// Catalog graph with the given outputs requested
pub fn surface_graph(configuration: Configuration, outputs: &[&str]) -> DependencyGraph {
    let mut graph = catalog::standard_graph(units(), configuration).unwrap();
    graph.request_outputs_by_name(outputs).unwrap();
    graph
}

/// Native value of a variable by name
pub fn native(graph: &DependencyGraph, name: &str) -> f64 {
    let id = graph.variable_id(name).unwrap();
    graph.variable(id).native_value().unwrap()
}

/// Set a leaf from text by name
pub fn enter(graph: &mut DependencyGraph, name: &str, text: &str) {
    let id = graph.variable_id(name).unwrap();
    graph.set_leaf_text(id, text).unwrap();
}
