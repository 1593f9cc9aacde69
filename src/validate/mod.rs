//! Graph-level validation.
//!
//! Collects every finding rather than stopping at the first: structural
//! rules, per-node config rules, then reference resolution.

pub mod node_rules;
pub mod references;
pub mod structural;

use crate::error::CompilerError;
use crate::graph::types::{Graph, GraphNode};
use crate::graph::workflow_graph::WorkflowGraph;

/// Validate the entire workflow graph (structural + node configs + references).
pub fn validate_graph(workflow: &Graph) -> Vec<CompilerError> {
    let _span = tracing::debug_span!("validate_graph", nodes = workflow.nodes.len()).entered();

    let graph = WorkflowGraph::build(workflow);
    let mut errors = structural::validate_structural(workflow, &graph);

    for node in &workflow.nodes {
        errors.extend(validate_node(node));
    }
    errors.extend(references::validate_references(workflow));

    tracing::debug!(errors = errors.len(), "validation finished");
    errors
}

/// Validate a single node's configuration.
pub fn validate_node(node: &GraphNode) -> Vec<CompilerError> {
    node_rules::validate_node_config(node)
}
