//! Reference resolution check (R001).
//!
//! Every `$Label` inside a string of a node's config must name a node that
//! runs before it.

use serde_json::Value;

use crate::error::CompilerError;
use crate::graph::types::{Graph, GraphNode};
use crate::graph::upstream::upstream_of;
use crate::reference::parse::{ReferenceMatch, find_references};

pub fn validate_references(workflow: &Graph) -> Vec<CompilerError> {
    let mut errors = Vec::new();

    for node in &workflow.nodes {
        let references = references_in(node);
        if references.is_empty() {
            continue;
        }

        let upstream = upstream_of(node.id(), &workflow.nodes, &workflow.edges);
        for reference in references {
            if upstream.iter().any(|n| n.label() == reference.node_name) {
                continue;
            }
            let message = if workflow.nodes.iter().any(|n| n.label() == reference.node_name) {
                format!(
                    "Reference '{}' points at node '{}', which does not run before this node",
                    reference.full, reference.node_name
                )
            } else {
                format!("Reference '{}' names no node in the workflow", reference.full)
            };
            errors.push(CompilerError::validate("R001", message, Some(node.id().to_string())));
        }
    }

    errors
}

/// Every reference found in any string of the node's config.
pub fn references_in(node: &GraphNode) -> Vec<ReferenceMatch> {
    let config = node.config_value();
    let mut strings = Vec::new();
    collect_strings(&config, &mut strings);
    strings.into_iter().flat_map(find_references).collect()
}

fn collect_strings<'v>(value: &'v Value, out: &mut Vec<&'v str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}
