//! Graph-level structural validation rules (V001–V010).

use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;

use crate::error::CompilerError;
use crate::graph::types::*;
use crate::graph::workflow_graph::WorkflowGraph;
use crate::reference::parse::{is_identifier_char, is_identifier_start};

/// Run all structural validation rules. Returns all errors found.
pub fn validate_structural(workflow: &Graph, graph: &WorkflowGraph) -> Vec<CompilerError> {
    let mut errors = Vec::new();

    v001_unique_node_ids(workflow, &mut errors);
    v002_edges_reference_existing_nodes(workflow, graph, &mut errors);
    v003_no_duplicate_edges(workflow, &mut errors);
    v004_conditional_handles(workflow, &mut errors);
    v005_switch_handles(workflow, &mut errors);
    v006_trigger_no_incoming(workflow, graph, &mut errors);
    v007_no_self_loops(workflow, &mut errors);
    v008_no_cycles(graph, &mut errors);
    v009_unique_labels(workflow, &mut errors);
    v010_labels_are_identifiers(workflow, &mut errors);

    errors
}

fn v001_unique_node_ids(workflow: &Graph, errors: &mut Vec<CompilerError>) {
    let mut seen = HashSet::new();
    for node in &workflow.nodes {
        if !seen.insert(node.id()) {
            errors.push(CompilerError::validate(
                "V001",
                format!("Duplicate node id '{}'", node.id()),
                Some(node.id().to_string()),
            ));
        }
    }
}

fn v002_edges_reference_existing_nodes(workflow: &Graph, graph: &WorkflowGraph, errors: &mut Vec<CompilerError>) {
    for edge in &workflow.edges {
        if !graph.contains(&edge.source) {
            errors.push(CompilerError::validate(
                "V002",
                format!("Edge '{}' references unknown source node '{}'", edge.id, edge.source),
                None,
            ));
        }
        if !graph.contains(&edge.target) {
            errors.push(CompilerError::validate(
                "V002",
                format!("Edge '{}' references unknown target node '{}'", edge.id, edge.target),
                None,
            ));
        }
    }
}

fn v003_no_duplicate_edges(workflow: &Graph, errors: &mut Vec<CompilerError>) {
    let mut seen = HashSet::new();
    for edge in &workflow.edges {
        let key = (&edge.source, &edge.target, &edge.source_handle);
        if !seen.insert(key) {
            errors.push(CompilerError::validate(
                "V003",
                format!("Duplicate edge from '{}' to '{}'", edge.source, edge.target),
                Some(edge.source.clone()),
            ));
        }
    }
}

fn v004_conditional_handles(workflow: &Graph, errors: &mut Vec<CompilerError>) {
    for node in &workflow.nodes {
        let GraphNode::Conditional(_) = node else { continue };
        let mut used = HashSet::new();
        for edge in workflow.outgoing(node.id()) {
            let handle = edge.source_handle.as_deref();
            match handle {
                Some(h @ (TRUE_HANDLE | FALSE_HANDLE)) => {
                    if !used.insert(h) {
                        errors.push(CompilerError::validate(
                            "V004",
                            format!("Conditional node '{}' has more than one '{}' edge", node.id(), h),
                            Some(node.id().to_string()),
                        ));
                    }
                }
                _ => errors.push(CompilerError::validate(
                    "V004",
                    format!(
                        "Conditional node '{}' edge '{}' must use sourceHandle 'true' or 'false', found {:?}",
                        node.id(),
                        edge.id,
                        handle
                    ),
                    Some(node.id().to_string()),
                )),
            }
        }
    }
}

fn v005_switch_handles(workflow: &Graph, errors: &mut Vec<CompilerError>) {
    for node in &workflow.nodes {
        let GraphNode::Switch(n) = node else { continue };
        let rule_count = n.data.config.rules.len();
        let mut used = HashSet::new();
        for edge in workflow.outgoing(node.id()) {
            let parsed = edge
                .source_handle
                .as_deref()
                .and_then(SwitchHandle::parse)
                .filter(|h| !matches!(h, SwitchHandle::Rule(i) if *i >= rule_count));
            match parsed {
                Some(handle) => {
                    if !used.insert(handle) {
                        errors.push(CompilerError::validate(
                            "V005",
                            format!("Switch node '{}' has more than one '{}' edge", node.id(), handle),
                            Some(node.id().to_string()),
                        ));
                    }
                }
                None => errors.push(CompilerError::validate(
                    "V005",
                    format!(
                        "Switch node '{}' edge '{}' has handle {:?}, expected 'rule-0'..'rule-{}' or 'fallback'",
                        node.id(),
                        edge.id,
                        edge.source_handle,
                        rule_count.saturating_sub(1)
                    ),
                    Some(node.id().to_string()),
                )),
            }
        }
    }
}

fn v006_trigger_no_incoming(workflow: &Graph, graph: &WorkflowGraph, errors: &mut Vec<CompilerError>) {
    for node in &workflow.nodes {
        if node.is_trigger() && graph.incoming_count(node.id()) > 0 {
            errors.push(CompilerError::validate(
                "V006",
                format!("Trigger node '{}' must not have incoming edges", node.id()),
                Some(node.id().to_string()),
            ));
        }
    }
}

fn v007_no_self_loops(workflow: &Graph, errors: &mut Vec<CompilerError>) {
    for edge in &workflow.edges {
        if edge.source == edge.target {
            errors.push(CompilerError::validate(
                "V007",
                format!("Node '{}' has a self-loop edge '{}'", edge.source, edge.id),
                Some(edge.source.clone()),
            ));
        }
    }
}

/// Self-loops are V007; this only reports cycles spanning two or more nodes.
fn v008_no_cycles(graph: &WorkflowGraph, errors: &mut Vec<CompilerError>) {
    for component in tarjan_scc(&graph.graph) {
        if component.len() < 2 {
            continue;
        }
        let mut members: Vec<&str> = component.iter().map(|&ix| graph.graph[ix].as_str()).collect();
        members.sort_unstable();
        errors.push(CompilerError::validate(
            "V008",
            format!("Workflow graph contains a cycle through {}", members.join(", ")),
            None,
        ));
    }
}

fn v009_unique_labels(workflow: &Graph, errors: &mut Vec<CompilerError>) {
    let mut first_by_label: HashMap<&str, &str> = HashMap::new();
    for node in &workflow.nodes {
        if let Some(first) = first_by_label.get(node.label()) {
            errors.push(CompilerError::validate(
                "V009",
                format!(
                    "Label '{}' is already used by node '{}'; references to it resolve to that node",
                    node.label(),
                    first
                ),
                Some(node.id().to_string()),
            ));
        } else {
            first_by_label.insert(node.label(), node.id());
        }
    }
}

fn v010_labels_are_identifiers(workflow: &Graph, errors: &mut Vec<CompilerError>) {
    for node in &workflow.nodes {
        if !is_reference_name(node.label()) {
            errors.push(CompilerError::validate(
                "V010",
                format!(
                    "Label '{}' cannot be referenced: use letters, digits and '_', not starting with a digit",
                    node.label()
                ),
                Some(node.id().to_string()),
            ));
        }
    }
}

pub(crate) fn is_reference_name(label: &str) -> bool {
    let mut chars = label.chars();
    chars.next().is_some_and(is_identifier_start) && chars.all(is_identifier_char)
}
