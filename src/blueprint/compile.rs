//! Graph → Blueprint compilation.
//!
//! Each graph node maps to exactly one blueprint node and each graph edge to
//! exactly one blueprint edge. Branching nodes encode their outgoing edges by
//! id: conditionals through `true_edge_id`/`false_edge_id`, switches through a
//! `routes` array with one slot per rule and a trailing fallback slot.

use std::collections::HashMap;

use crate::error::{CompileError, MissingCredential};
use crate::graph::types::*;

use super::types::*;

/// Compile a visual graph into a blueprint.
///
/// Fails only when credential-requiring nodes lack credentials; every such
/// node is reported, not just the first.
pub fn to_blueprint(nodes: &[GraphNode], edges: &[GraphEdge]) -> Result<Blueprint, CompileError> {
    let _span = tracing::debug_span!("to_blueprint", nodes = nodes.len(), edges = edges.len()).entered();

    let mut outgoing: HashMap<&str, Vec<&GraphEdge>> = HashMap::new();
    for edge in edges {
        outgoing.entry(edge.source.as_str()).or_default().push(edge);
    }

    let missing: Vec<MissingCredential> = nodes
        .iter()
        .filter(|n| n.kind().requires_credentials() && !n.has_credentials())
        .map(|n| MissingCredential {
            node_id: n.id().to_string(),
            node_type: n.kind().canonical(),
        })
        .collect();
    if !missing.is_empty() {
        tracing::debug!(count = missing.len(), "compilation blocked by missing credentials");
        return Err(CompileError::MissingCredentials(missing));
    }

    let by_id: HashMap<&str, &GraphNode> = nodes.iter().map(|n| (n.id(), n)).collect();

    let blueprint_nodes = nodes
        .iter()
        .map(|node| {
            let node_edges = outgoing.get(node.id()).map(Vec::as_slice).unwrap_or(&[]);
            compile_node(node, node_edges)
        })
        .collect();

    let blueprint_edges = edges
        .iter()
        .map(|edge| BlueprintEdge {
            id: edge.id.clone(),
            src: edge.source.clone(),
            dst: edge.target.clone(),
            label: edge.label.clone().or_else(|| {
                let source = by_id.get(edge.source.as_str())?;
                branch_label(source, edge.source_handle.as_deref()?)
            }),
        })
        .collect();

    Ok(Blueprint {
        nodes: blueprint_nodes,
        edges: blueprint_edges,
    })
}

fn compile_node(node: &GraphNode, outgoing: &[&GraphEdge]) -> BlueprintNode {
    let header = node.header();
    BlueprintNode {
        id: header.id.to_string(),
        name: header.label.to_string(),
        trigger: node.is_trigger(),
        parameters: compile_parameters(node, outgoing),
        credentials: header.credentials.cloned(),
        output: serde_json::Map::new(),
        position: [header.position.x, header.position.y],
    }
}

fn compile_parameters(node: &GraphNode, outgoing: &[&GraphEdge]) -> NodeParameters {
    match node {
        GraphNode::ManualTrigger(_) => NodeParameters::ManualTrigger(ManualTriggerParams {}),
        GraphNode::ScheduleTrigger(n) => NodeParameters::ScheduleTrigger(n.data.config.clone()),
        GraphNode::Http(n) => NodeParameters::Http(http_params(&n.data.config)),
        GraphNode::Conditional(n) => NodeParameters::Conditional(ConditionalParams {
            expression: n.data.config.expression.clone(),
            true_edge_id: edge_for_handle(outgoing, TRUE_HANDLE, &n.id),
            false_edge_id: edge_for_handle(outgoing, FALSE_HANDLE, &n.id),
        }),
        GraphNode::Switch(n) => NodeParameters::Switch(switch_params(&n.id, &n.data.config, outgoing)),
        GraphNode::Email(n) => {
            let c = &n.data.config;
            NodeParameters::Smtp(SmtpParams {
                from: c.from.clone(),
                to: Recipients::from_list(&c.to),
                cc: c.cc.as_deref().map(Recipients::from_list),
                bcc: c.bcc.as_deref().map(Recipients::from_list),
                subject: c.subject.clone(),
                body: c.body.clone(),
            })
        }
        GraphNode::Agent(n) => {
            let c = &n.data.config;
            NodeParameters::Agent(AgentParams {
                model: c.model.clone(),
                prompt: c.prompt.clone(),
                system_prompt: c.system_prompt.clone(),
                temperature: c.temperature,
                max_tokens: c.max_tokens,
            })
        }
        GraphNode::Wait(n) => NodeParameters::Wait(n.data.config.clone()),
        GraphNode::Edit(n) => NodeParameters::Edit(EditParams {
            assignments: n
                .data
                .config
                .assignments
                .iter()
                .map(|a| AssignmentParams {
                    name: a.name.clone(),
                    value: a.value.clone(),
                    value_type: a.value_type.clone(),
                })
                .collect(),
            keep_only_set: n.data.config.keep_only_set,
        }),
        GraphNode::Split(n) => NodeParameters::Split(n.data.config.clone()),
        GraphNode::Aggregator(n) => NodeParameters::Aggregate(n.data.config.clone()),
        GraphNode::Merge(n) => NodeParameters::Merge(n.data.config.clone()),
    }
}

fn http_params(c: &HttpConfig) -> HttpParams {
    HttpParams {
        method: c.method.to_uppercase(),
        url: Some(c.url.clone()).filter(|u| !u.is_empty()),
        headers: c.headers.clone(),
        query: c.query.clone(),
        body: c.body.clone(),
        timeout: c.timeout,
        retry_count: c.retries,
        ignore_ssl: c.ignore_ssl,
    }
}

fn switch_params(node_id: &str, c: &SwitchConfig, outgoing: &[&GraphEdge]) -> SwitchParams {
    let rule_count = c.rules.len();
    let mut routes: Vec<Option<String>> = vec![None; rule_count + 1];

    for edge in outgoing {
        let Some(handle) = edge.source_handle.as_deref().and_then(SwitchHandle::parse) else {
            continue;
        };
        let Some(slot) = handle.route_index(rule_count) else {
            tracing::warn!(node = node_id, handle = %handle, "switch edge targets a rule that does not exist");
            continue;
        };
        if routes[slot].is_some() {
            tracing::warn!(node = node_id, handle = %handle, edge = %edge.id, "duplicate switch handle ignored");
            continue;
        }
        routes[slot] = Some(edge.id.clone());
    }

    SwitchParams {
        rules: c
            .rules
            .iter()
            .map(|r| SwitchRuleParams {
                expression: r.expression.clone(),
                label: r.label.clone(),
            })
            .collect(),
        routes,
    }
}

/// First outgoing edge on `handle`; later duplicates are ignored.
fn edge_for_handle(outgoing: &[&GraphEdge], handle: &str, node_id: &str) -> Option<String> {
    let mut matching = outgoing
        .iter()
        .filter(|e| e.source_handle.as_deref() == Some(handle));
    let first = matching.next()?;
    if matching.next().is_some() {
        tracing::warn!(node = node_id, handle, "duplicate branch handle ignored");
    }
    Some(first.id.clone())
}

/// Human-readable branch name for an edge leaving `source` on `handle`.
pub fn branch_label(source: &GraphNode, handle: &str) -> Option<String> {
    match source {
        GraphNode::Conditional(_) => match handle {
            TRUE_HANDLE | FALSE_HANDLE => Some(handle.to_string()),
            _ => None,
        },
        GraphNode::Switch(n) => match SwitchHandle::parse(handle)? {
            SwitchHandle::Rule(i) => Some(rule_label(&n.data.config, i)),
            SwitchHandle::Fallback => Some("Fallback".to_string()),
        },
        _ => None,
    }
}

pub(crate) fn rule_label(c: &SwitchConfig, index: usize) -> String {
    c.rules
        .get(index)
        .and_then(|r| r.label.clone())
        .filter(|l| !l.trim().is_empty())
        .unwrap_or_else(|| format!("Rule {}", index + 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conditional(id: &str) -> GraphNode {
        GraphNode::Conditional(NodeBase::new(
            id,
            "Check",
            ConditionalConfig {
                expression: "$Http.status == 200".into(),
            },
        ))
    }

    #[test]
    fn duplicate_true_handles_keep_first() {
        let node = conditional("c");
        let a = GraphEdge::new("e1", "c", "x").with_handle("true");
        let b = GraphEdge::new("e2", "c", "y").with_handle("true");
        let params = compile_parameters(&node, &[&a, &b]);
        match params {
            NodeParameters::Conditional(p) => {
                assert_eq!(p.true_edge_id.as_deref(), Some("e1"));
                assert!(p.false_edge_id.is_none());
            }
            other => panic!("Expected conditional parameters, got {:?}", other),
        }
    }

    #[test]
    fn http_method_upper_cased_and_empty_url_dropped() {
        let params = http_params(&HttpConfig {
            method: "post".into(),
            retries: Some(3),
            ..HttpConfig::default()
        });
        assert_eq!(params.method, "POST");
        assert!(params.url.is_none());
        assert_eq!(params.retry_count, Some(3));
    }

    #[test]
    fn switch_route_out_of_range_is_dropped() {
        let config = SwitchConfig {
            rules: vec![SwitchRule {
                expression: "a".into(),
                label: None,
            }],
        };
        let edge = GraphEdge::new("e9", "s", "x").with_handle("rule-4");
        let params = switch_params("s", &config, &[&edge]);
        assert_eq!(params.routes, vec![None, None]);

        let past_end = GraphEdge::new("e1", "s", "x").with_handle("rule-1");
        let fallback = GraphEdge::new("e2", "s", "y").with_handle("fallback");
        let params = switch_params("s", &config, &[&past_end, &fallback]);
        assert_eq!(params.routes, vec![None, Some("e2".to_string())]);
    }

    #[test]
    fn rule_label_falls_back_to_position() {
        let config = SwitchConfig {
            rules: vec![
                SwitchRule {
                    expression: "a".into(),
                    label: Some("Paid".into()),
                },
                SwitchRule {
                    expression: "b".into(),
                    label: Some("  ".into()),
                },
            ],
        };
        assert_eq!(rule_label(&config, 0), "Paid");
        assert_eq!(rule_label(&config, 1), "Rule 2");
    }
}
