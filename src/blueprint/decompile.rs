//! Blueprint → Graph decompilation, the inverse of `compile`.
//!
//! Branch routing stored in conditional/switch parameters is turned back into
//! `sourceHandle`s on the matching edges, along with a label and a stroke hint
//! so the editing surface renders the same branches it would have produced.

use std::collections::HashMap;

use crate::graph::types::*;

use super::compile::rule_label;
use super::types::*;

const TRUE_STROKE: &str = "#16a34a";
const FALSE_STROKE: &str = "#dc2626";
const FALLBACK_STROKE: &str = "#6b7280";
const RULE_STROKES: [&str; 4] = ["#2563eb", "#9333ea", "#ea580c", "#0891b2"];

/// Handle, default label and style for one branch edge.
struct BranchInfo {
    handle: String,
    label: String,
    stroke: &'static str,
}

pub fn to_graph(blueprint: &Blueprint) -> Graph {
    let _span = tracing::debug_span!(
        "to_graph",
        nodes = blueprint.nodes.len(),
        edges = blueprint.edges.len()
    )
    .entered();

    let nodes: Vec<GraphNode> = blueprint.nodes.iter().map(decompile_node).collect();

    let mut branches: HashMap<&str, BranchInfo> = HashMap::new();
    for (bp, node) in blueprint.nodes.iter().zip(&nodes) {
        collect_branches(bp, node, &mut branches);
    }

    let edges = blueprint
        .edges
        .iter()
        .map(|edge| {
            let mut graph_edge = GraphEdge::new(&edge.id, &edge.src, &edge.dst);
            graph_edge.label = edge.label.clone();
            if let Some(info) = branches.get(edge.id.as_str()) {
                graph_edge.source_handle = Some(info.handle.clone());
                graph_edge.label = edge.label.clone().or_else(|| Some(info.label.clone()));
                graph_edge.style = Some(EdgeStyle {
                    stroke: info.stroke.to_string(),
                    animated: false,
                });
            }
            graph_edge
        })
        .collect();

    Graph { nodes, edges }
}

fn collect_branches<'a>(bp: &'a BlueprintNode, node: &GraphNode, branches: &mut HashMap<&'a str, BranchInfo>) {
    match (&bp.parameters, node) {
        (NodeParameters::Conditional(p), _) => {
            if let Some(id) = p.true_edge_id.as_deref() {
                branches.insert(
                    id,
                    BranchInfo {
                        handle: TRUE_HANDLE.into(),
                        label: TRUE_HANDLE.into(),
                        stroke: TRUE_STROKE,
                    },
                );
            }
            if let Some(id) = p.false_edge_id.as_deref() {
                branches.insert(
                    id,
                    BranchInfo {
                        handle: FALSE_HANDLE.into(),
                        label: FALSE_HANDLE.into(),
                        stroke: FALSE_STROKE,
                    },
                );
            }
        }
        (NodeParameters::Switch(p), GraphNode::Switch(n)) => {
            let rule_count = p.rules.len();
            for (slot, route) in p.routes.iter().enumerate() {
                let Some(id) = route.as_deref() else { continue };
                let info = if slot < rule_count {
                    BranchInfo {
                        handle: SwitchHandle::Rule(slot).to_string(),
                        label: rule_label(&n.data.config, slot),
                        stroke: RULE_STROKES[slot % RULE_STROKES.len()],
                    }
                } else if slot == rule_count {
                    BranchInfo {
                        handle: SwitchHandle::Fallback.to_string(),
                        label: "Fallback".into(),
                        stroke: FALLBACK_STROKE,
                    }
                } else {
                    tracing::warn!(node = %bp.id, slot, "switch route beyond the fallback slot ignored");
                    continue;
                };
                branches.insert(id, info);
            }
        }
        _ => {}
    }
}

fn decompile_node(bp: &BlueprintNode) -> GraphNode {
    match &bp.parameters {
        NodeParameters::ManualTrigger(_) => GraphNode::ManualTrigger(base_of(bp, ManualTriggerConfig {})),
        NodeParameters::ScheduleTrigger(p) => GraphNode::ScheduleTrigger(base_of(bp, p.clone())),
        NodeParameters::Http(p) => GraphNode::Http(base_of(
            bp,
            HttpConfig {
                method: p.method.clone(),
                url: p.url.clone().unwrap_or_default(),
                headers: p.headers.clone(),
                query: p.query.clone(),
                body: p.body.clone(),
                timeout: p.timeout,
                retries: p.retry_count,
                ignore_ssl: p.ignore_ssl,
            },
        )),
        NodeParameters::Conditional(p) => GraphNode::Conditional(base_of(
            bp,
            ConditionalConfig {
                expression: p.expression.clone(),
            },
        )),
        NodeParameters::Switch(p) => GraphNode::Switch(base_of(
            bp,
            SwitchConfig {
                rules: p
                    .rules
                    .iter()
                    .map(|r| SwitchRule {
                        expression: r.expression.clone(),
                        label: r.label.clone(),
                    })
                    .collect(),
            },
        )),
        NodeParameters::Smtp(p) => GraphNode::Email(base_of(
            bp,
            EmailConfig {
                from: p.from.clone(),
                to: p.to.to_list(),
                cc: p.cc.as_ref().map(Recipients::to_list),
                bcc: p.bcc.as_ref().map(Recipients::to_list),
                subject: p.subject.clone(),
                body: p.body.clone(),
            },
        )),
        NodeParameters::Agent(p) => GraphNode::Agent(base_of(
            bp,
            AgentConfig {
                model: p.model.clone(),
                prompt: p.prompt.clone(),
                system_prompt: p.system_prompt.clone(),
                temperature: p.temperature,
                max_tokens: p.max_tokens,
            },
        )),
        NodeParameters::Wait(p) => GraphNode::Wait(base_of(bp, p.clone())),
        NodeParameters::Edit(p) => GraphNode::Edit(base_of(
            bp,
            EditConfig {
                assignments: p
                    .assignments
                    .iter()
                    .map(|a| Assignment {
                        name: a.name.clone(),
                        value: a.value.clone(),
                        value_type: a.value_type.clone(),
                    })
                    .collect(),
                keep_only_set: p.keep_only_set,
            },
        )),
        NodeParameters::Split(p) => GraphNode::Split(base_of(bp, p.clone())),
        NodeParameters::Aggregate(p) => GraphNode::Aggregator(base_of(bp, p.clone())),
        NodeParameters::Merge(p) => GraphNode::Merge(base_of(bp, p.clone())),
    }
}

fn base_of<C>(bp: &BlueprintNode, config: C) -> NodeBase<C> {
    NodeBase {
        id: bp.id.clone(),
        position: Position {
            x: bp.position[0],
            y: bp.position[1],
        },
        data: NodeData {
            label: bp.name.clone(),
            config,
            credentials: bp.credentials.clone(),
        },
    }
}
