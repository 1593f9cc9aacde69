//! Statically-known output fields per node kind.
//!
//! This must track the engine's actual runtime output shape. A mismatch only
//! degrades editor suggestions, never execution.

use crate::graph::types::GraphNode;

use super::types::{VariableTreeNode, VariableType};

/// Placeholder field of pass-through kinds, superseded by live data.
pub const CONTEXT_FIELD: &str = "context";
/// The single element a split node emits per item.
pub const ITEM_FIELD: &str = "$item";

/// Output fields `node` is expected to produce, rooted at `root_path`.
pub fn static_schema(node: &GraphNode, root_path: &str) -> Vec<VariableTreeNode> {
    let field = |key: &str, var_type| VariableTreeNode::schema(key, root_path, var_type);

    match node {
        GraphNode::ManualTrigger(_) => vec![],
        GraphNode::ScheduleTrigger(_) => vec![
            field("timestamp", VariableType::String),
            field("timezone", VariableType::String),
        ],
        GraphNode::Http(_) => vec![
            field("status", VariableType::Number),
            field("statusText", VariableType::String),
            field("headers", VariableType::Object),
            field("body", VariableType::Object),
        ],
        GraphNode::Conditional(_) | GraphNode::Switch(_) | GraphNode::Wait(_) => {
            vec![field(CONTEXT_FIELD, VariableType::Object)]
        }
        GraphNode::Email(_) => vec![
            field("messageId", VariableType::String),
            field("accepted", VariableType::Array),
            field("rejected", VariableType::Array),
        ],
        GraphNode::Agent(_) => vec![
            field("response", VariableType::String),
            field("model", VariableType::String),
        ],
        GraphNode::Edit(n) => n
            .data
            .config
            .assignments
            .iter()
            .filter(|a| !a.name.trim().is_empty())
            .map(|a| field(&a.name, VariableType::from_declared(&a.value_type)))
            .collect(),
        GraphNode::Split(_) => vec![field(ITEM_FIELD, VariableType::Unknown)],
        GraphNode::Aggregator(n) => {
            let destination = n
                .data
                .config
                .destination
                .as_deref()
                .filter(|d| !d.trim().is_empty())
                .unwrap_or("items");
            vec![field(destination, VariableType::Array)]
        }
        GraphNode::Merge(_) => vec![],
    }
}
