//! Variable tree types: the addressable output fields of upstream nodes.

use serde::{Deserialize, Serialize};

use crate::graph::types::NodeKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Unknown,
}

impl VariableType {
    pub fn of(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(_) => VariableType::String,
            serde_json::Value::Number(_) => VariableType::Number,
            serde_json::Value::Bool(_) => VariableType::Boolean,
            serde_json::Value::Object(_) => VariableType::Object,
            serde_json::Value::Array(_) => VariableType::Array,
            serde_json::Value::Null => VariableType::Unknown,
        }
    }

    /// Type for an edit-node assignment's declared type.
    pub fn from_declared(declared: &str) -> Self {
        match declared {
            "number" => VariableType::Number,
            "boolean" => VariableType::Boolean,
            _ => VariableType::String,
        }
    }
}

/// Where a tree node came from. Execution data wins over schema on merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableOrigin {
    Schema,
    Execution,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableTreeNode {
    pub key: String,
    /// Fully-qualified reference, e.g. `$Http.body.id`.
    pub path: String,
    #[serde(rename = "type")]
    pub var_type: VariableType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_value: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<VariableTreeNode>>,
    pub source: VariableOrigin,
}

impl VariableTreeNode {
    /// A schema-derived field without known children.
    pub fn schema(key: impl Into<String>, parent_path: &str, var_type: VariableType) -> Self {
        let key = key.into();
        VariableTreeNode {
            path: format!("{}.{}", parent_path, key),
            key,
            var_type,
            sample_value: None,
            children: None,
            source: VariableOrigin::Schema,
        }
    }

    pub fn child(&self, key: &str) -> Option<&VariableTreeNode> {
        self.children.as_deref()?.iter().find(|c| c.key == key)
    }
}

/// The tree of one upstream node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariableSource {
    pub node_id: String,
    pub node_label: String,
    pub node_kind: NodeKind,
    /// `$` + node label.
    pub root_path: String,
    pub children: Vec<VariableTreeNode>,
}

/// Bounds applied when converting live samples into trees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TreeOptions {
    /// Keys kept per object; the rest are dropped.
    pub max_object_keys: usize,
    /// Nesting levels expanded below the node root.
    pub max_depth: usize,
}

impl Default for TreeOptions {
    fn default() -> Self {
        TreeOptions {
            max_object_keys: 50,
            max_depth: 5,
        }
    }
}
