//! Blueprint type definitions: the engine-facing form of a workflow.
//!
//! On the wire a node is `{ id, name, trigger, type, parameters, credentials?,
//! output, position: [x, y] }`. In memory `type` and `parameters` are fused
//! into one tagged enum so every per-kind branch is checked for
//! exhaustiveness. Renaming a canonical type is a breaking change for the
//! engine.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::graph::types::{
    AggregatorConfig, CredentialRef, MergeConfig, NodeKind, ScheduleConfig, SplitConfig,
    WaitConfig,
};

// =============================================================================
// TOP-LEVEL BLUEPRINT
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Blueprint {
    pub nodes: Vec<BlueprintNode>,
    pub edges: Vec<BlueprintEdge>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlueprintEdge {
    pub id: String,
    pub src: String,
    pub dst: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BlueprintNodeWire", into = "BlueprintNodeWire")]
pub struct BlueprintNode {
    pub id: String,
    pub name: String,
    pub trigger: bool,
    pub parameters: NodeParameters,
    pub credentials: Option<CredentialRef>,
    pub output: serde_json::Map<String, serde_json::Value>,
    pub position: [f64; 2],
}

impl BlueprintNode {
    pub fn node_type(&self) -> CanonicalType {
        self.parameters.canonical_type()
    }
}

// =============================================================================
// CANONICAL TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CanonicalType {
    ManualTrigger,
    ScheduleTrigger,
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "conditional")]
    Conditional,
    #[serde(rename = "switch")]
    Switch,
    #[serde(rename = "smtp")]
    Smtp,
    #[serde(rename = "agent")]
    Agent,
    #[serde(rename = "wait")]
    Wait,
    #[serde(rename = "edit")]
    Edit,
    #[serde(rename = "split")]
    Split,
    #[serde(rename = "aggregate")]
    Aggregate,
    #[serde(rename = "merge")]
    Merge,
}

impl CanonicalType {
    pub fn as_str(self) -> &'static str {
        match self {
            CanonicalType::ManualTrigger => "ManualTrigger",
            CanonicalType::ScheduleTrigger => "ScheduleTrigger",
            CanonicalType::Http => "http",
            CanonicalType::Conditional => "conditional",
            CanonicalType::Switch => "switch",
            CanonicalType::Smtp => "smtp",
            CanonicalType::Agent => "agent",
            CanonicalType::Wait => "wait",
            CanonicalType::Edit => "edit",
            CanonicalType::Split => "split",
            CanonicalType::Aggregate => "aggregate",
            CanonicalType::Merge => "merge",
        }
    }

    pub fn kind(self) -> NodeKind {
        match self {
            CanonicalType::ManualTrigger => NodeKind::ManualTrigger,
            CanonicalType::ScheduleTrigger => NodeKind::ScheduleTrigger,
            CanonicalType::Http => NodeKind::Http,
            CanonicalType::Conditional => NodeKind::Conditional,
            CanonicalType::Switch => NodeKind::Switch,
            CanonicalType::Smtp => NodeKind::Email,
            CanonicalType::Agent => NodeKind::Agent,
            CanonicalType::Wait => NodeKind::Wait,
            CanonicalType::Edit => NodeKind::Edit,
            CanonicalType::Split => NodeKind::Split,
            CanonicalType::Aggregate => NodeKind::Aggregator,
            CanonicalType::Merge => NodeKind::Merge,
        }
    }
}

impl NodeKind {
    pub fn canonical(self) -> CanonicalType {
        match self {
            NodeKind::ManualTrigger => CanonicalType::ManualTrigger,
            NodeKind::ScheduleTrigger => CanonicalType::ScheduleTrigger,
            NodeKind::Http => CanonicalType::Http,
            NodeKind::Conditional => CanonicalType::Conditional,
            NodeKind::Switch => CanonicalType::Switch,
            NodeKind::Email => CanonicalType::Smtp,
            NodeKind::Agent => CanonicalType::Agent,
            NodeKind::Wait => CanonicalType::Wait,
            NodeKind::Edit => CanonicalType::Edit,
            NodeKind::Split => CanonicalType::Split,
            NodeKind::Aggregator => CanonicalType::Aggregate,
            NodeKind::Merge => CanonicalType::Merge,
        }
    }
}

impl std::fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// PARAMETERS — one record per canonical type
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum NodeParameters {
    ManualTrigger(ManualTriggerParams),
    ScheduleTrigger(ScheduleConfig),
    Http(HttpParams),
    Conditional(ConditionalParams),
    Switch(SwitchParams),
    Smtp(SmtpParams),
    Agent(AgentParams),
    Wait(WaitConfig),
    Edit(EditParams),
    Split(SplitConfig),
    Aggregate(AggregatorConfig),
    Merge(MergeConfig),
}

impl NodeParameters {
    pub fn canonical_type(&self) -> CanonicalType {
        match self {
            NodeParameters::ManualTrigger(_) => CanonicalType::ManualTrigger,
            NodeParameters::ScheduleTrigger(_) => CanonicalType::ScheduleTrigger,
            NodeParameters::Http(_) => CanonicalType::Http,
            NodeParameters::Conditional(_) => CanonicalType::Conditional,
            NodeParameters::Switch(_) => CanonicalType::Switch,
            NodeParameters::Smtp(_) => CanonicalType::Smtp,
            NodeParameters::Agent(_) => CanonicalType::Agent,
            NodeParameters::Wait(_) => CanonicalType::Wait,
            NodeParameters::Edit(_) => CanonicalType::Edit,
            NodeParameters::Split(_) => CanonicalType::Split,
            NodeParameters::Aggregate(_) => CanonicalType::Aggregate,
            NodeParameters::Merge(_) => CanonicalType::Merge,
        }
    }

    fn to_value(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            NodeParameters::ManualTrigger(p) => serde_json::to_value(p),
            NodeParameters::ScheduleTrigger(p) => serde_json::to_value(p),
            NodeParameters::Http(p) => serde_json::to_value(p),
            NodeParameters::Conditional(p) => serde_json::to_value(p),
            NodeParameters::Switch(p) => serde_json::to_value(p),
            NodeParameters::Smtp(p) => serde_json::to_value(p),
            NodeParameters::Agent(p) => serde_json::to_value(p),
            NodeParameters::Wait(p) => serde_json::to_value(p),
            NodeParameters::Edit(p) => serde_json::to_value(p),
            NodeParameters::Split(p) => serde_json::to_value(p),
            NodeParameters::Aggregate(p) => serde_json::to_value(p),
            NodeParameters::Merge(p) => serde_json::to_value(p),
        }
    }

    fn from_value(
        node_type: CanonicalType,
        value: serde_json::Value,
    ) -> Result<Self, serde_json::Error> {
        use serde_json::from_value;
        Ok(match node_type {
            CanonicalType::ManualTrigger => NodeParameters::ManualTrigger(from_value(value)?),
            CanonicalType::ScheduleTrigger => NodeParameters::ScheduleTrigger(from_value(value)?),
            CanonicalType::Http => NodeParameters::Http(from_value(value)?),
            CanonicalType::Conditional => NodeParameters::Conditional(from_value(value)?),
            CanonicalType::Switch => NodeParameters::Switch(from_value(value)?),
            CanonicalType::Smtp => NodeParameters::Smtp(from_value(value)?),
            CanonicalType::Agent => NodeParameters::Agent(from_value(value)?),
            CanonicalType::Wait => NodeParameters::Wait(from_value(value)?),
            CanonicalType::Edit => NodeParameters::Edit(from_value(value)?),
            CanonicalType::Split => NodeParameters::Split(from_value(value)?),
            CanonicalType::Aggregate => NodeParameters::Aggregate(from_value(value)?),
            CanonicalType::Merge => NodeParameters::Merge(from_value(value)?),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualTriggerParams {}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpParams {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ignore_ssl: Option<bool>,
}

/// Branch targets are omitted, never `null`, when no edge uses the handle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionalParams {
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub true_edge_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub false_edge_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchParams {
    pub rules: Vec<SwitchRuleParams>,
    /// One slot per rule plus a trailing fallback slot.
    pub routes: Vec<Option<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchRuleParams {
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmtpParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    pub to: Recipients,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<Recipients>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcc: Option<Recipients>,
    pub subject: String,
    pub body: String,
}

/// A single address serializes as a string, anything else as an array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Recipients {
    One(String),
    Many(Vec<String>),
}

impl Default for Recipients {
    fn default() -> Self {
        Recipients::Many(Vec::new())
    }
}

impl Recipients {
    /// Split a comma-separated list, dropping blanks.
    pub fn from_list(list: &str) -> Self {
        let mut addresses: Vec<String> = list
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect();
        if addresses.len() == 1 {
            Recipients::One(addresses.remove(0))
        } else {
            Recipients::Many(addresses)
        }
    }

    pub fn to_list(&self) -> String {
        match self {
            Recipients::One(address) => address.clone(),
            Recipients::Many(addresses) => addresses.join(", "),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    pub model: String,
    pub prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EditParams {
    pub assignments: Vec<AssignmentParams>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_only_set: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentParams {
    pub name: String,
    pub value: String,
    #[serde(rename = "type")]
    pub value_type: String,
}

// =============================================================================
// WIRE FORM
// =============================================================================

#[derive(Clone, Serialize, Deserialize)]
struct BlueprintNodeWire {
    id: String,
    name: String,
    #[serde(default)]
    trigger: bool,
    #[serde(rename = "type")]
    node_type: CanonicalType,
    #[serde(default = "empty_object")]
    parameters: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    credentials: Option<CredentialRef>,
    #[serde(default)]
    output: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    position: [f64; 2],
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl TryFrom<BlueprintNodeWire> for BlueprintNode {
    type Error = String;

    fn try_from(wire: BlueprintNodeWire) -> Result<Self, Self::Error> {
        let parameters = NodeParameters::from_value(wire.node_type, wire.parameters)
            .map_err(|e| format!("invalid parameters for '{}' node '{}': {}", wire.node_type, wire.id, e))?;
        Ok(BlueprintNode {
            id: wire.id,
            name: wire.name,
            trigger: wire.trigger,
            parameters,
            credentials: wire.credentials,
            output: wire.output,
            position: wire.position,
        })
    }
}

impl From<BlueprintNode> for BlueprintNodeWire {
    fn from(node: BlueprintNode) -> Self {
        let node_type = node.node_type();
        BlueprintNodeWire {
            id: node.id,
            name: node.name,
            trigger: node.trigger,
            node_type,
            // Parameter records only hold strings, numbers, maps and JSON values.
            parameters: node.parameters.to_value().unwrap_or_else(|_| empty_object()),
            credentials: node.credentials,
            output: node.output,
            position: node.position,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_mapping_is_bijective() {
        let all = [
            CanonicalType::ManualTrigger,
            CanonicalType::ScheduleTrigger,
            CanonicalType::Http,
            CanonicalType::Conditional,
            CanonicalType::Switch,
            CanonicalType::Smtp,
            CanonicalType::Agent,
            CanonicalType::Wait,
            CanonicalType::Edit,
            CanonicalType::Split,
            CanonicalType::Aggregate,
            CanonicalType::Merge,
        ];
        for t in all {
            assert_eq!(t.kind().canonical(), t);
            let json = serde_json::to_value(t).unwrap();
            assert_eq!(json, serde_json::Value::String(t.as_str().into()));
        }
        assert_eq!(NodeKind::Conditional.canonical(), CanonicalType::Conditional);
        assert_eq!(NodeKind::Email.canonical().as_str(), "smtp");
    }

    #[test]
    fn recipients_single_and_many() {
        assert_eq!(Recipients::from_list(" a@x.dev "), Recipients::One("a@x.dev".into()));
        assert_eq!(
            Recipients::from_list("a@x.dev, b@y.dev,"),
            Recipients::Many(vec!["a@x.dev".into(), "b@y.dev".into()])
        );
        assert_eq!(Recipients::from_list(""), Recipients::Many(vec![]));
        assert_eq!(Recipients::from_list("a@x.dev,b@y.dev").to_list(), "a@x.dev, b@y.dev");
    }

    #[test]
    fn node_type_and_parameters_must_agree() {
        let json = r#"{"id": "n", "name": "N", "type": "switch", "parameters": {"expression": "x"}}"#;
        assert!(serde_json::from_str::<BlueprintNode>(json).is_err());

        let json = r#"{"id": "n", "name": "N", "type": "conditional", "parameters": {"expression": "x"}}"#;
        let node: BlueprintNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.node_type(), CanonicalType::Conditional);
        assert_eq!(node.position, [0.0, 0.0]);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let json = r#"{"id": "n", "name": "N", "type": "ftp", "parameters": {}}"#;
        assert!(serde_json::from_str::<BlueprintNode>(json).is_err());
    }
}
