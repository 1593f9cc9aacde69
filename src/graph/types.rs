//! Rust types for the visual workflow graph.
//!
//! These types are the serde target for the editor's graph JSON. Each node
//! kind carries its own config struct so per-kind handling in the compiler,
//! the schema catalog and the validators is checked for exhaustiveness.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

// =============================================================================
// TOP-LEVEL GRAPH
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Graph {
    #[serde(default)]
    pub nodes: Vec<GraphNode>,
    #[serde(default)]
    pub edges: Vec<GraphEdge>,
}

impl Graph {
    pub fn new(nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Graph { nodes, edges }
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    /// Outgoing edges of `node_id`, in edge order.
    pub fn outgoing<'a>(&'a self, node_id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.source == node_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphEdge {
    pub id: String,
    pub source: String,
    pub target: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_handle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Presentation-only hint for the editing surface.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<EdgeStyle>,
}

impl GraphEdge {
    pub fn new(id: impl Into<String>, source: impl Into<String>, target: impl Into<String>) -> Self {
        GraphEdge {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            label: None,
            style: None,
        }
    }

    pub fn with_handle(mut self, handle: impl Into<String>) -> Self {
        self.source_handle = Some(handle.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeStyle {
    pub stroke: String,
    #[serde(default)]
    pub animated: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Opaque reference to a stored credential. Only its presence is checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRef {
    #[serde(rename = "type")]
    pub credential_type: String,
    pub id: String,
    pub name: String,
}

// =============================================================================
// BRANCH HANDLES
// =============================================================================

pub const TRUE_HANDLE: &str = "true";
pub const FALSE_HANDLE: &str = "false";
pub const FALLBACK_HANDLE: &str = "fallback";

/// Decoded `sourceHandle` of an edge leaving a switch node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchHandle {
    Rule(usize),
    Fallback,
}

impl SwitchHandle {
    pub fn parse(handle: &str) -> Option<Self> {
        if handle == FALLBACK_HANDLE {
            return Some(SwitchHandle::Fallback);
        }
        handle
            .strip_prefix("rule-")
            .and_then(|n| n.parse::<usize>().ok())
            .map(SwitchHandle::Rule)
    }

    /// Index of this handle in a `routes` array built for `rule_count` rules.
    /// The trailing fallback slot is reachable only through the fallback handle.
    pub fn route_index(self, rule_count: usize) -> Option<usize> {
        match self {
            SwitchHandle::Rule(i) if i < rule_count => Some(i),
            SwitchHandle::Rule(_) => None,
            SwitchHandle::Fallback => Some(rule_count),
        }
    }
}

impl std::fmt::Display for SwitchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SwitchHandle::Rule(i) => write!(f, "rule-{}", i),
            SwitchHandle::Fallback => write!(f, "{}", FALLBACK_HANDLE),
        }
    }
}

// =============================================================================
// NODE KIND
// =============================================================================

/// The closed set of editor-facing node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "trigger")]
    ManualTrigger,
    #[serde(rename = "schedule")]
    ScheduleTrigger,
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "if")]
    Conditional,
    #[serde(rename = "switch")]
    Switch,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "agent")]
    Agent,
    #[serde(rename = "wait")]
    Wait,
    #[serde(rename = "edit")]
    Edit,
    #[serde(rename = "split")]
    Split,
    #[serde(rename = "aggregator")]
    Aggregator,
    #[serde(rename = "merge")]
    Merge,
}

impl NodeKind {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeKind::ManualTrigger => "trigger",
            NodeKind::ScheduleTrigger => "schedule",
            NodeKind::Http => "http",
            NodeKind::Conditional => "if",
            NodeKind::Switch => "switch",
            NodeKind::Email => "email",
            NodeKind::Agent => "agent",
            NodeKind::Wait => "wait",
            NodeKind::Edit => "edit",
            NodeKind::Split => "split",
            NodeKind::Aggregator => "aggregator",
            NodeKind::Merge => "merge",
        }
    }

    pub fn is_trigger(self) -> bool {
        matches!(self, NodeKind::ManualTrigger | NodeKind::ScheduleTrigger)
    }

    /// Kinds that forward their input unchanged; their output shape is only
    /// known from live data.
    pub fn is_pass_through(self) -> bool {
        matches!(self, NodeKind::Conditional | NodeKind::Switch | NodeKind::Wait)
    }

    pub fn requires_credentials(self) -> bool {
        matches!(self, NodeKind::Email | NodeKind::Agent)
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// GRAPH NODE — tagged union over the node kinds
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GraphNode {
    #[serde(rename = "trigger")]
    ManualTrigger(NodeBase<ManualTriggerConfig>),
    #[serde(rename = "schedule")]
    ScheduleTrigger(NodeBase<ScheduleConfig>),
    #[serde(rename = "http")]
    Http(NodeBase<HttpConfig>),
    #[serde(rename = "if")]
    Conditional(NodeBase<ConditionalConfig>),
    #[serde(rename = "switch")]
    Switch(NodeBase<SwitchConfig>),
    #[serde(rename = "email")]
    Email(NodeBase<EmailConfig>),
    #[serde(rename = "agent")]
    Agent(NodeBase<AgentConfig>),
    #[serde(rename = "wait")]
    Wait(NodeBase<WaitConfig>),
    #[serde(rename = "edit")]
    Edit(NodeBase<EditConfig>),
    #[serde(rename = "split")]
    Split(NodeBase<SplitConfig>),
    #[serde(rename = "aggregator")]
    Aggregator(NodeBase<AggregatorConfig>),
    #[serde(rename = "merge")]
    Merge(NodeBase<MergeConfig>),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeBase<C> {
    pub id: String,
    #[serde(default)]
    pub position: Position,
    pub data: NodeData<C>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeData<C> {
    pub label: String,
    pub config: C,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials: Option<CredentialRef>,
}

impl<C> NodeBase<C> {
    pub fn new(id: impl Into<String>, label: impl Into<String>, config: C) -> Self {
        NodeBase {
            id: id.into(),
            position: Position::default(),
            data: NodeData {
                label: label.into(),
                config,
                credentials: None,
            },
        }
    }
}

/// Shared header of every node variant.
#[derive(Debug, Clone, Copy)]
pub struct NodeHeader<'a> {
    pub id: &'a str,
    pub label: &'a str,
    pub position: Position,
    pub credentials: Option<&'a CredentialRef>,
}

impl<'a, C> From<&'a NodeBase<C>> for NodeHeader<'a> {
    fn from(n: &'a NodeBase<C>) -> Self {
        NodeHeader {
            id: &n.id,
            label: &n.data.label,
            position: n.position,
            credentials: n.data.credentials.as_ref(),
        }
    }
}

impl GraphNode {
    pub fn header(&self) -> NodeHeader<'_> {
        match self {
            GraphNode::ManualTrigger(n) => n.into(),
            GraphNode::ScheduleTrigger(n) => n.into(),
            GraphNode::Http(n) => n.into(),
            GraphNode::Conditional(n) => n.into(),
            GraphNode::Switch(n) => n.into(),
            GraphNode::Email(n) => n.into(),
            GraphNode::Agent(n) => n.into(),
            GraphNode::Wait(n) => n.into(),
            GraphNode::Edit(n) => n.into(),
            GraphNode::Split(n) => n.into(),
            GraphNode::Aggregator(n) => n.into(),
            GraphNode::Merge(n) => n.into(),
        }
    }

    pub fn id(&self) -> &str {
        self.header().id
    }

    pub fn label(&self) -> &str {
        self.header().label
    }

    pub fn credentials(&self) -> Option<&CredentialRef> {
        self.header().credentials
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            GraphNode::ManualTrigger(_) => NodeKind::ManualTrigger,
            GraphNode::ScheduleTrigger(_) => NodeKind::ScheduleTrigger,
            GraphNode::Http(_) => NodeKind::Http,
            GraphNode::Conditional(_) => NodeKind::Conditional,
            GraphNode::Switch(_) => NodeKind::Switch,
            GraphNode::Email(_) => NodeKind::Email,
            GraphNode::Agent(_) => NodeKind::Agent,
            GraphNode::Wait(_) => NodeKind::Wait,
            GraphNode::Edit(_) => NodeKind::Edit,
            GraphNode::Split(_) => NodeKind::Split,
            GraphNode::Aggregator(_) => NodeKind::Aggregator,
            GraphNode::Merge(_) => NodeKind::Merge,
        }
    }

    pub fn is_trigger(&self) -> bool {
        self.kind().is_trigger()
    }

    /// True when the node carries a usable credential reference.
    pub fn has_credentials(&self) -> bool {
        self.credentials().is_some_and(|c| !c.id.trim().is_empty())
    }

    /// The node's config as a JSON value, for walking every string field.
    pub fn config_value(&self) -> serde_json::Value {
        let value = match self {
            GraphNode::ManualTrigger(n) => serde_json::to_value(&n.data.config),
            GraphNode::ScheduleTrigger(n) => serde_json::to_value(&n.data.config),
            GraphNode::Http(n) => serde_json::to_value(&n.data.config),
            GraphNode::Conditional(n) => serde_json::to_value(&n.data.config),
            GraphNode::Switch(n) => serde_json::to_value(&n.data.config),
            GraphNode::Email(n) => serde_json::to_value(&n.data.config),
            GraphNode::Agent(n) => serde_json::to_value(&n.data.config),
            GraphNode::Wait(n) => serde_json::to_value(&n.data.config),
            GraphNode::Edit(n) => serde_json::to_value(&n.data.config),
            GraphNode::Split(n) => serde_json::to_value(&n.data.config),
            GraphNode::Aggregator(n) => serde_json::to_value(&n.data.config),
            GraphNode::Merge(n) => serde_json::to_value(&n.data.config),
        };
        value.unwrap_or(serde_json::Value::Null)
    }
}

// =============================================================================
// TRIGGER CONFIGS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManualTriggerConfig {}

/// Shared by the `schedule` config and the `ScheduleTrigger` parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub cron: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

// =============================================================================
// ACTION CONFIGS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HttpConfig {
    pub method: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ignore_ssl: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// Comma-separated recipient list.
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bcc: Option<String>,
    pub subject: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AgentConfig {
    pub model: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
}

// =============================================================================
// CONTROL FLOW CONFIGS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConditionalConfig {
    /// Boolean expression, evaluated by the engine.
    pub expression: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchConfig {
    #[serde(default)]
    pub rules: Vec<SwitchRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwitchRule {
    pub expression: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// Shared by the `wait` config and parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitConfig {
    pub amount: u64,
    #[serde(default)]
    pub unit: WaitUnit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WaitUnit {
    #[default]
    Seconds,
    Minutes,
    Hours,
    Days,
}

// =============================================================================
// TRANSFORM CONFIGS
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditConfig {
    pub assignments: Vec<Assignment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_only_set: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub name: String,
    pub value: String,
    /// Declared value type: `string`, `number`, `boolean`, ...
    #[serde(rename = "type", default = "default_assignment_type")]
    pub value_type: String,
}

fn default_assignment_type() -> String {
    "string".into()
}

/// Shared by the `split` config and parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SplitConfig {
    /// Path of the array to fan out.
    pub field: String,
}

/// Shared by the `aggregator` config and the `aggregate` parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregatorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
}

/// Shared by the `merge` config and parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergeConfig {
    #[serde(default = "default_merge_mode")]
    pub mode: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        MergeConfig {
            mode: default_merge_mode(),
        }
    }
}

fn default_merge_mode() -> String {
    "append".into()
}
