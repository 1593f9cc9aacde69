#![allow(dead_code)]

use flowcraft::graph::*;

// =============================================================================
// Fixtures
// =============================================================================

pub fn order_flow() -> Graph {
    flowcraft::graph::parse(include_str!("../fixtures/order_flow.json")).expect("fixture should parse")
}

/// Route library logs to the test writer. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

// =============================================================================
// Node builders
// =============================================================================

pub fn credentials(id: &str) -> CredentialRef {
    CredentialRef {
        credential_type: "test".into(),
        id: id.into(),
        name: format!("Credential {}", id),
    }
}

pub fn trigger(id: &str, label: &str) -> GraphNode {
    GraphNode::ManualTrigger(NodeBase::new(id, label, ManualTriggerConfig {}))
}

pub fn http(id: &str, label: &str, url: &str) -> GraphNode {
    GraphNode::Http(NodeBase::new(
        id,
        label,
        HttpConfig {
            method: "GET".into(),
            url: url.into(),
            ..Default::default()
        },
    ))
}

pub fn conditional(id: &str, label: &str, expression: &str) -> GraphNode {
    GraphNode::Conditional(NodeBase::new(
        id,
        label,
        ConditionalConfig {
            expression: expression.into(),
        },
    ))
}

pub fn switch(id: &str, label: &str, rules: &[&str]) -> GraphNode {
    GraphNode::Switch(NodeBase::new(
        id,
        label,
        SwitchConfig {
            rules: rules
                .iter()
                .map(|e| SwitchRule {
                    expression: e.to_string(),
                    label: None,
                })
                .collect(),
        },
    ))
}

pub fn email(id: &str, label: &str, to: &str, credential: Option<CredentialRef>) -> GraphNode {
    let mut base = NodeBase::new(
        id,
        label,
        EmailConfig {
            to: to.into(),
            subject: "Hello".into(),
            body: "Body".into(),
            ..Default::default()
        },
    );
    base.data.credentials = credential;
    GraphNode::Email(base)
}

pub fn agent(id: &str, label: &str, credential: Option<CredentialRef>) -> GraphNode {
    let mut base = NodeBase::new(
        id,
        label,
        AgentConfig {
            model: "gpt-4o-mini".into(),
            prompt: "Say hi".into(),
            ..Default::default()
        },
    );
    base.data.credentials = credential;
    GraphNode::Agent(base)
}

pub fn wait(id: &str, label: &str, amount: u64) -> GraphNode {
    GraphNode::Wait(NodeBase::new(
        id,
        label,
        WaitConfig {
            amount,
            unit: WaitUnit::Seconds,
        },
    ))
}

pub fn split(id: &str, label: &str, field: &str) -> GraphNode {
    GraphNode::Split(NodeBase::new(id, label, SplitConfig { field: field.into() }))
}

pub fn merge(id: &str, label: &str) -> GraphNode {
    GraphNode::Merge(NodeBase::new(id, label, MergeConfig::default()))
}

// =============================================================================
// Edge builders
// =============================================================================

pub fn edge(id: &str, source: &str, target: &str) -> GraphEdge {
    GraphEdge::new(id, source, target)
}

pub fn branch(id: &str, source: &str, target: &str, handle: &str) -> GraphEdge {
    GraphEdge::new(id, source, target).with_handle(handle)
}

pub fn ids(nodes: &[&GraphNode]) -> Vec<String> {
    nodes.iter().map(|n| n.id().to_string()).collect()
}
