//! Integration tests for graph JSON parsing.

mod helpers;

use flowcraft::graph::{self, GraphNode, NodeKind, WaitUnit};

#[test]
fn parse_order_flow() {
    let workflow = helpers::order_flow();
    assert_eq!(workflow.nodes.len(), 7);
    assert_eq!(workflow.edges.len(), 6);

    let kinds: Vec<NodeKind> = workflow.nodes.iter().map(GraphNode::kind).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::ManualTrigger,
            NodeKind::Http,
            NodeKind::Conditional,
            NodeKind::Email,
            NodeKind::Switch,
            NodeKind::Wait,
            NodeKind::Agent,
        ]
    );
}

#[test]
fn parse_node_configs() {
    let workflow = helpers::order_flow();
    match workflow.node("hold") {
        Some(GraphNode::Wait(n)) => {
            assert_eq!(n.data.config.amount, 5);
            assert_eq!(n.data.config.unit, WaitUnit::Minutes);
        }
        other => panic!("Expected wait node, got {:?}", other),
    }
    match workflow.node("http") {
        Some(GraphNode::Http(n)) => {
            assert_eq!(n.data.config.timeout, Some(30));
            assert!(n.data.config.headers.is_none());
        }
        other => panic!("Expected http node, got {:?}", other),
    }
    assert!(workflow.node("notify").is_some_and(GraphNode::has_credentials));
    assert!(!workflow.node("route").is_some_and(GraphNode::has_credentials));
}

#[test]
fn parse_round_trip() {
    let workflow = helpers::order_flow();
    let serialized = serde_json::to_string(&workflow).expect("Should serialize");
    let again = graph::parse(&serialized).expect("Should parse again");
    assert_eq!(workflow, again);
}

#[test]
fn parse_invalid_json_returns_error() {
    let errors = graph::parse("not valid json").unwrap_err();
    assert_eq!(errors[0].code, "P001");
}

#[test]
fn resolve_label_takes_first_match() {
    let nodes = vec![
        helpers::http("a", "Http", "https://a.dev"),
        helpers::http("b", "Http", "https://b.dev"),
    ];
    assert_eq!(graph::resolve_label("Http", &nodes).map(GraphNode::id), Some("a"));
    assert!(graph::resolve_label("Missing", &nodes).is_none());
}
