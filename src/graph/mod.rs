//! Graph model: JSON → Rust types, petgraph index, upstream resolution.

pub mod types;
pub mod upstream;
pub mod workflow_graph;

pub use types::*;
pub use upstream::upstream_of;
pub use workflow_graph::WorkflowGraph;

use crate::error::CompilerError;

/// Deserialize an editor graph JSON string into a `Graph`.
pub fn parse(json: &str) -> Result<Graph, Vec<CompilerError>> {
    serde_json::from_str::<Graph>(json).map_err(|e| {
        vec![CompilerError::parse(
            "P001",
            format!("Failed to parse workflow graph JSON: {}", e),
        )]
    })
}

/// Find the node a `$label` reference addresses.
///
/// References are label-based, so when two nodes share a label the first one
/// in graph order wins. Validation reports duplicate labels (V009).
pub fn resolve_label<'a, I>(label: &str, nodes: I) -> Option<&'a GraphNode>
where
    I: IntoIterator<Item = &'a GraphNode>,
{
    nodes.into_iter().find(|n| n.label() == label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_minimal_graph() {
        let json = r#"{
            "nodes": [
                {"type": "trigger", "id": "t1", "data": {"label": "Start", "config": {}}},
                {"type": "http", "id": "h1", "position": {"x": 10, "y": 20},
                 "data": {"label": "Http", "config": {"method": "get", "url": "https://x.dev"}}}
            ],
            "edges": [{"id": "e1", "source": "t1", "target": "h1"}]
        }"#;
        let graph = parse(json).expect("should parse");
        assert_eq!(graph.nodes.len(), 2);
        assert_eq!(graph.nodes[1].kind(), NodeKind::Http);
        assert_eq!(graph.nodes[1].header().position.y, 20.0);
        assert!(graph.edges[0].source_handle.is_none());
    }

    #[test]
    fn parse_unknown_kind_fails() {
        let json = r#"{"nodes": [{"type": "ftp", "id": "x", "data": {"label": "X", "config": {}}}]}"#;
        let errors = parse(json).unwrap_err();
        assert_eq!(errors[0].code, "P001");
    }

    #[test]
    fn resolve_label_prefers_first() {
        let nodes = vec![
            GraphNode::Http(NodeBase::new("a", "Http", HttpConfig::default())),
            GraphNode::Http(NodeBase::new("b", "Http", HttpConfig::default())),
        ];
        assert_eq!(resolve_label("Http", &nodes).map(|n| n.id()), Some("a"));
        assert!(resolve_label("Missing", &nodes).is_none());
    }
}
