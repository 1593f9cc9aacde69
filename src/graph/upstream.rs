//! Upstream dependency discovery.

use std::collections::{HashMap, HashSet, VecDeque};

use super::types::{GraphEdge, GraphNode};

/// All nodes transitively upstream of `node_id`, closest ancestors first.
///
/// The order is breadth-first discovery order, not a topological order.
/// The node itself is never included, each node appears at most once, and
/// cycles terminate because ids are marked visited before they are queued.
/// Edge endpoints that name no node are skipped.
pub fn upstream_of<'a>(node_id: &str, nodes: &'a [GraphNode], edges: &[GraphEdge]) -> Vec<&'a GraphNode> {
    let mut parents: HashMap<&str, Vec<&str>> = HashMap::new();
    for edge in edges {
        if edge.source == edge.target {
            continue;
        }
        parents
            .entry(edge.target.as_str())
            .or_default()
            .push(edge.source.as_str());
    }

    let mut visited: HashSet<&str> = HashSet::new();
    visited.insert(node_id);
    let mut queue: VecDeque<&str> = VecDeque::from([node_id]);
    let mut order: Vec<&str> = Vec::new();

    while let Some(id) = queue.pop_front() {
        if id != node_id {
            order.push(id);
        }
        for &source in parents.get(id).into_iter().flatten() {
            if visited.insert(source) {
                queue.push_back(source);
            }
        }
    }

    let by_id: HashMap<&str, &GraphNode> = nodes.iter().map(|n| (n.id(), n)).collect();
    order
        .into_iter()
        .filter_map(|id| by_id.get(id).copied())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::*;

    fn http(id: &str) -> GraphNode {
        GraphNode::Http(NodeBase::new(id, id.to_uppercase(), HttpConfig::default()))
    }

    fn ids(nodes: &[&GraphNode]) -> Vec<String> {
        nodes.iter().map(|n| n.id().to_string()).collect()
    }

    #[test]
    fn no_incoming_edges_is_empty() {
        let nodes = vec![http("a")];
        assert!(upstream_of("a", &nodes, &[]).is_empty());
    }

    #[test]
    fn closest_ancestors_first() {
        let nodes = vec![http("a"), http("b"), http("c"), http("d")];
        let edges = vec![
            GraphEdge::new("e1", "a", "b"),
            GraphEdge::new("e2", "b", "c"),
            GraphEdge::new("e3", "d", "c"),
        ];
        assert_eq!(ids(&upstream_of("c", &nodes, &edges)), vec!["b", "d", "a"]);
    }

    #[test]
    fn self_loop_ignored() {
        let nodes = vec![http("a"), http("b")];
        let edges = vec![GraphEdge::new("e1", "a", "b"), GraphEdge::new("e2", "b", "b")];
        assert_eq!(ids(&upstream_of("b", &nodes, &edges)), vec!["a"]);
    }

    #[test]
    fn cycle_terminates_without_duplicates() {
        let nodes = vec![http("a"), http("b"), http("c")];
        let edges = vec![
            GraphEdge::new("e1", "a", "b"),
            GraphEdge::new("e2", "b", "c"),
            GraphEdge::new("e3", "c", "a"),
        ];
        assert_eq!(ids(&upstream_of("c", &nodes, &edges)), vec!["b", "a"]);
    }

    #[test]
    fn missing_nodes_skipped() {
        let nodes = vec![http("a"), http("c")];
        let edges = vec![GraphEdge::new("e1", "a", "ghost"), GraphEdge::new("e2", "ghost", "c")];
        assert_eq!(ids(&upstream_of("c", &nodes, &edges)), vec!["a"]);
    }
}
