//! petgraph-based directed graph index over the visual workflow.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};

use super::types::Graph;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeLabel {
    pub edge_id: String,
    pub source_handle: Option<String>,
}

pub struct WorkflowGraph {
    pub graph: DiGraph<String, EdgeLabel>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl WorkflowGraph {
    /// Index the graph. Edges whose endpoints are unknown are left out;
    /// structural validation reports them separately.
    pub fn build(workflow: &Graph) -> Self {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for node in &workflow.nodes {
            let id = node.id().to_string();
            if node_indices.contains_key(&id) {
                continue;
            }
            let idx = graph.add_node(id.clone());
            node_indices.insert(id, idx);
        }

        for edge in &workflow.edges {
            let source_idx = node_indices.get(&edge.source);
            let target_idx = node_indices.get(&edge.target);
            if let (Some(&s), Some(&t)) = (source_idx, target_idx) {
                graph.add_edge(
                    s,
                    t,
                    EdgeLabel {
                        edge_id: edge.id.clone(),
                        source_handle: edge.source_handle.clone(),
                    },
                );
            }
        }

        WorkflowGraph { graph, node_indices }
    }

    pub fn contains(&self, node_id: &str) -> bool {
        self.node_indices.contains_key(node_id)
    }

    pub fn incoming_count(&self, node_id: &str) -> usize {
        let Some(&idx) = self.node_indices.get(node_id) else {
            return 0;
        };
        self.graph.edges_directed(idx, Direction::Incoming).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::types::*;

    #[test]
    fn dangling_edges_and_duplicate_ids_are_left_out() {
        let workflow = Graph::new(
            vec![
                GraphNode::ManualTrigger(NodeBase::new("t", "Start", ManualTriggerConfig {})),
                GraphNode::Wait(NodeBase::new("w", "Pause", WaitConfig::default())),
                GraphNode::Wait(NodeBase::new("w", "Again", WaitConfig::default())),
            ],
            vec![GraphEdge::new("e1", "t", "w"), GraphEdge::new("e2", "w", "ghost")],
        );
        let graph = WorkflowGraph::build(&workflow);
        assert_eq!(graph.graph.node_count(), 2);
        assert_eq!(graph.graph.edge_count(), 1);
        assert_eq!(graph.incoming_count("w"), 1);
        assert_eq!(graph.incoming_count("ghost"), 0);
        assert!(!graph.contains("ghost"));
    }
}
