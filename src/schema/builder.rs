//! Per-upstream-node variable trees for reference autocomplete.

use std::collections::HashMap;

use serde_json::Value;

use crate::graph::types::{GraphEdge, GraphNode};
use crate::graph::upstream::upstream_of;

use super::catalog::static_schema;
use super::merge::merge_trees;
use super::sample::sample_to_tree;
use super::types::{TreeOptions, VariableSource};

/// The most recent output recorded for a node.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionSample {
    pub output: Value,
}

/// Source of live execution samples. `None` means "no sample yet".
pub trait ExecutionSampleProvider {
    fn node_execution(&self, node_id: &str) -> Option<ExecutionSample>;
}

impl ExecutionSampleProvider for HashMap<String, Value> {
    fn node_execution(&self, node_id: &str) -> Option<ExecutionSample> {
        self.get(node_id).map(|output| ExecutionSample {
            output: output.clone(),
        })
    }
}

pub struct VariableTreeBuilder<'a> {
    nodes: &'a [GraphNode],
    edges: &'a [GraphEdge],
    samples: Option<&'a dyn ExecutionSampleProvider>,
    options: TreeOptions,
}

impl<'a> VariableTreeBuilder<'a> {
    pub fn new(nodes: &'a [GraphNode], edges: &'a [GraphEdge]) -> Self {
        VariableTreeBuilder {
            nodes,
            edges,
            samples: None,
            options: TreeOptions::default(),
        }
    }

    pub fn with_samples(mut self, samples: &'a dyn ExecutionSampleProvider) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn with_options(mut self, options: TreeOptions) -> Self {
        self.options = options;
        self
    }

    /// One source per upstream node of `node_id`, closest first.
    pub fn build_tree(&self, node_id: &str) -> Vec<VariableSource> {
        let upstream = upstream_of(node_id, self.nodes, self.edges);
        tracing::debug!(node = node_id, upstream = upstream.len(), "building variable tree");
        upstream.into_iter().map(|node| self.source_for(node)).collect()
    }

    fn source_for(&self, node: &GraphNode) -> VariableSource {
        let root_path = format!("${}", node.label());
        let schema = static_schema(node, &root_path);
        let sample = self.samples.and_then(|p| p.node_execution(node.id()));

        let children = match sample {
            None => schema,
            Some(sample) => {
                let execution = sample_to_tree(&sample.output, &root_path, &self.options);
                if node.kind().is_pass_through() {
                    // Live data replaces the `context` placeholder outright.
                    execution
                } else {
                    merge_trees(schema, execution)
                }
            }
        };

        VariableSource {
            node_id: node.id().to_string(),
            node_label: node.label().to_string(),
            node_kind: node.kind(),
            root_path,
            children,
        }
    }
}
