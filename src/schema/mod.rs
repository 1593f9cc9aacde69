//! Output schema catalog and variable tree building.
//!
//! Editors offer `$node.field` suggestions from two sources: what each node
//! kind is documented to emit (before a workflow ever runs) and what it
//! actually emitted in the last execution. Both are kept.

pub mod builder;
pub mod catalog;
pub mod merge;
pub mod sample;
pub mod types;

pub use builder::{ExecutionSample, ExecutionSampleProvider, VariableTreeBuilder};
pub use catalog::static_schema;
pub use merge::merge_trees;
pub use sample::sample_to_tree;
pub use types::*;
