//! Graph ↔ Blueprint translation.
//!
//! `compile::to_blueprint` derives the engine-facing blueprint from the visual
//! graph; `decompile::to_graph` is its inverse. `toGraph(toBlueprint(g))`
//! reproduces `g` except for edge style hints and labels the editor would
//! have derived anyway.

pub mod compile;
pub mod decompile;
pub mod types;

pub use compile::to_blueprint;
pub use decompile::to_graph;
pub use types::*;

use crate::error::CompilerError;

/// Deserialize a blueprint JSON string.
pub fn parse_blueprint(json: &str) -> Result<Blueprint, Vec<CompilerError>> {
    serde_json::from_str::<Blueprint>(json).map_err(|e| {
        vec![CompilerError::parse(
            "P002",
            format!("Failed to parse blueprint JSON: {}", e),
        )]
    })
}
