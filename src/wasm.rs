//! WASM entry points for browser use.
//!
//! Each export is a thin wrapper over an `_inner` function returning plain
//! serde types, so the logic is testable without a JS host.

use std::collections::HashMap;

use serde::Serialize;
use serde_json::Value;
use wasm_bindgen::prelude::*;

use crate::blueprint::{self, Blueprint};
use crate::error::CompilerError;
use crate::graph::{self, Graph};
use crate::reference::{self, Segment};
use crate::schema::{VariableSource, VariableTreeBuilder};

/// Serialize with plain JS objects for maps, so the result matches the JSON
/// shape the editor stores.
fn to_js<T: Serialize>(value: &T) -> JsValue {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .unwrap_or(JsValue::NULL)
}

/// Full pipeline: parse → validate → compile.
/// Returns `{status: "success", result, warnings}` or `{status: "errors", errors}`.
/// Validation findings are reported as warnings; only parse failures and
/// missing credentials block compilation.
#[wasm_bindgen]
pub fn compile_workflow(json: &str) -> JsValue {
    to_js(&compile_workflow_inner(json))
}

fn compile_workflow_inner(json: &str) -> Outcome<Blueprint> {
    // 1. Parse
    let workflow = match graph::parse(json) {
        Ok(w) => w,
        Err(errors) => return Outcome::errors(errors),
    };

    // 2. Graph validation
    let warnings = crate::validate::validate_graph(&workflow);
    if !warnings.is_empty() {
        tracing::debug!(count = warnings.len(), "compiling with validation warnings");
    }

    // 3. Compile
    match blueprint::to_blueprint(&workflow.nodes, &workflow.edges) {
        Ok(blueprint) => Outcome::Success {
            value: blueprint,
            warnings: warnings.into_iter().map(ErrorDto::from).collect(),
        },
        Err(e) => Outcome::errors(e.into_diagnostics()),
    }
}

/// Validate a workflow JSON: parse + graph validation.
/// Returns a JSON array of CompilerError objects.
#[wasm_bindgen]
pub fn validate_workflow(json: &str) -> JsValue {
    to_js(&validate_workflow_inner(json))
}

fn validate_workflow_inner(json: &str) -> Vec<ErrorDto> {
    let errors = match graph::parse(json) {
        Ok(workflow) => crate::validate::validate_graph(&workflow),
        Err(errors) => errors,
    };
    errors.into_iter().map(ErrorDto::from).collect()
}

/// Blueprint JSON back into the editor graph.
#[wasm_bindgen]
pub fn decompile_blueprint(json: &str) -> JsValue {
    to_js(&decompile_blueprint_inner(json))
}

fn decompile_blueprint_inner(json: &str) -> Outcome<Graph> {
    match blueprint::parse_blueprint(json) {
        Ok(bp) => Outcome::success(blueprint::to_graph(&bp)),
        Err(errors) => Outcome::errors(errors),
    }
}

/// Variable sources available to `node_id`. `samples_json` maps node ids to
/// their last output; pass an empty string when there are none.
#[wasm_bindgen]
pub fn upstream_variables(graph_json: &str, node_id: &str, samples_json: &str) -> JsValue {
    to_js(&upstream_variables_inner(graph_json, node_id, samples_json))
}

fn upstream_variables_inner(graph_json: &str, node_id: &str, samples_json: &str) -> Outcome<Vec<VariableSource>> {
    let workflow = match graph::parse(graph_json) {
        Ok(w) => w,
        Err(errors) => return Outcome::errors(errors),
    };

    let samples: HashMap<String, Value> = if samples_json.trim().is_empty() {
        HashMap::new()
    } else {
        match serde_json::from_str(samples_json) {
            Ok(s) => s,
            Err(e) => {
                return Outcome::errors(vec![CompilerError::parse(
                    "P003",
                    format!("Failed to parse execution samples JSON: {}", e),
                )]);
            }
        }
    };

    let sources = VariableTreeBuilder::new(&workflow.nodes, &workflow.edges)
        .with_samples(&samples)
        .build_tree(node_id);
    Outcome::success(sources)
}

/// Split a raw field value into text and variable segments.
#[wasm_bindgen]
pub fn segment_value(raw: &str) -> JsValue {
    to_js(&segment_value_inner(raw))
}

fn segment_value_inner(raw: &str) -> Vec<Segment> {
    reference::segment_value(raw)
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(Debug, serde::Serialize, serde::Deserialize)]
struct ErrorDto {
    code: String,
    phase: String,
    message: String,
    node_id: Option<String>,
}

impl From<CompilerError> for ErrorDto {
    fn from(e: CompilerError) -> Self {
        ErrorDto {
            code: e.code,
            phase: e.phase.to_string(),
            message: e.message,
            node_id: e.node_id,
        }
    }
}

#[derive(Debug, serde::Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
enum Outcome<T> {
    Success {
        #[serde(rename = "result")]
        value: T,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        warnings: Vec<ErrorDto>,
    },
    Errors {
        errors: Vec<ErrorDto>,
    },
}

impl<T> Outcome<T> {
    fn success(value: T) -> Self {
        Outcome::Success {
            value,
            warnings: Vec::new(),
        }
    }

    fn errors(errors: Vec<CompilerError>) -> Self {
        Outcome::Errors {
            errors: errors.into_iter().map(ErrorDto::from).collect(),
        }
    }
}
