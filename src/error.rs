//! Unified diagnostic type used across all phases, plus the typed compile error.

use serde::{Deserialize, Serialize};

use crate::blueprint::types::CanonicalType;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Parse,
    Validate,
    Compile,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Parse => write!(f, "Parse"),
            Phase::Validate => write!(f, "Validate"),
            Phase::Compile => write!(f, "Compile"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerError {
    pub code: String,
    pub phase: Phase,
    pub message: String,
    pub node_id: Option<String>,
}

impl std::fmt::Display for CompilerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.node_id {
            Some(id) => write!(
                f,
                "[{}:{}] {} (node '{}')",
                self.phase, self.code, self.message, id
            ),
            None => write!(f, "[{}:{}] {}", self.phase, self.code, self.message),
        }
    }
}

impl std::error::Error for CompilerError {}

impl CompilerError {
    pub fn parse(code: &str, message: impl Into<String>) -> Self {
        CompilerError {
            code: code.into(),
            phase: Phase::Parse,
            message: message.into(),
            node_id: None,
        }
    }

    pub fn validate(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        CompilerError {
            code: code.into(),
            phase: Phase::Validate,
            message: message.into(),
            node_id,
        }
    }

    pub fn compile(code: &str, message: impl Into<String>, node_id: Option<String>) -> Self {
        CompilerError {
            code: code.into(),
            phase: Phase::Compile,
            message: message.into(),
            node_id,
        }
    }
}

/// A node whose kind needs a credential but has none attached.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MissingCredential {
    pub node_id: String,
    pub node_type: CanonicalType,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    /// Every offending node, in graph order.
    #[error("missing credentials on {} node(s): {}", .0.len(), list_missing(.0))]
    MissingCredentials(Vec<MissingCredential>),
}

fn list_missing(missing: &[MissingCredential]) -> String {
    missing
        .iter()
        .map(|m| format!("{} ({})", m.node_id, m.node_type))
        .collect::<Vec<_>>()
        .join(", ")
}

impl CompileError {
    /// One `C001` diagnostic per offending node.
    pub fn into_diagnostics(self) -> Vec<CompilerError> {
        match self {
            CompileError::MissingCredentials(missing) => missing
                .into_iter()
                .map(|m| {
                    CompilerError::compile(
                        "C001",
                        format!("Node of type '{}' requires credentials", m.node_type),
                        Some(m.node_id),
                    )
                })
                .collect(),
        }
    }
}
