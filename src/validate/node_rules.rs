//! Per-node configuration validation.
//! Match arms here must track `GraphNode` in `graph/types.rs`.

use crate::error::CompilerError;
use crate::graph::types::*;

const VALID_METHODS: [&str; 7] = ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD", "OPTIONS"];

/// Validate a single node's config. Returns all errors found.
pub fn validate_node_config(node: &GraphNode) -> Vec<CompilerError> {
    let mut errors = Vec::new();
    let node_id = Some(node.id().to_string());

    match node {
        GraphNode::ManualTrigger(_) | GraphNode::Aggregator(_) | GraphNode::Merge(_) => {}
        GraphNode::ScheduleTrigger(n) => {
            if n.data.config.cron.trim().is_empty() {
                errors.push(CompilerError::validate(
                    "N001",
                    "Schedule trigger cron expression must not be empty",
                    node_id,
                ));
            }
        }
        GraphNode::Http(n) => {
            if n.data.config.url.trim().is_empty() {
                errors.push(CompilerError::validate(
                    "N002",
                    "HTTP request URL must not be empty",
                    node_id.clone(),
                ));
            }
            let method = n.data.config.method.trim().to_ascii_uppercase();
            if !VALID_METHODS.contains(&method.as_str()) {
                errors.push(CompilerError::validate(
                    "N002",
                    format!("Invalid HTTP method '{}'", n.data.config.method),
                    node_id,
                ));
            }
        }
        GraphNode::Conditional(n) => {
            if n.data.config.expression.trim().is_empty() {
                errors.push(CompilerError::validate(
                    "N003",
                    "Conditional expression must not be empty",
                    node_id,
                ));
            }
        }
        GraphNode::Switch(n) => {
            if n.data.config.rules.is_empty() {
                errors.push(CompilerError::validate(
                    "N004",
                    "Switch must have at least one rule",
                    node_id.clone(),
                ));
            }
            for (i, rule) in n.data.config.rules.iter().enumerate() {
                if rule.expression.trim().is_empty() {
                    errors.push(CompilerError::validate(
                        "N004",
                        format!("Switch rule {} expression must not be empty", i),
                        node_id.clone(),
                    ));
                }
            }
        }
        GraphNode::Email(n) => {
            if n.data.config.to.split(',').all(|r| r.trim().is_empty()) {
                errors.push(CompilerError::validate(
                    "N005",
                    "Email must have at least one recipient",
                    node_id,
                ));
            }
        }
        GraphNode::Agent(n) => {
            if n.data.config.model.trim().is_empty() {
                errors.push(CompilerError::validate(
                    "N006",
                    "Agent model must not be empty",
                    node_id.clone(),
                ));
            }
            if n.data.config.prompt.trim().is_empty() {
                errors.push(CompilerError::validate(
                    "N006",
                    "Agent prompt must not be empty",
                    node_id,
                ));
            }
        }
        GraphNode::Wait(n) => {
            if n.data.config.amount == 0 {
                errors.push(CompilerError::validate(
                    "N009",
                    "Wait amount must be greater than zero",
                    node_id,
                ));
            }
        }
        GraphNode::Edit(n) => {
            for (i, assignment) in n.data.config.assignments.iter().enumerate() {
                if assignment.name.trim().is_empty() {
                    errors.push(CompilerError::validate(
                        "N007",
                        format!("Edit assignment {} must have a name", i),
                        node_id.clone(),
                    ));
                }
            }
        }
        GraphNode::Split(n) => {
            if n.data.config.field.trim().is_empty() {
                errors.push(CompilerError::validate(
                    "N008",
                    "Split field must not be empty",
                    node_id,
                ));
            }
        }
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(node: &GraphNode) -> Vec<String> {
        validate_node_config(node).into_iter().map(|e| e.code).collect()
    }

    #[test]
    fn http_method_is_case_insensitive() {
        let node = GraphNode::Http(NodeBase::new(
            "h",
            "Http",
            HttpConfig {
                method: "post".into(),
                url: "https://api.dev".into(),
                ..Default::default()
            },
        ));
        assert!(codes(&node).is_empty());
    }

    #[test]
    fn empty_http_reports_url_and_method() {
        let node = GraphNode::Http(NodeBase::new("h", "Http", HttpConfig::default()));
        assert_eq!(codes(&node), vec!["N002", "N002"]);
    }

    #[test]
    fn email_recipients_blank_list() {
        let node = GraphNode::Email(NodeBase::new(
            "m",
            "Mail",
            EmailConfig {
                to: " , ".into(),
                ..Default::default()
            },
        ));
        assert_eq!(codes(&node), vec!["N005"]);
    }

    #[test]
    fn switch_rules() {
        let node = GraphNode::Switch(NodeBase::new("s", "Route", SwitchConfig::default()));
        assert_eq!(codes(&node), vec!["N004"]);

        let node = GraphNode::Switch(NodeBase::new(
            "s",
            "Route",
            SwitchConfig {
                rules: vec![
                    SwitchRule {
                        expression: "x > 1".into(),
                        label: None,
                    },
                    SwitchRule::default(),
                ],
            },
        ));
        let errors = validate_node_config(&node);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("rule 1"));
    }

    #[test]
    fn zero_wait() {
        let node = GraphNode::Wait(NodeBase::new("w", "Pause", WaitConfig::default()));
        assert_eq!(codes(&node), vec!["N009"]);
    }
}
