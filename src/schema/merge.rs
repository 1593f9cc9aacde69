//! Merging static schema trees with execution-derived trees.

use super::types::VariableTreeNode;

/// Merge `schema` and `execution` siblings by key.
///
/// Execution nodes come first and win on conflicts, but recursively keep
/// schema-only descendants the sample did not populate. Schema-only keys are
/// appended after the execution nodes.
pub fn merge_trees(schema: Vec<VariableTreeNode>, execution: Vec<VariableTreeNode>) -> Vec<VariableTreeNode> {
    let mut schema: Vec<Option<VariableTreeNode>> = schema.into_iter().map(Some).collect();
    let mut merged = Vec::with_capacity(execution.len() + schema.len());

    for mut exec in execution {
        let matching = schema
            .iter_mut()
            .find(|s| s.as_ref().is_some_and(|s| s.key == exec.key))
            .and_then(Option::take);
        if let Some(static_node) = matching {
            exec.children = match (static_node.children, exec.children.take()) {
                (None, None) => None,
                (s, e) => Some(merge_trees(s.unwrap_or_default(), e.unwrap_or_default())),
            };
        }
        merged.push(exec);
    }

    merged.extend(schema.into_iter().flatten());
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::*;

    fn exec(key: &str, path: &str, var_type: VariableType, children: Option<Vec<VariableTreeNode>>) -> VariableTreeNode {
        VariableTreeNode {
            key: key.into(),
            path: path.into(),
            var_type,
            sample_value: None,
            children,
            source: VariableOrigin::Execution,
        }
    }

    #[test]
    fn execution_wins_and_keeps_children() {
        let schema = vec![VariableTreeNode::schema("body", "$Http", VariableType::Object)];
        let execution = vec![exec(
            "body",
            "$Http.body",
            VariableType::Object,
            Some(vec![exec("id", "$Http.body.id", VariableType::Number, None)]),
        )];
        let merged = merge_trees(schema, execution);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].source, VariableOrigin::Execution);
        assert!(merged[0].child("id").is_some());
    }

    #[test]
    fn schema_only_descendants_survive() {
        let mut body = VariableTreeNode::schema("body", "$Http", VariableType::Object);
        body.children = Some(vec![
            VariableTreeNode::schema("id", "$Http.body", VariableType::Number),
            VariableTreeNode::schema("nickname", "$Http.body", VariableType::String),
        ]);
        let execution = vec![exec(
            "body",
            "$Http.body",
            VariableType::Object,
            Some(vec![exec("id", "$Http.body.id", VariableType::Number, None)]),
        )];
        let merged = merge_trees(vec![body], execution);
        let children = merged[0].children.as_ref().unwrap();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].source, VariableOrigin::Execution);
        assert_eq!(children[1].key, "nickname");
        assert_eq!(children[1].source, VariableOrigin::Schema);
    }

    #[test]
    fn schema_only_keys_are_appended() {
        let schema = vec![
            VariableTreeNode::schema("status", "$Http", VariableType::Number),
            VariableTreeNode::schema("headers", "$Http", VariableType::Object),
        ];
        let execution = vec![exec("status", "$Http.status", VariableType::Number, None)];
        let merged = merge_trees(schema, execution);
        let keys: Vec<&str> = merged.iter().map(|n| n.key.as_str()).collect();
        assert_eq!(keys, vec!["status", "headers"]);
        assert_eq!(merged[0].source, VariableOrigin::Execution);
    }
}
