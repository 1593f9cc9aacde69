//! Live execution sample → variable tree conversion.
//!
//! Objects contribute one child per key (capped), arrays are described by
//! their first element under a synthetic `[0]` segment, and recursion stops at
//! the configured depth. Overflow is truncated silently.

use serde_json::Value;

use super::types::{TreeOptions, VariableOrigin, VariableTreeNode, VariableType};

/// Children describing `value`, addressed below `path`.
pub fn sample_to_tree(value: &Value, path: &str, options: &TreeOptions) -> Vec<VariableTreeNode> {
    children_of(value, path, 0, options)
}

fn children_of(value: &Value, path: &str, depth: usize, options: &TreeOptions) -> Vec<VariableTreeNode> {
    if depth >= options.max_depth {
        return vec![];
    }
    match value {
        Value::Object(map) => map
            .iter()
            .take(options.max_object_keys)
            .map(|(key, v)| node_for(key, &format!("{}.{}", path, key), v, depth, options))
            .collect(),
        Value::Array(items) => match items.first() {
            Some(first) => vec![node_for("[0]", &format!("{}[0]", path), first, depth, options)],
            None => vec![],
        },
        _ => vec![],
    }
}

fn node_for(key: &str, path: &str, value: &Value, depth: usize, options: &TreeOptions) -> VariableTreeNode {
    let var_type = VariableType::of(value);
    let (sample_value, children) = match value {
        Value::Object(_) | Value::Array(_) => {
            let children = children_of(value, path, depth + 1, options);
            (None, Some(children).filter(|c| !c.is_empty()))
        }
        Value::Null => (None, None),
        primitive => (Some(primitive.clone()), None),
    };
    VariableTreeNode {
        key: key.to_string(),
        path: path.to_string(),
        var_type,
        sample_value,
        children,
        source: VariableOrigin::Execution,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_keys_become_children() {
        let tree = sample_to_tree(&json!({"id": 7, "name": "Ada", "ok": true}), "$Http.body", &TreeOptions::default());
        assert_eq!(tree.len(), 3);
        assert_eq!(tree[0].path, "$Http.body.id");
        assert_eq!(tree[0].var_type, VariableType::Number);
        assert_eq!(tree[1].sample_value, Some(json!("Ada")));
        assert_eq!(tree[2].var_type, VariableType::Boolean);
        assert!(tree.iter().all(|n| n.source == VariableOrigin::Execution));
    }

    #[test]
    fn array_of_objects_uses_first_element() {
        let tree = sample_to_tree(
            &json!({"rows": [{"sku": "a"}, {"sku": "b", "extra": 1}]}),
            "$Db",
            &TreeOptions::default(),
        );
        let rows = &tree[0];
        assert_eq!(rows.var_type, VariableType::Array);
        let first = &rows.children.as_ref().unwrap()[0];
        assert_eq!(first.key, "[0]");
        assert_eq!(first.path, "$Db.rows[0]");
        let sku = first.child("sku").unwrap();
        assert_eq!(sku.path, "$Db.rows[0].sku");
        assert!(first.child("extra").is_none());
    }

    #[test]
    fn array_of_primitives_emits_one_leaf() {
        let tree = sample_to_tree(&json!({"tags": ["x", "y"]}), "$N", &TreeOptions::default());
        let leaf = &tree[0].children.as_ref().unwrap()[0];
        assert_eq!(leaf.path, "$N.tags[0]");
        assert_eq!(leaf.var_type, VariableType::String);
        assert!(leaf.children.is_none());
    }

    #[test]
    fn null_and_empty_have_no_children() {
        let tree = sample_to_tree(&json!({"a": null, "b": [], "c": {}}), "$N", &TreeOptions::default());
        assert_eq!(tree[0].var_type, VariableType::Unknown);
        assert!(tree.iter().all(|n| n.children.is_none()));
        assert!(sample_to_tree(&Value::Null, "$N", &TreeOptions::default()).is_empty());
    }

    #[test]
    fn key_cap_truncates() {
        let mut map = serde_json::Map::new();
        for i in 0..80 {
            map.insert(format!("k{}", i), json!(i));
        }
        let tree = sample_to_tree(&Value::Object(map), "$N", &TreeOptions::default());
        assert_eq!(tree.len(), 50);
        assert_eq!(tree[49].key, "k49");
    }

    #[test]
    fn depth_cap_terminates() {
        let mut value = json!("leaf");
        for _ in 0..20 {
            value = json!({ "next": value });
        }
        let options = TreeOptions::default();
        let mut level = sample_to_tree(&value, "$N", &options);
        let mut depth = 0;
        while let Some(node) = level.first() {
            depth += 1;
            level = node.children.clone().unwrap_or_default();
        }
        assert_eq!(depth, options.max_depth);
    }
}
