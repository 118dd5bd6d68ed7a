//! Resource records
//!
//! Decoded API responses stay as `serde_json::Value` (objects keep their key
//! order). This module holds the dotted-path helpers shared by the filter
//! engine, the parameter resolver and the output layer.

use serde_json::{Map, Value};

/// Look up a value using a dot-notation path (`nested.field.0.name`).
///
/// Numeric segments index arrays. An empty path returns the value itself.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }

    let mut current = value;
    for part in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(arr) => arr.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Set a value at a dotted path, creating intermediate objects.
///
/// A non-object found on the way is replaced by an object.
pub fn insert_path(target: &mut Map<String, Value>, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            target.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(Map::new());
            }
            if let Value::Object(child) = entry {
                insert_path(child, rest, value);
            }
        }
    }
}

/// Merge `overlay` into `base`: objects merge key by key, anything else replaces.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Render a scalar for a table cell
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_nested_and_indexed() {
        let record = json!({
            "name": "lb-1",
            "flavor": {"name": "small", "capabilities": [{"name": "resize"}]}
        });
        assert_eq!(lookup(&record, "flavor.name"), Some(&json!("small")));
        assert_eq!(
            lookup(&record, "flavor.capabilities.0.name"),
            Some(&json!("resize"))
        );
        assert_eq!(lookup(&record, "flavor.missing"), None);
        assert_eq!(lookup(&record, "name.deeper"), None);
        assert_eq!(lookup(&record, ""), Some(&record));
    }

    #[test]
    fn test_insert_path_builds_nested_objects() {
        let mut map = Map::new();
        insert_path(&mut map, "targetSpec.name", json!("rancher"));
        insert_path(&mut map, "targetSpec.plan", json!("STANDARD"));
        insert_path(&mut map, "description", json!("d"));
        assert_eq!(
            Value::Object(map),
            json!({"targetSpec": {"name": "rancher", "plan": "STANDARD"}, "description": "d"})
        );
    }

    #[test]
    fn test_deep_merge_overlay_wins() {
        let mut base = json!({"a": 1, "nested": {"x": 1, "y": 2}, "list": [1, 2]});
        deep_merge(&mut base, json!({"nested": {"y": 3}, "list": [9], "b": true}));
        assert_eq!(
            base,
            json!({"a": 1, "nested": {"x": 1, "y": 3}, "list": [9], "b": true})
        );
    }
}
