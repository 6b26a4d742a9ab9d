//! Deep merge for layered configuration values.
//!
//! Higher tiers override lower tiers field by field. Arrays (such as
//! `input.packs`) are replaced entirely, never concatenated.

use serde_json::Value;

/// Deep merge two JSON values, with `overlay` taking precedence over `base`.
///
/// - Objects are merged recursively: keys in overlay override keys in base
/// - Arrays, strings, numbers, booleans are replaced entirely
/// - A null overlay keeps the base value (null means "not specified")
///
/// # Example
/// ```
/// use serde_json::json;
/// use pack_merger::config::deep_merge;
///
/// let base = json!({ "outDir": "out", "input": { "dir": "packs" } });
/// let overlay = json!({ "outDir": "merged" });
/// let result = deep_merge(base, overlay);
/// assert_eq!(result, json!({ "outDir": "merged", "input": { "dir": "packs" } }));
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged_value = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged_value);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Fold [`deep_merge`] over tiers given lowest priority first.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_overlay_keeps_untouched_fields() {
        let base = json!({"outDir": "out", "duplicateIdentifierWarnings": true});
        let overlay = json!({"duplicateIdentifierWarnings": false});
        assert_eq!(
            deep_merge(base, overlay),
            json!({"outDir": "out", "duplicateIdentifierWarnings": false})
        );
    }

    #[test]
    fn test_pack_lists_are_replaced() {
        let base = json!({"input": {"packs": ["a.mcaddon", "b.mcaddon"]}});
        let overlay = json!({"input": {"packs": ["c.mcaddon"]}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({"input": {"packs": ["c.mcaddon"]}})
        );
    }

    #[test]
    fn test_nested_input_merges_by_field() {
        let base = json!({"input": {"dir": "packs"}});
        let overlay = json!({"input": {"packs": ["a.mcpack"]}});
        assert_eq!(
            deep_merge(base, overlay),
            json!({"input": {"dir": "packs", "packs": ["a.mcpack"]}})
        );
    }

    #[test]
    fn test_null_preserves_base() {
        let base = json!({"outDir": "out"});
        let overlay = json!({"outDir": null});
        assert_eq!(deep_merge(base, overlay), json!({"outDir": "out"}));
    }

    #[test]
    fn test_merge_all_in_priority_order() {
        let tiers = vec![
            json!({"outDir": "default"}),
            json!({"outDir": "user", "input": {"dir": "a"}}),
            json!({"outDir": "project"}),
        ];
        assert_eq!(
            deep_merge_all(tiers),
            json!({"outDir": "project", "input": {"dir": "a"}})
        );
    }
}
