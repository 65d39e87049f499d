//! JSON deep merge used by state patches.

use serde_json::Value;

/// Merge `patch` into `target`.
///
/// - object into object: merge key by key, recursively
/// - anything else (arrays, scalars, `null`): replace wholesale
///
/// ```
/// use serde_json::json;
/// use tabletop_engine::debug::deep_merge;
///
/// let mut core = json!({ "hp": [20, 20], "flags": { "a": true, "b": false } });
/// deep_merge(&mut core, &json!({ "hp": [5], "flags": { "b": true } }));
///
/// assert_eq!(core, json!({ "hp": [5], "flags": { "a": true, "b": true } }));
/// ```
pub fn deep_merge(target: &mut Value, patch: &Value) {
    match (target, patch) {
        (Value::Object(target), Value::Object(patch)) => {
            for (key, value) in patch {
                match target.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target, patch) => *target = patch.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_objects_merge() {
        let mut target = json!({ "a": { "b": 1, "c": { "d": 2 } }, "keep": 0 });
        deep_merge(&mut target, &json!({ "a": { "c": { "e": 3 } } }));

        assert_eq!(target, json!({ "a": { "b": 1, "c": { "d": 2, "e": 3 } }, "keep": 0 }));
    }

    #[test]
    fn test_arrays_replace() {
        let mut target = json!({ "list": [1, 2, 3] });
        deep_merge(&mut target, &json!({ "list": [{ "x": 1 }] }));

        assert_eq!(target, json!({ "list": [{ "x": 1 }] }));
    }

    #[test]
    fn test_null_and_scalars_replace() {
        let mut target = json!({ "a": { "b": 1 }, "n": 5 });
        deep_merge(&mut target, &json!({ "a": null, "n": "five" }));

        assert_eq!(target, json!({ "a": null, "n": "five" }));
    }

    #[test]
    fn test_object_replaces_scalar() {
        let mut target = json!({ "a": 1 });
        deep_merge(&mut target, &json!({ "a": { "b": 2 } }));

        assert_eq!(target, json!({ "a": { "b": 2 } }));
    }

    #[test]
    fn test_new_keys_added() {
        let mut target = json!({});
        deep_merge(&mut target, &json!({ "fresh": [1] }));

        assert_eq!(target, json!({ "fresh": [1] }));
    }
}
