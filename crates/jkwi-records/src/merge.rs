//! # Deep Right-Biased Merge
//!
//! ```text
//! {"a": {"b": 1, "c": 2}, "skills": ["x", "y"]}
//!   + {"a": {"b": 9}, "skills": ["z"]}
//!   = {"a": {"b": 9, "c": 2}, "skills": ["z"]}
//! ```
//!
//! Objects on both sides merge key by key. Anything else in the update
//! (arrays, strings, numbers, booleans, null) replaces the original value
//! wholesale. Keys absent from the update are left untouched.

use serde_json::Value;

/// Merge `update` into a copy of `original`.
pub fn merge(original: &Value, update: &Value) -> Value {
    let mut merged = original.clone();
    merge_in_place(&mut merged, update);
    merged
}

/// Merge `update` into `target`.
pub fn merge_in_place(target: &mut Value, update: &Value) {
    match (target, update) {
        (Value::Object(target), Value::Object(update)) => {
            for (key, value) in update {
                let recurse = value.is_object() && target.get(key).is_some_and(Value::is_object);
                if !recurse {
                    target.insert(key.clone(), value.clone());
                } else if let Some(existing) = target.get_mut(key) {
                    merge_in_place(existing, value);
                }
            }
        }
        (target, update) => *target = update.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn nested_objects_merge() {
        let merged = merge(&json!({"a": {"b": 1, "c": 2}}), &json!({"a": {"b": 9}}));
        assert_eq!(merged, json!({"a": {"b": 9, "c": 2}}));
    }

    #[test]
    fn arrays_replace_wholesale() {
        let merged = merge(&json!({"skills": ["x", "y"]}), &json!({"skills": ["z"]}));
        assert_eq!(merged, json!({"skills": ["z"]}));
    }

    #[test]
    fn new_keys_inserted_and_absent_keys_kept() {
        let merged = merge(&json!({"keep": 1}), &json!({"add": {"x": true}}));
        assert_eq!(merged, json!({"keep": 1, "add": {"x": true}}));
    }

    #[test]
    fn object_over_scalar_replaces() {
        let merged = merge(&json!({"notes": ""}), &json!({"notes": {"text": "hi"}}));
        assert_eq!(merged, json!({"notes": {"text": "hi"}}));
        let merged = merge(&json!({"a": {"b": 1}}), &json!({"a": null}));
        assert_eq!(merged, json!({"a": null}));
    }

    #[test]
    fn original_untouched() {
        let original = json!({"a": {"b": 1}});
        let _ = merge(&original, &json!({"a": {"b": 2}}));
        assert_eq!(original, json!({"a": {"b": 1}}));
    }

    fn arb_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i32>().prop_map(|n| json!(n)),
            "[a-z]{0,6}".prop_map(Value::String),
        ];
        leaf.prop_recursive(3, 24, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..3).prop_map(Value::Array),
                prop::collection::btree_map("[a-d]", inner, 0..4)
                    .prop_map(|m| Value::Object(m.into_iter().collect())),
            ]
        })
    }

    fn arb_object() -> impl Strategy<Value = Value> {
        prop::collection::btree_map("[a-f]", arb_json(), 0..5)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    }

    proptest! {
        #[test]
        fn merge_is_idempotent(record in arb_object(), update in arb_object()) {
            let once = merge(&record, &update);
            let twice = merge(&once, &update);
            prop_assert_eq!(twice, once);
        }

        #[test]
        fn keys_absent_from_update_preserved(record in arb_object(), update in arb_object()) {
            let merged = merge(&record, &update);
            let (Value::Object(r), Value::Object(u), Value::Object(m)) = (&record, &update, &merged) else {
                unreachable!("strategies only produce objects");
            };
            for (key, value) in r {
                if !u.contains_key(key) {
                    prop_assert_eq!(m.get(key), Some(value));
                }
            }
        }

        #[test]
        fn update_scalars_always_win(record in arb_object(), update in arb_object()) {
            let merged = merge(&record, &update);
            if let Value::Object(u) = &update {
                for (key, value) in u {
                    if !value.is_object() {
                        prop_assert_eq!(&merged[key], value);
                    }
                }
            }
        }
    }
}
