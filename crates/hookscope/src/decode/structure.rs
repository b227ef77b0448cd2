//! Structural decoding of raw JSON trees onto serde-described records.

use std::ops::Deref;

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::DecodeError;

/// Decodes `value` into `T`, naming the failing field path on error.
///
/// Absent optional fields come back empty; mismatched shapes surface as
/// [`DecodeError::Structure`].
pub fn decode_record<T: DeserializeOwned>(value: &Value) -> Result<T, DecodeError> {
    serde_path_to_error::deserialize(value).map_err(DecodeError::from)
}

/// Decodes the value stored under `key`, reporting failures relative to that key.
///
/// Missing and `null` children yield `Ok(None)`.
pub fn decode_child<T: DeserializeOwned>(value: &Value, key: &str) -> Result<Option<T>, DecodeError> {
    match value.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(child) => decode_record(child)
            .map(Some)
            .map_err(|error| error.within(key)),
    }
}

/// Decodes `value` and keeps the tree it came from.
pub fn decode_retained<T: DeserializeOwned>(value: &Value) -> Result<Decoded<T>, DecodeError> {
    let decoded = decode_record(value)?;
    Ok(Decoded::new(decoded, value.clone()))
}

/// A decoded record paired with its source tree, so it can be decoded again as
/// another shape without going back to bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    value: T,
    raw: Value,
}

impl<T> Decoded<T> {
    #[must_use]
    pub fn new(value: T, raw: Value) -> Self {
        Self { value, raw }
    }

    #[must_use]
    pub fn value(&self) -> &T {
        &self.value
    }

    #[must_use]
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    #[must_use]
    pub fn into_parts(self) -> (T, Value) {
        (self.value, self.raw)
    }

    /// Runs the structural decoder again over the retained tree.
    pub fn redecode<U: DeserializeOwned>(&self) -> Result<U, DecodeError> {
        decode_record(&self.raw)
    }
}

impl<T> Deref for Decoded<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.value
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::{Decoded, decode_child, decode_record, decode_retained};
    use crate::decode::DecodeError;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Outer {
        name: Option<String>,
        #[serde(default)]
        tags: Vec<String>,
        inner: Option<Inner>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Inner {
        #[serde(default)]
        ids: Vec<u32>,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct NameOnly {
        name: Option<String>,
    }

    #[test]
    fn missing_keys_decode_as_empty_values() {
        let outer: Outer = decode_record(&json!({})).expect("empty object should decode");
        assert_eq!(
            outer,
            Outer {
                name: None,
                tags: Vec::new(),
                inner: None,
            }
        );
    }

    #[test]
    fn structural_mismatch_names_the_nested_path() {
        let error = decode_record::<Outer>(&json!({"inner": {"ids": [1, "two"]}}))
            .expect_err("string inside integer array must fail");

        match error {
            DecodeError::Structure { path, message } => {
                assert_eq!(path, "inner.ids[1]");
                assert!(message.contains("invalid type: string"), "{message}");
            }
            other => panic!("expected structure error, got {other:?}"),
        }
    }

    #[test]
    fn child_errors_are_relative_to_the_key() {
        let error = decode_child::<Inner>(&json!({"delivery": {"ids": "x"}}), "delivery")
            .expect_err("scalar in place of array must fail");

        match error {
            DecodeError::Structure { path, .. } => assert_eq!(path, "delivery.ids"),
            other => panic!("expected structure error, got {other:?}"),
        }

        let absent = decode_child::<Inner>(&json!({"delivery": null}), "delivery")
            .expect("null child is absent");
        assert!(absent.is_none());
    }

    #[test]
    fn retained_tree_supports_redecoding_as_another_shape() {
        let raw = json!({"name": "page", "tags": ["a"]});
        let decoded: Decoded<Outer> = decode_retained(&raw).expect("outer should decode");

        assert_eq!(decoded.raw(), &raw);
        assert_eq!(decoded.tags, vec!["a".to_string()]);

        let narrowed: NameOnly = decoded.redecode().expect("narrower shape should decode");
        assert_eq!(narrowed.name.as_deref(), Some("page"));
        assert_eq!(decoded.value().name.as_deref(), Some("page"));
    }
}
