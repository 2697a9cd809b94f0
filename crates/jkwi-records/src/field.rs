//! # Dotted Field Paths
//!
//! Records are JSON trees; configuration and search queries address fields
//! inside them with dotted paths such as `member_info.member_id`.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::RecordError;

/// A non-empty sequence of object keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    /// Parse `a.b.c`. Empty segments are rejected.
    pub fn parse(path: &str) -> Result<Self, RecordError> {
        let segments: Vec<String> = path.split('.').map(str::to_string).collect();
        if segments.iter().any(|s| s.is_empty()) {
            return Err(RecordError::InvalidUpdate(format!(
                "invalid field path \"{path}\""
            )));
        }
        Ok(Self(segments))
    }

    /// Build from known-good literal segments.
    pub(crate) fn of(segments: &[&str]) -> Self {
        Self(segments.iter().map(|s| s.to_string()).collect())
    }

    /// A path to a field next to this one: `a.b` with `c` gives `a.c`.
    pub fn sibling(&self, name: &str) -> Self {
        let mut segments = self.0.clone();
        segments.pop();
        segments.push(name.to_string());
        Self(segments)
    }

    /// The value at this path, if every step is an object holding the key.
    pub fn get<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.0
            .iter()
            .try_fold(value, |current, key| current.as_object()?.get(key))
    }

    /// The string at this path, if present and a string.
    pub fn get_str<'a>(&self, value: &'a Value) -> Option<&'a str> {
        self.get(value).and_then(Value::as_str)
    }

    /// Set the value at this path, creating intermediate objects.
    ///
    /// Non-object values in the way are replaced by objects.
    pub fn set(&self, target: &mut Value, new_value: Value) {
        set_in(target, &self.0, new_value);
    }

    /// Build a fresh object holding `value` at this path.
    pub fn to_object(&self, value: Value) -> Value {
        let mut object = Value::Object(Map::new());
        self.set(&mut object, value);
        object
    }
}

fn set_in(target: &mut Value, keys: &[String], new_value: Value) {
    let Some((first, rest)) = keys.split_first() else {
        *target = new_value;
        return;
    };
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    if let Value::Object(map) = target {
        let slot = map.entry(first.clone()).or_insert(Value::Null);
        set_in(slot, rest, new_value);
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("."))
    }
}

impl TryFrom<String> for FieldPath {
    type Error = RecordError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<FieldPath> for String {
    fn from(path: FieldPath) -> Self {
        path.to_string()
    }
}
