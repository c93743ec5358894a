//! JSON object wrapper used for run inputs and outputs.

use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

/// A JSON object passed between workflow steps.
///
/// `Vars` backs the accumulated context of a run: each step's non-display
/// output is folded in, with new keys overwriting existing ones of the
/// same name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Vars(Map<String, Value>);

impl Vars {
    /// Create an empty variable set.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Set a variable, serializing the value to JSON.
    pub fn set<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: T,
    ) {
        if let Ok(v) = serde_json::to_value(value) {
            self.0.insert(key.into(), v);
        }
    }

    /// Get a variable, deserializing it to the requested type.
    pub fn get<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Option<T> {
        self.0.get(key).and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Get the raw JSON value of a variable.
    pub fn get_value(
        &self,
        key: &str,
    ) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn contains_key(
        &self,
        key: &str,
    ) -> bool {
        self.0.contains_key(key)
    }

    /// Merge another variable set into this one. Keys from `other`
    /// overwrite existing keys of the same name.
    pub fn merge(
        &mut self,
        other: &Vars,
    ) {
        for (k, v) in other.0.iter() {
            self.0.insert(k.clone(), v.clone());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> serde_json::map::Iter<'_> {
        self.0.iter()
    }
}

impl From<Value> for Vars {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            _ => Self::new(),
        }
    }
}

impl From<Map<String, Value>> for Vars {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl From<Vars> for Value {
    fn from(vars: Vars) -> Self {
        Value::Object(vars.0)
    }
}
