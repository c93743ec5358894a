//! JSON-Schema-shaped documents.
//!
//! Schemas are modeled as structured values throughout the core and only
//! serialized to text at the persistence boundary. Only the JSON Schema
//! subset the engine reads is interpreted (`type`, `items`, `properties`,
//! `required`, `description`, `displayOnly`); everything else is carried
//! through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::{AgentflowError, Result};

/// A JSON-Schema-shaped document describing a node contract.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SchemaDoc(Map<String, Value>);

impl SchemaDoc {
    /// The empty schema `{}`.
    pub fn empty() -> Self {
        Self(Map::new())
    }

    /// Parse a schema from text.
    ///
    /// An empty or whitespace-only string parses as `{}`. A JSON object
    /// carrying a `properties` object is taken as-is; any other JSON
    /// object is treated as a bare properties map. Non-object JSON is
    /// rejected.
    pub fn parse(text: &str) -> Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::empty());
        }

        let value: Value = serde_json::from_str(text).map_err(|e| AgentflowError::Schema(format!("invalid schema text: {}", e)))?;
        Self::from_value(value)
    }

    /// Build a schema from an already-parsed JSON value, applying the same
    /// bare-properties-map tolerance as [`SchemaDoc::parse`].
    pub fn from_value(value: Value) -> Result<Self> {
        let Value::Object(map) = value else {
            return Err(AgentflowError::Schema(format!("schema must be a JSON object, got {}", value)));
        };

        if map.is_empty() || map.get("properties").is_some_and(Value::is_object) {
            return Ok(Self(map));
        }

        // A raw map of property definitions.
        let mut doc = Map::new();
        doc.insert("properties".to_string(), Value::Object(map));
        Ok(Self(doc))
    }

    /// Canonical pretty-printed serialization. Formatting already
    /// formatted text yields the same text.
    pub fn format(&self) -> String {
        serde_json::to_string_pretty(&Value::Object(self.0.clone())).unwrap_or_else(|_| "{}".to_string())
    }

    /// Whether this schema declares no properties.
    pub fn is_empty(&self) -> bool {
        self.properties().is_empty()
    }

    /// The `properties` map, empty if absent.
    pub fn properties(&self) -> &Map<String, Value> {
        static EMPTY: std::sync::OnceLock<Map<String, Value>> = std::sync::OnceLock::new();
        match self.0.get("properties") {
            Some(Value::Object(map)) => map,
            _ => EMPTY.get_or_init(Map::new),
        }
    }

    /// Property names in document order.
    pub fn property_names(&self) -> Vec<String> {
        self.properties().keys().cloned().collect()
    }

    /// Look up a single property definition.
    pub fn property(
        &self,
        name: &str,
    ) -> Option<&Value> {
        self.properties().get(name)
    }

    /// Whether a property carries the `displayOnly: true` marker, meaning
    /// it is shown to the user at its step but never passed downstream.
    pub fn is_display_only(
        &self,
        name: &str,
    ) -> bool {
        self.property(name).and_then(|p| p.get("displayOnly")).and_then(Value::as_bool).unwrap_or(false)
    }

    /// The `required` list, empty if absent.
    pub fn required(&self) -> Vec<String> {
        match self.0.get("required") {
            Some(Value::Array(items)) => items.iter().filter_map(|v| v.as_str().map(str::to_string)).collect(),
            _ => Vec::new(),
        }
    }

    /// Insert or replace a property definition.
    pub fn set_property(
        &mut self,
        name: impl Into<String>,
        definition: Value,
    ) {
        if !self.0.contains_key("properties") {
            self.0.insert("properties".to_string(), json!({}));
        }
        if let Some(Value::Object(props)) = self.0.get_mut("properties") {
            props.insert(name.into(), definition);
        }
    }

    /// Replace the `required` list.
    pub fn set_required(
        &mut self,
        required: Vec<String>,
    ) {
        if required.is_empty() {
            self.0.remove("required");
        } else {
            self.0.insert("required".to_string(), json!(required));
        }
    }

    pub fn as_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

impl From<SchemaDoc> for Value {
    fn from(doc: SchemaDoc) -> Self {
        Value::Object(doc.0)
    }
}
