//! Compact type descriptors.
//!
//! The schema builder UI edits property types in a compact nested-array
//! notation (`array[array[string]]`) which maps to a JSON-Schema
//! `{type, items}` tree. The mapping round-trips for arbitrary nesting.

use serde_json::{Value, json};

/// Convert a compact type descriptor to its JSON-Schema form.
pub fn descriptor_to_schema(descriptor: &str) -> Value {
    let descriptor = descriptor.trim();
    if let Some(inner) = descriptor.strip_prefix("array[").and_then(|rest| rest.strip_suffix(']')) {
        return json!({
            "type": "array",
            "items": descriptor_to_schema(inner),
        });
    }
    json!({ "type": descriptor })
}

/// Convert a JSON-Schema `{type, items}` tree back to the compact notation.
///
/// A missing or unknown type renders as `string`; an array with no `items`
/// renders as `array[any]`.
pub fn schema_to_descriptor(schema: &Value) -> String {
    match schema.get("type").and_then(Value::as_str) {
        Some("array") => {
            let inner = schema.get("items").map(schema_to_descriptor).unwrap_or_else(|| "any".to_string());
            format!("array[{}]", inner)
        }
        Some(type_name) => type_name.to_string(),
        None => "string".to_string(),
    }
}
