use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

fn empty_schema() -> Value {
    Value::Object(Map::new())
}

/// Canvas position of a node, persisted for the editor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// Declarative mapping of a schema property to a UI widget.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WidgetBindingModel {
    #[serde(rename = "targetProperty")]
    pub target_property: String,
    #[serde(rename = "widgetId")]
    pub widget_id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub config: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeModel {
    pub id: String,
    /// Node kind: `service` or `data`.
    pub kind: String,
    pub label: String,
    #[serde(default)]
    pub definition: String,
    /// JSON-Schema-shaped input contract. Always `{}` for data nodes.
    #[serde(rename = "inputSchema", default = "empty_schema")]
    pub input_schema: Value,
    /// JSON-Schema-shaped output contract. Properties may carry a
    /// `displayOnly: true` marker.
    #[serde(rename = "outputSchema", default = "empty_schema")]
    pub output_schema: Value,
    #[serde(default)]
    pub position: Position,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub widgets: Vec<WidgetBindingModel>,
}
