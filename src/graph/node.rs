use serde::{Deserialize, Serialize};

use crate::{
    AgentflowError, Result,
    model::{NodeModel, Position, WidgetBindingModel},
    schema::SchemaDoc,
};

/// Unique identifier for a node within a workflow graph.
pub type NodeId = String;

/// Kind of a workflow node.
///
/// Service nodes invoke the external generation call at execution time;
/// Data nodes are static data sources that never execute and only supply
/// schema and values downstream. The kind is immutable once a node is
/// created.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NodeKind {
    #[default]
    Service,
    Data,
}

/// Runtime node representation.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Node {
    /// Node id, unique within a graph.
    pub id: NodeId,
    /// Node kind, immutable after creation.
    pub kind: NodeKind,
    /// Display name.
    pub label: String,
    /// Natural-language goal; the execution prompt for service nodes.
    pub definition: String,
    /// Input contract. Always empty for data nodes.
    pub input_schema: SchemaDoc,
    /// Output contract. Properties may be marked `displayOnly`.
    pub output_schema: SchemaDoc,
    /// Canvas position.
    pub position: Position,
    /// Widget bindings for the editor; not involved in execution.
    pub widgets: Vec<WidgetBindingModel>,
}

impl Node {
    /// Strict conversion from the persisted model. Used on execution
    /// paths, where a malformed schema must fail rather than silently
    /// degrade to `{}`.
    pub fn try_from_model(model: &NodeModel) -> Result<Self> {
        let kind = model.kind.parse::<NodeKind>().map_err(|_| AgentflowError::Node(format!("invalid node kind: {}", model.kind)))?;
        let input_schema = SchemaDoc::from_value(model.input_schema.clone())?;
        let output_schema = SchemaDoc::from_value(model.output_schema.clone())?;

        Ok(Self {
            id: model.id.clone(),
            kind,
            label: model.label.clone(),
            definition: model.definition.clone(),
            input_schema,
            output_schema,
            position: model.position,
            widgets: model.widgets.clone(),
        })
    }

    /// Lenient conversion for editor contexts: malformed schemas fall
    /// back to `{}` with a warning instead of failing the whole load.
    pub fn from_model_lossy(model: &NodeModel) -> Result<Self> {
        let kind = model.kind.parse::<NodeKind>().map_err(|_| AgentflowError::Node(format!("invalid node kind: {}", model.kind)))?;
        let input_schema = SchemaDoc::from_value(model.input_schema.clone()).unwrap_or_else(|e| {
            tracing::warn!("node {}: dropping malformed input schema: {}", model.id, e);
            SchemaDoc::empty()
        });
        let output_schema = SchemaDoc::from_value(model.output_schema.clone()).unwrap_or_else(|e| {
            tracing::warn!("node {}: dropping malformed output schema: {}", model.id, e);
            SchemaDoc::empty()
        });

        Ok(Self {
            id: model.id.clone(),
            kind,
            label: model.label.clone(),
            definition: model.definition.clone(),
            input_schema,
            output_schema,
            position: model.position,
            widgets: model.widgets.clone(),
        })
    }

    pub fn to_model(&self) -> NodeModel {
        NodeModel {
            id: self.id.clone(),
            kind: self.kind.as_ref().to_string(),
            label: self.label.clone(),
            definition: self.definition.clone(),
            input_schema: self.input_schema.as_value(),
            output_schema: self.output_schema.as_value(),
            position: self.position,
            widgets: self.widgets.clone(),
        }
    }

    /// Apply a partial payload update. Untouched fields are kept; the
    /// node kind cannot be patched.
    pub fn apply(
        &mut self,
        patch: NodePatch,
    ) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(definition) = patch.definition {
            self.definition = definition;
        }
        if let Some(input_schema) = patch.input_schema {
            self.input_schema = input_schema;
        }
        if let Some(output_schema) = patch.output_schema {
            self.output_schema = output_schema;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(widgets) = patch.widgets {
            self.widgets = widgets;
        }
    }
}

/// Partial node payload for shallow-merge updates.
#[derive(Debug, Clone, Default)]
pub struct NodePatch {
    pub label: Option<String>,
    pub definition: Option<String>,
    pub input_schema: Option<SchemaDoc>,
    pub output_schema: Option<SchemaDoc>,
    pub position: Option<Position>,
    pub widgets: Option<Vec<WidgetBindingModel>>,
}

impl NodePatch {
    pub fn label(
        mut self,
        label: impl Into<String>,
    ) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn definition(
        mut self,
        definition: impl Into<String>,
    ) -> Self {
        self.definition = Some(definition.into());
        self
    }

    pub fn input_schema(
        mut self,
        schema: SchemaDoc,
    ) -> Self {
        self.input_schema = Some(schema);
        self
    }

    pub fn output_schema(
        mut self,
        schema: SchemaDoc,
    ) -> Self {
        self.output_schema = Some(schema);
        self
    }

    pub fn position(
        mut self,
        position: Position,
    ) -> Self {
        self.position = Some(position);
        self
    }

    pub fn widgets(
        mut self,
        widgets: Vec<WidgetBindingModel>,
    ) -> Self {
        self.widgets = Some(widgets);
        self
    }
}
