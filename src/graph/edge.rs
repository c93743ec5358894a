use serde::{Deserialize, Serialize};

use crate::{graph::node::NodeId, model::EdgeModel};

/// Unique identifier for an edge within a workflow.
pub type EdgeId = String;

/// Directed edge `source -> target`, optionally tagged with sub-port
/// handles. Multiple edges between the same pair of nodes are permitted.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Edge {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
    pub source_handle: Option<String>,
    pub target_handle: Option<String>,
}

impl Edge {
    pub fn new(
        id: impl Into<EdgeId>,
        source: impl Into<NodeId>,
        target: impl Into<NodeId>,
    ) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
            target: target.into(),
            source_handle: None,
            target_handle: None,
        }
    }
}

impl From<&EdgeModel> for Edge {
    fn from(model: &EdgeModel) -> Self {
        Self {
            id: model.id.clone(),
            source: model.source.clone(),
            target: model.target.clone(),
            source_handle: model.source_handle.clone(),
            target_handle: model.target_handle.clone(),
        }
    }
}

impl From<&Edge> for EdgeModel {
    fn from(edge: &Edge) -> Self {
        Self {
            id: edge.id.clone(),
            source: edge.source.clone(),
            target: edge.target.clone(),
            source_handle: edge.source_handle.clone(),
            target_handle: edge.target_handle.clone(),
        }
    }
}
