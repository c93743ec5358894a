use serde::{Deserialize, Serialize};

use crate::{
    AgentflowError, Result,
    model::{EdgeModel, NodeModel},
};

/// Persisted workflow document: `{id, name, description, nodes, edges}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkflowModel {
    pub id: String,
    pub name: String,
    #[serde(rename = "description", default)]
    pub desc: String,
    #[serde(default)]
    pub nodes: Vec<NodeModel>,
    #[serde(default)]
    pub edges: Vec<EdgeModel>,
}

impl WorkflowModel {
    pub fn from_json(s: &str) -> Result<Self> {
        serde_json::from_str::<WorkflowModel>(s).map_err(|e| AgentflowError::Workflow(format!("{}", e)))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| AgentflowError::Workflow(format!("{}", e)))
    }
}
