//! In-memory workflow store.

use std::{
    collections::HashMap,
    sync::{Arc, RwLock},
};

use crate::{
    AgentflowError, Result, ShareLock,
    model::WorkflowModel,
    store::{WorkflowStore, WorkflowSummary},
    utils,
};

/// One stored document: serialized JSON text plus bookkeeping times.
#[derive(Debug, Clone)]
struct Document {
    id: String,
    name: String,
    desc: String,
    data: String,
    create_time: i64,
    update_time: i64,
}

/// Workflow store backed by a process-local map. Documents are held as
/// serialized JSON text, the same shape any other medium would persist.
#[derive(Clone, Default)]
pub struct MemStore {
    docs: ShareLock<HashMap<String, Document>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            docs: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl WorkflowStore for MemStore {
    fn exists(
        &self,
        id: &str,
    ) -> bool {
        self.docs.read().unwrap().contains_key(id)
    }

    fn load(
        &self,
        id: &str,
    ) -> Result<WorkflowModel> {
        tracing::trace!("store::load({})", id);
        let docs = self.docs.read().unwrap();
        let doc = docs.get(id).ok_or_else(|| AgentflowError::Store(format!("workflow {} not found", id)))?;
        WorkflowModel::from_json(&doc.data)
    }

    fn save(
        &self,
        model: &WorkflowModel,
    ) -> Result<()> {
        tracing::trace!("store::save({})", model.id);
        if model.id.is_empty() {
            return Err(AgentflowError::Workflow("missing id in workflow".into()));
        }
        let data = model.to_json()?;
        let now = utils::time::time_millis();

        let mut docs = self.docs.write().unwrap();
        let create_time = docs.get(&model.id).map(|d| d.create_time).unwrap_or(now);
        docs.insert(
            model.id.clone(),
            Document {
                id: model.id.clone(),
                name: model.name.clone(),
                desc: model.desc.clone(),
                data,
                create_time,
                update_time: now,
            },
        );
        Ok(())
    }

    fn delete(
        &self,
        id: &str,
    ) -> Result<bool> {
        tracing::trace!("store::delete({})", id);
        Ok(self.docs.write().unwrap().remove(id).is_some())
    }

    fn list(&self) -> Vec<WorkflowSummary> {
        let docs = self.docs.read().unwrap();
        let mut summaries: Vec<WorkflowSummary> = docs
            .values()
            .map(|d| WorkflowSummary {
                id: d.id.clone(),
                name: d.name.clone(),
                desc: d.desc.clone(),
                update_time: d.update_time,
            })
            .collect();
        summaries.sort_by(|a, b| a.id.cmp(&b.id));
        summaries
    }
}
