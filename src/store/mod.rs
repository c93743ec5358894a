//! Persistence adapter for workflow documents.
//!
//! The storage medium is opaque to the core: a workflow is one document
//! keyed by its id. The in-memory backend covers tests and embedding;
//! other media implement the same trait.

mod mem;

use serde::{Deserialize, Serialize};

use crate::{Result, model::WorkflowModel};

pub use mem::MemStore;

/// Listing entry for a stored workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowSummary {
    pub id: String,
    pub name: String,
    pub desc: String,
    /// Millis timestamp of the last save.
    pub update_time: i64,
}

/// Opaque key-value persistence for `{nodes, edges}` documents.
pub trait WorkflowStore: Send + Sync {
    /// Whether a document with the given id exists.
    fn exists(
        &self,
        id: &str,
    ) -> bool;

    /// Load a workflow document by id.
    fn load(
        &self,
        id: &str,
    ) -> Result<WorkflowModel>;

    /// Save a workflow document, creating or replacing it.
    fn save(
        &self,
        model: &WorkflowModel,
    ) -> Result<()>;

    /// Delete a document; returns whether it existed.
    fn delete(
        &self,
        id: &str,
    ) -> Result<bool>;

    /// Summaries of all stored workflows.
    fn list(&self) -> Vec<WorkflowSummary>;
}
