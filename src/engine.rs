//! Engine - the main entry point for Agentflow.
//!
//! The engine ties the pieces together: it owns the store, the generation
//! backend and the tokio runtime, hands out editing sessions, and tracks
//! active runs in an in-memory cache.

use std::sync::{Arc, RwLock};

use serde_json::Value;
use tokio::runtime::Runtime;

use crate::{
    AgentflowError, Result, ShareLock,
    common::{MemCache, Vars},
    editor::Editor,
    generate::{Generator, ServiceDraft},
    graph::{Graph, NodeKind},
    model::WorkflowModel,
    runner::{Run, RunId, RunState},
    schema::SchemaDoc,
    store::{WorkflowStore, WorkflowSummary},
};

/// Maximum number of runs to keep in the cache.
const RUN_CACHE_SIZE: usize = 2048;

/// The central coordinator.
///
/// # Example
///
/// ```rust,ignore
/// let engine = EngineBuilder::new().build()?;
///
/// // Deploy a workflow
/// engine.deploy(&workflow_model)?;
///
/// // Execute it step by step
/// let rid = engine.start_run("workflow_id")?;
/// engine.submit_run_inputs(&rid, inputs)?;
/// engine.step_run(&rid)?;
/// engine.advance_run(&rid)?;
/// ```
pub struct Engine {
    /// Persistent storage for workflow documents.
    store: Arc<dyn WorkflowStore>,
    /// Backend for step execution and node drafting.
    generator: Arc<dyn Generator>,
    /// In-memory cache of active runs.
    runs: Arc<MemCache<RunId, ShareLock<Run>>>,
    /// Tokio runtime for the generation calls.
    runtime: Arc<Runtime>,
}

impl Engine {
    pub fn new(
        store: Arc<dyn WorkflowStore>,
        generator: Arc<dyn Generator>,
        runtime: Arc<Runtime>,
    ) -> Self {
        Self {
            store,
            generator,
            runs: Arc::new(MemCache::new(RUN_CACHE_SIZE)),
            runtime,
        }
    }

    /// Validates a workflow document and saves it to the store.
    ///
    /// Validation is strict: a document whose node schemas do not parse is
    /// rejected here even though the editor would still open it.
    pub fn deploy(
        &self,
        workflow: &WorkflowModel,
    ) -> Result<bool> {
        if workflow.id.is_empty() {
            return Err(AgentflowError::Workflow("workflow id is required".to_string()));
        }
        Graph::try_from(workflow)?;

        let replaced = self.store.exists(&workflow.id);
        self.store.save(workflow)?;
        tracing::info!("deployed workflow {} ({} nodes)", workflow.id, workflow.nodes.len());
        Ok(replaced)
    }

    /// Opens an editing session over a stored workflow.
    pub fn open(
        &self,
        wid: &str,
    ) -> Result<Editor> {
        Editor::load(self.store.as_ref(), wid)
    }

    /// Persists an editing session back to the store.
    pub fn save(
        &self,
        editor: &Editor,
    ) -> Result<()> {
        editor.save(self.store.as_ref())
    }

    /// Deletes a stored workflow; returns whether it existed.
    pub fn remove(
        &self,
        wid: &str,
    ) -> Result<bool> {
        self.store.delete(wid)
    }

    /// Summaries of all stored workflows.
    pub fn list(&self) -> Vec<WorkflowSummary> {
        self.store.list()
    }

    /// Starts a run of a stored workflow and returns its id.
    ///
    /// The run executes against a frozen copy of the graph; later edits to
    /// the stored document do not affect it.
    pub fn start_run(
        &self,
        wid: &str,
    ) -> Result<RunId> {
        let model = self.store.load(wid)?;
        let graph = Graph::try_from(&model)?;
        let run = Run::start(graph)?;
        let rid = run.id().to_string();

        self.runs.set(rid.clone(), Arc::new(RwLock::new(run)));
        tracing::info!("started run {} of workflow {}", rid, wid);
        Ok(rid)
    }

    pub fn run_state(
        &self,
        rid: &RunId,
    ) -> Result<RunState> {
        Ok(self.run(rid)?.read().unwrap().state())
    }

    /// The context accumulated by a run so far.
    pub fn run_accumulated(
        &self,
        rid: &RunId,
    ) -> Result<Vars> {
        Ok(self.run(rid)?.read().unwrap().accumulated().clone())
    }

    /// The full result of a run's last completed step.
    pub fn run_output(
        &self,
        rid: &RunId,
    ) -> Result<Vars> {
        Ok(self.run(rid)?.read().unwrap().last_output().clone())
    }

    /// The display-only portion of a run's last completed step.
    pub fn run_display(
        &self,
        rid: &RunId,
    ) -> Result<Vars> {
        Ok(self.run(rid)?.read().unwrap().last_display().clone())
    }

    pub fn run_error(
        &self,
        rid: &RunId,
    ) -> Result<Option<String>> {
        Ok(self.run(rid)?.read().unwrap().last_error().map(str::to_string))
    }

    /// Supplies values for the run's current data node.
    pub fn submit_run_inputs(
        &self,
        rid: &RunId,
        values: Vars,
    ) -> Result<()> {
        let run = self.run(rid)?;
        let mut run = run.write().unwrap();
        run.submit_inputs(values)
    }

    /// Executes the run's current service node. Blocks until the
    /// generation call returns.
    pub fn step_run(
        &self,
        rid: &RunId,
    ) -> Result<()> {
        let run = self.run(rid)?;
        let mut run = run.write().unwrap();
        self.runtime.block_on(run.step(self.generator.as_ref()))
    }

    /// Continues a run past a completed step.
    pub fn advance_run(
        &self,
        rid: &RunId,
    ) -> Result<()> {
        let run = self.run(rid)?;
        let mut run = run.write().unwrap();
        run.advance()
    }

    /// Re-arms a failed run for another attempt at the same node.
    pub fn retry_run(
        &self,
        rid: &RunId,
    ) -> Result<()> {
        let run = self.run(rid)?;
        let mut run = run.write().unwrap();
        run.retry()
    }

    /// Evicts a run from the cache.
    pub fn finish_run(
        &self,
        rid: &RunId,
    ) {
        self.runs.remove(rid);
    }

    /// Asks the generation backend to draft a node from a natural-language
    /// intention. Blocks until the call returns.
    pub fn draft_node(
        &self,
        intention: &str,
        context_schema: Option<&SchemaDoc>,
        kind: NodeKind,
    ) -> Result<ServiceDraft> {
        self.runtime.block_on(self.generator.draft_service(intention, context_schema, kind))
    }

    /// Executes a single node definition outside of any run.
    pub fn run_node_once(
        &self,
        definition: &str,
        input: &Vars,
        output_schema: &SchemaDoc,
    ) -> Result<Value> {
        self.runtime.block_on(self.generator.run_node(definition, input, output_schema))
    }

    fn run(
        &self,
        rid: &RunId,
    ) -> Result<ShareLock<Run>> {
        self.runs.get(rid).ok_or_else(|| AgentflowError::Runtime(format!("run {} not found", rid)))
    }
}

#[cfg(test)]
mod test {
    use std::sync::Arc;

    use serde_json::{Value, json};

    use crate::{
        EngineBuilder, Result,
        common::Vars,
        generate::{Generator, ServiceDraft},
        graph::NodeKind,
        model::WorkflowModel,
        runner::RunState,
        schema::SchemaDoc,
    };
    use async_trait::async_trait;

    struct EchoGenerator;

    #[async_trait]
    impl Generator for EchoGenerator {
        async fn run_node(
            &self,
            _definition: &str,
            input: &Vars,
            _output_schema: &SchemaDoc,
        ) -> Result<Value> {
            Ok(json!({"echo": Value::from(input.clone())}))
        }

        async fn draft_service(
            &self,
            intention: &str,
            _context_schema: Option<&SchemaDoc>,
            _kind: NodeKind,
        ) -> Result<ServiceDraft> {
            Ok(ServiceDraft {
                label: intention.to_string(),
                ..ServiceDraft::default()
            })
        }
    }

    fn engine() -> crate::Engine {
        EngineBuilder::new().async_worker_thread_number(2).generator(Arc::new(EchoGenerator)).build().unwrap()
    }

    fn workflow_json() -> String {
        json!({
            "id": "w1",
            "name": "demo",
            "description": "",
            "nodes": [
                {
                    "id": "d1",
                    "kind": "data",
                    "label": "Seed",
                    "definition": "",
                    "inputSchema": {},
                    "outputSchema": {"properties": {"topic": {"type": "string"}}},
                    "position": {"x": 0.0, "y": 0.0}
                },
                {
                    "id": "s1",
                    "kind": "service",
                    "label": "Agent",
                    "definition": "summarize",
                    "inputSchema": {},
                    "outputSchema": {},
                    "position": {"x": 100.0, "y": 0.0}
                }
            ],
            "edges": [
                {"id": "e1", "source": "d1", "target": "s1"}
            ]
        })
        .to_string()
    }

    #[test]
    fn test_deploy_and_run_workflow() {
        let engine = engine();
        let model = WorkflowModel::from_json(&workflow_json()).unwrap();
        assert!(!engine.deploy(&model).unwrap());
        // second deploy replaces
        assert!(engine.deploy(&model).unwrap());

        let rid = engine.start_run("w1").unwrap();
        assert_eq!(engine.run_state(&rid).unwrap(), RunState::AwaitingInput);

        engine.submit_run_inputs(&rid, Vars::from(json!({"topic": "rust"}))).unwrap();
        assert_eq!(engine.run_state(&rid).unwrap(), RunState::Running);

        engine.step_run(&rid).unwrap();
        assert_eq!(engine.run_state(&rid).unwrap(), RunState::StepComplete);
        assert!(engine.run_output(&rid).unwrap().contains_key("echo"));

        engine.advance_run(&rid).unwrap();
        assert_eq!(engine.run_state(&rid).unwrap(), RunState::Finished);

        engine.finish_run(&rid);
        assert!(engine.run_state(&rid).is_err());
    }

    #[test]
    fn test_deploy_rejects_malformed_schema() {
        let engine = engine();
        let mut model = WorkflowModel::from_json(&workflow_json()).unwrap();
        model.nodes[0].output_schema = json!("not a schema object");

        assert!(engine.deploy(&model).is_err());
    }

    #[test]
    fn test_deploy_requires_id() {
        let engine = engine();
        let mut model = WorkflowModel::from_json(&workflow_json()).unwrap();
        model.id.clear();

        assert!(engine.deploy(&model).is_err());
    }

    #[test]
    fn test_open_edit_save() {
        let engine = engine();
        let model = WorkflowModel::from_json(&workflow_json()).unwrap();
        engine.deploy(&model).unwrap();

        let mut editor = engine.open("w1").unwrap();
        editor.remove_edge("e1").unwrap();
        engine.save(&editor).unwrap();

        let reopened = engine.open("w1").unwrap();
        assert_eq!(reopened.graph().edge_count(), 0);
        assert_eq!(reopened.graph().node_count(), 2);
    }

    #[test]
    fn test_draft_node_via_generator() {
        let engine = engine();
        let draft = engine.draft_node("extract keywords", None, NodeKind::Service).unwrap();
        assert_eq!(draft.label, "extract keywords");
    }

    #[test]
    fn test_list_and_remove() {
        let engine = engine();
        let model = WorkflowModel::from_json(&workflow_json()).unwrap();
        engine.deploy(&model).unwrap();

        let summaries = engine.list();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].id, "w1");

        assert!(engine.remove("w1").unwrap());
        assert!(engine.open("w1").is_err());
    }
}
