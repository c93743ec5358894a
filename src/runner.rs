//! Step-wise workflow execution.
//!
//! A run walks a frozen copy of the graph from its root node, one step at
//! a time. Service nodes invoke the external generation call; data nodes
//! only seed the accumulated context with user-supplied values. Each
//! step's output is partitioned by the node's output schema: properties
//! marked `displayOnly` stay visible at that step and are never passed
//! downstream, everything else folds into the running context.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{
    AgentflowError, Result,
    common::Vars,
    generate::Generator,
    graph::{Graph, NodeId, NodeKind},
    utils,
};

/// Unique identifier for a run.
pub type RunId = String;

/// State of the execution interpreter.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr, strum::EnumString)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RunState {
    /// Waiting for user-supplied values for the current data node.
    AwaitingInput,
    /// Ready to invoke (or currently invoking) the generation call for
    /// the current service node. No step-advance input is accepted while
    /// a call is in flight.
    Running,
    /// The current step produced a result; waiting for "continue".
    StepComplete,
    /// Terminal: the last node had no outgoing edge.
    Finished,
    /// Terminal unless retried: the generation call for the current node
    /// failed. The accumulated context is untouched.
    Failed,
}

/// A single execution of a workflow.
///
/// The run never mutates the graph it was started from; the only state it
/// owns is the accumulated context and the last step's result.
pub struct Run {
    id: RunId,
    graph: Graph,
    current: NodeId,
    state: RunState,
    accumulated: Vars,
    last_output: Vars,
    last_display: Vars,
    last_error: Option<String>,
}

impl Run {
    /// Start a run at the graph's root node.
    pub fn start(graph: Graph) -> Result<Self> {
        let root = graph.find_root()?.id.clone();
        let mut run = Self {
            id: utils::longid(),
            graph,
            current: root.clone(),
            state: RunState::Running,
            accumulated: Vars::new(),
            last_output: Vars::new(),
            last_display: Vars::new(),
            last_error: None,
        };
        run.enter(root);
        Ok(run)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn current_node(&self) -> &str {
        &self.current
    }

    /// The running context accumulated so far.
    pub fn accumulated(&self) -> &Vars {
        &self.accumulated
    }

    /// The full result of the last completed step, including
    /// display-only fields.
    pub fn last_output(&self) -> &Vars {
        &self.last_output
    }

    /// Only the display-only fields of the last completed step.
    pub fn last_display(&self) -> &Vars {
        &self.last_display
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Whether every property of a data node is already present in the
    /// accumulated context.
    fn data_satisfied(
        &self,
        node_id: &str,
    ) -> bool {
        let Some(node) = self.graph.node(node_id) else {
            return true;
        };
        node.output_schema.property_names().iter().all(|name| self.accumulated.contains_key(name))
    }

    /// Make `node_id` the current node and derive the resulting state.
    /// Chains of already-satisfied data nodes advance immediately; a data
    /// node with unfilled properties parks the run in `AwaitingInput`.
    fn enter(
        &mut self,
        node_id: NodeId,
    ) {
        let mut hops = 0usize;
        let limit = self.graph.node_count().max(1);
        self.current = node_id;

        loop {
            let Some(node) = self.graph.node(&self.current) else {
                self.state = RunState::Failed;
                self.last_error = Some(format!("node {} not found", self.current));
                return;
            };

            match node.kind {
                NodeKind::Service => {
                    self.state = RunState::Running;
                    return;
                }
                NodeKind::Data => {
                    if !self.data_satisfied(&self.current) {
                        self.state = RunState::AwaitingInput;
                        return;
                    }
                    // satisfied data node: advance along its first edge
                    match self.graph.first_outgoing(&self.current) {
                        Some(edge) => {
                            hops += 1;
                            if hops > limit {
                                self.state = RunState::Failed;
                                self.last_error = Some("data node chain does not terminate".to_string());
                                return;
                            }
                            self.current = edge.target.clone();
                        }
                        None => {
                            self.state = RunState::Finished;
                            return;
                        }
                    }
                }
            }
        }
    }

    /// Supply values for the current data node and advance.
    pub fn submit_inputs(
        &mut self,
        values: Vars,
    ) -> Result<()> {
        if self.state != RunState::AwaitingInput {
            return Err(AgentflowError::Runtime(format!("cannot submit inputs in state {}", self.state.as_ref())));
        }
        self.accumulated.merge(&values);
        tracing::debug!("run {}: inputs submitted at node {}", self.id, self.current);
        self.enter(self.current.clone());
        Ok(())
    }

    /// Execute the current service node via the generation call.
    ///
    /// The step is atomic: on failure nothing is merged into the
    /// accumulated context and the run transitions to `Failed`.
    pub async fn step(
        &mut self,
        generator: &dyn Generator,
    ) -> Result<()> {
        if self.state != RunState::Running {
            return Err(AgentflowError::Runtime(format!("cannot step in state {}", self.state.as_ref())));
        }
        let node = self
            .graph
            .node(&self.current)
            .cloned()
            .ok_or_else(|| AgentflowError::Node(format!("node {} not found", self.current)))?;

        tracing::debug!("run {}: executing node {} ({})", self.id, node.id, node.label);
        let result = match generator.run_node(&node.definition, &self.accumulated, &node.output_schema).await {
            Ok(value) => value,
            Err(e) => {
                self.state = RunState::Failed;
                self.last_error = Some(e.to_string());
                return Err(e);
            }
        };

        let Some((output, display)) = split_envelope(result.clone()) else {
            let e = AgentflowError::Generation(format!("step result is not a JSON object: {}", result));
            self.state = RunState::Failed;
            self.last_error = Some(e.to_string());
            return Err(e);
        };

        let mut full = output.clone();
        for (key, value) in display.iter() {
            full.entry(key.clone()).or_insert_with(|| value.clone());
        }
        self.last_output = Vars::from(full);
        self.last_display = Vars::from(display);
        let mut downstream = Vars::new();
        for (key, value) in output {
            if node.output_schema.is_display_only(&key) {
                self.last_display.set(key, value);
            } else {
                downstream.set(key, value);
            }
        }
        self.accumulated.merge(&downstream);
        self.last_error = None;
        self.state = RunState::StepComplete;
        Ok(())
    }

    /// Continue past a completed step: follow the current node's first
    /// outgoing edge, or finish when there is none.
    pub fn advance(&mut self) -> Result<()> {
        if self.state != RunState::StepComplete {
            return Err(AgentflowError::Runtime(format!("cannot advance in state {}", self.state.as_ref())));
        }
        match self.graph.first_outgoing(&self.current) {
            Some(edge) => {
                let target = edge.target.clone();
                self.enter(target);
            }
            None => self.state = RunState::Finished,
        }
        Ok(())
    }

    /// Re-arm a failed step so the user can trigger it again. The same
    /// node is attempted with the same accumulated context.
    pub fn retry(&mut self) -> Result<()> {
        if self.state != RunState::Failed {
            return Err(AgentflowError::Runtime(format!("cannot retry in state {}", self.state.as_ref())));
        }
        self.last_error = None;
        self.enter(self.current.clone());
        Ok(())
    }
}

/// Later schema variants wrap the step result in an `output`/`display`
/// envelope. Split it into the downstream candidates and the display-only
/// part: only `output` keys may ever reach the accumulated context, so
/// envelope `display` keys stay visible-only even without a `displayOnly`
/// marker in the schema. A bare object is all downstream candidates.
/// Returns `None` for non-object results.
fn split_envelope(result: Value) -> Option<(Map<String, Value>, Map<String, Value>)> {
    if let Some(Value::Object(output)) = result.get("output") {
        let display = match result.get("display") {
            Some(Value::Object(display)) => display.clone(),
            _ => Map::new(),
        };
        return Some((output.clone(), display));
    }
    match result {
        Value::Object(map) => Some((map, Map::new())),
        _ => None,
    }
}

#[cfg(test)]
mod test {
    use super::{Run, RunState};
    use crate::{
        AgentflowError, Result,
        common::Vars,
        generate::{Generator, ServiceDraft},
        graph::{Edge, Graph, NodeKind, graph::test::node},
        schema::SchemaDoc,
    };
    use async_trait::async_trait;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Canned generator: pops one scripted response per call.
    struct ScriptedGenerator {
        responses: Mutex<Vec<Result<Value>>>,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<Value>>) -> Self {
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl Generator for ScriptedGenerator {
        async fn run_node(
            &self,
            _definition: &str,
            _input: &Vars,
            _output_schema: &SchemaDoc,
        ) -> Result<Value> {
            self.responses.lock().unwrap().remove(0)
        }

        async fn draft_service(
            &self,
            _intention: &str,
            _context_schema: Option<&SchemaDoc>,
            _kind: NodeKind,
        ) -> Result<ServiceDraft> {
            Ok(ServiceDraft::default())
        }
    }

    fn two_step_graph() -> Graph {
        // D1(topic) -> S1 -> S2
        let mut graph = Graph::new();
        graph.add_node(node("d1", NodeKind::Data, json!({"properties": {"topic": {"type": "string"}}}))).unwrap();
        graph
            .add_node(node(
                "s1",
                NodeKind::Service,
                json!({"properties": {"a": {"type": "string"}, "b": {"type": "string", "displayOnly": true}}}),
            ))
            .unwrap();
        graph.add_node(node("s2", NodeKind::Service, json!({"properties": {"c": {"type": "string"}}}))).unwrap();
        graph.add_edge(Edge::new("e1", "d1", "s1")).unwrap();
        graph.add_edge(Edge::new("e2", "s1", "s2")).unwrap();
        graph
    }

    #[test]
    fn test_data_root_awaits_input() {
        let run = Run::start(two_step_graph()).unwrap();
        assert_eq!(run.state(), RunState::AwaitingInput);
        assert_eq!(run.current_node(), "d1");
    }

    #[test]
    fn test_service_root_starts_running() {
        let mut graph = Graph::new();
        graph.add_node(node("s1", NodeKind::Service, json!({}))).unwrap();
        let run = Run::start(graph).unwrap();
        assert_eq!(run.state(), RunState::Running);
    }

    #[test]
    fn test_no_root_cannot_start() {
        let mut graph = Graph::new();
        graph.add_node(node("a", NodeKind::Service, json!({}))).unwrap();
        graph.add_node(node("b", NodeKind::Service, json!({}))).unwrap();
        graph.add_edge(Edge::new("e1", "a", "b")).unwrap();
        graph.add_edge(Edge::new("e2", "b", "a")).unwrap();

        assert!(matches!(Run::start(graph), Err(AgentflowError::Graph(_))));
    }

    #[test]
    fn test_submit_inputs_seeds_and_advances() {
        let mut run = Run::start(two_step_graph()).unwrap();
        let mut values = Vars::new();
        values.set("topic", "rust");
        run.submit_inputs(values).unwrap();

        assert_eq!(run.state(), RunState::Running);
        assert_eq!(run.current_node(), "s1");
        assert_eq!(run.accumulated().get::<String>("topic"), Some("rust".to_string()));
    }

    #[tokio::test]
    async fn test_display_only_fields_filtered() {
        let mut run = Run::start(two_step_graph()).unwrap();
        let mut values = Vars::new();
        values.set("topic", "rust");
        run.submit_inputs(values).unwrap();

        let generator = ScriptedGenerator::new(vec![Ok(json!({"a": "keep", "b": "hide"}))]);
        run.step(&generator).await.unwrap();

        assert_eq!(run.state(), RunState::StepComplete);
        assert_eq!(run.accumulated().get::<String>("a"), Some("keep".to_string()));
        assert!(!run.accumulated().contains_key("b"));
        assert_eq!(run.last_display().get::<String>("b"), Some("hide".to_string()));
        // the full result is still available for display
        assert_eq!(run.last_output().get::<String>("b"), Some("hide".to_string()));
    }

    #[tokio::test]
    async fn test_envelope_result_unwrapped() {
        let mut run = Run::start(two_step_graph()).unwrap();
        run.submit_inputs(Vars::from(json!({"topic": "x"}))).unwrap();

        // "b" carries the displayOnly marker; "note" does not, but it
        // arrives in the display envelope and must stay out of the context
        let generator = ScriptedGenerator::new(vec![Ok(json!({"output": {"a": "keep"}, "display": {"b": "hide", "note": "aside"}}))]);
        run.step(&generator).await.unwrap();

        assert_eq!(run.accumulated().get::<String>("a"), Some("keep".to_string()));
        assert!(!run.accumulated().contains_key("b"));
        assert!(!run.accumulated().contains_key("note"));
        assert_eq!(run.last_display().get::<String>("b"), Some("hide".to_string()));
        assert_eq!(run.last_display().get::<String>("note"), Some("aside".to_string()));
        assert_eq!(run.last_output().get::<String>("note"), Some("aside".to_string()));
    }

    #[tokio::test]
    async fn test_failed_step_is_atomic() {
        let mut run = Run::start(two_step_graph()).unwrap();
        run.submit_inputs(Vars::from(json!({"topic": "x"}))).unwrap();
        let before = run.accumulated().clone();

        let generator = ScriptedGenerator::new(vec![Err(AgentflowError::Generation("boom".to_string()))]);
        assert!(run.step(&generator).await.is_err());

        assert_eq!(run.state(), RunState::Failed);
        assert_eq!(run.accumulated(), &before);
        assert_eq!(run.last_error(), Some("boom"));
    }

    #[tokio::test]
    async fn test_retry_after_failure() {
        let mut run = Run::start(two_step_graph()).unwrap();
        run.submit_inputs(Vars::from(json!({"topic": "x"}))).unwrap();

        let generator = ScriptedGenerator::new(vec![Err(AgentflowError::Generation("boom".to_string())), Ok(json!({"a": "ok"}))]);
        assert!(run.step(&generator).await.is_err());
        assert_eq!(run.state(), RunState::Failed);

        run.retry().unwrap();
        assert_eq!(run.state(), RunState::Running);
        run.step(&generator).await.unwrap();
        assert_eq!(run.state(), RunState::StepComplete);
    }

    #[tokio::test]
    async fn test_terminates_on_last_node() {
        let mut run = Run::start(two_step_graph()).unwrap();
        run.submit_inputs(Vars::from(json!({"topic": "x"}))).unwrap();

        let generator = ScriptedGenerator::new(vec![Ok(json!({"a": "1"})), Ok(json!({"c": "2"}))]);
        run.step(&generator).await.unwrap();
        run.advance().unwrap();
        assert_eq!(run.current_node(), "s2");
        assert_eq!(run.state(), RunState::Running);

        run.step(&generator).await.unwrap();
        run.advance().unwrap();
        // s2 has no outgoing edge
        assert_eq!(run.state(), RunState::Finished);
        assert_eq!(run.accumulated().get::<String>("c"), Some("2".to_string()));
    }

    #[test]
    fn test_wrong_state_transitions_rejected() {
        let mut run = Run::start(two_step_graph()).unwrap();
        // AwaitingInput: neither advance nor retry is legal
        assert!(run.advance().is_err());
        assert!(run.retry().is_err());
    }

    #[test]
    fn test_satisfied_data_chain_skips_through() {
        // D1 -> D2 -> S1 where D2 needs a value D1 already provides
        let mut graph = Graph::new();
        graph.add_node(node("d1", NodeKind::Data, json!({"properties": {"x": {"type": "string"}}}))).unwrap();
        graph.add_node(node("d2", NodeKind::Data, json!({"properties": {"x": {"type": "string"}}}))).unwrap();
        graph.add_node(node("s1", NodeKind::Service, json!({}))).unwrap();
        graph.add_edge(Edge::new("e1", "d1", "d2")).unwrap();
        graph.add_edge(Edge::new("e2", "d2", "s1")).unwrap();

        let mut run = Run::start(graph).unwrap();
        assert_eq!(run.state(), RunState::AwaitingInput);
        run.submit_inputs(Vars::from(json!({"x": "v"}))).unwrap();

        // both data nodes are satisfied, the run lands on the service node
        assert_eq!(run.current_node(), "s1");
        assert_eq!(run.state(), RunState::Running);
    }

    #[test]
    fn test_data_only_workflow_finishes() {
        let mut graph = Graph::new();
        graph.add_node(node("d1", NodeKind::Data, json!({"properties": {"x": {"type": "string"}}}))).unwrap();
        let mut run = Run::start(graph).unwrap();

        run.submit_inputs(Vars::from(json!({"x": "v"}))).unwrap();
        assert_eq!(run.state(), RunState::Finished);
    }
}
