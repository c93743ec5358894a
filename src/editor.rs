//! Workflow editor session.
//!
//! All structural mutations flow through the editor, which takes a
//! history snapshot before applying each one. Call sites therefore never
//! need to remember to snapshot themselves.

use crate::{
    AgentflowError, Result,
    graph::{Edge, EdgeId, Graph, Node, NodeId, NodeKind, NodePatch, resolve_effective_input, resolve_injected_input},
    history::History,
    model::{Position, WorkflowModel},
    schema::MergedSchema,
    store::WorkflowStore,
    utils,
};

/// A single-writer editing session over one workflow graph.
pub struct Editor {
    id: String,
    name: String,
    desc: String,
    graph: Graph,
    history: History,
}

impl Editor {
    /// Start an empty workflow.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        desc: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            desc: desc.into(),
            graph: Graph::new(),
            history: History::new(),
        }
    }

    /// Open a persisted workflow document. Malformed node schemas fall
    /// back to `{}` here; editing must stay possible on damaged documents.
    pub fn from_model(model: &WorkflowModel) -> Result<Self> {
        Ok(Self {
            id: model.id.clone(),
            name: model.name.clone(),
            desc: model.desc.clone(),
            graph: Graph::from_model_lossy(model)?,
            history: History::new(),
        })
    }

    /// Load a workflow from the store and open it.
    pub fn load(
        store: &dyn WorkflowStore,
        id: &str,
    ) -> Result<Self> {
        let model = store.load(id)?;
        Self::from_model(&model)
    }

    /// Persist the current graph as a single document.
    pub fn save(
        &self,
        store: &dyn WorkflowStore,
    ) -> Result<()> {
        tracing::debug!("editor::save({})", self.id);
        store.save(&self.to_model())
    }

    pub fn to_model(&self) -> WorkflowModel {
        let (nodes, edges) = self.graph.to_parts();
        WorkflowModel {
            id: self.id.clone(),
            name: self.name.clone(),
            desc: self.desc.clone(),
            nodes,
            edges,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    /// Add a node of the given kind at a canvas position, applying an
    /// optional initial payload on top of the kind's defaults.
    pub fn add_node(
        &mut self,
        kind: NodeKind,
        position: Position,
        payload: NodePatch,
    ) -> Result<NodeId> {
        self.history.snapshot(&self.graph);

        let mut node = Node {
            id: utils::longid(),
            kind,
            label: match kind {
                NodeKind::Data => "New Data".to_string(),
                NodeKind::Service => "New Agent".to_string(),
            },
            definition: String::new(),
            input_schema: Default::default(),
            output_schema: Default::default(),
            position,
            widgets: Vec::new(),
        };
        node.apply(payload);
        self.graph.add_node(node)
    }

    /// Shallow-merge a partial payload into a node. Existence is checked
    /// before the snapshot so a failed update leaves no undo entry.
    pub fn update_node(
        &mut self,
        id: &str,
        patch: NodePatch,
    ) -> Result<()> {
        self.require_node(id)?;
        self.history.snapshot(&self.graph);
        self.graph.update_node(id, patch)
    }

    /// Remove a node together with all edges referencing it.
    pub fn remove_node(
        &mut self,
        id: &str,
    ) -> Result<()> {
        self.require_node(id)?;
        self.history.snapshot(&self.graph);
        self.graph.remove_node(id).map(|_| ())
    }

    /// Connect two nodes.
    pub fn add_edge(
        &mut self,
        source: &str,
        target: &str,
        source_handle: Option<String>,
        target_handle: Option<String>,
    ) -> Result<EdgeId> {
        self.require_node(source)?;
        self.require_node(target)?;
        self.history.snapshot(&self.graph);
        self.graph.add_edge(Edge {
            id: utils::longid(),
            source: source.to_string(),
            target: target.to_string(),
            source_handle,
            target_handle,
        })
    }

    pub fn remove_edge(
        &mut self,
        id: &str,
    ) -> Result<()> {
        if self.graph.edge(id).is_none() {
            return Err(AgentflowError::Edge(format!("edge {} not found", id)));
        }
        self.history.snapshot(&self.graph);
        self.graph.remove_edge(id).map(|_| ())
    }

    fn require_node(
        &self,
        id: &str,
    ) -> Result<()> {
        if self.graph.node(id).is_none() {
            return Err(AgentflowError::Node(format!("node {} not found", id)));
        }
        Ok(())
    }

    /// Record the state at the start of a node drag, so the whole drag
    /// collapses into a single undo step.
    pub fn begin_drag(&mut self) {
        self.history.snapshot(&self.graph);
    }

    /// Create a new node wired from an existing one: the source's output
    /// schema becomes the new node's input schema, and the connecting
    /// edge is added in the same undo step.
    pub fn extend_from(
        &mut self,
        source_id: &str,
        kind: NodeKind,
        position: Position,
        source_handle: Option<String>,
    ) -> Result<(NodeId, EdgeId)> {
        let inherited = self
            .graph
            .node(source_id)
            .map(|n| n.output_schema.clone())
            .ok_or_else(|| AgentflowError::Node(format!("node {} not found", source_id)))?;

        self.history.snapshot(&self.graph);

        let node = Node {
            id: utils::longid(),
            kind,
            label: match kind {
                NodeKind::Data => "New Data".to_string(),
                NodeKind::Service => "New Agent".to_string(),
            },
            definition: String::new(),
            input_schema: inherited,
            output_schema: Default::default(),
            position,
            widgets: Vec::new(),
        };
        let node_id = self.graph.add_node(node)?;

        let edge_id = self.graph.add_edge(Edge {
            id: utils::longid(),
            source: source_id.to_string(),
            target: node_id.clone(),
            source_handle,
            target_handle: None,
        })?;

        Ok((node_id, edge_id))
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.graph)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.graph)
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// The effective input contract of a node, inherited from upstream.
    pub fn effective_input(
        &self,
        id: &str,
    ) -> MergedSchema {
        resolve_effective_input(&self.graph, id)
    }

    /// Only the injected (data-node) portion of a node's input.
    pub fn injected_input(
        &self,
        id: &str,
    ) -> MergedSchema {
        resolve_injected_input(&self.graph, id)
    }
}
