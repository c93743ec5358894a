//! The workflow graph data store.
//!
//! Wraps the node/edge model in a directed graph structure (using
//! petgraph) and exposes id-keyed mutation and read primitives. The graph
//! is the single source of truth for the editor; the inheritance resolver
//! and the history manager both operate on it (or on clones of it).

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableDiGraph};

use crate::{
    AgentflowError, Result,
    graph::{
        edge::{Edge, EdgeId},
        node::{Node, NodeId, NodePatch},
    },
    model::{EdgeModel, NodeModel, WorkflowModel},
};

/// Directed workflow graph over `{nodes, edges}`.
///
/// A stable graph keeps indices valid across removals, but freed indices
/// are reused, so index order is not creation order once anything has
/// been removed. Root detection and edge traversal must be deterministic
/// in creation order, which is tracked explicitly in the id lists.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    graph: StableDiGraph<Node, Edge>,
    node_order: Vec<NodeId>,
    edge_order: Vec<EdgeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            graph: StableDiGraph::default(),
            node_order: Vec::new(),
            edge_order: Vec::new(),
        }
    }

    fn index_of(
        &self,
        id: &str,
    ) -> Option<NodeIndex> {
        self.graph.node_indices().find(|idx| self.graph[*idx].id == id)
    }

    fn edge_index_of(
        &self,
        id: &str,
    ) -> Option<EdgeIndex> {
        self.graph.edge_indices().find(|idx| self.graph[*idx].id == id)
    }

    /// Add a node to the graph. Node ids must be unique.
    pub fn add_node(
        &mut self,
        node: Node,
    ) -> Result<NodeId> {
        if self.index_of(&node.id).is_some() {
            return Err(AgentflowError::Graph(format!("duplicate node id: {}", node.id)));
        }
        let id = node.id.clone();
        self.graph.add_node(node);
        self.node_order.push(id.clone());
        Ok(id)
    }

    /// Shallow-merge a partial payload into an existing node.
    pub fn update_node(
        &mut self,
        id: &str,
        patch: NodePatch,
    ) -> Result<()> {
        let idx = self.index_of(id).ok_or_else(|| AgentflowError::Node(format!("node {} not found", id)))?;
        self.graph[idx].apply(patch);
        Ok(())
    }

    /// Remove a node and all edges referencing it.
    pub fn remove_node(
        &mut self,
        id: &str,
    ) -> Result<Node> {
        let idx = self.index_of(id).ok_or_else(|| AgentflowError::Node(format!("node {} not found", id)))?;
        let incident: Vec<EdgeId> = self.graph.edge_indices().map(|eidx| &self.graph[eidx]).filter(|e| e.source == id || e.target == id).map(|e| e.id.clone()).collect();
        self.edge_order.retain(|eid| !incident.contains(eid));
        self.node_order.retain(|nid| nid != id);
        // petgraph drops incident edges together with the node
        self.graph.remove_node(idx).ok_or_else(|| AgentflowError::Node(format!("node {} not found", id)))
    }

    /// Add an edge; both endpoints must exist.
    pub fn add_edge(
        &mut self,
        edge: Edge,
    ) -> Result<EdgeId> {
        let source = self.index_of(&edge.source).ok_or_else(|| AgentflowError::Edge(format!("source node {} not found", edge.source)))?;
        let target = self.index_of(&edge.target).ok_or_else(|| AgentflowError::Edge(format!("target node {} not found", edge.target)))?;
        let id = edge.id.clone();
        self.graph.add_edge(source, target, edge);
        self.edge_order.push(id.clone());
        Ok(id)
    }

    pub fn remove_edge(
        &mut self,
        id: &str,
    ) -> Result<Edge> {
        let idx = self.edge_index_of(id).ok_or_else(|| AgentflowError::Edge(format!("edge {} not found", id)))?;
        self.edge_order.retain(|eid| eid != id);
        self.graph.remove_edge(idx).ok_or_else(|| AgentflowError::Edge(format!("edge {} not found", id)))
    }

    pub fn node(
        &self,
        id: &str,
    ) -> Option<&Node> {
        self.index_of(id).map(|idx| &self.graph[idx])
    }

    pub fn edge(
        &self,
        id: &str,
    ) -> Option<&Edge> {
        self.edge_index_of(id).map(|idx| &self.graph[idx])
    }

    /// Nodes in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.node_order.iter().filter_map(|id| self.node(id))
    }

    /// Edges in creation order.
    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.edge_order.iter().filter_map(|id| self.edge(id))
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Incoming edges of a node, in creation order.
    pub fn incoming_edges(
        &self,
        id: &str,
    ) -> Vec<&Edge> {
        self.edges().filter(|e| e.target == id).collect()
    }

    /// Outgoing edges of a node, in creation order.
    pub fn outgoing_edges(
        &self,
        id: &str,
    ) -> Vec<&Edge> {
        self.edges().filter(|e| e.source == id).collect()
    }

    /// The oldest outgoing edge of a node, which is the path the
    /// interpreter follows.
    pub fn first_outgoing(
        &self,
        id: &str,
    ) -> Option<&Edge> {
        self.outgoing_edges(id).into_iter().next()
    }

    /// Find the workflow root: the first node in creation order with no
    /// incoming edge.
    pub fn find_root(&self) -> Result<&Node> {
        self.nodes().find(|n| self.edges().all(|e| e.target != n.id)).ok_or_else(|| AgentflowError::Graph("no root node found".to_string()))
    }

    /// Best-effort check of a node's widget bindings: returns the names
    /// of `targetProperty` values that exist in neither the input nor the
    /// output schema. Dangling bindings degrade gracefully in the UI, so
    /// this never fails.
    pub fn check_widget_bindings(
        &self,
        id: &str,
    ) -> Vec<String> {
        let Some(node) = self.node(id) else {
            return Vec::new();
        };
        node.widgets
            .iter()
            .filter(|w| node.input_schema.property(&w.target_property).is_none() && node.output_schema.property(&w.target_property).is_none())
            .map(|w| w.target_property.clone())
            .collect()
    }

    /// Split the graph back into persistable node and edge lists.
    pub fn to_parts(&self) -> (Vec<NodeModel>, Vec<EdgeModel>) {
        let nodes = self.nodes().map(Node::to_model).collect();
        let edges = self.edges().map(EdgeModel::from).collect();
        (nodes, edges)
    }

    fn from_model_with<F>(
        model: &WorkflowModel,
        convert: F,
    ) -> Result<Self>
    where
        F: Fn(&NodeModel) -> Result<Node>,
    {
        let mut graph = Self::new();
        for node_model in model.nodes.iter() {
            graph.add_node(convert(node_model)?)?;
        }
        for edge_model in model.edges.iter() {
            graph.add_edge(Edge::from(edge_model))?;
        }
        Ok(graph)
    }

    /// Lenient load for editor contexts: malformed node schemas fall back
    /// to `{}` instead of failing the document.
    pub fn from_model_lossy(model: &WorkflowModel) -> Result<Self> {
        Self::from_model_with(model, Node::from_model_lossy)
    }
}

impl TryFrom<&WorkflowModel> for Graph {
    type Error = AgentflowError;

    /// Strict load for execution contexts, where a malformed schema must
    /// fail instead of silently becoming `{}`.
    fn try_from(model: &WorkflowModel) -> Result<Self> {
        Self::from_model_with(model, Node::try_from_model)
    }
}
