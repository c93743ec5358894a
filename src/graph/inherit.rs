//! Inheritance resolver: computes a node's effective input contract from
//! its upstream neighbors.
//!
//! Each upstream contributor is classified by kind. A data node's output
//! is an injected, transparent pass-through: the walk recurses through it
//! so chains of data-only nodes keep forwarding whatever they themselves
//! inherit. A service node's output is a standard contribution and the
//! walk stops at that edge; a service node's own inputs are never
//! inherited by its downstream consumers.

use crate::{
    graph::{Graph, NodeId, NodeKind},
    schema::{MergedSchema, Provenance, SchemaEntry, merge_schemas},
};

/// Compute the effective input schema of `node_id`.
///
/// Contributions are collected in traversal order (incoming edges in
/// stored order, depth-first through data chains) and merged last-wins,
/// so contributions discovered later take precedence on key collision.
/// A node with no incoming edges resolves to the empty schema.
pub fn resolve_effective_input(
    graph: &Graph,
    node_id: &str,
) -> MergedSchema {
    let mut entries = Vec::new();
    let mut path: Vec<NodeId> = vec![node_id.to_string()];
    collect_upstream(graph, node_id, false, &mut path, &mut entries);
    merge_schemas(&entries)
}

/// Compute only the injected portion of a node's input: contributions
/// arriving through directly connected data nodes and their upstream
/// chains. Used by the editor's "injected data" panel on service nodes.
pub fn resolve_injected_input(
    graph: &Graph,
    node_id: &str,
) -> MergedSchema {
    let mut entries = Vec::new();
    for edge in graph.incoming_edges(node_id) {
        let Some(source) = graph.node(&edge.source) else {
            continue;
        };
        if source.kind != NodeKind::Data {
            continue;
        }
        if !source.output_schema.is_empty() {
            entries.push(SchemaEntry::new(source.output_schema.clone(), Provenance::Injected));
        }
        let mut path = vec![node_id.to_string(), source.id.clone()];
        collect_upstream(graph, &source.id, true, &mut path, &mut entries);
    }
    merge_schemas(&entries)
}

/// Walk the incoming edges of `node_id`, appending schema contributions.
///
/// `via_data` marks that this node was reached through a data chain, in
/// which case every contribution counts as injected. `path` holds the
/// node ids on the current recursion stack; revisiting one terminates
/// that branch so malformed cyclic data chains cannot recurse forever.
fn collect_upstream(
    graph: &Graph,
    node_id: &str,
    via_data: bool,
    path: &mut Vec<NodeId>,
    entries: &mut Vec<SchemaEntry>,
) {
    for edge in graph.incoming_edges(node_id) {
        let Some(source) = graph.node(&edge.source) else {
            continue;
        };

        if path.iter().any(|id| *id == source.id) {
            tracing::warn!("cycle detected in upstream chain at node {}, truncating branch", source.id);
            continue;
        }

        if !source.output_schema.is_empty() {
            let provenance = if via_data || source.kind == NodeKind::Data {
                Provenance::Injected
            } else {
                Provenance::Standard
            };
            entries.push(SchemaEntry::new(source.output_schema.clone(), provenance));
        }

        // recursion continues through data nodes only
        if source.kind == NodeKind::Data {
            path.push(source.id.clone());
            collect_upstream(graph, &source.id, true, path, entries);
            path.pop();
        }
    }
}

#[cfg(test)]
mod test {
    use super::{resolve_effective_input, resolve_injected_input};
    use crate::{
        graph::{Edge, Graph, NodeKind, graph::test::node},
        schema::Provenance,
    };
    use serde_json::json;

    #[test]
    fn test_no_incoming_edges_resolves_empty() {
        let mut graph = Graph::new();
        graph.add_node(node("s1", NodeKind::Service, json!({}))).unwrap();

        assert!(resolve_effective_input(&graph, "s1").is_empty());
    }

    #[test]
    fn test_data_chain_passes_through() {
        // D1 -> D2 -> S1: S1 must see both x (via D2) and y (from D2)
        let mut graph = Graph::new();
        graph.add_node(node("d1", NodeKind::Data, json!({"properties": {"x": {"type": "string"}}}))).unwrap();
        graph.add_node(node("d2", NodeKind::Data, json!({"properties": {"y": {"type": "number"}}}))).unwrap();
        graph.add_node(node("s1", NodeKind::Service, json!({}))).unwrap();
        graph.add_edge(Edge::new("e1", "d1", "d2")).unwrap();
        graph.add_edge(Edge::new("e2", "d2", "s1")).unwrap();

        let merged = resolve_effective_input(&graph, "s1");
        assert!(merged.doc.property("x").is_some());
        assert!(merged.doc.property("y").is_some());
        assert_eq!(merged.provenance["x"], Provenance::Injected);
        assert_eq!(merged.provenance["y"], Provenance::Injected);
    }

    #[test]
    fn test_recursion_stops_at_service_boundary() {
        // S0 -> S1: S1 inherits S0's output, never S0's own inputs
        let mut graph = Graph::new();
        let mut s0 = node("s0", NodeKind::Service, json!({"properties": {"z": {"type": "boolean"}}}));
        s0.input_schema = crate::schema::SchemaDoc::from_value(json!({"properties": {"secret": {"type": "string"}}})).unwrap();
        graph.add_node(s0).unwrap();
        graph.add_node(node("s1", NodeKind::Service, json!({}))).unwrap();
        graph.add_edge(Edge::new("e1", "s0", "s1")).unwrap();

        let merged = resolve_effective_input(&graph, "s1");
        assert!(merged.doc.property("z").is_some());
        assert!(merged.doc.property("secret").is_none());
        assert_eq!(merged.provenance["z"], Provenance::Standard);
    }

    #[test]
    fn test_service_upstream_of_service_not_pulled() {
        // S_far -> S0 -> S1: S_far's output stops at S0
        let mut graph = Graph::new();
        graph.add_node(node("far", NodeKind::Service, json!({"properties": {"far": {"type": "string"}}}))).unwrap();
        graph.add_node(node("s0", NodeKind::Service, json!({"properties": {"z": {"type": "boolean"}}}))).unwrap();
        graph.add_node(node("s1", NodeKind::Service, json!({}))).unwrap();
        graph.add_edge(Edge::new("e1", "far", "s0")).unwrap();
        graph.add_edge(Edge::new("e2", "s0", "s1")).unwrap();

        let merged = resolve_effective_input(&graph, "s1");
        assert!(merged.doc.property("far").is_none());
        assert!(merged.doc.property("z").is_some());
    }

    #[test]
    fn test_cycle_terminates_with_finite_schema() {
        // D1 -> D2 -> D1 (malformed) plus D2 -> S1
        let mut graph = Graph::new();
        graph.add_node(node("d1", NodeKind::Data, json!({"properties": {"a": {"type": "string"}}}))).unwrap();
        graph.add_node(node("d2", NodeKind::Data, json!({"properties": {"b": {"type": "string"}}}))).unwrap();
        graph.add_node(node("s1", NodeKind::Service, json!({}))).unwrap();
        graph.add_edge(Edge::new("e1", "d1", "d2")).unwrap();
        graph.add_edge(Edge::new("e2", "d2", "d1")).unwrap();
        graph.add_edge(Edge::new("e3", "d2", "s1")).unwrap();

        let merged = resolve_effective_input(&graph, "s1");
        assert!(merged.doc.property("a").is_some());
        assert!(merged.doc.property("b").is_some());
    }

    #[test]
    fn test_self_loop_terminates() {
        let mut graph = Graph::new();
        graph.add_node(node("d1", NodeKind::Data, json!({"properties": {"a": {"type": "string"}}}))).unwrap();
        graph.add_node(node("s1", NodeKind::Service, json!({}))).unwrap();
        graph.add_edge(Edge::new("e1", "d1", "d1")).unwrap();
        graph.add_edge(Edge::new("e2", "d1", "s1")).unwrap();

        let merged = resolve_effective_input(&graph, "s1");
        assert!(merged.doc.property("a").is_some());
    }

    #[test]
    fn test_later_contribution_wins() {
        // two data sources declare the same key with different types;
        // the edge stored later wins
        let mut graph = Graph::new();
        graph.add_node(node("d1", NodeKind::Data, json!({"properties": {"k": {"type": "string"}}}))).unwrap();
        graph.add_node(node("d2", NodeKind::Data, json!({"properties": {"k": {"type": "number"}}}))).unwrap();
        graph.add_node(node("s1", NodeKind::Service, json!({}))).unwrap();
        graph.add_edge(Edge::new("e1", "d1", "s1")).unwrap();
        graph.add_edge(Edge::new("e2", "d2", "s1")).unwrap();

        let merged = resolve_effective_input(&graph, "s1");
        assert_eq!(merged.doc.property("k").unwrap()["type"], "number");
    }

    #[test]
    fn test_injected_only_ignores_direct_service_sources() {
        let mut graph = Graph::new();
        graph.add_node(node("s0", NodeKind::Service, json!({"properties": {"z": {"type": "boolean"}}}))).unwrap();
        graph.add_node(node("d1", NodeKind::Data, json!({"properties": {"x": {"type": "string"}}}))).unwrap();
        graph.add_node(node("s1", NodeKind::Service, json!({}))).unwrap();
        graph.add_edge(Edge::new("e1", "s0", "s1")).unwrap();
        graph.add_edge(Edge::new("e2", "d1", "s1")).unwrap();

        let merged = resolve_injected_input(&graph, "s1");
        assert!(merged.doc.property("x").is_some());
        assert!(merged.doc.property("z").is_none());
    }
}
