mod edge;
#[allow(clippy::module_inception)]
pub(crate) mod graph;
mod inherit;
mod node;

pub use edge::{Edge, EdgeId};
pub use graph::Graph;
pub use inherit::{resolve_effective_input, resolve_injected_input};
pub use node::{Node, NodeId, NodeKind, NodePatch};
