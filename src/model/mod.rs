mod edge;
mod node;
mod workflow;

pub use edge::EdgeModel;
pub use node::{NodeModel, Position, WidgetBindingModel};
pub use workflow::WorkflowModel;
