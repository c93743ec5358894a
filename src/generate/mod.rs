//! External text-generation service interface.
//!
//! The service is a black box to the engine: a structured request goes
//! in, a structured JSON object comes out, and every failure surfaces as
//! [`AgentflowError::Generation`](crate::AgentflowError::Generation).

mod http;

use async_trait::async_trait;
use serde_json::Value;

use crate::{Result, common::Vars, graph::NodeKind, model::WidgetBindingModel, schema::SchemaDoc};

pub use http::HttpGenerator;

/// A service definition drafted by the assist call.
#[derive(Debug, Clone, Default)]
pub struct ServiceDraft {
    pub label: String,
    pub definition: String,
    pub input_schema: SchemaDoc,
    pub output_schema: SchemaDoc,
    pub widgets: Vec<WidgetBindingModel>,
}

/// The external generation service.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Execute one workflow step: given the node's goal, the accumulated
    /// input data and the required output schema, produce a JSON object
    /// whose keys match the schema's properties.
    async fn run_node(
        &self,
        definition: &str,
        input: &Vars,
        output_schema: &SchemaDoc,
    ) -> Result<Value>;

    /// Draft a node definition from a natural-language intention,
    /// optionally constrained by the upstream context schema. Backs the
    /// editor's AI-assist fill feature.
    async fn draft_service(
        &self,
        intention: &str,
        context_schema: Option<&SchemaDoc>,
        kind: NodeKind,
    ) -> Result<ServiceDraft>;
}
