//! HTTP implementation of the generation service.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{
    AgentflowError, Result,
    common::Vars,
    generate::{Generator, ServiceDraft},
    graph::NodeKind,
    schema::SchemaDoc,
};

const RUN_NODE_PATH: &str = "/run-node";
const DRAFT_SERVICE_PATH: &str = "/generate-service";

/// Generation client talking JSON over HTTP.
///
/// Two endpoints are used: `{endpoint}/run-node` for step execution and
/// `{endpoint}/generate-service` for the editor's assist feature. The
/// remote service is expected to answer with a bare JSON object; anything
/// else is a generation failure.
pub struct HttpGenerator {
    client: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
}

impl HttpGenerator {
    pub fn new(
        endpoint: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        }
    }

    async fn post(
        &self,
        path: &str,
        body: Value,
    ) -> Result<Value> {
        let mut request = self.client.post(format!("{}{}", self.endpoint, path)).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| AgentflowError::Generation(format!("generation request failed: {}", e)))?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AgentflowError::Generation(format!("generation service returned {}: {}", status, text)));
        }

        response.json::<Value>().await.map_err(|e| AgentflowError::Generation(format!("generation response is not valid JSON: {}", e)))
    }

    /// Assist responses may carry schemas either as JSON objects or as
    /// serialized schema text; accept both.
    fn schema_field(
        value: Option<&Value>,
    ) -> Result<SchemaDoc> {
        match value {
            None | Some(Value::Null) => Ok(SchemaDoc::empty()),
            Some(Value::String(text)) => SchemaDoc::parse(text),
            Some(other) => SchemaDoc::from_value(other.clone()),
        }
    }
}

#[async_trait]
impl Generator for HttpGenerator {
    async fn run_node(
        &self,
        definition: &str,
        input: &Vars,
        output_schema: &SchemaDoc,
    ) -> Result<Value> {
        let body = json!({
            "model": self.model,
            "definition": definition,
            "inputData": Value::from(input.clone()),
            "outputSchema": output_schema.as_value(),
        });

        let result = self.post(RUN_NODE_PATH, body).await?;
        if !result.is_object() {
            return Err(AgentflowError::Generation(format!("generation result is not a JSON object: {}", result)));
        }

        // The output contract is advisory for the remote model; mismatches
        // are logged, not fatal, since extra keys are tolerated downstream.
        if !output_schema.is_empty() {
            if let Err(e) = jsonschema::validate(&output_schema.as_value(), &result) {
                tracing::warn!("generation result does not match output schema: {}", e);
            }
        }

        Ok(result)
    }

    async fn draft_service(
        &self,
        intention: &str,
        context_schema: Option<&SchemaDoc>,
        kind: NodeKind,
    ) -> Result<ServiceDraft> {
        let mut body = json!({
            "model": self.model,
            "intention": intention,
            "nodeType": kind.as_ref(),
        });
        if let Some(context) = context_schema {
            body["contextSchema"] = context.as_value();
        }

        let result = self.post(DRAFT_SERVICE_PATH, body).await?;

        let widgets = match result.get("widgets") {
            Some(value) => serde_json::from_value(value.clone()).unwrap_or_default(),
            None => Vec::new(),
        };

        Ok(ServiceDraft {
            label: result.get("label").and_then(Value::as_str).unwrap_or_default().to_string(),
            definition: result.get("definition").and_then(Value::as_str).unwrap_or_default().to_string(),
            input_schema: Self::schema_field(result.get("inputSchema"))?,
            output_schema: Self::schema_field(result.get("outputSchema"))?,
            widgets,
        })
    }
}
