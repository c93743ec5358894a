//! Error types for Agentflow.
//!
//! All errors in Agentflow are represented by the `AgentflowError` enum,
//! which provides specific variants for different error categories.

use std::io::ErrorKind;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Unified error type for all Agentflow operations.
///
/// Each variant represents a specific category of error that can occur
/// while editing a workflow graph, resolving schemas, executing a run,
/// or talking to the persistence adapter.
#[derive(Deserialize, Serialize, Error, Debug, Clone, PartialEq)]
pub enum AgentflowError {
    /// Engine-level errors (startup, shutdown, wiring).
    #[error("{0}")]
    Engine(String),

    /// Configuration parsing or validation errors.
    #[error("{0}")]
    Config(String),

    /// Data conversion errors (JSON and friends).
    #[error("{0}")]
    Convert(String),

    /// Malformed schema text or schema documents.
    #[error("{0}")]
    Schema(String),

    /// Graph structure errors (no root, unknown endpoints, duplicate ids).
    #[error("{0}")]
    Graph(String),

    /// Workflow document errors.
    #[error("{0}")]
    Workflow(String),

    /// Node definition errors.
    #[error("{0}")]
    Node(String),

    /// Edge definition errors.
    #[error("{0}")]
    Edge(String),

    /// External generation call errors (transport failure or a
    /// response that is not valid JSON).
    #[error("{0}")]
    Generation(String),

    /// Run state machine errors (transitions invoked in the wrong state).
    #[error("{0}")]
    Runtime(String),

    /// Storage operation errors.
    #[error("{0}")]
    Store(String),

    /// I/O operation errors.
    #[error("{0}")]
    IoError(String),
}

impl From<AgentflowError> for String {
    fn from(val: AgentflowError) -> Self {
        val.to_string()
    }
}

impl From<std::io::Error> for AgentflowError {
    fn from(error: std::io::Error) -> Self {
        AgentflowError::IoError(error.to_string())
    }
}

impl From<AgentflowError> for std::io::Error {
    fn from(val: AgentflowError) -> Self {
        #[allow(clippy::io_other_error)]
        std::io::Error::new(ErrorKind::Other, val.to_string())
    }
}

impl From<serde_json::Error> for AgentflowError {
    fn from(error: serde_json::Error) -> Self {
        AgentflowError::Convert(error.to_string())
    }
}

impl From<jsonschema::ValidationError<'_>> for AgentflowError {
    fn from(error: jsonschema::ValidationError<'_>) -> Self {
        AgentflowError::Runtime(error.to_string())
    }
}
