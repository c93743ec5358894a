//! # Agentflow
//!
//! Agentflow is an embeddable engine for visual agent workflows: directed
//! graphs of data nodes (user-supplied values) and service nodes (steps
//! executed by an external text-generation service).
//!
//! ## Core Features
//!
//! - **Schema-Driven Graphs**: Every node carries JSON-schema input/output
//!   contracts; downstream nodes inherit their effective input from upstream
//! - **Step-Wise Execution**: Runs walk the graph one node at a time, with
//!   user confirmation between steps and display-only output filtering
//! - **Undoable Editing**: All structural mutations go through a bounded
//!   undo/redo history
//! - **Pluggable Storage**: Workflows persist as single JSON documents
//!   through the `WorkflowStore` trait
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use agentflow::{EngineBuilder, Vars, WorkflowModel};
//!
//! let engine = EngineBuilder::new().build()?;
//!
//! let workflow = WorkflowModel::from_json(json_str)?;
//! engine.deploy(&workflow)?;
//!
//! let rid = engine.start_run(&workflow.id)?;
//! engine.submit_run_inputs(&rid, Vars::from(inputs))?;
//! engine.step_run(&rid)?;
//! engine.advance_run(&rid)?;
//! ```

mod builder;
mod common;
mod config;
mod editor;
mod engine;
mod error;
mod generate;
mod graph;
mod history;
mod model;
mod runner;
mod schema;
mod store;
mod utils;
mod widget;

use std::sync::{Arc, RwLock};

pub use builder::EngineBuilder;
pub use common::{MemCache, Vars};
pub use config::{Config, GeneratorConfig, StoreConfig, StoreType};
pub use editor::Editor;
pub use engine::Engine;
pub use error::AgentflowError;
pub use generate::{Generator, HttpGenerator, ServiceDraft};
pub use graph::{Edge, EdgeId, Graph, Node, NodeId, NodeKind, NodePatch, resolve_effective_input, resolve_injected_input};
pub use history::History;
pub use model::*;
pub use runner::{Run, RunId, RunState};
pub use schema::{MergedSchema, Provenance, SchemaDoc, SchemaEntry, descriptor_to_schema, merge_schemas, schema_to_descriptor};
pub use store::{MemStore, WorkflowStore, WorkflowSummary};
pub use widget::{WidgetKind, WidgetRegistry, WidgetRule};

/// Result type alias for Agentflow operations.
pub type Result<T> = std::result::Result<T, AgentflowError>;

/// Thread-safe shared lock wrapper using Arc<RwLock<T>>.
pub(crate) type ShareLock<T> = Arc<RwLock<T>>;
