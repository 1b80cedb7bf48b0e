//! Flow Engine - Flow-graph authoring core for the Tapflow script editor
//!
//! This crate implements the data model and mutation rules behind the
//! visual script editor: automations are authored as directed graphs of
//! typed nodes connected by handle-typed edges, grouped into named tasks.
//! It supports:
//!
//! - A closed node-type registry with per-kind defaults and display metadata
//! - Handle-table connection validation with label/animation semantics
//! - Single-node creation and declarative multi-node template expansion
//! - A staged, confirmation-guarded deletion workflow protecting start/end
//! - Task switching with save-on-switch persistence of in-progress edits
//! - A shared drag-and-drop context bridging the palette and the canvas
//! - A bounded console sink auditing every accepted and rejected mutation
//!
//! # Architecture
//!
//! All state mutates synchronously inside `&mut self` operations; the only
//! suspension points are awaits on the external id provider. Rejected
//! mutations are reported through the [`console::ConsoleSink`] and leave
//! the graph untouched, so hosts treat the console as the audit trail and
//! the `Result` surface as external-failure propagation only.
//!
//! Rendering, graph execution and persistence stay outside: the canvas
//! contributes a coordinate transform at registration, the automation
//! runtime consumes finished [`types::Task`] values through its own
//! boundary.

pub mod console;
pub mod dnd;
pub mod error;
pub mod graph;
pub mod handles;
pub mod manager;
pub mod registry;
pub mod session;
pub mod templates;
pub mod types;

// Re-export key types
pub use console::{ConsoleSink, LogEntry, LogLevel, SharedConsole};
pub use dnd::{DragDropCoordinator, DragHost, DragState, DropRequest, NullDragHost, ScreenPoint};
pub use error::{FlowEngineError, Result};
pub use graph::{Connection, DeleteState, FlowGraph};
pub use manager::TaskManager;
pub use registry::{NodeCategory, NodeData, NodeKind, NodeMeta};
pub use session::EditorSession;
pub use templates::NodeTemplate;
pub use types::{EdgeId, FlowEdge, FlowNode, NodeId, Position, Task, TaskId};

// Re-export the identity surface consumers wire in
pub use tapflow_runtime_identity::{IdProvider, IdentityError, SequentialProvider, UuidProvider};
