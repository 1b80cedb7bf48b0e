//! Core types for the script editor's flow graphs
//!
//! These types define the authoring data model: tasks, nodes, edges and
//! canvas positions. They carry no execution semantics — the automation
//! runtime consumes them through its own boundary.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::registry::{NodeData, NodeKind};

/// Unique identifier for a node (unique within its task)
pub type NodeId = String;

/// Unique identifier for an edge
pub type EdgeId = String;

/// Unique identifier for a task
pub type TaskId = String;

/// A position on the editor canvas, in graph coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Offset this position by another (used for template expansion).
    pub fn offset(self, other: Position) -> Self {
        Self {
            x: self.x + other.x,
            y: self.y + other.y,
        }
    }
}

/// A node instance in a task's flow graph.
///
/// `render_kind` is the canvas renderer discriminator and is always
/// `"custom"`; the behavioral type lives in `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowNode {
    /// Unique identifier within the owning task
    pub id: NodeId,
    /// Canvas renderer discriminator
    #[serde(rename = "type", default = "default_render_kind")]
    pub render_kind: String,
    /// Display label
    #[serde(default)]
    pub label: String,
    /// Position on the canvas
    pub position: Position,
    /// Type-specific configuration
    pub data: NodeData,
}

fn default_render_kind() -> String {
    "custom".to_string()
}

impl FlowNode {
    /// Create a node with the custom renderer kind.
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        position: Position,
        data: NodeData,
    ) -> Self {
        Self {
            id: id.into(),
            render_kind: default_render_kind(),
            label: label.into(),
            position,
            data,
        }
    }

    /// The behavioral kind of this node.
    pub fn kind(&self) -> NodeKind {
        self.data.kind()
    }
}

/// A directed, handle-typed edge between two nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowEdge {
    /// Deterministic identifier derived from endpoints and handles
    pub id: EdgeId,
    /// Source node id
    pub source: NodeId,
    /// Target node id
    pub target: NodeId,
    /// Named connection point on the source node
    pub source_handle: String,
    /// Named connection point on the target node
    pub target_handle: String,
    /// Display label, taken from the handle table
    #[serde(default)]
    pub label: Option<String>,
    /// Whether the canvas animates this edge
    #[serde(default)]
    pub animated: bool,
}

/// A named, independently editable automation graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier from the external id provider
    pub id: TaskId,
    /// Display name
    pub name: String,
    /// Display hint only; hidden tasks stay fully editable
    #[serde(default)]
    pub hidden: bool,
    /// Nodes in this task's graph
    pub nodes: Vec<FlowNode>,
    /// Edges connecting the nodes
    pub edges: Vec<FlowEdge>,
    /// Opaque per-task UI state (viewport, collapsed panels, ...)
    #[serde(default)]
    pub ui_data: HashMap<String, serde_json::Value>,
    /// Task-scoped variables shared with the automation runtime
    #[serde(default)]
    pub variables: HashMap<String, serde_json::Value>,
}

impl Task {
    /// Create an empty task shell.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            hidden: false,
            nodes: Vec::new(),
            edges: Vec::new(),
            ui_data: HashMap::new(),
            variables: HashMap::new(),
        }
    }

    /// Create a task seeded with the start/end skeleton.
    pub fn with_skeleton(id: impl Into<String>, name: impl Into<String>) -> Self {
        let mut task = Self::new(id, name);
        task.nodes.push(FlowNode::new(
            "start-1",
            "开始",
            Position::new(200.0, 50.0),
            NodeKind::Start.defaults(),
        ));
        task.nodes.push(FlowNode::new(
            "end-1",
            "结束",
            Position::new(200.0, 150.0),
            NodeKind::End.defaults(),
        ));
        task
    }

    /// Find a node by id.
    pub fn find_node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Count nodes of the given kind.
    pub fn count_kind(&self, kind: &NodeKind) -> usize {
        self.nodes.iter().filter(|n| &n.kind() == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skeleton_task_has_one_start_one_end_no_edges() {
        let task = Task::with_skeleton("t-1", "Login");
        assert_eq!(task.count_kind(&NodeKind::Start), 1);
        assert_eq!(task.count_kind(&NodeKind::End), 1);
        assert!(task.edges.is_empty());
    }

    #[test]
    fn node_serializes_with_custom_render_kind() {
        let node = FlowNode::new(
            "n-1",
            "Click",
            Position::new(10.0, 20.0),
            NodeKind::Click.defaults(),
        );
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["type"], "custom");
        assert_eq!(json["data"]["type"], "click");
        assert_eq!(json["position"]["x"], 10.0);
    }

    #[test]
    fn task_serde_roundtrip() {
        let task = Task::with_skeleton("t-rt", "Roundtrip");
        let json = serde_json::to_string(&task).unwrap();
        let restored: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.id, "t-rt");
        assert_eq!(restored.nodes.len(), 2);
        assert_eq!(restored.count_kind(&NodeKind::Start), 1);
    }
}
