//! Flow graph working set: the active task's live nodes and edges
//!
//! All authoring mutations go through here — node creation, connection
//! validation, template expansion and the two-step deletion workflow.
//! Rejected mutations are reported through the console sink and leave the
//! graph untouched; only external id-provider failures surface as errors.

use std::mem;
use std::sync::Arc;

use tapflow_runtime_identity::IdProvider;

use crate::console::SharedConsole;
use crate::error::{FlowEngineError, Result};
use crate::handles::{self, PLAIN_INPUT, PLAIN_OUTPUT};
use crate::registry::{NodeData, NodeKind};
use crate::templates;
use crate::types::{EdgeId, FlowEdge, FlowNode, NodeId, Position};

/// Fallback insertion point when nothing better is known.
const DEFAULT_POSITION: Position = Position { x: 200.0, y: 200.0 };

/// Vertical spacing between a node and one chained below it.
const CHAIN_SPACING: f64 = 120.0;

/// A requested connection between two node handles.
#[derive(Debug, Clone)]
pub struct Connection {
    pub source: NodeId,
    pub target: NodeId,
    pub source_handle: String,
    pub target_handle: String,
}

impl Connection {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        source_handle: impl Into<String>,
        target_handle: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            source_handle: source_handle.into(),
            target_handle: target_handle.into(),
        }
    }
}

/// Deletion workflow state.
///
/// The workflow stages a filtered set of node ids while the confirmation
/// dialog is up; nothing is mutated until [`FlowGraph::confirm_delete`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DeleteState {
    #[default]
    Idle,
    PendingConfirmation(Vec<NodeId>),
}

/// The currently edited task's live graph.
pub struct FlowGraph {
    nodes: Vec<FlowNode>,
    edges: Vec<FlowEdge>,
    selected: Option<NodeId>,
    selected_nodes: Vec<NodeId>,
    delete_state: DeleteState,
    console: SharedConsole,
    ids: Arc<dyn IdProvider>,
}

impl FlowGraph {
    pub fn new(console: SharedConsole, ids: Arc<dyn IdProvider>) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            selected: None,
            selected_nodes: Vec::new(),
            delete_state: DeleteState::Idle,
            console,
            ids,
        }
    }

    // =========================================================================
    // Working set access
    // =========================================================================

    pub fn nodes(&self) -> &[FlowNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[FlowEdge] {
        &self.edges
    }

    pub fn find_node(&self, id: &str) -> Option<&FlowNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// Replace the working set with another task's graph.
    ///
    /// Selection and any staged deletion are dropped: they refer to node
    /// ids of the outgoing task.
    pub(crate) fn load(&mut self, nodes: Vec<FlowNode>, edges: Vec<FlowEdge>) {
        self.nodes = nodes;
        self.edges = edges;
        self.selected = None;
        self.selected_nodes.clear();
        self.delete_state = DeleteState::Idle;
    }

    /// Clone the working set for save-on-switch.
    pub(crate) fn snapshot(&self) -> (Vec<FlowNode>, Vec<FlowEdge>) {
        (self.nodes.clone(), self.edges.clone())
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Canvas node click: the node becomes the primary selection.
    pub fn click_node(&mut self, id: &str) {
        if self.nodes.iter().any(|n| n.id == id) {
            self.selected = Some(id.to_string());
        }
    }

    /// Canvas blank-area click clears the primary selection.
    pub fn click_pane(&mut self) {
        self.selected = None;
    }

    /// The canvas reports its multi-selection here.
    pub fn set_selected_nodes(&mut self, ids: Vec<NodeId>) {
        self.selected_nodes = ids;
    }

    pub fn selected(&self) -> Option<&FlowNode> {
        self.selected.as_deref().and_then(|id| self.find_node(id))
    }

    pub fn selected_nodes(&self) -> &[NodeId] {
        &self.selected_nodes
    }

    // =========================================================================
    // Node creation
    // =========================================================================

    /// Create a node with registry defaults and no label.
    pub async fn create_node(&mut self, kind: &NodeKind, position: Position) -> Result<NodeId> {
        self.create_node_with(kind, position, kind.defaults(), "")
            .await
    }

    /// Create a node with explicit data and label.
    pub async fn create_node_with(
        &mut self,
        kind: &NodeKind,
        position: Position,
        data: NodeData,
        label: &str,
    ) -> Result<NodeId> {
        let id = self.ids.generate_id().await?;
        self.nodes.push(FlowNode::new(&id, label, position, data));
        self.console.info(format!("Added node: {}", kind.as_str()));
        Ok(id)
    }

    /// Add a node (or expand a template) at the given or computed position.
    ///
    /// Without an explicit position the node lands below the selection,
    /// else below the last node, else at the default point; a selected
    /// node whose chain-out handle is the plain output is auto-connected
    /// to the newcomer. The new node becomes the selection. Returns `None`
    /// when a template key was expanded instead of a single node.
    pub async fn add_node_to_canvas(
        &mut self,
        type_name: &str,
        position: Option<Position>,
    ) -> Result<Option<NodeId>> {
        if templates::is_template(type_name) {
            self.expand_template(type_name, position.unwrap_or(DEFAULT_POSITION))
                .await?;
            return Ok(None);
        }

        let kind = NodeKind::parse(type_name);

        let chain_source = match position {
            Some(_) => None,
            None => self
                .selected()
                .map(|n| (n.id.clone(), n.kind(), n.position)),
        };

        let final_position = position.unwrap_or_else(|| {
            if let Some((_, _, selected_pos)) = &chain_source {
                Position::new(selected_pos.x, selected_pos.y + CHAIN_SPACING)
            } else if let Some(last) = self.nodes.last() {
                Position::new(last.position.x, last.position.y + CHAIN_SPACING)
            } else {
                DEFAULT_POSITION
            }
        });

        let new_id = self.create_node(&kind, final_position).await?;

        if let Some((source_id, source_kind, _)) = chain_source {
            if source_kind.chain_out_handle() == Some(PLAIN_OUTPUT) {
                self.connect(Connection::new(
                    source_id.clone(),
                    new_id.clone(),
                    PLAIN_OUTPUT,
                    PLAIN_INPUT,
                ));
                self.console
                    .info(format!("Auto-connected: {} → {}", source_id, new_id));
            }
        }

        self.selected = Some(new_id.clone());
        Ok(Some(new_id))
    }

    // =========================================================================
    // Connection validation
    // =========================================================================

    /// Validate and insert an edge. Returns the new edge id, or `None`
    /// when the connection was rejected (reported on the console).
    pub fn connect(&mut self, params: Connection) -> Option<EdgeId> {
        self.connect_with(params, true)
    }

    fn connect_with(&mut self, params: Connection, log_success: bool) -> Option<EdgeId> {
        let source_info = handles::source_handle(&params.source_handle);
        let target_info = handles::target_handle(&params.target_handle);

        if source_info.is_none() || target_info.is_none() || params.source == params.target {
            self.console.error(format!(
                "Unsupported connection: {} -> {}",
                params.source_handle, params.target_handle
            ));
            return None;
        }

        for endpoint in [&params.source, &params.target] {
            if !self.nodes.iter().any(|n| &n.id == endpoint) {
                self.console
                    .error(format!("Connection references unknown node: {}", endpoint));
                return None;
            }
        }

        let id = format!(
            "e-{}-{}-{}-{}",
            params.source, params.source_handle, params.target, params.target_handle
        );
        if self.edges.iter().any(|e| e.id == id) {
            self.console.error(format!("Duplicate connection: {}", id));
            return None;
        }

        // Edge visuals come from the source handle unless it is a plain
        // (non-animated) output, in which case the target handle decides;
        // this keeps return-edges into a loop animated.
        let mut info = source_info.unwrap();
        if !info.animated {
            info = target_info.unwrap();
        }

        let edge = FlowEdge {
            id: id.clone(),
            source: params.source,
            target: params.target,
            source_handle: params.source_handle,
            target_handle: params.target_handle,
            label: info.label.map(String::from),
            animated: info.animated,
        };

        if log_success {
            self.console.success(format!(
                "Connected: {} [{}] → {} [{}]",
                edge.source, edge.source_handle, edge.target, edge.target_handle
            ));
        }
        self.edges.push(edge);
        Some(id)
    }

    // =========================================================================
    // Template expansion
    // =========================================================================

    /// Expand a template at the given base position.
    ///
    /// Two passes: every node of the recipe is materialized first, then
    /// edge specs are resolved by index against the created list. An
    /// out-of-range index rejects the expansion.
    pub async fn expand_template(&mut self, key: &str, base: Position) -> Result<()> {
        let Some(template) = templates::template(key) else {
            self.console.error(format!("Unknown template: {}", key));
            return Ok(());
        };

        let mut created: Vec<NodeId> = Vec::with_capacity(template.nodes.len());
        for spec in &template.nodes {
            let id = self
                .create_node_with(
                    &spec.kind,
                    base.offset(spec.offset),
                    spec.kind.defaults(),
                    spec.label,
                )
                .await?;
            created.push(id);
        }

        for spec in &template.edges {
            let source = created.get(spec.source_idx).ok_or_else(|| {
                FlowEngineError::TemplateEdge {
                    template: key.to_string(),
                    index: spec.source_idx,
                }
            })?;
            let target = created.get(spec.target_idx).ok_or_else(|| {
                FlowEngineError::TemplateEdge {
                    template: key.to_string(),
                    index: spec.target_idx,
                }
            })?;
            self.connect_with(
                Connection::new(
                    source.clone(),
                    target.clone(),
                    spec.source_handle.unwrap_or(PLAIN_OUTPUT),
                    spec.target_handle.unwrap_or(PLAIN_INPUT),
                ),
                false,
            );
        }

        log::debug!("Expanded template '{}' into {} nodes", key, created.len());
        self.console.success(format!("Expanded template: {}", key));
        Ok(())
    }

    // =========================================================================
    // Node data editing
    // =========================================================================

    /// Replace a node's configuration in place.
    pub fn update_node_data(&mut self, id: &str, data: NodeData) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.data = data;
        }
    }

    /// Update a node's display label.
    pub fn set_node_label(&mut self, id: &str, label: impl Into<String>) {
        if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
            node.label = label.into();
        }
    }

    // =========================================================================
    // Deletion workflow
    // =========================================================================

    pub fn delete_state(&self) -> &DeleteState {
        &self.delete_state
    }

    /// The staged node ids while a confirmation is pending.
    pub fn pending_delete(&self) -> Option<&[NodeId]> {
        match &self.delete_state {
            DeleteState::PendingConfirmation(staged) => Some(staged),
            DeleteState::Idle => None,
        }
    }

    /// Stage the deletable part of the multi-selection.
    ///
    /// Start/end nodes are filtered out; an empty result keeps the
    /// workflow idle so no confirmation dialog appears.
    pub fn request_delete_selected(&mut self) {
        let deletable: Vec<NodeId> = self
            .selected_nodes
            .iter()
            .filter_map(|id| self.find_node(id))
            .filter(|n| !n.kind().is_protected())
            .map(|n| n.id.clone())
            .collect();

        if !deletable.is_empty() {
            self.delete_state = DeleteState::PendingConfirmation(deletable);
        }
    }

    /// Remove the staged nodes and their incident edges.
    pub fn confirm_delete(&mut self) {
        if let DeleteState::PendingConfirmation(staged) = mem::take(&mut self.delete_state) {
            self.remove_nodes(&staged);
            self.console.warn(format!("Removed {} nodes", staged.len()));
            self.selected = None;
            self.selected_nodes.clear();
        }
    }

    /// Discard the staged deletion without mutating the graph.
    pub fn cancel_delete(&mut self) {
        self.delete_state = DeleteState::Idle;
    }

    /// Graph-removal primitive: dropping a node drops its edges too.
    fn remove_nodes(&mut self, ids: &[NodeId]) {
        self.nodes.retain(|n| !ids.contains(&n.id));
        self.edges
            .retain(|e| !ids.contains(&e.source) && !ids.contains(&e.target));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::console::{ConsoleSink, LogLevel};
    use tapflow_runtime_identity::SequentialProvider;

    fn test_graph() -> FlowGraph {
        FlowGraph::new(
            ConsoleSink::shared(),
            Arc::new(SequentialProvider::new("node")),
        )
    }

    async fn two_nodes(graph: &mut FlowGraph) -> (NodeId, NodeId) {
        let a = graph
            .create_node(&NodeKind::Click, Position::new(0.0, 0.0))
            .await
            .unwrap();
        let b = graph
            .create_node(&NodeKind::Wait, Position::new(0.0, 100.0))
            .await
            .unwrap();
        (a, b)
    }

    #[tokio::test]
    async fn self_loops_are_always_rejected() {
        let mut graph = test_graph();
        let (a, _) = two_nodes(&mut graph).await;
        let result = graph.connect(Connection::new(a.clone(), a, "output", "input"));
        assert!(result.is_none());
        assert!(graph.edges().is_empty());
    }

    #[tokio::test]
    async fn if_true_edges_carry_label_and_animation() {
        let mut graph = test_graph();
        let (a, b) = two_nodes(&mut graph).await;
        graph.connect(Connection::new(a, b, "ifTrue", "input")).unwrap();
        let edge = &graph.edges()[0];
        assert_eq!(edge.label.as_deref(), Some("是"));
        assert!(edge.animated);
    }

    #[tokio::test]
    async fn plain_output_into_loop_end_animates_via_target() {
        let mut graph = test_graph();
        let (a, b) = two_nodes(&mut graph).await;
        graph
            .connect(Connection::new(a, b, "output", "loopEnd"))
            .unwrap();
        let edge = &graph.edges()[0];
        assert_eq!(edge.label.as_deref(), Some("循环结束"));
        assert!(edge.animated);
    }

    #[tokio::test]
    async fn unknown_handles_are_rejected_and_logged() {
        let console = ConsoleSink::shared();
        let mut graph = FlowGraph::new(
            Arc::clone(&console),
            Arc::new(SequentialProvider::new("node")),
        );
        let (a, b) = two_nodes(&mut graph).await;
        assert!(graph
            .connect(Connection::new(a, b, "sideways", "input"))
            .is_none());
        assert!(graph.edges().is_empty());
        let last = console.entries().pop().unwrap();
        assert_eq!(last.level, LogLevel::Error);
        assert!(last.message.contains("sideways"));
        assert!(last.message.contains("input"));
    }

    #[tokio::test]
    async fn duplicate_connections_are_rejected() {
        let mut graph = test_graph();
        let (a, b) = two_nodes(&mut graph).await;
        assert!(graph
            .connect(Connection::new(a.clone(), b.clone(), "output", "input"))
            .is_some());
        assert!(graph
            .connect(Connection::new(a, b, "output", "input"))
            .is_none());
        assert_eq!(graph.edges().len(), 1);
    }

    #[tokio::test]
    async fn edges_require_existing_endpoints() {
        let mut graph = test_graph();
        let (a, _) = two_nodes(&mut graph).await;
        assert!(graph
            .connect(Connection::new(a, "ghost", "output", "input"))
            .is_none());
        assert!(graph.edges().is_empty());
    }

    #[tokio::test]
    async fn edge_ids_are_deterministic() {
        let mut graph = test_graph();
        let (a, b) = two_nodes(&mut graph).await;
        let id = graph
            .connect(Connection::new(a.clone(), b.clone(), "output", "input"))
            .unwrap();
        assert_eq!(id, format!("e-{}-output-{}-input", a, b));
    }

    #[tokio::test]
    async fn nodes_chain_below_the_selection() {
        let mut graph = test_graph();
        let first = graph
            .add_node_to_canvas("click", Some(Position::new(50.0, 60.0)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(graph.selected().unwrap().id, first);

        let second = graph.add_node_to_canvas("wait", None).await.unwrap().unwrap();
        let node = graph.find_node(&second).unwrap();
        assert_eq!(node.position, Position::new(50.0, 180.0));

        // The plain-output selection was auto-connected to the newcomer.
        assert_eq!(graph.edges().len(), 1);
        assert_eq!(graph.edges()[0].source, first);
        assert_eq!(graph.edges()[0].target, second);
        assert_eq!(graph.selected().unwrap().id, second);
    }

    #[tokio::test]
    async fn branching_selection_does_not_auto_connect() {
        let mut graph = test_graph();
        graph
            .add_node_to_canvas("if", Some(Position::new(0.0, 0.0)))
            .await
            .unwrap();
        graph.add_node_to_canvas("click", None).await.unwrap();
        assert!(graph.edges().is_empty());
    }

    #[tokio::test]
    async fn explicit_position_skips_chaining() {
        let mut graph = test_graph();
        graph
            .add_node_to_canvas("click", Some(Position::new(0.0, 0.0)))
            .await
            .unwrap();
        graph
            .add_node_to_canvas("wait", Some(Position::new(400.0, 0.0)))
            .await
            .unwrap();
        assert!(graph.edges().is_empty());
    }

    #[tokio::test]
    async fn first_node_without_position_lands_on_the_default_point() {
        let mut graph = test_graph();
        let id = graph.add_node_to_canvas("click", None).await.unwrap().unwrap();
        assert_eq!(
            graph.find_node(&id).unwrap().position,
            Position::new(200.0, 200.0)
        );
    }

    #[tokio::test]
    async fn template_1_expands_to_five_nodes_and_edges() {
        let console = ConsoleSink::shared();
        let mut graph = FlowGraph::new(
            Arc::clone(&console),
            Arc::new(SequentialProvider::new("node")),
        );
        let result = graph
            .add_node_to_canvas("template_1", Some(Position::new(0.0, 0.0)))
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(graph.nodes().len(), 5);
        assert_eq!(graph.edges().len(), 5);

        let back = graph
            .edges()
            .iter()
            .find(|e| e.target_handle == "loopEnd")
            .unwrap();
        let loop_node = graph.find_node(&back.target).unwrap();
        assert_eq!(loop_node.kind(), NodeKind::Loop);

        // Per-edge success logs are suppressed; one summary entry only.
        let successes: Vec<_> = console
            .entries()
            .into_iter()
            .filter(|e| e.level == LogLevel::Success)
            .collect();
        assert_eq!(successes.len(), 1);
        assert!(successes[0].message.contains("template_1"));
    }

    #[tokio::test]
    async fn template_positions_are_relative_to_the_base() {
        let mut graph = test_graph();
        graph
            .expand_template("template_1", Position::new(300.0, 50.0))
            .await
            .unwrap();
        let ys: Vec<f64> = graph.nodes().iter().map(|n| n.position.y).collect();
        assert_eq!(ys, vec![50.0, 150.0, 250.0, 350.0, 450.0]);
        assert!(graph.nodes().iter().all(|n| n.position.x == 300.0));
    }

    #[tokio::test]
    async fn protected_nodes_never_enter_the_delete_stage() {
        let mut graph = test_graph();
        let start = graph
            .create_node(&NodeKind::Start, Position::new(0.0, 0.0))
            .await
            .unwrap();
        let click = graph
            .create_node(&NodeKind::Click, Position::new(0.0, 100.0))
            .await
            .unwrap();

        graph.set_selected_nodes(vec![start.clone(), click.clone()]);
        graph.request_delete_selected();
        assert_eq!(graph.pending_delete(), Some(&[click.clone()][..]));

        graph.confirm_delete();
        assert!(graph.find_node(&start).is_some());
        assert!(graph.find_node(&click).is_none());
        assert_eq!(graph.delete_state(), &DeleteState::Idle);
    }

    #[tokio::test]
    async fn protected_only_selection_stays_idle() {
        let mut graph = test_graph();
        let start = graph
            .create_node(&NodeKind::Start, Position::new(0.0, 0.0))
            .await
            .unwrap();
        graph.set_selected_nodes(vec![start]);
        graph.request_delete_selected();
        assert_eq!(graph.delete_state(), &DeleteState::Idle);
    }

    #[tokio::test]
    async fn confirm_delete_removes_incident_edges() {
        let mut graph = test_graph();
        let (a, b) = two_nodes(&mut graph).await;
        graph
            .connect(Connection::new(a.clone(), b.clone(), "output", "input"))
            .unwrap();

        graph.set_selected_nodes(vec![b.clone()]);
        graph.request_delete_selected();
        graph.confirm_delete();

        assert!(graph.find_node(&a).is_some());
        assert!(graph.find_node(&b).is_none());
        assert!(graph.edges().is_empty());
        assert!(graph.selected().is_none());
    }

    #[tokio::test]
    async fn cancel_delete_keeps_everything() {
        let mut graph = test_graph();
        let (a, _) = two_nodes(&mut graph).await;
        graph.set_selected_nodes(vec![a]);
        graph.request_delete_selected();
        assert!(graph.pending_delete().is_some());

        graph.cancel_delete();
        assert_eq!(graph.delete_state(), &DeleteState::Idle);
        assert_eq!(graph.nodes().len(), 2);
    }

    #[tokio::test]
    async fn update_node_data_replaces_in_place() {
        let mut graph = test_graph();
        let (a, _) = two_nodes(&mut graph).await;
        graph.update_node_data(
            &a,
            NodeData::Click {
                target_type: "image".to_string(),
                x: 10.0,
                y: 20.0,
                target: "button.png".to_string(),
            },
        );
        graph.set_node_label(&a, "Tap login");
        let node = graph.find_node(&a).unwrap();
        assert_eq!(node.label, "Tap login");
        match &node.data {
            NodeData::Click { target, .. } => assert_eq!(target, "button.png"),
            other => panic!("unexpected data: {:?}", other),
        }
    }
}
