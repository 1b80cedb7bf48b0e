//! Host-facing editor session
//!
//! Wires the console, working set, task collection and drag coordinator
//! together and seeds the first task, so a freshly constructed session
//! already satisfies the at-least-one-task invariant. The host UI reads
//! the exposed collections and funnels its gestures through the methods
//! here.

use std::sync::Arc;

use tapflow_runtime_identity::IdProvider;
use tokio::sync::mpsc;

use crate::console::{ConsoleSink, LogEntry, SharedConsole};
use crate::dnd::{DragDropCoordinator, DragHost, DropRequest, ScreenPoint};
use crate::error::Result;
use crate::graph::FlowGraph;
use crate::manager::TaskManager;
use crate::types::{FlowEdge, FlowNode, NodeId, Position, Task, TaskId};

/// One open script editor: task collection, working set and shared
/// interaction state behind a single entry point.
pub struct EditorSession {
    console: SharedConsole,
    graph: FlowGraph,
    manager: TaskManager,
    drag: Arc<DragDropCoordinator>,
}

impl EditorSession {
    /// Open a session with the default (null) drag host.
    pub async fn new(ids: Arc<dyn IdProvider>) -> Result<Self> {
        Self::with_drag_host(ids, Box::new(crate::dnd::NullDragHost)).await
    }

    /// Open a session, injecting the host's drag side effects.
    pub async fn with_drag_host(
        ids: Arc<dyn IdProvider>,
        host: Box<dyn DragHost>,
    ) -> Result<Self> {
        let console = ConsoleSink::shared();
        let mut graph = FlowGraph::new(Arc::clone(&console), Arc::clone(&ids));
        let mut manager = TaskManager::new(Arc::clone(&console), ids);
        manager.create_task(&mut graph).await?;
        let drag = Arc::new(DragDropCoordinator::with_host(Arc::clone(&console), host));

        Ok(Self {
            console,
            graph,
            manager,
            drag,
        })
    }

    // =========================================================================
    // Exposed collections
    // =========================================================================

    pub fn tasks(&self) -> &[Task] {
        self.manager.tasks()
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.manager.current_task()
    }

    pub fn nodes(&self) -> &[FlowNode] {
        self.graph.nodes()
    }

    pub fn edges(&self) -> &[FlowEdge] {
        self.graph.edges()
    }

    pub fn console_entries(&self) -> Vec<LogEntry> {
        self.console.entries()
    }

    pub fn console(&self) -> &SharedConsole {
        &self.console
    }

    /// The shared drag coordinator; the palette and canvas each clone this.
    pub fn drag(&self) -> Arc<DragDropCoordinator> {
        Arc::clone(&self.drag)
    }

    pub fn graph(&self) -> &FlowGraph {
        &self.graph
    }

    pub fn graph_mut(&mut self) -> &mut FlowGraph {
        &mut self.graph
    }

    pub fn manager(&self) -> &TaskManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut TaskManager {
        &mut self.manager
    }

    // =========================================================================
    // Task operations (manager + working set together)
    // =========================================================================

    pub async fn create_task(&mut self) -> Result<TaskId> {
        self.manager.create_task(&mut self.graph).await
    }

    pub fn select_task(&mut self, id: &str) {
        self.manager.select_task(id, &mut self.graph);
    }

    pub fn delete_task(&mut self, id: &str) {
        self.manager.delete_task(id, &mut self.graph);
    }

    // =========================================================================
    // Canvas wiring
    // =========================================================================

    /// Register the canvas surface's coordinate transform and receive its
    /// drop requests. Each request is fed back through [`Self::apply_drop`].
    pub fn connect_canvas(
        &self,
        transform: impl Fn(ScreenPoint) -> Position + Send + Sync + 'static,
    ) -> mpsc::UnboundedReceiver<DropRequest> {
        self.drag.register_canvas(transform)
    }

    /// Materialize a drop request as a node (or template) on the canvas.
    pub async fn apply_drop(&mut self, request: DropRequest) -> Result<Option<NodeId>> {
        self.graph
            .add_node_to_canvas(&request.node_type, Some(request.position))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tapflow_runtime_identity::SequentialProvider;

    async fn test_session() -> EditorSession {
        EditorSession::new(Arc::new(SequentialProvider::new("id")))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn a_new_session_starts_with_one_active_task() {
        let session = test_session().await;
        assert_eq!(session.tasks().len(), 1);
        let task = session.current_task().unwrap();
        assert_eq!(task.name, "New Task 1");
        // Working set mirrors the seeded skeleton.
        assert_eq!(session.nodes().len(), 2);
        assert!(session.edges().is_empty());
    }

    #[tokio::test]
    async fn drops_flow_from_palette_to_canvas() {
        let mut session = test_session().await;
        let mut requests = session.connect_canvas(|p| Position::new(p.x / 2.0, p.y / 2.0));

        let drag = session.drag();
        drag.drag_start("click");
        drag.drop_at(ScreenPoint::new(600.0, 400.0));

        let request = requests.recv().await.unwrap();
        let id = session.apply_drop(request).await.unwrap().unwrap();

        let node = session.graph().find_node(&id).unwrap();
        assert_eq!(node.position, Position::new(300.0, 200.0));
        assert_eq!(session.nodes().len(), 3);
    }

    #[tokio::test]
    async fn dropped_templates_expand_in_place() {
        let mut session = test_session().await;
        let mut requests = session.connect_canvas(|p| Position::new(p.x, p.y));

        let drag = session.drag();
        drag.drag_start("template_1");
        drag.drop_at(ScreenPoint::new(0.0, 300.0));

        let request = requests.recv().await.unwrap();
        assert!(session.apply_drop(request).await.unwrap().is_none());
        // Skeleton (2) + template nodes (5).
        assert_eq!(session.nodes().len(), 7);
        assert_eq!(session.edges().len(), 5);
    }

    #[tokio::test]
    async fn facade_task_switching_round_trips() {
        let mut session = test_session().await;
        let first = session.current_task().unwrap().id.clone();
        let second = session.create_task().await.unwrap();

        session.select_task(&first);
        let node_count = session.nodes().len();
        session.select_task(&second);
        session.select_task(&first);
        assert_eq!(session.nodes().len(), node_count);
    }

    #[tokio::test]
    async fn facade_refuses_to_delete_the_last_task() {
        let mut session = test_session().await;
        let id = session.current_task().unwrap().id.clone();
        session.delete_task(&id);
        assert_eq!(session.tasks().len(), 1);
    }
}
