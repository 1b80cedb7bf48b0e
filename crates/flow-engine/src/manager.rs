//! Task collection management
//!
//! The manager owns every task of the script and keeps exactly one of them
//! active. Switching tasks is the single persistence point for in-progress
//! edits: the live working set is saved back onto the outgoing task before
//! the incoming task's graph is loaded.

use std::sync::Arc;

use tapflow_runtime_identity::IdProvider;

use crate::console::SharedConsole;
use crate::error::Result;
use crate::graph::FlowGraph;
use crate::types::{Task, TaskId};

/// Staged rename while the rename dialog is up.
#[derive(Debug, Clone)]
struct RenameStaging {
    target: TaskId,
    value: String,
}

/// Owner of the task collection and the active-task pointer.
///
/// Operations that touch the working set take the [`FlowGraph`] explicitly;
/// the manager never holds a reference to it between calls.
pub struct TaskManager {
    tasks: Vec<Task>,
    current: Option<TaskId>,
    task_search: String,
    rename: Option<RenameStaging>,
    console: SharedConsole,
    ids: Arc<dyn IdProvider>,
}

impl TaskManager {
    pub fn new(console: SharedConsole, ids: Arc<dyn IdProvider>) -> Self {
        Self {
            tasks: Vec::new(),
            current: None,
            task_search: String::new(),
            rename: None,
            console,
            ids,
        }
    }

    // =========================================================================
    // Collection access
    // =========================================================================

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn current_task_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_task(&self) -> Option<&Task> {
        self.current
            .as_deref()
            .and_then(|id| self.tasks.iter().find(|t| t.id == id))
    }

    /// Tasks whose name contains the search term, case-insensitively.
    ///
    /// An empty term returns the full list in its original order.
    pub fn filtered_tasks(&self) -> Vec<&Task> {
        if self.task_search.is_empty() {
            return self.tasks.iter().collect();
        }
        let search = self.task_search.to_lowercase();
        self.tasks
            .iter()
            .filter(|t| t.name.to_lowercase().contains(&search))
            .collect()
    }

    pub fn set_task_search(&mut self, term: impl Into<String>) {
        self.task_search = term.into();
    }

    // =========================================================================
    // Task selection
    // =========================================================================

    /// Make a task active, saving the outgoing task's working set first.
    ///
    /// Switching to a task and back with no intervening edits leaves the
    /// task's graph unchanged.
    pub fn select_task(&mut self, id: &str, graph: &mut FlowGraph) {
        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            self.console.error(format!("Unknown task: {}", id));
            return;
        };

        if let Some(current_id) = self.current.take() {
            if let Some(outgoing) = self.tasks.iter_mut().find(|t| t.id == current_id) {
                let (nodes, edges) = graph.snapshot();
                outgoing.nodes = nodes;
                outgoing.edges = edges;
            }
        }

        let task = &self.tasks[idx];
        graph.load(task.nodes.clone(), task.edges.clone());
        self.current = Some(task.id.clone());
        self.console
            .info(format!("Switched to task: {}", task.name));
    }

    // =========================================================================
    // Task creation / deletion
    // =========================================================================

    /// Create a task with the start/end skeleton and make it active.
    ///
    /// The id is awaited from the external provider; provider failures
    /// propagate to the caller. Selection already logs the switch, so no
    /// separate creation entry is emitted.
    pub async fn create_task(&mut self, graph: &mut FlowGraph) -> Result<TaskId> {
        let id = self.ids.generate_id().await?;
        let name = format!("New Task {}", self.tasks.len() + 1);
        self.tasks.push(Task::with_skeleton(&id, name));
        self.select_task(&id, graph);
        Ok(id)
    }

    /// Remove a task. The last remaining task can never be deleted.
    ///
    /// Removing the active task activates the new first task in the list;
    /// save-on-switch skips the removed task since it is already gone.
    pub fn delete_task(&mut self, id: &str, graph: &mut FlowGraph) {
        if self.tasks.len() <= 1 {
            self.console.error("Cannot delete the last task");
            return;
        }

        let Some(idx) = self.tasks.iter().position(|t| t.id == id) else {
            return;
        };
        let removed = self.tasks.remove(idx);
        self.console.warn(format!("Deleted task: {}", removed.name));

        if self.current.as_deref() == Some(id) {
            let first_id = self.tasks[0].id.clone();
            self.select_task(&first_id, graph);
        }
    }

    // =========================================================================
    // Task visibility
    // =========================================================================

    /// Flip a task's visibility hint. Hidden tasks stay fully editable.
    pub fn toggle_visibility(&mut self, id: &str) {
        if let Some(task) = self.tasks.iter_mut().find(|t| t.id == id) {
            task.hidden = !task.hidden;
            let state = if task.hidden { "hidden" } else { "shown" };
            self.console
                .info(format!("Task \"{}\" is now {}", task.name, state));
        }
    }

    // =========================================================================
    // Task renaming
    // =========================================================================

    /// Stage a rename, seeding the candidate value with the current name.
    pub fn edit_task_name(&mut self, id: &str) {
        if let Some(task) = self.tasks.iter().find(|t| t.id == id) {
            self.rename = Some(RenameStaging {
                target: task.id.clone(),
                value: task.name.clone(),
            });
        }
    }

    /// The candidate name while a rename is staged.
    pub fn rename_value(&self) -> Option<&str> {
        self.rename.as_ref().map(|r| r.value.as_str())
    }

    /// Replace the staged candidate name as the user types.
    pub fn set_rename_value(&mut self, value: impl Into<String>) {
        if let Some(staging) = &mut self.rename {
            staging.value = value.into();
        }
    }

    /// Apply the staged rename. Blank or whitespace-only candidates cancel
    /// silently.
    pub fn confirm_rename(&mut self) {
        if let Some(staging) = self.rename.take() {
            let trimmed = staging.value.trim();
            if trimmed.is_empty() {
                return;
            }
            if let Some(task) = self.tasks.iter_mut().find(|t| t.id == staging.target) {
                task.name = trimmed.to_string();
                self.console.info(format!("Renamed task: {}", trimmed));
            }
        }
    }

    /// Discard the staged rename without touching the task.
    pub fn cancel_rename(&mut self) {
        self.rename = None;
    }
}
