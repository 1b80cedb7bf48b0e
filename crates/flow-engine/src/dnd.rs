//! Drag-and-drop coordinator bridging the palette and the canvas
//!
//! The two surfaces have no other shared channel: the palette starts a
//! drag, the canvas reacts to it, and both observe the same state through
//! one coordinator instance. Drops reach the graph as [`DropRequest`]
//! messages on a channel handed out at canvas registration.

use std::sync::Mutex;

use tokio::sync::mpsc;

use crate::console::SharedConsole;
use crate::types::Position;

/// Drop point used when the canvas has not supplied a transform.
const DEFAULT_DROP_POSITION: Position = Position { x: 200.0, y: 200.0 };

/// A point in the host window's screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Host-side effects of a drag gesture.
///
/// This abstracts over the windowing environment, allowing the coordinator
/// to be used in different contexts.
pub trait DragHost: Send + Sync {
    /// Toggle global text selection; disabled for the lifetime of a drag.
    fn set_text_selection(&self, enabled: bool);
}

/// Host that ignores drag side effects.
///
/// Useful for testing or headless embedding.
pub struct NullDragHost;

impl DragHost for NullDragHost {
    fn set_text_selection(&self, _enabled: bool) {}
}

/// Shared drag state observed by both surfaces.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    /// Node type picked up from the palette, if a drag is in flight
    pub dragged_type: Option<String>,
    /// Whether the pointer is currently over the canvas
    pub is_drag_over: bool,
    /// Whether a drag is in flight at all
    pub is_dragging: bool,
}

/// A drop that landed on the canvas, mapped to graph coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct DropRequest {
    pub node_type: String,
    pub position: Position,
}

type CoordinateTransform = Box<dyn Fn(ScreenPoint) -> Position + Send + Sync>;

struct CanvasTarget {
    transform: CoordinateTransform,
    requests: mpsc::UnboundedSender<DropRequest>,
}

#[derive(Default)]
struct DndInner {
    state: DragState,
    canvas: Option<CanvasTarget>,
}

/// The single coordinator instance both surfaces hold a handle to.
pub struct DragDropCoordinator {
    console: SharedConsole,
    host: Box<dyn DragHost>,
    inner: Mutex<DndInner>,
}

impl DragDropCoordinator {
    pub fn new(console: SharedConsole) -> Self {
        Self::with_host(console, Box::new(NullDragHost))
    }

    pub fn with_host(console: SharedConsole, host: Box<dyn DragHost>) -> Self {
        Self {
            console,
            host,
            inner: Mutex::new(DndInner::default()),
        }
    }

    /// Snapshot of the shared drag state.
    pub fn state(&self) -> DragState {
        self.inner.lock().unwrap().state.clone()
    }

    /// The canvas surface registers its screen-to-graph transform and
    /// receives the coordinator's drop requests.
    ///
    /// Re-registration replaces the previous target; the old receiver
    /// stops seeing requests.
    pub fn register_canvas(
        &self,
        transform: impl Fn(ScreenPoint) -> Position + Send + Sync + 'static,
    ) -> mpsc::UnboundedReceiver<DropRequest> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.lock().unwrap().canvas = Some(CanvasTarget {
            transform: Box::new(transform),
            requests: tx,
        });
        rx
    }

    /// Palette picked up a node type.
    pub fn drag_start(&self, node_type: impl Into<String>) {
        {
            let mut inner = self.inner.lock().unwrap();
            inner.state.dragged_type = Some(node_type.into());
            inner.state.is_dragging = true;
        }
        self.host.set_text_selection(false);
    }

    /// Pointer moved over the canvas.
    ///
    /// Returns whether the surface should advertise the "move" drop effect;
    /// a stray drag-over with nothing in flight changes nothing.
    pub fn drag_over(&self) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.state.dragged_type.is_some() {
            inner.state.is_drag_over = true;
            true
        } else {
            false
        }
    }

    /// Pointer left the canvas; the drag itself stays alive.
    pub fn drag_leave(&self) {
        self.inner.lock().unwrap().state.is_drag_over = false;
    }

    /// Unconditional cleanup, also invoked when the drop lands outside any
    /// recognized target.
    pub fn drag_end(&self) {
        self.inner.lock().unwrap().state = DragState::default();
        self.host.set_text_selection(true);
    }

    /// Drop on the canvas.
    ///
    /// Maps the pointer to graph coordinates through the registered
    /// transform, resets the drag state unconditionally, then emits a
    /// [`DropRequest`] when both a canvas target and a dragged type are
    /// present. Anything else is reported as a WARN with no mutation.
    pub fn drop_at(&self, point: ScreenPoint) {
        let delivered = {
            let mut inner = self.inner.lock().unwrap();
            let node_type = inner.state.dragged_type.take();
            inner.state = DragState::default();

            let position = inner
                .canvas
                .as_ref()
                .map_or(DEFAULT_DROP_POSITION, |c| (c.transform)(point));

            match (&inner.canvas, node_type) {
                (Some(canvas), Some(node_type)) => canvas
                    .requests
                    .send(DropRequest { node_type, position })
                    .is_ok(),
                _ => false,
            }
        };
        self.host.set_text_selection(true);

        if !delivered {
            self.console
                .warn("Drop ignored: no canvas target registered or nothing dragged");
        }
    }
}
