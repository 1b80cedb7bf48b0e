//! Bounded console sink for editor diagnostics
//!
//! Every rejected mutation and every notable authoring action lands here.
//! The sink is an audit log, not a tracing backend: it keeps the newest N
//! entries and tracks whether the display should stay pinned to the tail.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Serialize};

/// Default entry capacity.
pub const DEFAULT_CAPACITY: usize = 500;

/// How close to the bottom (in viewport units) still counts as "at the
/// bottom" when deciding whether to follow new entries.
const SCROLL_TOLERANCE: f64 = 5.0;

/// Severity of a console entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
    Success,
}

impl LogLevel {
    /// Display class used by the console widget.
    pub fn class_name(self) -> &'static str {
        match self {
            Self::Success => "text-success",
            Self::Error => "text-error",
            Self::Warn => "text-warning",
            Self::Info => "text-info",
        }
    }
}

/// One console entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Wall-clock time of the append, formatted HH:MM:SS
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

/// Scroll metrics last reported by the console widget.
#[derive(Debug, Clone, Copy, Default)]
struct Viewport {
    scroll_top: f64,
    height: f64,
    content_height: f64,
}

impl Viewport {
    fn at_bottom(&self) -> bool {
        (self.content_height - self.scroll_top - self.height).abs() < SCROLL_TOLERANCE
    }
}

#[derive(Debug, Default)]
struct ConsoleInner {
    entries: VecDeque<LogEntry>,
    viewport: Option<Viewport>,
    follow_tail: bool,
}

/// Bounded FIFO of console entries, shared across editor surfaces.
#[derive(Debug)]
pub struct ConsoleSink {
    capacity: usize,
    inner: Mutex<ConsoleInner>,
}

/// Shared handle to the console sink.
pub type SharedConsole = Arc<ConsoleSink>;

impl ConsoleSink {
    /// Create a sink keeping at most `capacity` entries.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            inner: Mutex::new(ConsoleInner {
                follow_tail: true,
                ..ConsoleInner::default()
            }),
        }
    }

    /// Create a shared sink with the default capacity.
    pub fn shared() -> SharedConsole {
        Arc::new(Self::default())
    }

    /// Append an entry, evicting the oldest beyond capacity.
    ///
    /// Whether the display should jump to the new tail is decided from the
    /// viewport state *before* the append, so a reader who has scrolled up
    /// is not pulled back down.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) {
        let time = chrono::Local::now().format("%H:%M:%S").to_string();
        let mut inner = self.inner.lock().unwrap();

        inner.follow_tail = inner.viewport.map_or(true, |v| v.at_bottom());

        inner.entries.push_back(LogEntry {
            time,
            level,
            message: message.into(),
        });
        while inner.entries.len() > self.capacity {
            inner.entries.pop_front();
        }
    }

    pub fn info(&self, message: impl Into<String>) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: impl Into<String>) {
        self.log(LogLevel::Warn, message);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.log(LogLevel::Error, message);
    }

    pub fn success(&self, message: impl Into<String>) {
        self.log(LogLevel::Success, message);
    }

    /// Snapshot of the current entries, oldest first.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.inner.lock().unwrap().entries.iter().cloned().collect()
    }

    /// Number of retained entries.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all entries.
    pub fn clear(&self) {
        self.inner.lock().unwrap().entries.clear();
    }

    /// Report the console widget's scroll metrics.
    pub fn update_viewport(&self, scroll_top: f64, height: f64, content_height: f64) {
        self.inner.lock().unwrap().viewport = Some(Viewport {
            scroll_top,
            height,
            content_height,
        });
    }

    /// Whether the display should stay pinned to the newest entry.
    pub fn follow_tail(&self) -> bool {
        self.inner.lock().unwrap().follow_tail
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}
