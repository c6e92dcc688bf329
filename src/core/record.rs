//! Per-task record state for one run.

use std::sync::Arc;

use crate::tasks::TaskRef;

/// Status of one task record.
///
/// Transitions are monotonic: `Pending → Loading → {Loaded, Failed}`.
/// A record never leaves a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    /// Registered; operation not yet spawned.
    Pending,
    /// Operation spawned onto the runtime; not yet settled.
    Loading,
    /// Settled successfully (terminal).
    Loaded,
    /// Settled with a failure (terminal).
    Failed,
}

impl TaskStatus {
    /// True for the terminal statuses (`Loaded` or `Failed`).
    #[inline]
    pub fn is_settled(&self) -> bool {
        matches!(self, TaskStatus::Loaded | TaskStatus::Failed)
    }
}

/// One queue entry under coordination.
///
/// The task handle is taken when the sweep spawns it, so a record can be
/// spawned at most once.
pub(crate) struct TaskRecord {
    /// Stable key, unique within the run.
    pub key: Arc<str>,
    /// The registered operation; `None` once spawned.
    pub task: Option<TaskRef>,
    /// Current status (monotonic).
    pub status: TaskStatus,
}

impl TaskRecord {
    pub fn new(key: Arc<str>, task: TaskRef) -> Self {
        Self {
            key,
            task: Some(task),
            status: TaskStatus::Pending,
        }
    }
}
