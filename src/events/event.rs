//! # Run events emitted by the preloader.
//!
//! The [`EventKind`] enum classifies event types across three categories:
//! - **Run lifecycle**: the run itself (started, timed out, completed)
//! - **Aggregate progress**: one event per settlement across the whole queue
//! - **Per-key lifecycle**: a single task's transitions (loading, loaded, failed)
//!
//! The [`Event`] struct carries additional metadata such as timestamps, the
//! task key, failure reasons, and progress counts. Where a string-keyed event
//! system would encode the key in the event name (`"config:loaded"`), the key
//! lives in [`Event::task`] instead, so matching on kind + key stays typed.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases
//! monotonically. For any two settlements, every event of the earlier one is
//! published before any event of the later one.
//!
//! ## Example
//! ```rust
//! use preloader::{Event, EventKind, TaskStatus};
//!
//! let ev = Event::new(EventKind::TaskFailed)
//!     .with_task("session")
//!     .with_status(TaskStatus::Failed)
//!     .with_reason("connection refused");
//!
//! assert_eq!(ev.kind, EventKind::TaskFailed);
//! assert_eq!(ev.task.as_deref(), Some("session"));
//! assert_eq!(ev.reason.as_deref(), Some("connection refused"));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::SystemTime;

use crate::core::TaskStatus;

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of preload run events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Run lifecycle ===
    /// The run started: the queue was snapshotted and settlement begins.
    ///
    /// Sets:
    /// - `settled`: 0
    /// - `total`: number of records in the run
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Started,

    /// The global timeout elapsed while unsettled tasks remained.
    ///
    /// Always followed by [`EventKind::Completed`] with `forced = true`.
    ///
    /// Sets:
    /// - `settled` / `total`: progress at the deadline
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TimedOut,

    /// The run completed. Emitted exactly once, always last.
    ///
    /// Sets:
    /// - `forced`: `false` when every task settled, `true` when the timeout
    ///   forced the outcome
    /// - `settled` / `total`: final progress
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Completed,

    // === Aggregate progress ===
    /// A task settled successfully (aggregate; once per success).
    ///
    /// Sets:
    /// - `task`: the key that settled
    /// - `settled` / `total`: progress including this settlement
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Loaded,

    /// A task settled with a failure (aggregate; once per failure).
    ///
    /// Failures count toward `settled`; they never block completion.
    ///
    /// Sets:
    /// - `task`: the key that settled
    /// - `reason`: failure message
    /// - `settled` / `total`: progress including this settlement
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    Failed,

    // === Per-key lifecycle ===
    /// A task's operation was spawned onto the runtime (per-key).
    ///
    /// Sets:
    /// - `task`: the key
    /// - `status`: [`TaskStatus::Loading`]
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskLoading,

    /// A task settled successfully (per-key; follows the aggregate
    /// [`EventKind::Loaded`] for the same key).
    ///
    /// Sets:
    /// - `task`: the key
    /// - `status`: [`TaskStatus::Loaded`]
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskLoaded,

    /// A task settled with a failure (per-key; follows the aggregate
    /// [`EventKind::Failed`] for the same key).
    ///
    /// Sets:
    /// - `task`: the key
    /// - `status`: [`TaskStatus::Failed`]
    /// - `reason`: failure message
    /// - `at`: wall-clock timestamp
    /// - `seq`: global sequence
    TaskFailed,
}

/// Run event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,

    /// Key of the task, if the event concerns a single task.
    pub task: Option<Arc<str>>,
    /// Record status carried by per-key events.
    pub status: Option<TaskStatus>,
    /// Human-readable failure reason.
    pub reason: Option<Arc<str>>,
    /// Settled-record count at emission time (failures included).
    pub settled: Option<u32>,
    /// Total record count for the run.
    pub total: Option<u32>,
    /// For [`EventKind::Completed`]: whether the timeout forced the outcome.
    pub forced: Option<bool>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next
    /// sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            task: None,
            status: None,
            reason: None,
            settled: None,
            total: None,
            forced: None,
        }
    }

    /// Attaches a task key.
    #[inline]
    pub fn with_task(mut self, task: impl Into<Arc<str>>) -> Self {
        self.task = Some(task.into());
        self
    }

    /// Attaches a record status.
    #[inline]
    pub fn with_status(mut self, status: TaskStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Attaches a human-readable failure reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// Attaches progress counts (settled so far, run total).
    #[inline]
    pub fn with_progress(mut self, settled: u32, total: u32) -> Self {
        self.settled = Some(settled);
        self.total = Some(total);
        self
    }

    /// Marks a completion as clean or forced.
    #[inline]
    pub fn with_forced(mut self, forced: bool) -> Self {
        self.forced = Some(forced);
        self
    }

    /// True for the terminal event of a run.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self.kind, EventKind::Completed)
    }
}
