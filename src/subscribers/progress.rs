//! # Per-key progress view with sequence-based ordering.
//!
//! [`ProgressTracker`] mirrors each task's [`TaskStatus`] from the event
//! stream, using event sequence numbers to reject out-of-order updates. It is
//! the subscriber-side counterpart of the run's own records: callers get a
//! queryable view without sharing the driver's mutable state.
//!
//! ## Architecture
//! ```text
//! Driver ──► Bus ──► subscriber_listener() ──► ProgressTracker::update()
//!                                                      │
//!                                                      ▼
//!                                        HashMap<Arc<str>, KeyState>
//!                                            (key → {seq, status})
//! ```
//!
//! ## Rules
//! - Only `TaskLoading` / `TaskLoaded` / `TaskFailed` change a key's status
//! - Read operations (`status`, `snapshot`, `pending`) are **eventually
//!   consistent** with the bus
//! - Events with `seq <= last_seq` for a known key are **rejected** (stale)

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::core::TaskStatus;
use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Per-key state for ordering validation.
#[derive(Debug, Clone, Copy)]
struct KeyState {
    /// Last seen sequence number for this key.
    last_seq: u64,
    /// Mirrored record status.
    status: TaskStatus,
}

/// Thread-safe tracker of per-key load progress.
///
/// ### Responsibilities
/// - Mirrors record statuses from per-key events
/// - Answers "has this key settled?" without touching the run
/// - Rejects stale events using sequence numbers
///
/// Attach it to a [`Preloader`](crate::Preloader) as a subscriber:
///
/// ```rust
/// use std::sync::Arc;
/// use preloader::{Config, Preloader, ProgressTracker, Subscribe};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let progress = Arc::new(ProgressTracker::new());
/// let subs: Vec<Arc<dyn Subscribe>> = vec![progress.clone()];
/// let pre = Preloader::new(Config::default(), subs);
/// # let _ = pre;
/// # }
/// ```
pub struct ProgressTracker {
    state: RwLock<HashMap<Arc<str>, KeyState>>,
}

impl ProgressTracker {
    /// Creates a new empty tracker.
    pub fn new() -> Self {
        Self {
            state: RwLock::new(HashMap::new()),
        }
    }

    /// Applies an event if it is newer than the last seen for its key.
    ///
    /// Returns `true` when the mirrored status changed.
    ///
    /// ### Ordering guarantees
    /// Events are applied only if `ev.seq > last_seq` for this key. This
    /// prevents out-of-order delivery from corrupting the view:
    /// ```text
    /// update(TaskLoaded,  seq=12) → status=Loaded, last_seq=12
    /// update(TaskLoading, seq=9)  → rejected (stale)
    /// ```
    ///
    /// ### State transitions
    /// - `TaskLoading` → status=Loading
    /// - `TaskLoaded` → status=Loaded
    /// - `TaskFailed` → status=Failed
    /// - Other events → ignored
    pub async fn update(&self, ev: &Event) -> bool {
        let status = match ev.kind {
            EventKind::TaskLoading => TaskStatus::Loading,
            EventKind::TaskLoaded => TaskStatus::Loaded,
            EventKind::TaskFailed => TaskStatus::Failed,
            _ => return false,
        };
        let Some(key) = ev.task.as_ref() else {
            return false;
        };

        let mut state = self.state.write().await;
        match state.entry(key.clone()) {
            Entry::Occupied(mut occupied) => {
                let entry = occupied.get_mut();
                if ev.seq <= entry.last_seq {
                    return false;
                }
                entry.last_seq = ev.seq;
                let changed = entry.status != status;
                entry.status = status;
                changed
            }
            Entry::Vacant(vacant) => {
                vacant.insert(KeyState {
                    last_seq: ev.seq,
                    status,
                });
                true
            }
        }
    }

    /// Returns the mirrored status for `key`, if any event touched it.
    pub async fn status(&self, key: &str) -> Option<TaskStatus> {
        self.state.read().await.get(key).map(|ks| ks.status)
    }

    /// True if `key` reached a terminal status.
    pub async fn is_settled(&self, key: &str) -> bool {
        self.state
            .read()
            .await
            .get(key)
            .map(|ks| ks.status.is_settled())
            .unwrap_or(false)
    }

    /// Returns a sorted `(key, status)` snapshot of every key seen so far.
    pub async fn snapshot(&self) -> Vec<(Arc<str>, TaskStatus)> {
        let state = self.state.read().await;
        let mut all: Vec<(Arc<str>, TaskStatus)> = state
            .iter()
            .map(|(key, ks)| (key.clone(), ks.status))
            .collect();
        all.sort_unstable_by(|a, b| a.0.cmp(&b.0));
        all
    }

    /// Returns sorted keys that were seen but have not settled.
    pub async fn pending(&self) -> Vec<Arc<str>> {
        let state = self.state.read().await;
        let mut pending: Vec<Arc<str>> = state
            .iter()
            .filter(|(_, ks)| !ks.status.is_settled())
            .map(|(key, _)| key.clone())
            .collect();
        pending.sort_unstable();
        pending
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Subscribe for ProgressTracker {
    async fn on_event(&self, event: &Event) {
        self.update(event).await;
    }

    fn name(&self) -> &'static str {
        "progress"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mirrors_per_key_transitions() {
        let tracker = ProgressTracker::new();

        let loading = Event::new(EventKind::TaskLoading)
            .with_task("a")
            .with_status(TaskStatus::Loading);
        assert!(tracker.update(&loading).await);
        assert_eq!(tracker.status("a").await, Some(TaskStatus::Loading));
        assert!(!tracker.is_settled("a").await);

        let loaded = Event::new(EventKind::TaskLoaded)
            .with_task("a")
            .with_status(TaskStatus::Loaded);
        assert!(tracker.update(&loaded).await);
        assert!(tracker.is_settled("a").await);
    }

    #[tokio::test]
    async fn rejects_stale_events() {
        let tracker = ProgressTracker::new();

        let loading = Event::new(EventKind::TaskLoading).with_task("a");
        let failed = Event::new(EventKind::TaskFailed).with_task("a");

        assert!(tracker.update(&failed).await);
        // The earlier event arrives late; the terminal status must hold.
        assert!(!tracker.update(&loading).await);
        assert_eq!(tracker.status("a").await, Some(TaskStatus::Failed));
    }

    #[tokio::test]
    async fn ignores_aggregate_and_run_events() {
        let tracker = ProgressTracker::new();

        let started = Event::new(EventKind::Started).with_progress(0, 2);
        let aggregate = Event::new(EventKind::Loaded).with_task("a");
        assert!(!tracker.update(&started).await);
        assert!(!tracker.update(&aggregate).await);
        assert_eq!(tracker.status("a").await, None);
    }

    #[tokio::test]
    async fn snapshot_and_pending_are_sorted() {
        let tracker = ProgressTracker::new();

        tracker
            .update(&Event::new(EventKind::TaskLoading).with_task("b"))
            .await;
        tracker
            .update(&Event::new(EventKind::TaskLoading).with_task("a"))
            .await;
        tracker
            .update(&Event::new(EventKind::TaskLoaded).with_task("b"))
            .await;

        let snapshot = tracker.snapshot().await;
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot[0].0.as_ref(), "a");
        assert_eq!(snapshot[1].0.as_ref(), "b");

        let pending = tracker.pending().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].as_ref(), "a");
    }
}
