//! # Preloader: constructs a run, wires event delivery, and gates on completion.
//!
//! The [`Preloader`] owns the event bus, a [`SubscriberSet`], and the run
//! configuration. It guards `start` so the run happens once, spawns the run
//! driver, and exposes the completion latch.
//!
//! ## Key responsibilities
//! - subscribe to the [`Bus`] and **fan-out** events via [`SubscriberSet`]
//! - snapshot the [`Queue`] into records and publish `Started`
//! - spawn the run driver (sweep, settlements, timeout)
//! - resolve [`completed`](Preloader::completed) with the final [`Report`]
//!
//! ## High-level architecture
//! ```text
//! Inputs to start():
//!   Queue { key → task, ... }  ──►  Preloader::start(queue)
//!
//! Preparation (once, guarded):
//!   - subscriber_listener(): Bus.subscribe() ─► SubscriberSet::emit(&Event)
//!   - snapshot queue into records, publish Started
//!   - spawn Driver::run()
//!
//! Event flow (as wired here):
//!   Driver ── publish(Event) ──► Bus ──► listener ──► SubscriberSet::emit(&Event)
//!                                                   ┌─────────┬─────────┐
//!                                                   ▼         ▼         ▼
//!                                            [queue S1] [queue S2] ... [queue SN]
//!                                                   │         │         │
//!                                            worker S1  worker S2 ... worker SN
//!                                                   │         │         │
//!                                          sub.on_event(&Event) (per subscriber)
//!
//! Completion path:
//!   Driver::finish()
//!     └─► Bus.publish(Completed)      → listener and workers break after it
//!     └─► watch latch ← Some(Report)  → completed() resolves everywhere
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use preloader::{Config, Preloader, ProgressTracker, Queue, Subscribe, TaskStatus};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut cfg = Config::default();
//!     cfg.timeout = Duration::from_secs(2);
//!
//!     let progress = Arc::new(ProgressTracker::new());
//!     let subs: Vec<Arc<dyn Subscribe>> = vec![progress.clone()];
//!     let pre = Preloader::new(cfg, subs);
//!
//!     let mut queue = Queue::new();
//!     queue.insert_fn("config", || async { Ok(()) });
//!
//!     let report = pre.run(queue).await;
//!     assert!(report.is_clean());
//!
//!     // Subscriber delivery is asynchronous; give the worker a beat.
//!     tokio::time::sleep(Duration::from_millis(50)).await;
//!     assert_eq!(progress.status("config").await, Some(TaskStatus::Loaded));
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering as AtomicOrdering};
use std::sync::{Arc, Mutex};

use tokio::sync::broadcast::error::RecvError;
use tokio::sync::watch;

use crate::config::Config;
use crate::core::driver::Driver;
use crate::core::record::TaskRecord;
use crate::core::report::Report;
use crate::events::{Bus, Event, EventKind};
use crate::subscribers::{Subscribe, SubscriberSet};
use crate::tasks::Queue;

/// Coordinates one preload run: start guard, event delivery, completion latch.
pub struct Preloader {
    /// Run configuration.
    pub cfg: Config,
    /// Event bus shared with the driver; subscribe for a raw event stream.
    pub bus: Bus,
    /// Fan-out set for subscribers.
    pub subs: Arc<SubscriberSet>,

    /// Whether `start` was already called.
    started: AtomicBool,
    /// Completion latch sender; taken exactly once by `start`.
    done_tx: Mutex<Option<watch::Sender<Option<Report>>>>,
    /// Completion latch; cloned per `completed()` call.
    done_rx: watch::Receiver<Option<Report>>,
}

impl Preloader {
    /// Creates a preloader with the given config and subscribers.
    ///
    /// Spawns one worker per subscriber, so this must be called within a
    /// Tokio runtime when `subscribers` is non-empty.
    pub fn new(cfg: Config, subscribers: Vec<Arc<dyn Subscribe>>) -> Self {
        let bus = Bus::new(cfg.bus_capacity);
        let subs = Arc::new(SubscriberSet::new(subscribers));
        let (done_tx, done_rx) = watch::channel(None);
        Self {
            cfg,
            bus,
            subs,
            started: AtomicBool::new(false),
            done_tx: Mutex::new(Some(done_tx)),
            done_rx,
        }
    }

    /// Starts the run: snapshots `queue` into records and begins settlement.
    ///
    /// Non-blocking; progress is observable through events and
    /// [`completed`](Self::completed). Returns `false` (and drops `queue`)
    /// when the preloader was already started: a repeat call is a no-op, not
    /// an error.
    ///
    /// On the first call it:
    /// 1. Wires the fan-out listener (before any event is published).
    /// 2. Snapshots the queue into records, fixing run membership.
    /// 3. Publishes `Started` with `settled = 0` and the run total.
    /// 4. Spawns the run driver.
    pub fn start(&self, queue: Queue) -> bool {
        if self.started.swap(true, AtomicOrdering::SeqCst) {
            return false;
        }
        let Ok(mut latch) = self.done_tx.lock() else {
            return false;
        };
        let Some(done_tx) = latch.take() else {
            return false;
        };
        drop(latch);

        if !self.subs.is_empty() {
            self.subscriber_listener();
        }

        let records: Vec<TaskRecord> = queue
            .into_entries()
            .into_iter()
            .map(|(key, task)| TaskRecord::new(key, task))
            .collect();

        self.bus
            .publish(Event::new(EventKind::Started).with_progress(0, records.len() as u32));

        let driver = Driver::new(self.bus.clone(), records, self.cfg.deadline(), done_tx);
        tokio::spawn(driver.run());
        true
    }

    /// Runs the whole gate: `start(queue)`, then await [`completed`](Self::completed).
    pub async fn run(&self, queue: Queue) -> Report {
        self.start(queue);
        self.completed().await
    }

    /// Resolves once the run has completed, with the run's [`Report`].
    ///
    /// May be awaited before `start`, by any number of callers, and after
    /// completion (resolves immediately with the same report).
    pub async fn completed(&self) -> Report {
        let mut rx = self.done_rx.clone();
        if let Ok(seen) = rx.wait_for(|report| report.is_some()).await {
            if let Some(report) = seen.as_ref() {
                return report.clone();
            }
        }
        // The latch sender vanished without a report (runtime torn down
        // mid-run); completion can no longer happen.
        std::future::pending().await
    }

    /// True once [`start`](Self::start) has been called.
    pub fn is_started(&self) -> bool {
        self.started.load(AtomicOrdering::SeqCst)
    }

    /// Subscribes to the bus and forwards events to the subscriber set until
    /// the terminal event has been delivered.
    ///
    /// Subscribing happens synchronously here so the listener observes the
    /// `Started` event published right after.
    fn subscriber_listener(&self) {
        let mut rx = self.bus.subscribe();
        let set = Arc::clone(&self.subs);
        tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(ev) => {
                        let terminal = ev.is_terminal();
                        set.emit(&ev);
                        if terminal {
                            break;
                        }
                    }
                    // Skipped events cannot be replayed; keep reading so the
                    // terminal event still releases this listener.
                    Err(RecvError::Lagged(_)) => continue,
                    Err(RecvError::Closed) => break,
                }
            }
        });
    }
}
