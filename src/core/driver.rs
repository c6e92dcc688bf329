//! # Run driver: single owner of a run's mutable state.
//!
//! One driver task per run serializes every transition: the settlement
//! sweep, per-settlement bookkeeping and event emission, the completion
//! check, and the global timeout. Operations run concurrently on the
//! runtime; their outcomes funnel back here through a channel and are
//! handled one at a time, which is what gives the bus its per-settlement
//! ordering guarantee.
//!
//! ## Event flow
//! For each record, the driver publishes:
//! ```text
//! TaskLoading → [operation on the runtime] → Loaded + TaskLoaded  (success)
//!                                          → Failed + TaskFailed  (failure/panic)
//! ```
//!
//! ## Architecture
//! ```text
//! Driver::run()
//!   ├─► sweep(): Pending → Loading, spawn op, publish TaskLoading
//!   ├─► loop {
//!   │     ├─ all settled?  ──► finish(clean)
//!   │     ├─ settlement    ──► mark Loaded/Failed
//!   │     │                    publish Loaded|Failed (aggregate)
//!   │     │                    publish TaskLoaded|TaskFailed (per-key)
//!   │     │                    on success: sweep() again
//!   │     └─ deadline      ──► finish(forced)
//!   │   }
//!   └─► finish():
//!         ├─ forced with unsettled records: publish TimedOut
//!         ├─ publish Completed { forced }
//!         └─ fulfill the completion latch with the Report
//! ```
//!
//! ## Rules
//! - Settlements win ties against the deadline (biased select).
//! - A record is spawned at most once (the sweep takes its task handle).
//! - Terminal records are never touched again; a duplicate settlement is
//!   ignored.
//! - Forced completion never aborts in-flight operations. Their settlement
//!   sends fail once the driver is gone and are discarded silently.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::{mpsc, watch};
use tokio::{select, time};

use crate::core::record::{TaskRecord, TaskStatus};
use crate::core::report::Report;
use crate::error::TaskError;
use crate::events::{Bus, Event, EventKind};

/// Outcome of one spawned operation, keyed by record index.
type Settlement = (usize, Result<(), TaskError>);

/// Single-owner state machine for one run.
///
/// ### Responsibilities
/// - **Sweep**: spawn every pending operation onto the runtime
/// - **Bookkeeping**: record statuses and the settled/failed counters
/// - **Event publishing**: report every transition to the bus, in order
/// - **Timeout**: force the aggregate outcome when the deadline elapses
pub(crate) struct Driver {
    bus: Bus,
    records: Vec<TaskRecord>,
    settle_tx: mpsc::UnboundedSender<Settlement>,
    settlements: mpsc::UnboundedReceiver<Settlement>,
    settled: u32,
    failed: u32,
    total: u32,
    timeout: Option<Duration>,
    done: watch::Sender<Option<Report>>,
}

impl Driver {
    /// Creates a driver over a snapshot of queue records.
    ///
    /// `timeout = None` means the deadline arm is never armed and the run
    /// waits for settlements indefinitely.
    pub fn new(
        bus: Bus,
        records: Vec<TaskRecord>,
        timeout: Option<Duration>,
        done: watch::Sender<Option<Report>>,
    ) -> Self {
        let total = records.len() as u32;
        let (settle_tx, settlements) = mpsc::unbounded_channel();
        Self {
            bus,
            records,
            settle_tx,
            settlements,
            settled: 0,
            failed: 0,
            total,
            timeout,
            done,
        }
    }

    /// Runs the state machine to its single terminal outcome.
    ///
    /// 1. Sweep the queue (spawns every operation).
    /// 2. Wait for settlements, re-sweeping after each success.
    /// 3. Break clean once everything settled, or forced at the deadline.
    /// 4. Publish the terminal events and fulfill the completion latch.
    ///
    /// ### Exit conditions
    /// - `settled == total` → clean completion
    /// - deadline elapsed with `settled < total` → forced completion
    pub async fn run(mut self) {
        self.sweep();

        let deadline = time::sleep(self.timeout.unwrap_or(Duration::ZERO));
        tokio::pin!(deadline);

        let forced = loop {
            if self.settled >= self.total {
                break false;
            }
            select! {
                biased;
                next = self.settlements.recv() => {
                    // The driver holds its own sender, so `recv` cannot
                    // observe a closed channel here.
                    if let Some((idx, outcome)) = next {
                        let resweep = outcome.is_ok();
                        self.settle(idx, outcome);
                        if resweep {
                            self.sweep();
                        }
                    }
                }
                _ = &mut deadline, if self.timeout.is_some() => {
                    break true;
                }
            }
        };

        let report = self.finish(forced);
        let _ = self.done.send(Some(report));
    }

    /// Spawns every still-pending operation, in queue order.
    ///
    /// Each operation is wrapped so that a panic settles the record as
    /// [`TaskError::Panicked`] instead of unwinding the runtime.
    fn sweep(&mut self) {
        for (idx, record) in self.records.iter_mut().enumerate() {
            if record.status != TaskStatus::Pending {
                continue;
            }
            let Some(task) = record.task.take() else {
                continue;
            };
            record.status = TaskStatus::Loading;

            let fut = task.spawn();
            let tx = self.settle_tx.clone();
            tokio::spawn(async move {
                let outcome = match AssertUnwindSafe(fut).catch_unwind().await {
                    Ok(outcome) => outcome,
                    Err(panic) => Err(TaskError::Panicked {
                        info: panic_message(panic.as_ref()),
                    }),
                };
                // Send fails only after a forced completion dropped the
                // receiver; late settlements must stay silent.
                let _ = tx.send((idx, outcome));
            });

            self.bus.publish(
                Event::new(EventKind::TaskLoading)
                    .with_task(record.key.clone())
                    .with_status(TaskStatus::Loading),
            );
        }
    }

    /// Applies one settlement: status, counters, and both event layers.
    fn settle(&mut self, idx: usize, outcome: Result<(), TaskError>) {
        let Some(record) = self.records.get_mut(idx) else {
            return;
        };
        if record.status.is_settled() {
            return;
        }

        self.settled += 1;
        let key = record.key.clone();
        match outcome {
            Ok(()) => {
                record.status = TaskStatus::Loaded;
                self.bus.publish(
                    Event::new(EventKind::Loaded)
                        .with_task(key.clone())
                        .with_progress(self.settled, self.total),
                );
                self.bus.publish(
                    Event::new(EventKind::TaskLoaded)
                        .with_task(key)
                        .with_status(TaskStatus::Loaded),
                );
            }
            Err(err) => {
                record.status = TaskStatus::Failed;
                self.failed += 1;
                let reason: Arc<str> = err.to_string().into();
                self.bus.publish(
                    Event::new(EventKind::Failed)
                        .with_task(key.clone())
                        .with_reason(reason.clone())
                        .with_progress(self.settled, self.total),
                );
                self.bus.publish(
                    Event::new(EventKind::TaskFailed)
                        .with_task(key)
                        .with_status(TaskStatus::Failed)
                        .with_reason(reason),
                );
            }
        }
    }

    /// Shared finalization for both completion paths.
    ///
    /// `TimedOut` is published only when the deadline actually left records
    /// unsettled; `Completed` is published on every path, exactly once.
    fn finish(&mut self, forced: bool) -> Report {
        if forced && self.settled < self.total {
            self.bus
                .publish(Event::new(EventKind::TimedOut).with_progress(self.settled, self.total));
        }
        self.bus.publish(
            Event::new(EventKind::Completed)
                .with_forced(forced)
                .with_progress(self.settled, self.total),
        );
        Report {
            forced,
            total: self.total,
            settled: self.settled,
            failed: self.failed,
            statuses: self
                .records
                .iter()
                .map(|record| (record.key.clone(), record.status))
                .collect(),
        }
    }
}

/// Extracts a printable message from a panic payload.
fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
