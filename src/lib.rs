//! # preloader
//!
//! **Preloader** is a small event-driven startup gate for Tokio.
//!
//! It runs a fixed queue of named asynchronous loads, reports every
//! transition as a typed event, and resolves exactly one aggregate
//! completion signal: even when some loads fail or the global timeout gives
//! up waiting, the gate opens exactly once. The crate is designed as a
//! building block for application startup, scene/asset warmup, and other
//! gather-then-go flows.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!     Queue { "config" → task, "session" → task, "catalog" → task }
//!        │
//!        ▼ start(queue)
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Preloader (run coordinator)                                      │
//! │  - Bus (broadcast events)                                         │
//! │  - SubscriberSet (fans out to user subscribers)                   │
//! │  - start guard (idempotent) + completion latch                    │
//! └─────────────────────────────┬─────────────────────────────────────┘
//!                               ▼ spawn
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  Driver (one task, owns all run state)                            │
//! │  - records: key → { status }  (Pending → Loading → terminal)     │
//! │  - settled / failed counters                                      │
//! │  - timeout sleep (one-shot, armed at start)                       │
//! └──────┬──────────────────┬──────────────────┬──────────────────────┘
//!        ▼                  ▼                  ▼
//!   op "config"        op "session"       op "catalog"   (run concurrently)
//!        │                  │                  │
//!        └──────────────────┴──────────────────┘
//!                settlements, handled one at a time
//!                               │
//!                               ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │                     Bus (broadcast channel)                        │
//! │              (capacity: Config::bus_capacity)                      │
//! └─────────────────────────────┬─────────────────────────────────────┘
//!                               ▼
//!                   ┌────────────────────────┐
//!                   │  subscriber_listener   │
//!                   │    (in Preloader)      │
//!                   └───────────┬────────────┘
//!                               ▼
//!                         SubscriberSet
//!                        (per-sub queues)
//!                     ┌─────────┼─────────┐
//!                     ▼         ▼         ▼
//!                  worker1   worker2   workerN
//!                     ▼         ▼         ▼
//!                 sub1.on   sub2.on   subN.on
//!                 _event()  _event()  _event()
//! ```
//!
//! ### Lifecycle
//! ```text
//! Queue ──► Preloader::start() ──► Driver::run()
//!
//! start():
//!   ├─► already started? ─► no-op (returns false)
//!   ├─► wire subscriber_listener
//!   ├─► snapshot queue into records (membership fixed)
//!   ├─► publish Started{ settled: 0, total }
//!   └─► spawn driver
//!
//! driver loop:
//!   ├─► sweep: every Pending record ─► Loading, spawn op,
//!   │          publish TaskLoading{ key }
//!   ├─► settlement(key, Ok)  ─► publish Loaded + TaskLoaded, sweep again
//!   ├─► settlement(key, Err) ─► publish Failed + TaskFailed
//!   ├─► settled == total ─► complete(clean)
//!   └─► deadline elapsed ─► publish TimedOut ─► complete(forced)
//!
//! complete(forced):
//!   ├─► publish Completed{ forced, settled, total }   (exactly once, always last)
//!   └─► fulfill completion latch ─► completed() resolves with Report
//! ```
//!
//! ## Features
//! | Area               | Description                                                       | Key types / traits                |
//! |--------------------|-------------------------------------------------------------------|-----------------------------------|
//! | **Queue**          | Register named awaitables; membership fixed per run.              | [`Queue`], [`Task`], [`TaskFn`]   |
//! | **Events**         | Typed per-key and aggregate events with global ordering.          | [`Event`], [`EventKind`], [`Bus`] |
//! | **Subscriber API** | Hook into run events (logging, metrics, custom subscribers).      | [`Subscribe`], [`SubscriberSet`]  |
//! | **Progress**       | Queryable per-key status view and the final outcome.              | [`ProgressTracker`], [`Report`]   |
//! | **Errors**         | Task failures as first-class, non-blocking outcomes.              | [`TaskError`]                     |
//! | **Configuration**  | Global timeout and bus sizing.                                    | [`Config`]                        |
//!
//! ## Optional features
//! - `logging`: exports a simple built-in [`LogWriter`] _(demo/reference only)_.
//!
//! ## Example
//! ```rust
//! use std::time::Duration;
//! use preloader::{Config, Preloader, Queue, TaskError};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let mut cfg = Config::default();
//!     cfg.timeout = Duration::from_secs(5);
//!
//!     let mut queue = Queue::new();
//!     queue.insert_fn("config", || async {
//!         // read files, parse...
//!         Ok(())
//!     });
//!     queue.insert_fn("session", || async {
//!         Err(TaskError::Fail { error: "connection refused".into() })
//!     });
//!
//!     let gate = Preloader::new(cfg, Vec::new());
//!     let report = gate.run(queue).await;
//!
//!     // Failures settle too; the gate opened without forcing.
//!     assert_eq!(report.settled, 2);
//!     assert_eq!(report.failed, 1);
//!     assert!(!report.forced);
//! }
//! ```
mod config;
mod core;
mod error;
mod events;
mod subscribers;
mod tasks;

// ---- Public re-exports ----

pub use config::Config;
pub use crate::core::{Preloader, Report, TaskStatus};
pub use error::TaskError;
pub use events::{Bus, Event, EventKind};
pub use subscribers::{ProgressTracker, Subscribe, SubscriberSet};
pub use tasks::{BoxTaskFuture, Queue, Task, TaskFn, TaskRef};

// Optional: expose a simple built-in logger subscriber (demo/reference).
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
