//! # Example: forced_timeout
//!
//! Demonstrates the global timeout forcing completion while loads are still
//! in flight, with the built-in [`LogWriter`] printing the event stream.
//!
//! Shows how to:
//! - Arm the run timeout via [`Config::timeout`].
//! - Observe `TimedOut` followed by `Completed { forced: true }`.
//! - Inspect unsettled keys through [`Report::pending`].
//!
//! ## Flow
//! ```text
//! Queue ──► Preloader::run()  (timeout = 500ms)
//!     ├─► publish(Started, TaskLoading × 2)
//!     ├─► "fast" settles ──► publish(Loaded + TaskLoaded)
//!     ├─► deadline elapses, "stuck" still loading
//!     ├─► publish(TimedOut)
//!     └─► publish(Completed{ forced: true }) ──► Report
//!
//! "stuck" keeps running detached; its late settlement is discarded.
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example forced_timeout --features logging
//! ```

use std::{sync::Arc, time::Duration};

use preloader::{Config, LogWriter, Preloader, Queue, Subscribe, TaskError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut cfg = Config::default();
    cfg.timeout = Duration::from_millis(500);

    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(LogWriter)];
    let gate = Preloader::new(cfg, subs);

    let mut queue = Queue::new();
    queue.insert_fn("fast", || async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok::<(), TaskError>(())
    });
    queue.insert_fn("stuck", || async {
        // Simulates a dependency that never answers within the deadline.
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(())
    });

    let report = gate.run(queue).await;

    // Give the log worker a beat to drain its queue.
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!(
        "\ngate opened anyway: forced={} settled={}/{}",
        report.forced, report.settled, report.total
    );
    for key in report.pending() {
        println!("still pending: {key}");
    }
    Ok(())
}
