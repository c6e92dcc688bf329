//! # Example: custom_subscriber
//!
//! Demonstrates how to build and attach a custom event subscriber.
//!
//! Shows how to:
//! - Implement the [`Subscribe`] trait.
//! - Inspect [`Event`] / [`EventKind`] for run progress.
//! - Wire subscribers into [`Preloader::new`] alongside a [`ProgressTracker`].
//!
//! ## Flow
//! ```text
//! Queue ──► Preloader::start()
//!     ├─► publish(Started)
//!     ├─► Driver::run()
//!     │     ├─► publish(TaskLoading / Loaded / TaskLoaded / Failed / TaskFailed)
//!     │     └─► publish(Completed)
//!     └─► subscriber_listener (in Preloader)
//!           └─► SubscriberSet.emit() ──► ConsoleSubscriber.on_event()
//!                                    └─► ProgressTracker.on_event()
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example custom_subscriber
//! ```

use std::{sync::Arc, time::Duration};

use preloader::{Config, Event, EventKind, Preloader, ProgressTracker, Queue, Subscribe, TaskError};

/// A simple console subscriber that prints selected events.
/// In real life, you could export metrics, ship logs, or trigger alerts.
struct ConsoleSubscriber;

#[async_trait::async_trait]
impl Subscribe for ConsoleSubscriber {
    async fn on_event(&self, ev: &Event) {
        match ev.kind {
            // === Run lifecycle ===
            EventKind::Started => {
                println!("[sub] started:  total={}", ev.total.unwrap_or(0));
            }
            EventKind::TimedOut => {
                println!(
                    "[sub] timeout:  settled={}/{}",
                    ev.settled.unwrap_or(0),
                    ev.total.unwrap_or(0)
                );
            }
            EventKind::Completed => {
                println!(
                    "[sub] complete: forced={} settled={}/{}",
                    ev.forced.unwrap_or(false),
                    ev.settled.unwrap_or(0),
                    ev.total.unwrap_or(0)
                );
            }

            // === Aggregate progress ===
            EventKind::Loaded => {
                println!(
                    "[sub] loaded:   task={} ({}/{})",
                    ev.task.as_deref().unwrap_or("<unknown>"),
                    ev.settled.unwrap_or(0),
                    ev.total.unwrap_or(0)
                );
            }
            EventKind::Failed => {
                println!(
                    "[sub] failed:   task={} reason={} ({}/{})",
                    ev.task.as_deref().unwrap_or("<unknown>"),
                    ev.reason.as_deref().unwrap_or("<none>"),
                    ev.settled.unwrap_or(0),
                    ev.total.unwrap_or(0)
                );
            }

            // === Per-key lifecycle ===
            EventKind::TaskLoading => {
                println!(
                    "[sub] loading:  task={}",
                    ev.task.as_deref().unwrap_or("<unknown>")
                );
            }

            // Per-key terminal events repeat the aggregate lines above.
            EventKind::TaskLoaded | EventKind::TaskFailed => {}
        }
    }

    fn name(&self) -> &'static str {
        "console"
    }

    fn queue_capacity(&self) -> usize {
        1024
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    println!("custom_subscriber demo\n");

    let progress = Arc::new(ProgressTracker::new());
    let subs: Vec<Arc<dyn Subscribe>> = vec![Arc::new(ConsoleSubscriber), progress.clone()];
    let gate = Preloader::new(Config::default(), subs);

    let mut queue = Queue::new();
    queue.insert_fn("alpha", || async {
        println!("[alpha] doing one-shot work...");
        tokio::time::sleep(Duration::from_millis(300)).await;
        println!("[alpha] success");
        Ok::<(), TaskError>(())
    });
    queue.insert_fn("bravo", || async {
        println!("[bravo] starting and will fail...");
        tokio::time::sleep(Duration::from_millis(250)).await;
        Err(TaskError::Fail {
            error: "boom (demo failure)".to_string(),
        })
    });

    let report = gate.run(queue).await;

    // Give subscriber workers a beat to drain their queues.
    tokio::time::sleep(Duration::from_millis(100)).await;

    println!("\nper-key view:");
    for (key, status) in progress.snapshot().await {
        println!("  {key}: {status:?}");
    }
    println!(
        "\nfinished: loaded={} failed={} forced={}",
        report.loaded(),
        report.failed,
        report.forced
    );
    Ok(())
}
