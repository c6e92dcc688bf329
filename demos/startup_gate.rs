//! # Example: startup_gate
//!
//! Minimal example: gate application startup on three named loads.
//!
//! Shows how to:
//! - Register closure-backed tasks in a [`Queue`].
//! - Run the whole gate with [`Preloader::run`].
//! - Read the final [`Report`].
//!
//! ## Flow
//! ```text
//! Queue ──► Preloader::run()
//!     ├─► publish(Started)
//!     ├─► sweep: publish(TaskLoading × 3), spawn ops
//!     ├─► per settlement: publish(Loaded + TaskLoaded)
//!     └─► publish(Completed{ forced: false }) ──► Report
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example startup_gate
//! ```

use std::time::Duration;

use preloader::{Config, Preloader, Queue, TaskError};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let mut queue = Queue::new();
    queue.insert_fn("config", || async {
        tokio::time::sleep(Duration::from_millis(120)).await;
        println!("[config] parsed");
        Ok::<(), TaskError>(())
    });
    queue.insert_fn("session", || async {
        tokio::time::sleep(Duration::from_millis(250)).await;
        println!("[session] restored");
        Ok(())
    });
    queue.insert_fn("catalog", || async {
        tokio::time::sleep(Duration::from_millis(80)).await;
        println!("[catalog] warmed");
        Ok(())
    });

    let gate = Preloader::new(Config::default(), Vec::new());
    let report = gate.run(queue).await;

    println!(
        "\nready: settled={}/{} failed={} forced={}",
        report.settled, report.total, report.failed, report.forced
    );
    Ok(())
}
