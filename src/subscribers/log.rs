//! # Simple logging subscriber for debugging and demos.
//!
//! [`LogWriter`] prints events to stdout in a human-readable format.
//! This is primarily useful for development, debugging, and examples.
//!
//! ## Output format
//! ```text
//! [started] total=3
//! [loading] task=config
//! [loaded] task=config settled=1/3
//! [failed] task=session reason="connection refused" settled=2/3
//! [timeout] settled=2/3
//! [complete] forced=true settled=2/3
//! ```
//!
//! Per-key `TaskLoaded` / `TaskFailed` events repeat what the aggregate lines
//! already show and are skipped.

use async_trait::async_trait;

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Simple stdout logging subscriber.
///
/// Enabled via the `logging` feature. Prints human-readable event
/// descriptions to stdout for debugging and demonstration purposes.
///
/// Not intended for production use - implement a custom [`Subscribe`] for
/// structured logging or metrics collection.
pub struct LogWriter;

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let counts = match (e.settled, e.total) {
            (Some(s), Some(t)) => format!("{s}/{t}"),
            _ => String::new(),
        };
        match e.kind {
            EventKind::Started => {
                println!("[started] total={}", e.total.unwrap_or(0));
            }
            EventKind::TaskLoading => {
                if let Some(task) = &e.task {
                    println!("[loading] task={task}");
                }
            }
            EventKind::Loaded => {
                if let Some(task) = &e.task {
                    println!("[loaded] task={task} settled={counts}");
                }
            }
            EventKind::Failed => {
                if let Some(task) = &e.task {
                    let reason = e.reason.as_deref().unwrap_or("unknown");
                    println!("[failed] task={task} reason={reason:?} settled={counts}");
                }
            }
            EventKind::TaskLoaded | EventKind::TaskFailed => {}
            EventKind::TimedOut => {
                println!("[timeout] settled={counts}");
            }
            EventKind::Completed => {
                println!(
                    "[complete] forced={} settled={counts}",
                    e.forced.unwrap_or(false)
                );
            }
        }
    }

    fn name(&self) -> &'static str {
        "log"
    }
}
