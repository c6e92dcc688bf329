//! # SubscriberSet: non-blocking fan-out over multiple subscribers
//!
//! [`SubscriberSet`] distributes each [`Event`](crate::events::Event) to
//! multiple subscribers **without awaiting** their processing.
//!
//! ## What it guarantees
//! - `emit(&Event)` returns immediately.
//! - Per-subscriber FIFO (queue order).
//! - Panics inside subscribers are caught and logged (isolation).
//! - Workers exit after handling the terminal `Completed` event; late events
//!   are dropped silently.
//!
//! ## What it does **not** guarantee
//! - No global ordering across different subscribers.
//! - No retries on per-subscriber queue overflow (events are dropped for that
//!   subscriber).
//!
//! ## Diagram
//! ```text
//!    emit(&Event)
//!        │                        (Arc-clone per subscriber)
//!        ├────────────────► [queue S1] ─► worker S1 ─► on_event()
//!        ├────────────────► [queue S2] ─► worker S2 ─► on_event()
//!        └────────────────► [queue SN] ─► worker SN ─► on_event()
//! ```
//!
//! ## Example
//! ```rust
//! use std::sync::Arc;
//! use preloader::{Event, EventKind, Subscribe, SubscriberSet};
//!
//! struct Printer;
//!
//! #[async_trait::async_trait]
//! impl Subscribe for Printer {
//!     async fn on_event(&self, ev: &Event) {
//!         println!("seq={} kind={:?}", ev.seq, ev.kind);
//!     }
//!     fn name(&self) -> &'static str { "printer" }
//! }
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() {
//!     let set = SubscriberSet::new(vec![Arc::new(Printer) as _]);
//!     set.emit(&Event::new(EventKind::Started).with_progress(0, 1));
//!     set.emit(&Event::new(EventKind::Completed).with_forced(false));
//!     set.shutdown().await;
//! }
//! ```

use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::events::Event;

use super::Subscribe;

/// Per-subscriber channel with metadata
struct SubscriberChannel {
    name: &'static str,
    sender: mpsc::Sender<Arc<Event>>,
}

/// Composite fan-out with per-subscriber bounded queues and worker tasks.
pub struct SubscriberSet {
    channels: Vec<SubscriberChannel>,
    workers: Vec<JoinHandle<()>>,
}

impl SubscriberSet {
    /// Creates a new set and spawns one worker per subscriber.
    #[must_use]
    pub fn new(subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut channels = Vec::with_capacity(subs.len());
        let mut workers = Vec::with_capacity(subs.len());

        for sub in subs {
            let cap = sub.queue_capacity().max(1);
            let name = sub.name();
            let (tx, mut rx) = mpsc::channel::<Arc<Event>>(cap);

            let handle = tokio::spawn(async move {
                while let Some(ev) = rx.recv().await {
                    let terminal = ev.is_terminal();
                    let fut = sub.on_event(ev.as_ref());
                    if let Err(panic_err) = AssertUnwindSafe(fut).catch_unwind().await {
                        eprintln!(
                            "[preloader] subscriber '{}' panicked: {:?}",
                            sub.name(),
                            panic_err
                        );
                    }
                    // The run is over once the terminal event is handled;
                    // exiting releases this subscription.
                    if terminal {
                        break;
                    }
                }
            });

            channels.push(SubscriberChannel { name, sender: tx });
            workers.push(handle);
        }

        Self { channels, workers }
    }

    /// Fan-out one event to all subscribers (non-blocking).
    ///
    /// If a subscriber's queue is **full**, the event is dropped for it and a
    /// warning is logged with the subscriber's name. A **closed** queue (the
    /// worker already finished its run) drops silently: events emitted after
    /// completion must have no observable effect.
    pub fn emit(&self, event: &Event) {
        let ev = Arc::new(event.clone());
        for channel in &self.channels {
            match channel.sender.try_send(Arc::clone(&ev)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    eprintln!(
                        "[preloader] subscriber '{}' dropped event: queue full",
                        channel.name
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {}
            }
        }
    }

    /// Graceful shutdown: close all queues and await worker completion.
    pub async fn shutdown(self) {
        drop(self.channels);
        for h in self.workers {
            let _ = h.await;
        }
    }

    /// True if there are no subscribers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// Number of subscribers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.channels.len()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::events::EventKind;

    struct Counter {
        seen: AtomicU32,
    }

    #[async_trait::async_trait]
    impl Subscribe for Counter {
        async fn on_event(&self, _event: &Event) {
            self.seen.fetch_add(1, Ordering::SeqCst);
        }
        fn name(&self) -> &'static str {
            "counter"
        }
    }

    #[tokio::test]
    async fn delivers_then_shutdown_drains() {
        let counter = Arc::new(Counter {
            seen: AtomicU32::new(0),
        });
        let set = SubscriberSet::new(vec![counter.clone() as _]);
        assert_eq!(set.len(), 1);
        assert!(!set.is_empty());

        set.emit(&Event::new(EventKind::Started).with_progress(0, 1));
        set.emit(&Event::new(EventKind::TaskLoading).with_task("a"));
        set.shutdown().await;

        assert_eq!(counter.seen.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn worker_exits_after_terminal_event() {
        let counter = Arc::new(Counter {
            seen: AtomicU32::new(0),
        });
        let set = SubscriberSet::new(vec![counter.clone() as _]);

        set.emit(&Event::new(EventKind::Completed).with_forced(false));
        tokio::time::sleep(Duration::from_millis(50)).await;

        // Worker is gone; the late event is dropped silently.
        set.emit(&Event::new(EventKind::Started));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(counter.seen.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn panicking_subscriber_is_isolated() {
        struct Bomb;

        #[async_trait::async_trait]
        impl Subscribe for Bomb {
            async fn on_event(&self, _event: &Event) {
                panic!("bomb");
            }
            fn name(&self) -> &'static str {
                "bomb"
            }
        }

        let counter = Arc::new(Counter {
            seen: AtomicU32::new(0),
        });
        let set = SubscriberSet::new(vec![Arc::new(Bomb) as _, counter.clone() as _]);

        set.emit(&Event::new(EventKind::Started));
        set.emit(&Event::new(EventKind::Completed).with_forced(false));
        set.shutdown().await;

        // The panicking subscriber never takes the healthy one down.
        assert_eq!(counter.seen.load(Ordering::SeqCst), 2);
    }
}
