//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for reacting to run events: logging,
//! metrics, progress meters, or gating follow-up work. Each subscriber is
//! driven by a dedicated worker loop fed by a bounded queue that is owned by
//! the [`SubscriberSet`](crate::subscribers::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching, retries) – they do **not**
//!   block the run driver nor other subscribers.
//! - Each subscriber **declares** its preferred queue capacity via
//!   [`Subscribe::queue_capacity`]. If a queue overflows, events for that
//!   subscriber are **dropped** (warn).
//! - Workers exit after handling the terminal `Completed` event; a run
//!   delivers nothing afterwards.
//!
//! ## Example
//! ```rust
//! use preloader::{Event, EventKind, Subscribe};
//!
//! struct Audit;
//!
//! #[async_trait::async_trait]
//! impl Subscribe for Audit {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::Failed {
//!             // write audit record...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "audit" }
//!     fn queue_capacity(&self) -> usize { 512 }
//! }
//! ```

use async_trait::async_trait;

use crate::events::Event;

/// Contract for event subscribers.
///
/// Called from a subscriber-dedicated worker task. Implementations should
/// avoid blocking the async runtime (prefer async I/O and cooperative waits).
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    ///
    /// # Parameters
    /// - `event`: Reference to the event (does not transfer ownership)
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs/metrics).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    ///
    /// On overflow, events for this subscriber are **dropped** (warn). A run
    /// over a queue of `N` tasks publishes at most `3N + 3` events, so the
    /// default absorbs runs of ~80 tasks even if the worker never gets
    /// scheduled in between.
    fn queue_capacity(&self) -> usize {
        256
    }
}
