//! # Event subscribers for the preloader.
//!
//! This module provides the [`Subscribe`] trait, the fan-out
//! [`SubscriberSet`], and built-in implementations for handling run events
//! broadcast through the [`Bus`](crate::events::Bus).
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Driver ── publish(Event) ──► Bus ──► fan-out listener (in Preloader)
//!                                              │
//!                                   SubscriberSet::emit(&Event)
//!                                 ┌─────────────┼─────────────┐
//!                                 ▼             ▼             ▼
//!                             [queue 1]     [queue 2]     [queue N]
//!                                 ▼             ▼             ▼
//!                              worker 1      worker 2      worker N
//!                                 ▼             ▼             ▼
//!                           sub.on_event(&Event)  (per subscriber)
//! ```
//!
//! ## Subscriber types
//! - **Passive subscribers** - observe and react to events (logging, metrics, alerts)
//! - **Stateful subscribers** - maintain internal state based on events
//!   ([`ProgressTracker`])
//!
//! ## Implementing custom subscribers
//! ```no_run
//! use preloader::{Event, EventKind, Subscribe};
//! use async_trait::async_trait;
//!
//! struct MetricsSubscriber;
//!
//! #[async_trait]
//! impl Subscribe for MetricsSubscriber {
//!     async fn on_event(&self, event: &Event) {
//!         match event.kind {
//!             EventKind::Failed => {
//!                 // increment failure counter
//!             }
//!             _ => {}
//!         }
//!     }
//! }
//! ```

mod progress;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
mod log;

pub use progress::ProgressTracker;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
