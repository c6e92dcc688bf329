//! Run events: types and broadcast bus.
//!
//! This module groups the event **data model** and the **bus** used to
//! publish/subscribe to events emitted during a preload run.
//!
//! ## Contents
//! - [`EventKind`], [`Event`] event classification and payload metadata
//! - [`Bus`] thin wrapper over `tokio::sync::broadcast`
//!
//! ## Quick reference
//! - **Publishers**: `Preloader::start` (the `Started` event) and the run
//!   driver (everything after it).
//! - **Consumers**: the fan-out listener inside `Preloader` (delivers to the
//!   [`SubscriberSet`](crate::SubscriberSet)) and any receiver obtained from
//!   [`Bus::subscribe`].
//!
//! See `core/mod.rs` for the system-level wiring diagram.

mod bus;
mod event;

pub use bus::Bus;
pub use event::{Event, EventKind};
