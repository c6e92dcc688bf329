//! # Event bus for broadcasting run events.
//!
//! [`Bus`] is a thin wrapper around [`tokio::sync::broadcast`] that provides
//! non-blocking event publishing from the run driver to any number of
//! receivers.
//!
//! ## Architecture
//! ```text
//! Publishers:                        Receivers (any number):
//!   Preloader::start ──┐
//!                      ├──► Bus ───┬──► fan-out listener ──► SubscriberSet
//!   Driver ────────────┘           ├──► Bus::subscribe() receiver (tests,
//!                                  │    ad-hoc waiters)
//!                                  └──► ...
//! ```
//!
//! ## Rules
//! - **Non-blocking publish**: `publish()` never blocks; it calls
//!   `broadcast::Sender::send`.
//! - **Bounded capacity**: a single ring buffer stores recent events for all
//!   receivers.
//! - **Lag handling**: slow receivers get `RecvError::Lagged(n)` and skip the
//!   `n` oldest items. Lagging never skips the newest event, so a receiver
//!   that keeps reading always observes the terminal `Completed`.
//! - **No persistence**: events are lost if there are no active receivers at
//!   send time.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for run events.
///
/// Thin wrapper over [`tokio::sync::broadcast`] that provides a
/// `publish`/`subscribe` API. Subscribers receive clones of each event.
///
/// ### Properties
/// - **Non-blocking**: `publish()` returns immediately.
/// - **Fire-and-forget**: no delivery or durability guarantees.
/// - **Cloneable**: cheap to clone (internally holds an `Arc`-backed sender).
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity.
    ///
    /// ### Notes
    /// - Capacity is **shared** across all receivers (not per-receiver).
    /// - When receivers lag, they will observe `RecvError::Lagged`.
    /// - The minimum capacity is 1 (clamped).
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let (tx, _rx) = broadcast::channel::<Event>(capacity);
        Self { tx }
    }

    /// Publishes an event to all active receivers.
    ///
    /// Takes ownership of the event; the broadcast channel clones it per
    /// receiver. With no receivers the event is dropped.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a new receiver that will observe subsequent events.
    ///
    /// - Each call creates an **independent** receiver.
    /// - A receiver only gets events **sent after** it subscribes.
    /// - Slow receivers get `RecvError::Lagged(n)` and skip over missed items.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of currently active receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
