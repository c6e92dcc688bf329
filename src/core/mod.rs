//! Runtime core: the coordinator and its run state machine.
//!
//! This module contains the embedded implementation of the preload runtime.
//! The public API from this module is [`Preloader`] plus the run-visible
//! state types ([`Report`], [`TaskStatus`]).
//!
//! Internal modules:
//! - [`coordinator`]: construction, the start guard, subscriber wiring, the
//!   completion latch;
//! - [`driver`]: single-owner run state machine (sweep, settlements, timeout);
//! - [`record`]: one queue entry under coordination and its status;
//! - [`report`]: the final outcome snapshot.
//!
//! ## Wiring
//! ```text
//! Preloader::start(queue)
//!   ├─ publish(Started) ────────────────► Bus ──► fan-out listener ──► SubscriberSet
//!   └─ spawn(Driver::run)                 ▲
//!        ├─ sweep: spawn ops, publish ────┘
//!        ├─ settlements (mpsc, one at a time)
//!        └─ completion latch (watch) ──► Preloader::completed()
//! ```

mod coordinator;
mod driver;
mod record;
mod report;

pub use coordinator::Preloader;
pub use record::TaskStatus;
pub use report::Report;
