//! # Task abstraction: the awaitable unit the preloader settles.
//!
//! This module defines the [`Task`] trait and the common handle type
//! [`TaskRef`], an `Arc<dyn Task>` suitable for storing in a queue.
//!
//! A task produces its operation future exactly once, when the settlement
//! sweep reaches its record. The preloader only observes the outcome; it
//! never cancels or signals the operation. A run that times out leaves
//! in-flight operations running detached.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::TaskError;

/// Boxed future for one task operation. Settles exactly once.
pub type BoxTaskFuture = Pin<Box<dyn Future<Output = Result<(), TaskError>> + Send + 'static>>;

/// Shared handle to a task (`Arc<dyn Task>`).
pub type TaskRef = Arc<dyn Task>;

/// # Asynchronous, settle-once unit.
///
/// Implementors hand the preloader a future that reports exactly one of
/// success or failure. Any awaitable maps onto this; for plain closures use
/// [`TaskFn`](crate::TaskFn).
///
/// # Example
/// ```
/// use preloader::{BoxTaskFuture, Task};
///
/// struct Warmup;
///
/// impl Task for Warmup {
///     fn spawn(&self) -> BoxTaskFuture {
///         Box::pin(async {
///             // fetch, decode, connect...
///             Ok(())
///         })
///     }
/// }
/// ```
pub trait Task: Send + Sync + 'static {
    /// Produces the operation future.
    ///
    /// Called at most once per record, at sweep time; the returned future is
    /// spawned onto the runtime and awaited to settlement.
    fn spawn(&self) -> BoxTaskFuture;
}
