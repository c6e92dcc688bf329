//! Closure-backed [`Task`] implementation.
//!
//! [`TaskFn`] adapts any `Fn() -> Future` closure into a [`Task`]: the
//! closure builds the operation future when the settlement sweep reaches
//! the record. Nothing is shared between the queue entry and the running
//! operation; whatever the operation needs is captured by the closure
//! (wrap shared data in an `Arc` explicitly).
//!
//! Most callers never name this type: [`Queue::insert_fn`] wraps a closure
//! on the fly.
//!
//! [`Queue::insert_fn`]: crate::Queue::insert_fn
//!
//! ## Example
//! ```rust
//! use preloader::{TaskError, TaskFn, TaskRef};
//!
//! let warmup: TaskRef = TaskFn::arc(|| async {
//!     // open connections, prime caches...
//!     Ok::<_, TaskError>(())
//! });
//! ```

use std::future::Future;
use std::sync::Arc;

use crate::error::TaskError;
use crate::tasks::task::{BoxTaskFuture, Task};

/// Adapts a future-producing closure into a [`Task`].
pub struct TaskFn<F> {
    factory: F,
}

impl<F> TaskFn<F> {
    /// Wraps a closure as a task.
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    /// Wraps a closure and hands it back as a shared [`TaskRef`] handle.
    ///
    /// ## Example
    /// ```rust
    /// use preloader::{TaskError, TaskFn, TaskRef};
    ///
    /// let t: TaskRef = TaskFn::arc(|| async { Ok::<_, TaskError>(()) });
    /// ```
    pub fn arc(factory: F) -> Arc<Self> {
        Arc::new(Self::new(factory))
    }
}

impl<F, Fut> Task for TaskFn<F>
where
    F: Fn() -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
{
    fn spawn(&self) -> BoxTaskFuture {
        Box::pin((self.factory)())
    }
}
