//! # Task abstractions and the preload queue.
//!
//! This module provides the core task-related types:
//! - [`Task`] - trait for settle-once async operations
//! - [`TaskFn`] - function-based task implementation
//! - [`TaskRef`] - shared reference to a task (`Arc<dyn Task>`)
//! - [`Queue`] - insertion-ordered `key → task` registrations

mod queue;
mod task;
mod task_fn;

pub use queue::Queue;
pub use task::{BoxTaskFuture, Task, TaskRef};
pub use task_fn::TaskFn;
