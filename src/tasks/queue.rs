//! # The preload queue: ordered `key → task` registrations.
//!
//! The queue is a staging area only. `Preloader::start` snapshots it into
//! run records, and membership is fixed from that point on: nothing can be
//! added to or removed from a running preload.
//!
//! Keys are expected to be unique. Inserting an existing key replaces that
//! entry in place, so the last registration wins and the queue position is
//! preserved.

use std::future::Future;
use std::sync::Arc;

use crate::error::TaskError;
use crate::tasks::task::TaskRef;
use crate::tasks::task_fn::TaskFn;

/// Insertion-ordered collection of named task registrations.
///
/// ## Example
/// ```rust
/// use preloader::{Queue, TaskError};
///
/// let mut queue = Queue::new();
/// queue.insert_fn("config", || async { Ok::<_, TaskError>(()) });
/// queue.insert_fn("session", || async { Ok(()) });
///
/// assert_eq!(queue.len(), 2);
/// assert!(queue.contains_key("config"));
/// ```
#[derive(Default)]
pub struct Queue {
    entries: Vec<(Arc<str>, TaskRef)>,
}

impl Queue {
    /// Creates an empty queue.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Registers a task under `key`.
    ///
    /// If `key` is already present, the previous registration is replaced in
    /// place and the queue position is kept.
    pub fn insert(&mut self, key: impl Into<Arc<str>>, task: TaskRef) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = task,
            None => self.entries.push((key, task)),
        }
    }

    /// Registers a closure-backed task under `key`.
    ///
    /// Shorthand for `insert(key, TaskFn::arc(f))`.
    pub fn insert_fn<F, Fut>(&mut self, key: impl Into<Arc<str>>, f: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TaskError>> + Send + 'static,
    {
        self.insert(key, TaskFn::arc(f));
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// True if `key` is registered.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| k.as_ref() == key)
    }

    /// Registered keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_ref())
    }

    pub(crate) fn into_entries(self) -> Vec<(Arc<str>, TaskRef)> {
        self.entries
    }
}
