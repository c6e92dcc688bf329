//! Error types used by the preloader runtime and tasks.
//!
//! The single enum here, [`TaskError`], describes why one task settled as a
//! failure. Failures are first-class run outcomes: each one is turned into
//! `Failed` / `TaskFailed` events and counts toward progress, so a failing
//! task never blocks completion. Recovery is left to subscribers.

use thiserror::Error;

/// # Errors produced by task operations.
///
/// A task operation settles exactly once, either as success or as one of
/// these failures. The preloader records the failure, emits the
/// corresponding events, and moves on.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum TaskError {
    /// The operation reported a failure.
    #[error("load failed: {error}")]
    Fail {
        /// Underlying error message.
        error: String,
    },

    /// The operation panicked while running.
    #[error("load panicked: {info}")]
    Panicked {
        /// Panic payload, if it carried a message.
        info: String,
    },
}

impl TaskError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use preloader::TaskError;
    ///
    /// let err = TaskError::Fail { error: "boom".into() };
    /// assert_eq!(err.as_label(), "task_failed");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            TaskError::Fail { .. } => "task_failed",
            TaskError::Panicked { .. } => "task_panicked",
        }
    }

    /// Returns a human-readable message with details about the error.
    pub fn as_message(&self) -> String {
        match self {
            TaskError::Fail { error } => format!("error: {error}"),
            TaskError::Panicked { info } => format!("panic: {info}"),
        }
    }
}
