//! Final run report.

use std::sync::Arc;

use crate::core::record::TaskStatus;

/// Outcome snapshot published at completion.
///
/// Returned by [`Preloader::run`](crate::Preloader::run) and
/// [`Preloader::completed`](crate::Preloader::completed). Statuses are listed
/// in queue order and never change after completion.
#[derive(Clone, Debug)]
pub struct Report {
    /// True when the timeout forced completion before every task settled.
    pub forced: bool,
    /// Number of records in the run.
    pub total: u32,
    /// Records that reached a terminal status (successes and failures).
    pub settled: u32,
    /// Records that settled as failures.
    pub failed: u32,
    /// Final per-key statuses, in queue order.
    pub statuses: Vec<(Arc<str>, TaskStatus)>,
}

impl Report {
    /// Records that settled successfully.
    #[inline]
    pub fn loaded(&self) -> u32 {
        self.settled - self.failed
    }

    /// Keys that never settled. Non-empty only on a forced completion.
    pub fn pending(&self) -> Vec<Arc<str>> {
        self.statuses
            .iter()
            .filter(|(_, status)| !status.is_settled())
            .map(|(key, _)| key.clone())
            .collect()
    }

    /// True when every task settled successfully within the deadline.
    #[inline]
    pub fn is_clean(&self) -> bool {
        !self.forced && self.failed == 0 && self.settled == self.total
    }
}
