//! # Run configuration.
//!
//! [`Config`] carries the two knobs a preload run recognizes: the global
//! timeout and the event bus capacity.
//!
//! # Example
//! ```
//! use std::time::Duration;
//! use preloader::Config;
//!
//! let mut cfg = Config::default();
//! cfg.timeout = Duration::from_secs(5);
//! cfg.bus_capacity = 256;
//!
//! assert_eq!(cfg.deadline(), Some(Duration::from_secs(5)));
//! ```

use std::time::Duration;

/// Configuration for a preload run.
///
/// Controls how long the run waits before forcing completion and how large
/// the event bus ring buffer is.
#[derive(Clone, Debug)]
pub struct Config {
    /// Maximum time to wait for the queue to settle before forcing
    /// completion (0 = wait indefinitely).
    ///
    /// The timer is armed once at start and released at completion. It never
    /// cancels in-flight operations; it only forces the aggregate outcome.
    pub timeout: Duration,
    /// Capacity of the event bus channel (clamped to a minimum of 1).
    ///
    /// Receivers that lag behind by more than this many events observe
    /// `Lagged` and skip the oldest items.
    pub bus_capacity: usize,
}

impl Config {
    /// Returns the timeout as an `Option`.
    ///
    /// - `None` → the timer is never armed, completion is never forced
    /// - `Some(d)` → completion is forced after `d`
    #[inline]
    pub fn deadline(&self) -> Option<Duration> {
        if self.timeout == Duration::ZERO {
            None
        } else {
            Some(self.timeout)
        }
    }
}

impl Default for Config {
    /// Provides a default configuration:
    /// - `timeout = 10s`
    /// - `bus_capacity = 1024`
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            bus_capacity: 1024,
        }
    }
}
