// crates/tracker/src/config.rs
//! Tunables for the tracker's timers.
//!
//! Defaults are the production values. Every field is public so tests can
//! shrink the deadlines instead of being bound to real intervals.

use std::time::Duration;

/// Timer configuration for tracked ingest jobs.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Period of the progress poller.
    pub poll_period: Duration,

    /// Delay before the fallback check re-queries the feed list.
    pub fallback_delay: Duration,

    /// Hard ceiling on how long any poll-required job may live.
    pub max_lifetime: Duration,

    /// Display grace before a synchronously-completed job is removed.
    pub sync_grace: Duration,

    /// Display grace before a background-accepted job is removed.
    pub background_grace: Duration,

    /// Display grace before a poll/fallback-completed job is removed.
    pub completion_grace: Duration,

    /// Consecutive malformed poll responses tolerated before the job is
    /// destroyed as a fatal poll error.
    pub max_malformed_polls: u32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_period: Duration::from_secs(2),
            fallback_delay: Duration::from_secs(5),
            max_lifetime: Duration::from_secs(300),
            sync_grace: Duration::from_secs(3),
            background_grace: Duration::from_secs(3),
            completion_grace: Duration::from_secs(2),
            max_malformed_polls: 3,
        }
    }
}
