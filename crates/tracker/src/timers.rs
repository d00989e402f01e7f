// crates/tracker/src/timers.rs
//! TimerRegistry: bookkeeping for every scheduled tracker callback.
//!
//! Each poller, guard, and grace timer is a spawned tokio task; its
//! `JoinHandle` is registered here under `(feed id, kind)` so that any
//! terminal path (or full teardown) can abort everything a job owns. A
//! handle leaves the registry exactly once: `deregister` on natural firing,
//! or an aborting `cancel`/`cancel_all`.

use std::collections::HashMap;
use std::sync::Mutex;

use tokio::task::JoinHandle;

use feedwatch_types::FeedId;

/// The kinds of timer a tracked job may own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Repeating progress poll.
    Poll,
    /// Short fallback completion check.
    Fallback,
    /// Hard max-lifetime ceiling.
    MaxLifetime,
    /// Display grace before removal.
    Grace,
}

/// Process-wide set of active timer handles.
pub struct TimerRegistry {
    handles: Mutex<HashMap<(FeedId, TimerKind), JoinHandle<()>>>,
}

impl TimerRegistry {
    pub fn new() -> Self {
        Self {
            handles: Mutex::new(HashMap::new()),
        }
    }

    /// Register a timer for a job, aborting any existing timer of the same
    /// kind. A feed can never own two pollers.
    pub fn register(&self, feed_id: &str, kind: TimerKind, handle: JoinHandle<()>) {
        match self.handles.lock() {
            Ok(mut handles) => {
                if let Some(old) = handles.insert((feed_id.to_string(), kind), handle) {
                    tracing::warn!(feed_id, ?kind, "replacing an existing timer");
                    old.abort();
                }
            }
            Err(e) => {
                tracing::error!("Mutex poisoned registering timer: {e}");
                handle.abort();
            }
        }
    }

    /// Remove a handle without aborting it. Natural-firing path: the timer
    /// task calls this for itself once its work is done.
    pub fn deregister(&self, feed_id: &str, kind: TimerKind) -> bool {
        match self.handles.lock() {
            Ok(mut handles) => handles.remove(&(feed_id.to_string(), kind)).is_some(),
            Err(e) => {
                tracing::error!("Mutex poisoned deregistering timer: {e}");
                false
            }
        }
    }

    /// Abort and remove every timer a job owns. Idempotent.
    pub fn cancel(&self, feed_id: &str) {
        match self.handles.lock() {
            Ok(mut handles) => {
                handles.retain(|(id, _), handle| {
                    if id == feed_id {
                        handle.abort();
                        false
                    } else {
                        true
                    }
                });
            }
            Err(e) => tracing::error!("Mutex poisoned cancelling timers: {e}"),
        }
    }

    /// Abort everything. Subsystem teardown: guarantees zero leaked timers
    /// regardless of in-flight jobs.
    pub fn cancel_all(&self) {
        match self.handles.lock() {
            Ok(mut handles) => {
                for (_, handle) in handles.drain() {
                    handle.abort();
                }
            }
            Err(e) => tracing::error!("Mutex poisoned cancelling all timers: {e}"),
        }
    }

    /// Number of registered timers for one feed.
    pub fn count_for(&self, feed_id: &str) -> usize {
        match self.handles.lock() {
            Ok(handles) => handles.keys().filter(|(id, _)| id == feed_id).count(),
            Err(e) => {
                tracing::error!("Mutex poisoned reading timers: {e}");
                0
            }
        }
    }

    pub fn len(&self) -> usize {
        match self.handles.lock() {
            Ok(handles) => handles.len(),
            Err(e) => {
                tracing::error!("Mutex poisoned reading timers: {e}");
                0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for TimerRegistry {
    fn default() -> Self {
        Self::new()
    }
}
