// crates/tracker/src/store.rs
//! ProgressStore: the single source of UI-visible truth for tracked jobs.
//!
//! Keyed by feed id. Absence means idle; `Done` is represented by removal.
//! All mutation is synchronous (std locks) so the terminal cleanup paths in
//! the tracker contain no await points.

use std::collections::HashMap;
use std::sync::RwLock;

use feedwatch_types::{FeedId, ProgressSnapshot};

/// Lifecycle phase of a tracked job while it exists in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobPhase {
    /// Launch request in flight; placeholder entry for idempotent launch.
    Launching,
    /// Poll-required path: poller and guard timers are running.
    Polling,
    /// Accepted for background execution; fire-and-forget until grace expiry.
    Background,
    /// Terminal state reached; entry survives only for the display grace.
    Completing,
}

/// One tracked job: the latest progress snapshot plus its phase.
#[derive(Debug, Clone)]
pub struct TrackedJob {
    pub phase: JobPhase,
    pub progress: ProgressSnapshot,
}

impl TrackedJob {
    pub fn new(phase: JobPhase, progress: ProgressSnapshot) -> Self {
        Self { phase, progress }
    }
}

/// Mapping from feed id to its tracked job.
pub struct ProgressStore {
    jobs: RwLock<HashMap<FeedId, TrackedJob>>,
}

impl ProgressStore {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a job only if the feed has no active one.
    ///
    /// Returns false (and leaves the store untouched) when a job already
    /// exists; this is the idempotent-launch gate.
    pub fn insert_new(&self, feed_id: &str, job: TrackedJob) -> bool {
        match self.jobs.write() {
            Ok(mut jobs) => {
                if jobs.contains_key(feed_id) {
                    false
                } else {
                    jobs.insert(feed_id.to_string(), job);
                    true
                }
            }
            Err(e) => {
                tracing::error!("RwLock poisoned writing progress store: {e}");
                false
            }
        }
    }

    /// Replace a job's entry wholesale. Returns false if the job is gone.
    pub fn set_job(&self, feed_id: &str, job: TrackedJob) -> bool {
        match self.jobs.write() {
            Ok(mut jobs) => match jobs.get_mut(feed_id) {
                Some(entry) => {
                    *entry = job;
                    true
                }
                None => false,
            },
            Err(e) => {
                tracing::error!("RwLock poisoned writing progress store: {e}");
                false
            }
        }
    }

    /// Move a job to a new phase, keeping its progress. Returns false if
    /// the job is gone.
    pub fn set_phase(&self, feed_id: &str, phase: JobPhase) -> bool {
        match self.jobs.write() {
            Ok(mut jobs) => match jobs.get_mut(feed_id) {
                Some(entry) => {
                    entry.phase = phase;
                    true
                }
                None => false,
            },
            Err(e) => {
                tracing::error!("RwLock poisoned writing progress store: {e}");
                false
            }
        }
    }

    /// Overwrite a job's progress snapshot, keeping its phase.
    ///
    /// Returns false if the job no longer exists; callers use this as the
    /// fire-time staleness check instead of trusting captured state.
    pub fn update_progress(&self, feed_id: &str, progress: ProgressSnapshot) -> bool {
        match self.jobs.write() {
            Ok(mut jobs) => match jobs.get_mut(feed_id) {
                Some(entry) => {
                    entry.progress = progress;
                    true
                }
                None => false,
            },
            Err(e) => {
                tracing::error!("RwLock poisoned writing progress store: {e}");
                false
            }
        }
    }

    /// Transition a job into `Completing` with its terminal snapshot.
    ///
    /// Succeeds at most once per job: returns false when the job is absent
    /// or already completing. This is what makes the completion notifier
    /// fire exactly once no matter which detection path wins.
    pub fn begin_completion(&self, feed_id: &str, terminal: ProgressSnapshot) -> bool {
        match self.jobs.write() {
            Ok(mut jobs) => match jobs.get_mut(feed_id) {
                Some(entry) if entry.phase != JobPhase::Completing => {
                    entry.phase = JobPhase::Completing;
                    entry.progress = terminal;
                    true
                }
                _ => false,
            },
            Err(e) => {
                tracing::error!("RwLock poisoned writing progress store: {e}");
                false
            }
        }
    }

    /// Remove a job. Returns the entry if it was still present.
    pub fn remove(&self, feed_id: &str) -> Option<TrackedJob> {
        match self.jobs.write() {
            Ok(mut jobs) => jobs.remove(feed_id),
            Err(e) => {
                tracing::error!("RwLock poisoned writing progress store: {e}");
                None
            }
        }
    }

    /// Snapshot of one job, if tracked.
    pub fn get(&self, feed_id: &str) -> Option<TrackedJob> {
        match self.jobs.read() {
            Ok(jobs) => jobs.get(feed_id).cloned(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading progress store: {e}");
                None
            }
        }
    }

    /// The UI-visible progress for one feed, if tracked.
    pub fn progress(&self, feed_id: &str) -> Option<ProgressSnapshot> {
        self.get(feed_id).map(|job| job.progress)
    }

    pub fn contains(&self, feed_id: &str) -> bool {
        match self.jobs.read() {
            Ok(jobs) => jobs.contains_key(feed_id),
            Err(e) => {
                tracing::error!("RwLock poisoned reading progress store: {e}");
                false
            }
        }
    }

    /// All tracked jobs, for the dashboard's active-operations panel.
    pub fn active(&self) -> Vec<(FeedId, ProgressSnapshot)> {
        match self.jobs.read() {
            Ok(jobs) => jobs
                .iter()
                .map(|(id, job)| (id.clone(), job.progress.clone()))
                .collect(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading progress store: {e}");
                Vec::new()
            }
        }
    }

    /// Drop every entry. Teardown path.
    pub fn clear(&self) {
        match self.jobs.write() {
            Ok(mut jobs) => jobs.clear(),
            Err(e) => tracing::error!("RwLock poisoned clearing progress store: {e}"),
        }
    }

    pub fn len(&self) -> usize {
        match self.jobs.read() {
            Ok(jobs) => jobs.len(),
            Err(e) => {
                tracing::error!("RwLock poisoned reading progress store: {e}");
                0
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for ProgressStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn launching_job() -> TrackedJob {
        TrackedJob::new(JobPhase::Launching, ProgressSnapshot::launching())
    }

    #[test]
    fn test_insert_new_is_idempotent() {
        let store = ProgressStore::new();
        assert!(store.insert_new("feed-1", launching_job()));
        assert!(
            !store.insert_new("feed-1", launching_job()),
            "second insert for an active feed must be rejected"
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_progress_reports_staleness() {
        let store = ProgressStore::new();
        let mut snap = ProgressSnapshot::launching();
        snap.stage = "Fetching".to_string();
        snap.percentage = 10;

        assert!(!store.update_progress("feed-1", snap.clone()), "no job yet");

        store.insert_new("feed-1", launching_job());
        assert!(store.update_progress("feed-1", snap));
        assert_eq!(store.progress("feed-1").unwrap().percentage, 10);
    }

    #[test]
    fn test_begin_completion_fires_once() {
        let store = ProgressStore::new();
        store.insert_new("feed-1", launching_job());

        let counts = feedwatch_types::ResultCounts { current: 42, total: 42 };
        let terminal = ProgressSnapshot::completed(&counts);

        assert!(store.begin_completion("feed-1", terminal.clone()));
        assert!(
            !store.begin_completion("feed-1", terminal.clone()),
            "a second completion path must lose the race"
        );
        assert!(!store.begin_completion("feed-2", terminal), "absent job");

        let job = store.get("feed-1").unwrap();
        assert_eq!(job.phase, JobPhase::Completing);
        assert_eq!(job.progress.percentage, 100);
    }

    #[test]
    fn test_remove_and_clear() {
        let store = ProgressStore::new();
        store.insert_new("feed-1", launching_job());
        store.insert_new("feed-2", launching_job());

        assert!(store.remove("feed-1").is_some());
        assert!(store.remove("feed-1").is_none(), "double remove is a no-op");

        store.clear();
        assert!(store.is_empty());
    }

    #[test]
    fn test_active_lists_all_jobs() {
        let store = ProgressStore::new();
        store.insert_new("feed-1", launching_job());
        store.insert_new("feed-2", launching_job());

        let mut active = store.active();
        active.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].0, "feed-1");
    }
}
