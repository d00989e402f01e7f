// crates/tracker/src/tracker.rs
//! IngestTracker: central orchestrator for long-running feed ingests.
//!
//! One `launch` call routes a job down one of three paths depending on the
//! backend's answer: synchronous completion (terminal immediately, no timers
//! beyond the display grace), background acceptance (fire-and-forget, removed
//! after a grace period), or poll-required (interval poller plus fallback and
//! max-lifetime guards). Every path ends in the same synchronous cleanup so
//! no timer can outlive its job.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

use feedwatch_types::{
    FeedId, IngestParams, LaunchOutcome, ProgressSnapshot, ResultCounts, TrackerEvent,
};

use crate::backend::{find_summary, FeedBackend};
use crate::config::TrackerConfig;
use crate::error::LaunchError;
use crate::store::{JobPhase, ProgressStore, TrackedJob};
use crate::timers::{TimerKind, TimerRegistry};

/// Tracker for long-running ingest operations, shared as `Arc<Self>`.
pub struct IngestTracker {
    backend: Arc<dyn FeedBackend>,
    store: ProgressStore,
    timers: TimerRegistry,
    config: TrackerConfig,
    events: broadcast::Sender<TrackerEvent>,
}

impl IngestTracker {
    pub fn new(backend: Arc<dyn FeedBackend>, config: TrackerConfig) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        Arc::new(Self {
            backend,
            store: ProgressStore::new(),
            timers: TimerRegistry::new(),
            config,
            events,
        })
    }

    /// Subscribe to tracker events (progress updates and completions).
    pub fn subscribe(&self) -> broadcast::Receiver<TrackerEvent> {
        self.events.subscribe()
    }

    /// The UI-visible progress for one feed, if an ingest is tracked.
    pub fn progress(&self, feed_id: &str) -> Option<ProgressSnapshot> {
        self.store.progress(feed_id)
    }

    /// All tracked ingests, for the active-operations panel.
    pub fn active(&self) -> Vec<(FeedId, ProgressSnapshot)> {
        self.store.active()
    }

    /// Whether a feed currently has an active job.
    pub fn is_tracking(&self, feed_id: &str) -> bool {
        self.store.contains(feed_id)
    }

    /// Number of timer handles registered for one feed.
    pub fn timer_count(&self, feed_id: &str) -> usize {
        self.timers.count_for(feed_id)
    }

    /// Total number of registered timer handles.
    pub fn total_timers(&self) -> usize {
        self.timers.len()
    }

    /// Launch an ingest job for one feed.
    ///
    /// Idempotent per feed: a second launch while a job is active is a
    /// no-op. On launch failure no job bookkeeping survives and the error
    /// propagates to the caller.
    pub async fn launch(
        self: &Arc<Self>,
        feed_id: &str,
        params: IngestParams,
    ) -> Result<(), LaunchError> {
        let placeholder = TrackedJob::new(JobPhase::Launching, ProgressSnapshot::launching());
        if !self.store.insert_new(feed_id, placeholder) {
            debug!(feed_id, "launch ignored: feed already has an active job");
            return Ok(());
        }

        match self.backend.launch_ingest(feed_id, &params).await {
            Ok(LaunchOutcome::SyncComplete { counts }) => {
                info!(
                    feed_id,
                    current = counts.current,
                    total = counts.total,
                    "ingest completed synchronously"
                );
                // Fast path: terminal right away, no poller or guards ever.
                self.complete_job(feed_id, Some(counts), self.config.sync_grace);
                Ok(())
            }
            Ok(LaunchOutcome::AsyncBackground { task_id }) => {
                info!(feed_id, task_id = %task_id, "ingest accepted for background execution");
                let job = TrackedJob::new(
                    JobPhase::Background,
                    ProgressSnapshot::background(task_id),
                );
                // Fire-and-forget: surface the acceptance, then remove after
                // the grace period. No poller, no completion event.
                if self.store.set_job(feed_id, job.clone()) {
                    let _ = self.events.send(TrackerEvent::Progress {
                        feed_id: feed_id.to_string(),
                        progress: job.progress,
                        timestamp: now_rfc3339(),
                    });
                    self.spawn_grace_removal(feed_id, self.config.background_grace);
                }
                Ok(())
            }
            Ok(LaunchOutcome::Unresolved) => {
                debug!(feed_id, "launch status unresolved; starting poller and guards");
                if self.store.set_phase(feed_id, JobPhase::Polling) {
                    self.spawn_poller(feed_id);
                    self.spawn_guards(feed_id);
                }
                Ok(())
            }
            Err(err) => {
                // Roll back the placeholder: a failed launch leaves nothing.
                self.store.remove(feed_id);
                warn!(feed_id, error = %err, "launch request failed");
                Err(LaunchError::from_backend(err))
            }
        }
    }

    /// Tear down the subsystem: abort every timer, drop every job.
    /// Idempotent, and safe while timer callbacks are in flight; they all
    /// re-check the store before mutating.
    pub fn shutdown(&self) {
        self.timers.cancel_all();
        self.store.clear();
        info!("ingest tracker shut down");
    }

    // =========================================================================
    // Poller
    // =========================================================================

    /// Spawn the per-job progress poller. One interval task; the first query
    /// fires one period after launch.
    fn spawn_poller(self: &Arc<Self>, feed_id: &str) {
        let tracker = Arc::clone(self);
        let feed = feed_id.to_string();
        let period = self.config.poll_period;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            // Swallow the immediate first tick.
            ticker.tick().await;

            let mut malformed = 0u32;
            loop {
                ticker.tick().await;

                // Fire-time staleness check: never trust captured state.
                if !tracker.store.contains(&feed) {
                    tracker.timers.deregister(&feed, TimerKind::Poll);
                    return;
                }

                match tracker.backend.query_progress(&feed).await {
                    Ok(snapshot) => {
                        malformed = 0;
                        if snapshot.is_terminal() {
                            let counts = snapshot.counts();
                            tracker.complete_job(
                                &feed,
                                Some(counts),
                                tracker.config.completion_grace,
                            );
                            return;
                        }
                        if !tracker.store.update_progress(&feed, snapshot.clone()) {
                            tracker.timers.deregister(&feed, TimerKind::Poll);
                            return;
                        }
                        let _ = tracker.events.send(TrackerEvent::Progress {
                            feed_id: feed.clone(),
                            progress: snapshot,
                            timestamp: now_rfc3339(),
                        });
                    }
                    Err(err) if err.is_transient() => {
                        warn!(feed_id = %feed, error = %err, "progress poll failed; will retry");
                    }
                    Err(err) => {
                        malformed += 1;
                        warn!(
                            feed_id = %feed,
                            error = %err,
                            attempts = malformed,
                            "malformed progress response"
                        );
                        if malformed >= tracker.config.max_malformed_polls {
                            error!(feed_id = %feed, "fatal poll error; destroying job");
                            tracker.destroy_job(&feed);
                            return;
                        }
                    }
                }
            }
        });

        self.timers.register(feed_id, TimerKind::Poll, handle);
    }

    // =========================================================================
    // Guards
    // =========================================================================

    /// Spawn the fallback check and the max-lifetime abort for a
    /// poll-required job. Both are independent of the poller.
    fn spawn_guards(self: &Arc<Self>, feed_id: &str) {
        let tracker = Arc::clone(self);
        let feed = feed_id.to_string();
        let delay = self.config.fallback_delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            tracker.run_fallback_check(&feed).await;
        });
        self.timers.register(feed_id, TimerKind::Fallback, handle);

        let tracker = Arc::clone(self);
        let feed = feed_id.to_string();
        let lifetime = self.config.max_lifetime;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(lifetime).await;
            tracker.timers.deregister(&feed, TimerKind::MaxLifetime);
            if tracker.destroy_job(&feed) {
                warn!(feed_id = %feed, "max lifetime reached; job aborted without completion");
            }
        });
        self.timers.register(feed_id, TimerKind::MaxLifetime, handle);
    }

    /// Fallback completion check: some backends finish the work without ever
    /// updating the dedicated progress endpoint, so re-query the
    /// authoritative feed list and force completion if the ingest is no
    /// longer running there.
    async fn run_fallback_check(self: &Arc<Self>, feed_id: &str) {
        self.timers.deregister(feed_id, TimerKind::Fallback);

        // Fire-time staleness check.
        match self.store.get(feed_id) {
            Some(job) if job.phase == JobPhase::Polling => {}
            _ => return,
        }

        match self.backend.list_feeds().await {
            Ok(feeds) => match find_summary(&feeds, feed_id) {
                Some(summary) if !summary.ingesting => {
                    info!(feed_id, "fallback check found the ingest finished; forcing completion");
                    let counts = ResultCounts {
                        current: summary.indicator_count,
                        total: summary.indicator_count,
                    };
                    self.complete_job(feed_id, Some(counts), self.config.completion_grace);
                }
                Some(_) => {
                    debug!(feed_id, "fallback check: ingest still running");
                }
                None => {
                    debug!(feed_id, "fallback check: feed not in authoritative list");
                }
            },
            Err(err) => {
                warn!(feed_id, error = %err, "fallback feed list query failed");
            }
        }
    }

    // =========================================================================
    // Terminal funnel
    // =========================================================================

    /// Completion notifier. Fires at most once per job (the
    /// `begin_completion` phase transition is the gate), then cancels the
    /// job's timers, publishes the completion event, kicks the feed-list
    /// refresh, and schedules the grace-period removal.
    ///
    /// Synchronous on purpose: a poller or guard task calling this may abort
    /// its own handle via `cancel`, and must not await afterwards.
    fn complete_job(self: &Arc<Self>, feed_id: &str, counts: Option<ResultCounts>, grace: Duration) {
        let terminal = match &counts {
            Some(c) => ProgressSnapshot::completed(c),
            None => {
                let mut snap = self
                    .store
                    .progress(feed_id)
                    .unwrap_or_else(ProgressSnapshot::launching);
                snap.stage = feedwatch_types::STAGE_COMPLETED.to_string();
                snap.message = "Ingest completed".to_string();
                snap.percentage = 100;
                snap
            }
        };

        if !self.store.begin_completion(feed_id, terminal) {
            return;
        }

        self.timers.cancel(feed_id);

        let _ = self.events.send(TrackerEvent::Completed {
            feed_id: feed_id.to_string(),
            counts,
            timestamp: now_rfc3339(),
        });

        // Decoupled collaborator; detached so this funnel never awaits.
        let backend = Arc::clone(&self.backend);
        tokio::spawn(async move {
            if let Err(e) = backend.refresh_feed_list().await {
                warn!(error = %e, "feed list refresh after completion failed");
            }
        });

        self.spawn_grace_removal(feed_id, grace);
    }

    /// Schedule the final store removal once the display grace has elapsed.
    fn spawn_grace_removal(self: &Arc<Self>, feed_id: &str, grace: Duration) {
        let tracker = Arc::clone(self);
        let feed = feed_id.to_string();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(grace).await;
            tracker.timers.deregister(&feed, TimerKind::Grace);
            if tracker.store.remove(&feed).is_some() {
                debug!(feed_id = %feed, "job removed from progress store");
            }
        });
        self.timers.register(feed_id, TimerKind::Grace, handle);
    }

    /// Immediate destruction without success semantics: remove the store
    /// entry and abort every timer the job owns. Shared by the fatal-poll
    /// and max-lifetime paths. Returns whether a job was actually present.
    fn destroy_job(&self, feed_id: &str) -> bool {
        let existed = self.store.remove(feed_id).is_some();
        self.timers.cancel(feed_id);
        existed
    }
}

fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
