// crates/tracker/src/lib.rs
//! Long-running operation tracker for threat-feed ingestion.
//!
//! Provides:
//! - `IngestTracker`: launches ingest jobs and routes the three execution
//!   paths (synchronous completion, background acceptance, poll-required)
//! - `ProgressStore`: the UI-visible progress map, keyed by feed id
//! - `TimerRegistry`: bookkeeping for every scheduled callback, for
//!   guaranteed teardown
//! - `FeedBackend`: the abstract backend collaborator
//!
//! The tracker guarantees that every job terminates (poll completion,
//! fallback rescue, or the max-lifetime ceiling) and that no timer handle
//! outlives its job.

pub mod backend;
pub mod config;
pub mod error;
pub mod store;
pub mod timers;
pub mod tracker;

pub use backend::FeedBackend;
pub use config::TrackerConfig;
pub use error::{BackendError, LaunchError};
pub use store::{JobPhase, ProgressStore, TrackedJob};
pub use timers::{TimerKind, TimerRegistry};
pub use tracker::IngestTracker;
