// crates/types/src/lib.rs
//! Wire types shared between the tracker and the dashboard frontend.
//!
//! Everything here is serialized to the UI (camelCase JSON) and exported as
//! TypeScript via ts-rs. Keep these structs free of tokio/runtime types.

pub mod events;
pub mod launch;
pub mod progress;

pub use events::TrackerEvent;
pub use launch::{IngestParams, LaunchOutcome};
pub use progress::{
    FeedId, FeedSummary, ProgressSnapshot, ResultCounts, STAGE_BACKGROUND, STAGE_COMPLETED,
    STAGE_LAUNCHING,
};
