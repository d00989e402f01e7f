// crates/types/src/progress.rs
//! Progress snapshot and feed summary types.
//!
//! A `ProgressSnapshot` is the latest known state of one feed's ingest job.
//! `stage` is an opaque display string (backends are not required to draw it
//! from a closed set) and `percentage` is a presentational hint that may
//! regress or overshoot 100. Neither is ever used as a loop invariant.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Opaque identifier for a threat feed. Unique key for tracked jobs.
pub type FeedId = String;

/// Stage reported by backends when an ingest has finished.
pub const STAGE_COMPLETED: &str = "Completed";

/// Stage shown while a launch request is in flight.
pub const STAGE_LAUNCHING: &str = "Launching";

/// Stage shown when the backend accepted the job for background execution.
pub const STAGE_BACKGROUND: &str = "Processing in Background";

/// Latest known progress for one feed's ingest job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    /// Display stage (e.g. "Fetching", "Parsing", "Completed"). Opaque.
    pub stage: String,

    /// Human-readable detail line for the progress panel.
    pub message: String,

    /// Percent hint, 0-100 by convention. Not monotonic, not authoritative.
    pub percentage: u8,

    /// Indicators processed so far.
    pub current: u64,

    /// Total indicators expected, 0 when unknown.
    pub total: u64,

    /// Backend task identifier, present only on the background path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
}

impl ProgressSnapshot {
    /// Snapshot recorded while the launch request is in flight.
    pub fn launching() -> Self {
        Self {
            stage: STAGE_LAUNCHING.to_string(),
            message: "Contacting feed backend...".to_string(),
            percentage: 0,
            current: 0,
            total: 0,
            task_id: None,
        }
    }

    /// Terminal snapshot for a completed ingest.
    pub fn completed(counts: &ResultCounts) -> Self {
        Self {
            stage: STAGE_COMPLETED.to_string(),
            message: format!("Imported {} of {} indicators", counts.current, counts.total),
            percentage: 100,
            current: counts.current,
            total: counts.total,
            task_id: None,
        }
    }

    /// Snapshot for a job the backend accepted for background execution.
    pub fn background(task_id: impl Into<String>) -> Self {
        Self {
            stage: STAGE_BACKGROUND.to_string(),
            message: "The feed is being ingested in the background".to_string(),
            percentage: 0,
            current: 0,
            total: 0,
            task_id: Some(task_id.into()),
        }
    }

    /// Whether this snapshot signals completion.
    ///
    /// Point-in-time check only: `stage` equality or the percentage hint
    /// reaching 100. Callers must not assume later snapshots stay terminal.
    pub fn is_terminal(&self) -> bool {
        self.stage == STAGE_COMPLETED || self.percentage >= 100
    }

    /// Result counts carried by this snapshot.
    pub fn counts(&self) -> ResultCounts {
        ResultCounts {
            current: self.current,
            total: self.total,
        }
    }
}

/// Indicator counts reported when an ingest completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[serde(rename_all = "camelCase")]
pub struct ResultCounts {
    pub current: u64,
    pub total: u64,
}

/// One row of the authoritative feed list.
///
/// Used by the fallback check to infer completion through a side channel:
/// a feed that is present and no longer `ingesting` has finished its work
/// even if the progress endpoint never said so.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[serde(rename_all = "camelCase")]
pub struct FeedSummary {
    pub id: FeedId,
    pub name: String,
    pub indicator_count: u64,
    pub ingesting: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_snapshot_serializes_camel_case() {
        let snap = ProgressSnapshot::background("task-9");
        let json = serde_json::to_string(&snap).unwrap();
        assert!(json.contains("\"taskId\":\"task-9\""));
        assert!(json.contains("\"stage\":\"Processing in Background\""));
    }

    #[test]
    fn test_snapshot_omits_absent_task_id() {
        let snap = ProgressSnapshot::launching();
        let json = serde_json::to_string(&snap).unwrap();
        assert!(!json.contains("taskId"));
    }

    #[test]
    fn test_terminal_by_stage_or_percentage() {
        let counts = ResultCounts { current: 42, total: 42 };
        assert!(ProgressSnapshot::completed(&counts).is_terminal());

        let mut snap = ProgressSnapshot::launching();
        snap.stage = "Fetching".to_string();
        snap.percentage = 100;
        assert!(snap.is_terminal(), "percentage >= 100 alone is terminal");

        snap.percentage = 99;
        assert!(!snap.is_terminal());
    }

    #[test]
    fn test_completed_snapshot_carries_counts() {
        let counts = ResultCounts { current: 42, total: 50 };
        let snap = ProgressSnapshot::completed(&counts);
        assert_eq!(snap.percentage, 100);
        assert_eq!(snap.counts(), counts);
        assert!(snap.message.contains("42"));
    }

    #[test]
    fn test_snapshot_deserializes_from_backend_payload() {
        let json = r#"{
            "stage": "Fetching",
            "message": "Downloading feed",
            "percentage": 10,
            "current": 4,
            "total": 42
        }"#;
        let snap: ProgressSnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snap.stage, "Fetching");
        assert_eq!(snap.percentage, 10);
        assert_eq!(snap.task_id, None);
    }
}
