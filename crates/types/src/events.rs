// crates/types/src/events.rs
//! Events published on the tracker's broadcast bus.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::progress::{FeedId, ProgressSnapshot, ResultCounts};

/// Cross-component notification published by the tracker.
///
/// Subscribers (SSE stream, feed list refresher) consume these instead of
/// listening for ad hoc DOM-wide events. `Completed` fires at most once per
/// tracked job; `Progress` fires on every accepted poll snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TrackerEvent {
    Progress {
        feed_id: FeedId,
        progress: ProgressSnapshot,
        timestamp: String,
    },
    Completed {
        feed_id: FeedId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        counts: Option<ResultCounts>,
        timestamp: String,
    },
}

impl TrackerEvent {
    /// The feed this event belongs to.
    pub fn feed_id(&self) -> &str {
        match self {
            TrackerEvent::Progress { feed_id, .. } => feed_id,
            TrackerEvent::Completed { feed_id, .. } => feed_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completed_event_serializes_with_tag() {
        let event = TrackerEvent::Completed {
            feed_id: "feed-1".to_string(),
            counts: Some(ResultCounts { current: 42, total: 42 }),
            timestamp: "2026-08-29T12:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"completed\""));
        assert!(json.contains("\"feedId\":\"feed-1\""));
        assert!(json.contains("\"current\":42"));
    }

    #[test]
    fn test_completed_event_omits_absent_counts() {
        let event = TrackerEvent::Completed {
            feed_id: "feed-1".to_string(),
            counts: None,
            timestamp: "2026-08-29T12:00:00Z".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(!json.contains("counts"));
    }

    #[test]
    fn test_feed_id_accessor() {
        let event = TrackerEvent::Progress {
            feed_id: "feed-2".to_string(),
            progress: ProgressSnapshot::launching(),
            timestamp: "2026-08-29T12:00:00Z".to_string(),
        };
        assert_eq!(event.feed_id(), "feed-2");
    }
}
