// crates/types/src/launch.rs
//! Launch request parameters and the three-way launch response.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::progress::ResultCounts;

fn is_false(b: &bool) -> bool {
    !*b
}

/// Parameters forwarded to the backend launch call.
///
/// Omit-if-default encoding: only non-default values appear on the wire, so
/// the backend's own defaults apply to everything the user left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[serde(rename_all = "camelCase")]
pub struct IngestParams {
    /// Only ingest indicators published within the last N days.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days_back: Option<u32>,

    /// Cap on the number of indicators to ingest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,

    /// Re-ingest everything instead of only new indicators.
    #[serde(default, skip_serializing_if = "is_false")]
    pub force_full: bool,
}

/// The backend's answer to a launch request.
///
/// Discriminates the three execution paths the tracker has to handle:
/// the job finished inside the launch call, the job was accepted for
/// opaque background execution, or the backend said nothing definitive
/// and the tracker has to poll.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../bindings/")]
#[serde(tag = "mode", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum LaunchOutcome {
    /// The backend ingested the feed synchronously inside the launch call.
    SyncComplete { counts: ResultCounts },

    /// The backend accepted the job and handed back an opaque task id.
    AsyncBackground { task_id: String },

    /// No definitive status; the caller must poll the progress endpoint.
    Unresolved,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_params_omit_defaults() {
        let json = serde_json::to_string(&IngestParams::default()).unwrap();
        assert_eq!(json, "{}", "default params must serialize empty");
    }

    #[test]
    fn test_params_include_non_defaults() {
        let params = IngestParams {
            days_back: Some(30),
            limit: None,
            force_full: true,
        };
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"daysBack\":30"));
        assert!(json.contains("\"forceFull\":true"));
        assert!(!json.contains("limit"));
    }

    #[test]
    fn test_outcome_mode_tags() {
        let sync: LaunchOutcome = serde_json::from_str(
            r#"{"mode":"sync-complete","counts":{"current":42,"total":42}}"#,
        )
        .unwrap();
        assert_eq!(
            sync,
            LaunchOutcome::SyncComplete {
                counts: ResultCounts { current: 42, total: 42 }
            }
        );

        let background: LaunchOutcome =
            serde_json::from_str(r#"{"mode":"async-background","taskId":"task-7"}"#).unwrap();
        assert_eq!(
            background,
            LaunchOutcome::AsyncBackground { task_id: "task-7".to_string() }
        );

        let unresolved: LaunchOutcome = serde_json::from_str(r#"{"mode":"unresolved"}"#).unwrap();
        assert_eq!(unresolved, LaunchOutcome::Unresolved);
    }
}
