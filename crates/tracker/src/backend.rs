// crates/tracker/src/backend.rs
//! FeedBackend trait defining the interface to the ingest backend.

use async_trait::async_trait;

use feedwatch_types::{FeedSummary, IngestParams, LaunchOutcome, ProgressSnapshot};

use crate::error::BackendError;

/// Abstract backend the tracker launches jobs against.
///
/// Implementations bind this to a real transport (the dashboard's REST
/// client); tests script it with canned responses. The tracker never sees
/// HTTP details, only these four operations.
#[async_trait]
pub trait FeedBackend: Send + Sync {
    /// Start an ingest job for one feed. Params use omit-if-default encoding.
    async fn launch_ingest(
        &self,
        feed_id: &str,
        params: &IngestParams,
    ) -> Result<LaunchOutcome, BackendError>;

    /// Query the dedicated progress endpoint for one feed.
    async fn query_progress(&self, feed_id: &str) -> Result<ProgressSnapshot, BackendError>;

    /// Fetch the authoritative feed list. Used by the fallback check to
    /// infer completion when the progress endpoint is silent.
    async fn list_feeds(&self) -> Result<Vec<FeedSummary>, BackendError>;

    /// Ask the UI layer to re-render the feed list after a completion.
    async fn refresh_feed_list(&self) -> Result<(), BackendError>;
}

/// Find one feed's summary row in the authoritative list.
pub fn find_summary<'a>(feeds: &'a [FeedSummary], feed_id: &str) -> Option<&'a FeedSummary> {
    feeds.iter().find(|f| f.id == feed_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: &str, ingesting: bool) -> FeedSummary {
        FeedSummary {
            id: id.to_string(),
            name: format!("Feed {id}"),
            indicator_count: 10,
            ingesting,
        }
    }

    #[test]
    fn test_find_summary() {
        let feeds = vec![summary("feed-1", true), summary("feed-2", false)];
        assert_eq!(find_summary(&feeds, "feed-2").map(|f| f.ingesting), Some(false));
        assert!(find_summary(&feeds, "feed-3").is_none());
    }
}
