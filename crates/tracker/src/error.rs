// crates/tracker/src/error.rs
use thiserror::Error;

/// Errors reported by the feed backend collaborator.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("connection failed: {0}")]
    Connection(String),

    #[error("backend error: {0}")]
    Api(String),

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl BackendError {
    /// Whether a single failed poll with this error may be retried.
    ///
    /// Malformed payloads are structural and count toward the fatal-poll
    /// threshold; everything else is treated as transient.
    pub fn is_transient(&self) -> bool {
        !matches!(self, BackendError::MalformedResponse(_))
    }
}

/// Errors surfaced to the caller of `IngestTracker::launch`.
///
/// Launch errors propagate synchronously and leave no job bookkeeping
/// behind: no store entry, no timers.
#[derive(Debug, Error)]
pub enum LaunchError {
    /// The backend rejected an out-of-range parameter. The backend's own
    /// message is passed through so the UI can show it verbatim.
    #[error("parameter validation failed: {0}")]
    InvalidParameter(String),

    /// The launch call itself failed (network, HTTP, backend fault).
    #[error("launch request failed: {0}")]
    Request(#[source] BackendError),
}

impl LaunchError {
    /// Classify a backend error from the launch call.
    pub fn from_backend(err: BackendError) -> Self {
        match err {
            BackendError::InvalidParameter(msg) => Self::InvalidParameter(msg),
            other => Self::Request(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(BackendError::Connection("timeout".into()).is_transient());
        assert!(BackendError::Api("HTTP 500".into()).is_transient());
        assert!(!BackendError::MalformedResponse("not json".into()).is_transient());
    }

    #[test]
    fn test_launch_error_passes_validation_message_through() {
        let err = LaunchError::from_backend(BackendError::InvalidParameter(
            "days_back must be <= 365".into(),
        ));
        assert!(matches!(err, LaunchError::InvalidParameter(_)));
        assert!(err.to_string().contains("days_back must be <= 365"));
    }

    #[test]
    fn test_launch_error_wraps_other_backend_faults() {
        let err = LaunchError::from_backend(BackendError::Connection("refused".into()));
        assert!(matches!(err, LaunchError::Request(_)));
        assert!(err.to_string().contains("launch request failed"));
    }
}
