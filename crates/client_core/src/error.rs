//! Failure taxonomy for remote post operations.

use reqwest::StatusCode;
use thiserror::Error;

/// A classified failure from the remote post store.
///
/// Classification happens once, at the call that failed; the `Display`
/// strings here are exactly what the UI renders.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The caller cancelled the request before it settled.
    #[error("Request cancelled")]
    Cancelled,
    /// The request exceeded the client-side deadline.
    #[error("A timeout has occurred")]
    Timeout,
    /// The server answered with HTTP 404.
    #[error("Resource not found")]
    NotFound,
    /// Everything else, including failures that never produced a response.
    #[error("An unexpected error has occurred")]
    Other {
        #[source]
        source: Option<reqwest::Error>,
    },
}

/// [`StoreError`] without the underlying cause, for state snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Cancelled,
    Timeout,
    NotFound,
    Other,
}

impl StoreError {
    pub fn kind(&self) -> FailureKind {
        match self {
            StoreError::Cancelled => FailureKind::Cancelled,
            StoreError::Timeout => FailureKind::Timeout,
            StoreError::NotFound => FailureKind::NotFound,
            StoreError::Other { .. } => FailureKind::Other,
        }
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return StoreError::Timeout;
        }
        // `status()` is `None` when no response was ever received (refused
        // connection, DNS failure); those stay in the catch-all.
        match err.status() {
            Some(StatusCode::NOT_FOUND) => StoreError::NotFound,
            _ => StoreError::Other { source: Some(err) },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_strings_match_what_the_ui_renders() {
        assert_eq!(StoreError::Cancelled.to_string(), "Request cancelled");
        assert_eq!(StoreError::Timeout.to_string(), "A timeout has occurred");
        assert_eq!(StoreError::NotFound.to_string(), "Resource not found");
        assert_eq!(
            StoreError::Other { source: None }.to_string(),
            "An unexpected error has occurred"
        );
    }

    #[test]
    fn kind_tracks_the_variant() {
        assert_eq!(StoreError::Cancelled.kind(), FailureKind::Cancelled);
        assert_eq!(StoreError::Timeout.kind(), FailureKind::Timeout);
        assert_eq!(StoreError::NotFound.kind(), FailureKind::NotFound);
        assert_eq!(
            StoreError::Other { source: None }.kind(),
            FailureKind::Other
        );
    }
}
