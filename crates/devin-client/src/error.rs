//! Client error types.

use std::time::Duration;

use thiserror::Error;

/// Client error type.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP request failed (connection, TLS, or timeout).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server returned a non-success status.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the server, or the status line.
        message: String,
    },

    /// The server answered successfully but the body is missing required data.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Invalid configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The poll loop hit its configured iteration cap.
    #[error("session {session_id} still not terminal after {polls} polls")]
    PollLimit {
        /// Session being polled.
        session_id: String,
        /// Number of status requests issued.
        polls: u32,
    },

    /// The poll loop ran past its configured deadline.
    #[error("session {session_id} still not terminal after {elapsed:?}")]
    DeadlineExceeded {
        /// Session being polled.
        session_id: String,
        /// Time spent polling.
        elapsed: Duration,
    },

    /// Polling was cancelled by the caller.
    #[error("polling of session {session_id} was cancelled")]
    Cancelled {
        /// Session being polled.
        session_id: String,
    },
}

impl Error {
    /// Check if this is a not-found error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api { status: 404, .. })
    }

    /// Check if this is an authentication error.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, Error::Api { status: 401 | 403, .. })
    }

    /// Check if this is a rate limit error.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::Api { status: 429, .. })
    }

    /// Check if this is a server error.
    pub fn is_server_error(&self) -> bool {
        matches!(self, Error::Api { status, .. } if *status >= 500)
    }

    /// Check if a single request timed out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Error::Http(e) if e.is_timeout())
    }
}

/// Result type for client operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error body returned by the API.
#[derive(Debug, serde::Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorResponse {
    pub(crate) fn into_message(self) -> Option<String> {
        self.detail.or(self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_predicates() {
        let err = Error::Api {
            status: 401,
            message: "bad token".to_string(),
        };
        assert!(err.is_auth_error());
        assert!(!err.is_not_found());

        let err = Error::Api {
            status: 503,
            message: "down".to_string(),
        };
        assert!(err.is_server_error());
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_error_display() {
        let err = Error::PollLimit {
            session_id: "s1".to_string(),
            polls: 3,
        };
        assert_eq!(err.to_string(), "session s1 still not terminal after 3 polls");

        let err = Error::Api {
            status: 500,
            message: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "API error (500): boom");
    }

    #[test]
    fn test_error_response_prefers_detail() {
        let body: ErrorResponse =
            serde_json::from_str(r#"{"detail":"Session not found","message":"other"}"#).unwrap();
        assert_eq!(body.into_message().as_deref(), Some("Session not found"));

        let body: ErrorResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert!(body.into_message().is_none());
    }
}
