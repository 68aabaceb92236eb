//! Error types for the clinic API client.
//!
//! # Design
//! Every failure of the resource layer collapses into one `ApiError`, which is
//! what `ResourceState::error` carries. Variants still keep the distinction
//! between transport failures, HTTP statuses and caller misuse so that views
//! can choose a message. `NotFound` gets its own variant because detail pages
//! render it differently from a generic failure.
//!
//! The enum is `Clone` so state snapshots can be handed to subscribers.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (connection refused, DNS, I/O).
    #[error("transport failure: {0}")]
    Transport(String),

    /// The server returned 404.
    #[error("resource not found")]
    NotFound,

    /// The server returned a non-2xx status other than 404.
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// `fetch_data` was called without a bound or explicit path.
    #[error("no path provided for API request")]
    MissingPath,

    /// The request was aborted through its cancel token.
    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    /// HTTP status carried by the error, when the server produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::NotFound => Some(404),
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for server-side 5xx failures.
    pub fn is_server_error(&self) -> bool {
        matches!(self.status(), Some(500..=599))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_error_displays_status_and_body() {
        let err = ApiError::Http {
            status: 500,
            body: "boom".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: boom");
        assert!(err.is_server_error());
    }

    #[test]
    fn not_found_reports_404() {
        assert_eq!(ApiError::NotFound.status(), Some(404));
        assert!(!ApiError::NotFound.is_server_error());
    }

    #[test]
    fn caller_misuse_has_no_status() {
        assert_eq!(ApiError::MissingPath.status(), None);
        assert_eq!(ApiError::MissingPath.to_string(), "no path provided for API request");
    }
}
