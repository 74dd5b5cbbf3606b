//! Error types for the pawfeed client.
//!
//! This module defines the centralized error type [`PawfeedError`] and a type alias
//! [`Result`] for convenient error handling throughout the client. All errors are
//! implemented using the `thiserror` crate for automatic `Error` trait implementation.
//!
//! # Taxonomy
//!
//! Four kinds of failure are distinguished at the API boundary:
//!
//! - **Network**: the request never produced a response
//! - **Timeout**: the client aborted the request after its deadline
//! - **HTTP**: the server answered with a non-2xx status and an error envelope
//! - **Validation**: the request was rejected client-side before being sent
//!
//! Everything else (storage, configuration, serialization) is an internal failure.

use std::time::Duration;
use thiserror::Error;

/// The main error type for pawfeed operations.
///
/// # Examples
///
/// ```
/// use pawfeed::domain::{ErrorKind, PawfeedError};
///
/// let err = PawfeedError::Validation("message cannot be empty".to_string());
/// assert_eq!(err.kind(), ErrorKind::Validation);
/// assert!(err.is_expected());
/// ```
#[derive(Debug, Error)]
pub enum PawfeedError {
    /// The request failed before any response arrived (DNS, connection reset, TLS).
    #[error("Network error: {0}")]
    Network(String),

    /// The client-side deadline elapsed and the request was aborted.
    #[error("Request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// The server returned a non-2xx status.
    ///
    /// `message` is taken from the `error` field of the response envelope when
    /// present; `body` keeps the full parsed envelope for callers that need details.
    #[error("HTTP {status}: {message}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Human-readable message from the error envelope.
        message: String,
        /// Parsed response body.
        body: serde_json::Value,
    },

    /// Input rejected client-side; no request was sent.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The identity provider rejected the operation.
    ///
    /// Covers invalid credentials, duplicate accounts, and unconfirmed users.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Durable client storage could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Filesystem or I/O operation failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A route pattern could not be compiled.
    #[error("Route error: {0}")]
    Route(String),
}

/// Coarse classification of a [`PawfeedError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    Timeout,
    Http,
    Validation,
    Auth,
    Internal,
}

impl PawfeedError {
    /// Returns the coarse kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_) => ErrorKind::Network,
            Self::Timeout(_) => ErrorKind::Timeout,
            Self::Http { .. } => ErrorKind::Http,
            Self::Validation(_) => ErrorKind::Validation,
            Self::Auth(_) => ErrorKind::Auth,
            Self::Storage(_)
            | Self::Io(_)
            | Self::Serialization(_)
            | Self::Config(_)
            | Self::Route(_) => ErrorKind::Internal,
        }
    }

    /// Whether this failure is one the user should be told about with a toast.
    ///
    /// Internal failures are logged instead.
    #[must_use]
    pub const fn is_expected(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Internal)
    }

    /// HTTP status for [`PawfeedError::Http`], `None` otherwise.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short message suitable for a toast.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Could not reach the server. Check your connection.".to_string(),
            Self::Timeout(_) => "The server took too long to respond.".to_string(),
            Self::Http { message, .. } | Self::Validation(message) | Self::Auth(message) => {
                message.clone()
            }
            other => other.to_string(),
        }
    }
}

/// A specialized `Result` type for pawfeed operations.
pub type Result<T> = std::result::Result<T, PawfeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_carry_status_and_envelope_message() {
        let err = PawfeedError::Http {
            status: 409,
            message: "slug already taken".to_string(),
            body: serde_json::json!({ "error": "slug already taken", "field": "slug" }),
        };

        assert_eq!(err.status(), Some(409));
        assert_eq!(err.kind(), ErrorKind::Http);
        assert_eq!(err.user_message(), "slug already taken");
        assert_eq!(err.to_string(), "HTTP 409: slug already taken");
    }

    #[test]
    fn timeout_is_distinct_from_network() {
        let timeout = PawfeedError::Timeout(Duration::from_secs(10));
        let network = PawfeedError::Network("connection reset".to_string());

        assert_eq!(timeout.kind(), ErrorKind::Timeout);
        assert_eq!(network.kind(), ErrorKind::Network);
        assert_eq!(timeout.to_string(), "Request timed out after 10s");
    }

    #[test]
    fn internal_errors_are_not_toasted() {
        let err = PawfeedError::Storage("disk full".to_string());
        assert!(!err.is_expected());
        assert!(PawfeedError::Auth("bad password".to_string()).is_expected());
    }
}
