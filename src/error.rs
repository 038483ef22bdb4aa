//! Error types for the relay
//!
//! Maps the failure classes of the push pipeline onto a single typed
//! taxonomy. Authentication and decoding failures become HTTP responses;
//! archival failures stay behind the detached write and never reach the
//! caller.

use thiserror::Error;

/// Fixed body returned to the broker with every 403
pub const REJECTION_BODY: &str = "not a valid Broker request";

/// Main error type for relay operations
#[derive(Debug, Error)]
pub enum RelayError {
    /// The request was not signed by the trusted broker. Terminal; maps to
    /// HTTP 403, displaying as [`REJECTION_BODY`].
    #[error("{}", REJECTION_BODY)]
    AuthenticationFailed,

    /// The request body was not a valid message batch. Maps to HTTP 400.
    #[error("invalid message batch: {message}")]
    DecodeError { message: String },

    #[error("archive error: {0}")]
    Archive(#[from] crate::archive::ArchiveError),

    #[error("authentication setup error: {0}")]
    Auth(#[from] crate::auth::AuthError),

    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl RelayError {
    /// Create a decode error
    pub fn decode_error<S: Into<String>>(message: S) -> Self {
        Self::DecodeError {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Result type for relay operations
pub type RelayResult<T> = Result<T, RelayError>;
