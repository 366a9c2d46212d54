//! Error types for the now playing service.

use std::time::Duration;

use thiserror::Error;

/// Main error type for every layer of the service.
///
/// The HTTP boundary collapses all variants into `400 Bad Request`; the
/// variants exist so logs say what actually went wrong.
#[derive(Debug, Error)]
pub enum Error {
    /// A required variable is missing or a configured value is malformed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The OAuth handshake could not produce a client.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Nobody completed the browser authorization within the configured bound.
    #[error("Authorization callback not completed within {0:?}")]
    AuthTimeout(Duration),

    /// Spotify answered with an error status or an unusable payload.
    #[error("Upstream error: {0}")]
    Upstream(String),

    /// HTTP request failed.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// JSON encoding or decoding failed.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
