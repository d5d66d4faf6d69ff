//! Error types for logwarden-clients

use thiserror::Error;

/// Errors an HTTP client can hit before its result reaches the pipeline
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure (DNS, TLS, connect, timeout)
    #[error("HTTP error: {0}")]
    Http(String),

    /// Server answered with a non-success status
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not what we expected
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Client could not be constructed from its configuration
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Decode(err.to_string())
    }
}
