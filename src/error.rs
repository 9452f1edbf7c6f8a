//! Error types for verity-core.

use thiserror::Error;

/// Result type alias using verity-core's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during claim analysis.
#[derive(Error, Debug)]
pub enum Error {
    /// External service unreachable or returned a non-success status
    #[error("Transport error: {service} - {message}")]
    Transport { service: String, message: String },

    /// Timeout during an external call
    #[error("Operation timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Malformed structured response from an external service
    #[error("Parse error: {service} - {message}")]
    Parse { service: String, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Evidence retrieval exhausted every fallback for a claim
    #[error("Retrieval error: {0}")]
    Retrieval(String),

    /// Audit history storage error
    #[error("History storage error: {0}")]
    History(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a transport error for a named service.
    pub fn transport(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Transport {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a parse error for a named service.
    pub fn parse(service: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            service: service.into(),
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(duration_ms: u64) -> Self {
        Self::Timeout { duration_ms }
    }

    /// Create a retrieval error.
    pub fn retrieval(message: impl Into<String>) -> Self {
        Self::Retrieval(message.into())
    }
}
