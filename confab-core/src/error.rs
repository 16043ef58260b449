//! Error types for the Confab core library.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E2001-E2099 | Config | Config file, environment, and validation errors |
//! | E5001-E5099 | Transport | Chat endpoint request, timeout, and parse errors |
//! | E9001-E9099 | General | IO and serialization errors |

use thiserror::Error;

/// The main error type for the Confab core library.
///
/// Send failures (network, timeout, malformed reply) are absorbed by the
/// session and surfaced as system messages; these variants reach callers
/// only through the transport and export/config APIs.
#[derive(Debug, Error)]
pub enum ConfabError {
    // ========================================================================
    // Config Errors (E2001-E2099)
    // ========================================================================
    /// A configuration value failed validation
    #[error("[E2001] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    /// Configuration sources could not be read or deserialized
    #[error("[E2002] Configuration could not be loaded: {0}")]
    ConfigLoad(String),

    // ========================================================================
    // Transport Errors (E5001-E5099)
    // ========================================================================
    /// The chat endpoint could not be reached or the request failed
    #[error("[E5001] Chat endpoint request failed: {0}")]
    Transport(String),

    /// The chat endpoint answered with a body that is not a valid reply
    #[error("[E5002] Chat endpoint reply could not be parsed: {0}")]
    MalformedReply(String),

    /// The chat endpoint did not answer within the configured timeout
    #[error("[E5003] Chat endpoint timed out: {0}")]
    Timeout(String),

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// JSON serialization or deserialization failed
    #[error("[E9001] Serialization error: {0}")]
    Serialization(String),

    /// Filesystem operation failed
    #[error("[E9002] IO error: {0}")]
    Io(String),
}

pub type ConfabResult<T> = Result<T, ConfabError>;

impl From<reqwest::Error> for ConfabError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ConfabError::Timeout(err.to_string())
        } else if err.is_connect() {
            ConfabError::Transport(format!("connection failed: {}", err))
        } else if err.is_decode() {
            ConfabError::MalformedReply(err.to_string())
        } else {
            ConfabError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ConfabError {
    fn from(err: serde_json::Error) -> Self {
        ConfabError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for ConfabError {
    fn from(err: std::io::Error) -> Self {
        ConfabError::Io(err.to_string())
    }
}

impl From<config::ConfigError> for ConfabError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => ConfabError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            other => ConfabError::ConfigLoad(other.to_string()),
        }
    }
}
