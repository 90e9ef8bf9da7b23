use std::io;
use thiserror::Error;

/// Unified error type for the dchat application
#[derive(Error, Debug)]
pub enum DchatError {
    /// No record matches the requested discussion code
    #[error("Discussion not found: {0}")]
    NotFound(String),

    /// A discussion-scoped command ran with nothing open
    #[error("No discussion is open. Create or open one with !new or !open")]
    NoActiveDiscussion,

    /// Malformed or out-of-range command argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Unrecognized command token
    #[error("Unknown command: !{0}")]
    UnknownCommand(String),

    /// Remote chat-completion failure (credential, network, quota)
    #[error("Gateway error: {0}")]
    Gateway(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// User input errors
    #[error("Input error: {0}")]
    Input(String),

    /// IO-related errors
    #[error("IO error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<reqwest::Error> for DchatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DchatError::Gateway(format!("Request timed out: {}", err))
        } else if err.is_connect() {
            DchatError::Gateway(format!("Connection failed: {}", err))
        } else if err.is_status() {
            DchatError::Gateway(format!("API returned error status: {}", err))
        } else {
            DchatError::Gateway(format!("Request failed: {}", err))
        }
    }
}

impl From<serde_json::Error> for DchatError {
    fn from(err: serde_json::Error) -> Self {
        DchatError::Serialization(format!("JSON error: {}", err))
    }
}

impl From<serde_yml::Error> for DchatError {
    fn from(err: serde_yml::Error) -> Self {
        DchatError::Serialization(format!("YAML error: {}", err))
    }
}
