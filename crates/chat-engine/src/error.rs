use thiserror::Error;

/// Chat engine errors
///
/// Admission refusals and polls for unknown sessions are ordinary outcomes
/// and are reported through session status, never through this type.
#[derive(Error, Debug)]
pub enum ChatEngineError {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Agent-related errors
    #[error("Agent error: {0}")]
    Agent(String),

    /// Not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// I/O errors (config files, listener sockets)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ChatEngineError {
    /// Create a new Config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new Agent error
    pub fn agent<S: Into<String>>(msg: S) -> Self {
        Self::Agent(msg.into())
    }

    /// Create a new NotFound error
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new Internal error
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type for chat engine operations
pub type Result<T> = std::result::Result<T, ChatEngineError>;
