//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for deploywatch
///
/// Infra errors carry a lot more structure (status codes, wrapped causes);
/// by the time they reach this type they have been classified and reduced
/// to a message that is safe to show to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum DeployError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DeployError {
    /// The message without the category prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Config(msg)
            | Self::Platform(msg)
            | Self::Network(msg)
            | Self::Auth(msg)
            | Self::RateLimited(msg)
            | Self::NotFound(msg)
            | Self::InvalidInput(msg)
            | Self::Internal(msg) => msg,
        }
    }
}

/// Result type alias for deploywatch operations
pub type Result<T> = std::result::Result<T, DeployError>;
