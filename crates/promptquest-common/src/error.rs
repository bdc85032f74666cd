//! Error types for PromptQuest
//!
//! Provides a unified error type shared by the library crates

use thiserror::Error;

/// Result type alias using PromptQuestError
pub type Result<T> = std::result::Result<T, PromptQuestError>;

/// Unified error type for PromptQuest operations
#[derive(Debug, Error)]
pub enum PromptQuestError {
    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    // Network errors
    #[error("Network error: {0}")]
    Network(String),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    // Input rejected at an API boundary
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<serde_json::Error> for PromptQuestError {
    fn from(err: serde_json::Error) -> Self {
        PromptQuestError::Serialization(err.to_string())
    }
}

impl From<std::io::Error> for PromptQuestError {
    fn from(err: std::io::Error) -> Self {
        PromptQuestError::Storage(err.to_string())
    }
}

impl From<anyhow::Error> for PromptQuestError {
    fn from(err: anyhow::Error) -> Self {
        PromptQuestError::Internal(err.to_string())
    }
}
