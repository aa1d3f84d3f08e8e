//! Error handling for the job fit assistant

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read '{}': {source}", path.display())]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Empty response from model: {0}")]
    EmptyResponse(String),

    #[error("Failed to parse analysis response: {0}")]
    Parse(String),

    #[error("Analysis result failed validation: {0}")]
    Validation(String),

    #[error("Generative API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("No active chat session; run an analysis first")]
    NoActiveSession,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Output formatting error: {0}")]
    OutputFormatting(String),
}

pub type Result<T> = std::result::Result<T, AssistantError>;

/// Transport-level failures from the HTTP client
impl From<reqwest::Error> for AssistantError {
    fn from(err: reqwest::Error) -> Self {
        AssistantError::Network(err.to_string())
    }
}

impl From<askama::Error> for AssistantError {
    fn from(err: askama::Error) -> Self {
        AssistantError::OutputFormatting(err.to_string())
    }
}
