//! # Error Types Module
//!
//! Structured errors for configuration, the LLM relay and lead persistence.

use thiserror::Error;

/// Errors that stop the bot from starting
#[derive(Error, Debug)]
pub enum BotError {
    /// Missing or invalid environment configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failures of a single chat-completion call
#[derive(Error, Debug)]
pub enum LlmError {
    /// The request did not finish within the configured timeout
    #[error("LLM request timed out")]
    Timeout,
    /// Connection or transport failure
    #[error("LLM network error: {0}")]
    Network(String),
    /// Non-success HTTP status
    #[error("LLM returned status {status}: {body}")]
    Status { status: u16, body: String },
    /// Response body did not have the expected shape
    #[error("Unexpected LLM payload: {0}")]
    Payload(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else if err.is_decode() {
            LlmError::Payload(err.to_string())
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

/// Lead store failures
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Lead store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Lead store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
