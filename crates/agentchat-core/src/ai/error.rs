//! Provider transport errors

use thiserror::Error;

/// Errors raised while talking to the LLM provider.
///
/// Every variant is fatal to the current run; tool failures never surface here.
#[derive(Debug, Error)]
pub enum AiError {
    #[error("API error ({status}): {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Malformed stream: {0}")]
    Decode(String),

    #[error("No chunk received for {0} seconds")]
    Timeout(u64),
}

impl From<reqwest::Error> for AiError {
    fn from(err: reqwest::Error) -> Self {
        AiError::Network(err.to_string())
    }
}

impl From<serde_json::Error> for AiError {
    fn from(err: serde_json::Error) -> Self {
        AiError::Decode(err.to_string())
    }
}
