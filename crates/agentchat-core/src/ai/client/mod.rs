//! Provider client
//!
//! [`LlmProvider`] is the seam the orchestrator talks through; [`AiClient`] is
//! the HTTP implementation for OpenAI-compatible endpoints.

pub mod config;
mod core;
mod streaming;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::ai::decoder::RawChunk;
use crate::ai::error::AiError;
use crate::ai::types::{AiTool, ChatMessage};

pub use self::config::{AiClientConfig, ReasoningEffort};
pub use self::core::AiClient;

/// Raw chunks of one provider response
pub type RawChunkStream = Pin<Box<dyn Stream<Item = Result<RawChunk, AiError>> + Send>>;

/// A streaming chat-completion backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Start one completion. Errors before the first chunk (connect failure,
    /// non-2xx status) are returned directly; later ones arrive in the stream.
    async fn stream_completion(
        &self,
        messages: &[ChatMessage],
        tools: &[AiTool],
    ) -> Result<RawChunkStream, AiError>;
}
