//! AI provider layer
//!
//! Talks to OpenAI-compatible chat/completions endpoints and decodes their
//! streamed responses.

pub mod client;
pub mod decoder;
pub mod error;
pub mod format;
pub mod parsers;
pub mod providers;
pub mod sse;
pub mod types;

pub use client::{AiClient, AiClientConfig, LlmProvider, RawChunkStream};
pub use decoder::{DeltaDecoder, RawChunk, StreamDelta, ToolCallFragment, ToolCallSet};
pub use error::AiError;
