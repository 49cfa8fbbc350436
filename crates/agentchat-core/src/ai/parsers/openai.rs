//! OpenAI-compatible SSE parser for chat/completions format

use serde_json::Value;
use tracing::debug;

use crate::ai::decoder::{RawChunk, ToolCallFragment};
use crate::ai::error::AiError;
use crate::ai::types::FinishReason;

/// Parses `data:` payloads of a chat/completions stream into [`RawChunk`]s.
///
/// Stateless: fragments are merged downstream by index, or by id when the
/// provider omits the index.
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenAIParser;

impl OpenAIParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse one payload. Usage-only and keep-alive payloads come back as an
    /// empty chunk.
    pub fn parse_payload(&self, data: &str) -> Result<RawChunk, AiError> {
        let json: Value = serde_json::from_str(data)
            .map_err(|e| AiError::Decode(format!("{}: {}", e, preview(data))))?;
        self.parse_event(&json)
    }

    pub fn parse_event(&self, json: &Value) -> Result<RawChunk, AiError> {
        // {"error": {"message": "...", "type": "..."}}
        if let Some(error) = json.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .or_else(|| error.as_str())
                .unwrap_or("Unknown error");
            return Err(AiError::Provider(message.to_string()));
        }

        // {"choices": [{"index": 0, "delta": {...}, "finish_reason": null}]}
        let Some(choice) = json
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|c| c.first())
        else {
            return Ok(RawChunk::default());
        };

        let mut chunk = RawChunk {
            finish_reason: choice
                .get("finish_reason")
                .and_then(|r| r.as_str())
                .map(FinishReason::parse),
            ..Default::default()
        };

        let Some(delta) = choice.get("delta") else {
            return Ok(chunk);
        };

        chunk.content = str_field(delta, "content");
        // Moonshot/DeepSeek use reasoning_content, OpenRouter uses reasoning
        chunk.reasoning =
            str_field(delta, "reasoning_content").or_else(|| str_field(delta, "reasoning"));

        if let Some(tool_calls) = delta.get("tool_calls").and_then(|t| t.as_array()) {
            for tool_call in tool_calls {
                let index = tool_call
                    .get("index")
                    .and_then(|i| i.as_u64())
                    .map(|i| i as usize);
                let function = tool_call.get("function");

                chunk.tool_calls.push(ToolCallFragment {
                    index,
                    id: str_field(tool_call, "id"),
                    name: function.and_then(|f| str_field(f, "name")),
                    arguments: function.and_then(|f| str_field(f, "arguments")),
                });
            }
            debug!(fragments = chunk.tool_calls.len(), "tool call fragments");
        }

        Ok(chunk)
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value.get(key).and_then(|v| v.as_str()).map(String::from)
}

fn preview(data: &str) -> String {
    data.chars().take(120).collect()
}
