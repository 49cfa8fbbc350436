//! OpenAI chat/completions request format

use serde_json::{json, Value};

use crate::ai::client::config::ReasoningEffort;
use crate::ai::types::{AiTool, ChatMessage, Role};

/// Builds chat/completions request bodies
#[derive(Debug, Default, Clone, Copy)]
pub struct OpenAIFormat;

impl OpenAIFormat {
    pub fn new() -> Self {
        Self
    }

    /// Conversation log in wire order. Assistant turns keep their tool calls so
    /// the following `tool` messages can be correlated by id.
    pub fn convert_messages(&self, messages: &[ChatMessage]) -> Vec<Value> {
        messages
            .iter()
            .map(|msg| {
                let mut value = json!({
                    "role": msg.role.as_str(),
                    "content": msg.content,
                });

                if msg.role == Role::Assistant && !msg.tool_calls.is_empty() {
                    value["tool_calls"] = msg
                        .tool_calls
                        .iter()
                        .map(|call| {
                            json!({
                                "id": call.id,
                                "type": "function",
                                "function": {
                                    "name": call.name,
                                    "arguments": call.arguments,
                                }
                            })
                        })
                        .collect();
                }

                if let Some(id) = &msg.tool_call_id {
                    value["tool_call_id"] = json!(id);
                }

                value
            })
            .collect()
    }

    pub fn convert_tools(&self, tools: &[AiTool]) -> Vec<Value> {
        tools
            .iter()
            .map(|tool| {
                json!({
                    "type": "function",
                    "function": {
                        "name": tool.name,
                        "description": tool.description,
                        "parameters": tool.parameters
                    }
                })
            })
            .collect()
    }

    /// Streaming request body. `tools` and `tool_choice` are left out when no
    /// tool is enabled.
    pub fn build_request_body(
        &self,
        model: &str,
        messages: &[ChatMessage],
        tools: &[AiTool],
        reasoning_effort: Option<ReasoningEffort>,
    ) -> Value {
        let mut body = json!({
            "model": model,
            "messages": self.convert_messages(messages),
            "stream": true,
        });

        if !tools.is_empty() {
            body["tools"] = json!(self.convert_tools(tools));
            body["tool_choice"] = json!("auto");
        }

        if let Some(effort) = reasoning_effort {
            body["reasoning_effort"] = json!(effort.as_str());
        }

        body
    }
}
