//! Conversation log for one request
//!
//! Append-only: messages are never rewritten or dropped once pushed, so the
//! log handed back after a run is exactly what the provider saw.

use crate::ai::types::{ChatMessage, Role, ToolCallRequest};

#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// `[system, ...history, user]`. Tool-role entries in `history` are
    /// skipped since their originating calls are not part of it.
    pub fn seed<I>(system_prompt: &str, history: I, user_message: &str) -> Self
    where
        I: IntoIterator<Item = ChatMessage>,
    {
        let mut conversation = Self::new();
        conversation.push(ChatMessage::system(system_prompt));
        for message in history {
            if message.role == Role::Tool {
                continue;
            }
            conversation.push(message);
        }
        conversation.push(ChatMessage::user(user_message));
        conversation
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn push_assistant_text(&mut self, text: &str) {
        self.push(ChatMessage::assistant(text));
    }

    /// Assistant turn that requested tools. Empty text is stored as null.
    pub fn push_tool_calls(&mut self, text: &str, calls: Vec<ToolCallRequest>) {
        self.push(ChatMessage::assistant_tool_calls(text, calls));
    }

    pub fn push_tool_result(&mut self, tool_call_id: &str, content: &str) {
        self.push(ChatMessage::tool_result(tool_call_id, content));
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
