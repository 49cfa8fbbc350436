//! Request and response types for the API

use serde::{Deserialize, Serialize};
use serde_json::Value;

use agentchat_core::ai::types::{ChatMessage, Role};

use crate::error::AppError;

// ============================================================================
// Chat Types
// ============================================================================

/// Roles a client may replay in `conversationHistory`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryRole {
    User,
    Assistant,
    System,
}

impl From<HistoryRole> for Role {
    fn from(role: HistoryRole) -> Self {
        match role {
            HistoryRole::User => Role::User,
            HistoryRole::Assistant => Role::Assistant,
            HistoryRole::System => Role::System,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HistoryEntry {
    pub role: HistoryRole,
    pub content: String,
}

impl From<HistoryEntry> for ChatMessage {
    fn from(entry: HistoryEntry) -> Self {
        ChatMessage::text(entry.role.into(), entry.content)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub conversation_history: Vec<HistoryEntry>,
}

impl ChatRequest {
    /// Validate a raw request body.
    ///
    /// `message` must be a string; `conversationHistory` is optional and may
    /// be `null`.
    pub fn from_value(body: Value) -> Result<Self, AppError> {
        let message = match body.get("message") {
            Some(Value::String(message)) => message.clone(),
            _ => return Err(AppError::BadRequest("Invalid message".to_string())),
        };

        let conversation_history = match body.get("conversationHistory") {
            None | Some(Value::Null) => Vec::new(),
            Some(history) => serde_json::from_value(history.clone()).map_err(|e| {
                tracing::debug!("Rejected conversationHistory: {}", e);
                AppError::BadRequest("Invalid conversationHistory".to_string())
            })?,
        };

        Ok(Self {
            message,
            conversation_history,
        })
    }
}

// ============================================================================
// Tool Types
// ============================================================================

/// Tool info for API response
#[derive(Debug, Serialize)]
pub struct ToolResponse {
    pub name: String,
    pub description: String,
}

// ============================================================================
// Health
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_message_with_history() {
        let req = ChatRequest::from_value(json!({
            "message": "hello",
            "conversationHistory": [
                {"role": "user", "content": "hi"},
                {"role": "assistant", "content": "hey"}
            ]
        }))
        .expect("request should validate");
        assert_eq!(req.message, "hello");
        assert_eq!(req.conversation_history.len(), 2);
        assert_eq!(
            ChatMessage::from(req.conversation_history[1].clone()),
            ChatMessage::assistant("hey")
        );
    }

    #[test]
    fn history_defaults_to_empty() {
        let req = ChatRequest::from_value(json!({"message": ""})).unwrap();
        assert!(req.conversation_history.is_empty());

        let req =
            ChatRequest::from_value(json!({"message": "x", "conversationHistory": null})).unwrap();
        assert!(req.conversation_history.is_empty());
    }

    #[test]
    fn rejects_non_string_message() {
        for body in [json!({}), json!({"message": 42}), json!({"message": null}), json!([])] {
            match ChatRequest::from_value(body) {
                Err(AppError::BadRequest(msg)) => assert_eq!(msg, "Invalid message"),
                other => panic!("unexpected {:?}", other),
            }
        }
    }

    #[test]
    fn rejects_tool_role_in_history() {
        let result = ChatRequest::from_value(json!({
            "message": "hello",
            "conversationHistory": [{"role": "tool", "content": "x"}]
        }));
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }
}
