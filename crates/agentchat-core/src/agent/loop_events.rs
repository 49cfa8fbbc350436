//! Canonical event protocol for the agentic loop.
//!
//! `LoopEvent` is the single source of truth for everything the orchestrator
//! emits. Transport layers (the HTTP/SSE server, tests) consume these events
//! and map them to their own presentation format. The serde form is the wire
//! form: `{"type": "content", "content": "..."}` and so on.

use serde::Serialize;
use serde_json::Value;

use crate::tools::truncation::truncate_for_display;

/// Events emitted by the agentic orchestrator.
///
/// A run ends with exactly one `Done` or `Error`, unless it was cancelled, in
/// which case it simply stops emitting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LoopEvent {
    // ── Streaming ──────────────────────────────────────────────────────
    /// Reasoning text fragment, streamed live.
    Thinking { content: String },

    /// Assistant text fragment.
    Content { content: String },

    // ── Tool lifecycle ─────────────────────────────────────────────────
    /// About to invoke a tool. `args` is the raw argument string when it
    /// did not parse as JSON.
    ToolCall { tool: String, args: Value },

    /// Tool finished.
    ToolResult {
        tool: String,
        result: String,
        #[serde(skip_serializing_if = "std::ops::Not::not")]
        is_error: bool,
    },

    // ── Terminal ───────────────────────────────────────────────────────
    Done,

    /// Transport or provider failure.
    Error { message: String },
}

impl LoopEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopEvent::Done | LoopEvent::Error { .. })
    }

    /// Shorten tool results for a remote display. Other events pass through.
    pub fn for_display(self) -> Self {
        match self {
            LoopEvent::ToolResult {
                tool,
                result,
                is_error,
            } => LoopEvent::ToolResult {
                tool,
                result: truncate_for_display(&result),
                is_error,
            },
            other => other,
        }
    }
}
