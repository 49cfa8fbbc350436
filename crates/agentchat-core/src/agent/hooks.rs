//! Hooks run after every tool invocation
//!
//! `LoggingHook` is installed on every registry; implement [`PostToolHook`]
//! for anything else that wants to observe tool traffic.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

use crate::tools::registry::ToolResult;

/// Hook called after tool execution
#[async_trait]
pub trait PostToolHook: Send + Sync {
    /// Observe a finished invocation. Cannot alter the result.
    async fn after_execute(
        &self,
        name: &str,
        params: &Value,
        result: &ToolResult,
        duration: Duration,
    );
}

/// Logs all tool executions with timing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHook;

#[async_trait]
impl PostToolHook for LoggingHook {
    async fn after_execute(
        &self,
        name: &str,
        _params: &Value,
        result: &ToolResult,
        duration: Duration,
    ) {
        tracing::info!(
            tool = name,
            duration_ms = duration.as_millis() as u64,
            is_error = result.is_error,
            output_len = result.output.len(),
            "Tool execution completed"
        );
    }
}
