//! Tool execution for the agentic loop.
//!
//! Calls run one at a time in the order the provider indexed them, so the
//! conversation log is reproducible. Argument parse failures and tool errors
//! become tool results; nothing here aborts the loop.

use serde_json::Value;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::ai::types::ToolCallRequest;
use crate::tools::registry::{ToolContext, ToolRegistry, ToolResult};

use super::conversation::Conversation;
use super::loop_events::LoopEvent;

/// Whether every call in the round ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ExecutionStatus {
    Completed,
    /// Cancellation was observed before a call started
    Cancelled,
}

/// Execute a batch of tool calls, appending one tool message per call.
///
/// The full result goes into the conversation; the event carries the same
/// text and leaves display truncation to the transport.
pub(crate) async fn execute_tools(
    tool_calls: &[ToolCallRequest],
    tool_registry: &ToolRegistry,
    ctx: &ToolContext,
    conversation: &mut Conversation,
    event_tx: &mpsc::UnboundedSender<LoopEvent>,
    cancel: &CancellationToken,
) -> ExecutionStatus {
    for call in tool_calls {
        if cancel.is_cancelled() {
            tracing::info!(tool = %call.name, "Skipping tool call after cancellation");
            return ExecutionStatus::Cancelled;
        }

        let result = match parse_arguments(&call.arguments) {
            Ok(args) => {
                let _ = event_tx.send(LoopEvent::ToolCall {
                    tool: call.name.clone(),
                    args: args.clone(),
                });
                tracing::debug!(tool = %call.name, id = %call.id, "Executing tool");
                tool_registry.invoke(&call.name, args, ctx).await
            }
            Err(e) => {
                tracing::warn!(
                    tool = %call.name,
                    id = %call.id,
                    "Tool arguments are not valid JSON: {}", e
                );
                let _ = event_tx.send(LoopEvent::ToolCall {
                    tool: call.name.clone(),
                    args: Value::String(call.arguments.clone()),
                });
                ToolResult::error(format!(
                    "Error: invalid JSON arguments for tool '{}': {}",
                    call.name, e
                ))
            }
        };

        let _ = event_tx.send(LoopEvent::ToolResult {
            tool: call.name.clone(),
            result: result.output.clone(),
            is_error: result.is_error,
        });
        conversation.push_tool_result(&call.id, &result.output);
    }

    ExecutionStatus::Completed
}

/// Parse accumulated arguments. Blank means "no arguments".
fn parse_arguments(raw: &str) -> Result<Value, serde_json::Error> {
    if raw.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    serde_json::from_str(raw)
}
