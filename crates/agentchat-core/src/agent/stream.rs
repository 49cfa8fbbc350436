//! Stream processing for the agentic loop.
//!
//! Consumes `StreamDelta`s from a [`DeltaDecoder`] and:
//! - Emits thinking and content fragments as they arrive
//! - Accumulates assistant text and tool-call fragments
//! - Handles stream timeout (no chunk for the idle window) and cancellation

use std::time::Duration;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::ai::decoder::{DeltaDecoder, StreamDelta, ToolCallSet};
use crate::ai::error::AiError;
use crate::ai::types::{FinishReason, ToolCallRequest};

use super::loop_events::LoopEvent;

/// Result of processing one provider response.
#[derive(Debug)]
pub(crate) struct StreamResult {
    pub text: String,
    pub tool_calls: Vec<ToolCallRequest>,
    /// `None` when the stream ended without announcing a reason
    pub finish_reason: Option<FinishReason>,
}

/// Why a stream did not produce a result.
#[derive(Debug)]
pub(crate) enum StreamAbort {
    Cancelled,
    Failed(AiError),
}

/// Drain one provider response, emitting LoopEvents as deltas arrive.
///
/// Stops at the first finish reason; anything the provider sends after it
/// (usage frames and the like) is ignored.
pub(crate) async fn process_stream(
    mut decoder: DeltaDecoder,
    event_tx: &mpsc::UnboundedSender<LoopEvent>,
    cancel: &CancellationToken,
    idle_timeout: Duration,
) -> Result<StreamResult, StreamAbort> {
    let mut text_buffer = String::new();
    let mut tool_calls = ToolCallSet::new();
    let mut finish_reason = None;

    loop {
        let next = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(StreamAbort::Cancelled),
            next = tokio::time::timeout(idle_timeout, decoder.next()) => next,
        };

        let delta = match next {
            Ok(Some(Ok(delta))) => delta,
            Ok(Some(Err(e))) => return Err(StreamAbort::Failed(e)),
            Ok(None) => break,
            Err(_) => {
                tracing::warn!(
                    timeout_secs = idle_timeout.as_secs(),
                    "AI stream timed out"
                );
                return Err(StreamAbort::Failed(AiError::Timeout(idle_timeout.as_secs())));
            }
        };

        match delta {
            StreamDelta::Reasoning(thinking) => {
                let _ = event_tx.send(LoopEvent::Thinking { content: thinking });
            }
            StreamDelta::Content(delta) => {
                text_buffer.push_str(&delta);
                let _ = event_tx.send(LoopEvent::Content { content: delta });
            }
            StreamDelta::ToolCall(fragment) => tool_calls.apply(fragment),
            StreamDelta::Finish(reason) => {
                finish_reason = Some(reason);
                break;
            }
        }
    }

    Ok(StreamResult {
        text: text_buffer,
        tool_calls: tool_calls.into_requests(),
        finish_reason,
    })
}
