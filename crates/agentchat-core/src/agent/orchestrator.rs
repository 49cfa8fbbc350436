//! Agentic orchestrator, the single canonical agentic loop.
//!
//! `AgenticOrchestrator` drives one conversation: ask the provider, stream the
//! answer, run the tools it asked for, feed the results back, repeat until the
//! model stops or the iteration cap is hit.
//!
//! The HTTP server is a thin presentation layer that:
//! - Builds an orchestrator from its shared state
//! - Calls `run()` to get an event stream and a join handle
//! - Maps `LoopEvent` to SSE frames
//! - Cancels the run's token when the client goes away
//!
//! ```text
//!  ┌──────────────┐        LoopEvent         ┌─────────────┐
//!  │ Orchestrator │ ─────────────────────►   │  Consumer   │
//!  │   (core)     │                          │  (server)   │
//!  │              │ ◄─────────────────────   │             │
//!  └──────────────┘    CancellationToken     └─────────────┘
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::ai::client::LlmProvider;
use crate::ai::decoder::DeltaDecoder;
use crate::ai::error::AiError;
use crate::ai::types::FinishReason;
use crate::constants::ai::{DEFAULT_MAX_ITERATIONS, STREAM_IDLE_TIMEOUT};
use crate::tools::registry::{ToolContext, ToolRegistry};

use super::conversation::Conversation;
use super::executor::{self, ExecutionStatus};
use super::loop_events::LoopEvent;
use super::stream::{self, StreamAbort, StreamResult};

/// Configuration for an orchestrator run.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Maximum provider round trips that may end in tool execution
    pub max_iterations: usize,
    pub stream_idle_timeout: Duration,
    pub cancellation: CancellationToken,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            stream_idle_timeout: STREAM_IDLE_TIMEOUT,
            cancellation: CancellationToken::new(),
        }
    }
}

/// Shared services the orchestrator needs.
#[derive(Clone)]
pub struct OrchestratorServices {
    pub provider: Arc<dyn LlmProvider>,
    pub tool_registry: Arc<ToolRegistry>,
    pub tool_context: ToolContext,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The model produced its final answer
    Completed,
    /// Stopped after `max_iterations` tool rounds
    IterationLimit,
    /// The token fired; no terminal event was emitted
    Cancelled,
    /// Provider or transport failure, with the message sent to the caller
    Failed(String),
}

/// What to do with a finished provider response
#[derive(Debug, PartialEq, Eq)]
enum NextStep {
    Finish,
    ExecuteTools,
}

fn next_step(result: &StreamResult) -> NextStep {
    match result.finish_reason {
        Some(FinishReason::Stop) => {
            if !result.tool_calls.is_empty() {
                tracing::warn!(
                    count = result.tool_calls.len(),
                    "Provider finished with stop; ignoring streamed tool calls"
                );
            }
            NextStep::Finish
        }
        _ if result.tool_calls.is_empty() => NextStep::Finish,
        _ => NextStep::ExecuteTools,
    }
}

fn iteration_limit_notice(max_iterations: usize) -> String {
    format!(
        "\n\n[Stopped after {} tool rounds: iteration limit reached]",
        max_iterations
    )
}

/// The agentic orchestrator. Runs the complete tool-use loop for one request.
pub struct AgenticOrchestrator {
    services: OrchestratorServices,
    config: OrchestratorConfig,
}

impl AgenticOrchestrator {
    pub fn new(services: OrchestratorServices, config: OrchestratorConfig) -> Self {
        Self { services, config }
    }

    /// Start the agentic loop.
    ///
    /// Returns `(event_receiver, handle)`. The loop runs as a spawned tokio
    /// task and emits `LoopEvent`s for every state change; the receiver
    /// closes when it finishes. The handle yields the outcome together with
    /// the final conversation log.
    pub fn run(
        self,
        conversation: Conversation,
    ) -> (
        mpsc::UnboundedReceiver<LoopEvent>,
        JoinHandle<(RunOutcome, Conversation)>,
    ) {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(
            async move { self.run_inner(conversation, event_tx).await }.in_current_span(),
        );
        (event_rx, handle)
    }

    async fn run_inner(
        self,
        mut conversation: Conversation,
        event_tx: mpsc::UnboundedSender<LoopEvent>,
    ) -> (RunOutcome, Conversation) {
        let OrchestratorServices {
            provider,
            tool_registry,
            tool_context,
        } = self.services;

        let OrchestratorConfig {
            max_iterations,
            stream_idle_timeout,
            cancellation,
        } = self.config;

        let tools = tool_registry.list_tools();

        for iteration in 1..=max_iterations {
            if cancellation.is_cancelled() {
                tracing::info!(iteration, "Run cancelled before provider call");
                return (RunOutcome::Cancelled, conversation);
            }

            tracing::debug!(
                iteration,
                messages = conversation.len(),
                tools = tools.len(),
                "Requesting completion"
            );

            let requested = tokio::select! {
                biased;
                _ = cancellation.cancelled() => {
                    tracing::info!(iteration, "Run cancelled while connecting");
                    return (RunOutcome::Cancelled, conversation);
                }
                requested = provider.stream_completion(conversation.messages(), tools) => requested,
            };

            let raw = match requested {
                Ok(raw) => raw,
                Err(e) => return (fail(&event_tx, iteration, e), conversation),
            };

            let result = match stream::process_stream(
                DeltaDecoder::new(raw),
                &event_tx,
                &cancellation,
                stream_idle_timeout,
            )
            .await
            {
                Ok(result) => result,
                Err(StreamAbort::Cancelled) => {
                    tracing::info!(iteration, "Run cancelled while streaming");
                    return (RunOutcome::Cancelled, conversation);
                }
                Err(StreamAbort::Failed(e)) => return (fail(&event_tx, iteration, e), conversation),
            };

            tracing::debug!(
                iteration,
                finish_reason = ?result.finish_reason,
                text_len = result.text.len(),
                tool_calls = result.tool_calls.len(),
                "Stream finished"
            );

            if next_step(&result) == NextStep::Finish {
                if !result.text.is_empty() {
                    conversation.push_assistant_text(&result.text);
                }
                let _ = event_tx.send(LoopEvent::Done);
                tracing::info!(iteration, "Run completed");
                return (RunOutcome::Completed, conversation);
            }

            conversation.push_tool_calls(&result.text, result.tool_calls.clone());
            let status = executor::execute_tools(
                &result.tool_calls,
                &tool_registry,
                &tool_context,
                &mut conversation,
                &event_tx,
                &cancellation,
            )
            .await;

            if status == ExecutionStatus::Cancelled {
                tracing::info!(iteration, "Run cancelled during tool execution");
                return (RunOutcome::Cancelled, conversation);
            }
        }

        if cancellation.is_cancelled() {
            return (RunOutcome::Cancelled, conversation);
        }

        tracing::warn!(max_iterations, "Tool iteration limit reached");
        let _ = event_tx.send(LoopEvent::Content {
            content: iteration_limit_notice(max_iterations),
        });
        let _ = event_tx.send(LoopEvent::Done);
        (RunOutcome::IterationLimit, conversation)
    }
}

fn fail(event_tx: &mpsc::UnboundedSender<LoopEvent>, iteration: usize, error: AiError) -> RunOutcome {
    let message = error.to_string();
    tracing::error!(iteration, "AI error: {}", message);
    let _ = event_tx.send(LoopEvent::Error {
        message: message.clone(),
    });
    RunOutcome::Failed(message)
}
