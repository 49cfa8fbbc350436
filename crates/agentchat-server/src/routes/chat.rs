//! Chat endpoint with SSE streaming and tool loop.

use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, State},
    response::sse::{Event, KeepAlive, Sse},
    routing::post,
    Json, Router,
};
use futures::stream::Stream;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use agentchat_core::agent::{
    AgenticOrchestrator, Conversation, LoopEvent, OrchestratorConfig, OrchestratorServices,
    RunOutcome,
};
use agentchat_core::ai::types::ChatMessage;
use agentchat_core::constants::ai::SYSTEM_PROMPT;

use crate::error::AppError;
use crate::types::ChatRequest;
use crate::AppState;

const SSE_CHANNEL_BUFFER: usize = 256;

pub fn router() -> Router<AppState> {
    Router::new().route("/", post(chat))
}

async fn chat(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let Json(body) = body.map_err(|e| {
        tracing::debug!("Rejected chat body: {}", e);
        AppError::BadRequest("Invalid message".to_string())
    })?;
    let req = ChatRequest::from_value(body)?;

    let provider = state
        .provider
        .clone()
        .ok_or_else(|| AppError::Internal(format!("Missing {}", state.credential_env)))?;

    let request_id = uuid::Uuid::new_v4();
    let span = tracing::info_span!("chat", request_id = %request_id);
    span.in_scope(|| {
        tracing::info!(
            history = req.conversation_history.len(),
            message_len = req.message.len(),
            "Chat request"
        );
    });

    let conversation = Conversation::seed(
        SYSTEM_PROMPT,
        req.conversation_history.into_iter().map(ChatMessage::from),
        &req.message,
    );

    let cancel = CancellationToken::new();
    let orchestrator = AgenticOrchestrator::new(
        OrchestratorServices {
            provider,
            tool_registry: state.tool_registry.clone(),
            tool_context: state.tool_context.clone(),
        },
        OrchestratorConfig {
            max_iterations: state.max_tool_iterations,
            cancellation: cancel.clone(),
            ..Default::default()
        },
    );

    let (sse_tx, sse_rx) = mpsc::channel::<Result<Event, Infallible>>(SSE_CHANNEL_BUFFER);

    tokio::spawn(
        async move {
            forward_events(orchestrator, conversation, sse_tx, cancel).await;
        }
        .instrument(span),
    );

    let stream = ReceiverStream::new(sse_rx);
    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}

/// Pump orchestrator events into the SSE channel until the run ends or the
/// client goes away. A vanished client cancels the run.
async fn forward_events(
    orchestrator: AgenticOrchestrator,
    conversation: Conversation,
    sse_tx: mpsc::Sender<Result<Event, Infallible>>,
    cancel: CancellationToken,
) {
    let (mut event_rx, handle) = orchestrator.run(conversation);

    loop {
        tokio::select! {
            event = event_rx.recv() => match event {
                Some(event) => {
                    if !send_event(&sse_tx, event.for_display()).await {
                        tracing::info!("Client disconnected; cancelling run");
                        cancel.cancel();
                        break;
                    }
                }
                None => break,
            },
            _ = sse_tx.closed() => {
                tracing::info!("Client disconnected; cancelling run");
                cancel.cancel();
                break;
            }
        }
    }

    finish_run(handle, &sse_tx).await;
}

/// Wait for the run task. A task that died without a terminal event still
/// gets one, so the client never sees a stream that just stops.
async fn finish_run(
    handle: JoinHandle<(RunOutcome, Conversation)>,
    sse_tx: &mpsc::Sender<Result<Event, Infallible>>,
) {
    match handle.await {
        Ok((outcome, conversation)) => {
            tracing::info!(?outcome, messages = conversation.len(), "Chat run finished");
        }
        Err(e) => {
            tracing::error!("Chat run task failed: {}", e);
            let event = LoopEvent::Error {
                message: "Internal error while processing the request".to_string(),
            };
            let _ = send_event(sse_tx, event).await;
        }
    }
}

async fn send_event(sse_tx: &mpsc::Sender<Result<Event, Infallible>>, event: LoopEvent) -> bool {
    let sse_event = Event::default().json_data(&event).unwrap_or_else(|e| {
        tracing::error!("Failed to serialize loop event: {}", e);
        Event::default().data(r#"{"type":"error","message":"serialization failed"}"#)
    });
    sse_tx.send(Ok(sse_event)).await.is_ok()
}
