//! Streaming API calls

use std::time::Instant;

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{debug, error, info, warn};

use super::core::AiClient;
use super::{LlmProvider, RawChunkStream};
use crate::ai::decoder::RawChunk;
use crate::ai::error::AiError;
use crate::ai::format::OpenAIFormat;
use crate::ai::parsers::OpenAIParser;
use crate::ai::sse::{SseFrame, SseLineBuffer};
use crate::ai::types::{AiTool, ChatMessage};

/// Spawn a task reading the response body and forwarding parsed chunks.
///
/// The task ends on `[DONE]`, on the first error (which is forwarded), or as
/// soon as the receiver is dropped, even while the body is stalled.
fn spawn_sse_stream_task<S>(stream: S, tx: mpsc::UnboundedSender<Result<RawChunk, AiError>>)
where
    S: futures::Stream<Item = reqwest::Result<bytes::Bytes>> + Send + 'static,
{
    tokio::spawn(async move {
        tokio::pin!(stream);
        let parser = OpenAIParser::new();
        let mut lines = SseLineBuffer::new();
        let mut chunk_count: u64 = 0;

        loop {
            let next = tokio::select! {
                next = stream.next() => next,
                _ = tx.closed() => {
                    debug!("Stream receiver dropped after {} chunks", chunk_count);
                    return;
                }
            };
            let Some(bytes) = next else { break };
            chunk_count += 1;
            let bytes = match bytes {
                Ok(bytes) => bytes,
                Err(e) => {
                    error!("Stream read error at chunk #{}: {}", chunk_count, e);
                    let _ = tx.send(Err(AiError::Network(e.to_string())));
                    return;
                }
            };

            for frame in lines.push(&bytes) {
                if !forward_frame(frame, &parser, &tx) {
                    return;
                }
            }
        }

        if let Some(frame) = lines.finish() {
            if !forward_frame(frame, &parser, &tx) {
                return;
            }
        }
        debug!("Stream ended without [DONE] after {} chunks", chunk_count);
    });
}

/// Returns false when the task should stop
fn forward_frame(
    frame: SseFrame,
    parser: &OpenAIParser,
    tx: &mpsc::UnboundedSender<Result<RawChunk, AiError>>,
) -> bool {
    match frame {
        SseFrame::Done => {
            debug!("Stream finished with [DONE]");
            false
        }
        SseFrame::Data(data) => match parser.parse_payload(&data) {
            Ok(chunk) => tx.send(Ok(chunk)).is_ok(),
            Err(e) => {
                warn!("Stream parse error: {}", e);
                let _ = tx.send(Err(e));
                false
            }
        },
    }
}

async fn ensure_success_stream_response(
    response: reqwest::Response,
    call_start: Instant,
) -> Result<reqwest::Response, AiError> {
    let status = response.status();
    info!("Provider response: {} in {:?}", status, call_start.elapsed());

    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    error!("Provider request failed: {} - {}", status, body);
    Err(AiError::Http {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl LlmProvider for AiClient {
    async fn stream_completion(
        &self,
        messages: &[ChatMessage],
        tools: &[AiTool],
    ) -> Result<RawChunkStream, AiError> {
        let call_start = Instant::now();
        let config = self.config();
        info!(
            provider = %config.provider_id,
            model = %config.model,
            messages = messages.len(),
            tools = tools.len(),
            "Provider call start"
        );

        let body = OpenAIFormat::new().build_request_body(
            &config.model,
            messages,
            tools,
            config.reasoning_effort,
        );

        let response = self
            .build_request(&config.api_url())
            .json(&body)
            .send()
            .await?;
        let response = ensure_success_stream_response(response, call_start).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        spawn_sse_stream_task(response.bytes_stream(), tx);
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }
}
