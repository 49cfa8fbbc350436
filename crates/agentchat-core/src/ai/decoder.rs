//! Provider chunk decoding
//!
//! [`DeltaDecoder`] flattens raw provider chunks into [`StreamDelta`] values and
//! [`ToolCallSet`] merges the tool-call fragments back into whole requests.

use std::collections::{BTreeMap, VecDeque};

use futures::StreamExt;

use crate::ai::client::RawChunkStream;
use crate::ai::error::AiError;
use crate::ai::types::{FinishReason, ToolCallRequest};

/// Partial tool call carried by one chunk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolCallFragment {
    /// Provider index. Some endpoints omit it and send each call whole.
    pub index: Option<usize>,
    /// Only present on the fragment that starts a call
    pub id: Option<String>,
    pub name: Option<String>,
    /// Substring to append to the call's arguments
    pub arguments: Option<String>,
}

impl ToolCallFragment {
    fn is_empty(&self) -> bool {
        self.id.is_none()
            && self.name.is_none()
            && matches!(self.arguments.as_deref(), None | Some(""))
    }
}

/// One chunk as delivered by the provider, before decoding
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawChunk {
    pub reasoning: Option<String>,
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCallFragment>,
    pub finish_reason: Option<FinishReason>,
}

impl RawChunk {
    /// Split into deltas, dropping empty fragments
    pub fn into_deltas(self) -> Vec<StreamDelta> {
        let mut deltas = Vec::new();
        if let Some(text) = self.reasoning.filter(|t| !t.is_empty()) {
            deltas.push(StreamDelta::Reasoning(text));
        }
        if let Some(text) = self.content.filter(|t| !t.is_empty()) {
            deltas.push(StreamDelta::Content(text));
        }
        deltas.extend(
            self.tool_calls
                .into_iter()
                .filter(|f| !f.is_empty())
                .map(StreamDelta::ToolCall),
        );
        if let Some(reason) = self.finish_reason {
            deltas.push(StreamDelta::Finish(reason));
        }
        deltas
    }
}

/// A single decoded unit of the provider stream
#[derive(Debug, Clone, PartialEq)]
pub enum StreamDelta {
    Reasoning(String),
    Content(String),
    ToolCall(ToolCallFragment),
    Finish(FinishReason),
}

/// Lazily decodes a raw chunk stream. Not replayable: build a new decoder for
/// every provider response.
pub struct DeltaDecoder {
    raw: RawChunkStream,
    pending: VecDeque<StreamDelta>,
    exhausted: bool,
}

impl DeltaDecoder {
    pub fn new(raw: RawChunkStream) -> Self {
        Self {
            raw,
            pending: VecDeque::new(),
            exhausted: false,
        }
    }

    /// Next delta, `None` at end of stream.
    ///
    /// Cancel safe: dropping the future only abandons the await on the raw
    /// stream, no decoded delta is lost.
    pub async fn next(&mut self) -> Option<Result<StreamDelta, AiError>> {
        loop {
            if let Some(delta) = self.pending.pop_front() {
                return Some(Ok(delta));
            }
            if self.exhausted {
                return None;
            }
            match self.raw.next().await {
                Some(Ok(chunk)) => self.pending.extend(chunk.into_deltas()),
                Some(Err(e)) => {
                    self.exhausted = true;
                    return Some(Err(e));
                }
                None => {
                    self.exhausted = true;
                    return None;
                }
            }
        }
    }
}

#[derive(Debug, Default)]
struct ToolCallAccumulator {
    id: String,
    name: String,
    arguments: String,
}

/// Tool-call accumulators keyed by provider index
#[derive(Debug, Default)]
pub struct ToolCallSet {
    calls: BTreeMap<usize, ToolCallAccumulator>,
}

impl ToolCallSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a fragment. The first id/name seen for an index wins; arguments
    /// are appended in arrival order.
    pub fn apply(&mut self, fragment: ToolCallFragment) {
        let index = fragment
            .index
            .unwrap_or_else(|| self.unindexed_slot(fragment.id.as_deref()));
        let acc = self.calls.entry(index).or_default();
        if acc.id.is_empty() {
            if let Some(id) = fragment.id.filter(|s| !s.is_empty()) {
                acc.id = id;
            }
        }
        if acc.name.is_empty() {
            if let Some(name) = fragment.name.filter(|s| !s.is_empty()) {
                acc.name = name;
            }
        }
        if let Some(args) = fragment.arguments {
            acc.arguments.push_str(&args);
        }
    }

    /// Slot for a fragment without an index: a new id opens the slot after the
    /// last call, anything else continues the last call.
    fn unindexed_slot(&self, id: Option<&str>) -> usize {
        let Some((&last, acc)) = self.calls.last_key_value() else {
            return 0;
        };
        match id {
            Some(id) if !id.is_empty() && !acc.id.is_empty() && acc.id != id => last + 1,
            _ => last,
        }
    }

    /// Resolved requests in ascending index order
    pub fn into_requests(self) -> Vec<ToolCallRequest> {
        self.calls
            .into_iter()
            .map(|(index, acc)| ToolCallRequest {
                id: if acc.id.is_empty() {
                    format!("call_{}", index)
                } else {
                    acc.id
                },
                name: acc.name,
                arguments: acc.arguments,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    fn fragment(index: usize, id: Option<&str>, name: Option<&str>, args: &str) -> ToolCallFragment {
        ToolCallFragment {
            index: Some(index),
            id: id.map(String::from),
            name: name.map(String::from),
            arguments: Some(args.to_string()),
        }
    }

    fn raw_stream(chunks: Vec<RawChunk>) -> RawChunkStream {
        Box::pin(stream::iter(chunks.into_iter().map(Ok)))
    }

    #[test]
    fn merges_fragments_by_index() {
        let mut set = ToolCallSet::new();
        set.apply(fragment(0, Some("call_a"), Some("fetch_url"), "{\"url\":"));
        set.apply(fragment(1, Some("call_b"), Some("read_file"), ""));
        set.apply(fragment(0, None, None, "\"https://x\"}"));
        set.apply(fragment(1, None, None, "{\"path\":\"a\"}"));
        // a repeated id/name on a later fragment does not replace the first
        set.apply(fragment(0, Some("other"), Some("other"), ""));

        let calls = set.into_requests();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "call_a");
        assert_eq!(calls[0].name, "fetch_url");
        assert_eq!(calls[0].arguments, "{\"url\":\"https://x\"}");
        assert_eq!(calls[1].id, "call_b");
        assert_eq!(calls[1].arguments, "{\"path\":\"a\"}");
    }

    #[test]
    fn orders_by_index_not_arrival() {
        let mut set = ToolCallSet::new();
        set.apply(fragment(2, Some("c2"), Some("b"), "{}"));
        set.apply(fragment(0, Some("c0"), Some("a"), "{}"));

        let ids: Vec<_> = set.into_requests().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["c0", "c2"]);
    }

    #[test]
    fn missing_id_gets_synthetic_one() {
        let mut set = ToolCallSet::new();
        set.apply(fragment(3, None, Some("echo"), "{}"));
        assert_eq!(set.into_requests()[0].id, "call_3");
    }

    #[test]
    fn unindexed_calls_split_on_a_new_id() {
        let whole = |id: Option<&str>, name: Option<&str>, args: &str| ToolCallFragment {
            index: None,
            id: id.map(String::from),
            name: name.map(String::from),
            arguments: Some(args.to_string()),
        };

        let mut set = ToolCallSet::new();
        set.apply(whole(Some("call_a"), Some("fetch_url"), "{\"url\":"));
        set.apply(whole(None, None, "\"https://x\"}"));
        set.apply(whole(Some("call_a"), None, ""));
        set.apply(whole(Some("call_b"), Some("read_file"), "{\"path\":\"a\"}"));

        let calls = set.into_requests();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].id, "call_a");
        assert_eq!(calls[0].arguments, "{\"url\":\"https://x\"}");
        assert_eq!(calls[1].id, "call_b");
        assert_eq!(calls[1].name, "read_file");
        assert_eq!(calls[1].arguments, "{\"path\":\"a\"}");
    }

    #[tokio::test]
    async fn skips_empty_chunks() {
        let mut decoder = DeltaDecoder::new(raw_stream(vec![
            RawChunk {
                content: Some(String::new()),
                ..Default::default()
            },
            RawChunk::default(),
            RawChunk {
                reasoning: Some("hmm".into()),
                content: Some("Hi".into()),
                ..Default::default()
            },
            RawChunk {
                tool_calls: vec![ToolCallFragment {
                    index: Some(0),
                    ..Default::default()
                }],
                finish_reason: Some(FinishReason::Stop),
                ..Default::default()
            },
        ]));

        let mut deltas = Vec::new();
        while let Some(delta) = decoder.next().await {
            deltas.push(delta.unwrap());
        }
        assert_eq!(
            deltas,
            vec![
                StreamDelta::Reasoning("hmm".into()),
                StreamDelta::Content("Hi".into()),
                StreamDelta::Finish(FinishReason::Stop),
            ]
        );
    }

    #[tokio::test]
    async fn stops_after_error() {
        let raw: RawChunkStream = Box::pin(stream::iter(vec![
            Err(AiError::Decode("bad".into())),
            Ok(RawChunk {
                content: Some("late".into()),
                ..Default::default()
            }),
        ]));
        let mut decoder = DeltaDecoder::new(raw);
        assert!(matches!(decoder.next().await, Some(Err(AiError::Decode(_)))));
        assert!(decoder.next().await.is_none());
    }
}
