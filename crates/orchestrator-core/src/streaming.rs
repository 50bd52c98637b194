// Streaming responder
//
// Demonstrates streamed answers: instead of a single FINISH, the router emits
// a sequence of INVOKE_TOOL payloads, each carrying one answer chunk through
// the reserved stream tool, with a fixed pause between payloads. Payloads
// are emitted strictly in generation order.

use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::config::RouterConfig;
use crate::context::OrchestrationContext;
use crate::error::Result;
use crate::event::{ActionEvent, OrchestrationEvent};
use crate::message::{ContentBlock, ToolUseBlock};
use crate::payload::ActionPayload;

/// Chunks streamed back when the trigger phrase is received
pub const DEFAULT_CHUNKS: &[&str] = &[
    "I",
    " am",
    " custom",
    " orchestration.",
    "\n",
    "You",
    " chose",
    " to",
    " test",
    " streaming",
    " from",
    " lambda",
    " function",
    "!",
];

/// Emits answer chunks as stream tool payloads
#[derive(Debug, Clone)]
pub struct StreamResponder {
    tool_name: String,
    trigger: String,
    chunks: Vec<String>,
    interval: Duration,
}

impl StreamResponder {
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            tool_name: config.stream_tool.clone(),
            trigger: config.stream_trigger.clone(),
            chunks: DEFAULT_CHUNKS.iter().map(|c| c.to_string()).collect(),
            interval: config.stream_interval(),
        }
    }

    /// Replace the streamed chunks
    pub fn with_chunks(mut self, chunks: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.chunks = chunks.into_iter().map(Into::into).collect();
        self
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the event asks for a streamed answer
    ///
    /// The input must decode to `{"text": <trigger>}`; anything else,
    /// including non-JSON input, is a regular event.
    pub fn is_triggered_by(&self, event: &OrchestrationEvent) -> bool {
        serde_json::from_str::<Value>(event.input_text())
            .ok()
            .and_then(|input| {
                input
                    .get("text")
                    .and_then(Value::as_str)
                    .map(|text| text == self.trigger)
            })
            .unwrap_or(false)
    }

    /// Build all chunk payloads, in order
    pub fn payloads(&self, context: &OrchestrationContext) -> Result<Vec<ActionPayload>> {
        self.chunks
            .iter()
            .map(|chunk| self.chunk_payload(chunk, context))
            .collect()
    }

    fn chunk_payload(&self, chunk: &str, context: &OrchestrationContext) -> Result<ActionPayload> {
        let block = ContentBlock::ToolUse(ToolUseBlock {
            tool_use_id: Uuid::now_v7().to_string(),
            name: self.tool_name.clone(),
            input: json!({ "text": chunk }),
        });

        Ok(ActionPayload::new(
            ActionEvent::InvokeTool,
            serde_json::to_string(&block)?,
            format!("streaming chunk via {}", self.tool_name),
            context.carry_forward(),
        ))
    }

    /// Stream the chunk payloads, pausing `interval` between consecutive items
    pub fn stream(
        &self,
        context: &OrchestrationContext,
    ) -> Result<impl Stream<Item = ActionPayload> + Send + 'static> {
        let interval = self.interval;
        let payloads = self.payloads(context)?;

        Ok(stream::iter(payloads.into_iter().enumerate()).then(
            move |(index, payload)| async move {
                if index > 0 {
                    tokio::time::sleep(interval).await;
                }
                tracing::trace!(index, "Emitting streamed payload");
                payload
            },
        ))
    }
}
