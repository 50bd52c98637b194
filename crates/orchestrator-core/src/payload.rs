// Action payload returned to the runtime

use serde::{Deserialize, Serialize};

use crate::context::PayloadContext;
use crate::event::ActionEvent;

/// Payload format version understood by the runtime
pub const PAYLOAD_VERSION: &str = "1.0";

/// Router answer for one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionPayload {
    pub version: String,
    pub action_event: ActionEvent,
    pub output: ActionOutput,
    pub context: PayloadContext,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionOutput {
    /// Serialized payload for the next step
    pub text: String,
    pub trace: Trace,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    pub event: TraceEvent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub text: String,
}

impl ActionPayload {
    pub fn new(
        action_event: ActionEvent,
        text: impl Into<String>,
        trace: impl Into<String>,
        context: PayloadContext,
    ) -> Self {
        Self {
            version: PAYLOAD_VERSION.to_string(),
            action_event,
            output: ActionOutput {
                text: text.into(),
                trace: Trace {
                    event: TraceEvent { text: trace.into() },
                },
            },
            context,
        }
    }

    /// Serialized payload text
    pub fn text(&self) -> &str {
        &self.output.text
    }

    /// Debug trace text
    pub fn trace(&self) -> &str {
        &self.output.trace.event.text
    }
}
