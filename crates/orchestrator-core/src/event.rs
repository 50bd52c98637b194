// Orchestration events and actions
//
// An OrchestrationEvent is built fresh for every invocation from the raw
// JSON the runtime sends. Structure is checked before any transition logic
// runs, so strategies only ever see well-formed events.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::context::{null_as_default, OrchestrationContext};
use crate::error::{OrchestrationError, Result};
use crate::message::ContentBlock;

/// State the runtime reports on each invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrchestrationState {
    /// Start of a conversation turn
    Start,
    /// Model returned, next action to decide
    ModelInvoked,
    /// Tool returned, next action to decide
    ToolInvoked,
}

impl OrchestrationState {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrchestrationState::Start => "START",
            OrchestrationState::ModelInvoked => "MODEL_INVOKED",
            OrchestrationState::ToolInvoked => "TOOL_INVOKED",
        }
    }
}

impl std::fmt::Display for OrchestrationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrchestrationState {
    type Err = OrchestrationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "START" => Ok(OrchestrationState::Start),
            "MODEL_INVOKED" => Ok(OrchestrationState::ModelInvoked),
            "TOOL_INVOKED" => Ok(OrchestrationState::ToolInvoked),
            other => Err(OrchestrationError::InvalidState(other.to_string())),
        }
    }
}

/// Action the router asks the runtime to take next
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ActionEvent {
    InvokeModel,
    InvokeTool,
    Finish,
}

impl ActionEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionEvent::InvokeModel => "INVOKE_MODEL",
            ActionEvent::InvokeTool => "INVOKE_TOOL",
            ActionEvent::Finish => "FINISH",
        }
    }
}

impl std::fmt::Display for ActionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionEvent {
    type Err = OrchestrationError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "INVOKE_MODEL" => Ok(ActionEvent::InvokeModel),
            "INVOKE_TOOL" => Ok(ActionEvent::InvokeTool),
            "FINISH" => Ok(ActionEvent::Finish),
            other => Err(OrchestrationError::invalid_event(format!("unknown action: {}", other))),
        }
    }
}

/// Input of an event; `text` is JSON-encoded for most states
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventInput {
    #[serde(default)]
    pub text: Option<String>,
}

/// A validated orchestration event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestrationEvent {
    pub state: OrchestrationState,
    #[serde(default, deserialize_with = "null_as_default")]
    pub input: EventInput,
    pub context: OrchestrationContext,
}

impl OrchestrationEvent {
    /// Create an event directly (tests, CLI)
    pub fn new(state: OrchestrationState, text: impl Into<String>) -> Self {
        Self {
            state,
            input: EventInput {
                text: Some(text.into()),
            },
            context: OrchestrationContext::default(),
        }
    }

    /// Attach a context
    pub fn with_context(mut self, context: OrchestrationContext) -> Self {
        self.context = context;
        self
    }

    /// Validate and decode a raw event
    ///
    /// Missing `state` or `context` fails before the state value is
    /// inspected; an unknown state fails with `InvalidState`.
    pub fn from_value(value: &Value) -> Result<Self> {
        let object = value
            .as_object()
            .ok_or_else(|| OrchestrationError::invalid_event("event is not an object"))?;

        let state = object
            .get("state")
            .filter(|state| !state.is_null())
            .ok_or_else(|| OrchestrationError::invalid_event("missing state"))?;
        let context = object
            .get("context")
            .filter(|context| !context.is_null())
            .ok_or_else(|| OrchestrationError::invalid_event("missing context"))?;

        let state = match state {
            Value::String(state) => state.parse()?,
            other => return Err(OrchestrationError::InvalidState(other.to_string())),
        };

        let context: OrchestrationContext = serde_json::from_value(context.clone())
            .map_err(|e| OrchestrationError::invalid_event(format!("context: {}", e)))?;

        let input = match object.get("input") {
            None | Some(Value::Null) => EventInput::default(),
            Some(input) => serde_json::from_value(input.clone())
                .map_err(|e| OrchestrationError::invalid_event(format!("input: {}", e)))?,
        };

        Ok(Self {
            state,
            input,
            context,
        })
    }

    /// Raw input text, empty when absent
    pub fn input_text(&self) -> &str {
        self.input.text.as_deref().unwrap_or_default()
    }

    /// Decode the input text as JSON
    pub fn input_json<T: serde::de::DeserializeOwned>(&self, what: &'static str) -> Result<T> {
        serde_json::from_str(self.input_text()).map_err(|e| OrchestrationError::malformed(what, e))
    }
}

/// Decode a JSON-encoded content block
///
/// A bare JSON string becomes a text block.
pub fn decode_block(text: &str, what: &'static str) -> Result<ContentBlock> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| OrchestrationError::malformed(what, e))?;
    block_from_value(value).map_err(|e| OrchestrationError::malformed(what, e))
}

/// Decode a content block, falling back to plain text when `text` isn't JSON
pub fn block_or_text(text: &str) -> ContentBlock {
    serde_json::from_str::<Value>(text)
        .ok()
        .and_then(|value| block_from_value(value).ok())
        .unwrap_or_else(|| ContentBlock::text(text))
}

fn block_from_value(value: Value) -> std::result::Result<ContentBlock, serde_json::Error> {
    match value {
        Value::String(text) => Ok(ContentBlock::Text(text)),
        Value::Object(_) => serde_json::from_value(value),
        other => Ok(ContentBlock::Text(other.to_string())),
    }
}
