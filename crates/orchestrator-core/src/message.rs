// Model wire types
//
// The agent runtime speaks the Converse message format: messages are
// `{role, content[]}` and each content block is a single-key object
// (`{"text": ...}`, `{"toolUse": {...}}`, `{"toolResult": {...}}`).
// These types decode that format once so the rest of the router works
// on typed values.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Conversation role accepted by the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversationRole {
    User,
    Assistant,
}

impl std::fmt::Display for ConversationRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConversationRole::User => write!(f, "user"),
            ConversationRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single content block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentBlock {
    /// Plain text
    Text(String),

    /// Model request to invoke a tool
    ToolUse(ToolUseBlock),

    /// Result of a tool invocation
    ToolResult(ToolResultBlock),

    /// Any other block (images, reasoning, ...) kept verbatim
    #[serde(untagged)]
    Other(Value),
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        ContentBlock::Text(text.into())
    }

    /// Get text if this is a text block
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentBlock::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Get the tool use if this is a tool use block
    pub fn as_tool_use(&self) -> Option<&ToolUseBlock> {
        match self {
            ContentBlock::ToolUse(tool_use) => Some(tool_use),
            _ => None,
        }
    }
}

/// Tool invocation requested by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolUseBlock {
    pub tool_use_id: String,
    pub name: String,
    #[serde(default)]
    pub input: Value,
}

impl ToolUseBlock {
    /// The `text` argument of the tool input, if any
    pub fn input_text(&self) -> Option<&str> {
        self.input.get("text").and_then(Value::as_str)
    }
}

/// Result of a tool invocation, reported back by the runtime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolResultBlock {
    pub tool_use_id: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl ToolResultBlock {
    /// Text of the first text block in the result
    pub fn first_text(&self) -> Option<&str> {
        self.content.iter().find_map(ContentBlock::as_text)
    }
}

/// A message in the model conversation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: ConversationRole,
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a message holding a single block
    pub fn new(role: ConversationRole, block: ContentBlock) -> Self {
        Self {
            role,
            content: vec![block],
        }
    }

    pub fn user(block: ContentBlock) -> Self {
        Self::new(ConversationRole::User, block)
    }

    pub fn assistant(block: ContentBlock) -> Self {
        Self::new(ConversationRole::Assistant, block)
    }
}

/// Why the model stopped generating
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    ToolUse,
    EndTurn,
    MaxTokens,
    StopSequence,
    GuardrailIntervened,
    ContentFiltered,
    #[serde(untagged)]
    Other(String),
}

impl std::fmt::Display for StopReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopReason::ToolUse => write!(f, "tool_use"),
            StopReason::EndTurn => write!(f, "end_turn"),
            StopReason::MaxTokens => write!(f, "max_tokens"),
            StopReason::StopSequence => write!(f, "stop_sequence"),
            StopReason::GuardrailIntervened => write!(f, "guardrail_intervened"),
            StopReason::ContentFiltered => write!(f, "content_filtered"),
            StopReason::Other(reason) => write!(f, "{}", reason),
        }
    }
}

/// Output message of a model invocation
///
/// The runtime omits `role` in some recordings; it is always the assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutput {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<ConversationRole>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl ModelOutput {
    /// Convert into a history message
    pub fn into_message(self) -> Message {
        Message {
            role: self.role.unwrap_or(ConversationRole::Assistant),
            content: self.content,
        }
    }
}

/// Result of a model invocation, as echoed back in a MODEL_INVOKED event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInvocation {
    pub stop_reason: StopReason,
    #[serde(default = "empty_output")]
    pub output: ModelOutput,
}

fn empty_output() -> ModelOutput {
    ModelOutput {
        role: None,
        content: Vec::new(),
    }
}

impl ModelInvocation {
    /// First tool use block of the output
    pub fn tool_use(&self) -> Option<&ToolUseBlock> {
        self.output.content.iter().find_map(ContentBlock::as_tool_use)
    }

    /// First text block of the output
    pub fn text(&self) -> Option<&str> {
        self.output.content.iter().find_map(ContentBlock::as_text)
    }
}

/// System prompt block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemContent {
    pub text: String,
}

/// Sampling parameters for the model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InferenceConfig {
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

/// Tools offered to the model, passed through from the agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolConfig {
    pub tools: Vec<Value>,
}

/// Model invocation request handed to the runtime with INVOKE_MODEL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConverseRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub system: Vec<SystemContent>,
    pub messages: Vec<Message>,
    pub inference_config: InferenceConfig,
    pub tool_config: ToolConfig,
}
