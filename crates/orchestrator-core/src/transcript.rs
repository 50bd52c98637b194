// Conversation transcript
//
// Transcript is the append-only log of typed messages that becomes the
// `messages` array of a model request. Each recorded session step is decoded
// once into a RecordedStep, then replayed into the transcript according to a
// ReplayMode. Consecutive messages with the same role collapse into one on
// push (last write wins on content) so the model always sees strict
// user/assistant alternation.

use crate::context::{IntermediaryStep, OrchestrationContext};
use crate::error::{OrchestrationError, Result};
use crate::event::{block_or_text, decode_block, ActionEvent, OrchestrationState};
use crate::message::{ContentBlock, ConversationRole, Message, ModelInvocation};

/// Which recorded steps end up in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayMode {
    /// User inputs, model outputs, tool results and finished answers
    Full,
    /// User inputs only (plan creation)
    Planning,
    /// User inputs, model outputs, tool results and issued tool calls
    Summary,
}

/// A session step decoded into typed values
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedStep {
    pub state: Option<OrchestrationState>,
    pub input: Option<String>,
    pub event: Option<ActionEvent>,
    pub output: Option<String>,
}

impl From<&IntermediaryStep> for RecordedStep {
    fn from(step: &IntermediaryStep) -> Self {
        Self {
            state: step
                .orchestration_input
                .state
                .as_deref()
                .and_then(|s| s.parse().ok()),
            input: step.orchestration_input.text.clone(),
            event: step
                .orchestration_output
                .event
                .as_deref()
                .and_then(|s| s.parse().ok()),
            output: step.orchestration_output.text.clone(),
        }
    }
}

impl RecordedStep {
    fn input_text(&self) -> &str {
        self.input.as_deref().unwrap_or_default()
    }

    fn output_text(&self) -> &str {
        self.output.as_deref().unwrap_or_default()
    }
}

/// Ordered, role-alternating message log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild the transcript from the session history in `context`
    pub fn replay(context: &OrchestrationContext, mode: ReplayMode) -> Result<Self> {
        let mut transcript = Self::new();
        for step in context.steps() {
            transcript.replay_step(&RecordedStep::from(step), mode)?;
        }
        Ok(transcript)
    }

    fn replay_step(&mut self, step: &RecordedStep, mode: ReplayMode) -> Result<()> {
        match step.state {
            Some(OrchestrationState::Start) => {
                self.push_user(ContentBlock::text(step.input_text()));
            }
            Some(OrchestrationState::ModelInvoked) if mode != ReplayMode::Planning => {
                let invocation: ModelInvocation = serde_json::from_str(step.input_text())
                    .map_err(|e| OrchestrationError::malformed("recorded model output", e))?;
                self.push(invocation.output.into_message());
            }
            Some(OrchestrationState::ToolInvoked) if mode != ReplayMode::Planning => {
                self.push_user(decode_block(step.input_text(), "recorded tool result")?);
            }
            _ => {}
        }

        match (mode, step.event) {
            (ReplayMode::Full, Some(ActionEvent::Finish))
                if step.state != Some(OrchestrationState::ModelInvoked) =>
            {
                self.push_assistant(block_or_text(step.output_text()));
            }
            (ReplayMode::Summary, Some(ActionEvent::InvokeTool)) => {
                self.push_assistant(block_or_text(step.output_text()));
            }
            _ => {}
        }

        Ok(())
    }

    /// Append a message, collapsing it into the previous one on equal roles
    pub fn push(&mut self, message: Message) {
        match self.messages.last_mut() {
            Some(last) if last.role == message.role => last.content = message.content,
            _ => self.messages.push(message),
        }
    }

    pub fn push_user(&mut self, block: ContentBlock) {
        self.push(Message::user(block));
    }

    pub fn push_assistant(&mut self, block: ContentBlock) {
        self.push(Message::assistant(block));
    }

    /// Role of the last message
    pub fn last_role(&self) -> Option<ConversationRole> {
        self.messages.last().map(|m| m.role)
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}
