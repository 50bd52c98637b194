//! RewooStrategy - plan once, execute, summarize
//!
//! The model is asked for an XML plan at the start of a turn. The router then
//! walks the plan one tool call per transition, keeping its position in the
//! `state` session attribute, and finally asks the model to answer from the
//! collected tool results.

use serde::{Deserialize, Serialize};

use super::plan::Plan;
use super::{converse_request, OrchestrationStrategy};
use crate::config::{RouterConfig, StrategyKind};
use crate::context::OrchestrationContext;
use crate::error::{OrchestrationError, Result};
use crate::event::{block_or_text, decode_block, ActionEvent, OrchestrationEvent, OrchestrationState};
use crate::message::{ContentBlock, ConversationRole, InferenceConfig, Message, ModelInvocation};
use crate::payload::ActionPayload;
use crate::prompt::{planning_prompt, SUMMARY_PROMPT};
use crate::transcript::{ReplayMode, Transcript};

/// Session attribute holding the serialized PlanState
pub const PLAN_STATE_ATTRIBUTE: &str = "state";

/// Position in the plan, persisted between invocations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanState {
    #[serde(default)]
    pub plan: Option<String>,
    #[serde(default)]
    pub tool_state: ToolState,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolState {
    /// Signature of the call most recently handed to the runtime
    #[serde(default)]
    pub last_tool_used: Option<String>,
    /// Plan step index of that call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_step: Option<usize>,
    #[serde(default)]
    pub last_tool_result: Option<String>,
    /// Result of the first tool call of the plan
    #[serde(default)]
    pub parent_tool_result: Option<String>,
    /// Set once the plan is exhausted and the model is summarizing
    #[serde(default)]
    pub is_summary: bool,
}

impl PlanState {
    /// Read the plan state from the session attributes
    pub fn from_context(context: &OrchestrationContext) -> Result<Self> {
        match context.session_attributes.get(PLAN_STATE_ATTRIBUTE) {
            None | Some(serde_json::Value::Null) => Ok(Self::default()),
            Some(serde_json::Value::String(raw)) if raw.trim().is_empty() => Ok(Self::default()),
            Some(serde_json::Value::String(raw)) => serde_json::from_str(raw)
                .map_err(|e| OrchestrationError::malformed("session plan state", e)),
            Some(other) => serde_json::from_value(other.clone())
                .map_err(|e| OrchestrationError::malformed("session plan state", e)),
        }
    }

    fn summarizing() -> Self {
        Self {
            plan: None,
            tool_state: ToolState {
                is_summary: true,
                ..ToolState::default()
            },
        }
    }
}

/// Strategy that plans up front and runs the plan without re-planning
#[derive(Debug, Clone)]
pub struct RewooStrategy {
    inference: InferenceConfig,
}

impl RewooStrategy {
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            inference: config.inference(),
        }
    }

    fn payload(
        &self,
        action: ActionEvent,
        text: String,
        trace: String,
        context: &OrchestrationContext,
        state: &PlanState,
    ) -> Result<ActionPayload> {
        let mut carried = context.carry_forward();
        carried.session_attributes.insert(
            PLAN_STATE_ATTRIBUTE.to_string(),
            serde_json::Value::String(serde_json::to_string(state)?),
        );
        Ok(ActionPayload::new(action, text, trace, carried))
    }

    fn plan(&self, event: &OrchestrationEvent) -> Result<ActionPayload> {
        let context = &event.context;
        let mut transcript = Transcript::replay(context, ReplayMode::Planning)?;

        let current = match block_or_text(event.input_text()) {
            ContentBlock::Text(text) => {
                ContentBlock::Text(format!("{}\n\n{}", planning_prompt(context), text))
            }
            other => other,
        };
        transcript.push_user(current);

        let request = converse_request(context, None, transcript, self.inference);
        self.payload(
            ActionEvent::InvokeModel,
            serde_json::to_string(&request)?,
            "START -> INVOKE_MODEL (plan)".to_string(),
            context,
            &PlanState::default(),
        )
    }

    /// Ask the model to answer from everything gathered so far
    ///
    /// `tail` is appended after the replayed history; its last message must
    /// be a user message carrying the summary prompt.
    fn summarize(&self, event: &OrchestrationEvent, tail: Vec<Message>) -> Result<ActionPayload> {
        let context = &event.context;
        let mut transcript = Transcript::replay(context, ReplayMode::Summary)?;
        for message in tail {
            transcript.push(message);
        }

        let request = converse_request(context, None, transcript, self.inference);
        self.payload(
            ActionEvent::InvokeModel,
            serde_json::to_string(&request)?,
            format!("{} -> INVOKE_MODEL (summary)", event.state),
            context,
            &PlanState::summarizing(),
        )
    }

    fn after_model(&self, event: &OrchestrationEvent) -> Result<ActionPayload> {
        let invocation: ModelInvocation = event.input_json("input.text")?;
        let state = PlanState::from_context(&event.context)?;
        let text = invocation
            .text()
            .ok_or_else(|| OrchestrationError::model_output("model output has no text content"))?;

        if state.tool_state.is_summary {
            return self.payload(
                ActionEvent::Finish,
                text.to_string(),
                "MODEL_INVOKED -> FINISH (summary)".to_string(),
                &event.context,
                &PlanState::default(),
            );
        }

        let plan_text = text.replace('\n', "");
        let plan = Plan::parse(&plan_text)?;
        for skipped in plan.skipped() {
            tracing::warn!(step = ?skipped, "Skipping plan step with control structure");
        }

        match plan.next_call(None) {
            Some((index, call)) => {
                let state = PlanState {
                    plan: Some(plan_text.clone()),
                    tool_state: ToolState {
                        last_tool_used: Some(call.signature.clone()),
                        last_step: Some(index),
                        ..ToolState::default()
                    },
                };
                self.payload(
                    ActionEvent::InvokeTool,
                    serde_json::to_string(&call.to_tool_use(index))?,
                    format!("MODEL_INVOKED -> INVOKE_TOOL {}", call.name),
                    &event.context,
                    &state,
                )
            }
            None => {
                tracing::debug!("Plan has no executable steps, summarizing");
                self.summarize(
                    event,
                    vec![
                        Message::assistant(ContentBlock::text(text)),
                        Message::user(ContentBlock::text(SUMMARY_PROMPT)),
                    ],
                )
            }
        }
    }

    fn after_tool(&self, event: &OrchestrationEvent) -> Result<ActionPayload> {
        let block = decode_block(event.input_text(), "input.text")?;
        let result_text = match &block {
            ContentBlock::ToolResult(result) => result.first_text().unwrap_or_default().to_string(),
            _ => {
                return Err(OrchestrationError::model_output(
                    "TOOL_INVOKED input is not a toolResult block",
                ))
            }
        };

        let mut state = PlanState::from_context(&event.context)?;
        let plan_text = state
            .plan
            .clone()
            .ok_or_else(|| OrchestrationError::plan("no plan in session state"))?;
        let plan = Plan::parse(&plan_text)?;

        state.tool_state.last_tool_result = Some(result_text.clone());
        let parent = state
            .tool_state
            .parent_tool_result
            .get_or_insert(result_text)
            .clone();

        // States written before the step index was recorded only carry the signature
        let after = state.tool_state.last_step.or_else(|| {
            state
                .tool_state
                .last_tool_used
                .as_deref()
                .and_then(|signature| plan.position_of(signature))
        });

        match plan.next_call(after) {
            Some((index, call)) => {
                let state = PlanState {
                    plan: Some(plan_text),
                    tool_state: ToolState {
                        last_tool_used: Some(call.signature.clone()),
                        last_step: Some(index),
                        last_tool_result: None,
                        parent_tool_result: Some(parent),
                        is_summary: false,
                    },
                };
                self.payload(
                    ActionEvent::InvokeTool,
                    serde_json::to_string(&call.to_tool_use(index))?,
                    format!("TOOL_INVOKED -> INVOKE_TOOL {}", call.name),
                    &event.context,
                    &state,
                )
            }
            None => self.summarize(
                event,
                vec![Message {
                    role: ConversationRole::User,
                    content: vec![block, ContentBlock::text(SUMMARY_PROMPT)],
                }],
            ),
        }
    }
}

impl Default for RewooStrategy {
    fn default() -> Self {
        Self::new(&RouterConfig::new(StrategyKind::Rewoo))
    }
}

impl OrchestrationStrategy for RewooStrategy {
    fn name(&self) -> &'static str {
        "rewoo"
    }

    fn next_action(&self, event: &OrchestrationEvent) -> Result<ActionPayload> {
        match event.state {
            OrchestrationState::Start => self.plan(event),
            OrchestrationState::ModelInvoked => self.after_model(event),
            OrchestrationState::ToolInvoked => self.after_tool(event),
        }
    }
}
