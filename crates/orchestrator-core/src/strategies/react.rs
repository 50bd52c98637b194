//! ReactStrategy - reason/act loop
//!
//! START and TOOL_INVOKED always go back to the model with the replayed
//! conversation. MODEL_INVOKED either finishes the turn or hands a tool call
//! to the runtime, depending on the stop reason.

use serde_json::Value;

use super::{converse_request, OrchestrationStrategy};
use crate::config::RouterConfig;
use crate::error::{OrchestrationError, Result};
use crate::event::{block_or_text, decode_block, ActionEvent, OrchestrationEvent, OrchestrationState};
use crate::message::{InferenceConfig, ModelInvocation, StopReason};
use crate::payload::ActionPayload;
use crate::prompt::react_system_prompt;
use crate::transcript::{ReplayMode, Transcript};

/// Strategy that alternates model and tool calls until the model answers
#[derive(Debug, Clone)]
pub struct ReactStrategy {
    answer_tool: String,
    inference: InferenceConfig,
}

impl ReactStrategy {
    pub fn new(config: &RouterConfig) -> Self {
        Self {
            answer_tool: config.answer_tool.clone(),
            inference: config.inference(),
        }
    }

    fn invoke_model(&self, event: &OrchestrationEvent) -> Result<ActionPayload> {
        let context = &event.context;
        let mut transcript = Transcript::replay(context, ReplayMode::Full)?;

        let current = match event.state {
            OrchestrationState::ToolInvoked => decode_block(event.input_text(), "input.text")?,
            _ => block_or_text(event.input_text()),
        };
        transcript.push_user(current);

        let request = converse_request(
            context,
            Some(react_system_prompt(context)),
            transcript,
            self.inference,
        );

        Ok(ActionPayload::new(
            ActionEvent::InvokeModel,
            serde_json::to_string(&request)?,
            format!("{} -> INVOKE_MODEL", event.state),
            context.carry_forward(),
        ))
    }

    fn after_model(&self, event: &OrchestrationEvent) -> Result<ActionPayload> {
        let raw: Value = event.input_json("input.text")?;
        let invocation: ModelInvocation = serde_json::from_value(raw.clone())
            .map_err(|e| OrchestrationError::malformed("input.text", e))?;
        let context = event.context.carry_forward();

        match &invocation.stop_reason {
            StopReason::ToolUse => {
                let tool_use = invocation.tool_use().ok_or_else(|| {
                    OrchestrationError::model_output("stop reason tool_use without toolUse block")
                })?;

                if tool_use.name == self.answer_tool {
                    let answer = tool_use.input_text().ok_or_else(|| {
                        OrchestrationError::model_output(format!(
                            "{} tool called without text input",
                            tool_use.name
                        ))
                    })?;
                    return Ok(ActionPayload::new(
                        ActionEvent::Finish,
                        answer,
                        format!("MODEL_INVOKED -> FINISH via {}", tool_use.name),
                        context,
                    ));
                }

                let block = raw_tool_use(&raw, &tool_use.tool_use_id).ok_or_else(|| {
                    OrchestrationError::model_output("toolUse block missing from raw output")
                })?;
                Ok(ActionPayload::new(
                    ActionEvent::InvokeTool,
                    serde_json::to_string(block)?,
                    format!("MODEL_INVOKED -> INVOKE_TOOL {}", tool_use.name),
                    context,
                ))
            }
            StopReason::EndTurn => {
                let text = invocation.text().ok_or_else(|| {
                    OrchestrationError::model_output("end_turn without text content")
                })?;
                Ok(ActionPayload::new(
                    ActionEvent::Finish,
                    text,
                    "MODEL_INVOKED -> FINISH",
                    context,
                ))
            }
            other => Err(OrchestrationError::UnexpectedStopReason(other.to_string())),
        }
    }
}

/// The `toolUse` content block with this id, exactly as the model returned it
fn raw_tool_use<'a>(raw: &'a Value, tool_use_id: &str) -> Option<&'a Value> {
    raw.pointer("/output/content")?
        .as_array()?
        .iter()
        .find(|block| {
            block
                .pointer("/toolUse/toolUseId")
                .and_then(Value::as_str)
                == Some(tool_use_id)
        })
}

impl Default for ReactStrategy {
    fn default() -> Self {
        Self::new(&RouterConfig::default())
    }
}

impl OrchestrationStrategy for ReactStrategy {
    fn name(&self) -> &'static str {
        "react"
    }

    fn next_action(&self, event: &OrchestrationEvent) -> Result<ActionPayload> {
        match event.state {
            OrchestrationState::Start | OrchestrationState::ToolInvoked => self.invoke_model(event),
            OrchestrationState::ModelInvoked => self.after_model(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_ANSWER_TOOL;
    use crate::message::{ContentBlock, ConverseRequest, ConversationRole};
    use serde_json::json;

    fn model_invoked(text: serde_json::Value) -> OrchestrationEvent {
        OrchestrationEvent::new(OrchestrationState::ModelInvoked, text.to_string())
    }

    #[test]
    fn test_answer_tool_name_is_configurable() {
        let config = RouterConfig::builder().answer_tool("final_answer").build();
        let strategy = ReactStrategy::new(&config);

        let event = model_invoked(json!({
            "stopReason": "tool_use",
            "output": {"content": [{"toolUse": {
                "toolUseId": "t1", "name": "final_answer", "input": {"text": "42"}
            }}]}
        }));
        let payload = strategy.next_action(&event).unwrap();
        assert_eq!(payload.action_event, ActionEvent::Finish);
        assert_eq!(payload.text(), "42");

        // the default name is now an ordinary tool
        let event = model_invoked(json!({
            "stopReason": "tool_use",
            "output": {"content": [{"toolUse": {
                "toolUseId": "t2", "name": DEFAULT_ANSWER_TOOL, "input": {"text": "42"}
            }}]}
        }));
        let payload = strategy.next_action(&event).unwrap();
        assert_eq!(payload.action_event, ActionEvent::InvokeTool);
    }

    #[test]
    fn test_tool_use_skips_leading_text() {
        let event = model_invoked(json!({
            "stopReason": "tool_use",
            "output": {"content": [
                {"text": "Let me check."},
                {"toolUse": {"toolUseId": "t1", "name": "lookup", "input": {"id": 7}}}
            ]}
        }));

        let payload = ReactStrategy::default().next_action(&event).unwrap();
        let block: serde_json::Value = serde_json::from_str(payload.text()).unwrap();
        assert_eq!(block["toolUse"]["name"], "lookup");
        assert_eq!(block["toolUse"]["input"]["id"], 7);
    }

    #[test]
    fn test_tool_use_block_is_emitted_as_received() {
        let tool_use = json!({"toolUse": {
            "toolUseId": "t1", "name": "get_weather", "input": {"city": "Paris"}, "type": "tool_use"
        }});
        let event = model_invoked(json!({
            "stopReason": "tool_use",
            "output": {"content": [tool_use.clone()]}
        }));

        let payload = ReactStrategy::default().next_action(&event).unwrap();
        let emitted: serde_json::Value = serde_json::from_str(payload.text()).unwrap();
        assert_eq!(emitted, tool_use);

        // no input key is not turned into "input": null
        let tool_use = json!({"toolUse": {"toolUseId": "t2", "name": "ping"}});
        let event = model_invoked(json!({
            "stopReason": "tool_use",
            "output": {"content": [tool_use.clone()]}
        }));
        let payload = ReactStrategy::default().next_action(&event).unwrap();
        let emitted: serde_json::Value = serde_json::from_str(payload.text()).unwrap();
        assert_eq!(emitted, tool_use);
    }

    #[test]
    fn test_answer_without_text_is_malformed() {
        let event = model_invoked(json!({
            "stopReason": "tool_use",
            "output": {"content": [{"toolUse": {"toolUseId": "t1", "name": "answer", "input": {}}}]}
        }));
        let err = ReactStrategy::default().next_action(&event).unwrap_err();
        assert!(matches!(err, OrchestrationError::MalformedModelOutput(_)));
    }

    #[test]
    fn test_max_tokens_is_unexpected() {
        let event = model_invoked(json!({
            "stopReason": "max_tokens",
            "output": {"content": [{"text": "trunc"}]}
        }));
        let err = ReactStrategy::default().next_action(&event).unwrap_err();
        assert!(matches!(err, OrchestrationError::UnexpectedStopReason(r) if r == "max_tokens"));
    }

    #[test]
    fn test_tool_invoked_requires_json_input() {
        let event = OrchestrationEvent::new(OrchestrationState::ToolInvoked, "22C");
        let err = ReactStrategy::default().next_action(&event).unwrap_err();
        assert!(matches!(err, OrchestrationError::MalformedPayload { .. }));
    }

    #[test]
    fn test_start_accepts_json_encoded_text() {
        let event = OrchestrationEvent::new(OrchestrationState::Start, r#"{"text":"hello"}"#);
        let payload = ReactStrategy::default().next_action(&event).unwrap();

        let request: ConverseRequest = serde_json::from_str(payload.text()).unwrap();
        assert_eq!(request.messages.len(), 1);
        assert_eq!(request.messages[0].role, ConversationRole::User);
        assert_eq!(request.messages[0].content, vec![ContentBlock::text("hello")]);
        assert_eq!(request.system.len(), 1);
        assert_eq!(request.inference_config.temperature, 0.7);
    }
}
