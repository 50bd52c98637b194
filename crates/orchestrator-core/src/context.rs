// Session context carried by the runtime
//
// The router keeps no state between invocations. Everything it knows about
// the conversation arrives in the event context and everything it wants to
// remember goes back out through the payload context.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Opaque key/value attributes
pub type Attributes = Map<String, Value>;

/// Accept `null` wherever a collection is expected
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Context of an orchestration event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrchestrationContext {
    /// Past turns of the session, oldest first
    #[serde(default, deserialize_with = "null_as_default")]
    pub session: Vec<Option<ConversationTurn>>,

    /// Attributes persisted across turns, opaque to the router
    #[serde(default, deserialize_with = "null_as_default")]
    pub session_attributes: Attributes,

    /// Attributes injected into the prompt
    #[serde(default, deserialize_with = "null_as_default")]
    pub prompt_session_attributes: Attributes,

    #[serde(default, deserialize_with = "null_as_default")]
    pub agent_configuration: AgentConfiguration,
}

impl OrchestrationContext {
    /// Attributes to hand back to the runtime unchanged
    pub fn carry_forward(&self) -> PayloadContext {
        PayloadContext {
            session_attributes: self.session_attributes.clone(),
            prompt_session_attributes: self.prompt_session_attributes.clone(),
        }
    }

    /// Recorded steps of every turn, in order, skipping empty entries
    pub fn steps(&self) -> impl Iterator<Item = &IntermediaryStep> {
        self.session
            .iter()
            .flatten()
            .flat_map(|turn| turn.intermediary_steps.iter().flatten())
    }
}

/// Agent settings supplied by the runtime
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentConfiguration {
    #[serde(default)]
    pub instruction: Option<String>,

    #[serde(default)]
    pub default_model_id: Option<String>,

    /// Tool specs, forwarded to the model untouched
    #[serde(default, deserialize_with = "null_as_default")]
    pub tools: Vec<Value>,
}

/// One past conversation turn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationTurn {
    #[serde(default, deserialize_with = "null_as_default")]
    pub intermediary_steps: Vec<Option<IntermediaryStep>>,
}

/// One recorded state transition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntermediaryStep {
    #[serde(default, deserialize_with = "null_as_default")]
    pub orchestration_input: RecordedInput,

    #[serde(default, deserialize_with = "null_as_default")]
    pub orchestration_output: RecordedOutput,
}

/// What the runtime sent the router for a past transition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedInput {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// What the router answered for a past transition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecordedOutput {
    #[serde(default)]
    pub event: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
}

/// Context returned to the runtime with each payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadContext {
    #[serde(default)]
    pub session_attributes: Attributes,
    #[serde(default)]
    pub prompt_session_attributes: Attributes,
}
