// Orchestration strategies
//
// A strategy maps one validated event to the next action. Strategies are
// stateless: everything they need arrives in the event, everything they
// want remembered leaves in the payload context.
//
// Key concepts:
// - OrchestrationStrategy trait: Event → ActionPayload
// - Synchronous and pure: no I/O, identical events give identical payloads
// - The model and tools are invoked by the runtime, never by a strategy

use crate::context::OrchestrationContext;
use crate::error::Result;
use crate::event::OrchestrationEvent;
use crate::message::{ConverseRequest, InferenceConfig, SystemContent, ToolConfig};
use crate::payload::ActionPayload;
use crate::transcript::Transcript;

mod plan;
mod react;
mod rewoo;

pub use plan::{FunctionCall, Plan, PlanStep};
pub use react::ReactStrategy;
pub use rewoo::{PlanState, RewooStrategy, ToolState, PLAN_STATE_ATTRIBUTE};

/// Decides the next orchestration action
pub trait OrchestrationStrategy: Send + Sync {
    /// Name of this strategy (for logging/debugging)
    fn name(&self) -> &'static str;

    /// Compute the next action for a validated event
    fn next_action(&self, event: &OrchestrationEvent) -> Result<ActionPayload>;
}

/// Assemble a model request from a transcript
pub(crate) fn converse_request(
    context: &OrchestrationContext,
    system: Option<String>,
    transcript: Transcript,
    inference: InferenceConfig,
) -> ConverseRequest {
    ConverseRequest {
        model_id: context.agent_configuration.default_model_id.clone(),
        system: system
            .map(|text| vec![SystemContent { text }])
            .unwrap_or_default(),
        messages: transcript.into_messages(),
        inference_config: inference,
        tool_config: ToolConfig {
            tools: context.agent_configuration.tools.clone(),
        },
    }
}
