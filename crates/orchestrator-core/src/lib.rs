// Custom Orchestration Router
//
// This crate decides, for each state transition of an agent conversation
// turn, what the runtime should do next: invoke the model, invoke a tool,
// or finish.
//
// Key design decisions:
// - Pure routing: `(state, input, context)` in, ActionPayload out, no I/O
// - All continuity lives in the caller-supplied context (session history,
//   session attributes); the router holds nothing between calls
// - The JSON-in-JSON wire contract is decoded once into typed structs
// - Strategies (react, rewoo) sit behind the OrchestrationStrategy trait
// - History is replayed into a Transcript that enforces role alternation
// - Streaming mode emits ordered payloads with pauses (async, tokio timers)

pub mod config;
pub mod context;
pub mod error;
pub mod event;
pub mod message;
pub mod payload;
pub mod prompt;
pub mod router;
pub mod strategies;
pub mod streaming;
pub mod transcript;

// Re-exports for convenience
pub use config::{RouterConfig, RouterConfigBuilder, StrategyKind};
pub use context::{AgentConfiguration, ConversationTurn, IntermediaryStep, OrchestrationContext, PayloadContext};
pub use error::{OrchestrationError, Result};
pub use event::{ActionEvent, EventInput, OrchestrationEvent, OrchestrationState};
pub use message::{
    ContentBlock, ConversationRole, ConverseRequest, InferenceConfig, Message, ModelInvocation,
    StopReason, ToolResultBlock, ToolUseBlock,
};
pub use payload::ActionPayload;
pub use router::{route, Dispatch, Router, StreamedAnswer};
pub use strategies::{OrchestrationStrategy, PlanState, ReactStrategy, RewooStrategy};
pub use streaming::StreamResponder;
pub use transcript::{ReplayMode, Transcript};
