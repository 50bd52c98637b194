// Orchestration router
//
// Router is the entry point for transports: it validates the raw event,
// checks for the streaming trigger, and delegates the transition to the
// configured strategy.

use futures::Stream;
use serde_json::Value;

use crate::config::{RouterConfig, StrategyKind};
use crate::error::Result;
use crate::event::OrchestrationEvent;
use crate::payload::ActionPayload;
use crate::strategies::{OrchestrationStrategy, ReactStrategy, RewooStrategy};
use crate::streaming::StreamResponder;

/// What the router decided for one invocation
#[derive(Debug, Clone)]
pub enum Dispatch {
    /// A single action payload
    Action(ActionPayload),
    /// A streamed answer; payloads must be emitted in order with pauses
    Stream(StreamedAnswer),
}

/// Event accepted for streaming, ready to be emitted
#[derive(Debug, Clone)]
pub struct StreamedAnswer {
    pub responder: StreamResponder,
    pub event: OrchestrationEvent,
}

impl StreamedAnswer {
    /// All payloads at once, without pauses
    pub fn payloads(&self) -> Result<Vec<ActionPayload>> {
        self.responder.payloads(&self.event.context)
    }

    /// Payloads paced by the configured interval
    pub fn stream(&self) -> Result<impl Stream<Item = ActionPayload> + Send + 'static> {
        self.responder.stream(&self.event.context)
    }
}

/// Routes orchestration events through a strategy
pub struct Router {
    strategy: Box<dyn OrchestrationStrategy>,
    responder: StreamResponder,
}

impl Router {
    pub fn new(config: &RouterConfig) -> Self {
        let strategy: Box<dyn OrchestrationStrategy> = match config.strategy {
            StrategyKind::React => Box::new(ReactStrategy::new(config)),
            StrategyKind::Rewoo => Box::new(RewooStrategy::new(config)),
        };
        Self {
            strategy,
            responder: StreamResponder::new(config),
        }
    }

    /// Use a custom strategy
    pub fn with_strategy(
        strategy: impl OrchestrationStrategy + 'static,
        config: &RouterConfig,
    ) -> Self {
        Self {
            strategy: Box::new(strategy),
            responder: StreamResponder::new(config),
        }
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Compute the next action for a validated event
    pub fn route(&self, event: &OrchestrationEvent) -> Result<ActionPayload> {
        let payload = self.strategy.next_action(event)?;
        tracing::debug!(
            strategy = self.strategy.name(),
            state = %event.state,
            action = %payload.action_event,
            "Routed orchestration event"
        );
        Ok(payload)
    }

    /// Validate a raw event and compute the next action
    pub fn route_value(&self, event: &Value) -> Result<ActionPayload> {
        self.route(&OrchestrationEvent::from_value(event)?)
    }

    /// Validate a raw event and decide between a single action and a stream
    pub fn dispatch(&self, event: &Value) -> Result<Dispatch> {
        let event = OrchestrationEvent::from_value(event)?;

        if self.responder.is_triggered_by(&event) {
            tracing::info!(state = %event.state, "Streaming answer requested");
            return Ok(Dispatch::Stream(StreamedAnswer {
                responder: self.responder.clone(),
                event,
            }));
        }

        self.route(&event).map(Dispatch::Action)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new(&RouterConfig::default())
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("strategy", &self.strategy.name())
            .field("responder", &self.responder)
            .finish()
    }
}

/// Route a raw event with the default reason/act strategy
pub fn route(event: &Value) -> Result<ActionPayload> {
    Router::default().route_value(event)
}
