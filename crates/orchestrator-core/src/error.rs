// Error types for the orchestration router

use thiserror::Error;

/// Result type alias for router operations
pub type Result<T> = std::result::Result<T, OrchestrationError>;

/// Errors that can occur while routing an orchestration event
///
/// None of these are retried by the router. They propagate to the calling
/// runtime, which owns any retry policy.
#[derive(Debug, Error)]
pub enum OrchestrationError {
    /// Event is missing `state` or `context`, or is not an object
    #[error("Invalid event structure: {0}")]
    InvalidEvent(String),

    /// `state` holds a value outside START, MODEL_INVOKED, TOOL_INVOKED
    #[error("Invalid state provided: {0}")]
    InvalidState(String),

    /// A JSON payload embedded in the event could not be decoded
    #[error("Malformed {what}: {source}")]
    MalformedPayload {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Model output carries a field the router can't act on
    #[error("Malformed model output: {0}")]
    MalformedModelOutput(String),

    /// Model stopped for a reason that has no next action
    #[error("Unexpected stop reason: {0}")]
    UnexpectedStopReason(String),

    /// Plan text produced by the model can't be executed
    #[error("Invalid plan: {0}")]
    InvalidPlan(String),

    /// Outgoing payload could not be encoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl OrchestrationError {
    /// Create a structural validation error
    pub fn invalid_event(msg: impl Into<String>) -> Self {
        OrchestrationError::InvalidEvent(msg.into())
    }

    /// Create a malformed payload error for the named payload
    pub fn malformed(what: &'static str, source: serde_json::Error) -> Self {
        OrchestrationError::MalformedPayload { what, source }
    }

    /// Create a malformed model output error
    pub fn model_output(msg: impl Into<String>) -> Self {
        OrchestrationError::MalformedModelOutput(msg.into())
    }

    /// Create an invalid plan error
    pub fn plan(msg: impl Into<String>) -> Self {
        OrchestrationError::InvalidPlan(msg.into())
    }

    /// Stable machine-readable kind, used by transports
    pub fn kind(&self) -> &'static str {
        match self {
            OrchestrationError::InvalidEvent(_) => "invalid_event",
            OrchestrationError::InvalidState(_) => "invalid_state",
            OrchestrationError::MalformedPayload { .. }
            | OrchestrationError::MalformedModelOutput(_)
            | OrchestrationError::UnexpectedStopReason(_)
            | OrchestrationError::InvalidPlan(_) => "malformed_payload",
            OrchestrationError::Serialization(_) => "serialization",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            OrchestrationError::invalid_event("missing state").kind(),
            "invalid_event"
        );
        assert_eq!(
            OrchestrationError::InvalidState("PAUSED".into()).kind(),
            "invalid_state"
        );
        assert_eq!(
            OrchestrationError::UnexpectedStopReason("max_tokens".into()).kind(),
            "malformed_payload"
        );
    }

    #[test]
    fn test_malformed_message_names_payload() {
        let source = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = OrchestrationError::malformed("input.text", source);
        assert!(err.to_string().starts_with("Malformed input.text:"));
    }
}
