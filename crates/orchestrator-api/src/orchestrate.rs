// Orchestration HTTP endpoints
//
// POST /v1/orchestrate         - one event in, the next action (or the
//                                 streamed answer as an array) out
// POST /v1/orchestrate/events  - same, as server-sent "action" events

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{
        sse::{Event as SseEvent, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::post,
    Json, Router,
};
use futures::{
    stream::{self, BoxStream, Stream},
    StreamExt,
};
use orchestrator_core::{ActionPayload, Dispatch, OrchestrationError, Router as OrchestrationRouter};
use serde::Serialize;
use serde_json::Value;

/// App state for orchestration routes
#[derive(Clone)]
pub struct AppState {
    pub router: Arc<OrchestrationRouter>,
}

impl AppState {
    pub fn new(router: OrchestrationRouter) -> Self {
        Self {
            router: Arc::new(router),
        }
    }
}

/// Create orchestration routes
pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/v1/orchestrate", post(orchestrate))
        .route("/v1/orchestrate/events", post(orchestrate_events))
        .with_state(state)
}

// ============================================
// Errors
// ============================================

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Serialize)]
struct ErrorDetail {
    kind: &'static str,
    message: String,
}

/// Routing failure rendered as JSON
#[derive(Debug)]
pub struct ApiError(OrchestrationError);

impl From<OrchestrationError> for ApiError {
    fn from(err: OrchestrationError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(OrchestrationError::invalid_event(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            OrchestrationError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "Failed to encode action payload");
        } else {
            tracing::warn!(kind = self.0.kind(), error = %self.0, "Rejected orchestration event");
        }

        let body = ErrorBody {
            error: ErrorDetail {
                kind: self.0.kind(),
                message: self.0.to_string(),
            },
        };
        (status, Json(body)).into_response()
    }
}

// ============================================
// Handlers
// ============================================

/// Route one orchestration event
///
/// A streaming trigger is answered with the full array of chunk payloads,
/// produced at the configured pace.
pub async fn orchestrate(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(event) = body?;
    match state.router.dispatch(&event)? {
        Dispatch::Action(payload) => Ok(Json(payload).into_response()),
        Dispatch::Stream(answer) => {
            let payloads: Vec<ActionPayload> = answer.stream()?.collect().await;
            tracing::info!(count = payloads.len(), "Streamed answer collected");
            Ok(Json(payloads).into_response())
        }
    }
}

/// Route one orchestration event and deliver the result as SSE
pub async fn orchestrate_events(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<SseEvent, axum::Error>>>, ApiError> {
    let Json(event) = body?;
    let payloads: BoxStream<'static, ActionPayload> = match state.router.dispatch(&event)? {
        Dispatch::Action(payload) => stream::once(async move { payload }).boxed(),
        Dispatch::Stream(answer) => answer.stream()?.boxed(),
    };

    let events = payloads.map(|payload| SseEvent::default().event("action").json_data(payload));

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

// ============================================
// Tests
// ============================================
