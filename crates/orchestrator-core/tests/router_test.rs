// Integration tests for orchestration routing
//
// These tests drive the router through raw JSON events the way the agent
// runtime does, for both strategies and the streaming mode.

use std::time::Duration;

use futures::StreamExt;
use orchestrator_core::{
    route, ActionEvent, ContentBlock, ConversationRole, ConverseRequest, Dispatch,
    OrchestrationContext, OrchestrationError, PlanState, Router, RouterConfig, StrategyKind,
    StreamResponder,
};
use serde_json::{json, Map, Value};

fn start_event(text: &str) -> Value {
    json!({
        "state": "START",
        "input": {"text": text},
        "context": {
            "session": [],
            "agentConfiguration": {"instruction": "x", "tools": []}
        }
    })
}

fn model_invoked(output: Value) -> Value {
    json!({
        "state": "MODEL_INVOKED",
        "input": {"text": output.to_string()},
        "context": {}
    })
}

// =============================================================================
// React state machine
// =============================================================================

#[test]
fn test_start_invokes_model_with_single_user_message() {
    let payload = route(&start_event("hi")).unwrap();

    assert_eq!(payload.action_event, ActionEvent::InvokeModel);
    assert_eq!(payload.version, "1.0");

    let request: ConverseRequest = serde_json::from_str(payload.text()).unwrap();
    assert_eq!(request.messages.len(), 1);
    assert_eq!(request.messages[0].role, ConversationRole::User);
    assert_eq!(request.messages[0].content, vec![ContentBlock::text("hi")]);
    assert!(request.system[0].text.starts_with("x\n"));
}

#[test]
fn test_end_turn_finishes_with_text() {
    let event = json!({
        "state": "MODEL_INVOKED",
        "input": {"text": "{\"stopReason\":\"end_turn\",\"output\":{\"content\":[{\"text\":\"done\"}]}}"},
        "context": {}
    });

    let payload = route(&event).unwrap();
    assert_eq!(payload.action_event, ActionEvent::Finish);
    assert_eq!(payload.text(), "done");
}

#[test]
fn test_answer_tool_finishes_with_tool_text() {
    let payload = route(&model_invoked(json!({
        "stopReason": "tool_use",
        "output": {"role": "assistant", "content": [{"toolUse": {
            "toolUseId": "tooluse_1", "name": "answer", "input": {"text": "It is sunny."}
        }}]}
    })))
    .unwrap();

    assert_eq!(payload.action_event, ActionEvent::Finish);
    assert_eq!(payload.text(), "It is sunny.");
}

#[test]
fn test_other_tool_is_invoked_verbatim() {
    let tool_use = json!({"toolUse": {
        "toolUseId": "tooluse_2", "name": "get_weather", "input": {"city": "Paris", "unit": "C"}
    }});
    let payload = route(&model_invoked(json!({
        "stopReason": "tool_use",
        "output": {"role": "assistant", "content": [tool_use.clone()]}
    })))
    .unwrap();

    assert_eq!(payload.action_event, ActionEvent::InvokeTool);
    let emitted: Value = serde_json::from_str(payload.text()).unwrap();
    assert_eq!(emitted, tool_use);
}

#[test]
fn test_tool_invoked_goes_back_to_model_with_result() {
    let event = json!({
        "state": "TOOL_INVOKED",
        "input": {"text": "{\"toolResult\":{\"toolUseId\":\"tooluse_2\",\"content\":[{\"text\":\"22C\"}]}}"},
        "context": {
            "session": [{"intermediarySteps": [
                {
                    "orchestrationInput": {"state": "START", "text": "weather in Paris?"},
                    "orchestrationOutput": {"event": "INVOKE_MODEL", "text": "{}"}
                },
                {
                    "orchestrationInput": {
                        "state": "MODEL_INVOKED",
                        "text": "{\"stopReason\":\"tool_use\",\"output\":{\"role\":\"assistant\",\"content\":[{\"toolUse\":{\"toolUseId\":\"tooluse_2\",\"name\":\"get_weather\",\"input\":{\"city\":\"Paris\"}}}]}}"
                    },
                    "orchestrationOutput": {"event": "INVOKE_TOOL", "text": "{}"}
                }
            ]}],
            "sessionAttributes": {"customer": "42"},
            "agentConfiguration": {"defaultModelId": "model-a", "tools": [{"toolSpec": {"name": "get_weather"}}]}
        }
    });

    let payload = route(&event).unwrap();
    assert_eq!(payload.action_event, ActionEvent::InvokeModel);
    assert_eq!(payload.context.session_attributes["customer"], "42");

    let request: ConverseRequest = serde_json::from_str(payload.text()).unwrap();
    assert_eq!(request.model_id.as_deref(), Some("model-a"));
    assert_eq!(request.tool_config.tools.len(), 1);

    let roles: Vec<_> = request.messages.iter().map(|m| m.role).collect();
    assert_eq!(
        roles,
        vec![
            ConversationRole::User,
            ConversationRole::Assistant,
            ConversationRole::User
        ]
    );
    assert!(matches!(
        request.messages[2].content[0],
        ContentBlock::ToolResult(_)
    ));
}

#[test]
fn test_history_of_finished_turn_alternates() {
    let event = json!({
        "state": "START",
        "input": {"text": "{\"text\":\"and tomorrow?\"}"},
        "context": {
            "session": [{"intermediarySteps": [
                {
                    "orchestrationInput": {"state": "START", "text": "weather today?"},
                    "orchestrationOutput": {"event": "INVOKE_MODEL", "text": "{}"}
                },
                {
                    "orchestrationInput": {
                        "state": "MODEL_INVOKED",
                        "text": "{\"stopReason\":\"end_turn\",\"output\":{\"role\":\"assistant\",\"content\":[{\"text\":\"Sunny.\"}]}}"
                    },
                    "orchestrationOutput": {"event": "FINISH", "text": "Sunny."}
                }
            ]}]
        }
    });

    let payload = route(&event).unwrap();
    let request: ConverseRequest = serde_json::from_str(payload.text()).unwrap();

    assert_eq!(request.messages.len(), 3);
    assert_eq!(request.messages[1].content, vec![ContentBlock::text("Sunny.")]);
    assert_eq!(request.messages[2].content, vec![ContentBlock::text("and tomorrow?")]);
}

#[test]
fn test_routing_is_idempotent() {
    let event = json!({
        "state": "START",
        "input": {"text": "{\"text\":\"hi\"}"},
        "context": {
            "sessionAttributes": {"b": "2", "a": "1"},
            "promptSessionAttributes": {"zone": "UTC", "name": "Ana"},
            "agentConfiguration": {"instruction": "Be brief.", "defaultModelId": "m", "tools": []}
        }
    });

    let first = serde_json::to_string(&route(&event).unwrap()).unwrap();
    let second = serde_json::to_string(&route(&event).unwrap()).unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// Error handling
// =============================================================================

#[test]
fn test_missing_state_or_context_is_structural() {
    let err = route(&json!({"input": {"text": "hi"}, "context": {}})).unwrap_err();
    assert!(matches!(err, OrchestrationError::InvalidEvent(_)));

    let err = route(&json!({"state": "START", "input": {"text": "hi"}})).unwrap_err();
    assert!(matches!(err, OrchestrationError::InvalidEvent(_)));
}

#[test]
fn test_unknown_state_is_rejected() {
    let err = route(&json!({"state": "FINISHED", "input": {"text": "hi"}, "context": {}}))
        .unwrap_err();
    assert!(matches!(err, OrchestrationError::InvalidState(ref s) if s == "FINISHED"));
}

#[test]
fn test_model_output_must_be_json() {
    let err = route(&json!({
        "state": "MODEL_INVOKED",
        "input": {"text": "definitely not json"},
        "context": {}
    }))
    .unwrap_err();
    assert!(matches!(err, OrchestrationError::MalformedPayload { .. }));
    assert_eq!(err.kind(), "malformed_payload");
}

// =============================================================================
// ReWOO strategy
// =============================================================================

fn rewoo_event(state: &str, text: &str, attributes: &Map<String, Value>) -> Value {
    json!({
        "state": state,
        "input": {"text": text},
        "context": {"sessionAttributes": attributes, "agentConfiguration": {"instruction": "Ops agent."}}
    })
}

fn plan_state(attributes: &Map<String, Value>) -> PlanState {
    serde_json::from_str(attributes["state"].as_str().unwrap()).unwrap()
}

#[test]
fn test_rewoo_runs_plan_then_summarizes() {
    let router = Router::new(&RouterConfig::new(StrategyKind::Rewoo));
    let mut attributes = Map::new();
    attributes.insert("lambda".to_string(), json!("arn:aws:lambda:fn"));

    // START -> plan request
    let payload = router
        .route_value(&rewoo_event("START", "{\"text\":\"ship order 7\"}", &attributes))
        .unwrap();
    assert_eq!(payload.action_event, ActionEvent::InvokeModel);
    let attributes = payload.context.session_attributes;

    // MODEL_INVOKED with a plan -> first tool
    let plan = json!({
        "stopReason": "end_turn",
        "output": {"content": [{"text": "<plan>\n<step_1> order=fn::get_order(id=7) </step_1>\n<step_2> fn::ship(order=7, express=\"yes\") </step_2>\n<step_3> return order </step_3>\n</plan>"}]}
    });
    let payload = router
        .route_value(&rewoo_event("MODEL_INVOKED", &plan.to_string(), &attributes))
        .unwrap();
    assert_eq!(payload.action_event, ActionEvent::InvokeTool);
    let block: ContentBlock = serde_json::from_str(payload.text()).unwrap();
    assert_eq!(block.as_tool_use().unwrap().name, "get_order");
    let attributes = payload.context.session_attributes;
    assert_eq!(attributes["lambda"], "arn:aws:lambda:fn");

    // TOOL_INVOKED -> second tool
    let result = "{\"toolResult\":{\"toolUseId\":\"a\",\"content\":[{\"text\":\"{\\\"id\\\":7}\"}]}}";
    let payload = router
        .route_value(&rewoo_event("TOOL_INVOKED", result, &attributes))
        .unwrap();
    assert_eq!(payload.action_event, ActionEvent::InvokeTool);
    let block: ContentBlock = serde_json::from_str(payload.text()).unwrap();
    let tool_use = block.as_tool_use().unwrap();
    assert_eq!(tool_use.name, "ship");
    assert_eq!(tool_use.input["express"], "yes");
    let attributes = payload.context.session_attributes;
    let state = plan_state(&attributes);
    assert_eq!(state.tool_state.parent_tool_result.as_deref(), Some("{\"id\":7}"));

    // TOOL_INVOKED after the last call -> summary request
    let result = "{\"toolResult\":{\"toolUseId\":\"b\",\"content\":[{\"text\":\"shipped\"}]}}";
    let payload = router
        .route_value(&rewoo_event("TOOL_INVOKED", result, &attributes))
        .unwrap();
    assert_eq!(payload.action_event, ActionEvent::InvokeModel);
    let request: ConverseRequest = serde_json::from_str(payload.text()).unwrap();
    let last = request.messages.last().unwrap();
    assert_eq!(last.role, ConversationRole::User);
    assert!(matches!(last.content[0], ContentBlock::ToolResult(_)));
    let attributes = payload.context.session_attributes;
    assert!(plan_state(&attributes).tool_state.is_summary);

    // MODEL_INVOKED with the summary -> finish
    let summary = json!({"stopReason": "end_turn", "output": {"content": [{"text": "Order 7 shipped."}]}});
    let payload = router
        .route_value(&rewoo_event("MODEL_INVOKED", &summary.to_string(), &attributes))
        .unwrap();
    assert_eq!(payload.action_event, ActionEvent::Finish);
    assert_eq!(payload.text(), "Order 7 shipped.");
}

#[test]
fn test_rewoo_skips_loop_steps() {
    let router = Router::new(&RouterConfig::new(StrategyKind::Rewoo));
    let plan = json!({
        "stopReason": "end_turn",
        "output": {"content": [{"text": "<plan><step_1><for expression=\"o in orders\">fn::ship(order=o.id)</for></step_1><step_2> fn::notify(to=ops) </step_2></plan>"}]}
    });

    let payload = router
        .route_value(&rewoo_event("MODEL_INVOKED", &plan.to_string(), &Map::new()))
        .unwrap();
    let block: ContentBlock = serde_json::from_str(payload.text()).unwrap();
    assert_eq!(block.as_tool_use().unwrap().name, "notify");
}

#[test]
fn test_rewoo_is_idempotent() {
    let router = Router::new(&RouterConfig::new(StrategyKind::Rewoo));
    let plan = json!({
        "stopReason": "end_turn",
        "output": {"content": [{"text": "<plan><step_1> fn::lookup(id=1) </step_1></plan>"}]}
    });
    let event = rewoo_event("MODEL_INVOKED", &plan.to_string(), &Map::new());

    let first = router.route_value(&event).unwrap();
    let second = router.route_value(&event).unwrap();
    assert_eq!(first, second);
}

// =============================================================================
// Streaming
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_stream_emits_in_order_with_pauses() {
    let config = RouterConfig::builder()
        .stream_interval(Duration::from_millis(500))
        .build();
    let responder = StreamResponder::new(&config).with_chunks(["one", " two", " three"]);

    let started = tokio::time::Instant::now();
    let payloads: Vec<_> = responder
        .stream(&OrchestrationContext::default())
        .unwrap()
        .collect()
        .await;
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(1000));
    assert!(elapsed < Duration::from_millis(1500));

    let chunks: Vec<String> = payloads
        .iter()
        .map(|payload| {
            assert_eq!(payload.action_event, ActionEvent::InvokeTool);
            let block: ContentBlock = serde_json::from_str(payload.text()).unwrap();
            block.as_tool_use().unwrap().input_text().unwrap().to_string()
        })
        .collect();
    assert_eq!(chunks, vec!["one", " two", " three"]);
}

#[tokio::test(start_paused = true)]
async fn test_dispatch_streams_default_chunks() {
    let router = Router::default();
    let dispatch = router
        .dispatch(&start_event("{\"text\":\"send payload\"}"))
        .unwrap();

    let answer = match dispatch {
        Dispatch::Stream(answer) => answer,
        Dispatch::Action(payload) => panic!("expected stream, got {:?}", payload),
    };

    let payloads: Vec<_> = answer.stream().unwrap().collect().await;
    assert_eq!(payloads.len(), orchestrator_core::streaming::DEFAULT_CHUNKS.len());
    assert!(payloads
        .iter()
        .all(|p| p.action_event == ActionEvent::InvokeTool));
}
