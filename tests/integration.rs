#![cfg(test)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use mockall::mock;
use serde_json::{Value, json};
use support_triage_bot::{
    base::{
        config::{Config, ConfigInner},
        types::Res,
    },
    runtime::Runtime,
    service::{
        llm::{GenericLlmClient, LlmClient},
        server::{A2A_AGENT_PATH, HEALTH_PATH, WORKFLOW_PATH, router},
    },
};
use tower::ServiceExt;

// Mocks.

mock! {
    pub Llm {}

    #[async_trait]
    impl GenericLlmClient for Llm {
        async fn get_triage_agent_response(&self, message: &str) -> Res<String>;
    }
}

fn get_mock_llm(response: fn() -> Res<String>) -> LlmClient {
    let mut mock = MockLlm::new();
    mock.expect_get_triage_agent_response().returning(move |_| response());
    LlmClient::new(Arc::new(mock))
}

/// Helper function to setup the test environment.
fn setup_test_router(llm: Option<LlmClient>) -> Router {
    let config = Config::from(ConfigInner {
        openai_api_key: "test_key".to_string(),
        ..Default::default()
    });

    router(Runtime::with_llm(config, llm))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("Request failed");
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("Failed to read body");

    (status, serde_json::from_slice(&bytes).expect("Body is not JSON"))
}

fn post_json(path: &str, body: Value) -> Request<Body> {
    Request::post(path).header("content-type", "application/json").body(Body::from(body.to_string())).unwrap()
}

fn message_send(id: Value, text: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "message/send",
        "params": {
            "message": {
                "kind": "message",
                "role": "user",
                "messageId": "msg-1",
                "contextId": "ctx-1",
                "parts": [{ "kind": "text", "text": text }]
            }
        }
    })
}

// Tests.

#[tokio::test]
async fn test_health() {
    let (status, body) = send(setup_test_router(None), Request::get(HEALTH_PATH).body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["strategies"], json!(["keyword"]));
}

#[tokio::test]
async fn test_index_lists_endpoints() {
    let (status, body) = send(setup_test_router(None), Request::get("/").body(Body::empty()).unwrap()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"]["a2a"], A2A_AGENT_PATH);
}

#[tokio::test]
async fn test_chat_request_uses_keyword_fallback_when_llm_fails() {
    let app = setup_test_router(Some(get_mock_llm(|| Err(anyhow::anyhow!("OpenAI API call timed out")))));

    let body = json!({
        "messages": [
            { "role": "user", "content": "hello" },
            { "role": "user", "content": "Our system is broken and customers can't login" }
        ]
    });

    let (status, body) = send(app, post_json(A2A_AGENT_PATH, body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], "agent_response");
    assert_eq!(body["metadata"]["strategy"], "keyword");
    assert_eq!(body["metadata"]["visual_indicator"], "🔴");
    assert_eq!(body["metadata"]["actions"], json!(["add_red_circle_reaction", "post_urgent_thread_reply"]));
    assert_eq!(body["metadata"]["triage_decision"]["priority_level"], "high");

    let content: Value = serde_json::from_str(body["content"].as_str().unwrap()).unwrap();
    assert_eq!(content["needs_urgent_triage"], true);
    assert!(content["keywords_found"].as_array().unwrap().contains(&json!("broken")));
}

#[tokio::test]
async fn test_chat_request_uses_valid_llm_verdict() {
    let app = setup_test_router(Some(get_mock_llm(|| {
        Ok(r#"{"needs_urgent_triage": false, "priority_level": "medium", "suggested_actions": ["add_yellow_circle_reaction"], "reason": "Login trouble", "keywords_found": []}"#.to_string())
    })));

    let body = json!({ "messages": [{ "role": "user", "content": "Customers can't login" }] });

    let (status, body) = send(app, post_json(A2A_AGENT_PATH, body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["metadata"]["strategy"], "llm");
    assert_eq!(body["metadata"]["visual_indicator"], "🟡");
    assert_eq!(body["metadata"]["summary"], "Priority: MEDIUM | Urgent: NO | Keywords: 0");
}

#[tokio::test]
async fn test_chat_request_rejects_empty_messages() {
    let (status, body) = send(setup_test_router(None), post_json(A2A_AGENT_PATH, json!({ "messages": [] }))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid message format");
}

#[tokio::test]
async fn test_chat_request_rejects_non_string_content() {
    let body = json!({ "messages": [{ "role": "user", "content": 42 }] });

    let (status, body) = send(setup_test_router(None), post_json(A2A_AGENT_PATH, body)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid message content");
}

#[tokio::test]
async fn test_json_rpc_message_send() {
    let app = setup_test_router(Some(get_mock_llm(|| Ok("not json at all".to_string()))));

    let (status, body) = send(app, post_json(A2A_AGENT_PATH, message_send(json!("req-1"), "Thanks for the help, great feature idea"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["jsonrpc"], "2.0");
    assert_eq!(body["id"], "req-1");
    assert!(body.get("error").is_none());

    let result = &body["result"];
    assert_eq!(result["role"], "agent");
    assert_eq!(result["contextId"], "ctx-1");
    assert_eq!(result["metadata"]["strategy"], "keyword");
    assert_eq!(result["metadata"]["visual_indicator"], "🟡");
    assert_eq!(result["parts"][1]["kind"], "data");
    assert_eq!(result["parts"][1]["data"]["priority_level"], "medium");
    assert_eq!(result["parts"][1]["data"]["needs_urgent_triage"], false);
}

#[tokio::test]
async fn test_json_rpc_unknown_method() {
    let body = json!({ "jsonrpc": "2.0", "id": 3, "method": "tasks/cancel", "params": {} });

    let (_, body) = send(setup_test_router(None), post_json(A2A_AGENT_PATH, body)).await;

    assert_eq!(body["id"], 3);
    assert_eq!(body["error"]["code"], -32601);
}

#[tokio::test]
async fn test_json_rpc_wrong_version_is_invalid_request() {
    let body = json!({ "jsonrpc": "1.0", "id": 1, "method": "message/send" });

    let (_, body) = send(setup_test_router(None), post_json(A2A_AGENT_PATH, body)).await;

    assert_eq!(body["id"], 1);
    assert_eq!(body["error"]["code"], -32600);
}

#[tokio::test]
async fn test_json_rpc_missing_method_is_invalid_request() {
    let body = json!({ "jsonrpc": "2.0", "id": "req-2", "params": {} });

    let (_, body) = send(setup_test_router(None), post_json(A2A_AGENT_PATH, body)).await;

    assert_eq!(body["id"], "req-2");
    assert_eq!(body["error"]["code"], -32600);
}

#[tokio::test]
async fn test_json_rpc_without_text_is_invalid_params() {
    let (_, body) = send(setup_test_router(None), post_json(A2A_AGENT_PATH, message_send(json!(4), "   "))).await;

    assert_eq!(body["error"]["code"], -32602);
}

#[tokio::test]
async fn test_malformed_body_is_parse_error() {
    let request = Request::post(A2A_AGENT_PATH).header("content-type", "application/json").body(Body::from("{not json")).unwrap();

    let (_, body) = send(setup_test_router(None), request).await;

    assert_eq!(body["error"]["code"], -32700);
    assert_eq!(body["id"], Value::Null);
}

#[tokio::test]
async fn test_workflow_empty_message() {
    let (status, body) = send(setup_test_router(None), post_json(WORKFLOW_PATH, json!({ "message": "" }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["actions"], json!(["add_green_circle_reaction"]));
    assert_eq!(body["visual_indicator"], "🟢");
    assert_eq!(body["summary"], "Priority: LOW | Urgent: NO | Keywords: 0");
    assert!(body["metadata"]["response_id"].as_str().unwrap().starts_with("tri_"));

    let telex: Value = serde_json::from_str(body["telex_response"].as_str().unwrap()).unwrap();
    assert_eq!(telex["priority_level"], "low");
}
