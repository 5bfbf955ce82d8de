//! The A2A agent endpoint used by Telex.
//!
//! The endpoint accepts two request shapes on the same path:
//! - JSON-RPC 2.0 (`message/send`), detected by the presence of a `jsonrpc` key;
//!   see [`super::json_rpc`].
//! - A chat-style body carrying a `messages` array, where the last message's
//!   `content` is triaged.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use crate::{
    base::types::{TriageVerdict, VisualIndicator},
    interaction::{json_rpc, triage},
    runtime::Runtime,
    triage::format::timestamp,
};

/// Name this agent reports in responses.
pub const AGENT_NAME: &str = "supportTriageAgent";

// Types.

/// Response to a chat-style A2A request.
#[derive(Debug, Serialize, Deserialize)]
pub struct AgentResponse {
    #[serde(rename = "type")]
    pub kind: String,
    /// JSON rendering of the triage payload.
    pub content: String,
    pub metadata: AgentResponseMetadata,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct AgentResponseMetadata {
    pub agent: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub triage_decision: Option<TriageVerdict>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_indicator: Option<VisualIndicator>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

/// Body of a rejected chat-style request.
#[derive(Debug, Serialize, Deserialize)]
pub struct BadRequest {
    pub error: String,
    pub details: String,
}

impl BadRequest {
    fn response(error: &str, details: &str) -> Response {
        let body = BadRequest {
            error: error.to_string(),
            details: details.to_string(),
        };

        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

// Handlers.

/// Handle a request on the A2A agent endpoint.
#[instrument(skip_all)]
pub async fn handle_a2a_request(State(runtime): State<Runtime>, body: Bytes) -> Response {
    info!("Received A2A request ...");

    let value: Value = match serde_json::from_slice(&body) {
        Ok(value) => value,
        Err(err) => {
            warn!("A2A request body is not JSON: {err}");
            return Json(json_rpc::JsonRpcResponse::parse_error(&err)).into_response();
        }
    };

    if value.get("jsonrpc").is_some() {
        return Json(json_rpc::handle_json_rpc(&runtime, value).await).into_response();
    }

    handle_chat_request(&runtime, &value).await
}

/// Handle a chat-style request carrying a `messages` array.
#[instrument(skip_all)]
async fn handle_chat_request(runtime: &Runtime, value: &Value) -> Response {
    let Some(latest) = value.get("messages").and_then(Value::as_array).and_then(|messages| messages.last()) else {
        return BadRequest::response("Invalid message format", "Messages array is required and cannot be empty");
    };

    let Some(user_message) = latest.get("content").and_then(Value::as_str).filter(|c| !c.is_empty()) else {
        return BadRequest::response("Invalid message content", "Message content must be a non-empty string");
    };

    match triage::run(&runtime.triage, user_message).await {
        Ok(outcome) => {
            let formatted = outcome.formatted;

            info!("Sending response to Telex: {}", formatted.summary);

            let metadata = AgentResponseMetadata {
                agent: AGENT_NAME.to_string(),
                timestamp: formatted.timestamp().to_string(),
                triage_decision: Some(formatted.payload.verdict.clone()),
                visual_indicator: Some(formatted.visual_indicator),
                summary: Some(formatted.summary.clone()),
                actions: Some(formatted.actions.clone()),
                response_id: Some(formatted.response_id().to_string()),
                strategy: Some(outcome.strategy.to_string()),
                error: false,
            };

            Json(AgentResponse {
                kind: "agent_response".to_string(),
                content: formatted.telex_response,
                metadata,
            })
            .into_response()
        }
        Err(err) => {
            error!("Error while triaging: {err}");
            Json(unavailable_response()).into_response()
        }
    }
}

/// The response sent when triage could not run.
pub fn unavailable_response() -> AgentResponse {
    let content = serde_json::to_string(&TriageVerdict::unavailable()).unwrap_or_default();

    AgentResponse {
        kind: "agent_response".to_string(),
        content,
        metadata: AgentResponseMetadata {
            agent: AGENT_NAME.to_string(),
            timestamp: timestamp(),
            error: true,
            ..Default::default()
        },
    }
}
