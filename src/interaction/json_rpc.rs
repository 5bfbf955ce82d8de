//! JSON-RPC 2.0 framing for the A2A `message/send` method.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, instrument, warn};

use crate::{
    base::types::VisualIndicator,
    interaction::triage::{self, TriageOutcome},
    runtime::Runtime,
    triage::TelexPayload,
};

pub const PARSE_ERROR: i32 = -32700;
pub const INVALID_REQUEST: i32 = -32600;
pub const METHOD_NOT_FOUND: i32 = -32601;
pub const INVALID_PARAMS: i32 = -32602;
pub const INTERNAL_ERROR: i32 = -32603;

// Envelope.

/// JSON-RPC request structure.
#[derive(Debug, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

/// JSON-RPC response structure.
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    pub id: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    pub fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(id: Value, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    pub fn parse_error(err: &serde_json::Error) -> Self {
        Self::error(Value::Null, PARSE_ERROR, format!("Parse error: {err}"))
    }
}

// A2A message types.

/// Params of `message/send`.
#[derive(Debug, Deserialize)]
pub struct MessageSendParams {
    pub message: A2aMessage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct A2aMessage {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Value>,
    #[serde(default)]
    pub message_id: Option<String>,
    #[serde(default)]
    pub context_id: Option<String>,
    #[serde(default)]
    pub task_id: Option<String>,
}

impl A2aMessage {
    /// Join the text parts of the message.  Parts are tagged by `kind` (or `type`);
    /// untagged parts with a `text` field count as text.
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter(|part| {
                let kind = part.get("kind").or_else(|| part.get("type")).and_then(Value::as_str);
                kind.is_none_or(|k| k == "text")
            })
            .filter_map(|part| part.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// The agent's reply message.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentMessage {
    pub kind: &'static str,
    pub role: &'static str,
    pub message_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    pub parts: Vec<AgentPart>,
    pub metadata: AgentMessageMetadata,
}

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AgentPart {
    Text { text: String },
    Data { data: TelexPayload },
}

#[derive(Debug, Serialize)]
pub struct AgentMessageMetadata {
    pub visual_indicator: VisualIndicator,
    pub summary: String,
    pub actions: Vec<String>,
    pub telex_actions: Vec<String>,
    pub strategy: &'static str,
    pub processing_time_ms: u64,
}

impl AgentMessage {
    fn from_outcome(outcome: TriageOutcome, request: &A2aMessage) -> Self {
        let formatted = outcome.formatted;

        Self {
            kind: "message",
            role: "agent",
            message_id: formatted.response_id().to_string(),
            context_id: request.context_id.clone(),
            task_id: request.task_id.clone(),
            metadata: AgentMessageMetadata {
                visual_indicator: formatted.visual_indicator,
                summary: formatted.summary,
                actions: formatted.actions,
                telex_actions: formatted.telex_actions,
                strategy: outcome.strategy,
                processing_time_ms: outcome.processing_time_ms,
            },
            parts: vec![AgentPart::Text { text: formatted.telex_response }, AgentPart::Data { data: formatted.payload }],
        }
    }
}

// Dispatch.

/// Handle a JSON-RPC request that has already been parsed as JSON.
#[instrument(skip_all)]
pub async fn handle_json_rpc(runtime: &Runtime, value: Value) -> JsonRpcResponse {
    let id = value.get("id").cloned().unwrap_or(Value::Null);

    let request: JsonRpcRequest = match serde_json::from_value(value) {
        Ok(request) => request,
        Err(err) => return JsonRpcResponse::error(id, INVALID_REQUEST, format!("Invalid request: {err}")),
    };

    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::error(id, INVALID_REQUEST, "Invalid request: jsonrpc must be \"2.0\"");
    }

    let id = request.id.unwrap_or(Value::Null);

    match request.method.as_str() {
        "message/send" => handle_message_send(runtime, id, request.params).await,
        method => {
            warn!("Unknown JSON-RPC method: {method}");
            JsonRpcResponse::error(id, METHOD_NOT_FOUND, format!("Method not found: {method}"))
        }
    }
}

async fn handle_message_send(runtime: &Runtime, id: Value, params: Value) -> JsonRpcResponse {
    let params: MessageSendParams = match serde_json::from_value(params) {
        Ok(params) => params,
        Err(err) => return JsonRpcResponse::error(id, INVALID_PARAMS, format!("Invalid params: {err}")),
    };

    let text = params.message.text();

    if text.trim().is_empty() {
        return JsonRpcResponse::error(id, INVALID_PARAMS, "Invalid params: message has no text parts");
    }

    let outcome = match triage::run(&runtime.triage, &text).await {
        Ok(outcome) => outcome,
        Err(err) => {
            error!("Error while triaging: {err}");
            return JsonRpcResponse::error(id, INTERNAL_ERROR, "Triage is temporarily unavailable");
        }
    };

    let message = AgentMessage::from_outcome(outcome, &params.message);

    match serde_json::to_value(&message) {
        Ok(result) => JsonRpcResponse::success(id, result),
        Err(err) => JsonRpcResponse::error(id, INTERNAL_ERROR, format!("Failed to serialize response: {err}")),
    }
}
