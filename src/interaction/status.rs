//! Health and index endpoints.

use axum::{Json, extract::State};
use serde_json::{Value, json};

use crate::{
    runtime::Runtime,
    service::server::{A2A_AGENT_PATH, HEALTH_PATH, WORKFLOW_PATH},
    triage::format::timestamp,
};

pub const SERVICE_NAME: &str = "support-triage-bot";

/// Liveness check.
pub async fn health(State(runtime): State<Runtime>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "timestamp": timestamp(),
        "strategies": runtime.triage.strategy_names(),
        "message": "A2A Server is running!",
    }))
}

/// Endpoint listing.
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "Support Triage Bot A2A Server",
        "endpoints": {
            "health": HEALTH_PATH,
            "a2a": A2A_AGENT_PATH,
            "workflow": WORKFLOW_PATH,
        }
    }))
}
