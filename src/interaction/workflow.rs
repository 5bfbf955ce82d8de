//! The support triage workflow: analyze a message, then format it for Telex.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, instrument};

use crate::{base::types::VisualIndicator, interaction::triage, runtime::Runtime};

/// Input of the workflow.
#[derive(Debug, Serialize, Deserialize)]
pub struct WorkflowInput {
    /// The support message from Telex.
    pub message: String,
}

/// Output of the workflow.
#[derive(Debug, Serialize, Deserialize)]
pub struct WorkflowOutput {
    pub telex_response: String,
    pub actions: Vec<String>,
    pub visual_indicator: VisualIndicator,
    pub summary: String,
    pub metadata: WorkflowMetadata,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct WorkflowMetadata {
    pub response_id: String,
    pub timestamp: String,
    pub processing_time_ms: u64,
}

/// Run the workflow for a single message.
#[instrument(skip_all)]
pub async fn handle_workflow_request(State(runtime): State<Runtime>, Json(input): Json<WorkflowInput>) -> Response {
    match triage::run(&runtime.triage, &input.message).await {
        Ok(outcome) => {
            let formatted = outcome.formatted;

            let metadata = WorkflowMetadata {
                response_id: formatted.response_id().to_string(),
                timestamp: formatted.timestamp().to_string(),
                processing_time_ms: outcome.processing_time_ms,
            };

            Json(WorkflowOutput {
                telex_response: formatted.telex_response,
                actions: formatted.actions,
                visual_indicator: formatted.visual_indicator,
                summary: formatted.summary,
                metadata,
            })
            .into_response()
        }
        Err(err) => {
            error!("Workflow failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "Triage is temporarily unavailable" }))).into_response()
        }
    }
}
