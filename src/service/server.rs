//! HTTP server exposing the triage agent.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, instrument};

use crate::{
    base::types::Void,
    interaction::{a2a, status, workflow},
    runtime::Runtime,
};

pub const HEALTH_PATH: &str = "/health";
pub const A2A_AGENT_PATH: &str = "/a2a/agent/supportTriageAgent";
pub const WORKFLOW_PATH: &str = "/workflows/support-triage";

/// Build the router for all endpoints.
pub fn router(runtime: Runtime) -> Router {
    Router::new()
        .route("/", get(status::index))
        .route(HEALTH_PATH, get(status::health))
        .route(A2A_AGENT_PATH, post(a2a::handle_a2a_request))
        .route(WORKFLOW_PATH, post(workflow::handle_workflow_request))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(runtime)
}

/// Bind and serve until Ctrl-C.
#[instrument(skip_all)]
pub async fn serve(runtime: Runtime) -> Void {
    let addr = format!("{}:{}", runtime.config.server_host, runtime.config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("A2A server listening on {addr}");
    info!("A2A endpoint: http://{addr}{A2A_AGENT_PATH}");

    axum::serve(listener, router(runtime))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("Shutting down ...");
        })
        .await?;

    Ok(())
}
