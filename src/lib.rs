//! Library root for `support-triage-bot`.
//!
//! Support-triage-bot classifies incoming support messages for the Telex chat-ops
//! platform (over the A2A protocol), and is designed to:
//! - Decide whether a message needs urgent attention
//! - Assign a priority level (low, medium, high)
//! - Suggest reactions and replies for the chat-ops integration
//!
//! Classification goes to OpenAI first, and falls back to deterministic keyword
//! matching whenever the model fails, times out, or answers with something that is
//! not a valid verdict.  The architecture is built around extensible traits that
//! allow for different implementations of each strategy and service.

pub mod base;
pub mod interaction;
pub mod runtime;
pub mod service;
pub mod triage;

use base::{config::Config, types::Void};
use rustls::crypto;
use tracing::{info, warn};

/// Public async entry for the binary crate.
///
/// Sets up necessary services and starts the support-triage-bot runtime:
/// - Initializes the crypto provider
/// - Creates the runtime context with the LLM client and triage dispatcher
/// - Serves the HTTP endpoints
pub async fn start(config: Config) -> Void {
    info!("Starting support-triage-bot ...");

    install_crypto_provider();

    // Initialize the runtime.
    let runtime = runtime::Runtime::new(config)?;

    // Start the runtime.
    runtime.start().await?;

    Ok(())
}

/// Install the process-wide TLS crypto provider used by the OpenAI client.
pub fn install_crypto_provider() {
    if crypto::ring::default_provider().install_default().is_err() {
        warn!("A crypto provider was already installed.");
    }
}
