//! Runtime services and shared state for the support-triage-bot.

use tracing::{info, instrument, warn};

use crate::{
    base::{
        config::Config,
        types::{Res, Void},
    },
    service::{llm::LlmClient, server},
    triage::TriageDispatcher,
};

/// Runtime service context that can be shared across the application.
///
/// This struct holds the configuration and the triage dispatcher, which owns the LLM client.
/// It is designed to be trivially cloneable, allowing it to be passed around
/// without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct Runtime {
    /// The configuration for the application.
    pub config: Config,
    /// The classification chain used by every entry point.
    pub triage: TriageDispatcher,
}

impl Runtime {
    /// Create a new runtime instance.
    #[instrument(skip_all)]
    pub fn new(config: Config) -> Res<Self> {
        let llm = if config.has_llm() {
            Some(LlmClient::openai(&config))
        } else {
            warn!("No OpenAI API key configured; triage will use keyword matching only.");
            None
        };

        Ok(Self::with_llm(config, llm))
    }

    /// Create a runtime around an existing LLM client (or none).
    pub fn with_llm(config: Config, llm: Option<LlmClient>) -> Self {
        let triage = TriageDispatcher::standard(llm, config.keyword_set());

        info!("Triage strategies: {:?}", triage.strategy_names());

        Self { config, triage }
    }

    /// Serve the HTTP endpoints until shutdown.
    pub async fn start(&self) -> Void {
        server::serve(self.clone()).await
    }
}
