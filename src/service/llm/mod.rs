pub mod openai;

use std::ops::Deref;
use std::sync::Arc;

use async_trait::async_trait;

use crate::base::types::Res;

// Traits.

/// Generic LLM client trait that clients must implement.
///
/// This trait defines the core functionality for interacting with large language models.
/// Implementing this trait allows different LLM providers to back the primary triage strategy.
#[async_trait]
pub trait GenericLlmClient: Send + Sync + 'static {
    /// Ask the triage agent to classify a support message.
    ///
    /// Returns the raw text produced by the model, which is expected (but not guaranteed)
    /// to be a JSON triage verdict.  Validation is left to the caller.
    async fn get_triage_agent_response(&self, message: &str) -> Res<String>;
}

// Structs.

/// LLM client for the application.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct LlmClient {
    inner: Arc<dyn GenericLlmClient>,
}

impl Deref for LlmClient {
    type Target = dyn GenericLlmClient;

    fn deref(&self) -> &Self::Target {
        &*self.inner
    }
}

impl LlmClient {
    pub fn new(inner: Arc<dyn GenericLlmClient>) -> Self {
        Self { inner }
    }
}
