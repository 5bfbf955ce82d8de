//! Classification strategies and the dispatcher that chains them.
//!
//! The dispatcher tries each strategy in order and returns the first verdict that
//! passes validation.  In the default setup the LLM strategy goes first and the
//! keyword strategy last; the keyword strategy never fails, so a verdict is always
//! produced.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tracing::{info, instrument, warn};

use crate::{
    base::types::{PriorityLevel, Res, TriageVerdict},
    service::llm::LlmClient,
    triage::keywords::KeywordSet,
};

// Traits.

/// A way of turning a support message into a triage verdict.
#[async_trait]
pub trait TriageStrategy: Send + Sync + 'static {
    /// Short name used in logs and response metadata.
    fn name(&self) -> &'static str;

    /// Classify a message, or fail so the next strategy can take over.
    async fn classify(&self, message: &str) -> Res<TriageVerdict>;
}

// Strategies.

/// Primary strategy: ask the LLM triage agent and validate its answer.
pub struct LlmTriageStrategy {
    llm: LlmClient,
}

impl LlmTriageStrategy {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl TriageStrategy for LlmTriageStrategy {
    fn name(&self) -> &'static str {
        "llm"
    }

    #[instrument(name = "LlmTriageStrategy::classify", skip_all)]
    async fn classify(&self, message: &str) -> Res<TriageVerdict> {
        let text = self.llm.get_triage_agent_response(message).await?;
        parse_verdict(&text)
    }
}

/// Fallback strategy: deterministic keyword matching.
pub struct KeywordTriageStrategy {
    keywords: KeywordSet,
}

impl KeywordTriageStrategy {
    pub fn new(keywords: KeywordSet) -> Self {
        Self { keywords }
    }
}

#[async_trait]
impl TriageStrategy for KeywordTriageStrategy {
    fn name(&self) -> &'static str {
        "keyword"
    }

    async fn classify(&self, message: &str) -> Res<TriageVerdict> {
        Ok(self.keywords.classify(message))
    }
}

// Dispatcher.

/// A verdict along with the strategy that produced it.
#[derive(Debug, Clone)]
pub struct Triage {
    pub verdict: TriageVerdict,
    pub strategy: &'static str,
}

/// Ordered list of strategies.
///
/// This is trivially cloneable and can be passed around without the need for `Arc` or `Mutex`.
#[derive(Clone)]
pub struct TriageDispatcher {
    strategies: Arc<Vec<Arc<dyn TriageStrategy>>>,
}

impl TriageDispatcher {
    pub fn new(strategies: Vec<Arc<dyn TriageStrategy>>) -> Self {
        Self { strategies: Arc::new(strategies) }
    }

    /// The standard chain: the LLM (when available) followed by the keyword fallback.
    pub fn standard(llm: Option<LlmClient>, keywords: KeywordSet) -> Self {
        let mut strategies: Vec<Arc<dyn TriageStrategy>> = Vec::new();

        if let Some(llm) = llm {
            strategies.push(Arc::new(LlmTriageStrategy::new(llm)));
        }

        strategies.push(Arc::new(KeywordTriageStrategy::new(keywords)));

        Self::new(strategies)
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Run the strategies in order until one succeeds.
    #[instrument(name = "TriageDispatcher::triage", skip_all)]
    pub async fn triage(&self, message: &str) -> Res<Triage> {
        for strategy in self.strategies.iter() {
            match strategy.classify(message).await {
                Ok(verdict) => {
                    info!(strategy = strategy.name(), priority = %verdict.priority_level, urgent = verdict.needs_urgent_triage, "Message triaged");
                    return Ok(Triage { verdict, strategy: strategy.name() });
                }
                Err(err) => {
                    warn!(strategy = strategy.name(), "Triage strategy failed, trying the next one: {err}");
                }
            }
        }

        Err(anyhow::anyhow!("Every triage strategy failed."))
    }
}

// Validation.

static JSON_FENCE: OnceLock<Regex> = OnceLock::new();

fn json_fence() -> &'static Regex {
    JSON_FENCE.get_or_init(|| Regex::new(r"```json\s*([\s\S]*?)\s*```").expect("valid fence regex"))
}

/// Model output shape.  Every field is required, unlike [`TriageVerdict`].
#[derive(Deserialize)]
struct ModelVerdict {
    needs_urgent_triage: bool,
    priority_level: PriorityLevel,
    suggested_actions: Vec<String>,
    reason: String,
    keywords_found: Vec<String>,
}

impl From<ModelVerdict> for TriageVerdict {
    fn from(v: ModelVerdict) -> Self {
        Self {
            needs_urgent_triage: v.needs_urgent_triage,
            priority_level: v.priority_level,
            suggested_actions: v.suggested_actions,
            reason: v.reason,
            keywords_found: v.keywords_found,
        }
    }
}

fn from_json(text: &str) -> serde_json::Result<TriageVerdict> {
    serde_json::from_str::<ModelVerdict>(text).map(TriageVerdict::from)
}

/// Parse and validate model output as a triage verdict.
///
/// Accepts, in order: the whole text as JSON, the body of a fenced ```json block, or the
/// span between the first `{` and the last `}`.  All five verdict fields must be present.
pub fn parse_verdict(text: &str) -> Res<TriageVerdict> {
    let text = text.trim();

    if let Ok(verdict) = from_json(text) {
        return Ok(verdict);
    }

    if let Some(body) = json_fence().captures(text).and_then(|c| c.get(1))
        && let Ok(verdict) = from_json(body.as_str())
    {
        return Ok(verdict);
    }

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}'))
        && start < end
    {
        return from_json(&text[start..=end]).map_err(|e| anyhow::anyhow!("Model output is not a valid triage verdict: {e}"));
    }

    Err(anyhow::anyhow!("No JSON object found in model output."))
}

// Tests.
