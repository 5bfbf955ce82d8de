//! Load configuration via `config` crate with env-override support.

use std::{ops::Deref, sync::Arc};

use serde::Deserialize;

use crate::{base::prompts, triage::keywords::KeywordSet};

use super::types::Res;

/// Default OpenAI triage model to use.
fn default_openai_model() -> String {
    "gpt-4.1-mini".to_string()
}

/// Default sampling temperature for the triage model.
fn default_openai_temperature() -> f32 {
    0.0
}

/// Default reasoning effort for `o` models.
fn default_openai_reasoning_effort() -> String {
    "low".to_string()
}

/// Default max output tokens for OpenAI model.
fn default_openai_max_tokens() -> u32 {
    1024
}

/// Default per-attempt timeout for OpenAI calls, in seconds.
fn default_openai_timeout_secs() -> u64 {
    30
}

/// Default number of retries after a failed OpenAI call.
fn default_openai_max_retries() -> u32 {
    1
}

/// Default system directive for the triage agent.
fn default_triage_agent_system_directive() -> String {
    prompts::TRIAGE_AGENT_SYSTEM_DIRECTIVE.to_string()
}

/// Upper bound on `openai_max_retries`.
pub const MAX_OPENAI_RETRIES: u32 = 5;

fn default_server_host() -> String {
    "0.0.0.0".to_string()
}

fn default_server_port() -> u16 {
    3001
}

/// Configuration for the support-triage-bot application.
#[derive(Debug, Clone)]
pub struct Config {
    pub inner: Arc<ConfigInner>,
}

impl Deref for Config {
    type Target = ConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl From<ConfigInner> for Config {
    fn from(inner: ConfigInner) -> Self {
        Self { inner: Arc::new(inner) }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConfigInner {
    /// OpenAI API key (`TRIAGE_BOT_OPENAI_API_KEY`).
    /// When empty, the bot runs with the keyword classifier only.
    #[serde(default)]
    pub openai_api_key: String,
    /// OpenAI model used for triage (`TRIAGE_BOT_OPENAI_MODEL`).
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    /// Sampling temperature for non-reasoning models (`TRIAGE_BOT_OPENAI_TEMPERATURE`).
    /// Value between 0 and 2.
    #[serde(default = "default_openai_temperature")]
    pub openai_temperature: f32,
    /// Reasoning effort for `o` models (`TRIAGE_BOT_OPENAI_REASONING_EFFORT`): low, medium, or high.
    #[serde(default = "default_openai_reasoning_effort")]
    pub openai_reasoning_effort: String,
    /// Max output tokens for OpenAI model (`TRIAGE_BOT_OPENAI_MAX_TOKENS`).
    #[serde(default = "default_openai_max_tokens")]
    pub openai_max_tokens: u32,
    /// Timeout for a single OpenAI attempt, in seconds (`TRIAGE_BOT_OPENAI_TIMEOUT_SECS`).
    #[serde(default = "default_openai_timeout_secs")]
    pub openai_timeout_secs: u64,
    /// Retries after the first failed OpenAI attempt (`TRIAGE_BOT_OPENAI_MAX_RETRIES`).
    #[serde(default = "default_openai_max_retries")]
    pub openai_max_retries: u32,
    /// Optional custom system directive to override the default (`TRIAGE_BOT_TRIAGE_AGENT_SYSTEM_DIRECTIVE`).
    #[serde(default = "default_triage_agent_system_directive")]
    pub triage_agent_system_directive: String,
    /// Address the HTTP server binds to (`TRIAGE_BOT_SERVER_HOST`).
    #[serde(default = "default_server_host")]
    pub server_host: String,
    /// Port the HTTP server listens on (`TRIAGE_BOT_SERVER_PORT`).
    #[serde(default = "default_server_port")]
    pub server_port: u16,
    /// Override for the high priority keywords (`TRIAGE_BOT_HIGH_PRIORITY_KEYWORDS`, comma separated).
    #[serde(default)]
    pub high_priority_keywords: Option<Vec<String>>,
    /// Override for the medium priority keywords (`TRIAGE_BOT_MEDIUM_PRIORITY_KEYWORDS`, comma separated).
    #[serde(default)]
    pub medium_priority_keywords: Option<Vec<String>>,
    /// Override for the low priority keywords (`TRIAGE_BOT_LOW_PRIORITY_KEYWORDS`, comma separated).
    #[serde(default)]
    pub low_priority_keywords: Option<Vec<String>>,
}

impl Default for ConfigInner {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_model: default_openai_model(),
            openai_temperature: default_openai_temperature(),
            openai_reasoning_effort: default_openai_reasoning_effort(),
            openai_max_tokens: default_openai_max_tokens(),
            openai_timeout_secs: default_openai_timeout_secs(),
            openai_max_retries: default_openai_max_retries(),
            triage_agent_system_directive: default_triage_agent_system_directive(),
            server_host: default_server_host(),
            server_port: default_server_port(),
            high_priority_keywords: None,
            medium_priority_keywords: None,
            low_priority_keywords: None,
        }
    }
}

/// Environment source: `TRIAGE_BOT_` followed by the upper-cased field name.
fn environment() -> config::Environment {
    config::Environment::default()
        .prefix("TRIAGE_BOT")
        .prefix_separator("_")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("high_priority_keywords")
        .with_list_parse_key("medium_priority_keywords")
        .with_list_parse_key("low_priority_keywords")
}

impl Config {
    pub fn load(explicit_path: Option<&std::path::Path>) -> Res<Self> {
        let mut cfg = config::Config::builder().add_source(environment());

        if let Some(p) = explicit_path {
            cfg = cfg.add_source(config::File::from(p.to_path_buf()));
        } else if std::path::Path::new(".hidden/config.toml").exists() {
            cfg = cfg.add_source(config::File::with_name(".hidden/config.toml"));
        }

        let result = Config {
            inner: Arc::new(cfg.build()?.try_deserialize()?),
        };

        result.validate()?;

        Ok(result)
    }

    /// Check value ranges that serde cannot express.
    pub fn validate(&self) -> Res<()> {
        if self.openai_temperature < 0.0 || self.openai_temperature > 2.0 {
            return Err(anyhow::anyhow!("OpenAI temperature must be between 0 and 2."));
        }

        if self.openai_max_tokens < 1 || self.openai_max_tokens > 128000 {
            return Err(anyhow::anyhow!("OpenAI max tokens must be between 1 and 128000."));
        }

        if self.openai_timeout_secs == 0 {
            return Err(anyhow::anyhow!("OpenAI timeout must be at least one second."));
        }

        if self.openai_max_retries > MAX_OPENAI_RETRIES {
            return Err(anyhow::anyhow!("OpenAI max retries must be at most {MAX_OPENAI_RETRIES}."));
        }

        if !["low", "medium", "high"].contains(&self.openai_reasoning_effort.to_lowercase().as_str()) {
            return Err(anyhow::anyhow!("OpenAI reasoning effort must be one of: low, medium, high."));
        }

        Ok(())
    }

    /// Whether an LLM can be used for primary classification.
    pub fn has_llm(&self) -> bool {
        !self.openai_api_key.trim().is_empty()
    }

    /// Build the keyword buckets, applying any configured overrides over the canonical set.
    pub fn keyword_set(&self) -> KeywordSet {
        let canonical = KeywordSet::default();

        KeywordSet::new(
            self.high_priority_keywords.clone().unwrap_or(canonical.high),
            self.medium_priority_keywords.clone().unwrap_or(canonical.medium),
            self.low_priority_keywords.clone().unwrap_or(canonical.low),
        )
    }
}
