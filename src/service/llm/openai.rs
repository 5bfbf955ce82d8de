//! OpenAI implementation of the triage agent.
//!
//! The agent is a single Responses API call constrained to a strict JSON schema
//! matching the triage verdict.  Calls are bounded by a per-attempt timeout and
//! retried with exponential backoff.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ReasoningEffort,
        responses::{
            Content, CreateResponseArgs, Input, InputItem, InputMessageArgs, OutputContent, ReasoningConfigArgs, Response, ResponseFormatJsonSchema, Role, TextConfig,
            TextResponseFormat,
        },
    },
};
use async_trait::async_trait;
use tokio::time::timeout;
use tracing::{info, instrument, warn};

use crate::base::{config::Config, prompts::triage_user_prompt, types::Res};

use super::{GenericLlmClient, LlmClient};

const RETRY_DELAY_MS: u64 = 500;
const MAX_RETRY_DELAY_MS: u64 = 8_000;

// Extra methods on `LlmClient` applied by the openai implementation.

impl LlmClient {
    pub fn openai(config: &Config) -> Self {
        let client = OpenAiLlmClient::new(config);
        Self { inner: Arc::new(client) }
    }
}

// Specific implementations.

/// OpenAI LLM client implementation.
#[derive(Clone)]
pub struct OpenAiLlmClient {
    client: Client<OpenAIConfig>,
    config: Config,
}

impl OpenAiLlmClient {
    /// Create a new OpenAI LLM client.
    #[instrument(name = "OpenAiLlmClient::new", skip_all)]
    pub fn new(config: &Config) -> Self {
        let cfg = OpenAIConfig::new().with_api_key(config.openai_api_key.clone());

        Self {
            client: Client::with_config(cfg),
            config: config.clone(),
        }
    }

    /// Build the triage agent input.
    fn build_triage_agent_input(&self, message: &str) -> Res<Input> {
        Ok(Input::Items(vec![InputItem::Message(
            InputMessageArgs::default().role(Role::User).content(triage_user_prompt(message)).build()?,
        )]))
    }

    /// Build the request, applying temperature or reasoning effort depending on the model family.
    fn build_request(&self, message: &str) -> Res<CreateResponseArgs> {
        let mut request = CreateResponseArgs::default();
        request
            .instructions(self.config.triage_agent_system_directive.clone())
            .max_output_tokens(self.config.openai_max_tokens)
            .model(&self.config.openai_model)
            .text(get_openai_text_config().clone())
            .input(self.build_triage_agent_input(message)?);

        // Add the temperature for the non-reasoning models.
        if self.config.openai_model.starts_with("gpt") {
            request.temperature(self.config.openai_temperature);
        }

        // Add the reasoning effort for `o` models.
        if self.config.openai_model.starts_with('o') {
            let reasoning_effort = parse_openai_reasoning_effort(&self.config.openai_reasoning_effort)?;
            request.reasoning(ReasoningConfigArgs::default().effort(reasoning_effort).build()?);
        }

        Ok(request)
    }

    /// Make an OpenAI API call with retry logic and timeout handling.
    async fn call_openai_api(&self, request_builder: CreateResponseArgs) -> Res<Response> {
        let max_retries = self.config.openai_max_retries;
        let timeout_duration = Duration::from_secs(self.config.openai_timeout_secs);

        let mut retries = 0;

        loop {
            let request = request_builder.build()?;
            let result = timeout(timeout_duration, self.client.responses().create(request)).await;

            match result {
                Ok(Ok(response)) => {
                    info!("OpenAI API call succeeded after {} attempts", retries + 1);
                    return Ok(response);
                }
                Ok(Err(err)) => {
                    if retries >= max_retries {
                        return Err(anyhow::anyhow!("OpenAI API call failed after {max_retries} retries: {err}"));
                    }
                    retries += 1;
                    warn!("OpenAI API call failed, retrying {retries}/{max_retries}: {err}");
                }
                Err(_) => {
                    if retries >= max_retries {
                        return Err(anyhow::anyhow!("OpenAI API call timed out after {} attempts", max_retries + 1));
                    }
                    retries += 1;
                    warn!("OpenAI API call timed out, retrying {retries}/{max_retries}");
                }
            }

            tokio::time::sleep(retry_delay(retries)).await;
        }
    }
}

#[async_trait]
impl GenericLlmClient for OpenAiLlmClient {
    #[instrument(name = "OpenAiLlmClient::get_triage_agent_response", skip_all)]
    async fn get_triage_agent_response(&self, message: &str) -> Res<String> {
        let request = self.build_request(message)?;
        let response = self.call_openai_api(request).await?;

        let texts = parse_openai_response(&response)?;

        if texts.is_empty() {
            return Err(anyhow::anyhow!("OpenAI response contained no text output."));
        }

        Ok(texts.join("\n"))
    }
}

/// Exponential backoff before the given retry (1-based), capped at `MAX_RETRY_DELAY_MS`.
fn retry_delay(retry: u32) -> Duration {
    let factor = 2_u64.checked_pow(retry.saturating_sub(1)).unwrap_or(u64::MAX);
    Duration::from_millis(RETRY_DELAY_MS.saturating_mul(factor).min(MAX_RETRY_DELAY_MS))
}

/// Collect the text outputs of an OpenAI response.
#[instrument(skip_all)]
pub fn parse_openai_response(response: &Response) -> Res<Vec<String>> {
    let mut result = Vec::new();

    info!("LLM response has {} outputs.", response.output.len());
    for output in &response.output {
        match output {
            OutputContent::Message(message) => {
                for message_content in &message.content {
                    match message_content {
                        Content::OutputText(text) => result.push(text.text.clone()),
                        Content::Refusal(reason) => {
                            return Err(anyhow::anyhow!("Request refused: {reason:#?}"));
                        }
                    }
                }
            }
            _ => {
                warn!("Unexpected output: {output:#?}");
            }
        }
    }

    Ok(result)
}

// Statics.

static OPENAI_TEXT_CONFIG: OnceLock<TextConfig> = OnceLock::new();

/// Strict JSON schema for the triage verdict.
fn get_openai_text_config() -> &'static TextConfig {
    OPENAI_TEXT_CONFIG.get_or_init(|| TextConfig {
        format: TextResponseFormat::JsonSchema(ResponseFormatJsonSchema {
            name: "TriageVerdict".to_string(),
            description: Some("Urgency and priority classification of a support message.".to_string()),
            schema: Some(serde_json::json!({
                "type": "object",
                "properties": {
                    "needs_urgent_triage": { "type": "boolean" },
                    "priority_level": {
                        "type": "string",
                        "enum": ["low", "medium", "high"]
                    },
                    "suggested_actions": { "type": "array", "items": { "type": "string" } },
                    "reason": { "type": "string" },
                    "keywords_found": { "type": "array", "items": { "type": "string" } }
                },
                "required": ["needs_urgent_triage", "priority_level", "suggested_actions", "reason", "keywords_found"],
                "additionalProperties": false
            })),
            strict: Some(true),
        }),
    })
}

/// Convert a string reasoning effort to ReasoningEffort enum.
fn parse_openai_reasoning_effort(effort: &str) -> Res<ReasoningEffort> {
    match effort.to_lowercase().as_str() {
        "low" => Ok(ReasoningEffort::Low),
        "medium" => Ok(ReasoningEffort::Medium),
        "high" => Ok(ReasoningEffort::High),
        _ => Err(anyhow::anyhow!("Invalid reasoning effort: {effort}. Must be one of: low, medium, high")),
    }
}

// Tests.

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::config::ConfigInner;

    fn create_test_config() -> Config {
        Config::from(ConfigInner {
            openai_api_key: std::env::var("OPENAI_API_KEY").unwrap_or_else(|_| "test_key".to_string()),
            openai_model: "gpt-4.1-nano".to_string(),
            openai_max_tokens: 200u32,
            openai_timeout_secs: 5,
            openai_max_retries: 0,
            ..Default::default()
        })
    }

    #[test]
    fn test_parse_reasoning_effort() {
        assert!(matches!(parse_openai_reasoning_effort("HIGH"), Ok(ReasoningEffort::High)));
        assert!(parse_openai_reasoning_effort("max").is_err());
    }

    #[test]
    fn test_retry_delay_is_capped() {
        assert_eq!(retry_delay(1), Duration::from_millis(500));
        assert_eq!(retry_delay(3), Duration::from_millis(2_000));
        assert_eq!(retry_delay(20), Duration::from_millis(MAX_RETRY_DELAY_MS));
        assert_eq!(retry_delay(1000), Duration::from_millis(MAX_RETRY_DELAY_MS));
    }

    #[test]
    fn test_text_config_requires_all_verdict_fields() {
        let TextResponseFormat::JsonSchema(format) = &get_openai_text_config().format else {
            panic!("Expected a JSON schema text format.");
        };

        let schema = format.schema.as_ref().unwrap();

        assert_eq!(schema["required"].as_array().unwrap().len(), 5);
        assert_eq!(format.strict, Some(true));
    }

    #[test]
    fn test_build_request_for_reasoning_model() {
        let mut config = create_test_config();
        let config_inner = Arc::make_mut(&mut config.inner);
        config_inner.openai_model = "o4-mini".to_string();

        let client = OpenAiLlmClient::new(&config);

        assert!(client.build_request("The site is down").is_ok());
    }

    #[tokio::test]
    async fn test_invalid_api_key_is_an_error() {
        crate::install_crypto_provider();

        let mut config = create_test_config();
        let config_inner = Arc::make_mut(&mut config.inner);
        config_inner.openai_api_key = "sk-invalid-key-for-testing".to_string();

        let client = LlmClient::openai(&config);

        let result = client.get_triage_agent_response("The site is down").await;
        assert!(result.is_err(), "Should fail with invalid API key");
    }
}
