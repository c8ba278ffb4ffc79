//! OpenAI chat-completions generator.

use std::time::Duration;

use async_openai::{
    Client,
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use tracing::{debug, error};

use crate::config::GenerationConfig;
use crate::error::{ModelError, Result};
use crate::generator::Generator;

/// The model used when none is configured.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

const PROVIDER: &str = "OpenAI";

/// A [`Generator`] for the OpenAI API and OpenAI-compatible servers.
///
/// Each call sends one user message and returns the first choice.
///
/// # Example
///
/// ```rust,ignore
/// use research_model::{GenerationConfig, OpenAIGenerator};
///
/// let generator = OpenAIGenerator::new("sk-...", GenerationConfig::new("gpt-4o"))?;
/// let text = generator.complete("Say hello").await?;
/// ```
pub struct OpenAIGenerator {
    client: Client<OpenAIConfig>,
    config: GenerationConfig,
}

impl OpenAIGenerator {
    /// Create a generator for the public OpenAI API.
    pub fn new(api_key: impl Into<String>, config: GenerationConfig) -> Result<Self> {
        Self::build(api_key.into(), None, config)
    }

    /// Create a generator for an OpenAI-compatible API at `base_url`.
    pub fn compatible(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        config: GenerationConfig,
    ) -> Result<Self> {
        Self::build(api_key.into(), Some(base_url.into()), config)
    }

    fn build(api_key: String, base_url: Option<String>, config: GenerationConfig) -> Result<Self> {
        config.validate()?;
        if api_key.is_empty() {
            return Err(ModelError::ConfigError("API key must not be empty".to_string()));
        }

        let mut openai_config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base_url) = base_url {
            openai_config = openai_config.with_api_base(base_url);
        }

        // async-openai retries rate-limited requests by default; fail on the first response.
        let no_retry = ExponentialBackoffBuilder::new().with_max_elapsed_time(Some(Duration::ZERO)).build();
        let client = Client::with_config(openai_config)
            .with_http_client(config.http_client()?)
            .with_backoff(no_retry);
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Generator for OpenAIGenerator {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(provider = PROVIDER, model = %self.config.model, prompt_len = prompt.len(), "requesting completion");

        let message = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| ModelError::generation(PROVIDER, format!("failed to build message: {e}")))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.config.model)
            .temperature(self.config.temperature)
            .messages(vec![ChatCompletionRequestMessage::User(message)])
            .build()
            .map_err(|e| ModelError::generation(PROVIDER, format!("failed to build request: {e}")))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "completion request failed");
            ModelError::generation(PROVIDER, format!("API error: {e}"))
        })?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ModelError::generation(PROVIDER, "response contained no text"))
    }
}
