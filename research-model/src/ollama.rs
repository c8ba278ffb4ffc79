//! Ollama generator for locally served models.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::config::GenerationConfig;
use crate::error::{ModelError, Result};
use crate::generator::Generator;

/// The default Ollama server address.
pub const OLLAMA_BASE_URL: &str = "http://localhost:11434";

/// The model used when none is configured.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3.1";

const PROVIDER: &str = "Ollama";

/// A [`Generator`] calling Ollama's `/api/generate` with streaming disabled.
pub struct OllamaGenerator {
    client: reqwest::Client,
    base_url: String,
    config: GenerationConfig,
}

impl OllamaGenerator {
    /// Create a generator talking to the server at `base_url`.
    pub fn new(base_url: impl Into<String>, config: GenerationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client: config.http_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            config,
        })
    }

    /// Create a generator for the default local server.
    pub fn local(config: GenerationConfig) -> Result<Self> {
        Self::new(OLLAMA_BASE_URL, config)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[async_trait]
impl Generator for OllamaGenerator {
    fn name(&self) -> &str {
        &self.config.model
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!(provider = PROVIDER, model = %self.config.model, prompt_len = prompt.len(), "requesting completion");

        let body = GenerateRequest {
            model: &self.config.model,
            prompt,
            stream: false,
            options: GenerateOptions { temperature: self.config.temperature },
        };

        let response = self
            .client
            .post(format!("{}/api/generate", self.base_url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!(provider = PROVIDER, error = %e, "request failed");
                let reason = if e.is_timeout() { "request timed out" } else { "request failed" };
                ModelError::generation(PROVIDER, format!("{reason}: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let detail =
                serde_json::from_str::<ErrorResponse>(&body).map(|e| e.error).unwrap_or(body);

            error!(provider = PROVIDER, %status, "API error");
            return Err(ModelError::generation(PROVIDER, format!("server returned {status}: {detail}")));
        }

        let parsed: GenerateResponse = response.json().await.map_err(|e| {
            error!(provider = PROVIDER, error = %e, "failed to parse response");
            ModelError::generation(PROVIDER, format!("failed to parse response: {e}"))
        })?;

        Ok(parsed.response)
    }
}
