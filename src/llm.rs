//! Generative-model abstraction and implementations.
//!
//! The pipeline only ever needs one operation, single-shot text generation,
//! modelled by the [`TextGenerator`] trait. Concrete backends:
//! - **[`DisabledGenerator`]**: always fails, so every AI step takes its fallback.
//! - **[`GeminiGenerator`]**: Google `generateContent` API (`GEMINI_API_KEY`).
//! - **[`OpenAIGenerator`]**: OpenAI chat completions API (`OPENAI_API_KEY`).
//!
//! Use [`create_generator`] to build the one named in [`ModelConfig`].
//!
//! # Retry Strategy
//!
//! With the default `max_retries = 0` each call is a single attempt. Larger
//! values retry transient failures with exponential backoff:
//! - HTTP 429 (rate limited) and 5xx (server error) → retry
//! - HTTP 4xx (client error, not 429) → fail immediately
//! - Network errors → retry
//! - Backoff: 1s, 2s, 4s, 8s, 16s, 32s (capped at 2^5)

use anyhow::{anyhow, bail, Result};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::config::ModelConfig;

/// Single-shot text generation.
///
/// Output is untrusted: callers must validate whatever comes back.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Returns the model identifier (e.g. `"gemini-1.5-flash"`).
    fn model_name(&self) -> &str;

    /// Send `prompt` and return the model's raw text response.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

// ============ Disabled ============

/// A generator that refuses every request.
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    fn model_name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &str) -> Result<String> {
        bail!("Generative model is disabled")
    }
}

// ============ Gemini ============

/// Google Gemini `generateContent` backend.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl GeminiGenerator {
    /// # Errors
    ///
    /// Fails if `model` is unset or `GEMINI_API_KEY` is not in the environment.
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow!("model.model required for Gemini provider"))?;
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| anyhow!("GEMINI_API_KEY environment variable not set"))?;
        Ok(Self {
            client: build_client(config)?,
            api_key,
            model,
            max_retries: config.max_retries,
        })
    }

    fn request_body(prompt: &str) -> serde_json::Value {
        serde_json::json!({
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        })
    }
}

#[async_trait]
impl TextGenerator for GeminiGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
            self.model
        );
        let body = Self::request_body(prompt);
        let json = send_with_retry(self.max_retries, "Gemini", || {
            self.client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
        })
        .await?;
        parse_gemini_response(&json)
    }
}

/// Concatenate `candidates[0].content.parts[*].text`.
fn parse_gemini_response(json: &serde_json::Value) -> Result<String> {
    let parts = json
        .pointer("/candidates/0/content/parts")
        .and_then(|p| p.as_array())
        .ok_or_else(|| anyhow!("Invalid Gemini response: missing candidates[0].content.parts"))?;
    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    Ok(text)
}

// ============ OpenAI ============

/// OpenAI `POST /v1/chat/completions` backend.
pub struct OpenAIGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
    max_retries: u32,
}

impl OpenAIGenerator {
    /// # Errors
    ///
    /// Fails if `model` is unset or `OPENAI_API_KEY` is not in the environment.
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow!("model.model required for OpenAI provider"))?;
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Ok(Self {
            client: build_client(config)?,
            api_key,
            model,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl TextGenerator for OpenAIGenerator {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn generate(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let json = send_with_retry(self.max_retries, "OpenAI", || {
            self.client
                .post("https://api.openai.com/v1/chat/completions")
                .header("Authorization", format!("Bearer {}", self.api_key))
                .json(&body)
        })
        .await?;
        parse_openai_response(&json)
    }
}

fn parse_openai_response(json: &serde_json::Value) -> Result<String> {
    json.pointer("/choices/0/message/content")
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Invalid OpenAI response: missing choices[0].message.content"))
}

// ============ Shared plumbing ============

fn build_client(config: &ModelConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?)
}

/// POST a JSON request, retrying transient failures up to `max_retries` times.
async fn send_with_retry<F>(max_retries: u32, provider: &str, build: F) -> Result<serde_json::Value>
where
    F: Fn() -> reqwest::RequestBuilder,
{
    let mut last_err = None;

    for attempt in 0..=max_retries {
        if attempt > 0 {
            // Exponential backoff: 1s, 2s, 4s, 8s, ...
            let delay = Duration::from_secs(1 << (attempt - 1).min(5));
            tracing::debug!(provider, attempt, ?delay, "retrying model call");
            tokio::time::sleep(delay).await;
        }

        match build().send().await {
            Ok(response) => {
                let status = response.status();

                if status.is_success() {
                    return Ok(response.json().await?);
                }

                let body_text = response.text().await.unwrap_or_default();
                if status.as_u16() == 429 || status.is_server_error() {
                    last_err = Some(anyhow!("{} API error {}: {}", provider, status, body_text));
                    continue;
                }

                bail!("{} API error {}: {}", provider, status, body_text);
            }
            Err(e) => {
                last_err = Some(e.into());
                continue;
            }
        }
    }

    Err(last_err.unwrap_or_else(|| anyhow!("{} call failed after retries", provider)))
}

/// Create the [`TextGenerator`] named by `config.provider`.
///
/// | Config Value | Generator |
/// |-------------|-----------|
/// | `"disabled"` | [`DisabledGenerator`] |
/// | `"gemini"` | [`GeminiGenerator`] |
/// | `"openai"` | [`OpenAIGenerator`] |
pub fn create_generator(config: &ModelConfig) -> Result<Arc<dyn TextGenerator>> {
    match config.provider.as_str() {
        "disabled" => Ok(Arc::new(DisabledGenerator)),
        "gemini" => Ok(Arc::new(GeminiGenerator::new(config)?)),
        "openai" => Ok(Arc::new(OpenAIGenerator::new(config)?)),
        other => bail!("Unknown model provider: {}", other),
    }
}
