//! Response generation over an OpenAI-compatible chat-completions API.
//!
//! The orchestrator only sees the [`ResponseGenerator`] trait; production
//! wiring supplies [`ChatCompletionsClient`] while tests and keyless local
//! runs use [`MockGenerator`].

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use tome_core::config::{GeneratorConfig, SamplingConfig};
use tome_core::types::ChatTurn;

use crate::error::ChatError;

/// Sampling parameters for one generation call.
///
/// Per-mode configuration carried from the config file; the orchestrator
/// passes these through without computing anything.
#[derive(Debug, Clone)]
pub struct GenerationOptions {
    pub model: String,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
}

impl GenerationOptions {
    /// Combine a model name with one mode's sampling profile.
    pub fn from_sampling(model: &str, sampling: &SamplingConfig) -> Self {
        Self {
            model: model.to_string(),
            temperature: sampling.temperature,
            top_p: sampling.top_p,
            max_tokens: sampling.max_tokens,
        }
    }
}

/// Produces a model reply for a prompt plus conversational context.
///
/// `history` is the session's turn window, oldest first; implementations
/// replay it ahead of the new user message so the model sees the
/// conversation so far.
#[async_trait]
pub trait ResponseGenerator: Send + Sync {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        user_message: &str,
        options: &GenerationOptions,
    ) -> Result<String, ChatError>;
}

// ---------------------------------------------------------------------------
// ChatCompletionsClient - remote OpenAI-compatible API
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: String,
}

/// HTTP client for an OpenAI-compatible `/chat/completions` endpoint.
pub struct ChatCompletionsClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for ChatCompletionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatCompletionsClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl ChatCompletionsClient {
    /// Build a client from the generator config and an API key.
    pub fn new(config: &GeneratorConfig, api_key: impl Into<String>) -> Result<Self, ChatError> {
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(15))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ChatError::Generation(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[async_trait]
impl ResponseGenerator for ChatCompletionsClient {
    async fn generate(
        &self,
        system_prompt: &str,
        history: &[ChatTurn],
        user_message: &str,
        options: &GenerationOptions,
    ) -> Result<String, ChatError> {
        let endpoint = format!("{}/chat/completions", self.base_url);

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(serde_json::json!({
            "role": "system",
            "content": system_prompt,
        }));
        for turn in history {
            messages.push(serde_json::json!({
                "role": turn.role.as_str(),
                "content": turn.content,
            }));
        }
        messages.push(serde_json::json!({
            "role": "user",
            "content": user_message,
        }));

        let body = serde_json::json!({
            "model": options.model,
            "messages": messages,
            "temperature": options.temperature,
            "top_p": options.top_p,
            "max_tokens": options.max_tokens,
            "stream": false,
        });

        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ChatError::Generation(format!("request to {} timed out", endpoint))
                } else {
                    ChatError::Generation(format!("request to {} failed: {}", endpoint, e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let detail = response.text().await.unwrap_or_default();
            return Err(ChatError::Generation(format!(
                "chat API returned {}: {}",
                status, detail
            )));
        }

        let parsed: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Generation(format!("invalid completion response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| ChatError::Generation("completion had no choices".to_string()))?;

        debug!(model = %options.model, reply_len = content.len(), "Completion received");
        Ok(content)
    }
}

// ---------------------------------------------------------------------------
// Test / keyless backends
// ---------------------------------------------------------------------------

/// Deterministic generator used in tests and when no API key is configured.
///
/// Echoes the incoming message with a marker prefix and reports how much
/// conversational context it was handed, which lets tests assert that
/// memory actually reaches the generator.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator;

impl MockGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResponseGenerator for MockGenerator {
    async fn generate(
        &self,
        _system_prompt: &str,
        history: &[ChatTurn],
        user_message: &str,
        _options: &GenerationOptions,
    ) -> Result<String, ChatError> {
        Ok(format!(
            "[context: {} turns] {}",
            history.len(),
            user_message
        ))
    }
}

/// Generator that always fails, for exercising degradation paths.
#[derive(Debug, Clone, Default)]
pub struct FailingGenerator;

impl FailingGenerator {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ResponseGenerator for FailingGenerator {
    async fn generate(
        &self,
        _system_prompt: &str,
        _history: &[ChatTurn],
        _user_message: &str,
        _options: &GenerationOptions,
    ) -> Result<String, ChatError> {
        Err(ChatError::Generation("simulated model outage".to_string()))
    }
}
