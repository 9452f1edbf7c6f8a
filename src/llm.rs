//! Chat-completion and embedding client.
//!
//! The pipeline talks to one OpenAI-compatible endpoint for three jobs:
//! the remote-LLM extraction strategy, candidate summarization, and
//! sentence embeddings. Only the two operations those jobs need are
//! modeled.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{Error, Result};

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

/// One chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }
}

/// Request for a chat completion.
#[derive(Debug, Clone, Default)]
pub struct CompletionRequest {
    /// Model override; the client default is used when absent
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f64>,
}

impl CompletionRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_message(mut self, message: ChatMessage) -> Self {
        self.messages.push(message);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Completion result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub model: String,
    pub content: String,
}

/// Embedding request.
#[derive(Debug, Clone)]
pub struct EmbeddingRequest {
    pub model: Option<String>,
    pub texts: Vec<String>,
}

/// Embedding result: one vector per input text, in input order.
#[derive(Debug, Clone)]
pub struct EmbeddingResponse {
    pub model: String,
    pub embeddings: Vec<Vec<f32>>,
}

/// Client for chat completions and embeddings.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse>;

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse>;
}

/// Configuration for [`OpenAiClient`].
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    /// Base URL override
    pub base_url: Option<String>,
    /// Default completion model
    pub completion_model: String,
    /// Default embedding model
    pub embedding_model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl LlmConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            completion_model: "gpt-4o-mini".to_string(),
            embedding_model: "text-embedding-3-small".to_string(),
            timeout_secs: 10,
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn with_completion_model(mut self, model: impl Into<String>) -> Self {
        self.completion_model = model.into();
        self
    }

    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }
}

/// OpenAI-compatible HTTP client.
pub struct OpenAiClient {
    config: LlmConfig,
    http: Client,
}

// Wire types.
#[derive(Debug, Serialize)]
struct WireCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct WireCompletionResponse {
    model: String,
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireMessage,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    content: String,
}

#[derive(Debug, Serialize)]
struct WireEmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct WireEmbeddingResponse {
    model: String,
    data: Vec<WireEmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct WireEmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct WireError {
    error: WireErrorDetail,
}

#[derive(Debug, Deserialize)]
struct WireErrorDetail {
    message: String,
}

impl OpenAiClient {
    const DEFAULT_BASE_URL: &'static str = "https://api.openai.com";
    const SERVICE: &'static str = "llm";

    pub fn new(config: LlmConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_default();

        Self { config, http }
    }

    fn base_url(&self) -> &str {
        self.config
            .base_url
            .as_deref()
            .unwrap_or(Self::DEFAULT_BASE_URL)
    }

    async fn post_json<T: Serialize>(&self, url: &str, payload: &T) -> Result<String> {
        let response = self
            .http
            .post(url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("content-type", "application/json")
            .json(payload)
            .send()
            .await
            .map_err(|e| Error::transport(Self::SERVICE, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(Self::SERVICE, format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            if let Ok(error) = serde_json::from_str::<WireError>(&body) {
                return Err(Error::transport(
                    Self::SERVICE,
                    format!("API error: {}", error.error.message),
                ));
            }
            return Err(Error::transport(
                Self::SERVICE,
                format!("API error ({}): {}", status, body),
            ));
        }

        Ok(body)
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.completion_model);

        let payload = WireCompletionRequest {
            model,
            messages: &request.messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };

        let url = format!("{}/v1/chat/completions", self.base_url());
        let body = self.post_json(&url, &payload).await?;

        let response: WireCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| Error::parse(Self::SERVICE, format!("Failed to parse response: {}", e)))?;

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::parse(Self::SERVICE, "No choices in response"))?;

        Ok(CompletionResponse {
            model: response.model,
            content: choice.message.content,
        })
    }

    async fn embed(&self, request: EmbeddingRequest) -> Result<EmbeddingResponse> {
        let model = request
            .model
            .as_deref()
            .unwrap_or(&self.config.embedding_model);

        let payload = WireEmbeddingRequest {
            model,
            input: &request.texts,
        };

        let url = format!("{}/v1/embeddings", self.base_url());
        let body = self.post_json(&url, &payload).await?;

        let response: WireEmbeddingResponse = serde_json::from_str(&body)
            .map_err(|e| Error::parse(Self::SERVICE, format!("Failed to parse response: {}", e)))?;

        Ok(EmbeddingResponse {
            model: response.model,
            embeddings: response.data.into_iter().map(|d| d.embedding).collect(),
        })
    }
}
