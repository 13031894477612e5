//! Text-generation adapter: Anthropic Messages API over HTTP.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use postforge_shared::{PostforgeError, Result};

use crate::{GENERATIVE_TIMEOUT_SECS, USER_AGENT};

/// Default API endpoint.
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// API version header value.
const API_VERSION: &str = "2023-06-01";

/// A single text-generation request.
#[derive(Debug, Clone)]
pub struct PromptSpec {
    /// Model identifier.
    pub model: String,
    /// Maximum completion tokens.
    pub max_tokens: u32,
    /// The full user prompt.
    pub prompt: String,
}

/// Request→free-text function. The reply is expected to contain one JSON
/// object; extraction/repair is the caller's responsibility.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, spec: &PromptSpec) -> Result<String>;
}

/// HTTP client for the Anthropic Messages API.
pub struct AnthropicClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for AnthropicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl AnthropicClient {
    /// Create a client against the production endpoint.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (tests use a mock server).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(GENERATIVE_TIMEOUT_SECS))
            .build()
            .map_err(|e| PostforgeError::Network(format!("client build: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

/// Messages API response shape (the subset we read).
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    #[instrument(skip_all, fields(model = %spec.model, prompt_len = spec.prompt.len()))]
    async fn generate(&self, spec: &PromptSpec) -> Result<String> {
        let body = serde_json::json!({
            "model": spec.model,
            "max_tokens": spec.max_tokens,
            "messages": [{ "role": "user", "content": spec.prompt }],
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| PostforgeError::Network(format!("messages request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let detail: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            return Err(PostforgeError::Network(format!(
                "messages request: HTTP {status}: {detail}"
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| PostforgeError::Network(format!("messages response: {e}")))?;

        let text: String = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        debug!(reply_len = text.len(), "generation complete");

        if text.is_empty() {
            return Err(PostforgeError::Network(
                "messages response contained no text blocks".into(),
            ));
        }

        Ok(text)
    }
}
