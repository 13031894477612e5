//! Search/verification adapter: search-grounded text generation.
//!
//! Optional: the pipeline runs without it (fact-check and product lookup
//! degrade to no-ops). The reply is free text possibly containing one JSON
//! object plus provenance; parsing is the caller's job.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, instrument};

use postforge_shared::{PostforgeError, Result};

use crate::{GENERATIVE_TIMEOUT_SECS, USER_AGENT};

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const API_VERSION: &str = "2023-06-01";

/// Search query → free text.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str) -> Result<String>;
}

/// Messages API client with the web-search tool enabled.
pub struct AnthropicSearchClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl std::fmt::Debug for AnthropicSearchClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicSearchClient")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl AnthropicSearchClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    /// Create a client against a custom endpoint (tests use a mock server).
    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(std::time::Duration::from_secs(GENERATIVE_TIMEOUT_SECS))
            .build()
            .map_err(|e| PostforgeError::Network(format!("client build: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

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
impl SearchProvider for AnthropicSearchClient {
    #[instrument(skip_all, fields(query_len = query.len()))]
    async fn search(&self, query: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 1024,
            "messages": [{ "role": "user", "content": query }],
            "tools": [{
                "type": "web_search_20250305",
                "name": "web_search",
                "max_uses": 3,
            }],
        });

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| PostforgeError::Network(format!("search request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PostforgeError::Network(format!(
                "search request: HTTP {status}"
            )));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| PostforgeError::Network(format!("search response: {e}")))?;

        let text: String = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("");

        debug!(reply_len = text.len(), "search complete");
        Ok(text)
    }
}
