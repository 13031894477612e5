//! Image-generation adapters and the deterministic placeholder.
//!
//! Two HTTP-backed generators (Gemini inline-image data, OpenAI Images
//! URL-then-download) plus [`placeholder_svg`], which always succeeds.
//! The fallback ordering lives in the pipeline, not here.

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use tracing::{debug, instrument};

use postforge_shared::{PostforgeError, Result};

use crate::{GENERATIVE_TIMEOUT_SECS, USER_AGENT};

/// prompt → image bytes, or `None` when the service answered without an
/// image (a valid, non-error outcome for multimodal endpoints).
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    /// Adapter name, for fallback-chain logging.
    fn name(&self) -> &'static str;

    async fn generate(&self, prompt: &str) -> Result<Option<Vec<u8>>>;
}

fn build_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(std::time::Duration::from_secs(GENERATIVE_TIMEOUT_SECS))
        .build()
        .map_err(|e| PostforgeError::Network(format!("client build: {e}")))
}

// ---------------------------------------------------------------------------
// Gemini
// ---------------------------------------------------------------------------

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const GEMINI_MODEL: &str = "gemini-2.0-flash-exp";

/// Gemini `generateContent` client reading inline image data.
pub struct GeminiImageClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for GeminiImageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiImageClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl GeminiImageClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, GEMINI_BASE_URL)
    }

    /// Create a client against a custom endpoint (tests use a mock server).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    inline_data: Option<GeminiInlineData>,
}

#[derive(Debug, Deserialize)]
struct GeminiInlineData {
    data: String,
}

#[async_trait]
impl ImageGenerator for GeminiImageClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    #[instrument(skip_all, fields(adapter = self.name()))]
    async fn generate(&self, prompt: &str) -> Result<Option<Vec<u8>>> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }],
            "generationConfig": { "responseModalities": ["TEXT", "IMAGE"] },
        });

        let url = format!(
            "{}/v1beta/models/{GEMINI_MODEL}:generateContent?key={}",
            self.base_url, self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| PostforgeError::Network(format!("gemini request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PostforgeError::Network(format!(
                "gemini request: HTTP {status}"
            )));
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| PostforgeError::Network(format!("gemini response: {e}")))?;

        // Find the first inline image part, if any.
        for candidate in parsed.candidates {
            let Some(content) = candidate.content else {
                continue;
            };
            for part in content.parts {
                if let Some(inline) = part.inline_data {
                    let bytes = base64::engine::general_purpose::STANDARD
                        .decode(inline.data.as_bytes())
                        .map_err(|e| {
                            PostforgeError::Network(format!("gemini inline data: {e}"))
                        })?;
                    debug!(len = bytes.len(), "image received");
                    return Ok(Some(bytes));
                }
            }
        }

        debug!("no image part in gemini reply");
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// OpenAI Images
// ---------------------------------------------------------------------------

const OPENAI_BASE_URL: &str = "https://api.openai.com";
const OPENAI_MODEL: &str = "dall-e-3";

/// OpenAI Images client: generate, then download the returned URL.
pub struct OpenAiImageClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl std::fmt::Debug for OpenAiImageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiImageClient")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl OpenAiImageClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, OPENAI_BASE_URL)
    }

    /// Create a client against a custom endpoint (tests use a mock server).
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct OpenAiImagesResponse {
    #[serde(default)]
    data: Vec<OpenAiImageEntry>,
}

#[derive(Debug, Deserialize)]
struct OpenAiImageEntry {
    url: Option<String>,
}

#[async_trait]
impl ImageGenerator for OpenAiImageClient {
    fn name(&self) -> &'static str {
        "openai"
    }

    #[instrument(skip_all, fields(adapter = self.name()))]
    async fn generate(&self, prompt: &str) -> Result<Option<Vec<u8>>> {
        let body = serde_json::json!({
            "model": OPENAI_MODEL,
            "prompt": prompt,
            "n": 1,
            "size": "1792x1024",
            "quality": "standard",
        });

        let response = self
            .client
            .post(format!("{}/v1/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| PostforgeError::Network(format!("images request: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PostforgeError::Network(format!(
                "images request: HTTP {status}"
            )));
        }

        let parsed: OpenAiImagesResponse = response
            .json()
            .await
            .map_err(|e| PostforgeError::Network(format!("images response: {e}")))?;

        let Some(image_url) = parsed.data.into_iter().find_map(|entry| entry.url) else {
            return Ok(None);
        };

        // Second round trip: download the generated image.
        let image = self
            .client
            .get(&image_url)
            .send()
            .await
            .map_err(|e| PostforgeError::Network(format!("image download: {e}")))?;

        if !image.status().is_success() {
            return Err(PostforgeError::Network(format!(
                "image download: HTTP {}",
                image.status()
            )));
        }

        let bytes = image
            .bytes()
            .await
            .map_err(|e| PostforgeError::Network(format!("image download: {e}")))?;

        debug!(len = bytes.len(), "image received");
        Ok(Some(bytes.to_vec()))
    }
}

// ---------------------------------------------------------------------------
// Placeholder
// ---------------------------------------------------------------------------

/// Deterministic vector placeholder: ocean gradient, sun disc, two wave
/// bands, and a mast-and-sail stroke. Written when every generator in the
/// fallback chain failed, so the page never ships without a hero image.
pub fn placeholder_svg(title: &str) -> Vec<u8> {
    let escaped_title = title
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;");
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="1600" height="900" viewBox="0 0 1600 900">
  <title>{escaped_title}</title>
  <defs>
    <linearGradient id="g" x1="0%" y1="0%" x2="100%" y2="100%">
      <stop offset="0%" style="stop-color:#0077b6"/>
      <stop offset="50%" style="stop-color:#00b4d8"/>
      <stop offset="100%" style="stop-color:#90e0ef"/>
    </linearGradient>
  </defs>
  <rect width="1600" height="900" fill="url(#g)"/>
  <circle cx="1300" cy="200" r="80" fill="#f4e8c1" opacity="0.6"/>
  <path d="M200 700 Q400 500 600 650 Q800 800 1000 600 Q1200 400 1400 550 L1600 650 L1600 900 L0 900 L0 750 Z" fill="rgba(255,255,255,0.15)"/>
  <path d="M0 800 Q200 700 400 780 Q600 860 800 750 Q1000 640 1200 730 Q1400 820 1600 760 L1600 900 L0 900 Z" fill="rgba(255,255,255,0.1)"/>
  <path d="M700 350 L700 650 M700 350 C700 350 850 400 850 500 L700 500" fill="none" stroke="rgba(255,255,255,0.4)" stroke-width="4"/>
</svg>"##
    )
    .into_bytes()
}
