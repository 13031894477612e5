//! Lightweight URL reachability probe.
//!
//! A single HEAD request with a short timeout. The status policy is
//! tolerant: sites that refuse HEAD (405) or gate content behind auth
//! (403) still count as reachable.

use async_trait::async_trait;
use tracing::debug;

use postforge_shared::{PostforgeError, Result};

use crate::{PROBE_TIMEOUT_SECS, USER_AGENT};

/// HEAD a URL and return the HTTP status code.
#[async_trait]
pub trait LinkProbe: Send + Sync {
    async fn probe(&self, url: &str) -> Result<u16>;
}

/// Status codes counted as "reachable": success, both standard redirects,
/// forbidden, and method-not-allowed.
pub fn is_reachable(status: u16) -> bool {
    matches!(status, 200..=299 | 301 | 302 | 403 | 405)
}

/// reqwest-backed probe. Redirects are not followed; 301 and 302 already
/// count as reachable.
pub struct HttpProbe {
    client: reqwest::Client,
}

impl HttpProbe {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .redirect(reqwest::redirect::Policy::none())
            .timeout(std::time::Duration::from_secs(PROBE_TIMEOUT_SECS))
            .build()
            .map_err(|e| PostforgeError::Network(format!("probe client build: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LinkProbe for HttpProbe {
    async fn probe(&self, url: &str) -> Result<u16> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| PostforgeError::Network(format!("{url}: {e}")))?;
        let status = response.status().as_u16();
        debug!(url, status, "probe");
        Ok(status)
    }
}

/// Probe a URL and report whether it is reachable under the tolerant
/// policy. Transport errors (DNS, timeout, TLS) count as unreachable.
pub async fn url_is_reachable(probe: &dyn LinkProbe, url: &str) -> bool {
    match probe.probe(url).await {
        Ok(status) => is_reachable(status),
        Err(_) => false,
    }
}
