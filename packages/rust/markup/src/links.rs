//! Outbound link sanitization.
//!
//! Post-assembly pass over the final page: collect every absolute external
//! hyperlink target, probe each once, and rewrite anchors whose target is
//! unreachable to their inner text. Surrounding prose is never touched, and
//! the pass is idempotent: sanitized markup has no dead anchors left to
//! rewrite.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info};

use postforge_adapters::{LinkProbe, is_reachable};

static ANCHOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\b[^>]*href\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#)
        .expect("valid regex")
});

/// Collect absolute `http(s)` anchor targets, deduplicated, in document
/// order.
pub fn collect_external_links(html: &str) -> Vec<String> {
    let document = Html::parse_fragment(html);
    let selector = Selector::parse("a[href]").expect("valid selector");

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !(href.starts_with("http://") || href.starts_with("https://")) {
            continue;
        }
        if seen.insert(href.to_string()) {
            links.push(href.to_string());
        }
    }
    links
}

/// Probe every absolute external link and unwrap the unreachable ones.
///
/// Each unique target is probed exactly once; a transport error counts as
/// unreachable. Anchors pointing at reachable targets, and all relative
/// or internal links, pass through untouched.
pub async fn validate_links(html: &str, probe: &dyn LinkProbe) -> String {
    let targets = collect_external_links(html);
    if targets.is_empty() {
        return html.to_string();
    }

    let mut reachable: HashMap<String, bool> = HashMap::with_capacity(targets.len());
    for url in &targets {
        let ok = match probe.probe(url).await {
            Ok(status) => is_reachable(status),
            Err(_) => false,
        };
        if !ok {
            debug!(url, "unreachable link will be unwrapped");
        }
        reachable.insert(url.clone(), ok);
    }

    let dead_count = reachable.values().filter(|ok| !**ok).count();
    if dead_count == 0 {
        return html.to_string();
    }

    let sanitized = ANCHOR_RE.replace_all(html, |caps: &regex::Captures<'_>| {
        let href = &caps[1];
        if reachable.get(href).copied().unwrap_or(true) {
            caps[0].to_string()
        } else {
            caps[2].to_string()
        }
    });

    info!(
        probed = targets.len(),
        unwrapped = dead_count,
        "link validation complete"
    );

    sanitized.into_owned()
}
