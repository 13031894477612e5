//! Monetization: one vetted product recommendation per article.
//!
//! The stage is a no-op unless the search adapter returns a product whose
//! URL sits on the configured marketplace domain *and* passes a
//! reachability probe. Any failure along the way leaves the content
//! untouched.

use serde::Deserialize;
use tracing::{debug, info, instrument};
use url::Url;

use postforge_adapters::{Extraction, LinkProbe, SearchProvider, extract, url_is_reachable};
use postforge_markup::{ProductRecommendation, insert_product_callout};
use postforge_shared::{MonetizationConfig, TopicRecord};

/// Reply shape expected from the search adapter.
#[derive(Debug, Deserialize)]
struct ProductReply {
    name: String,
    url: String,
    #[serde(default)]
    price: String,
    #[serde(default)]
    reason: String,
}

/// Inject a product callout into `content`, or return it unchanged.
#[instrument(skip_all, fields(slug = %topic.slug, enabled = search.is_some()))]
pub async fn inject(
    search: Option<&dyn SearchProvider>,
    probe: &dyn LinkProbe,
    config: &MonetizationConfig,
    topic: &TopicRecord,
    content: String,
) -> String {
    let Some(search) = search else {
        return content;
    };

    let reply = match search.search(&query(config, topic)).await {
        Ok(reply) => reply,
        Err(e) => {
            debug!(error = %e, "product lookup failed, skipping callout");
            return content;
        }
    };

    let product: ProductReply = match extract::parse_object(&reply) {
        Extraction::Parsed(value) | Extraction::Recovered(value) => value,
        Extraction::Failed => {
            debug!("product reply unparsable, skipping callout");
            return content;
        }
    };

    if !on_marketplace(&product.url, &config.marketplace_domain) {
        debug!(url = %product.url, "product URL off-marketplace, skipping callout");
        return content;
    }

    if !url_is_reachable(probe, &product.url).await {
        debug!(url = %product.url, "product URL unreachable, skipping callout");
        return content;
    }

    info!(product = %product.name, "product callout injected");
    insert_product_callout(
        &content,
        &ProductRecommendation {
            name: product.name,
            url: product.url,
            price: product.price,
            reason: product.reason,
        },
    )
}

/// True when the URL's host is the marketplace domain or a subdomain.
fn on_marketplace(url: &str, domain: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    if parsed.scheme() != "https" && parsed.scheme() != "http" {
        return false;
    }
    let Some(host) = parsed.host_str() else {
        return false;
    };
    host == domain || host.ends_with(&format!(".{domain}"))
}

fn query(config: &MonetizationConfig, topic: &TopicRecord) -> String {
    format!(
        "Finde EIN guenstiges, gut bewertetes Produkt auf {domain} das zu diesem \
         Segelartikel passt (Kategorie: {category}, Thema: {topic}).\n\n\
         Antworte NUR mit JSON:\n\
         {{\n\
         \"name\": \"Produktname\",\n\
         \"url\": \"https://www.{domain}/...\",\n\
         \"price\": \"ca. XX Euro\",\n\
         \"reason\": \"Ein Satz warum es passt\"\n\
         }}",
        domain = config.marketplace_domain,
        category = topic.category.name(),
        topic = topic.topic,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{ScriptedSearch, TableProbe};
    use postforge_shared::Category;

    fn topic() -> TopicRecord {
        TopicRecord {
            topic: "Ankern".into(),
            title: "Ankern lernen".into(),
            meta_description: "m".into(),
            keywords: vec![],
            category: Category::Ausruestung,
            content_type: "checkliste".into(),
            slug: "ankern-lernen".into(),
            image_prompt: String::new(),
        }
    }

    const CONTENT: &str = "<h2>A</h2><p>a</p><h2>B</h2><p>b</p><p>c</p>";

    fn product_reply(url: &str) -> String {
        format!(
            r#"{{"name": "Anker-Set", "url": "{url}", "price": "ca. 45 Euro", "reason": "Passt."}}"#
        )
    }

    #[tokio::test]
    async fn vetted_product_is_injected() {
        let search = ScriptedSearch::new(Ok(product_reply("https://www.amazon.de/dp/B0TEST")));
        let probe = TableProbe::new(&[("https://www.amazon.de/dp/B0TEST", 403)]);
        let config = MonetizationConfig::default();

        let result = inject(Some(&search), &probe, &config, &topic(), CONTENT.into()).await;
        assert!(result.contains("product-callout"));
        assert!(result.contains("Anker-Set"));
    }

    #[tokio::test]
    async fn off_marketplace_url_is_rejected() {
        let search = ScriptedSearch::new(Ok(product_reply("https://www.evil.example/dp/B0TEST")));
        let probe = TableProbe::new(&[("https://www.evil.example/dp/B0TEST", 200)]);
        let config = MonetizationConfig::default();

        let result = inject(Some(&search), &probe, &config, &topic(), CONTENT.into()).await;
        assert_eq!(result, CONTENT);
        // The probe is never consulted for a rejected domain
        assert!(probe.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn lookalike_domain_is_rejected() {
        // notamazon.de must not pass the suffix check
        let search = ScriptedSearch::new(Ok(product_reply("https://notamazon.de/dp/B0TEST")));
        let probe = TableProbe::new(&[("https://notamazon.de/dp/B0TEST", 200)]);
        let config = MonetizationConfig::default();

        let result = inject(Some(&search), &probe, &config, &topic(), CONTENT.into()).await;
        assert_eq!(result, CONTENT);
    }

    #[tokio::test]
    async fn unreachable_product_is_skipped() {
        let search = ScriptedSearch::new(Ok(product_reply("https://www.amazon.de/dp/B0WEG")));
        let probe = TableProbe::new(&[("https://www.amazon.de/dp/B0WEG", 404)]);
        let config = MonetizationConfig::default();

        let result = inject(Some(&search), &probe, &config, &topic(), CONTENT.into()).await;
        assert_eq!(result, CONTENT);
    }

    #[tokio::test]
    async fn absent_adapter_is_a_noop() {
        let probe = TableProbe::new(&[]);
        let config = MonetizationConfig::default();
        let result = inject(None, &probe, &config, &topic(), CONTENT.into()).await;
        assert_eq!(result, CONTENT);
    }

    #[tokio::test]
    async fn unparsable_reply_is_a_noop() {
        let search = ScriptedSearch::new(Ok("kein Produkt gefunden".into()));
        let probe = TableProbe::new(&[]);
        let config = MonetizationConfig::default();
        let result = inject(Some(&search), &probe, &config, &topic(), CONTENT.into()).await;
        assert_eq!(result, CONTENT);
    }

    #[test]
    fn marketplace_check_accepts_subdomains() {
        assert!(on_marketplace("https://www.amazon.de/dp/x", "amazon.de"));
        assert!(on_marketplace("https://amazon.de/dp/x", "amazon.de"));
        assert!(!on_marketplace("https://notamazon.de/dp/x", "amazon.de"));
        assert!(!on_marketplace("ftp://www.amazon.de/x", "amazon.de"));
        assert!(!on_marketplace("kein url", "amazon.de"));
    }
}
