//! Fact-check: advisory source lookup and correction notes.
//!
//! Entirely optional. No adapter, a failed request, or unparsable output
//! all degrade to the empty result; this stage never fails the run.

use serde::Deserialize;
use tracing::{debug, info, instrument};

use postforge_adapters::{Extraction, LinkProbe, SearchProvider, extract, url_is_reachable};
use postforge_shared::{Draft, FactCheckResult, Source, TopicRecord};

/// How much draft content is handed to the verifier.
const CONTENT_SAMPLE_CHARS: usize = 3000;

/// At most this many candidate sources are probed.
const MAX_SOURCES: usize = 5;

/// Reply shape expected from the search adapter.
#[derive(Debug, Deserialize)]
struct FactCheckReply {
    #[serde(default)]
    sources: Vec<Source>,
    #[serde(default)]
    corrections: Vec<String>,
    #[serde(default)]
    #[allow(dead_code)]
    verified: bool,
}

/// Verify the draft against the search adapter.
#[instrument(skip_all, fields(slug = %topic.slug, enabled = search.is_some()))]
pub async fn verify(
    search: Option<&dyn SearchProvider>,
    probe: &dyn LinkProbe,
    topic: &TopicRecord,
    draft: &Draft,
) -> FactCheckResult {
    let Some(search) = search else {
        debug!("search adapter absent, skipping fact-check");
        return FactCheckResult::default();
    };

    let reply = match search.search(&query(topic, draft)).await {
        Ok(reply) => reply,
        Err(e) => {
            debug!(error = %e, "fact-check request failed, continuing without");
            return FactCheckResult::default();
        }
    };

    let parsed: FactCheckReply = match extract::parse_object(&reply) {
        Extraction::Parsed(value) | Extraction::Recovered(value) => value,
        Extraction::Failed => {
            debug!("fact-check reply unparsable, continuing without");
            return FactCheckResult::default();
        }
    };

    // Probe each candidate source; drop the unreachable ones.
    let mut sources = Vec::new();
    for source in parsed.sources.into_iter().take(MAX_SOURCES) {
        if url_is_reachable(probe, &source.url).await {
            sources.push(source);
        } else {
            debug!(url = %source.url, "dropping unreachable source");
        }
    }

    info!(
        sources = sources.len(),
        corrections = parsed.corrections.len(),
        "fact-check complete"
    );
    FactCheckResult {
        sources,
        corrections: parsed.corrections,
    }
}

/// Build the verification query from the topic and a bounded content
/// sample (cut on a character boundary, content never mutated).
fn query(topic: &TopicRecord, draft: &Draft) -> String {
    let sample: String = draft.content.chars().take(CONTENT_SAMPLE_CHARS).collect();

    format!(
        "Pruefe die zentralen Fakten dieses Segelartikels und finde serioese Quellen.\n\n\
         THEMA: {topic}\n\
         TITEL: {title}\n\n\
         ARTIKELANFANG:\n{sample}\n\n\
         Antworte NUR mit JSON:\n\
         {{\n\
         \"sources\": [{{\"title\": \"Quellname\", \"url\": \"https://...\"}}],\n\
         \"corrections\": [\"Korrekturhinweis falls eine Angabe falsch ist\"],\n\
         \"verified\": true\n\
         }}",
        topic = topic.topic,
        title = topic.title,
    )
}
