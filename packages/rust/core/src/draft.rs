//! Drafting: one text-generation call producing the article body.
//!
//! The reply is expected to be `{content, faq, image_alt}`. Strict JSON is
//! tried first; the tolerant extractor then salvages what it can. A draft
//! with no content at all fails the run; this stage and topic research
//! are the only fatal ones.

use tracing::{info, instrument, warn};

use postforge_adapters::{Extraction, PromptSpec, TextGenerator, parse_draft};
use postforge_markup::{BEAUFORT_TOKEN, CALCULATOR_TOKEN};
use postforge_shared::{
    AppConfig, ArticleRecord, Category, Draft, PostforgeError, Result, TopicRecord,
};

/// How many recent articles are offered as internal link targets.
const LINK_HISTORY: usize = 5;

/// Draft the article body for `topic`.
#[instrument(skip_all, fields(slug = %topic.slug))]
pub async fn write_article(
    text: &dyn TextGenerator,
    config: &AppConfig,
    topic: &TopicRecord,
    articles: &[ArticleRecord],
) -> Result<Draft> {
    let spec = PromptSpec {
        model: config.anthropic.draft_model.clone(),
        max_tokens: 4096,
        prompt: draft_prompt(config, topic, articles),
    };
    let reply = text.generate(&spec).await?;

    let draft = match parse_draft(&reply) {
        Extraction::Parsed(draft) => draft,
        Extraction::Recovered(draft) => {
            warn!(
                faq_entries = draft.faq.len(),
                "draft JSON malformed, recovered content"
            );
            draft
        }
        Extraction::Failed => {
            return Err(PostforgeError::malformed(
                "drafting",
                "no usable content in reply",
            ));
        }
    };

    let mut draft = draft;
    if draft.image_alt.trim().is_empty() {
        draft.image_alt = topic.title.clone();
    }

    info!(
        words = draft.content.split_whitespace().count(),
        faq_entries = draft.faq.len(),
        "article drafted"
    );
    Ok(draft)
}

/// Widget hint for the draft, keyed by category.
fn widget_hint(category: Category) -> Option<String> {
    match category {
        Category::Wissen => Some(format!(
            "\n\nFuege an passender Stelle dieses Beaufort-Widget ein:\n{BEAUFORT_TOKEN}\n"
        )),
        Category::Reviere => Some(format!(
            "\n\nFuege an passender Stelle diesen Seemeilen-Rechner ein:\n{CALCULATOR_TOKEN}\n"
        )),
        _ => None,
    }
}

fn draft_prompt(config: &AppConfig, topic: &TopicRecord, articles: &[ArticleRecord]) -> String {
    let instruction = postforge_shared::CONTENT_TYPES
        .iter()
        .find(|ct| ct.key == topic.content_type)
        .map(|ct| ct.instruction)
        .unwrap_or("Schreibe einen ausfuehrlichen Blogartikel zum Thema Segeln.");

    let existing_links: Vec<String> = articles
        .iter()
        .rev()
        .take(LINK_HISTORY)
        .map(|a| {
            format!(
                "- [{}]({}/posts/{}/)",
                a.title, config.site.base_url, a.slug
            )
        })
        .collect();
    let existing_links = if existing_links.is_empty() {
        "(noch keine existierenden Artikel)".to_string()
    } else {
        existing_links.join("\n")
    };

    format!(
        "Du bist Kapitaen Hannes, ein erfahrener Segellehrer mit 20+ Jahren Erfahrung. \
         Du schreibst fuer deinen Blog \"Segeln Lernen\".\n\n\
         {instruction}\n\n\
         THEMA: {topic}\n\
         TITEL: {title}\n\n\
         STIL:\n\
         - Warm, persoenlich, erfahren\n\
         - Persoenliche Anekdoten einbauen (\"Als ich letzten Sommer vor Sardinien...\")\n\
         - Du-Ansprache an den Leser\n\
         - Praxisnah mit konkreten Tipps\n\
         - 1800-2500 Woerter\n\n\
         STRUKTUR:\n\
         - Einleitung (persoenlich, packendes Intro)\n\
         - 4-6 Abschnitte mit H2-Ueberschriften (keyword-optimiert)\n\
         - Jeder Abschnitt mit H3-Unterueberschriften wo sinnvoll\n\
         - Konkrete Tipps, Zahlen, Fakten\n\
         - Fazit mit Zusammenfassung{widget}\n\n\
         INTERNE LINKS (baue 1-2 davon natuerlich ein, falls thematisch passend):\n\
         {links}\n\n\
         SPEZIAL-ELEMENTE (verwende HTML):\n\
         - Tipp-Box: <div class=\"info-box info-box-tip\"><svg viewBox=\"0 0 24 24\" fill=\"none\" stroke=\"currentColor\" stroke-width=\"2\"><circle cx=\"12\" cy=\"12\" r=\"10\"/><path d=\"M12 16v-4M12 8h.01\"/></svg><div>TIPP TEXT</div></div>\n\
         - Warnung-Box: <div class=\"info-box info-box-warning\"><svg viewBox=\"0 0 24 24\" fill=\"none\" stroke=\"currentColor\" stroke-width=\"2\"><path d=\"M10.29 3.86L1.82 18a2 2 0 001.71 3h16.94a2 2 0 001.71-3L13.71 3.86a2 2 0 00-3.42 0z\"/><path d=\"M12 9v4M12 17h.01\"/></svg><div>WARNUNG TEXT</div></div>\n\
         - Blockquote: <blockquote>Zitat</blockquote>\n\n\
         Antworte NUR mit einem JSON-Objekt:\n\
         {{\n\
         \"content\": \"Der komplette Artikel als HTML (nur der Body-Content, keine h1)\",\n\
         \"faq\": [\n\
         {{\"question\": \"Frage 1?\", \"answer\": \"Antwort 1\"}},\n\
         {{\"question\": \"Frage 2?\", \"answer\": \"Antwort 2\"}},\n\
         {{\"question\": \"Frage 3?\", \"answer\": \"Antwort 3\"}},\n\
         {{\"question\": \"Frage 4?\", \"answer\": \"Antwort 4\"}},\n\
         {{\"question\": \"Frage 5?\", \"answer\": \"Antwort 5\"}}\n\
         ],\n\
         \"image_alt\": \"Beschreibender Alt-Text fuer das Hero-Bild (deutsch)\"\n\
         }}",
        topic = topic.topic,
        title = topic.title,
        widget = widget_hint(topic.category).unwrap_or_default(),
        links = existing_links,
    )
}
