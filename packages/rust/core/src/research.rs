//! Topic research: one text-generation call producing the run's
//! [`TopicRecord`].
//!
//! The only stage besides drafting that may fail the run: a reply with no
//! extractable JSON object is a [`PostforgeError::MalformedResponse`] and
//! is not retried.

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::Deserialize;
use tracing::{info, instrument};

use postforge_adapters::{Extraction, PromptSpec, TextGenerator, extract};
use postforge_shared::{
    AppConfig, ArticleRecord, CONTENT_TYPES, Category, ContentType, PostforgeError, Result,
    TopicRecord, dedupe_slug, german_month_name, slugify,
};

/// How many used topics are replayed as avoid-repeating context.
const TOPIC_HISTORY: usize = 20;

/// How many published titles are replayed as avoid-repeating context.
const TITLE_HISTORY: usize = 10;

/// Reply shape expected from the adapter (TopicRecord minus slug; the
/// category is only present on the forced-topic path).
#[derive(Debug, Deserialize)]
struct TopicReply {
    topic: String,
    title: String,
    meta_description: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    category: Option<Category>,
    #[serde(default)]
    image_prompt: String,
}

/// Research a topic for this run.
///
/// `forced_topic` replaces the open-ended research call with a metadata
/// call for that exact topic.
#[instrument(skip_all, fields(forced = forced_topic.is_some()))]
pub async fn research_topic(
    text: &dyn TextGenerator,
    config: &AppConfig,
    articles: &[ArticleRecord],
    used_topics: &[String],
    existing_slugs: &[String],
    forced_topic: Option<&str>,
    now: DateTime<Utc>,
) -> Result<TopicRecord> {
    let (prompt, content_type) = match forced_topic {
        Some(topic) => (forced_topic_prompt(topic), None),
        None => {
            let content_type = pick_content_type();
            (
                research_prompt(content_type, articles, used_topics, now),
                Some(content_type),
            )
        }
    };

    let spec = PromptSpec {
        model: config.anthropic.topic_model.clone(),
        max_tokens: 1024,
        prompt,
    };
    let reply = text.generate(&spec).await?;

    let parsed: TopicReply = match extract::parse_object(&reply) {
        Extraction::Parsed(value) | Extraction::Recovered(value) => value,
        Extraction::Failed => {
            return Err(PostforgeError::malformed(
                "topic-research",
                "no JSON object in reply",
            ));
        }
    };

    let (category, content_type_key) = match content_type {
        Some(ct) => (ct.category, ct.key.to_string()),
        // Forced topic: the model picks the category; the format defaults
        // to ratgeber.
        None => (parsed.category.unwrap_or(Category::Wissen), "ratgeber".to_string()),
    };

    let base_slug = slugify(&parsed.title);
    if base_slug.is_empty() {
        return Err(PostforgeError::malformed(
            "topic-research",
            format!("title '{}' yields an empty slug", parsed.title),
        ));
    }
    let slug = dedupe_slug(&base_slug, existing_slugs);

    let record = TopicRecord {
        topic: parsed.topic,
        title: parsed.title,
        meta_description: parsed.meta_description,
        keywords: parsed.keywords,
        category,
        content_type: content_type_key,
        slug,
        image_prompt: parsed.image_prompt,
    };

    info!(
        title = %record.title,
        slug = %record.slug,
        content_type = %record.content_type,
        "topic selected"
    );
    Ok(record)
}

/// Draw a content type uniformly at random.
fn pick_content_type() -> &'static ContentType {
    CONTENT_TYPES
        .choose(&mut rand::thread_rng())
        .expect("CONTENT_TYPES is non-empty")
}

/// Open-ended research prompt with seasonal and avoid-repeating context.
fn research_prompt(
    content_type: &ContentType,
    articles: &[ArticleRecord],
    used_topics: &[String],
    now: DateTime<Utc>,
) -> String {
    use chrono::Datelike;

    let month = german_month_name(now);
    let recent_topics: Vec<&str> = used_topics
        .iter()
        .rev()
        .take(TOPIC_HISTORY)
        .map(String::as_str)
        .collect();
    let recent_titles: Vec<&str> = articles
        .iter()
        .rev()
        .take(TITLE_HISTORY)
        .map(|a| a.title.as_str())
        .collect();

    format!(
        "Du bist ein erfahrener Segel-Redakteur. Es ist {month} {year}.\n\n\
         Generiere EIN konkretes Thema fuer einen {kind}-Artikel zum Thema Segeln.\n\n\
         Bereits verwendete Themen (NICHT wiederholen):\n{topics}\n\n\
         Bereits existierende Artikel:\n{titles}\n\n\
         Content-Typ: {kind}\n\
         Kategorie: {category}\n\n\
         Das Thema soll:\n\
         - Saisonpassend fuer {month} sein\n\
         - Suchmaschinenrelevant (hohes Suchvolumen)\n\
         - Konkret und spezifisch (nicht zu allgemein)\n\
         - Fuer deutschsprachige Segler relevant\n\n\
         Antworte NUR mit einem JSON-Objekt:\n\
         {{\n\
         \"topic\": \"Das konkrete Thema\",\n\
         \"title\": \"SEO-optimierter Titel (max 60 Zeichen)\",\n\
         \"meta_description\": \"Meta-Description (genau 150-155 Zeichen)\",\n\
         \"keywords\": [\"keyword1\", \"keyword2\", \"keyword3\"],\n\
         \"image_prompt\": \"Beschreibung fuer ein Hero-Bild (auf Englisch, fotorealistisch, Segelthema)\"\n\
         }}",
        year = now.year(),
        kind = content_type.key,
        category = content_type.category.name(),
        topics = recent_topics.join("\n"),
        titles = recent_titles.join("\n"),
    )
}

/// Metadata prompt for an explicitly requested topic.
fn forced_topic_prompt(topic: &str) -> String {
    format!(
        "Erstelle Metadaten fuer einen Segelartikel zum Thema: \"{topic}\"\n\n\
         Kategorien: grundlagen, reviere, boote, ausruestung, wissen, geschichten\n\n\
         Antworte NUR mit JSON:\n\
         {{\n\
         \"topic\": \"{topic}\",\n\
         \"title\": \"SEO-Titel (max 60 Zeichen)\",\n\
         \"meta_description\": \"Meta-Description (150-155 Zeichen)\",\n\
         \"keywords\": [\"kw1\", \"kw2\", \"kw3\"],\n\
         \"category\": \"die passende kategorie\",\n\
         \"image_prompt\": \"Hero-Bild Beschreibung (Englisch, fotorealistisch)\"\n\
         }}"
    )
}
