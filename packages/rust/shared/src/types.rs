//! Core domain types for the Postforge article pipeline.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// RunId
// ---------------------------------------------------------------------------

/// A UUID v7 wrapper for pipeline run identifiers (time-sortable).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(pub Uuid);

impl RunId {
    /// Generate a new time-sortable run identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// The fixed set of blog categories.
///
/// Serialized as the category slug (e.g. `"grundlagen"`), matching the
/// persisted article records and the category page URLs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Grundlagen,
    Reviere,
    Boote,
    Ausruestung,
    Wissen,
    Geschichten,
}

/// All categories in display order.
pub static CATEGORIES: [Category; 6] = [
    Category::Grundlagen,
    Category::Reviere,
    Category::Boote,
    Category::Ausruestung,
    Category::Wissen,
    Category::Geschichten,
];

impl Category {
    /// URL-safe category slug.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Grundlagen => "grundlagen",
            Self::Reviere => "reviere",
            Self::Boote => "boote",
            Self::Ausruestung => "ausruestung",
            Self::Wissen => "wissen",
            Self::Geschichten => "geschichten",
        }
    }

    /// Human-readable display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Grundlagen => "Grundlagen",
            Self::Reviere => "Reviere",
            Self::Boote => "Boote",
            Self::Ausruestung => "Ausruestung",
            Self::Wissen => "Wissen",
            Self::Geschichten => "Geschichten",
        }
    }

    /// Category teaser shown on the home page and category feeds.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Grundlagen => {
                "Segeln lernen von Anfang an: Grundbegriffe, erste Schritte und Basiswissen fuer Einsteiger."
            }
            Self::Reviere => {
                "Die schoensten Segelreviere weltweit: Tipps, Routen und Insiderwissen fuer deinen naechsten Toern."
            }
            Self::Boote => {
                "Bootstypen, Tests und Kaufberatung: Finde das perfekte Boot fuer deine Beduerfnisse."
            }
            Self::Ausruestung => {
                "Die beste Segelausruestung: Bekleidung, Elektronik und Zubehoer im Test."
            }
            Self::Wissen => {
                "Vertieftes Segelwissen: Wetterkunde, Navigation, Seemannschaft und Sicherheit auf See."
            }
            Self::Geschichten => {
                "Erlebnisse auf See: Persoenliche Geschichten, Abenteuer und Lektionen von Kapitaen Hannes."
            }
        }
    }

    /// Parse a category from its slug. Unknown slugs fall back to `Wissen`,
    /// matching how feeds treat records written by older tool versions.
    pub fn from_slug(slug: &str) -> Self {
        match slug {
            "grundlagen" => Self::Grundlagen,
            "reviere" => Self::Reviere,
            "boote" => Self::Boote,
            "ausruestung" => Self::Ausruestung,
            "geschichten" => Self::Geschichten,
            _ => Self::Wissen,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.slug())
    }
}

// ---------------------------------------------------------------------------
// ContentType
// ---------------------------------------------------------------------------

/// An article format: type key, home category, and the drafting instruction
/// handed to the text-generation adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentType {
    /// Stable type key persisted with the article (e.g. `"ratgeber"`).
    pub key: &'static str,
    /// The category articles of this type are filed under.
    pub category: Category,
    /// Drafting instruction for the text-generation adapter.
    pub instruction: &'static str,
}

/// The fixed table of article formats; topic research draws one uniformly
/// at random per run.
pub static CONTENT_TYPES: [ContentType; 7] = [
    ContentType {
        key: "ratgeber",
        category: Category::Grundlagen,
        instruction: "Schreibe einen ausfuehrlichen Ratgeber/How-To Artikel zum Thema Segeln.",
    },
    ContentType {
        key: "revier-guide",
        category: Category::Reviere,
        instruction: "Schreibe einen detaillierten Revier-Guide ueber ein Segelrevier.",
    },
    ContentType {
        key: "boots-review",
        category: Category::Boote,
        instruction: "Schreibe eine ausfuehrliche Boots-Review/Kaufberatung.",
    },
    ContentType {
        key: "checkliste",
        category: Category::Ausruestung,
        instruction: "Schreibe einen Checklisten-Artikel fuer Segler.",
    },
    ContentType {
        key: "geschichte",
        category: Category::Geschichten,
        instruction:
            "Schreibe eine persoenliche Segel-Geschichte aus der Ich-Perspektive von Kapitaen Hannes.",
    },
    ContentType {
        key: "wissen",
        category: Category::Wissen,
        instruction: "Schreibe einen Wissens-Artikel ueber ein technisches Segel-Thema.",
    },
    ContentType {
        key: "ausruestung",
        category: Category::Ausruestung,
        instruction: "Schreibe einen Ausruestungs-Guide fuer Segler.",
    },
];

// ---------------------------------------------------------------------------
// TopicRecord
// ---------------------------------------------------------------------------

/// The topic selected for one pipeline run, produced by topic research.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicRecord {
    /// The concrete topic in free text.
    pub topic: String,
    /// SEO title, at most 60 characters.
    pub title: String,
    /// Meta description, 150–155 characters.
    pub meta_description: String,
    /// Ordered keyword list.
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Category the article is filed under.
    pub category: Category,
    /// Persisted content-type key (e.g. `"ratgeber"`).
    pub content_type: String,
    /// URL-safe slug derived from the title, unique across the store.
    pub slug: String,
    /// English prompt for the hero image generator.
    #[serde(default)]
    pub image_prompt: String,
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// One FAQ entry attached to a draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

/// The mutable article body, owned by the orchestrator for one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    /// Article body as an HTML fragment (no `<h1>`).
    pub content: String,
    /// FAQ entries; may be empty when draft recovery had to drop them.
    #[serde(default)]
    pub faq: Vec<FaqEntry>,
    /// Alt text for the hero image.
    #[serde(default)]
    pub image_alt: String,
}

// ---------------------------------------------------------------------------
// FactCheckResult
// ---------------------------------------------------------------------------

/// A verified source reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub title: String,
    pub url: String,
}

/// Advisory output of the fact-check stage. Absence of the verification
/// adapter degrades to the empty result.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FactCheckResult {
    #[serde(default)]
    pub sources: Vec<Source>,
    #[serde(default)]
    pub corrections: Vec<String>,
}

impl FactCheckResult {
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.corrections.is_empty()
    }
}

// ---------------------------------------------------------------------------
// QualityVerdict
// ---------------------------------------------------------------------------

/// A single evaluation of draft quality. Drives the feedback loop;
/// never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct QualityVerdict {
    /// Score from 0 to 10.
    pub score: u8,
    #[serde(default)]
    pub issues: Vec<String>,
    #[serde(default)]
    pub suggestions: Vec<String>,
}

// ---------------------------------------------------------------------------
// ArticleRecord
// ---------------------------------------------------------------------------

/// Persisted article metadata. Created once at the end of a successful run,
/// appended to the Content Store, never mutated by this pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub slug: String,
    pub title: String,
    pub meta_description: String,
    pub category: Category,
    #[serde(default)]
    pub keywords: Vec<String>,
    /// Publication date, `YYYY-MM-DD`.
    pub date_iso: String,
    /// Publication date in German long form (e.g. `"7. August 2026"`).
    pub date_display: String,
    /// Estimated read time in minutes.
    pub read_time: u32,
    pub image_alt: String,
    /// Content-type key (e.g. `"ratgeber"`).
    pub content_type: String,
}

impl ArticleRecord {
    /// Build a record from a run's topic and draft at publication time.
    pub fn from_run(
        topic: &TopicRecord,
        draft: &Draft,
        published_at: DateTime<Utc>,
        read_time: u32,
    ) -> Self {
        let image_alt = if draft.image_alt.trim().is_empty() {
            topic.title.clone()
        } else {
            draft.image_alt.clone()
        };
        Self {
            slug: topic.slug.clone(),
            title: topic.title.clone(),
            meta_description: topic.meta_description.clone(),
            category: topic.category,
            keywords: topic.keywords.clone(),
            date_iso: published_at.format("%Y-%m-%d").to_string(),
            date_display: german_date_display(published_at),
            read_time,
            image_alt,
            content_type: topic.content_type.clone(),
        }
    }
}

/// German month names, January first.
const MONTHS: [&str; 12] = [
    "Januar",
    "Februar",
    "März",
    "April",
    "Mai",
    "Juni",
    "Juli",
    "August",
    "September",
    "Oktober",
    "November",
    "Dezember",
];

/// German long-form date: day without leading zero, month name, year.
pub fn german_date_display(date: DateTime<Utc>) -> String {
    use chrono::Datelike;
    format!(
        "{}. {} {}",
        date.day(),
        MONTHS[date.month0() as usize],
        date.year()
    )
}

/// German name of the month for a given date (used in topic research).
pub fn german_month_name(date: DateTime<Utc>) -> &'static str {
    use chrono::Datelike;
    MONTHS[date.month0() as usize]
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn category_slug_roundtrip() {
        for cat in CATEGORIES {
            assert_eq!(Category::from_slug(cat.slug()), cat);
        }
        // Unknown slugs fall back to Wissen
        assert_eq!(Category::from_slug("unbekannt"), Category::Wissen);
    }

    #[test]
    fn category_serializes_as_slug() {
        let json = serde_json::to_string(&Category::Ausruestung).unwrap();
        assert_eq!(json, "\"ausruestung\"");
        let parsed: Category = serde_json::from_str("\"reviere\"").unwrap();
        assert_eq!(parsed, Category::Reviere);
    }

    #[test]
    fn content_types_cover_every_key_once() {
        let mut keys: Vec<&str> = CONTENT_TYPES.iter().map(|c| c.key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), CONTENT_TYPES.len());
    }

    #[test]
    fn german_date_formats() {
        let date = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        assert_eq!(german_date_display(date), "7. August 2026");
        assert_eq!(german_month_name(date), "August");
    }

    #[test]
    fn article_record_falls_back_to_title_alt() {
        let topic = TopicRecord {
            topic: "Ankern".into(),
            title: "Ankern lernen".into(),
            meta_description: "x".into(),
            keywords: vec!["ankern".into()],
            category: Category::Grundlagen,
            content_type: "ratgeber".into(),
            slug: "ankern-lernen".into(),
            image_prompt: String::new(),
        };
        let draft = Draft {
            content: "<p>Moin.</p>".into(),
            faq: vec![],
            image_alt: "  ".into(),
        };
        let date = Utc.with_ymd_and_hms(2026, 8, 7, 12, 0, 0).unwrap();
        let record = ArticleRecord::from_run(&topic, &draft, date, 4);
        assert_eq!(record.image_alt, "Ankern lernen");
        assert_eq!(record.date_iso, "2026-08-07");
        assert_eq!(record.read_time, 4);
    }

    #[test]
    fn topic_record_roundtrip() {
        let topic = TopicRecord {
            topic: "Wetterkunde".into(),
            title: "Wetterkunde für Segler".into(),
            meta_description: "m".into(),
            keywords: vec!["wetter".into()],
            category: Category::Wissen,
            content_type: "wissen".into(),
            slug: "wetterkunde-fuer-segler".into(),
            image_prompt: "storm clouds over sea".into(),
        };
        let json = serde_json::to_string(&topic).unwrap();
        let parsed: TopicRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.slug, topic.slug);
        assert_eq!(parsed.category, Category::Wissen);
    }
}
